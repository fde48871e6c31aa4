//! Built-in sources and match rules used when no config file overrides them.

use crate::matcher::WatchEntry;

pub const RSS_FEEDS: &[&str] = &[
    // National / General
    "https://www.thehindu.com/news/national/feeder/default.rss",
    "https://indianexpress.com/section/india/feed/",
    "https://www.deccanherald.com/rss.xml?type=india",
    "https://www.hindustantimes.com/feeds/rss/india-news/rssfeed.xml",
    // Business / Markets / Economy
    "https://www.business-standard.com/rss/home_page_top_stories.rss",
    "https://www.moneycontrol.com/rss/MCtopnews.xml",
    "https://www.livemint.com/rss/news",
    "https://economictimes.indiatimes.com/markets/rssfeeds/1977021501.cms",
    "https://www.financialexpress.com/feed/",
    "https://www.cnbctv18.com/news/rss/",
    // Bengaluru / Karnataka
    "https://www.deccanherald.com/rss.xml?type=city",
    "https://www.deccanherald.com/rss.xml?type=karnataka",
    "https://bangaloremirror.indiatimes.com/rss.cms",
    "https://www.thehindu.com/news/cities/bangalore/feeder/default.rss",
    "https://www.newindianexpress.com/cities/bengaluru/rssfeed/?id=338&getXmlFeed=true",
];

pub const NEWSAPI_DOMAINS: &[&str] = &[
    "thehindu.com",
    "indianexpress.com",
    "deccanherald.com",
    "hindustantimes.com",
    "business-standard.com",
    "moneycontrol.com",
    "livemint.com",
    "economictimes.indiatimes.com",
    "financialexpress.com",
    "cnbctv18.com",
    "bangaloremirror.indiatimes.com",
    "newindianexpress.com",
];

pub const KEYWORDS: &[&str] = &[
    // Geography & civic
    r"\bBengaluru\b",
    r"\bBangalore\b",
    r"\bKarnataka\b",
    r"\bNamma Metro\b",
    r"\bBBMP\b",
    r"\bBMRCL\b",
    r"\btraffic\b",
    r"\bwater supply\b",
    r"\bflood\b",
    // Business / finance / economy
    r"\bacquisition\b",
    r"\bmerger\b",
    r"\bIPO\b",
    r"\bfunding\b",
    r"\bRBI\b",
    r"\binterest rate\b",
    r"\binflation\b",
    r"\bstock (surge|crash|fall|plunge|rally)\b",
    // Tech / startups / IT
    r"\bstartup\b",
    r"\bunicorn\b",
    r"\bAI\b",
    r"\bSaaS\b",
    r"\bdeeptech\b",
    r"\bIT services\b",
    r"\bInfosys\b",
    r"\bWipro\b",
    r"\bTCS\b",
    // Kannada
    r"\bಬೆಂಗಳೂರು\b",
    r"\bಕರ್ನಾಟಕ\b",
    r"\bಮೆಟ್ರೋ\b",
    r"\bಹೂಡಿಕೆ\b",
    r"\bಸ್ಟಾರ್ಟಪ್\b",
];

pub const NEWS_QUERY: &str = concat!(
    r#"("Bengaluru" OR "Bangalore" OR "Karnataka" OR India) AND "#,
    r#"(traffic OR "water supply" OR flood OR BBMP OR BMRCL OR Metro OR "#,
    r#"acquisition OR merger OR IPO OR funding OR RBI OR "interest rate" OR inflation OR "#,
    r#""stock crash" OR "stock surge" OR rally OR startup OR unicorn OR AI OR SaaS OR Infosys OR Wipro OR TCS)"#,
);

pub fn watchlist() -> Vec<WatchEntry> {
    vec![
        WatchEntry::new("Infosys", &["INFY"]),
        WatchEntry::new("Tata Consultancy Services", &["TCS"]),
        WatchEntry::new("Wipro", &[]),
        WatchEntry::new("Reliance Industries", &["RIL", "Reliance"]),
        WatchEntry::new("Flipkart", &[]),
    ]
}
