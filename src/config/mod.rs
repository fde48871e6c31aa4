pub mod defaults;
pub mod feeder;

pub use feeder::FeederConfig;
