pub mod client;
pub mod cryptokeys;
pub mod records;
pub mod servers;
pub mod statistics;
pub mod types;
pub mod zones;
