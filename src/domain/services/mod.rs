pub mod metrics;
pub mod params;
pub mod period;
pub mod table;
