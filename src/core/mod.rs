pub mod currency;
pub mod params;
