pub mod fx_overlay;
pub mod returns;
