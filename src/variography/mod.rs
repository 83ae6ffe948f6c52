pub mod binning;
pub mod config;
pub mod engine;
pub mod export;
pub mod lags;
pub mod map;
