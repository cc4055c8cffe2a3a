//! Market Data
//!
//! Closing-price series consumed by the trading environment and the loader
//! for downloaded market-data files.

mod loader;
mod price_series;

pub use loader::{load_close_prices, read_close_prices, CsvLayout};
pub use price_series::PriceSeries;
