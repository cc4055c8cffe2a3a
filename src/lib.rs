pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod rl;

pub use config::{AppConfig, DataConfig, LoggingConfig, OutputConfig};
pub use data::{load_close_prices, CsvLayout, PriceSeries};
pub use error::{Result, TradesimError};
pub use rl::{
    evaluate_agent, DiscreteAction, Policy, StepResult, TradingEnvConfig, TradingEnvironment,
};
