pub mod api;
pub mod app;
pub mod args;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
pub mod ledger;
pub mod model;
pub mod session;
pub mod storage;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
