pub mod config;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod listing;
pub mod order;
pub mod restaurant;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod utils;
