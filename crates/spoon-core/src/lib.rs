pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod planner;
pub mod prompt;
pub mod router;
pub mod rules;
pub mod runner;
pub mod state;
pub mod store;
pub mod suggest;
pub mod target;
pub mod types;

pub use error::{Result, SpoonError};
