pub mod cli;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod processors;
pub mod stores;
pub mod transformers;
pub mod utils;
pub mod validation;
pub mod writers;

pub use error::{EtlError, Result};
