//! Error module
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Status {
    #[error("Base URL must be http:// or https://, got {0}")]
    BadBaseUrl(String),
    #[error("Invalid coordinates {0},{1}")]
    BadPosition(f64, f64),
}
