// shared/src/lib.rs

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("invalid cost factor {0}, expected a value between 4 and 31")]
    InvalidCost(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
