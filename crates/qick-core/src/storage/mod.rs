use crate::error::StorageError;

pub mod config;
pub mod state;

type Result<T> = std::result::Result<T, StorageError>;
