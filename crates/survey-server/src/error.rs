//! Error type for server assembly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid CORS origin {0:?}")]
  InvalidCorsOrigin(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
