//! Error types for the fieldbook-geo codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed WKT: {0}")]
  MalformedWkt(String),

  #[error("unsupported geometry type: {0}")]
  UnsupportedGeometry(String),

  #[error("coordinate is not a finite number: {0}")]
  NonFiniteCoordinate(String),

  #[error("invalid WKB byte-order marker: {0:#04x}")]
  InvalidByteOrder(u8),

  #[error("unsupported WKB geometry type code: {0:#010x}")]
  UnsupportedWkbType(u32),

  #[error("truncated WKB buffer: expected {expected} bytes, got {got}")]
  TruncatedWkb { expected: usize, got: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
