//! Request handlers

pub mod claims;
pub mod health;
pub mod hr;

use std::str::FromStr;

use core_kernel::CoreError;

use crate::error::ApiError;

/// Parses an identifier taken from the request path
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: Into<CoreError>,
{
    raw.parse::<T>().map_err(|e| ApiError::from(e.into()))
}
