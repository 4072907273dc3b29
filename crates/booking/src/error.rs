//! Error types for the booking domain.

use crate::store::StoreError;

pub type BookingResult<T> = Result<T, BookingError>;

/// Domain errors raised by the participation engine.
///
/// `NotFound` and `Conflict` cross the crate boundary unmodified; the API
/// layer maps them to 404 and 400 respectively.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}
