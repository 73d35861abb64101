use thiserror::Error;

/// Construction-time validation failure. The matching engine itself never
/// sees an invalid order; these surface to the caller before submission.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOrder {
    #[error("order size must be positive")]
    ZeroSize,
    #[error("limit price must be positive")]
    ZeroPrice,
}
