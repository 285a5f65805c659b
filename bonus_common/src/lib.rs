mod accrual_status;
mod points;

pub mod helpers;
pub mod op;
mod secret;

pub use accrual_status::{AccrualStatus, AccrualStatusParseError};
pub use points::{Points, PointsConversionError, POINTS_SCALE};
pub use secret::Secret;
