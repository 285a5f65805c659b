mod order_number;
mod password;

pub use order_number::{validate_order_number, NumberFormatError};
pub use password::hash_password;
