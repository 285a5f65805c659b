use thiserror::Error;

/// The ways in which a submitted order number can be rejected.
///
/// Externally all three variants are reported the same way; internally the distinction is kept so that logs can say
/// whether the client sent garbage or a number that merely failed its check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumberFormatError {
    #[error("The order number is empty")]
    Empty,
    #[error("The order number contains a non-digit character")]
    NonDigit,
    #[error("The order number fails the Luhn checksum")]
    Checksum,
}

/// Checks that `number` is a non-empty string of ASCII digits that passes the Luhn (mod 10) check.
///
/// Starting from the rightmost digit, every second digit is doubled, 9 is subtracted from any doubled value above 9,
/// and the number is valid when the sum of all digits is a multiple of 10.
pub fn validate_order_number(number: &str) -> Result<(), NumberFormatError> {
    if number.is_empty() {
        return Err(NumberFormatError::Empty);
    }
    let mut sum = 0u32;
    for (i, c) in number.bytes().rev().enumerate() {
        if !c.is_ascii_digit() {
            return Err(NumberFormatError::NonDigit);
        }
        let mut digit = u32::from(c - b'0');
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    if sum % 10 == 0 {
        Ok(())
    } else {
        Err(NumberFormatError::Checksum)
    }
}
