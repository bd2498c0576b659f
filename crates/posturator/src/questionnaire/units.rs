//! Numeric parsing and imperial-to-metric conversion for measurement answers.

use super::domain::RawValue;

pub const CM_PER_FOOT: f64 = 30.48;
pub const CM_PER_INCH: f64 = 2.54;
pub const KG_PER_POUND: f64 = 0.453592;

/// Why a raw value could not be read as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumericError {
    Blank,
    NotANumber,
}

pub fn feet_inches_to_cm(feet: f64, inches: f64) -> f64 {
    feet * CM_PER_FOOT + inches * CM_PER_INCH
}

pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * KG_PER_POUND
}

pub(crate) fn read_decimal(raw: &RawValue) -> Result<f64, NumericError> {
    let value = match raw {
        RawValue::Number(value) => *value,
        RawValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(NumericError::Blank);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| NumericError::NotANumber)?
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumericError::NotANumber)
    }
}

/// Leading integer of the input: "12.5" reads as 12 and "25 years" as 25.
/// Input with no leading digits is not a number.
pub(crate) fn read_whole(raw: &RawValue) -> Result<i64, NumericError> {
    match raw {
        RawValue::Number(value) if value.is_finite() => Ok(value.trunc() as i64),
        RawValue::Number(_) => Err(NumericError::NotANumber),
        RawValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(NumericError::Blank);
            }

            let (negative, unsigned) = match trimmed.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
            };
            let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                return Err(NumericError::NotANumber);
            }

            let magnitude = unsigned[..digits].parse::<i64>().unwrap_or(i64::MAX);
            Ok(if negative { -magnitude } else { magnitude })
        }
    }
}

/// Optional companion field (inches of a feet/inches pair): blank counts as zero.
pub(crate) fn read_optional_decimal(raw: Option<&RawValue>) -> Result<f64, NumericError> {
    match raw {
        None => Ok(0.0),
        Some(value) => match read_decimal(value) {
            Err(NumericError::Blank) => Ok(0.0),
            other => other,
        },
    }
}
