use crate::{DriverError, NamedValue, Result, Value};
use time::Time;

/// Validates and converts an argument before it is handed to a driver.
///
/// Implementations may replace `nv.value` with a converted value, or return
/// an error to refuse the argument.
pub trait NamedValueChecker: Send + Sync {
    fn check_named_value(&self, nv: &mut NamedValue) -> Result<()>;
}

/// Checker used when neither the statement nor the connection brings its own.
#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultChecker;

impl NamedValueChecker for DefaultChecker {
    fn check_named_value(&self, nv: &mut NamedValue) -> Result<()> {
        nv.value = default_convert(std::mem::take(&mut nv.value))?;
        Ok(())
    }
}

/// Normalizes a value to the canonical driver value set: `Null`, `Boolean`,
/// `Int64`, `Float64`, `Varchar`, `Blob` and `TimestampWithTimezone`.
///
/// Integers widen to `Int64`, `Float32` widens to `Float64`, decimals and
/// uuids become their textual form, dates and timestamps without an offset
/// are taken as UTC. A `UInt64` that does not fit `i64` and a bare time of
/// day are refused.
///
/// ```rust
/// use layerdb_core::{Value, default_convert};
/// assert_eq!(default_convert(Value::Int32(Some(7))).unwrap(), Value::Int64(Some(7)));
/// assert_eq!(default_convert(Value::Int32(None)).unwrap(), Value::Null);
/// ```
pub fn default_convert(value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(match value {
        Value::Boolean(v) => Value::Boolean(v),
        Value::Int8(v) => Value::Int64(v.map(Into::into)),
        Value::Int16(v) => Value::Int64(v.map(Into::into)),
        Value::Int32(v) => Value::Int64(v.map(Into::into)),
        Value::Int64(v) => Value::Int64(v),
        Value::UInt8(v) => Value::Int64(v.map(Into::into)),
        Value::UInt16(v) => Value::Int64(v.map(Into::into)),
        Value::UInt32(v) => Value::Int64(v.map(Into::into)),
        Value::UInt64(Some(v)) => match i64::try_from(v) {
            Ok(v) => Value::Int64(Some(v)),
            Err(..) => {
                return Err(DriverError::UnsupportedValue(format!(
                    "UINT64 value {} is out of the INT64 range",
                    v
                ))
                .into());
            }
        },
        Value::Float32(v) => Value::Float64(v.map(Into::into)),
        Value::Float64(v) => Value::Float64(v),
        Value::Decimal(v) => Value::Varchar(v.map(|v| v.to_string())),
        Value::Varchar(v) => Value::Varchar(v),
        Value::Blob(v) => Value::Blob(v),
        Value::Date(v) => Value::TimestampWithTimezone(
            v.map(|v| v.with_time(Time::MIDNIGHT).assume_utc()),
        ),
        Value::Timestamp(v) => Value::TimestampWithTimezone(v.map(|v| v.assume_utc())),
        Value::TimestampWithTimezone(v) => Value::TimestampWithTimezone(v),
        Value::Uuid(v) => Value::Varchar(v.map(|v| v.hyphenated().to_string())),
        value @ Value::Time(..) => {
            return Err(DriverError::UnsupportedValue(format!(
                "{} `{}` cannot be used as a parameter without a date",
                value.type_name(),
                value
            ))
            .into());
        }
        Value::Null | Value::UInt64(None) => Value::Null,
    })
}
