use layerdb_core::{DriverError, NamedValue, Result, Value};

/// Positional values for the legacy calling convention.
///
/// Fails with [`DriverError::NamedParametersUnsupported`] as soon as one
/// argument carries a name.
///
/// ```rust
/// use layerdb::{NamedValue, Value, named_value_to_value};
/// let values = named_value_to_value(&[NamedValue::new(1, 10_i64), NamedValue::new(2, "x")]).unwrap();
/// assert_eq!(values, [Value::Int64(Some(10)), Value::Varchar(Some("x".into()))]);
/// assert!(named_value_to_value(&[NamedValue::named("id", 1, 10_i64)]).is_err());
/// ```
pub fn named_value_to_value(args: &[NamedValue]) -> Result<Vec<Value>> {
    args.iter()
        .map(|arg| {
            if arg.is_named() {
                Err(DriverError::NamedParametersUnsupported.into())
            } else {
                Ok(arg.value.clone())
            }
        })
        .collect()
}
