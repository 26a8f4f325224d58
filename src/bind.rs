use layerdb_core::{NamedValue, NamedValueChecker, Result, Value};

/// A call argument as the application passes it: a value, optionally named.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Value,
}

impl Arg {
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// Turns the call arguments into the list the adapters receive: ordinals are
/// assigned by position starting at 1, then every argument goes through
/// `checker`.
///
/// The first refused argument aborts binding with the checker's error.
///
/// ```rust
/// use layerdb::{Arg, DefaultChecker, Value, bind_args};
/// let args = bind_args(&DefaultChecker, [Arg::value(7_i32), Arg::named("name", "ann")]).unwrap();
/// assert_eq!(args[0].ordinal, 1);
/// assert_eq!(args[0].value, Value::Int64(Some(7)));
/// assert_eq!(args[1].name, "name");
/// ```
pub fn bind_args<I>(checker: &dyn NamedValueChecker, args: I) -> Result<Vec<NamedValue>>
where
    I: IntoIterator<Item = Arg>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let mut nv = NamedValue {
                name: arg.name.unwrap_or_default(),
                ordinal: i + 1,
                value: arg.value,
            };
            checker.check_named_value(&mut nv)?;
            Ok(nv)
        })
        .collect()
}

/// [`bind_args`] for positional values only.
pub fn bind_values<I, V>(checker: &dyn NamedValueChecker, values: I) -> Result<Vec<NamedValue>>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    bind_args(checker, values.into_iter().map(Arg::value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerdb_core::{DefaultChecker, DriverError};
    use time::macros::time;

    #[test]
    fn ordinals_follow_position() {
        let args = bind_values(&DefaultChecker, ["paid", "due"]).expect("Could not bind");
        assert_eq!(
            args.iter().map(|a| a.ordinal).collect::<Vec<_>>(),
            [1, 2],
        );
        assert!(args.iter().all(|a| !a.is_named()));
    }

    #[test]
    fn refused_value() {
        let error = bind_args(
            &DefaultChecker,
            [Arg::value(1_i8), Arg::value(time!(10:30))],
        )
        .expect_err("A bare time should be refused");
        assert!(matches!(
            error.downcast_ref::<DriverError>(),
            Some(DriverError::UnsupportedValue(..))
        ));
    }

    #[test]
    fn custom_checker() {
        struct Upper;
        impl NamedValueChecker for Upper {
            fn check_named_value(&self, nv: &mut NamedValue) -> Result<()> {
                if let Value::Varchar(Some(v)) = &mut nv.value {
                    *v = v.to_uppercase();
                }
                Ok(())
            }
        }
        let args = bind_args(&Upper, [Arg::named("status", "paid")]).expect("Could not bind");
        assert_eq!(args, [NamedValue::named("status", 1, "PAID")]);
    }
}
