#[cfg(test)]
mod tests {
    use layerdb_core::{NamedValue, Value, positional};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert_ne!(Value::Int8(None), Value::Null);
        assert!(Value::Int8(None).is_null());
        assert!(Value::Varchar(None).same_type(&Value::Varchar(Some("a".into()))));
    }

    #[test]
    fn value_from() {
        assert_eq!(Value::from(true), Value::Boolean(Some(true)));
        assert_eq!(Value::from(-3_i16), Value::Int16(Some(-3)));
        assert_eq!(Value::from(7_u64), Value::UInt64(Some(7)));
        assert_eq!(Value::from(0.5_f64), Value::Float64(Some(0.5)));
        assert_eq!(Value::from("hello"), Value::Varchar(Some("hello".into())));
        assert_eq!(Value::from(None::<i32>), Value::Int32(None));
        assert_eq!(
            Value::from(vec![1_u8, 2, 3]),
            Value::Blob(Some(vec![1, 2, 3].into()))
        );
        let decimal = Decimal::from_str("12.50").expect("Could not parse the decimal");
        assert_eq!(Value::from(decimal), Value::Decimal(Some(decimal)));
        assert_eq!(
            Value::from(date!(2024 - 02 - 29)),
            Value::Date(Some(date!(2024 - 02 - 29)))
        );
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int64(None).to_string(), "NULL");
        assert_eq!(Value::from("paid").to_string(), "'paid'");
        assert_eq!(Value::from(vec![0_u8; 4]).to_string(), "<4 bytes>");
        assert_eq!(Value::from(100_i64).to_string(), "100");
        let uuid = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8")
            .expect("Could not parse the uuid");
        assert_eq!(
            Value::from(uuid).to_string(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
        assert_eq!(Value::from(datetime!(2020-01-01 0:00)).type_name(), "TIMESTAMP");
    }

    #[test]
    fn named_values() {
        let args = positional(["paid".into(), Value::from(100_i64)]);
        assert_eq!(
            args,
            [NamedValue::new(1, "paid"), NamedValue::new(2, 100_i64)]
        );
        assert!(!args[0].is_named());
        assert_eq!(args[0].to_string(), "$1='paid'");
        let named = NamedValue::named("id", 2, 100_i64);
        assert!(named.is_named());
        assert_eq!(named.to_string(), "@id=100");
    }
}
