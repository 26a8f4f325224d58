use rust_decimal::Decimal;
use std::fmt::{self, Display, Formatter};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value used for query parameters and row cells.
///
/// Every variant carries an `Option`, `None` being a typed NULL.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    /// True for `Null` and for every typed NULL.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int8(..) => "INT8",
            Value::Int16(..) => "INT16",
            Value::Int32(..) => "INT32",
            Value::Int64(..) => "INT64",
            Value::UInt8(..) => "UINT8",
            Value::UInt16(..) => "UINT16",
            Value::UInt32(..) => "UINT32",
            Value::UInt64(..) => "UINT64",
            Value::Float32(..) => "FLOAT32",
            Value::Float64(..) => "FLOAT64",
            Value::Decimal(..) => "DECIMAL",
            Value::Varchar(..) => "VARCHAR",
            Value::Blob(..) => "BLOB",
            Value::Date(..) => "DATE",
            Value::Time(..) => "TIME",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::TimestampWithTimezone(..) => "TIMESTAMP WITH TIME ZONE",
            Value::Uuid(..) => "UUID",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        macro_rules! display {
            ($v:expr) => {
                match $v {
                    Some(v) => write!(f, "{}", v),
                    None => f.write_str("NULL"),
                }
            };
        }
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => display!(v),
            Value::Int8(v) => display!(v),
            Value::Int16(v) => display!(v),
            Value::Int32(v) => display!(v),
            Value::Int64(v) => display!(v),
            Value::UInt8(v) => display!(v),
            Value::UInt16(v) => display!(v),
            Value::UInt32(v) => display!(v),
            Value::UInt64(v) => display!(v),
            Value::Float32(v) => display!(v),
            Value::Float64(v) => display!(v),
            Value::Decimal(v) => display!(v),
            Value::Varchar(Some(v)) => write!(f, "'{}'", v),
            Value::Varchar(None) => f.write_str("NULL"),
            Value::Blob(Some(v)) => write!(f, "<{} bytes>", v.len()),
            Value::Blob(None) => f.write_str("NULL"),
            Value::Date(v) => display!(v),
            Value::Time(v) => display!(v),
            Value::Timestamp(v) => display!(v),
            Value::TimestampWithTimezone(v) => display!(v),
            Value::Uuid(v) => display!(v),
        }
    }
}

macro_rules! impl_from_value {
    ($source:ty, $variant:ident) => {
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                Value::$variant(Some(value.into()))
            }
        }
        impl From<Option<$source>> for Value {
            fn from(value: Option<$source>) -> Self {
                Value::$variant(value.map(Into::into))
            }
        }
    };
}

impl_from_value!(bool, Boolean);
impl_from_value!(i8, Int8);
impl_from_value!(i16, Int16);
impl_from_value!(i32, Int32);
impl_from_value!(i64, Int64);
impl_from_value!(u8, UInt8);
impl_from_value!(u16, UInt16);
impl_from_value!(u32, UInt32);
impl_from_value!(u64, UInt64);
impl_from_value!(f32, Float32);
impl_from_value!(f64, Float64);
impl_from_value!(Decimal, Decimal);
impl_from_value!(String, Varchar);
impl_from_value!(&str, Varchar);
impl_from_value!(Vec<u8>, Blob);
impl_from_value!(Date, Date);
impl_from_value!(Time, Time);
impl_from_value!(PrimitiveDateTime, Timestamp);
impl_from_value!(OffsetDateTime, TimestampWithTimezone);
impl_from_value!(Uuid, Uuid);
