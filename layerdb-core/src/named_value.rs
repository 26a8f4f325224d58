use crate::Value;
use std::fmt::{self, Display, Formatter};

/// A single call argument.
///
/// `ordinal` is 1-based and assigned by call position. An empty `name`
/// means the argument is positional.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub ordinal: usize,
    pub value: Value,
}

impl NamedValue {
    /// Positional argument.
    pub fn new(ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            name: String::new(),
            ordinal,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ordinal,
            value: value.into(),
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

impl Display for NamedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_named() {
            write!(f, "@{}={}", self.name, self.value)
        } else {
            write!(f, "${}={}", self.ordinal, self.value)
        }
    }
}

/// Positional arguments from plain values, ordinals starting at 1.
pub fn positional<I, V>(values: I) -> Vec<NamedValue>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| NamedValue::new(i + 1, v))
        .collect()
}
