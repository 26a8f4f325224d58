/// Shortens a query to at most `$len` bytes (497 by default) for log and
/// error messages, appending `...` when something was cut.
#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::truncate_long!($query, 497)
    };
    ($query:expr, $len:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_str(&$query, $len).trim_end(),
            if $query.len() > $len { "..." } else { "" },
        )
    };
}

/// Longest prefix of `value` not exceeding `len` bytes that ends on a char
/// boundary.
pub fn truncate_str(value: &str, len: usize) -> &str {
    if value.len() <= len {
        return value;
    }
    let mut end = len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Joins the displayed items with `separator`.
pub fn separated_by<T: std::fmt::Display>(
    values: impl IntoIterator<Item = T>,
    separator: &str,
) -> String {
    let mut out = String::new();
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(&v.to_string());
    }
    out
}
