//! Field reflection used by the text and equality filters.

/// A borrowed view of one record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
    List(&'a [String]),
    /// An optional field with no value.
    Missing,
}

impl<'a> FieldValue<'a> {
    /// Text content searched by `filter_by_text`. Lists yield each element.
    pub fn texts(&self) -> Vec<&'a str> {
        match *self {
            FieldValue::Text(s) => vec![s],
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Conversion into a [`FieldValue`]. Implemented for the field types records use.
pub trait AsField {
    fn as_field(&self) -> FieldValue<'_>;
}

impl AsField for String {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl AsField for bool {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::Bool(*self)
    }
}

impl AsField for f64 {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::Number(*self)
    }
}

impl AsField for u32 {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::Number(f64::from(*self))
    }
}

impl AsField for i64 {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::Number(*self as f64)
    }
}

impl AsField for Vec<String> {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::List(self)
    }
}

impl<T: AsField> AsField for Option<T> {
    fn as_field(&self) -> FieldValue<'_> {
        match self {
            Some(value) => value.as_field(),
            None => FieldValue::Missing,
        }
    }
}
