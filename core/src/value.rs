//! Untyped parsed values.
//!
//! Every value the analyzer produces — parsed option values, defaults,
//! callback payloads — is a [`Value`]: either `Null`, a single `Scalar`
//! string, or an ordered `Sequence` of further values. Values stay untyped
//! until the caller decodes them via [`Value::decode`].
//!
//! Cloning a `Value` produces an independent deep copy; equality is
//! structural.
//!
//! # Examples
//!
//! ```
//! use argtree_core::Value;
//!
//! let mut v = Value::default();
//! assert!(v.is_null());
//!
//! // Appending to a null value fixes its kind to sequence.
//! v.push(Value::scalar("1")).unwrap();
//! v.push(Value::scalar("2")).unwrap();
//! assert!(v.is_sequence());
//! assert_eq!(v.len(), 2);
//! assert_eq!(v.decode::<Vec<u32>>().unwrap(), vec![1, 2]);
//! ```

use serde::{Deserialize, Serialize};

use crate::decode::FromValue;
use crate::error::{DecodeError, ValueKind};

/// An untyped parsed value: null, a scalar string, or a sequence.
///
/// Once a value becomes `Scalar` or `Sequence` it never silently turns into
/// the other kind; only `Null` is lazily fixed by the first mutating
/// operation. Operations of the wrong kind fail with
/// [`DecodeError::KindMismatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value. Flags carry this to their callbacks.
    #[default]
    Null,
    /// A single string token.
    Scalar(String),
    /// An ordered list of values, one per consumed token.
    Sequence(Vec<Value>),
}

impl Value {
    /// Creates a scalar value.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::Value;
    ///
    /// let v = Value::scalar("90");
    /// assert!(v.is_scalar());
    /// assert_eq!(v.as_str(), Some("90"));
    /// ```
    pub fn scalar(text: impl Into<String>) -> Self {
        Value::Scalar(text.into())
    }

    /// Creates a sequence of scalars from string-likes.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::Value;
    ///
    /// let v = Value::sequence(["a", "b"]);
    /// assert_eq!(v.len(), 2);
    /// ```
    pub fn sequence<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Sequence(items.into_iter().map(|s| Value::Scalar(s.into())).collect())
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Sequence(_) => ValueKind::Sequence,
        }
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is a scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Whether this value is a sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    /// The scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The sequence elements, if this is a sequence.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Appends a value, lazily fixing a null value to a sequence.
    ///
    /// Fails with [`DecodeError::KindMismatch`] on a scalar.
    pub fn push(&mut self, value: Value) -> Result<(), DecodeError> {
        if self.is_null() {
            *self = Value::Sequence(Vec::new());
        }
        match self {
            Value::Sequence(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(DecodeError::KindMismatch {
                expected: ValueKind::Sequence,
                found: other.kind(),
            }),
        }
    }

    /// Element at `idx`, if this is a sequence and `idx` is in range.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::Value;
    ///
    /// let v = Value::sequence(["x", "y"]);
    /// assert_eq!(v.get(1).and_then(|e| e.as_str()), Some("y"));
    /// assert!(v.get(2).is_none());
    /// ```
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.as_slice().and_then(|items| items.get(idx))
    }

    /// Number of elements. Null counts as 0 and a scalar as 1.
    pub fn len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Scalar(_) => 1,
            Value::Sequence(items) => items.len(),
        }
    }

    /// Whether the value holds nothing (null or an empty sequence).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over sequence elements; empty for null and scalar values.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.as_slice().unwrap_or_default().iter()
    }

    /// Decodes this value into a typed Rust value.
    ///
    /// Delegates to the [`FromValue`] implementation for `T`, the engine's
    /// sole type-extension point. `Value` and `String` are identity and
    /// scalar-passthrough cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::Value;
    ///
    /// assert_eq!(Value::scalar("0x1f").decode::<u32>().unwrap(), 31);
    /// assert!(Value::scalar("hello").decode::<u32>().is_err());
    /// ```
    pub fn decode<T: FromValue>(&self) -> Result<T, DecodeError> {
        T::from_value(self)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Scalar(text.to_string())
    }
}

impl<'a> IntoIterator for &'a Value {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fixes_kind_on_first_push() {
        let mut v = Value::Null;
        v.push(Value::scalar("a")).unwrap();
        assert!(v.is_sequence());
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn push_on_scalar_is_a_kind_error() {
        let mut v = Value::scalar("a");
        let err = v.push(Value::scalar("b")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::KindMismatch {
                expected: ValueKind::Sequence,
                found: ValueKind::Scalar,
            }
        );
        // The failed push must not have disturbed the scalar.
        assert_eq!(v.as_str(), Some("a"));
    }

    #[test]
    fn equality_is_structural() {
        let a = Value::sequence(["1", "2"]);
        let b = Value::sequence(["1", "2"]);
        let c = Value::sequence(["1", "3"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(Value::Null, Value::scalar(""));
    }

    #[test]
    fn clone_is_independent() {
        let mut a = Value::sequence(["1"]);
        let b = a.clone();
        a.push(Value::scalar("2")).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn indexed_access() {
        let v = Value::sequence(["x", "y", "z"]);
        assert_eq!(v.get(0).and_then(|e| e.as_str()), Some("x"));
        assert!(v.get(3).is_none());
        assert!(Value::scalar("x").get(0).is_none());
    }

    #[test]
    fn serde_round_trip() {
        let v = Value::Sequence(vec![Value::scalar("a"), Value::Null]);
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
