//! Error types for spec flattening, argv scanning, and value decoding.
//!
//! Two failure families exist. [`ArgError`] covers everything the analyzer
//! detects: duplicate declarations at build time and scan failures at parse
//! time. [`DecodeError`] surfaces lazily, at the `decode::<T>()` call site,
//! possibly long after parsing finished — parsed values stay untyped strings
//! until the caller asks for a concrete type.

use thiserror::Error;

/// Kind of a [`Value`](crate::Value), used in decode diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Uninitialized value.
    Null,
    /// Single string value.
    Scalar,
    /// Ordered list of values.
    Sequence,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Scalar => "scalar",
            ValueKind::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// Errors raised while building an [`Analyzer`](crate::Analyzer) or scanning
/// an argument vector.
///
/// Build-time variants (`DuplicateName`, `DuplicateShortName`) fail fast at
/// startup; the rest are scan failures raised synchronously from
/// [`Analyzer::analyze`](crate::Analyzer::analyze). There is no partial-result
/// recovery: the caller gets a complete [`ParseResult`](crate::ParseResult)
/// or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// A token or name did not resolve in the current namespace.
    #[error("not recognized argument '{0}'")]
    UnrecognizedArgument(String),
    /// Two sibling specs share a qualified name.
    #[error("duplicate argument name '{0}'")]
    DuplicateName(String),
    /// Two sibling specs share a short name.
    #[error("duplicate short name '{0}'")]
    DuplicateShortName(String),
    /// Input ended while an option still owed value tokens.
    #[error("expected some value")]
    ExpectedValue,
    /// A group's trailing values cannot fit in the remaining tokens.
    #[error("expected values at the end of group '{0}'")]
    ExpectedGroupValues(String),
    /// The program's trailing values cannot fit in the remaining tokens.
    #[error("expected values at the end of program call")]
    ExpectedProgramValues,
}

/// Errors raised when converting a [`Value`](crate::Value) to a typed Rust
/// value, or when a sequence/scalar operation is applied to the wrong kind.
///
/// # Examples
///
/// ```
/// use argtree_core::Value;
///
/// let v = Value::scalar("yes");
/// assert!(v.decode::<bool>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The value has the wrong kind for the requested operation.
    #[error("expected {expected} value, found {found}")]
    KindMismatch {
        /// Kind the operation needed.
        expected: ValueKind,
        /// Kind the value actually had.
        found: ValueKind,
    },
    /// The scalar text does not match the target type's grammar.
    #[error("cannot decode '{text}' as {target}")]
    Malformed {
        /// Offending scalar text.
        text: String,
        /// Name of the requested target type.
        target: &'static str,
    },
    /// The scalar text parsed but does not fit in the target type.
    #[error("value '{text}' overflows {target}")]
    Overflow {
        /// Offending scalar text.
        text: String,
        /// Name of the requested target type.
        target: &'static str,
    },
}
