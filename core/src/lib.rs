//! Declarative command-line argument trees.
//!
//! An argument specification is a forest of [`ArgSpec`] nodes: boolean
//! flags, value-consuming options with fixed arity, and named groups that
//! scope their children into nested namespaces (`remote add --url …`).
//! [`Analyzer`] flattens the forest once at construction and then scans
//! argument vectors into [`ParseResult`]s, materializing declared defaults
//! for anything the caller omitted.
//!
//! Parsed content is carried as untyped [`Value`]s (null / scalar /
//! sequence) and converted on demand through the [`FromValue`] trait, which
//! ships implementations for the primitive types with an overflow-checked
//! numeric grammar (`0x`/`0c`/`0b` radix prefixes, repeated sign characters).
//!
//! # Examples
//!
//! ```
//! use argtree_core::{Analyzer, ArgSpec};
//!
//! let analyzer = Analyzer::builder()
//!     .arg(ArgSpec::value_with_defaults("bpm", ["120"]).short('b'))
//!     .arg(ArgSpec::flag("verbose").short('v'))
//!     .arg(ArgSpec::group("play", vec![ArgSpec::flag("loop")]).trailing(1))
//!     .build()?;
//!
//! let result = analyzer.analyze(["metronome", "-v", "play", "--loop", "x.opus"])?;
//! assert!(result.contains_flag("verbose"));
//! assert!(result.contains_flag("play.loop"));
//!
//! let bpm: u32 = result
//!     .value("bpm")
//!     .map(|v| v.decode())
//!     .transpose()?
//!     .unwrap_or(0);
//! assert_eq!(bpm, 120);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod analyzer;
mod decode;
mod error;
mod help;
mod result;
mod spec;
mod value;

pub use analyzer::{Analyzer, AnalyzerBuilder};
pub use decode::{parse_float, parse_signed, parse_unsigned, FromValue};
pub use error::{ArgError, DecodeError, ValueKind};
pub use help::{DefaultHelpRenderer, HelpInfo, HelpRenderer};
pub use result::ParseResult;
pub use spec::{ArgCallback, ArgKind, ArgSpec, HelpText};
pub use value::Value;
