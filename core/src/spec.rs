//! Declarative argument specification trees.
//!
//! Callers describe their command line as a forest of [`ArgSpec`] nodes and
//! hand it to [`Analyzer::builder`](crate::Analyzer::builder). A node is one
//! of three kinds, decided once at construction:
//!
//! - [`ArgSpec::flag`] — presence-only option (`--verbose`, `-v`).
//! - [`ArgSpec::value`] / [`ArgSpec::value_with_defaults`] — option consuming
//!   a fixed number of value tokens. Arity 0 (or an empty default list)
//!   degenerates the node to a flag.
//! - [`ArgSpec::group`] — a subcommand-like bare word holding nested child
//!   nodes and, optionally, its own trailing value tokens.
//!
//! Construction performs no validation; duplicate names inside one namespace
//! are detected when the analyzer flattens the tree.
//!
//! # Examples
//!
//! ```
//! use argtree_core::{ArgSpec, HelpText};
//!
//! let spec = ArgSpec::group(
//!     "remote",
//!     vec![
//!         ArgSpec::flag("verbose").short('v'),
//!         ArgSpec::value("url", 1).short('u'),
//!     ],
//! )
//! .help(HelpText::new("Manage remotes"));
//!
//! assert_eq!(spec.name(), "remote");
//! assert!(spec.children().is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Callback invoked with a node's parsed [`Value`] (Null for flags).
///
/// Callbacks run synchronously during the token scan, in strict
/// left-to-right token order, and once more for each materialized default.
pub type ArgCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Opaque help payload attached to a spec node.
///
/// Consumed only by the [`HelpRenderer`](crate::HelpRenderer); the parse
/// path never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpText {
    /// Short one-line description.
    pub description: String,
    /// Longer description used for the node's own usage block, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
}

impl HelpText {
    /// Creates a help payload with a short description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            long_description: None,
        }
    }

    /// Adds a long description.
    pub fn long(mut self, description: impl Into<String>) -> Self {
        self.long_description = Some(description.into());
        self
    }
}

/// Kind of a specification node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Presence-only option.
    Flag,
    /// Option consuming value tokens.
    Value,
    /// Subcommand-like node with children.
    Group,
}

/// A presence-only option.
pub struct FlagSpec {
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) is_default: bool,
    pub(crate) callback: Option<ArgCallback>,
    pub(crate) help: Option<HelpText>,
}

/// An option consuming a fixed number of value tokens.
pub struct ValueSpec {
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) arity: usize,
    pub(crate) defaults: Option<Vec<String>>,
    pub(crate) callback: Option<ArgCallback>,
    pub(crate) help: Option<HelpText>,
}

/// A subcommand-like node with nested children and optional trailing values.
pub struct GroupSpec {
    pub(crate) name: String,
    pub(crate) children: Vec<ArgSpec>,
    pub(crate) trailing: usize,
    pub(crate) trailing_defaults: Option<Vec<String>>,
    pub(crate) callback: Option<ArgCallback>,
    pub(crate) help: Option<HelpText>,
}

/// A declarative argument specification node.
///
/// See the [module docs](self) for the construction surface.
pub enum ArgSpec {
    /// Presence-only option.
    Flag(FlagSpec),
    /// Option with value tokens.
    Value(ValueSpec),
    /// Subcommand group.
    Group(GroupSpec),
}

impl ArgSpec {
    /// Creates a flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::{ArgKind, ArgSpec};
    ///
    /// let flag = ArgSpec::flag("verbose").short('v');
    /// assert_eq!(flag.kind(), ArgKind::Flag);
    /// assert_eq!(flag.short_name(), Some('v'));
    /// ```
    pub fn flag(name: impl Into<String>) -> Self {
        ArgSpec::Flag(FlagSpec {
            name: name.into(),
            short: None,
            is_default: false,
            callback: None,
            help: None,
        })
    }

    /// Creates a value argument consuming `arity` tokens.
    ///
    /// Arity 0 degenerates to a flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::{ArgKind, ArgSpec};
    ///
    /// assert_eq!(ArgSpec::value("bpm", 1).kind(), ArgKind::Value);
    /// assert_eq!(ArgSpec::value("bpm", 0).kind(), ArgKind::Flag);
    /// ```
    pub fn value(name: impl Into<String>, arity: usize) -> Self {
        if arity == 0 {
            return Self::flag(name);
        }
        ArgSpec::Value(ValueSpec {
            name: name.into(),
            short: None,
            arity,
            defaults: None,
            callback: None,
            help: None,
        })
    }

    /// Creates a value argument whose arity and default content come from an
    /// explicit default list.
    ///
    /// An empty list degenerates to a flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::ArgSpec;
    ///
    /// let bpm = ArgSpec::value_with_defaults("bpm", ["120"]).short('b');
    /// assert_eq!(bpm.arity(), 1);
    /// assert!(bpm.default_value().is_some());
    /// ```
    pub fn value_with_defaults<I, S>(name: impl Into<String>, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let defaults: Vec<String> = defaults.into_iter().map(Into::into).collect();
        if defaults.is_empty() {
            return Self::flag(name);
        }
        ArgSpec::Value(ValueSpec {
            name: name.into(),
            short: None,
            arity: defaults.len(),
            defaults: Some(defaults),
            callback: None,
            help: None,
        })
    }

    /// Creates a group holding `children`.
    pub fn group(name: impl Into<String>, children: Vec<ArgSpec>) -> Self {
        ArgSpec::Group(GroupSpec {
            name: name.into(),
            children,
            trailing: 0,
            trailing_defaults: None,
            callback: None,
            help: None,
        })
    }

    /// Sets the single-character short name. Has no effect on groups, which
    /// are matched as bare words.
    pub fn short(mut self, short: char) -> Self {
        match &mut self {
            ArgSpec::Flag(f) => f.short = Some(short),
            ArgSpec::Value(v) => v.short = Some(short),
            ArgSpec::Group(_) => {}
        }
        self
    }

    /// Marks a flag as auto-present when omitted from the input. Has no
    /// effect on values and groups, which use default value lists instead.
    pub fn default_present(mut self) -> Self {
        if let ArgSpec::Flag(f) = &mut self {
            f.is_default = true;
        }
        self
    }

    /// Sets a group's own trailing arity, consumed after all of its children
    /// have been scanned. Has no effect on flags and values.
    pub fn trailing(mut self, arity: usize) -> Self {
        if let ArgSpec::Group(g) = &mut self {
            g.trailing = arity;
            g.trailing_defaults = None;
        }
        self
    }

    /// Sets a group's trailing arity and default content from an explicit
    /// default list. An empty list clears the trailing arity.
    pub fn trailing_defaults<I, S>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ArgSpec::Group(g) = &mut self {
            let defaults: Vec<String> = defaults.into_iter().map(Into::into).collect();
            g.trailing = defaults.len();
            g.trailing_defaults = if defaults.is_empty() {
                None
            } else {
                Some(defaults)
            };
        }
        self
    }

    /// Attaches a callback fired with the node's parsed [`Value`].
    pub fn on_parse(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        let callback: ArgCallback = Arc::new(callback);
        match &mut self {
            ArgSpec::Flag(f) => f.callback = Some(callback),
            ArgSpec::Value(v) => v.callback = Some(callback),
            ArgSpec::Group(g) => g.callback = Some(callback),
        }
        self
    }

    /// Attaches a help payload.
    pub fn help(mut self, help: HelpText) -> Self {
        match &mut self {
            ArgSpec::Flag(f) => f.help = Some(help),
            ArgSpec::Value(v) => v.help = Some(help),
            ArgSpec::Group(g) => g.help = Some(help),
        }
        self
    }

    /// The node's kind.
    pub fn kind(&self) -> ArgKind {
        match self {
            ArgSpec::Flag(_) => ArgKind::Flag,
            ArgSpec::Value(_) => ArgKind::Value,
            ArgSpec::Group(_) => ArgKind::Group,
        }
    }

    /// The declared name (before whitespace-to-hyphen rewriting).
    pub fn name(&self) -> &str {
        match self {
            ArgSpec::Flag(f) => &f.name,
            ArgSpec::Value(v) => &v.name,
            ArgSpec::Group(g) => &g.name,
        }
    }

    /// The short name, if any.
    pub fn short_name(&self) -> Option<char> {
        match self {
            ArgSpec::Flag(f) => f.short,
            ArgSpec::Value(v) => v.short,
            ArgSpec::Group(_) => None,
        }
    }

    /// Whether this is a flag marked auto-present.
    pub fn is_default_flag(&self) -> bool {
        matches!(self, ArgSpec::Flag(f) if f.is_default)
    }

    /// Number of value tokens this node consumes (a group's trailing arity).
    pub fn arity(&self) -> usize {
        match self {
            ArgSpec::Flag(_) => 0,
            ArgSpec::Value(v) => v.arity,
            ArgSpec::Group(g) => g.trailing,
        }
    }

    /// The default content as a [`Value`], if declared: a scalar for a
    /// single default, a sequence otherwise.
    pub fn default_value(&self) -> Option<Value> {
        let defaults = match self {
            ArgSpec::Flag(_) => return None,
            ArgSpec::Value(v) => v.defaults.as_ref()?,
            ArgSpec::Group(g) => g.trailing_defaults.as_ref()?,
        };
        if defaults.len() == 1 {
            Some(Value::scalar(defaults[0].clone()))
        } else {
            Some(Value::sequence(defaults.iter().cloned()))
        }
    }

    /// Nested children, for groups.
    pub fn children(&self) -> Option<&[ArgSpec]> {
        match self {
            ArgSpec::Group(g) => Some(&g.children),
            _ => None,
        }
    }

    /// The attached callback, if any.
    pub fn callback(&self) -> Option<&ArgCallback> {
        match self {
            ArgSpec::Flag(f) => f.callback.as_ref(),
            ArgSpec::Value(v) => v.callback.as_ref(),
            ArgSpec::Group(g) => g.callback.as_ref(),
        }
    }

    /// The attached help payload, if any.
    pub fn help_text(&self) -> Option<&HelpText> {
        match self {
            ArgSpec::Flag(f) => f.help.as_ref(),
            ArgSpec::Value(v) => v.help.as_ref(),
            ArgSpec::Group(g) => g.help.as_ref(),
        }
    }
}

impl fmt::Debug for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct(match self.kind() {
            ArgKind::Flag => "Flag",
            ArgKind::Value => "Value",
            ArgKind::Group => "Group",
        });
        dbg.field("name", &self.name())
            .field("short", &self.short_name())
            .field("arity", &self.arity())
            .field("has_callback", &self.callback().is_some());
        if let Some(children) = self.children() {
            dbg.field("children", &children);
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_zero_degenerates_to_flag() {
        assert_eq!(ArgSpec::value("x", 0).kind(), ArgKind::Flag);
        let empty: [&str; 0] = [];
        assert_eq!(ArgSpec::value_with_defaults("x", empty).kind(), ArgKind::Flag);
    }

    #[test]
    fn defaults_infer_arity_and_shape() {
        let one = ArgSpec::value_with_defaults("bpm", ["120"]);
        assert_eq!(one.arity(), 1);
        assert_eq!(one.default_value(), Some(Value::scalar("120")));

        let two = ArgSpec::value_with_defaults("range", ["40", "440"]);
        assert_eq!(two.arity(), 2);
        assert_eq!(two.default_value(), Some(Value::sequence(["40", "440"])));
    }

    #[test]
    fn short_is_ignored_on_groups() {
        let group = ArgSpec::group("remote", vec![]).short('r');
        assert_eq!(group.short_name(), None);
    }

    #[test]
    fn trailing_defaults_set_group_arity() {
        let group = ArgSpec::group("play", vec![]).trailing_defaults(["track.opus"]);
        assert_eq!(group.arity(), 1);
        assert!(group.default_value().is_some());

        let cleared = ArgSpec::group("play", vec![]).trailing(2);
        assert_eq!(cleared.arity(), 2);
        assert!(cleared.default_value().is_none());
    }
}
