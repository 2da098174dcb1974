//! Read-mostly container for a completed parse.
//!
//! [`ParseResult`] is produced by
//! [`Analyzer::analyze`](crate::Analyzer::analyze) and never mutated
//! afterward. Lookup helpers accept the caller's unqualified dotted name
//! (`"bpm"`, `"remote.add.force"`) and normalize it to the internal
//! qualified form (`"--bpm"`, `"remote::add::--force"`); the raw maps are
//! exposed for callers that already hold qualified names.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::value::Value;

/// Result of analyzing one argument vector.
///
/// Distinguishes "group present, no own value" (`Some(None)` in the group
/// map) from "group present with value" and "group absent". When an argument
/// appears several times in the input, the first occurrence wins in these
/// maps; callbacks still fire per occurrence.
///
/// # Examples
///
/// ```
/// use argtree_core::{Analyzer, ArgSpec, Value};
///
/// let analyzer = Analyzer::builder()
///     .arg(ArgSpec::value("bpm", 1).short('b'))
///     .build()
///     .unwrap();
/// let result = analyzer.analyze(["metronome", "-b", "90"]).unwrap();
///
/// assert_eq!(result.value("bpm"), Some(&Value::scalar("90")));
/// assert!(result.contains_value("bpm"));
/// assert!(!result.contains_flag("bpm"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    program: Option<Value>,
    flags: HashSet<String>,
    values: HashMap<String, Value>,
    groups: HashMap<String, Option<Value>>,
}

/// Qualifies a dotted option name: `"remote.add.force"` →
/// `"remote::add::--force"`.
fn qualify_option(name: &str) -> String {
    let path = name.replace('.', "::");
    match path.rfind("::") {
        Some(i) => format!("{}::--{}", &path[..i], &path[i + 2..]),
        None => format!("--{path}"),
    }
}

/// Qualifies a dotted group name: `"remote.add"` → `"remote::add"`.
fn qualify_group(name: &str) -> String {
    name.replace('.', "::")
}

impl ParseResult {
    /// Whether nothing at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.program.is_none()
            && self.flags.is_empty()
            && self.values.is_empty()
            && self.groups.is_empty()
    }

    /// The program-level trailing value, if one was supplied or defaulted.
    pub fn program_value(&self) -> Option<&Value> {
        self.program.as_ref()
    }

    /// Whether the flag named by a dotted unqualified `name` is present.
    pub fn contains_flag(&self, name: &str) -> bool {
        self.flags.contains(&qualify_option(name))
    }

    /// Whether the value argument named by a dotted unqualified `name` is
    /// present.
    pub fn contains_value(&self, name: &str) -> bool {
        self.values.contains_key(&qualify_option(name))
    }

    /// Whether the group named by a dotted unqualified `name` is present.
    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(&qualify_group(name))
    }

    /// The parsed value for a dotted unqualified `name`, if present.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(&qualify_option(name))
    }

    /// The trailing value of a present group, if it has one.
    pub fn group_value(&self, name: &str) -> Option<&Value> {
        self.groups.get(&qualify_group(name))?.as_ref()
    }

    /// Present flags, keyed by qualified name.
    pub fn flags(&self) -> &HashSet<String> {
        &self.flags
    }

    /// Parsed values, keyed by qualified name.
    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    /// Present groups, keyed by qualified name, with their optional trailing
    /// values.
    pub fn groups(&self) -> &HashMap<String, Option<Value>> {
        &self.groups
    }

    pub(crate) fn set_program(&mut self, value: Value) {
        if self.program.is_none() {
            self.program = Some(value);
        }
    }

    pub(crate) fn has_program(&self) -> bool {
        self.program.is_some()
    }

    pub(crate) fn insert_flag(&mut self, name: String) {
        self.flags.insert(name);
    }

    pub(crate) fn insert_value(&mut self, name: String, value: Value) {
        self.values.entry(name).or_insert(value);
    }

    pub(crate) fn insert_group(&mut self, name: String, value: Option<Value>) {
        self.groups.entry(name).or_insert(value);
    }

    pub(crate) fn contains_qualified_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub(crate) fn contains_qualified_value(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn contains_qualified_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }
}
