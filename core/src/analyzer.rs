//! Flattening and argv scanning.
//!
//! [`Analyzer`] is built once from a forest of [`ArgSpec`] trees: the build
//! phase walks each tree and flattens it into qualified-name lookup tables
//! (arity/callback entries, short names, default sets). Duplicate names
//! inside one namespace fail the build. The compiled tables are read-only
//! afterward, so one analyzer can serve concurrent
//! [`analyze`](Analyzer::analyze) calls.
//!
//! The parse phase scans a token window left to right: `--name[=value]`
//! long options, bundlable `-abc` short options, and bare-word groups at the
//! start of a window, which recurse with the group's qualified name as the
//! new namespace. Defaults not supplied by the caller are materialized after
//! the scan.
//!
//! # Examples
//!
//! ```
//! use argtree_core::{Analyzer, ArgSpec, Value};
//!
//! let analyzer = Analyzer::builder()
//!     .arg(ArgSpec::value_with_defaults("bpm", ["120"]).short('b'))
//!     .arg(ArgSpec::flag("verbose").short('v'))
//!     .build()
//!     .unwrap();
//!
//! let result = analyzer.analyze(["metronome", "-b", "90", "-v"]).unwrap();
//! assert_eq!(result.value("bpm"), Some(&Value::scalar("90")));
//! assert!(result.contains_flag("verbose"));
//!
//! // Omitted defaults are materialized after the scan.
//! let result = analyzer.analyze(["metronome", "-v"]).unwrap();
//! assert_eq!(result.value("bpm"), Some(&Value::scalar("120")));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, trace};

use crate::error::ArgError;
use crate::help::{DefaultHelpRenderer, HelpInfo, HelpRenderer};
use crate::result::ParseResult;
use crate::spec::{ArgCallback, ArgKind, ArgSpec, HelpText};
use crate::value::Value;

/// Compiled per-name record: arity, callback, and the help-scope marker set
/// on synthesized `-h`/`--help` entries.
struct ArgEntry {
    arity: usize,
    callback: Option<ArgCallback>,
    help_scope: Option<String>,
}

/// Help bookkeeping, present only when a renderer was installed.
struct HelpTables {
    renderer: Box<dyn HelpRenderer>,
    program: HelpInfo,
    per_scope: HashMap<String, Vec<HelpInfo>>,
    group_infos: HashMap<String, HelpInfo>,
}

/// Joins a namespace and a marked local name into a qualified name.
fn join(namespace: &str, local: &str) -> String {
    if namespace.is_empty() {
        local.to_string()
    } else {
        format!("{namespace}::{local}")
    }
}

/// Namespaced key for a short name.
fn short_key(namespace: &str, short: char) -> String {
    if namespace.is_empty() {
        format!("-{short}")
    } else {
        format!("{namespace}::-{short}")
    }
}

/// Rewrites whitespace in a declared name to hyphens.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Derives the help display name from argv element 0: basename with the
/// extension stripped.
fn display_name(path: &str) -> &str {
    let mut begin = 0;
    let mut end = 0;
    for (i, c) in path.char_indices() {
        if c == '/' || c == '\\' {
            begin = i + c.len_utf8();
            end = begin;
        } else if c == '.' {
            end = i;
        }
    }
    if end == begin {
        end = path.len();
    }
    &path[begin..end]
}

/// Shapes `arity` consumed tokens into a value: a scalar for arity 1, a
/// sequence above that.
fn collect_value(tokens: &[String], arity: usize) -> Value {
    if arity == 1 {
        Value::scalar(tokens[0].clone())
    } else {
        Value::Sequence(tokens.iter().map(|t| Value::scalar(t.clone())).collect())
    }
}

/// Builder for [`Analyzer`].
///
/// Collects root specs, the program's own trailing arity or default list,
/// and the optional help renderer, then flattens everything in
/// [`build`](AnalyzerBuilder::build).
#[derive(Default)]
pub struct AnalyzerBuilder {
    program_arity: usize,
    program_defaults: Option<Vec<String>>,
    program_help: Option<HelpText>,
    renderer: Option<Box<dyn HelpRenderer>>,
    roots: Vec<ArgSpec>,
}

impl AnalyzerBuilder {
    /// Sets the number of trailing value tokens the program itself consumes.
    pub fn program_arity(mut self, arity: usize) -> Self {
        self.program_arity = arity;
        self.program_defaults = None;
        self
    }

    /// Sets the program's trailing arity and default content from an
    /// explicit default list. An empty list clears both.
    pub fn program_defaults<I, S>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let defaults: Vec<String> = defaults.into_iter().map(Into::into).collect();
        self.program_arity = defaults.len();
        self.program_defaults = if defaults.is_empty() {
            None
        } else {
            Some(defaults)
        };
        self
    }

    /// Attaches the program's help payload.
    pub fn program_help(mut self, help: HelpText) -> Self {
        self.program_help = Some(help);
        self
    }

    /// Installs a help renderer, enabling HelpInfo collection and
    /// `-h`/`--help` synthesis per namespace.
    pub fn renderer(mut self, renderer: Box<dyn HelpRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Installs the [`DefaultHelpRenderer`].
    pub fn with_help(self) -> Self {
        self.renderer(Box::new(DefaultHelpRenderer::new()))
    }

    /// Adds a root spec.
    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.roots.push(spec);
        self
    }

    /// Adds several root specs.
    pub fn args(mut self, specs: impl IntoIterator<Item = ArgSpec>) -> Self {
        self.roots.extend(specs);
        self
    }

    /// Flattens the spec forest into compiled lookup tables.
    ///
    /// Fails fast with [`ArgError::DuplicateName`] /
    /// [`ArgError::DuplicateShortName`] when two siblings collide in one
    /// namespace. Runs once, in O(tree size); no token scanning happens
    /// here.
    pub fn build(self) -> Result<Analyzer, ArgError> {
        let mut analyzer = Analyzer {
            entries: HashMap::new(),
            short_names: HashMap::new(),
            default_flags: HashSet::new(),
            default_values: HashMap::new(),
            help: None,
        };

        // Synthetic entry for the program itself.
        analyzer.entries.insert(
            String::new(),
            ArgEntry {
                arity: self.program_arity,
                callback: None,
                help_scope: None,
            },
        );
        let program_defaults = self.program_defaults.map(|defaults| {
            if defaults.len() == 1 {
                Value::scalar(defaults[0].clone())
            } else {
                Value::sequence(defaults)
            }
        });
        if let Some(value) = &program_defaults {
            analyzer
                .default_values
                .insert(String::new(), value.clone());
        }

        if let Some(renderer) = self.renderer {
            analyzer.help = Some(HelpTables {
                renderer,
                program: HelpInfo {
                    name: String::new(),
                    short: None,
                    is_default: false,
                    arity: self.program_arity,
                    defaults: program_defaults,
                    text: self.program_help,
                },
                per_scope: HashMap::new(),
                group_infos: HashMap::new(),
            });
            analyzer.register_help_entry("")?;
        }

        for root in &self.roots {
            analyzer.register(root, "")?;
        }
        debug!(
            entries = analyzer.entries.len(),
            shorts = analyzer.short_names.len(),
            "compiled argument tables"
        );
        Ok(analyzer)
    }
}

/// Compiled argument tables plus the argv scanner.
///
/// Construction owns flattening; the spec trees are not retained. See the
/// [module docs](self) for the scan grammar.
pub struct Analyzer {
    entries: HashMap<String, ArgEntry>,
    short_names: HashMap<String, String>,
    default_flags: HashSet<String>,
    default_values: HashMap<String, Value>,
    help: Option<HelpTables>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("entries", &self.entries.keys())
            .field("short_names", &self.short_names)
            .field("default_flags", &self.default_flags)
            .field("default_values", &self.default_values)
            .field("has_help", &self.help.is_some())
            .finish()
    }
}

impl Analyzer {
    /// Starts a builder.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    /// Builds an analyzer from root specs with no program arity and no help.
    pub fn new(specs: impl IntoIterator<Item = ArgSpec>) -> Result<Self, ArgError> {
        Self::builder().args(specs).build()
    }

    fn register(&mut self, spec: &ArgSpec, namespace: &str) -> Result<(), ArgError> {
        let local = match spec.kind() {
            ArgKind::Group => sanitize(spec.name()),
            _ => format!("--{}", sanitize(spec.name())),
        };
        let qualified = join(namespace, &local);

        if let Some(short) = spec.short_name() {
            let key = short_key(namespace, short);
            if self.short_names.contains_key(&key) {
                return Err(ArgError::DuplicateShortName(key));
            }
            self.short_names.insert(key, qualified.clone());
        }

        if self.entries.contains_key(&qualified) {
            return Err(ArgError::DuplicateName(qualified));
        }
        let arity = spec.arity();
        self.entries.insert(
            qualified.clone(),
            ArgEntry {
                arity,
                callback: spec.callback().cloned(),
                help_scope: None,
            },
        );

        if spec.is_default_flag() {
            self.default_flags.insert(qualified.clone());
        }
        if let Some(value) = spec.default_value() {
            self.default_values.insert(qualified.clone(), value);
        }

        if let Some(help) = &mut self.help {
            let info = HelpInfo {
                name: local,
                short: spec.short_name(),
                is_default: spec.is_default_flag(),
                arity,
                defaults: spec.default_value(),
                text: spec.help_text().cloned(),
            };
            help.per_scope
                .entry(namespace.to_string())
                .or_default()
                .push(info.clone());
            if spec.kind() == ArgKind::Group {
                help.group_infos.insert(qualified.clone(), info);
            }
        }

        if let Some(children) = spec.children() {
            if self.help.is_some() {
                self.register_help_entry(&qualified)?;
            }
            for child in children {
                self.register(child, &qualified)?;
            }
        }
        Ok(())
    }

    /// Synthesizes the `-h`/`--help` entry for one namespace.
    fn register_help_entry(&mut self, namespace: &str) -> Result<(), ArgError> {
        let qualified = join(namespace, "--help");
        let short = short_key(namespace, 'h');
        if self.entries.contains_key(&qualified) {
            return Err(ArgError::DuplicateName(qualified));
        }
        if self.short_names.contains_key(&short) {
            return Err(ArgError::DuplicateShortName(short));
        }
        self.short_names.insert(short, qualified.clone());
        self.entries.insert(
            qualified,
            ArgEntry {
                arity: 0,
                callback: None,
                help_scope: Some(namespace.to_string()),
            },
        );
        Ok(())
    }

    /// Scans an argument vector against the compiled tables.
    ///
    /// Element 0 only feeds the help display name (basename, extension
    /// stripped); scanning starts at element 1. Callbacks fire in strict
    /// left-to-right token order during the scan; defaults missing from the
    /// input are materialized afterward (values first, then flags, each in
    /// the compiled table's unspecified iteration order).
    ///
    /// When exactly one token is supplied the scan short-circuits to an
    /// empty result: no callbacks, and — deliberately preserved, surprising
    /// behavior — no default materialization either.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::{Analyzer, ArgSpec};
    ///
    /// let analyzer = Analyzer::builder()
    ///     .arg(ArgSpec::value_with_defaults("bpm", ["120"]))
    ///     .build()
    ///     .unwrap();
    ///
    /// // One token: empty result, defaults skipped.
    /// let result = analyzer.analyze(["metronome"]).unwrap();
    /// assert!(result.is_empty());
    ///
    /// // Unknown options fail with the offending token.
    /// let err = analyzer.analyze(["metronome", "--bad-flag"]).unwrap_err();
    /// assert!(err.to_string().contains("--bad-flag"));
    /// ```
    pub fn analyze<I, S>(&self, argv: I) -> Result<ParseResult, ArgError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = argv.into_iter().map(Into::into).collect();
        let mut result = ParseResult::default();
        if tokens.len() <= 1 {
            return Ok(result);
        }

        let program_name = display_name(&tokens[0]);
        trace!(program = program_name, tokens = tokens.len() - 1, "scan start");

        let window = &tokens[1..];
        let program = self.entry("")?;
        let scan_len = if program.arity > 0 {
            window
                .len()
                .checked_sub(program.arity)
                .ok_or(ArgError::ExpectedProgramValues)?
        } else {
            window.len()
        };

        let scan = &window[..scan_len];
        let mut pos = 0;
        while pos < scan.len() {
            self.read_arg(scan, &mut pos, "", &mut result, program_name)?;
            pos += 1;
        }

        if program.arity > 0 {
            let value = collect_value(&window[scan_len..], program.arity);
            result.set_program(value);
        }

        self.apply_defaults(&mut result);
        Ok(result)
    }

    fn entry(&self, name: &str) -> Result<&ArgEntry, ArgError> {
        self.entries
            .get(name)
            .ok_or_else(|| ArgError::UnrecognizedArgument(name.to_string()))
    }

    /// Fires the entry's side effects: a synthesized help entry prints its
    /// namespace's usage block, a user callback receives the parsed value.
    fn fire(&self, entry: &ArgEntry, value: &Value, program_name: &str) {
        if let Some(scope) = &entry.help_scope {
            self.print_help(scope, program_name);
        }
        if let Some(callback) = &entry.callback {
            callback(value);
        }
    }

    fn print_help(&self, scope: &str, program_name: &str) {
        let Some(help) = &self.help else { return };
        let options = help
            .per_scope
            .get(scope)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if scope.is_empty() {
            let message = help.renderer.render(program_name, &help.program, options);
            println!("{message}");
            return;
        }
        let Some(info) = help.group_infos.get(scope) else {
            return;
        };
        let mut display = program_name.to_string();
        for segment in scope.split("::") {
            display.push(' ');
            display.push_str(segment);
        }
        let message = help.renderer.render(&display, info, options);
        println!("{message}");
    }

    /// Dispatches one token of the current window.
    fn read_arg(
        &self,
        window: &[String],
        pos: &mut usize,
        namespace: &str,
        out: &mut ParseResult,
        program_name: &str,
    ) -> Result<(), ArgError> {
        let token = &window[*pos];
        if token.starts_with("--") {
            self.read_long(window, pos, namespace, out, program_name)
        } else if token.starts_with('-') {
            self.read_short(window, pos, namespace, out, program_name)
        } else if *pos == 0 {
            // Groups are only recognized at the start of their window.
            self.read_group(window, pos, namespace, out, program_name)
        } else {
            Err(ArgError::UnrecognizedArgument(token.clone()))
        }
    }

    /// `--name`, `--name=value`, or `--name v0 … vN-1`.
    fn read_long(
        &self,
        window: &[String],
        pos: &mut usize,
        namespace: &str,
        out: &mut ParseResult,
        program_name: &str,
    ) -> Result<(), ArgError> {
        let token = &window[*pos];
        let (name_part, eq_value) = match token.find('=') {
            Some(i) => (&token[..i], Some(&token[i + 1..])),
            None => (token.as_str(), None),
        };
        let qualified = join(namespace, name_part);
        let entry = self.entry(&qualified)?;
        trace!(name = %qualified, arity = entry.arity, "long option");

        let value = match entry.arity {
            0 => Value::Null,
            1 => match eq_value {
                Some(text) => Value::scalar(text),
                None => {
                    *pos += 1;
                    if *pos >= window.len() {
                        return Err(ArgError::ExpectedValue);
                    }
                    Value::scalar(window[*pos].clone())
                }
            },
            n => {
                let mut items = Vec::with_capacity(n);
                for _ in 0..n {
                    *pos += 1;
                    if *pos >= window.len() {
                        return Err(ArgError::ExpectedValue);
                    }
                    items.push(Value::scalar(window[*pos].clone()));
                }
                Value::Sequence(items)
            }
        };

        if entry.arity == 0 {
            out.insert_flag(qualified);
        } else {
            out.insert_value(qualified, value.clone());
        }
        self.fire(entry, &value, program_name);
        Ok(())
    }

    /// A `-xyz` bundle: each character resolves independently; a short with
    /// nonzero arity consumes its value tokens and ends the bundle.
    fn read_short(
        &self,
        window: &[String],
        pos: &mut usize,
        namespace: &str,
        out: &mut ParseResult,
        program_name: &str,
    ) -> Result<(), ArgError> {
        let bundle = &window[*pos];
        for c in bundle.chars().skip(1) {
            let key = short_key(namespace, c);
            let qualified = self
                .short_names
                .get(&key)
                .ok_or_else(|| ArgError::UnrecognizedArgument(format!("-{c}")))?;
            let entry = self.entry(qualified)?;
            trace!(name = %qualified, arity = entry.arity, "short option");

            if entry.arity == 0 {
                out.insert_flag(qualified.clone());
                self.fire(entry, &Value::Null, program_name);
                continue;
            }

            let value = if entry.arity == 1 {
                *pos += 1;
                if *pos >= window.len() {
                    return Err(ArgError::ExpectedValue);
                }
                Value::scalar(window[*pos].clone())
            } else {
                let mut items = Vec::with_capacity(entry.arity);
                for _ in 0..entry.arity {
                    *pos += 1;
                    if *pos >= window.len() {
                        return Err(ArgError::ExpectedValue);
                    }
                    items.push(Value::scalar(window[*pos].clone()));
                }
                Value::Sequence(items)
            };
            out.insert_value(qualified.clone(), value.clone());
            self.fire(entry, &value, program_name);
            break;
        }
        Ok(())
    }

    /// A bare-word group: recurse over the sub-window under the group's
    /// qualified name, then consume the group's own trailing values.
    fn read_group(
        &self,
        window: &[String],
        pos: &mut usize,
        namespace: &str,
        out: &mut ParseResult,
        program_name: &str,
    ) -> Result<(), ArgError> {
        let token = &window[*pos];
        let qualified = join(namespace, token);
        let entry = self.entry(&qualified)?;
        trace!(name = %qualified, arity = entry.arity, "group");

        let after = *pos + 1;
        let available = window.len() - after;
        let sub_len = available
            .checked_sub(entry.arity)
            .ok_or_else(|| ArgError::ExpectedGroupValues(token.clone()))?;

        let sub = &window[after..after + sub_len];
        let mut sub_pos = 0;
        while sub_pos < sub.len() {
            self.read_arg(sub, &mut sub_pos, &qualified, out, program_name)?;
            sub_pos += 1;
        }

        let value = if entry.arity > 0 {
            Some(collect_value(&window[after + sub_len..], entry.arity))
        } else {
            None
        };
        out.insert_group(qualified, value.clone());
        self.fire(entry, &value.unwrap_or(Value::Null), program_name);

        // The group consumed the rest of the window.
        *pos = window.len() - 1;
        Ok(())
    }

    /// Materializes defaults missing from the result: the value pass, then
    /// the flag pass. Each pass walks the compiled table in its unspecified
    /// iteration order; every missing default is applied exactly once and
    /// its callback fired with the default content.
    fn apply_defaults(&self, out: &mut ParseResult) {
        for (name, value) in &self.default_values {
            if name.is_empty() {
                if !out.has_program() {
                    out.set_program(value.clone());
                }
                continue;
            }
            if out.contains_qualified_value(name) || out.contains_qualified_group(name) {
                continue;
            }
            out.insert_value(name.clone(), value.clone());
            if let Some(entry) = self.entries.get(name) {
                if let Some(callback) = &entry.callback {
                    callback(value);
                }
            }
        }
        for name in &self.default_flags {
            if out.contains_qualified_flag(name) {
                continue;
            }
            out.insert_flag(name.clone());
            if let Some(entry) = self.entries.get(name) {
                if let Some(callback) = &entry.callback {
                    callback(&Value::Null);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    fn bpm_verbose() -> Analyzer {
        Analyzer::builder()
            .arg(ArgSpec::value_with_defaults("bpm", ["120"]).short('b'))
            .arg(ArgSpec::flag("verbose").short('v'))
            .build()
            .expect("spec should flatten")
    }

    #[test]
    fn duplicate_sibling_names_fail_at_build() {
        let err = Analyzer::new([ArgSpec::flag("x"), ArgSpec::value("x", 1)]).unwrap_err();
        assert_eq!(err, ArgError::DuplicateName("--x".to_string()));
    }

    #[test]
    fn duplicate_short_names_fail_at_build() {
        let err = Analyzer::new([
            ArgSpec::flag("first").short('f'),
            ArgSpec::flag("second").short('f'),
        ])
        .unwrap_err();
        assert_eq!(err, ArgError::DuplicateShortName("-f".to_string()));
    }

    #[test]
    fn same_name_in_different_namespaces_is_fine() {
        let analyzer = Analyzer::new([
            ArgSpec::flag("force"),
            ArgSpec::group("remote", vec![ArgSpec::flag("force")]),
        ])
        .expect("namespaces keep siblings apart");
        let result = analyzer.analyze(["prog", "remote", "--force"]).unwrap();
        assert!(result.contains_flag("remote.force"));
        assert!(!result.contains_flag("force"));
    }

    #[test]
    fn single_value_round_trip() {
        let analyzer = bpm_verbose();
        let spaced = analyzer.analyze(["prog", "--bpm", "90"]).unwrap();
        let equals = analyzer.analyze(["prog", "--bpm=90"]).unwrap();
        assert_eq!(spaced.value("bpm"), Some(&Value::scalar("90")));
        assert_eq!(spaced, equals);
    }

    #[test]
    fn multi_value_round_trip() {
        let analyzer = Analyzer::new([ArgSpec::value("range", 3)]).unwrap();
        let result = analyzer
            .analyze(["prog", "--range", "1", "2", "3"])
            .unwrap();
        assert_eq!(result.value("range"), Some(&Value::sequence(["1", "2", "3"])));
    }

    #[test]
    fn missing_value_at_end_fails() {
        let analyzer = bpm_verbose();
        let err = analyzer.analyze(["prog", "--bpm"]).unwrap_err();
        assert_eq!(err, ArgError::ExpectedValue);
    }

    #[test]
    fn unknown_long_option_fails_with_token() {
        let analyzer = bpm_verbose();
        let err = analyzer.analyze(["prog", "--bad-flag"]).unwrap_err();
        assert_eq!(
            err,
            ArgError::UnrecognizedArgument("--bad-flag".to_string())
        );
    }

    #[test]
    fn end_to_end_bpm_scenario() {
        let analyzer = bpm_verbose();
        let result = analyzer.analyze(["prog", "-b", "90"]).unwrap();
        assert_eq!(result.values().get("--bpm"), Some(&Value::scalar("90")));
        assert!(result.flags().is_empty());
    }

    #[test]
    fn short_bundles_match_separate_shorts() {
        let analyzer = Analyzer::new([
            ArgSpec::flag("all").short('a'),
            ArgSpec::flag("brief").short('b'),
            ArgSpec::value("count", 1).short('n'),
        ])
        .unwrap();
        let bundled = analyzer.analyze(["prog", "-abn", "5"]).unwrap();
        let separate = analyzer
            .analyze(["prog", "-a", "-b", "-n", "5"])
            .unwrap();
        assert_eq!(bundled, separate);
        assert_eq!(bundled.value("count"), Some(&Value::scalar("5")));
        assert!(bundled.contains_flag("all"));
        assert!(bundled.contains_flag("brief"));
    }

    #[test]
    fn unknown_short_fails() {
        let analyzer = bpm_verbose();
        let err = analyzer.analyze(["prog", "-z"]).unwrap_err();
        assert_eq!(err, ArgError::UnrecognizedArgument("-z".to_string()));
    }

    #[test]
    fn group_scopes_its_children() {
        let analyzer = Analyzer::new([ArgSpec::group(
            "remote",
            vec![ArgSpec::flag("prune")],
        )])
        .unwrap();
        let result = analyzer.analyze(["prog", "remote", "--prune"]).unwrap();
        assert!(result.contains_group("remote"));
        assert!(result.contains_flag("remote.prune"));

        // The same flag invoked unqualified at top level is unknown.
        let err = analyzer.analyze(["prog", "--prune"]).unwrap_err();
        assert_eq!(err, ArgError::UnrecognizedArgument("--prune".to_string()));
    }

    #[test]
    fn nested_groups_namespace_recursively() {
        let analyzer = Analyzer::new([ArgSpec::group(
            "remote",
            vec![ArgSpec::group("add", vec![ArgSpec::value("url", 1)])],
        )])
        .unwrap();
        let result = analyzer
            .analyze(["prog", "remote", "add", "--url", "x://y"])
            .unwrap();
        assert!(result.contains_group("remote"));
        assert!(result.contains_group("remote.add"));
        assert_eq!(
            result.value("remote.add.url"),
            Some(&Value::scalar("x://y"))
        );
    }

    #[test]
    fn group_trailing_values_follow_children() {
        let analyzer = Analyzer::new([ArgSpec::group(
            "play",
            vec![ArgSpec::flag("loop").short('l')],
        )
        .trailing(1)])
        .unwrap();
        let result = analyzer
            .analyze(["prog", "play", "-l", "track.opus"])
            .unwrap();
        assert!(result.contains_flag("play.loop"));
        assert_eq!(result.group_value("play"), Some(&Value::scalar("track.opus")));
    }

    #[test]
    fn group_trailing_shortfall_fails_before_descent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let fired = counter.clone();
        let analyzer = Analyzer::new([ArgSpec::group(
            "play",
            vec![ArgSpec::flag("loop").on_parse(move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            })],
        )
        .trailing(2)])
        .unwrap();
        let err = analyzer.analyze(["prog", "play", "only-one"]).unwrap_err();
        assert_eq!(err, ArgError::ExpectedGroupValues("play".to_string()));
        // The arity shortfall is detected before the sub-window is entered.
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bare_word_past_window_start_fails() {
        let analyzer = bpm_verbose();
        let err = analyzer.analyze(["prog", "-v", "stray"]).unwrap_err();
        assert_eq!(err, ArgError::UnrecognizedArgument("stray".to_string()));
    }

    #[test]
    fn program_trailing_values() {
        let analyzer = Analyzer::builder()
            .program_arity(2)
            .arg(ArgSpec::flag("verbose").short('v'))
            .build()
            .unwrap();
        let result = analyzer.analyze(["prog", "-v", "in.txt", "out.txt"]).unwrap();
        assert!(result.contains_flag("verbose"));
        assert_eq!(
            result.program_value(),
            Some(&Value::sequence(["in.txt", "out.txt"]))
        );

        let err = analyzer.analyze(["prog", "in.txt"]).unwrap_err();
        assert_eq!(err, ArgError::ExpectedProgramValues);
    }

    #[test]
    fn one_token_argv_short_circuits_without_defaults() {
        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();
        let analyzer = Analyzer::builder()
            .arg(
                ArgSpec::value_with_defaults("bpm", ["120"]).on_parse(move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .build()
            .unwrap();
        let result = analyzer.analyze(["prog"]).unwrap();
        assert!(result.is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn omitted_default_value_materializes_once() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let analyzer = Analyzer::builder()
            .arg(
                ArgSpec::value_with_defaults("bpm", ["120"]).on_parse(move |v| {
                    sink.lock().unwrap().push(v.clone());
                }),
            )
            .arg(ArgSpec::flag("verbose").short('v'))
            .build()
            .unwrap();

        let result = analyzer.analyze(["prog", "-v"]).unwrap();
        assert_eq!(result.value("bpm"), Some(&Value::scalar("120")));
        let calls = fired.lock().unwrap();
        assert_eq!(calls.as_slice(), &[Value::scalar("120")]);
    }

    #[test]
    fn supplied_value_suppresses_its_default() {
        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();
        let analyzer = Analyzer::builder()
            .arg(
                ArgSpec::value_with_defaults("bpm", ["120"]).on_parse(move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .build()
            .unwrap();
        let result = analyzer.analyze(["prog", "--bpm", "90"]).unwrap();
        assert_eq!(result.value("bpm"), Some(&Value::scalar("90")));
        // Fired for the supplied token only, not again for the default.
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn omitted_default_flag_materializes_with_null() {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let sink = payloads.clone();
        let analyzer = Analyzer::builder()
            .arg(ArgSpec::flag("beep").default_present().on_parse(move |v| {
                sink.lock().unwrap().push(v.clone());
            }))
            .arg(ArgSpec::flag("verbose").short('v'))
            .build()
            .unwrap();
        let result = analyzer.analyze(["prog", "-v"]).unwrap();
        assert!(result.contains_flag("beep"));
        assert_eq!(payloads.lock().unwrap().as_slice(), &[Value::Null]);
    }

    #[test]
    fn defaults_under_absent_groups_still_apply() {
        let analyzer = Analyzer::new([ArgSpec::group(
            "remote",
            vec![ArgSpec::value_with_defaults("timeout", ["30"])],
        )])
        .unwrap();
        let result = analyzer.analyze(["prog", "remote"]).unwrap();
        assert_eq!(result.value("remote.timeout"), Some(&Value::scalar("30")));

        // Even without the group on the command line.
        let analyzer2 = Analyzer::new([
            ArgSpec::flag("verbose").short('v'),
            ArgSpec::group("remote", vec![ArgSpec::value_with_defaults("timeout", ["30"])]),
        ])
        .unwrap();
        let result = analyzer2.analyze(["prog", "-v"]).unwrap();
        assert_eq!(result.value("remote.timeout"), Some(&Value::scalar("30")));
    }

    #[test]
    fn callbacks_fire_in_token_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let a_sink = order.clone();
        let b_sink = order.clone();
        let analyzer = Analyzer::new([
            ArgSpec::flag("alpha").short('a').on_parse(move |_| {
                a_sink.lock().unwrap().push("alpha");
            }),
            ArgSpec::flag("beta").short('b').on_parse(move |_| {
                b_sink.lock().unwrap().push("beta");
            }),
        ])
        .unwrap();
        analyzer.analyze(["prog", "-b", "-a"]).unwrap();
        assert_eq!(order.lock().unwrap().as_slice(), &["beta", "alpha"]);
    }

    #[test]
    fn declared_names_with_spaces_match_hyphenated_tokens() {
        let analyzer = Analyzer::new([ArgSpec::flag("dry run")]).unwrap();
        let result = analyzer.analyze(["prog", "--dry-run"]).unwrap();
        assert!(result.contains_flag("dry-run"));
    }

    #[test]
    fn help_synthesis_collides_with_user_help_flag() {
        let err = Analyzer::builder()
            .with_help()
            .arg(ArgSpec::flag("help"))
            .build()
            .unwrap_err();
        assert_eq!(err, ArgError::DuplicateName("--help".to_string()));
    }

    #[test]
    fn help_entries_resolve_per_namespace() {
        let analyzer = Analyzer::builder()
            .with_help()
            .arg(ArgSpec::group("remote", vec![ArgSpec::flag("prune")]))
            .build()
            .unwrap();
        // Root and group help flags both parse without error.
        let root = analyzer.analyze(["prog", "--help"]).unwrap();
        assert!(root.contains_flag("help"));
        let nested = analyzer.analyze(["prog", "remote", "-h"]).unwrap();
        assert!(nested.contains_flag("remote.help"));
    }

    #[test]
    fn without_renderer_help_is_unknown() {
        let analyzer = bpm_verbose();
        let err = analyzer.analyze(["prog", "--help"]).unwrap_err();
        assert_eq!(err, ArgError::UnrecognizedArgument("--help".to_string()));
    }

    #[test]
    fn display_name_strips_path_and_extension() {
        assert_eq!(display_name("/usr/bin/metronome"), "metronome");
        assert_eq!(display_name("C:\\tools\\metronome.exe"), "metronome");
        assert_eq!(display_name("metronome"), "metronome");
        assert_eq!(display_name("./target/debug/metronome"), "metronome");
    }
}
