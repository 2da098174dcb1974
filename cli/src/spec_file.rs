//! JSON model for argument tree files.
//!
//! A tree file declares the program section (its own trailing arity or
//! default values, plus descriptions) and a list of argument nodes tagged by
//! `kind`: `flag`, `value`, or `group`. The model is CLI-local; nodes convert
//! into [`ArgSpec`] values for the engine.

use argtree_core::{ArgSpec, HelpText};
use serde::Deserialize;

/// Top-level shape of a tree file.
#[derive(Debug, Deserialize)]
pub struct SpecFile {
    #[serde(default)]
    pub program: ProgramSection,
    #[serde(default)]
    pub args: Vec<ArgNode>,
}

/// The program's own settings.
#[derive(Debug, Default, Deserialize)]
pub struct ProgramSection {
    /// Trailing value tokens the program itself consumes.
    #[serde(default)]
    pub arity: usize,
    /// Default content for those tokens; overrides `arity` with its length.
    #[serde(default)]
    pub defaults: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
}

/// One declared argument.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArgNode {
    Flag {
        name: String,
        #[serde(default)]
        short: Option<char>,
        #[serde(default)]
        default_present: bool,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        long_description: Option<String>,
    },
    Value {
        name: String,
        #[serde(default = "default_arity")]
        arity: usize,
        #[serde(default)]
        short: Option<char>,
        #[serde(default)]
        defaults: Option<Vec<String>>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        long_description: Option<String>,
    },
    Group {
        name: String,
        #[serde(default)]
        args: Vec<ArgNode>,
        #[serde(default)]
        trailing: usize,
        #[serde(default)]
        trailing_defaults: Option<Vec<String>>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        long_description: Option<String>,
    },
}

fn default_arity() -> usize {
    1
}

fn help_text(description: Option<String>, long: Option<String>) -> Option<HelpText> {
    let mut text = HelpText::new(description?);
    if let Some(long) = long {
        text = text.long(long);
    }
    Some(text)
}

impl From<ArgNode> for ArgSpec {
    fn from(node: ArgNode) -> Self {
        match node {
            ArgNode::Flag {
                name,
                short,
                default_present,
                description,
                long_description,
            } => {
                let mut spec = ArgSpec::flag(name);
                if let Some(c) = short {
                    spec = spec.short(c);
                }
                if default_present {
                    spec = spec.default_present();
                }
                if let Some(text) = help_text(description, long_description) {
                    spec = spec.help(text);
                }
                spec
            }
            ArgNode::Value {
                name,
                arity,
                short,
                defaults,
                description,
                long_description,
            } => {
                let mut spec = match defaults {
                    Some(defaults) => ArgSpec::value_with_defaults(name, defaults),
                    None => ArgSpec::value(name, arity),
                };
                if let Some(c) = short {
                    spec = spec.short(c);
                }
                if let Some(text) = help_text(description, long_description) {
                    spec = spec.help(text);
                }
                spec
            }
            ArgNode::Group {
                name,
                args,
                trailing,
                trailing_defaults,
                description,
                long_description,
            } => {
                let children = args.into_iter().map(Into::into).collect();
                let mut spec = ArgSpec::group(name, children);
                spec = match trailing_defaults {
                    Some(defaults) => spec.trailing_defaults(defaults),
                    None => spec.trailing(trailing),
                };
                if let Some(text) = help_text(description, long_description) {
                    spec = spec.help(text);
                }
                spec
            }
        }
    }
}

impl SpecFile {
    /// Number of named argument nodes in the tree, groups included.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[ArgNode]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    ArgNode::Group { args, .. } => 1 + count(args),
                    _ => 1,
                })
                .sum()
        }
        count(&self.args)
    }
}
