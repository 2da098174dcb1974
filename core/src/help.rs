//! Pluggable help rendering.
//!
//! Help is an optional capability selected at analyzer construction: pass a
//! renderer to [`AnalyzerBuilder::renderer`](crate::AnalyzerBuilder::renderer)
//! (or call [`with_help`](crate::AnalyzerBuilder::with_help)) and the build
//! phase collects [`HelpInfo`] per namespace and synthesizes `-h`/`--help`
//! entries; omit it and no help bookkeeping happens at all.
//!
//! [`DefaultHelpRenderer`] prints a usage line, a description with default
//! annotations, and a column-aligned option list wrapped to the terminal
//! width.

use crate::spec::HelpText;
use crate::value::Value;

/// Display metadata collected for one spec node when help is enabled.
#[derive(Debug, Clone, Default)]
pub struct HelpInfo {
    /// Display name: `--bpm` for options, the bare word for groups, empty
    /// for the program itself.
    pub name: String,
    /// Short name, if any.
    pub short: Option<char>,
    /// Whether the node is an auto-present flag.
    pub is_default: bool,
    /// Number of value tokens the node consumes.
    pub arity: usize,
    /// Declared default content, if any.
    pub defaults: Option<Value>,
    /// Attached help payload, if any.
    pub text: Option<HelpText>,
}

/// Strategy that turns collected [`HelpInfo`] into printable text.
///
/// `info` describes the node whose usage block is being rendered (the
/// program itself or a group); `options` lists its direct children.
pub trait HelpRenderer: Send + Sync {
    /// Renders the usage block for `program_name`.
    fn render(&self, program_name: &str, info: &HelpInfo, options: &[HelpInfo]) -> String;
}

/// Two-column, terminal-width-aware help renderer.
///
/// # Examples
///
/// ```
/// use argtree_core::{DefaultHelpRenderer, HelpInfo, HelpRenderer, HelpText};
///
/// let renderer = DefaultHelpRenderer::new().with_width(60);
/// let program = HelpInfo {
///     text: Some(HelpText::new("A sample tool")),
///     ..Default::default()
/// };
/// let verbose = HelpInfo {
///     name: "--verbose".into(),
///     short: Some('v'),
///     text: Some(HelpText::new("Print more")),
///     ..Default::default()
/// };
/// let message = renderer.render("sample", &program, &[verbose]);
/// assert!(message.starts_with("Usage: sample [Options]..."));
/// assert!(message.contains("-v, --verbose"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultHelpRenderer {
    width: Option<usize>,
}

const OPTIONS_PADDING: usize = 3;
const FALLBACK_WIDTH: usize = 80;

impl DefaultHelpRenderer {
    /// Creates a renderer that queries the terminal width per render.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the layout width instead of querying the terminal.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    fn layout_width(&self) -> usize {
        self.width.unwrap_or_else(|| {
            console::Term::stdout()
                .size_checked()
                .map(|(_, cols)| cols as usize)
                .unwrap_or(FALLBACK_WIDTH)
        })
    }
}

/// `Usage: <name> [Options]... <value…>`.
fn usage_line(name: &str, info: &HelpInfo, has_options: bool) -> String {
    let mut line = format!("Usage: {name}");
    if has_options {
        line.push_str(" [Options]...");
    }
    line.push_str(&value_placeholders(info.arity));
    line
}

/// ` <value>` for arity 1, ` <value0> <value1> …` above that.
fn value_placeholders(arity: usize) -> String {
    match arity {
        0 => String::new(),
        1 => " <value>".to_string(),
        n => (0..n).map(|i| format!(" <value{i}>")).collect(),
    }
}

/// `(default: value="…")` / `(default)` annotation, or empty.
fn default_annotation(info: &HelpInfo) -> String {
    if let Some(defaults) = &info.defaults {
        let mut out = String::from("(default: ");
        match defaults {
            Value::Scalar(text) => out.push_str(&format!("value=\"{text}\"")),
            Value::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        out.push_str(", ");
                    }
                    let text = item.as_str().unwrap_or_default();
                    out.push_str(&format!("value{i}=\"{text}\""));
                }
            }
            Value::Null => {}
        }
        out.push(')');
        out
    } else if info.is_default {
        "(default)".to_string()
    } else {
        String::new()
    }
}

/// Short description plus default annotation, for the option list.
fn option_description(info: &HelpInfo) -> String {
    let description = info.text.as_ref().map(|t| t.description.as_str()).unwrap_or("");
    format!("{description} {}", default_annotation(info))
        .trim_end()
        .to_string()
}

/// Long description (falling back to the short one) plus default annotation,
/// for the usage block's own description line.
fn block_description(info: &HelpInfo) -> String {
    let description = info
        .text
        .as_ref()
        .map(|t| t.long_description.as_deref().unwrap_or(t.description.as_str()))
        .unwrap_or("");
    format!("{description} {}", default_annotation(info))
        .trim_end()
        .to_string()
}

/// `-a, --arg <value0> <value1>` left column for one option.
fn option_usage(info: &HelpInfo) -> String {
    let mut out = match info.short {
        Some(short) => format!("-{short}, "),
        None => " ".repeat(4),
    };
    out.push_str(&info.name);
    out.push_str(&value_placeholders(info.arity));
    out
}

/// End index of the next wrapped chunk of `text[start..]`, breaking after
/// whitespace; a word longer than `width` spills rather than splitting.
fn chunk_end(text: &[char], start: usize, width: usize) -> usize {
    let mut end = start;
    for i in 0.. {
        if start + i == text.len() {
            end = text.len();
            break;
        }
        if i == width && end != start {
            break;
        }
        if text[start + i].is_whitespace() {
            end = start + i + 1;
        }
    }
    if end == start { text.len() } else { end }
}

impl HelpRenderer for DefaultHelpRenderer {
    fn render(&self, program_name: &str, info: &HelpInfo, options: &[HelpInfo]) -> String {
        let mut message = usage_line(program_name, info, !options.is_empty());
        message.push('\n');
        message.push_str(&block_description(info));

        if options.is_empty() {
            return message;
        }
        message.push_str("\n\nOptions:\n");

        let width = self.layout_width().saturating_sub(OPTIONS_PADDING * 2);
        let section = (49 * width) / 100;
        let gap = width.saturating_sub(2 * section);

        for (i, option) in options.iter().enumerate() {
            if i != 0 {
                message.push('\n');
            }
            let usage: Vec<char> = option_usage(option).chars().collect();
            let description: Vec<char> = option_description(option).chars().collect();

            let mut usage_pos = 0;
            let mut desc_pos = 0;
            let mut first = true;
            while usage_pos != usage.len() || desc_pos != description.len() {
                if !first {
                    message.push('\n');
                }
                first = false;
                message.push_str(&" ".repeat(OPTIONS_PADDING));

                if usage_pos != usage.len() {
                    let end = chunk_end(&usage, usage_pos, section);
                    message.extend(&usage[usage_pos..end]);
                    message.push_str(&" ".repeat(section.saturating_sub(end - usage_pos)));
                    usage_pos = end;
                } else {
                    message.push_str(&" ".repeat(section));
                }

                message.push_str(&" ".repeat(gap));

                if desc_pos != description.len() {
                    let end = chunk_end(&description, desc_pos, section);
                    message.extend(&description[desc_pos..end]);
                    message.push_str(&" ".repeat(section.saturating_sub(end - desc_pos)));
                    desc_pos = end;
                } else {
                    message.push_str(&" ".repeat(section));
                }
            }
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, short: Option<char>, description: &str) -> HelpInfo {
        HelpInfo {
            name: name.to_string(),
            short,
            text: Some(HelpText::new(description)),
            ..Default::default()
        }
    }

    #[test]
    fn usage_line_shapes() {
        let program = HelpInfo {
            arity: 2,
            ..Default::default()
        };
        assert_eq!(
            usage_line("prog", &program, true),
            "Usage: prog [Options]... <value0> <value1>"
        );
        let plain = HelpInfo::default();
        assert_eq!(usage_line("prog", &plain, false), "Usage: prog");
    }

    #[test]
    fn default_annotations() {
        let mut flag = HelpInfo::default();
        flag.is_default = true;
        assert_eq!(default_annotation(&flag), "(default)");

        let value = HelpInfo {
            defaults: Some(Value::scalar("120")),
            ..Default::default()
        };
        assert_eq!(default_annotation(&value), "(default: value=\"120\")");

        let multi = HelpInfo {
            defaults: Some(Value::sequence(["a", "b"])),
            ..Default::default()
        };
        assert_eq!(
            default_annotation(&multi),
            "(default: value0=\"a\", value1=\"b\")"
        );
    }

    #[test]
    fn options_are_column_aligned() {
        let renderer = DefaultHelpRenderer::new().with_width(66);
        let program = HelpInfo {
            text: Some(HelpText::new("A metronome")),
            ..Default::default()
        };
        let options = vec![
            info("--verbose", Some('v'), "Print more"),
            info("--bpm", None, "Beats per minute"),
        ];
        let message = renderer.render("metronome", &program, &options);
        assert!(message.starts_with("Usage: metronome [Options]...\nA metronome\n\nOptions:\n"));
        assert!(message.contains("-v, --verbose"));
        // The long-name-only row keeps the short-name column blank.
        assert!(message.contains("       --bpm"));
    }

    #[test]
    fn long_descriptions_wrap() {
        let renderer = DefaultHelpRenderer::new().with_width(40);
        let program = HelpInfo::default();
        let options = vec![info(
            "--wait",
            Some('w'),
            "Seconds to wait before the first trigger fires on startup",
        )];
        let message = renderer.render("prog", &program, &options);
        assert!(message.lines().count() > 3);
    }
}
