use std::fs;
use std::path::{Path, PathBuf};

use argtree_core::{Analyzer, DefaultHelpRenderer, HelpText};
use clap::{Args, Parser, Subcommand};

mod spec_file;

use spec_file::SpecFile;

#[derive(Debug, Parser)]
#[command(name = "argtree")]
#[command(about = "Check and exercise declarative argument trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate an argument tree file.
    Check(CheckArgs),
    /// Scan tokens against an argument tree and print the result as JSON.
    Parse(ParseArgs),
    /// Render the generated help block for the tree root or one group.
    HelpPreview(HelpPreviewArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Argument tree JSON file.
    file: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Argument tree JSON file.
    file: PathBuf,
    /// Program name reported to the scanner.
    #[arg(long, default_value = "argtree")]
    program: String,
    /// Tokens to scan.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpPreviewArgs {
    /// Argument tree JSON file.
    file: PathBuf,
    /// Dotted group path to render instead of the root.
    #[arg(long)]
    group: Option<String>,
    /// Fixed layout width instead of the terminal width.
    #[arg(long)]
    width: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Parse(args) => run_parse(args),
        Command::HelpPreview(args) => run_help_preview(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_tree(path: &Path) -> Result<SpecFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("Invalid tree file '{}': {err}", path.display()))
}

/// Builds an analyzer from a loaded tree. `width` only matters when help
/// rendering is enabled.
fn build_analyzer(file: SpecFile, with_help: bool, width: Option<usize>) -> Result<Analyzer, String> {
    let mut builder = Analyzer::builder();
    builder = match file.program.defaults {
        Some(defaults) => builder.program_defaults(defaults),
        None => builder.program_arity(file.program.arity),
    };
    if let Some(description) = file.program.description {
        let mut text = HelpText::new(description);
        if let Some(long) = file.program.long_description {
            text = text.long(long);
        }
        builder = builder.program_help(text);
    }
    if with_help {
        let mut renderer = DefaultHelpRenderer::new();
        if let Some(width) = width {
            renderer = renderer.with_width(width);
        }
        builder = builder.renderer(Box::new(renderer));
    }
    builder
        .args(file.args.into_iter().map(Into::into))
        .build()
        .map_err(|err| format!("Invalid argument tree: {err}"))
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let file = load_tree(&args.file)?;
    let nodes = file.node_count();
    build_analyzer(file, true, None)?;
    println!("Argument tree OK: {nodes} named argument(s).");
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let file = load_tree(&args.file)?;
    let analyzer = build_analyzer(file, false, None)?;

    let argv = std::iter::once(args.program).chain(args.tokens);
    let result = analyzer.analyze(argv).map_err(|err| err.to_string())?;

    let json = serde_json::to_string_pretty(&result)
        .map_err(|err| format!("Failed to serialize result: {err}"))?;
    println!("{json}");
    Ok(())
}

fn run_help_preview(args: HelpPreviewArgs) -> Result<(), String> {
    let file = load_tree(&args.file)?;

    // Drive the synthesized help entry through the normal scan path. Group
    // and program trailing arities still demand value tokens, so pad the
    // vector with placeholders the scanner can consume.
    let mut argv = vec!["argtree".to_string()];
    let mut padding: Vec<String> = Vec::new();
    if let Some(group) = &args.group {
        let arities = group_trailing_arities(&file, group)?;
        argv.extend(group.split('.').map(ToOwned::to_owned));
        for arity in arities.iter().rev() {
            padding.extend(std::iter::repeat_n("_".to_string(), *arity));
        }
    }
    argv.push("-h".to_string());
    argv.append(&mut padding);
    let program_arity = file
        .program
        .defaults
        .as_ref()
        .map(Vec::len)
        .unwrap_or(file.program.arity);
    argv.extend(std::iter::repeat_n("_".to_string(), program_arity));

    let analyzer = build_analyzer(file, true, args.width)?;
    analyzer.analyze(argv).map_err(|err| err.to_string())?;
    Ok(())
}

/// Trailing arities of each group along a dotted path, outermost first.
fn group_trailing_arities(file: &SpecFile, path: &str) -> Result<Vec<usize>, String> {
    let mut nodes = &file.args;
    let mut arities = Vec::new();
    for segment in path.split('.') {
        let found = nodes
            .iter()
            .find_map(|node| match node {
                spec_file::ArgNode::Group {
                    name,
                    args,
                    trailing,
                    trailing_defaults,
                    ..
                } if name == segment => {
                    let arity = trailing_defaults.as_ref().map(Vec::len).unwrap_or(*trailing);
                    Some((args, arity))
                }
                _ => None,
            })
            .ok_or_else(|| format!("Unknown group '{path}'"))?;
        nodes = found.0;
        arities.push(found.1);
    }
    Ok(arities)
}
