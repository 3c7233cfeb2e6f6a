//! Sapling CLI - lay out a JSON node tree and print the result.

#![allow(
    clippy::needless_pass_by_value,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

mod tree;

use clap::{Parser, Subcommand, ValueEnum};
use sapling::prelude::*;
use sapling::{LayoutStats, LogLevel};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use thiserror::Error;

use crate::tree::NodeSpec;

#[derive(Parser)]
#[command(name = "sapling")]
#[command(about = "Flexbox layout for JSON node trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a node tree and print the resulting boxes
    Layout(LayoutArgs),
}

#[derive(clap::Args, Debug)]
struct LayoutArgs {
    /// Path to the JSON node tree
    file: PathBuf,

    /// Available width (default: unbounded)
    #[arg(long)]
    width: Option<f32>,

    /// Available height (default: unbounded)
    #[arg(long)]
    height: Option<f32>,

    /// Inline direction of the root
    #[arg(short, long, value_enum, default_value = "ltr")]
    direction: DirectionArg,

    /// Physical pixels per point; 0 disables rounding
    #[arg(short, long, default_value = "1")]
    scale: f32,

    /// Use CSS defaults for new nodes
    #[arg(long)]
    web_defaults: bool,

    /// Stretch children the way older engine releases did
    #[arg(long)]
    legacy_stretch: bool,

    /// Include non-default style properties in the output
    #[arg(long)]
    style: bool,

    /// Write engine log lines and cache statistics to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Ltr,
    Rtl,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Ltr => Self::Ltr,
            DirectionArg::Rtl => Self::Rtl,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid node tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Layout(args) => run_layout(&args),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn stderr_logger() -> sapling::Logger {
    Rc::new(|node, level: LogLevel, message: &str| match node {
        Some(id) => eprintln!("[{level}] {id:?}: {message}"),
        None => eprintln!("[{level}] {message}"),
    })
}

fn config_from_args(args: &LayoutArgs) -> Result<Config, CliError> {
    let mut config = Config::new()
        .with_point_scale_factor(args.scale)?
        .with_web_defaults(args.web_defaults)
        .with_legacy_stretch_behaviour(args.legacy_stretch);
    if args.verbose {
        config = config.with_logger(stderr_logger());
    }
    Ok(config)
}

fn read_tree(path: &Path) -> Result<NodeSpec, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(NodeSpec::from_json(&text)?)
}

fn print_stats(nodes: usize, stats: &LayoutStats) {
    eprintln!(
        "{nodes} nodes, {} layouts, {} measure calls, {} cache hits ({:.0}%)",
        stats.layouts,
        stats.measure_calls,
        stats.cache_hits,
        stats.hit_rate() * 100.0,
    );
}

fn run_layout(args: &LayoutArgs) -> Result<String, CliError> {
    let spec = read_tree(&args.file)?;
    lay_out(&spec, args)
}

fn lay_out(spec: &NodeSpec, args: &LayoutArgs) -> Result<String, CliError> {
    let mut engine = LayoutEngine::with_config(config_from_args(args)?);
    let root = tree::build(&mut engine, spec)?;

    engine.calculate_layout(
        root,
        args.width.unwrap_or(f32::NAN),
        args.height.unwrap_or(f32::NAN),
        args.direction.into(),
    )?;

    if args.verbose {
        print_stats(spec.len(), engine.stats());
    }

    let mut options = PrintOptions::LAYOUT | PrintOptions::CHILDREN;
    if args.style {
        options |= PrintOptions::STYLE;
    }
    Ok(engine.node_to_string(root, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> LayoutArgs {
        let argv = ["sapling", "layout", "tree.json"].iter().chain(extra).copied();
        match Cli::parse_from(argv).command {
            Commands::Layout(args) => args,
        }
    }

    #[test]
    fn test_cli_defaults() {
        let args = args(&[]);
        assert_eq!(args.file, PathBuf::from("tree.json"));
        assert_eq!(args.width, None);
        assert_eq!(args.direction, DirectionArg::Ltr);
        assert_eq!(args.scale, 1.0);
        assert!(!args.web_defaults && !args.style && !args.verbose);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = args(&[
            "--width",
            "320",
            "--direction",
            "rtl",
            "--scale",
            "2",
            "--web-defaults",
            "--style",
        ]);
        assert_eq!(args.width, Some(320.0));
        assert_eq!(Direction::from(args.direction), Direction::Rtl);
        assert_eq!(args.scale, 2.0);
        assert!(args.web_defaults && args.style);
    }

    #[test]
    fn test_cli_config_from_args() {
        let config = config_from_args(&args(&["--web-defaults", "--legacy-stretch"])).unwrap();
        assert!(config.use_web_defaults());
        assert!(config.use_legacy_stretch_behaviour());
        assert_eq!(config.point_scale_factor(), 1.0);
    }

    #[test]
    fn test_cli_negative_scale_is_layout_error() {
        let err = config_from_args(&args(&["--scale=-1"])).unwrap_err();
        assert!(matches!(
            err,
            CliError::Layout(LayoutError::NegativeScaleFactor(_))
        ));
    }

    #[test]
    fn test_cli_lay_out_rtl_row() {
        let spec = NodeSpec::from_json(
            r#"{
                "style": { "flex-direction": "row", "height": { "point": 10 } },
                "children": [
                    { "style": { "width": { "point": 30 } } },
                    { "style": { "width": { "point": 20 } } }
                ]
            }"#,
        )
        .unwrap();
        let output = lay_out(&spec, &args(&["--width", "100", "--direction", "rtl"])).unwrap();
        assert_eq!(
            output,
            "<div layout=\"width: 100; height: 10; top: 0; left: 0;\" >\n  \
             <div layout=\"width: 30; height: 10; top: 0; left: 70;\" ></div>\n  \
             <div layout=\"width: 20; height: 10; top: 0; left: 50;\" ></div>\n</div>"
        );
    }

    #[test]
    fn test_cli_style_flag_adds_style_attribute() {
        let spec = NodeSpec::from_json(r#"{ "style": { "width": { "point": 8 } } }"#).unwrap();
        let output = lay_out(&spec, &args(&["--style"])).unwrap();
        assert!(output.contains("style=\"width: 8px; \""));
    }

    #[test]
    fn test_cli_missing_file_is_io_error() {
        let err = read_tree(Path::new("/nonexistent/sapling/tree.json")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
        assert!(err.to_string().starts_with("failed to read /nonexistent/sapling/tree.json"));
    }
}
