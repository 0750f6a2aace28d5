// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::graph::Step;
use crate::types::TaskKind;

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Build static-site assets into dist/ and serve them with live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// What to run. Without a command: clean, build everything, then serve.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFLOW_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Remove the whole output tree.
    Clean,
    /// Resolve `@@include` markers in pages.
    Html,
    /// Compile and minify the SCSS entry.
    Styles,
    /// Minify the script entry.
    Scripts,
    /// Encode raster images to AVIF.
    Images,
    /// Copy SVG images.
    Svg,
    /// Convert fonts to WOFF and WOFF2.
    Fonts,
    /// Serve the output tree and rebuild on change.
    Serve,
    /// Clean and build everything once, without serving.
    Build,
}

impl Command {
    /// The runner step this invocation stands for.
    pub fn step(self) -> Step {
        match self {
            Command::Clean => Step::Clean,
            Command::Html => Step::Task(TaskKind::Html),
            Command::Styles => Step::Task(TaskKind::Styles),
            Command::Scripts => Step::Task(TaskKind::Scripts),
            Command::Images => Step::Task(TaskKind::Images),
            Command::Svg => Step::Task(TaskKind::Svg),
            Command::Fonts => Step::Task(TaskKind::Fonts),
            Command::Serve => Step::Serve,
            Command::Build => crate::graph::build_plan(),
        }
    }
}

impl CliArgs {
    pub fn step(&self) -> Step {
        match self.command {
            Some(cmd) => cmd.step(),
            None => crate::graph::default_plan(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_selects_the_default_pipeline() {
        let args = CliArgs::try_parse_from(["assetflow"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.step(), crate::graph::default_plan());
    }

    #[test]
    fn named_invocations_map_to_single_steps() {
        let args = CliArgs::try_parse_from(["assetflow", "fonts"]).unwrap();
        assert_eq!(args.step(), Step::Task(TaskKind::Fonts));

        let args = CliArgs::try_parse_from(["assetflow", "clean"]).unwrap();
        assert_eq!(args.step(), Step::Clean);

        let args = CliArgs::try_parse_from(["assetflow", "serve", "--log-level", "debug"]).unwrap();
        assert_eq!(args.step(), Step::Serve);
    }

    #[test]
    fn unknown_invocations_are_rejected() {
        assert!(CliArgs::try_parse_from(["assetflow", "deploy"]).is_err());
    }
}
