use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::rewrite::Mode;

/// Re-brand Canvas course HTML by remapping institutional colors.
#[derive(Parser, Debug)]
#[command(name = "canvas-rebrand", version, about)]
pub struct Args {
    /// TOML file with default target, mode, model and operators
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress (info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log every color decision (debug level)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered institutions and their colors
    List {
        /// Print hex codes without colored swatches
        #[arg(long)]
        plain: bool,
    },

    /// Rewrite colors in HTML files
    Rewrite(RewriteArgs),

    /// Report every color in HTML files and how it would be treated
    Scan {
        /// HTML files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Rebrand every item of a course export
    Course(CourseArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Institution to rebrand toward (id, short code or name)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Which colors to remap
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,
}

#[derive(ClapArgs, Debug)]
pub struct RewriteArgs {
    /// HTML files to rewrite
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Write the result to this file instead of stdout (single input only)
    #[arg(short, long, conflicts_with = "write")]
    pub output: Option<PathBuf>,

    /// Rewrite the input files in place
    #[arg(long)]
    pub write: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CourseArgs {
    /// Course export JSON file
    pub export: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Write changes (without this flag the run is a dry run)
    #[arg(long)]
    pub apply: bool,

    /// Save the updated export here instead of overwriting the input
    #[arg(short, long, requires = "apply")]
    pub output: Option<PathBuf>,

    /// Swap other institutions' names for the target's
    #[arg(long, conflicts_with = "polish_cmd")]
    pub rename: bool,

    /// External program that rewrites institution names in each item
    #[arg(long, value_name = "PROGRAM")]
    pub polish_cmd: Option<String>,

    /// Model name passed to the text rewriter
    #[arg(long)]
    pub model: Option<String>,

    /// Operator name (defaults to $USER)
    #[arg(long)]
    pub operator: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn rewrite_flags_parse() {
        let args = Args::parse_from([
            "canvas-rebrand",
            "rewrite",
            "a.html",
            "--target",
            "lapc",
            "--mode",
            "replace-all",
            "-o",
            "out.html",
        ]);
        let Command::Rewrite(rewrite) = args.command else {
            panic!("expected rewrite");
        };
        assert_eq!(rewrite.target.target.as_deref(), Some("lapc"));
        assert_eq!(rewrite.target.mode, Some(Mode::ReplaceAll));
        assert_eq!(rewrite.output, Some(PathBuf::from("out.html")));
    }

    #[test]
    fn output_conflicts_with_write() {
        let result = Args::try_parse_from([
            "canvas-rebrand",
            "rewrite",
            "a.html",
            "-o",
            "b.html",
            "--write",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn course_output_requires_apply() {
        assert!(Args::try_parse_from(["canvas-rebrand", "course", "c.json", "-o", "x.json"]).is_err());
        assert!(
            Args::try_parse_from(["canvas-rebrand", "course", "c.json", "--apply", "-o", "x.json"])
                .is_ok()
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::parse_from(["canvas-rebrand", "list", "--plain", "-v"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::List { plain: true }));
    }
}
