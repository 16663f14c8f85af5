use std::io::IsTerminal;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvas_rebrand::auth::{Credentials, IdentityProvider, LocalOperator};
use canvas_rebrand::cli::{Args, Command, CourseArgs, RewriteArgs, TargetArgs};
use canvas_rebrand::config::Config;
use canvas_rebrand::content::json_store::JsonCourse;
use canvas_rebrand::pipeline::course::{process_course, CourseReport, RunOptions};
use canvas_rebrand::pipeline::polish::{CommandRewriter, NameSwap, TextRewriter};
use canvas_rebrand::preview::palette_table;
use canvas_rebrand::registry::{Institution, PaletteRegistry};
use canvas_rebrand::rewrite::{ChangeLog, Rewriter, TokenClass};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if args.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let registry = PaletteRegistry::laccd().context("built-in palette table is malformed")?;
    info!(institutions = registry.institutions().len(), "palette registry ready");

    match args.command {
        Command::List { plain } => {
            let styled = !plain && std::io::stdout().is_terminal();
            print!("{}", palette_table(&registry, styled));
            Ok(())
        }
        Command::Rewrite(rewrite) => rewrite_files(&registry, &config, rewrite),
        Command::Scan { files, target } => scan_files(&registry, &config, &files, target),
        Command::Course(course) => run_course(&registry, &config, course),
    }
}

fn resolve_target<'r>(
    registry: &'r PaletteRegistry,
    config: &Config,
    flag: Option<String>,
) -> Result<&'r Institution> {
    match config.target_or(flag) {
        Some(name) => Ok(registry.resolve(&name)?),
        None => Ok(registry.default_target()),
    }
}

fn read_html(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| {
        if !path.exists() {
            format!("file not found: {}", path.display())
        } else {
            format!("failed to read {}", path.display())
        }
    })
}

fn print_changes(label: &str, changes: &ChangeLog) {
    if changes.is_empty() {
        eprintln!("{label}: no changes");
        return;
    }
    eprintln!("{label}: {} change(s)", changes.len());
    for change in changes {
        eprintln!("  {change}");
    }
}

fn rewrite_files(registry: &PaletteRegistry, config: &Config, args: RewriteArgs) -> Result<()> {
    if args.output.is_some() && args.files.len() > 1 {
        bail!("--output accepts a single input file");
    }
    let target = resolve_target(registry, config, args.target.target)?;
    let mode = config.mode_or(args.target.mode);
    let rewriter = Rewriter::new(registry);

    for path in &args.files {
        let html = read_html(path)?;
        let result = rewriter.rewrite_to(&html, target, mode);
        print_changes(&path.display().to_string(), &result.changes);

        if args.write {
            if result.is_changed() {
                std::fs::write(path, &result.text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        } else if let Some(output) = &args.output {
            std::fs::write(output, &result.text)
                .with_context(|| format!("failed to write {}", output.display()))?;
        } else {
            print!("{}", result.text);
        }
    }
    Ok(())
}

fn scan_files(
    registry: &PaletteRegistry,
    config: &Config,
    files: &[std::path::PathBuf],
    target: TargetArgs,
) -> Result<()> {
    let target = resolve_target(registry, config, target.target)?;
    let rewriter = Rewriter::new(registry);

    for path in files {
        let html = read_html(path)?;
        let tokens = rewriter.scan(&html, &target.id)?;
        for token in tokens {
            let class = match &token.class {
                TokenClass::Target(role) => format!("{role} of target"),
                TokenClass::Foreign { owner, role } => format!("{role} of {owner}"),
                TokenClass::Unknown => "unknown".to_string(),
            };
            println!("{}:{}: {} {}", path.display(), token.offset, token.color, class);
        }
    }
    Ok(())
}

fn run_course(registry: &PaletteRegistry, config: &Config, args: CourseArgs) -> Result<()> {
    let name = args
        .operator
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_default();
    let operator = LocalOperator::new(config.operators.iter().cloned())
        .authenticate(&Credentials::new(name))?;

    let target = resolve_target(registry, config, args.target.target.clone())?;
    let options = RunOptions {
        target: target.id.clone(),
        mode: config.mode_or(args.target.mode),
        dry_run: !args.apply,
        model: config.model_or(args.model.clone()),
    };

    let polisher: Option<Box<dyn TextRewriter>> = if args.rename {
        Some(Box::new(NameSwap::new(registry)))
    } else {
        let command: Vec<String> = match &args.polish_cmd {
            Some(cmd) => cmd.split_whitespace().map(str::to_string).collect(),
            None => config.polish_command.clone(),
        };
        command.split_first().map(|(program, rest)| {
            Box::new(CommandRewriter::new(registry, program.clone(), rest.to_vec()))
                as Box<dyn TextRewriter>
        })
    };

    let mut store = JsonCourse::open(&args.export)?;
    let rewriter = Rewriter::new(registry);
    let report = process_course(
        &operator,
        &mut store,
        &rewriter,
        polisher.as_deref(),
        &options,
    )?;

    println!(
        "Course {:?} -> {} ({})",
        store.name(),
        target.display_name,
        if report.dry_run { "DRY RUN" } else { "LIVE" }
    );
    print_report(&report);

    if args.apply && store.is_dirty() {
        match &args.output {
            Some(output) => store.save_to(output)?,
            None => store.save()?,
        }
        println!("LIVE complete! {} item(s) saved.", report.total_updated());
    } else if report.dry_run {
        println!("DRY RUN complete! No changes were written.");
    } else {
        println!("LIVE complete! Nothing needed changing.");
    }
    Ok(())
}

fn print_report(report: &CourseReport) {
    for ((_, result), line) in report.kinds.iter().zip(report.summary_lines()) {
        println!("{line}");
        let Ok(stats) = result else {
            continue;
        };
        for item in &stats.items {
            println!("  - {}", item.title);
            for change in &item.changes {
                println!("      {change}");
            }
            if item.polished {
                println!("      (institution names rewritten)");
            }
        }
    }
}
