use anyhow::Result;
use catalog_patcher::config::{
    apply_config, load_or_builtin, ApplicationError, ApplyOptions, PatchConfig, PatchReport,
    RuleStatus,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-patcher")]
#[command(
    about = "Add the shopping cart to the wine catalog page",
    long_about = "Applies three literal replacements to src/pages/CatalogoVinos.tsx: \
                  the CartIcon/addToCart imports, a real agregarAlCarrito handler, \
                  and a floating CartIcon before the ChatBot widget."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory the target path is resolved against (defaults to the current directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// TOML rule file to use instead of the built-in catalog patch
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Fail without writing if any rule's search text is missing
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the rules and their target without touching any file
    List,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_or_builtin(cli.rules.as_deref())?;

    match cli.command {
        Some(Commands::List) => cmd_list(&config),
        None => cmd_apply(
            &config,
            cli.workspace,
            ApplyOptions {
                dry_run: cli.dry_run,
                strict: cli.strict,
            },
            cli.diff,
        ),
    }
}

/// Diagnostics go to stderr so stdout carries only the status report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn cmd_apply(
    config: &PatchConfig,
    workspace: Option<PathBuf>,
    options: ApplyOptions,
    show_diff: bool,
) -> Result<()> {
    let workspace = match workspace {
        Some(path) => path,
        None => env::current_dir()?,
    };

    let report = match apply_config(config, &workspace, options) {
        Ok(report) => report,
        Err(ApplicationError::Unmatched { file, rules }) => {
            eprintln!("{} Nothing written to {}", "✗".red(), file.display());
            for id in &rules {
                eprintln!("  {} {}: search text not found", "✗".red(), id);
            }
            eprintln!("  Possible causes:");
            eprintln!("    - The file was already patched by hand");
            eprintln!("    - Imports or handler body were edited since the rules were written");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if options.dry_run {
        print_dry_run(&report);
    } else {
        print_status(&report);
    }

    if show_diff && report.changed() {
        display_diff(&report.file, &report.original, &report.patched);
    }

    Ok(())
}

/// The status report is printed in full whether or not every rule matched.
fn print_status(report: &PatchReport) {
    println!("✅ Archivo modificado exitosamente!");
    println!("{} cambios aplicados:", report.outcomes.len());
    for (idx, outcome) in report.outcomes.iter().enumerate() {
        println!("  {}. {}", idx + 1, outcome.description);
    }
}

fn print_dry_run(report: &PatchReport) {
    println!("{}", "[DRY RUN - nothing written]".cyan());
    println!("Target: {}", report.file.display());
    for outcome in &report.outcomes {
        match outcome.status {
            RuleStatus::Applied { occurrences } => println!(
                "{} {}: Would apply ({} occurrence{})",
                "✓".green(),
                outcome.id,
                occurrences,
                if occurrences == 1 { "" } else { "s" }
            ),
            RuleStatus::AlreadyApplied => {
                println!("{} {}: Already applied", "⊙".yellow(), outcome.id)
            }
            RuleStatus::NotFound => {
                println!("{} {}: Search text not found", "✗".red(), outcome.id)
            }
        }
    }
}

fn cmd_list(config: &PatchConfig) -> Result<()> {
    let name = if config.meta.name.is_empty() {
        "(unnamed)"
    } else {
        config.meta.name.as_str()
    };
    println!("{} {}", "Rule set:".bold(), name);
    if let Some(description) = &config.meta.description {
        println!("  {}", description.dimmed());
    }
    println!("Target: {}", config.meta.target);
    println!();
    for (idx, rule) in config.rules.iter().enumerate() {
        println!("  {}. {} ({})", idx + 1, rule.id, rule.label());
    }
    Ok(())
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
}
