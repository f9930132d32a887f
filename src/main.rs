use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use frontlint::catalog::CatalogIndex;
use frontlint::config::{CheckConfig, Config};
use frontlint::report::{Report, ReportFormat};
use frontlint::rules::{Severity, RULES};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "frontlint")]
#[command(about = "Validate front matter of agent and skill markdown files", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Extra config file, applied after user and project config
    #[arg(long, global = true, env = "FRONTLINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every agent and skill under ROOT
    Check {
        /// Catalog root directory
        #[arg(env = "FRONTLINT_ROOT", default_value = ".")]
        root: PathBuf,

        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Files validated concurrently
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Per-file read timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Size limit for files bundled with a skill
        #[arg(long)]
        max_asset_bytes: Option<u64>,

        /// Glob (relative to ROOT) of paths to skip; repeatable
        #[arg(long)]
        exclude: Vec<String>,

        /// Treat warnings as failures for the exit status
        #[arg(long)]
        strict: bool,

        /// Only show files with findings
        #[arg(short, long)]
        quiet: bool,
    },
    /// List discovered agents and skills
    List {
        /// Catalog root directory
        #[arg(env = "FRONTLINT_ROOT", default_value = ".")]
        root: PathBuf,

        /// Maximum entries shown per kind
        #[arg(long, default_value_t = 50)]
        max_entries: usize,
    },
    /// Print the rule table
    Rules,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Layered config for a root: user, project, local, then --config
fn load_config(root: &Path, extra: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(root)?;
    if let Some(path) = extra {
        config.merge(Config::load_from(path)?);
    }
    Ok(config)
}

fn print_rules() {
    for rule in RULES {
        let severity = match rule.severity {
            Severity::Violation => "error",
            Severity::Warning => "warning",
        };
        let kinds = if rule.applies_to.is_empty() {
            "any".to_string()
        } else {
            rule.applies_to
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(",")
        };
        println!("{:<20} {:<8} {:<12} {}", rule.name, severity, kinds, rule.summary);
    }
}

async fn execute(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Check {
            root,
            format,
            jobs,
            timeout_ms,
            max_asset_bytes,
            exclude,
            strict,
            quiet,
        } => {
            let mut config = load_config(&root, cli.config.as_deref())?;
            config.merge(Config {
                exclude,
                check: CheckConfig {
                    read_timeout_ms: timeout_ms,
                    max_asset_bytes,
                    jobs,
                    strict: strict.then_some(true),
                },
            });
            let opts = config.run_options()?;

            let results = frontlint::run(&root, &opts)
                .await
                .with_context(|| format!("Cannot validate catalog at {}", root.display()))?;

            let report = Report::new(&root, &results);
            println!("{}", report.render(format, quiet)?);
            Ok(report.summary().is_success(opts.strict))
        }
        Commands::List { root, max_entries } => {
            let config = load_config(&root, cli.config.as_deref())?;
            let opts = config.run_options()?;
            let index = CatalogIndex::build(&root, &opts)
                .await
                .with_context(|| format!("Cannot index catalog at {}", root.display()))?;
            println!("{}", index.format_listing(max_entries));
            Ok(index.errors().is_empty())
        }
        Commands::Rules => {
            print_rules();
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
