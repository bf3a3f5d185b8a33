use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use library_report::config::{self, ReportConfig};
use library_report::notify::LogNotifier;
use library_report::{
    AppContext, GenerationOutcome, ReportError, ReportGenerator, ReportSelection, WeeklyStats,
};

/// Generates monthly circulation reports from the library service.
///
/// Configuration is read from the environment (or a `.env` file):
/// `LIBRARY_API_URL`, `LIBRARY_API_TOKEN`, `LIBRARY_REPORT_OUTPUT_DIR`,
/// `LIBRARY_SESSION_TIMEOUT_MINUTES` and `LIBRARY_REPORT_FONTS_DIR`.
#[derive(Parser)]
#[command(author, version, about = "Monthly library circulation reports")]
struct Cli {
    /// Base URL of the library REST service.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token used for service requests.
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SelectionArgs {
    /// Month as a name (`March`, `mar`) or a number from 1 to 12.
    #[arg(long)]
    month: String,

    #[arg(long)]
    year: i32,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the report and save it as `library-report-<Month>-<Year>.pdf`.
    #[command(name = "generate", aliases = ["report"])]
    Generate {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Directory the report is written to.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the weekly figures without rendering a document.
    #[command(name = "summary", aliases = ["preview"])]
    Summary {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<ReportConfig> {
    ReportConfig::from_env_with(|name| match name {
        config::API_URL_ENV => cli.api_url.clone(),
        config::API_TOKEN_ENV => cli.token.clone(),
        _ => None,
    })
    .context("failed to read configuration")
}

fn print_summary(selection: ReportSelection, stats: &WeeklyStats) {
    println!("Library Report - {}", selection);
    println!("{:<10}{:>10}{:>10}{:>12}", "Week", "Borrowed", "Returned", "Net Change");
    for row in stats.rows().iter().chain(std::iter::once(&stats.totals())) {
        println!(
            "{:<10}{:>10}{:>10}{:>12}",
            row.label, row.borrowed, row.returned, row.net
        );
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli)?;

    let (args, output_dir) = match &cli.command {
        Commands::Generate {
            selection,
            output_dir,
        } => (selection, output_dir.clone()),
        Commands::Summary { selection } => (selection, None),
    };
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let selection = ReportSelection::parse(&args.month, args.year)?;
    let context = AppContext::from_config(&config, Arc::new(LogNotifier))?;
    let generator = ReportGenerator::new(context);

    match cli.command {
        Commands::Generate { .. } => {
            if let GenerationOutcome::Completed(artifact) = generator.generate(selection).await? {
                println!(
                    "Generated {} ({} bytes)",
                    artifact.path.display(),
                    artifact.bytes_written
                );
            }
        }
        Commands::Summary { .. } => {
            if let GenerationOutcome::Completed(stats) = generator.preview(selection).await? {
                print_summary(selection, &stats);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        if !already_notified(&err) {
            eprintln!("Error: {}", err);
            print_error_sources(err.as_ref());
        }
        process::exit(1);
    }
}

/// Failed report runs have already been logged and shown through the notifier.
fn already_notified(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ReportError>().is_some()
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

#[cfg(test)]
mod tests {
    use library_report::error::{ConfigError, FetchError, SelectionError};

    use super::*;

    #[test]
    fn report_failures_are_not_printed_again() {
        let err = anyhow::Error::from(ReportError::Fetch(FetchError::Status {
            url: "http://127.0.0.1:9/transactions".to_owned(),
            status: 500,
        }));
        assert!(already_notified(&err));

        let err = anyhow::Error::from(ReportError::NotAuthenticated);
        assert!(already_notified(&err));
    }

    #[test]
    fn setup_failures_are_printed() {
        let err = anyhow::Error::from(ConfigError::Missing(config::API_URL_ENV))
            .context("failed to read configuration");
        assert!(!already_notified(&err));

        let err = anyhow::Error::from(SelectionError::UnknownMonth("Smarch".to_owned()));
        assert!(!already_notified(&err));
    }
}
