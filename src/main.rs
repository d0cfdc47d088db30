use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paleta::dataset::Dataset;
use paleta::report::{ReportFormat, SurveyReport};

#[derive(Parser)]
#[command(name = "paleta")]
#[command(version, about = "Statistical analysis for color-format preference surveys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline over a survey export
    Analyze {
        /// Input CSV file with a header row
        input: PathBuf,

        /// Report format: text, markdown, or json
        #[arg(long, default_value = "text")]
        format: ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check that a survey export carries the required columns
    Validate {
        /// Input CSV file with a header row
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Paleta v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze {
            input,
            format,
            output,
        } => {
            info!("Analyzing survey export at {:?}", input);
            cmd_analyze(input, format, output)?;
        }
        Commands::Validate { input } => {
            info!("Validating survey export at {:?}", input);
            cmd_validate(input)?;
        }
    }

    Ok(())
}

fn cmd_analyze(
    input: PathBuf,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    eprintln!("{}", "🔍 Analyzing survey data...".bright_cyan().bold());

    let report = SurveyReport::from_path(&input)?;

    match output {
        Some(path) => {
            report.save(&path, format)?;
            eprintln!(
                "{} Report written to {}",
                "✓".bright_green(),
                path.display()
            );
        }
        None => print!("{}", report.render(format)?),
    }

    Ok(())
}

fn cmd_validate(input: PathBuf) -> anyhow::Result<()> {
    let dataset = Dataset::from_path(&input)?;
    dataset.validate_schema()?;

    println!(
        "{} {} rows, required columns present",
        "✓".bright_green(),
        dataset.len()
    );
    if dataset.supports_consistency() {
        println!("{} consistency analysis available", "✓".bright_green());
    } else {
        println!(
            "{} consistency analysis unavailable (needs 'user_id' and 'repeat' columns)",
            "○".dimmed()
        );
    }

    Ok(())
}
