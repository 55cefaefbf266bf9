use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mu_core::{Analysis, AnalysisConfig, Document};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mu")]
#[command(about = "Meaningful-use coding analysis for patient summary sections")]
struct Cli {
    /// Analysis config (YAML). Defaults to the C32 section layout.
    #[arg(long, env = "MU_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print entry counts and code systems in use per section
    Summary {
        /// Entry documents (YAML or JSON), one per source document
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print entries deduplicated by description
    Listing {
        /// Entry documents (YAML or JSON), one per source document
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Which entries to list
        #[arg(long, value_enum, default_value_t = ListingKind::Mu)]
        kind: ListingKind,
    },
    /// Print the configured sections and their allow-lists
    Sections,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ListingKind {
    Mu,
    NonMu,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("mu=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Some(Commands::Summary { files }) => {
            let analysis = analyse_files(&config, &files)?;
            render(&analysis.summary(), cli.format)?
        }
        Some(Commands::Listing { files, kind }) => {
            let analysis = analyse_files(&config, &files)?;
            let listing = match kind {
                ListingKind::Mu => analysis.unique_mu_entries(),
                ListingKind::NonMu => analysis.unique_non_mu_entries(),
            };
            render(&listing, cli.format)?
        }
        Some(Commands::Sections) => render(&config, cli.format)?,
        None => "Use 'mu --help' for commands".to_string(),
    };

    println!("{output}");
    Ok(())
}

/// Load the analysis config from `path`, or the default layout when no path is given.
fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    AnalysisConfig::from_yaml_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    Document::from_yaml_str(&text)
        .with_context(|| format!("invalid document {}", path.display()))
}

/// Analyse each file as its own document, then merge the results in argument order.
fn analyse_files(config: &AnalysisConfig, files: &[PathBuf]) -> anyhow::Result<Analysis> {
    let mut combined = Analysis::new(config);

    for path in files {
        let document = load_document(path)?;
        let mut analysis = Analysis::new(config);
        let report = analysis.ingest(&document);

        tracing::info!(
            "++ {}: {} entries ({} mu, {} non-mu coded, {} unusable)",
            path.display(),
            report.classified(),
            report.meaningful_use,
            report.alien,
            report.unusable
        );
        if !report.skipped_sections.is_empty() {
            tracing::warn!(
                "{}: skipped unconfigured sections: {}",
                path.display(),
                report.skipped_sections.join(", ")
            );
        }

        combined.merge(&analysis);
    }

    Ok(combined)
}

fn render<T: serde::Serialize>(value: &T, format: Format) -> anyhow::Result<String> {
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(rendered)
}
