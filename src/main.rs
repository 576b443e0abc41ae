use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf_intelligence::config::{discover_collections, EngineConfig, DEFAULT_CONFIG_PATH};
use pdf_intelligence::pdf_processor::PdfProcessor;
use pdf_intelligence::presets::{self, Preset, SUMMARY_SECTIONS};
use pdf_intelligence::{pipeline, AnalysisRequest, AnalysisResult, IntelligenceEngine};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pdf_intelligence", about = "Rank PDF sections for a persona and a job to be done")]
struct Cli {
    /// Engine configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze every PDF in a directory
    Analyze {
        #[arg(long, default_value = "data/input")]
        input_dir: PathBuf,
        #[arg(long, default_value = "data/output/analysis_results.json")]
        output_file: PathBuf,
        /// Persona description (role and expertise)
        #[arg(long)]
        persona: String,
        /// Specific task to be accomplished
        #[arg(long)]
        job_to_be_done: String,
        #[arg(long)]
        max_results: Option<usize>,
        #[arg(long)]
        excerpt_budget: Option<usize>,
    },
    /// Process every challenge collection under a root directory
    Collections {
        #[arg(long, default_value = "collections")]
        root: PathBuf,
    },
    /// Run a preset persona over the PDFs in a directory
    Example {
        #[arg(long, value_enum, default_value = "investment_analyst")]
        persona: Preset,
        #[arg(long, default_value = "data/input")]
        input_dir: PathBuf,
        #[arg(long, default_value = "data/output")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pdf_intelligence=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load(&cli.config)?;
    let engine = IntelligenceEngine::new(config).context("Invalid engine configuration")?;
    let processor = PdfProcessor::new()?;
    tracing::info!("Starting PDF intelligence run");

    match cli.command {
        Command::Analyze {
            input_dir,
            output_file,
            persona,
            job_to_be_done,
            max_results,
            excerpt_budget,
        } => {
            let mut request = AnalysisRequest::new(Vec::new(), persona, job_to_be_done);
            request.max_results = max_results;
            request.excerpt_budget_chars = excerpt_budget;

            let started = Instant::now();
            let result = pipeline::analyze_directory(&engine, &processor, &input_dir, request)?;
            pipeline::write_result(&output_file, &result)?;
            print_summary(&result, started, &output_file);
        }
        Command::Collections { root } => {
            let collections = discover_collections(&root)?;
            tracing::info!(count = collections.len(), root = %root.display(), "found collections");

            let mut failed = Vec::new();
            for collection in &collections {
                let started = Instant::now();
                match pipeline::process_collection(&engine, &processor, collection) {
                    Ok(result) => print_summary(&result, started, &collection.output_path),
                    Err(e) => {
                        tracing::error!(collection = %collection.name, error = ?e, "collection failed");
                        failed.push(collection.name.clone());
                    }
                }
            }
            if !failed.is_empty() {
                anyhow::bail!("{} collection(s) failed: {}", failed.len(), failed.join(", "));
            }
        }
        Command::Example {
            persona,
            input_dir,
            output_dir,
        } => {
            let found = pipeline::list_pdfs(&input_dir)?.len();
            let needed = engine.config().min_documents;
            if found < needed {
                anyhow::bail!(
                    "Need at least {needed} PDF files in {}, found {found}",
                    input_dir.display()
                );
            }
            tracing::info!(preset = persona.name(), "running example analysis");
            println!("Persona: {}", persona.persona());
            println!("Job: {}", persona.job());

            let started = Instant::now();
            let result =
                pipeline::analyze_directory(&engine, &processor, &input_dir, persona.request())?;
            let output_file = persona.output_file(&output_dir);
            pipeline::write_result(&output_file, &result)?;
            print_summary(&result, started, &output_file);

            println!("\nTop {SUMMARY_SECTIONS} most relevant sections:");
            for line in presets::top_sections(&result, SUMMARY_SECTIONS) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult, started: Instant, output: &Path) {
    println!("\n=== ANALYSIS COMPLETE ===");
    println!("Documents processed: {}", result.metadata.input_documents.len());
    println!("Processing time: {:.2}s", started.elapsed().as_secs_f64());
    println!("Relevant sections found: {}", result.extracted_sections.len());
    println!("Subsections analyzed: {}", result.subsection_analysis.len());
    println!("Results saved to: {}", output.display());
}
