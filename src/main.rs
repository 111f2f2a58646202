//! Consilium CLI: analyze one medical report and save the opinions.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use consilium::config::{self, GeminiConfig};
use consilium::export::OpinionDocument;
use consilium::pipeline::gemini::GeminiClient;
use consilium::pipeline::types::ExecutionMode;
use consilium::report::MedicalReport;
use consilium::session::AnalysisSession;
use consilium::sink::{ConsoleSink, FileSink, ReportSink};

#[derive(Parser)]
#[command(
    name = "consilium",
    version,
    about = "Multi-specialist medical opinions from a single report"
)]
struct Cli {
    /// Path to the medical report text file.
    report: PathBuf,

    /// Where to write the labeled text sections.
    #[arg(short, long, default_value = "final_diagnosis.txt")]
    output: PathBuf,

    /// Also export the opinions as a PDF.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Run the three specialist roles concurrently instead of one at a time.
    #[arg(long)]
    concurrent: bool,

    /// Override the generation model name.
    #[arg(long)]
    model: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // Setup failures surface here, once, before any run starts.
    let mut gemini = match GeminiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(model) = cli.model {
        gemini.model = model;
    }

    let report = match MedicalReport::from_file(&cli.report) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let patient_label = cli
        .report
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Medical Report".to_string());

    let mode = if cli.concurrent {
        ExecutionMode::Concurrent
    } else {
        ExecutionMode::Sequential
    };

    let generator = Arc::new(GeminiClient::new(&gemini));
    tracing::info!(model = generator.model(), mode = ?mode, "analysis configured");

    let session = AnalysisSession::new();
    let handle = match session.spawn(generator, report, mode) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // The worker sends each opinion as it completes; display and file
    // buffering both happen here, on the owning thread.
    let mut console = ConsoleSink;
    let mut file = FileSink::default();
    for output in handle.events().iter() {
        console.accept(output.role, &output);
        file.accept(output.role, &output);
    }

    let Some(opinions) = handle.wait() else {
        eprintln!("Analysis worker terminated unexpectedly");
        return ExitCode::FAILURE;
    };

    if let Err(e) = file.persist(&cli.output) {
        eprintln!("Cannot write {}: {e}", cli.output.display());
        return ExitCode::FAILURE;
    }

    if let Some(pdf_path) = cli.pdf {
        let document = OpinionDocument {
            patient_label,
            generated_at: chrono::Utc::now(),
            opinions: &opinions,
        };
        if let Err(e) = document.export_pdf_to_file(&pdf_path) {
            eprintln!("PDF export failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
