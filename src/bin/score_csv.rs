use anyhow::{Context, Result};
use autoprice::adapters::LocalStorage;
use autoprice::core::artifacts::ArtifactFiles;
use autoprice::core::batch;
use autoprice::utils::logger;
use autoprice::{ModelArtifacts, PricePredictor};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "score-csv")]
#[command(about = "Score a CSV of vehicles with the trained price model")]
struct Args {
    /// CSV with make,model,trim,body_type,drivetrain,transmission,miles,car_age,engine_size
    input: PathBuf,

    /// Directory holding the trained model artifacts
    #[arg(long, default_value = "model")]
    artifact_dir: PathBuf,

    /// Write results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let storage = LocalStorage::new(&args.artifact_dir);
    let artifacts = ModelArtifacts::load(&storage, &ArtifactFiles::default())
        .await
        .with_context(|| format!("failed to load artifacts from {}", args.artifact_dir.display()))?;
    let predictor = PricePredictor::new(artifacts);

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let summary = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            batch::score_csv(&predictor, input, file)?
        }
        None => batch::score_csv(&predictor, input, std::io::stdout().lock())?,
    };

    tracing::info!("✅ Scored {} rows, {} failed", summary.scored, summary.failed);
    Ok(())
}
