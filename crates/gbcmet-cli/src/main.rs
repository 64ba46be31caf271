mod backend;
mod display;
mod interactive;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gbcmet_core::{Assessment, PatientInput, RISK_THRESHOLD, RiskPipeline};
use gbcmet_model::DEFAULT_MODEL_FILE;
use serde::Serialize;

use crate::backend::Backend;

#[derive(Parser)]
#[command(
    name = "gbcmet",
    version,
    about = "Gallbladder cancer distant metastasis risk calculator"
)]
struct Cli {
    /// Trained model artifact (XGBoost JSON, or ONNX with the `onnx` feature).
    #[arg(long, global = true, env = "GBCMET_MODEL", default_value = DEFAULT_MODEL_FILE)]
    model: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assess one patient.
    Predict(PredictArgs),
    /// Show model metadata.
    Inspect {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Assess patients line by line from stdin.
    Interactive {
        /// Include per-feature attribution.
        #[arg(long)]
        explain: bool,
    },
}

#[derive(Args)]
struct PredictArgs {
    /// Age in years.
    #[arg(long, default_value_t = 65, value_parser = clap::value_parser!(i64).range(18..=100))]
    age: i64,
    /// Male or Female.
    #[arg(long, default_value = "Female")]
    sex: String,
    /// Pathological T stage (T1–T4).
    #[arg(long = "t-stage", default_value = "T1")]
    t_stage: String,
    /// Lymph node ratio: positive / examined nodes.
    #[arg(long, default_value_t = 0.1)]
    lnr: f64,
    /// Include per-feature attribution.
    #[arg(long)]
    explain: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// JSON envelope for `predict --format json`.
#[derive(Serialize)]
struct Report<'a> {
    assessed_at: String,
    model: String,
    threshold: f64,
    #[serde(flatten)]
    assessment: &'a Assessment,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();
    tracing::info!("gbcmet v{}", env!("CARGO_PKG_VERSION"));

    // Without a model nothing else may run.
    let model = match Backend::load(&cli.model) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Model could not be loaded; predictions are disabled.");
            return Err(anyhow::Error::from(e)
                .context(format!("loading model {}", cli.model.display())));
        }
    };
    let pipeline = RiskPipeline::new(&model);

    match cli.command {
        Command::Predict(args) => {
            let patient = PatientInput::new(args.age, args.sex, args.t_stage, args.lnr);
            let assessment = if args.explain {
                pipeline.assess_with_explanation(&patient)?
            } else {
                pipeline.assess(&patient)?
            };
            let mut stdout = io::stdout().lock();
            match args.format {
                Format::Text => write!(stdout, "{}", display::render_assessment(&assessment)?)?,
                Format::Json => {
                    let report = Report {
                        assessed_at: chrono::Utc::now().to_rfc3339(),
                        model: cli.model.display().to_string(),
                        threshold: RISK_THRESHOLD,
                        assessment: &assessment,
                    };
                    serde_json::to_writer_pretty(&mut stdout, &report)?;
                    writeln!(stdout)?;
                }
            }
        }
        Command::Inspect { format } => {
            let summary = model
                .summary()
                .context("inspect supports XGBoost JSON models only")?;
            match format {
                Format::Text => print!("{}", display::render_summary(&summary)?),
                Format::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            }
        }
        Command::Interactive { explain } => {
            let n = interactive::run(&pipeline, explain, io::stdin().lock(), io::stdout())?;
            tracing::info!(assessments = n, "session ended");
        }
    }

    Ok(())
}
