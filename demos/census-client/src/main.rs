//! census-client - concurrent inference load test for a served census model
//!
//! Typical usage:
//!     census-client --num_tests=100 --concurrency=10 --server=localhost:8501

mod cli;
mod report;

use std::process::ExitCode;
use clap::Parser;
use predict_fanout::request::FixedSample;
use predict_fanout::{CensusRecord, ConcurrentRequestDispatcher, DispatchError, RestPredictionService, RunSummary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use crate::cli::{Args, ClientConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    match do_inference(&config).await {
        Ok(summary) => {
            println!("\nInference error rate: {}%", summary.error_rate() * 100.0);
            match report::write_summary(&config.work_dir, &summary) {
                Ok(path) => info!(path = %path.display(), "wrote run summary"),
                Err(e) => warn!("could not write run summary: {:#}", e),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_usage() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

async fn do_inference(config: &ClientConfig) -> Result<RunSummary, DispatchError> {
    let service = RestPredictionService::connect(&config.server)?
        .with_output_key(config.dispatch.output_key.clone());
    let sample = CensusRecord::default()
        .with_label(config.label)
        .to_labeled_request(config.model_spec.clone());

    info!(server = %config.server, model = %config.model_spec.name, "starting inference");
    ConcurrentRequestDispatcher::new(service, config.dispatch.clone())
        .with_samples(FixedSample::new(sample))
        .run_summary()
        .await
}
