use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use predict_fanout::request::{LABEL_VOCABULARY, ModelSpec, label_index};
use predict_fanout::{DispatchConfig, DispatchError, MAX_REQUESTS};

/// Tests a served census model with concurrent inference requests and
/// reports the inference error rate.
#[derive(Debug, Parser)]
#[command(name = "census-client", version)]
pub struct Args {
    /// Maximum number of concurrent inference requests
    #[arg(long, env = "CENSUS_CLIENT_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Number of test requests
    #[arg(long = "num_tests", env = "CENSUS_CLIENT_NUM_TESTS", default_value_t = 1)]
    pub num_tests: usize,

    /// Prediction service host:port
    #[arg(long, env = "CENSUS_CLIENT_SERVER")]
    pub server: Option<String>,

    /// Working directory; the run summary is written here
    #[arg(long = "work_dir", env = "CENSUS_CLIENT_WORK_DIR", default_value_os_t = std::env::temp_dir())]
    pub work_dir: PathBuf,

    /// Name of the served model
    #[arg(long = "model_name", env = "CENSUS_CLIENT_MODEL_NAME", default_value = "census")]
    pub model_name: String,

    /// Signature of the served model to call
    #[arg(long = "signature_name", env = "CENSUS_CLIENT_SIGNATURE_NAME", default_value = "serving_default")]
    pub signature_name: String,

    /// Response output holding the class scores
    #[arg(long = "output_key", env = "CENSUS_CLIENT_OUTPUT_KEY", default_value = "scores")]
    pub output_key: String,

    /// Per-request timeout in seconds
    #[arg(long = "timeout_secs", env = "CENSUS_CLIENT_TIMEOUT_SECS", default_value_t = 5.0)]
    pub timeout_secs: f64,

    /// Overall deadline for the run in seconds; unset waits indefinitely
    #[arg(long = "deadline_secs", env = "CENSUS_CLIENT_DEADLINE_SECS")]
    pub deadline_secs: Option<f64>,

    /// Expected label: a class index (0 = ">50K", 1 = "<=50K") or the label itself
    #[arg(
        long,
        env = "CENSUS_CLIENT_LABEL",
        default_value = "1",
        allow_negative_numbers = true,
        value_parser = parse_label
    )]
    pub label: i64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long = "log_level", env = "CENSUS_CLIENT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated settings of one client invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server: String,
    pub dispatch: DispatchConfig,
    pub model_spec: ModelSpec,
    pub label: i64,
    pub work_dir: PathBuf,
}

impl Args {
    /// Checks the flags and turns them into a [`ClientConfig`].
    pub fn to_config(&self) -> Result<ClientConfig, DispatchError> {
        if self.num_tests > MAX_REQUESTS {
            return Err(DispatchError::InvalidConfig("num_tests should not be greater than 10k".into()));
        }
        let server = match self.server.as_deref().map(str::trim) {
            Some(server) if !server.is_empty() => server.to_string(),
            _ => return Err(DispatchError::InvalidConfig("please specify server host:port".into())),
        };

        let timeout = seconds("timeout_secs", self.timeout_secs)?;
        let deadline = self.deadline_secs
            .map(|secs| seconds("deadline_secs", secs))
            .transpose()?;

        let dispatch = DispatchConfig::new(self.concurrency, self.num_tests)
            .with_request_timeout(timeout)
            .with_deadline(deadline)
            .with_output_key(self.output_key.clone());
        dispatch.validate()?;

        Ok(ClientConfig {
            server,
            dispatch,
            model_spec: ModelSpec::new(self.model_name.clone(), self.signature_name.clone()),
            label: self.label,
            work_dir: self.work_dir.clone(),
        })
    }
}

fn parse_label(value: &str) -> Result<i64, String> {
    if let Ok(index) = value.trim().parse::<i64>() {
        return Ok(index);
    }
    label_index(value)
        .map(|index| index as i64)
        .ok_or_else(|| format!("expected a class index or one of {:?}", LABEL_VOCABULARY))
}

fn seconds(flag: &str, secs: f64) -> Result<Duration, DispatchError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(DispatchError::InvalidConfig(format!("{} must be a positive number of seconds", flag))),
    }
}
