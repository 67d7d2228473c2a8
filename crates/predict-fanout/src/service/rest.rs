use std::collections::BTreeMap;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};
use crate::core::PredictionService;
use crate::error::ServiceError;
use crate::request::{PredictRequest, PredictResponse};
use crate::tensor::operations::tensor_from_json;

/// Connection settings for [`RestPredictionService`].
pub struct RestConfig;
impl RestConfig {
    pub const CONNECT_TIMEOUT_SECS: u64 = 5;
    pub const POOL_SIZE: usize = 64;
    pub const KEEPALIVE_SECS: u64 = 90;
}

/// # RestPredictionService
///
/// A [`PredictionService`] speaking the REST predict API of a model server
/// (`POST /v1/models/{model}:predict`).
///
/// Requests use the columnar format: each named input becomes a one-element
/// list under `inputs`. Responses are read from `outputs`, either a map of
/// named outputs or, for single-output signatures, a bare list which is
/// stored under the configured output key.
#[derive(Debug, Clone)]
pub struct RestPredictionService {
    client: Client,
    base_url: String,
    output_key: String,
}

impl RestPredictionService {
    /// Builds a client for the server at `host:port`.
    ///
    /// An explicit `http://` or `https://` prefix is kept; otherwise plain
    /// `http` is used. No connection is made until the first request.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidAddress`] for a malformed address,
    /// [`ServiceError::Transport`] if the HTTP client cannot be built.
    pub fn connect(server: &str) -> Result<Self, ServiceError> {
        let base_url = parse_base_url(server)?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(RestConfig::CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(RestConfig::KEEPALIVE_SECS))
            .pool_max_idle_per_host(RestConfig::POOL_SIZE)
            .build()
            .map_err(|e| ServiceError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            output_key: "scores".to_string(),
        })
    }

    /// Sets the output holding the class scores. A bare (unnamed) output
    /// list is stored under this name, and among named outputs only this
    /// one must decode.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn predict_url(&self, request: &PredictRequest) -> String {
        format!("{}/v1/models/{}:predict", self.base_url, request.model_spec.name)
    }

    fn encode(request: &PredictRequest) -> Value {
        let inputs = request.inputs.iter()
            .map(|(name, tensor)| (name.clone(), tensor.to_json()))
            .collect::<Map<String, Value>>();
        json!({
            "signature_name": request.model_spec.signature_name,
            "inputs": inputs,
        })
    }

    fn decode(&self, body: Value) -> Result<PredictResponse, ServiceError> {
        let outputs = body.get("outputs")
            .ok_or_else(|| ServiceError::Decode("response has no 'outputs' field".into()))?;

        let mut decoded = BTreeMap::new();
        match outputs {
            Value::Object(named) => {
                for (name, value) in named {
                    match tensor_from_json(value) {
                        Ok(tensor) => {
                            decoded.insert(name.clone(), tensor);
                        }
                        Err(e) if *name == self.output_key => {
                            return Err(ServiceError::Decode(format!("output '{}': {}", name, e)));
                        }
                        Err(e) => debug!(output = %name, error = %e, "skipping undecodable output"),
                    }
                }
            }
            other => {
                let tensor = tensor_from_json(other).map_err(ServiceError::Decode)?;
                decoded.insert(self.output_key.clone(), tensor);
            }
        }
        Ok(PredictResponse { outputs: decoded })
    }
}

#[async_trait]
impl PredictionService for RestPredictionService {
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, ServiceError> {
        let url = self.predict_url(&request);
        trace!(%url, "sending predict request");

        let response = self.client
            .post(&url)
            .json(&Self::encode(&request))
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response.text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            return Err(ServiceError::Remote { status: status.as_u16(), message });
        }

        let body = serde_json::from_str::<Value>(&text)
            .map_err(|e| ServiceError::Decode(format!("invalid JSON body: {}", e)))?;
        self.decode(body)
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}

/// Turns `host:port` (optionally with a scheme) into a base URL.
fn parse_base_url(server: &str) -> Result<String, ServiceError> {
    let server = server.trim().trim_end_matches('/');
    let (scheme, address) = match server.split_once("://") {
        Some((scheme @ ("http" | "https"), rest)) => (scheme, rest),
        Some((scheme, _)) => {
            return Err(ServiceError::InvalidAddress(format!("unsupported scheme '{}'", scheme)));
        }
        None => ("http", server),
    };

    let (host, port) = address.rsplit_once(':')
        .ok_or_else(|| ServiceError::InvalidAddress(format!("expected host:port, got '{}'", address)))?;
    if host.is_empty() || host.contains('/') {
        return Err(ServiceError::InvalidAddress(format!("invalid host in '{}'", address)));
    }
    let port: u16 = port.parse()
        .map_err(|_| ServiceError::InvalidAddress(format!("invalid port in '{}'", address)))?;

    Ok(format!("{}://{}:{}", scheme, host, port))
}
