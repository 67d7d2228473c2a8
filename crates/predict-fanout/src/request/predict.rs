use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::error::ServiceError;
use crate::tensor::TensorProto;
use crate::tensor::operations::argmax;

/// Identifies the servable and signature a request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub signature_name: String,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, signature_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature_name: signature_name.into(),
        }
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::new("census", "serving_default")
    }
}

/// A prediction request: a model address and named input tensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub model_spec: ModelSpec,
    pub inputs: BTreeMap<String, TensorProto>,
}

impl PredictRequest {
    pub fn new(model_spec: ModelSpec) -> Self {
        Self {
            model_spec,
            inputs: BTreeMap::new(),
        }
    }

    /// Adds or replaces the input tensor named `name`.
    pub fn with_input(mut self, name: impl Into<String>, tensor: TensorProto) -> Self {
        self.inputs.insert(name.into(), tensor);
        self
    }

    pub fn input(&self, name: &str) -> Option<&TensorProto> {
        self.inputs.get(name)
    }
}

/// A prediction response: named output tensors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub outputs: BTreeMap<String, TensorProto>,
}

impl PredictResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, name: impl Into<String>, tensor: TensorProto) -> Self {
        self.outputs.insert(name.into(), tensor);
        self
    }

    /// Decodes the score vector under `output_key` and returns the index of
    /// its highest score.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Decode`] if the output is missing, is not a float
    /// tensor, holds more than one row of scores, or holds no usable score.
    pub fn predicted_label(&self, output_key: &str) -> Result<usize, ServiceError> {
        let tensor = self.outputs.get(output_key).ok_or_else(|| {
            ServiceError::Decode(format!("response has no output named '{}'", output_key))
        })?;
        // Leading dimensions are batch rows; one request yields one row.
        let rows: usize = tensor.shape().iter().rev().skip(1).product();
        if rows != 1 {
            return Err(ServiceError::Decode(format!(
                "output '{}' holds {} rows of scores, expected one", output_key, rows
            )));
        }
        let scores = tensor.scores().ok_or_else(|| {
            ServiceError::Decode(format!("output '{}' is not a float tensor", output_key))
        })?;
        argmax(scores).ok_or_else(|| {
            ServiceError::Decode(format!("output '{}' holds no scores", output_key))
        })
    }
}

/// A request paired with the label the model is expected to predict for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRequest {
    pub request: PredictRequest,

    /// Expected class index; a negative value never matches a prediction
    pub expected_label: i64,
}

impl LabeledRequest {
    pub fn new(request: PredictRequest, expected_label: i64) -> Self {
        Self { request, expected_label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::operations::tensor_from_json;

    #[test]
    fn test_default_model_spec() {
        let spec = ModelSpec::default();
        assert_eq!(spec.name, "census");
        assert_eq!(spec.signature_name, "serving_default");
    }

    #[test]
    fn test_request_inputs() {
        let request = PredictRequest::new(ModelSpec::default())
            .with_input("age", TensorProto::scalar_f32(39.0))
            .with_input("sex", TensorProto::scalar_string("Male"));

        assert_eq!(request.inputs.len(), 2);
        assert_eq!(request.input("age"), Some(&TensorProto::scalar_f32(39.0)));
        assert!(request.input("race").is_none());
    }

    #[test]
    fn test_predicted_label() {
        let response = PredictResponse::new()
            .with_output("scores", TensorProto::from_scores(vec![0.2, 0.8]));
        assert_eq!(response.predicted_label("scores"), Ok(1));
    }

    #[test]
    fn test_predicted_label_missing_output() {
        let response = PredictResponse::new()
            .with_output("classes", TensorProto::from_scores(vec![1.0]));
        assert!(matches!(response.predicted_label("scores"), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_predicted_label_single_row_batch() {
        let scores = tensor_from_json(&serde_json::json!([[0.3, 0.7]])).unwrap();
        let response = PredictResponse::new().with_output("scores", scores);
        assert_eq!(response.predicted_label("scores"), Ok(1));
    }

    #[test]
    fn test_predicted_label_rejects_multi_row_batch() {
        let scores = tensor_from_json(&serde_json::json!([[0.9, 0.1], [0.2, 0.95]])).unwrap();
        let response = PredictResponse::new().with_output("scores", scores);
        assert!(matches!(response.predicted_label("scores"), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_predicted_label_rejects_strings_and_empty() {
        let response = PredictResponse::new()
            .with_output("labels", TensorProto::scalar_string("<=50K"))
            .with_output("scores", TensorProto::from_scores(vec![]));
        assert!(matches!(response.predicted_label("labels"), Err(ServiceError::Decode(_))));
        assert!(matches!(response.predicted_label("scores"), Err(ServiceError::Decode(_))));
    }
}
