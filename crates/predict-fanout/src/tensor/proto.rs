use serde::{Deserialize, Serialize};

/// Element type of a [`TensorProto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float,
    String,
}

/// Flat storage of a tensor's elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TensorValues {
    Float(Vec<f32>),
    String(Vec<String>),
}

/// # TensorProto
///
/// A typed, shaped tensor as sent to or received from a prediction service.
///
/// Elements are stored flat in row-major order; `shape` describes how they
/// are laid out. Inputs of a census request are always shape `[1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorProto {
    shape: Vec<usize>,
    values: TensorValues,
}

impl TensorProto {
    /// Builds a shape `[1]` float tensor.
    pub fn scalar_f32(value: f32) -> Self {
        Self {
            shape: vec![1],
            values: TensorValues::Float(vec![value]),
        }
    }

    /// Builds a shape `[1]` string tensor.
    pub fn scalar_string(value: impl Into<String>) -> Self {
        Self {
            shape: vec![1],
            values: TensorValues::String(vec![value.into()]),
        }
    }

    /// Builds a rank-1 float tensor holding `values`.
    pub fn from_scores(values: Vec<f32>) -> Self {
        Self {
            shape: vec![values.len()],
            values: TensorValues::Float(values),
        }
    }

    pub fn dtype(&self) -> DataType {
        match self.values {
            TensorValues::Float(_) => DataType::Float,
            TensorValues::String(_) => DataType::String,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub(crate) fn from_parts(shape: Vec<usize>, values: TensorValues) -> Self {
        Self { shape, values }
    }

    pub fn values(&self) -> &TensorValues {
        &self.values
    }

    /// Number of elements held by the tensor.
    pub fn len(&self) -> usize {
        match &self.values {
            TensorValues::Float(v) => v.len(),
            TensorValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The float elements of this tensor, or `None` for string tensors.
    pub fn scores(&self) -> Option<&[f32]> {
        match &self.values {
            TensorValues::Float(v) => Some(v),
            TensorValues::String(_) => None,
        }
    }

    /// Converts the elements into a JSON list, the form used by columnar
    /// REST predict requests.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.values {
            TensorValues::Float(v) => serde_json::json!(v),
            TensorValues::String(v) => serde_json::json!(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_tensors_have_unit_shape() {
        let age = TensorProto::scalar_f32(39.0);
        assert_eq!(age.shape(), &[1]);
        assert_eq!(age.dtype(), DataType::Float);
        assert_eq!(age.scores(), Some(&[39.0][..]));

        let sex = TensorProto::scalar_string("Male");
        assert_eq!(sex.shape(), &[1]);
        assert_eq!(sex.dtype(), DataType::String);
        assert_eq!(sex.scores(), None);
        assert_eq!(sex.len(), 1);
    }

    #[test]
    fn test_from_scores_shape() {
        let scores = TensorProto::from_scores(vec![0.25, 0.75]);
        assert_eq!(scores.shape(), &[2]);
        assert!(!scores.is_empty());
        assert!(TensorProto::from_scores(vec![]).is_empty());
    }

    #[test]
    fn test_to_json_lists() {
        assert_eq!(TensorProto::scalar_f32(12.0).to_json(), serde_json::json!([12.0]));
        assert_eq!(TensorProto::scalar_string("Bachelors").to_json(), serde_json::json!(["Bachelors"]));
    }
}
