use super::predict::{LabeledRequest, ModelSpec, PredictRequest};
use crate::tensor::TensorProto;

/// Label strings in class-index order.
pub const LABEL_VOCABULARY: [&str; 2] = [">50K", "<=50K"];

/// Class index of a census label string, `None` if it is not in the vocabulary.
///
/// A trailing `.` (as found in the UCI test split) is ignored.
pub fn label_index(label: &str) -> Option<usize> {
    let label = label.trim().trim_end_matches('.');
    LABEL_VOCABULARY.iter().position(|l| *l == label)
}

/// # CensusRecord
///
/// One row of the UCI adult census dataset, as fed to the served model.
///
/// Numeric columns are sent as float tensors and categorical columns as
/// string tensors, each with shape `[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusRecord {
    pub age: f32,
    pub workclass: String,
    pub education: String,
    pub education_num: f32,
    pub marital_status: String,
    pub occupation: String,
    pub relationship: String,
    pub race: String,
    pub sex: String,
    pub capital_gain: f32,
    pub capital_loss: f32,
    pub hours_per_week: f32,
    pub native_country: String,

    /// Expected class index into [`LABEL_VOCABULARY`]
    pub label: i64,
}

impl CensusRecord {
    pub const NUMERIC_COLUMNS: [&'static str; 5] = [
        "age", "education-num", "capital-gain", "capital-loss", "hours-per-week",
    ];

    pub const CATEGORICAL_COLUMNS: [&'static str; 8] = [
        "workclass", "education", "marital-status", "occupation",
        "relationship", "race", "sex", "native-country",
    ];

    /// Builds the request payload addressed to `model_spec`.
    pub fn to_request(&self, model_spec: ModelSpec) -> PredictRequest {
        PredictRequest::new(model_spec)
            .with_input("age", TensorProto::scalar_f32(self.age))
            .with_input("workclass", TensorProto::scalar_string(&self.workclass))
            .with_input("education", TensorProto::scalar_string(&self.education))
            .with_input("education-num", TensorProto::scalar_f32(self.education_num))
            .with_input("marital-status", TensorProto::scalar_string(&self.marital_status))
            .with_input("occupation", TensorProto::scalar_string(&self.occupation))
            .with_input("relationship", TensorProto::scalar_string(&self.relationship))
            .with_input("race", TensorProto::scalar_string(&self.race))
            .with_input("sex", TensorProto::scalar_string(&self.sex))
            .with_input("capital-gain", TensorProto::scalar_f32(self.capital_gain))
            .with_input("capital-loss", TensorProto::scalar_f32(self.capital_loss))
            .with_input("hours-per-week", TensorProto::scalar_f32(self.hours_per_week))
            .with_input("native-country", TensorProto::scalar_string(&self.native_country))
    }

    pub fn to_labeled_request(&self, model_spec: ModelSpec) -> LabeledRequest {
        LabeledRequest::new(self.to_request(model_spec), self.label)
    }

    pub fn with_label(mut self, label: i64) -> Self {
        self.label = label;
        self
    }
}

impl Default for CensusRecord {
    /// First row of the adult training split.
    fn default() -> Self {
        Self {
            age: 39.0,
            workclass: "State-gov".to_string(),
            education: "Bachelors".to_string(),
            education_num: 12.0,
            marital_status: "Never-married".to_string(),
            occupation: "Adm-clerical".to_string(),
            relationship: "Not-in-family".to_string(),
            race: "White".to_string(),
            sex: "Male".to_string(),
            capital_gain: 2174.0,
            capital_loss: 0.0,
            hours_per_week: 40.0,
            native_country: "United-States".to_string(),
            label: 1,
        }
    }
}
