use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("label keys and values differ in length: {keys} keys, {values} values")]
    LabelLengthMismatch { keys: usize, values: usize },

    #[error("invalid format, metric=[label1,label2,labeln...],metricN=[]")]
    InvalidAllowList(String),

    #[error("invalid metric type: {0} (expected: gauge|counter)")]
    InvalidMetricType(String),
}
