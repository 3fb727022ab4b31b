use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    InvalidParameter(String),
    GenerationInfeasible { placed: usize, attempts: usize },
    EmptySample,
    UndefinedStatistic(String),
    SerializationError(String),
    IoError(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            CoreError::GenerationInfeasible { placed, attempts } => {
                write!(
                    f,
                    "Generation infeasible: {} points placed after {} attempts",
                    placed, attempts
                )
            }
            CoreError::EmptySample => write!(f, "Empty sample: no distributions to analyze"),
            CoreError::UndefinedStatistic(msg) => write!(f, "Undefined statistic: {}", msg),
            CoreError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            CoreError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
