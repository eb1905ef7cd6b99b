use crate::fields::MissingFields;
use crate::DynError;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Describes any possible error that may terminate a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("Failed to load the batch at step {step}")]
    Load { step: usize, source: Box<DynError> },

    #[error("Processing failed at step {step}")]
    Step { step: usize, source: Box<DynError> },
}

/// The state or the batch from the data loader lacks fields required by one
/// of the middlewares.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{missing}, required by middleware {middleware}, at index {index}.")]
pub struct ValidationError {
    pub middleware: String,
    pub index: usize,
    pub missing: MissingFields,
}

/// Errors produced by the data loaders of this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    #[error("The row has {actual} items, but {expected} data fields were declared")]
    RowLength { expected: usize, actual: usize },
}
