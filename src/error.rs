use std::fmt;

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("File size of {size} bytes exceeds the {limit} byte limit.")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Invalid file type {0:?}. Please upload a PDF, DOC, or DOCX file.")]
    UnsupportedFileType(String),
    #[error("Unknown submission type {0:?}; expected Draft, Final, or Revision.")]
    InvalidSubmissionType(String),
}

/// Every failure found in one submission attempt. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("submission {0} not found")]
    RecordNotFound(String),
    #[error("persisted submissions are malformed: {0}")]
    MalformedPersistedData(#[from] serde_json::Error),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
