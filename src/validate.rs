use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, ValidationErrors};
use crate::models::{FileRef, RawSubmission, SubmissionType, ValidatedSubmission};

/// 25 MiB.
pub const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 3] = [".pdf", ".doc", ".docx"];

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Check a raw submission and normalize it for storage.
///
/// All failures are collected so the caller can report every offending field
/// at once rather than one per attempt.
pub fn validate_submission(raw: &RawSubmission) -> Result<ValidatedSubmission, ValidationErrors> {
    let mut errors = Vec::new();

    let mut required = |name: &'static str, value: &str| -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            errors.push(ValidationError::MissingField(name));
        }
        trimmed.to_string()
    };

    let student_name = required("studentName", &raw.student_name);
    let student_id = required("studentId", &raw.student_id);
    let email = required("email", &raw.email);
    let department = required("department", &raw.department);
    let thesis_title = required("thesisTitle", &raw.thesis_title);
    let supervisor = required("supervisor", &raw.supervisor);
    let abstract_text = required("abstract", &raw.abstract_text);
    let submission_type = required("submissionType", &raw.submission_type);

    if let Err(error) = validate_email(&email) {
        errors.push(error);
    }

    let parsed_type = if submission_type.is_empty() {
        None
    } else {
        match submission_type.parse::<SubmissionType>() {
            Ok(kind) => Some(kind),
            Err(value) => {
                errors.push(ValidationError::InvalidSubmissionType(value));
                None
            }
        }
    };

    if let Some(file) = &raw.file {
        if let Err(error) = validate_file(file) {
            errors.push(error);
        }
    }

    let submission_type = match parsed_type {
        Some(kind) if errors.is_empty() => kind,
        _ => return Err(ValidationErrors::new(errors)),
    };

    let keywords = raw
        .keywords
        .as_deref()
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string);

    Ok(ValidatedSubmission {
        student_name,
        student_id,
        email,
        department,
        thesis_title,
        supervisor,
        abstract_text,
        submission_type,
        keywords,
        file: raw.file.clone(),
    })
}

/// Blank addresses pass here; emptiness is the required-field check's job.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || EMAIL_SHAPE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Reject a file selection before it reaches a submission. Size is checked
/// before type.
pub fn validate_file(file: &FileRef) -> Result<(), ValidationError> {
    if file.size > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge {
            size: file.size,
            limit: MAX_FILE_SIZE,
        });
    }

    let extension = file_extension(&file.name);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedFileType(extension));
    }

    Ok(())
}

/// Text after the last dot, lowercased, with a leading dot. A name without a
/// dot yields the whole name.
fn file_extension(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    format!(".{}", last.to_lowercase())
}
