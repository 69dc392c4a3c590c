use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_SUBMITTED: &str = "Submitted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionType {
    Draft,
    Final,
    Revision,
}

impl SubmissionType {
    pub const ALL: [SubmissionType; 3] = [Self::Draft, Self::Final, Self::Revision];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Final => "Final",
            Self::Revision => "Revision",
        }
    }
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| value.to_string())
    }
}

/// A stored thesis submission. Field names follow the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub student_name: String,
    pub student_id: String,
    pub email: String,
    pub department: String,
    pub thesis_title: String,
    pub supervisor: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub submission_type: SubmissionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    pub submission_date: DateTime<Utc>,
    pub status: String,
}

/// Descriptive reference to an attached file. Only name and size are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
}

/// Unvalidated submission input as typed by a student.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub student_name: String,
    pub student_id: String,
    pub email: String,
    pub department: String,
    pub thesis_title: String,
    pub supervisor: String,
    pub abstract_text: String,
    pub submission_type: String,
    pub keywords: Option<String>,
    pub file: Option<FileRef>,
}

/// Input that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub student_name: String,
    pub student_id: String,
    pub email: String,
    pub department: String,
    pub thesis_title: String,
    pub supervisor: String,
    pub abstract_text: String,
    pub submission_type: SubmissionType,
    pub keywords: Option<String>,
    pub file: Option<FileRef>,
}

impl ValidatedSubmission {
    pub fn into_submission(self, id: String, submitted_at: DateTime<Utc>) -> Submission {
        let (file_name, file_size) = match self.file {
            Some(file) => (file.name, file.size),
            None => (String::new(), 0),
        };

        Submission {
            id,
            student_name: self.student_name,
            student_id: self.student_id,
            email: self.email,
            department: self.department,
            thesis_title: self.thesis_title,
            supervisor: self.supervisor,
            abstract_text: self.abstract_text,
            submission_type: self.submission_type,
            keywords: self.keywords,
            file_name,
            file_size,
            submission_date: submitted_at,
            status: STATUS_SUBMITTED.to_string(),
        }
    }
}

/// Dashboard filter predicates, AND-combined. Blank values match everything.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub department: Option<String>,
    pub submission_type: Option<SubmissionType>,
    pub search: Option<String>,
}

impl SubmissionFilter {
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(department) = non_blank(self.department.as_deref()) {
            if submission.department != department {
                return false;
            }
        }

        if let Some(kind) = self.submission_type {
            if submission.submission_type != kind {
                return false;
            }
        }

        if let Some(term) = non_blank(self.search.as_deref()) {
            let term = term.to_lowercase();
            let hit = [
                &submission.student_name,
                &submission.thesis_title,
                &submission.supervisor,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
