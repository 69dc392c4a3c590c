use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{FileRef, RawSubmission, Submission, SubmissionFilter, ValidatedSubmission};
use crate::storage::Backend;
use crate::validate::validate_submission;

pub const SUBMISSIONS_KEY: &str = "thesisSubmissions";

/// The persisted, insertion-ordered collection of thesis submissions.
///
/// The collection is only ever read and written as a whole. There is no
/// isolation between readers and writers; a single writer is assumed.
pub struct SubmissionStore<B> {
    backend: B,
}

impl<B: Backend> SubmissionStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Seed an empty collection if nothing has been persisted yet.
    pub fn init(&mut self) -> Result<(), StoreError> {
        if self.backend.load(SUBMISSIONS_KEY)?.is_none() {
            self.backend.save(SUBMISSIONS_KEY, "[]")?;
            tracing::debug!(key = SUBMISSIONS_KEY, "initialized empty submission collection");
        }
        Ok(())
    }

    pub fn try_load(&self) -> Result<Vec<Submission>, StoreError> {
        match self.backend.load(SUBMISSIONS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Current submissions, oldest first. Unreadable data counts as empty.
    pub fn load(&self) -> Vec<Submission> {
        self.try_load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "treating persisted submissions as empty");
            Vec::new()
        })
    }

    pub fn append(&mut self, validated: ValidatedSubmission) -> Result<Submission, StoreError> {
        self.append_at(validated, Utc::now())
    }

    pub fn append_at(
        &mut self,
        validated: ValidatedSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, StoreError> {
        let mut stored = self.append_all_at(vec![validated], submitted_at)?;
        stored
            .pop()
            .context("append stored no submission")
            .map_err(StoreError::from)
    }

    /// Append several submissions with a single rewrite of the collection.
    pub fn append_all(
        &mut self,
        validated: Vec<ValidatedSubmission>,
    ) -> Result<Vec<Submission>, StoreError> {
        self.append_all_at(validated, Utc::now())
    }

    fn append_all_at(
        &mut self,
        validated: Vec<ValidatedSubmission>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Vec<Submission>, StoreError> {
        // Unreadable data must surface here; writing over it would lose it.
        let mut submissions = self.try_load()?;

        let stored: Vec<Submission> = validated
            .into_iter()
            .map(|v| v.into_submission(generate_id(submitted_at), submitted_at))
            .collect();
        if stored.is_empty() {
            return Ok(stored);
        }

        submissions.extend(stored.iter().cloned());
        let body = serde_json::to_string(&submissions).context("failed to serialize submissions")?;
        self.backend.save(SUBMISSIONS_KEY, &body)?;

        for submission in &stored {
            tracing::info!(
                id = %submission.id,
                student_id = %submission.student_id,
                submission_type = %submission.submission_type,
                "stored submission"
            );
        }
        tracing::debug!(total = submissions.len(), "rewrote submission collection");
        Ok(stored)
    }

    pub fn find(&self, id: &str) -> Result<Submission, StoreError> {
        self.load()
            .into_iter()
            .find(|submission| submission.id == id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))
    }

    pub fn filter(&self, predicates: &SubmissionFilter) -> Vec<Submission> {
        filter_submissions(&self.load(), predicates)
    }
}

pub fn filter_submissions(submissions: &[Submission], predicates: &SubmissionFilter) -> Vec<Submission> {
    submissions
        .iter()
        .filter(|submission| predicates.matches(submission))
        .cloned()
        .collect()
}

/// Base-36 millisecond timestamp followed by a random base-36 suffix.
pub fn generate_id(now: DateTime<Utc>) -> String {
    let millis = u128::try_from(now.timestamp_millis()).unwrap_or_default();
    let random = to_base36(Uuid::new_v4().as_u128());
    format!("{}{}", to_base36(millis), &random[..random.len().min(11)])
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn seed<B: Backend>(store: &mut SubmissionStore<B>) -> anyhow::Result<usize> {
    let samples = vec![
        (
            "Avery Lee",
            "S2026-014",
            "avery.lee@university.edu",
            "Computer Science",
            "Adaptive Scheduling for Heterogeneous Clusters",
            "Dr. Priya Raman",
            "Draft",
            Some("scheduling, distributed systems"),
            Some(("lee_thesis_draft.pdf", 1_845_220)),
        ),
        (
            "Jules Moreno",
            "S2025-201",
            "jules.moreno@university.edu",
            "Physics",
            "Optical Lattice Clocks at Room Temperature",
            "Dr. Hannah Okafor",
            "Final",
            None,
            Some(("moreno_final.docx", 4_310_988)),
        ),
        (
            "Kiara Patel",
            "S2026-077",
            "kiara.patel@university.edu",
            "Mathematics",
            "Spectral Methods for Sparse Graph Partitioning",
            "Dr. Tomasz Wolski",
            "Revision",
            Some("spectral graph theory"),
            None,
        ),
    ];

    let mut validated = Vec::with_capacity(samples.len());
    for (name, student_id, email, department, title, supervisor, kind, keywords, file) in samples {
        let raw = RawSubmission {
            student_name: name.to_string(),
            student_id: student_id.to_string(),
            email: email.to_string(),
            department: department.to_string(),
            thesis_title: title.to_string(),
            supervisor: supervisor.to_string(),
            abstract_text: format!("{title}: a study submitted to the {department} department."),
            submission_type: kind.to_string(),
            keywords: keywords.map(str::to_string),
            file: file.map(|(name, size)| FileRef {
                name: name.to_string(),
                size,
            }),
        };

        validated.push(validate_submission(&raw).context("seed data failed validation")?);
    }

    Ok(store.append_all(validated)?.len())
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

pub fn import_csv<B: Backend, R: std::io::Read>(
    store: &mut SubmissionStore<B>,
    source: R,
) -> anyhow::Result<ImportSummary> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        student_name: String,
        student_id: String,
        email: String,
        department: String,
        thesis_title: String,
        supervisor: String,
        #[serde(rename = "abstract")]
        abstract_text: String,
        submission_type: String,
        keywords: Option<String>,
        file_name: Option<String>,
        file_size: Option<u64>,
    }

    let mut reader = csv::Reader::from_reader(source);
    let mut summary = ImportSummary::default();
    let mut accepted = Vec::new();

    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("failed to parse CSV row {}", idx + 1))?;
        let file = row
            .file_name
            .filter(|name| !name.trim().is_empty())
            .map(|name| FileRef {
                name,
                size: row.file_size.unwrap_or_default(),
            });

        let raw = RawSubmission {
            student_name: row.student_name,
            student_id: row.student_id,
            email: row.email,
            department: row.department,
            thesis_title: row.thesis_title,
            supervisor: row.supervisor,
            abstract_text: row.abstract_text,
            submission_type: row.submission_type,
            keywords: row.keywords,
            file,
        };

        match validate_submission(&raw) {
            Ok(validated) => accepted.push(validated),
            Err(errors) => {
                tracing::warn!(row = idx + 1, %errors, "skipping invalid CSV row");
                summary.skipped += 1;
            }
        }
    }

    // Nothing is written unless every row parsed.
    summary.inserted = store.append_all(accepted)?.len();
    Ok(summary)
}
