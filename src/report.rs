use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{Submission, SubmissionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total: usize,
    pub draft: usize,
    pub final_count: usize,
    pub revision: usize,
}

pub fn statistics(submissions: &[Submission]) -> Statistics {
    let mut stats = Statistics {
        total: submissions.len(),
        ..Default::default()
    };

    for submission in submissions {
        match submission.submission_type {
            SubmissionType::Draft => stats.draft += 1,
            SubmissionType::Final => stats.final_count += 1,
            SubmissionType::Revision => stats.revision += 1,
        }
    }

    stats
}

pub fn summarize_by_department(submissions: &[Submission]) -> Vec<(String, usize)> {
    let mut map: HashMap<&str, usize> = HashMap::new();
    for submission in submissions {
        *map.entry(submission.department.as_str()).or_insert(0) += 1;
    }

    let mut summaries: Vec<(String, usize)> = map
        .into_iter()
        .map(|(department, count)| (department.to_string(), count))
        .collect();
    summaries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summaries
}

/// Human-readable size in 1024 steps, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

pub fn render_statistics(stats: &Statistics) -> String {
    format!(
        "Total: {}  Draft: {}  Final: {}  Revision: {}",
        stats.total, stats.draft, stats.final_count, stats.revision
    )
}

/// One dashboard card, condensed to a few lines.
pub fn render_card(submission: &Submission) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "[{}] {} ({})",
        submission.id, submission.thesis_title, submission.submission_type
    );
    let _ = writeln!(
        output,
        "    Student: {} ({})  Department: {}",
        submission.student_name, submission.student_id, submission.department
    );
    let _ = write!(
        output,
        "    Supervisor: {}  Submitted: {}",
        submission.supervisor,
        format_date(&submission.submission_date)
    );
    output
}

pub fn render_details(submission: &Submission) -> String {
    let keywords = submission
        .keywords
        .as_deref()
        .filter(|kw| !kw.is_empty())
        .unwrap_or("Not provided");
    let file_name = if submission.file_name.is_empty() {
        "No file uploaded"
    } else {
        submission.file_name.as_str()
    };
    let file_size = if submission.file_size == 0 {
        "N/A".to_string()
    } else {
        format_file_size(submission.file_size)
    };

    let mut output = String::new();
    let _ = writeln!(output, "{}", submission.thesis_title);
    let _ = writeln!(output);
    let _ = writeln!(output, "Student Information");
    let _ = writeln!(output, "  Name:            {}", submission.student_name);
    let _ = writeln!(output, "  Student ID:      {}", submission.student_id);
    let _ = writeln!(output, "  Email:           {}", submission.email);
    let _ = writeln!(output, "  Department:      {}", submission.department);
    let _ = writeln!(output);
    let _ = writeln!(output, "Thesis Information");
    let _ = writeln!(output, "  Title:           {}", submission.thesis_title);
    let _ = writeln!(output, "  Supervisor:      {}", submission.supervisor);
    let _ = writeln!(output, "  Submission Type: {}", submission.submission_type);
    let _ = writeln!(output, "  Keywords:        {keywords}");
    let _ = writeln!(
        output,
        "  Submitted:       {}",
        format_date(&submission.submission_date)
    );
    let _ = writeln!(output, "  Status:          {}", submission.status);
    let _ = writeln!(output);
    let _ = writeln!(output, "File Information");
    let _ = writeln!(output, "  File Name:       {file_name}");
    let _ = writeln!(output, "  File Size:       {file_size}");
    let _ = writeln!(output);
    let _ = writeln!(output, "Abstract");
    let _ = write!(output, "  {}", submission.abstract_text);
    output
}

/// What a download request for this submission yields. Only the file
/// reference is kept, so there are no bytes to hand out.
pub fn download_notice(submission: &Submission) -> String {
    if submission.file_name.is_empty() {
        "No file available for download.".to_string()
    } else {
        format!(
            "Download would start for: {} ({}). File contents are not stored.",
            submission.file_name,
            format_file_size(submission.file_size)
        )
    }
}

pub fn build_report(generated_at: DateTime<Utc>, submissions: &[Submission]) -> String {
    let stats = statistics(submissions);
    let departments = summarize_by_department(submissions);

    let mut output = String::new();
    let _ = writeln!(output, "# Thesis Submissions Report");
    let _ = writeln!(output, "Generated {}", format_date(&generated_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- Total: {}", stats.total);
    let _ = writeln!(output, "- Draft: {}", stats.draft);
    let _ = writeln!(output, "- Final: {}", stats.final_count);
    let _ = writeln!(output, "- Revision: {}", stats.revision);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Departments");
    if departments.is_empty() {
        let _ = writeln!(output, "No submissions yet.");
    } else {
        for (department, count) in &departments {
            let _ = writeln!(output, "- {department}: {count} submissions");
        }
    }

    let mut recent = submissions.to_vec();
    recent.sort_by(|a, b| b.submission_date.cmp(&a.submission_date));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Submissions");
    if recent.is_empty() {
        let _ = writeln!(output, "No submissions yet.");
    } else {
        for submission in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) \"{}\" [{}] on {}",
                submission.student_name,
                submission.department,
                submission.thesis_title,
                submission.submission_type,
                format_date(&submission.submission_date)
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(name: &str, department: &str, kind: SubmissionType, day: u32) -> Submission {
        Submission {
            id: format!("id-{name}"),
            student_name: name.to_string(),
            student_id: "S1".to_string(),
            email: "s@example.com".to_string(),
            department: department.to_string(),
            thesis_title: format!("{name} thesis"),
            supervisor: "Dr. Y".to_string(),
            abstract_text: "Abstract.".to_string(),
            submission_type: kind,
            keywords: None,
            file_name: String::new(),
            file_size: 0,
            submission_date: Utc.with_ymd_and_hms(2026, 2, day, 15, 4, 0).unwrap(),
            status: "Submitted".to_string(),
        }
    }

    #[test]
    fn counts_submissions_by_type() {
        let submissions = vec![
            sample("a", "CS", SubmissionType::Draft, 1),
            sample("b", "CS", SubmissionType::Final, 2),
            sample("c", "Physics", SubmissionType::Final, 3),
        ];

        assert_eq!(
            statistics(&submissions),
            Statistics {
                total: 3,
                draft: 1,
                final_count: 2,
                revision: 0,
            }
        );
    }

    #[test]
    fn formats_file_sizes_like_the_dashboard() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(26_214_400), "25 MB");
        assert_eq!(format_file_size(1_845_220), "1.76 MB");
    }

    #[test]
    fn formats_dates_in_us_style() {
        let date = Utc.with_ymd_and_hms(2026, 2, 5, 15, 4, 0).unwrap();
        assert_eq!(format_date(&date), "Feb 5, 2026, 03:04 PM");
    }

    #[test]
    fn details_fall_back_for_missing_optional_fields() {
        let details = render_details(&sample("a", "CS", SubmissionType::Draft, 1));
        assert!(details.contains("Keywords:        Not provided"));
        assert!(details.contains("File Name:       No file uploaded"));
        assert!(details.contains("File Size:       N/A"));
    }

    #[test]
    fn download_notice_depends_on_file_reference() {
        let mut submission = sample("a", "CS", SubmissionType::Final, 1);
        assert_eq!(download_notice(&submission), "No file available for download.");

        submission.file_name = "thesis.pdf".to_string();
        submission.file_size = 1536;
        let notice = download_notice(&submission);
        assert!(notice.starts_with("Download would start for: thesis.pdf (1.5 KB)"));
    }

    #[test]
    fn report_lists_departments_and_recent_first() {
        let submissions = vec![
            sample("older", "CS", SubmissionType::Draft, 1),
            sample("newer", "Physics", SubmissionType::Revision, 9),
            sample("middle", "CS", SubmissionType::Final, 4),
        ];
        let report = build_report(Utc::now(), &submissions);

        assert!(report.contains("- CS: 2 submissions"));
        assert!(report.contains("- Revision: 1"));
        let newer = report.find("newer thesis").unwrap();
        let older = report.find("older thesis").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn empty_report_says_so() {
        let report = build_report(Utc::now(), &[]);
        assert!(report.contains("- Total: 0"));
        assert!(report.contains("No submissions yet."));
    }
}
