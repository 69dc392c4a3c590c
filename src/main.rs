use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

mod config;
mod error;
mod models;
mod report;
mod session;
mod storage;
mod store;
mod validate;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{FileRef, RawSubmission, SubmissionFilter, SubmissionType};
use crate::session::SessionContext;
use crate::store::SubmissionStore;

const REFRESH_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "thesis-portal")]
#[command(about = "Thesis submission portal backed by a local key-value store", long_about = None)]
struct Cli {
    /// Directory holding the local and session storage files
    #[arg(long, global = true, env = config::DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty submission collection if none exists
    Init,
    /// Load realistic demo submissions
    Seed,
    /// Submit thesis metadata and an optional file reference
    Submit {
        #[arg(long)]
        student_name: String,
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        supervisor: String,
        #[arg(long = "abstract")]
        abstract_text: String,
        /// Draft, Final, or Revision
        #[arg(long = "type")]
        submission_type: String,
        #[arg(long)]
        keywords: Option<String>,
        /// Thesis document; only its name and size are recorded
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Check whether a file would be accepted for submission
    CheckFile { path: PathBuf },
    /// Import submissions from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Start an admin session (valid for four hours)
    Login,
    /// End the admin session
    Logout,
    /// List submissions matching the given filters
    List {
        #[arg(long)]
        department: Option<String>,
        #[arg(long = "type")]
        kind: Option<SubmissionType>,
        /// Case-insensitive match on student name, title, or supervisor
        #[arg(long)]
        search: Option<String>,
    },
    /// Show every detail of one submission
    Show { id: String },
    /// Request the thesis file attached to a submission
    Download { id: String },
    /// Print statistics and all submissions
    Dashboard {
        /// Refresh every 30 seconds until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thesis_portal=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env(cli.data_dir);
    tracing::debug!(data_dir = %config.data_dir().display(), "using data directory");

    let mut store = SubmissionStore::new(config.local_storage());

    match cli.command {
        Commands::Init => {
            store.init()?;
            println!(
                "Submission store ready at {}.",
                config.local_storage().path().display()
            );
        }
        Commands::Seed => {
            let inserted = store::seed(&mut store)?;
            println!("Inserted {inserted} demo submissions.");
        }
        Commands::Submit {
            student_name,
            student_id,
            email,
            department,
            title,
            supervisor,
            abstract_text,
            submission_type,
            keywords,
            file,
        } => {
            let file = file.as_deref().map(file_ref).transpose()?;
            let raw = RawSubmission {
                student_name,
                student_id,
                email,
                department,
                thesis_title: title,
                supervisor,
                abstract_text,
                submission_type,
                keywords,
                file,
            };

            let validated = match validate::validate_submission(&raw) {
                Ok(validated) => validated,
                Err(errors) => {
                    for error in errors.errors() {
                        eprintln!("- {error}");
                    }
                    anyhow::bail!(
                        "submission rejected with {} validation error(s)",
                        errors.errors().len()
                    );
                }
            };

            let submission = store.append(validated)?;
            println!("Thesis submitted successfully. Submission ID: {}", submission.id);
        }
        Commands::CheckFile { path } => {
            let file = file_ref(&path)?;
            validate::validate_file(&file)?;
            let mime = mime_guess::from_path(&path)
                .first_raw()
                .unwrap_or("Unknown");
            println!("Selected File: {}", file.name);
            println!("Size: {}", report::format_file_size(file.size));
            println!("Type: {mime}");
        }
        Commands::Import { csv } => {
            let source = std::fs::File::open(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let summary = store::import_csv(&mut store, source)?;
            println!(
                "Inserted {} submissions from {} ({} skipped).",
                summary.inserted,
                csv.display(),
                summary.skipped
            );
        }
        Commands::Login => {
            let mut session_storage = config.session_storage();
            let session = SessionContext::start(&mut session_storage, Utc::now())?;
            if let Some(expires_at) = session.expires_at() {
                println!(
                    "Admin session started; expires {}.",
                    report::format_date(&expires_at)
                );
            }
        }
        Commands::Logout => {
            SessionContext::clear(&mut config.session_storage())?;
            println!("Admin session ended.");
        }
        Commands::List {
            department,
            kind,
            search,
        } => {
            require_admin(&config)?;
            let filter = SubmissionFilter {
                department,
                submission_type: kind,
                search,
            };
            print_cards(&store.filter(&filter));
        }
        Commands::Show { id } => {
            require_admin(&config)?;
            match store.find(&id) {
                Ok(submission) => println!("{}", report::render_details(&submission)),
                Err(StoreError::RecordNotFound(_)) => println!("Submission not found."),
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Download { id } => {
            require_admin(&config)?;
            match store.find(&id) {
                Ok(submission) => println!("{}", report::download_notice(&submission)),
                Err(StoreError::RecordNotFound(_)) => println!("Submission not found."),
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Dashboard { watch } => {
            require_admin(&config)?;
            loop {
                let submissions = store.load();
                println!("{}", report::render_statistics(&report::statistics(&submissions)));
                println!();
                print_cards(&submissions);

                if !watch {
                    break;
                }
                std::thread::sleep(REFRESH_INTERVAL);
                println!();
            }
        }
        Commands::Report { out } => {
            require_admin(&config)?;
            let report = report::build_report(Utc::now(), &store.load());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn require_admin(config: &Config) -> anyhow::Result<()> {
    let mut session_storage = config.session_storage();
    if !session::authenticate(&mut session_storage, Utc::now())? {
        anyhow::bail!("admin session missing or expired; run `thesis-portal login` first");
    }
    Ok(())
}

fn file_ref(path: &Path) -> anyhow::Result<FileRef> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;

    Ok(FileRef {
        name,
        size: metadata.len(),
    })
}

fn print_cards(submissions: &[models::Submission]) {
    if submissions.is_empty() {
        println!("No submissions found.");
        return;
    }

    for submission in submissions {
        println!("{}", report::render_card(submission));
    }
}
