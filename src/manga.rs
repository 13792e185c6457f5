use anyhow::{Context, Result};
use reqwest::Client;
use std::{fs::create_dir_all, ops::RangeInclusive, path::PathBuf};

pub mod archive;
mod chapter;
pub mod get;
mod page;

pub use chapter::{Chapter, Concurrency, FailurePolicy, Grabbed};
pub use page::{ImagePattern, DEFAULT_IMAGE_ORIGIN};

/// What a run downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// `<base_url>chapter-<N>` for every N in the range.
    Range {
        base_url: String,
        chapters: RangeInclusive<u32>,
    },
    /// One chapter page.
    Single { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Archived { pages: usize, skipped: usize },
    NoImages,
    Failed,
    ZipFailed,
}

/// How one chapter went.
#[derive(Debug)]
pub struct Report {
    pub url: String,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub struct Manga {
    client: Client,
    pattern: ImagePattern,
    output: PathBuf,
    concurrency: Concurrency,
    failure_policy: FailurePolicy,
}

impl Manga {
    pub fn new(pattern: ImagePattern, output: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            pattern,
            output: output.into(),
            concurrency: Concurrency::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Works through the chapters one after the other. A chapter that fails
    /// is reported and the next one is started regardless.
    pub async fn download(&self, job: &Job) -> Vec<Report> {
        match job {
            Job::Range { base_url, chapters } => {
                let mut reports = Vec::new();
                for number in chapters.clone() {
                    let url = chapter_url(base_url, number);
                    let path = self.output.join(format!("images_ch{}", number));
                    reports.push(self.chapter(Chapter::new(url, path)).await);
                }
                reports
            }
            Job::Single { url } => {
                let path = self.output.join("images");
                vec![self.chapter(Chapter::new(url.as_str(), path)).await]
            }
        }
    }

    async fn chapter(&self, chapter: Chapter) -> Report {
        println!("Processing: {}", chapter.url);
        let outcome = match self.grab(&chapter).await {
            Err(e) => {
                println!("Failed: {:#}", e);
                Outcome::Failed
            }
            Ok(Grabbed {
                chapter: Some(number),
                files,
                failed,
            }) if !files.is_empty() => {
                let zip_path = self.output.join(format!("chapter-{}.zip", number));
                match archive::zip_files(&files, &zip_path) {
                    Ok(()) => {
                        println!("Chapter {} done -> {}", number, zip_path.display());
                        Outcome::Archived {
                            pages: files.len(),
                            skipped: failed.len(),
                        }
                    }
                    Err(e) => {
                        println!("Failed to zip: {:#}", e);
                        Outcome::ZipFailed
                    }
                }
            }
            Ok(_) => {
                println!("No images found.");
                Outcome::NoImages
            }
        };

        Report {
            url: chapter.url,
            outcome,
        }
    }

    async fn grab(&self, chapter: &Chapter) -> Result<Grabbed> {
        create_dir_all(&chapter.path)
            .with_context(|| format!("Creating {}", chapter.path.display()))?;
        chapter
            .grab(
                &self.client,
                &self.pattern,
                self.concurrency,
                self.failure_policy,
            )
            .await
    }
}

/// One line totalling up a run, naming the chapters that failed.
pub fn summary(reports: &[Report]) -> String {
    let (mut archived, mut pages, mut skipped, mut empty) = (0, 0, 0, 0);
    let mut failed = Vec::new();
    for report in reports {
        match report.outcome {
            Outcome::Archived {
                pages: saved,
                skipped: missing,
            } => {
                archived += 1;
                pages += saved;
                skipped += missing;
            }
            Outcome::NoImages => empty += 1,
            Outcome::Failed | Outcome::ZipFailed => failed.push(report.url.as_str()),
        }
    }

    let mut line = format!(
        "{} archived ({} pages, {} skipped), {} without images, {} failed",
        archived,
        pages,
        skipped,
        empty,
        failed.len()
    );
    if !failed.is_empty() {
        line.push_str(&format!(": {}", failed.join(", ")));
    }
    line
}

/// The page of chapter `chapter`, the base may or may not already end in `chapter-`.
pub fn chapter_url(base_url: &str, chapter: u32) -> String {
    if base_url.ends_with("chapter-") {
        format!("{}{}", base_url, chapter)
    } else {
        format!("{}chapter-{}", base_url, chapter)
    }
}
