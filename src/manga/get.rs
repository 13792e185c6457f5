use super::{Concurrency, FailurePolicy, ImagePattern, Job, Manga, DEFAULT_IMAGE_ORIGIN};
use crate::int_range::IntRange;
use anyhow::{bail, Context, Result};
use clap::{ArgAction::Count, Parser};
use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct GetManga {
    /// Base URL the chapter is appended to, e.g. https://site.com/manga/
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Range of chapters to download, e.g. 5, 1..10 or 1..=10
    #[arg(short, long)]
    pub chapters: Option<IntRange>,

    /// Download this single chapter page instead of a range
    #[arg(short, long, conflicts_with_all = ["base_url", "chapters", "single"])]
    pub page: Option<String>,

    /// Ask for a single chapter page instead of a base URL and range
    #[arg(short, long, conflicts_with_all = ["base_url", "chapters"])]
    pub single: bool,

    /// Where the image folders and zips are written
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Number of images downloaded at once per chapter, all of them if not set
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Fail a chapter when any of its images fails instead of zipping the rest
    #[arg(long)]
    pub strict: bool,

    /// Scheme and host chapter images are served from
    #[arg(long, default_value = DEFAULT_IMAGE_ORIGIN)]
    pub image_origin: String,

    /// Turn debugging information on
    #[arg(short, long, action = Count)]
    pub verbose: u8,
}

impl GetManga {
    /// Builds the downloader from the flags.
    pub fn get(&self) -> Result<Manga> {
        let failure_policy = if self.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Tolerate
        };
        Ok(Manga::new(ImagePattern::new(&self.image_origin)?, &self.output)
            .concurrency(Concurrency::from(self.jobs))
            .failure_policy(failure_policy))
    }

    /// Works out what to download, asking on `input` for anything the flags
    /// left out.
    pub fn job<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<Job> {
        if let Some(url) = &self.page {
            return Ok(Job::Single { url: url.clone() });
        }
        if self.single {
            let url = prompt(input, out, "Chapter page URL: ")?;
            return Ok(Job::Single { url });
        }

        let base_url = match &self.base_url {
            Some(base_url) => base_url.clone(),
            None => prompt(input, out, "Base URL (e.g. https://site.com/manga/): ")?,
        };
        let chapters = match &self.chapters {
            Some(range) => range.chapters()?,
            None => {
                let start = prompt_chapter(input, out, "Start from chapter: ")?;
                let end = prompt_chapter(input, out, "Up to chapter: ")?;
                start..=end
            }
        };

        Ok(Job::Range { base_url, chapters })
    }
}

/// Asks `question` until a non blank answer comes back.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    loop {
        write!(out, "{}", question)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("No answer to {:?}", question.trim_end_matches(": "));
        }
        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

fn prompt_chapter<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> Result<u32> {
    let answer = prompt(input, out, question)?;
    answer
        .parse()
        .with_context(|| format!("{:?} is not a chapter number", answer))
}
