use super::page::{ImagePattern, Page, IMAGES};
use anyhow::{bail, Context, Result};
use futures::{stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use scraper::Html;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tokio::{fs::File, io::AsyncWriteExt};

/// How many image requests a chapter may have in flight at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Concurrency {
    /// One request per image on the page.
    #[default]
    Unbounded,
    Limited(usize),
}

impl Concurrency {
    fn limit(&self, pages: usize) -> usize {
        match self {
            Concurrency::Unbounded => pages.max(1),
            Concurrency::Limited(jobs) => (*jobs).max(1),
        }
    }
}

impl From<Option<usize>> for Concurrency {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Concurrency::Unbounded, Concurrency::Limited)
    }
}

/// What a failed image download does to its chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log it and archive whatever did download.
    #[default]
    Tolerate,
    /// Fail the whole chapter.
    Strict,
}

#[derive(Debug, Clone)]
pub struct Chapter {
    /// The page listing the chapter images.
    pub url: String,
    /// Directory the images are saved in.
    pub path: PathBuf,
}

/// The images of a chapter that made it to disk.
#[derive(Debug, Default)]
pub struct Grabbed {
    /// Chapter number as written in the image URLs, `None` if no image matched.
    pub chapter: Option<String>,
    /// Saved images in page order.
    pub files: Vec<PathBuf>,
    /// URLs of the images that couldn't be saved.
    pub failed: Vec<String>,
}

impl Chapter {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }

    /// Finds every chapter image on the page.
    pub async fn fetch_pages(&self, client: &Client, pattern: &ImagePattern) -> Result<Vec<Page>> {
        let html = client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Fetching chapter page {}", self.url))?
            .text()
            .await
            .with_context(|| format!("Reading chapter page {}", self.url))?;

        Ok(extract_pages(&html, pattern))
    }

    /// Downloads every chapter image on the page into `self.path`, all of
    /// them finished before this returns.
    pub async fn grab(
        &self,
        client: &Client,
        pattern: &ImagePattern,
        concurrency: Concurrency,
        failure_policy: FailurePolicy,
    ) -> Result<Grabbed> {
        let found = self.fetch_pages(client, pattern).await?;
        let chapter = found.last().map(|page| page.chapter.clone());

        // The same image twice on a page would write the same file twice
        let mut seen = HashSet::new();
        let mut pages: Vec<Page> = found
            .into_iter()
            .filter(|page| seen.insert(page.file_name()))
            .collect();
        pages.sort_by_key(Page::position);

        let style = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
        )?;
        let pages_bar = ProgressBar::new(pages.len() as u64)
            .with_message("Downloading Pages")
            .with_style(style);

        let limit = concurrency.limit(pages.len());
        let results = stream::iter(pages)
            .enumerate()
            .map(|(index, page)| {
                let pages_bar = &pages_bar;
                async move {
                    let path = page.path_in(&self.path);
                    let result = Chapter::save_page(client, &page.url, &path).await;
                    if result.is_ok() {
                        pages_bar.suspend(|| println!("Saved {}", path.display()));
                    }
                    pages_bar.inc(1);
                    (index, page, path, result)
                }
            })
            .buffer_unordered(limit)
            .collect::<Vec<_>>()
            .await;
        pages_bar.finish_and_clear();

        let mut saved = Vec::new();
        let mut failed = Vec::new();
        for (index, page, path, result) in results {
            match result {
                Ok(()) => saved.push((index, path)),
                Err(e) => {
                    log::warn!("Skipping {}: {:#}", page.url, e);
                    failed.push((index, page.url));
                }
            }
        }
        saved.sort_by_key(|(index, _)| *index);
        failed.sort_by_key(|(index, _)| *index);

        if failure_policy == FailurePolicy::Strict && !failed.is_empty() {
            bail!(
                "{} of {} images failed to download",
                failed.len(),
                failed.len() + saved.len()
            );
        }

        Ok(Grabbed {
            chapter,
            files: saved.into_iter().map(|(_, path)| path).collect(),
            failed: failed.into_iter().map(|(_, url)| url).collect(),
        })
    }

    /// Streams one image to `path`, replacing anything already there.
    async fn save_page(client: &Client, url: &str, path: &Path) -> Result<()> {
        let mut response = client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Requesting {}", url))?;

        let mut file = File::create(path)
            .await
            .with_context(|| format!("Creating {}", path.display()))?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

/// Chapter images referenced by `img` tags, in document order.
pub fn extract_pages(html: &str, pattern: &ImagePattern) -> Vec<Page> {
    Html::parse_document(html)
        .select(&IMAGES)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| pattern.parse(src))
        .collect()
}
