use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;
use std::path::{Path, PathBuf};

/// Where the site serves chapter images from.
pub const DEFAULT_IMAGE_ORIGIN: &str = "https://img-id.gmbr.pro";

lazy_static! {
    static ref DEFAULT_PATTERN: ImagePattern = ImagePattern::compile(DEFAULT_IMAGE_ORIGIN)
        .expect("default image pattern is a valid regex");
    /// Every `img` element of a chapter page.
    pub static ref IMAGES: Selector = Selector::parse("img").expect("img is a valid selector");
}

/// Matches `<origin>/uploads/manga-images/.../chapter-<N>/<M>.jpg`.
#[derive(Debug, Clone)]
pub struct ImagePattern {
    regex: Regex,
}

impl ImagePattern {
    pub fn new(origin: &str) -> Result<Self> {
        if origin == DEFAULT_IMAGE_ORIGIN {
            return Ok(DEFAULT_PATTERN.clone());
        }
        Self::compile(origin)
    }

    fn compile(origin: &str) -> Result<Self> {
        let regex = Regex::new(&format!(
            r"{}/uploads/manga-images/.+/chapter-(\d+)/(\d+)\.jpg",
            regex::escape(origin.trim_end_matches('/'))
        ))
        .with_context(|| format!("Unable to build an image pattern for {:?}", origin))?;
        Ok(Self { regex })
    }

    /// Pulls the chapter and ordinal out of an image source, `None` if the
    /// source isn't one of the chapter images.
    pub fn parse(&self, src: &str) -> Option<Page> {
        let captures = self.regex.captures(src)?;
        Some(Page {
            url: src.to_string(),
            chapter: captures.get(1)?.as_str().to_string(),
            ordinal: captures.get(2)?.as_str().to_string(),
        })
    }
}

impl Default for ImagePattern {
    fn default() -> Self {
        DEFAULT_PATTERN.clone()
    }
}

/// One chapter image found on a chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub chapter: String,
    pub ordinal: String,
}

impl Page {
    /// `cha<chapter>_<ordinal>.jpg`, the ordinal zero padded to two places.
    pub fn file_name(&self) -> String {
        format!("cha{}_{:0>2}.jpg", self.chapter, self.ordinal)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Numeric ordinal for sorting, falls back to the end if it overflows.
    pub fn position(&self) -> u64 {
        self.ordinal.parse().unwrap_or(u64::MAX)
    }
}
