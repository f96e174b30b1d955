// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::consts::*;
use crate::core::sanitize::file_stem;
use crate::error::{Result, ScrapeError};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppOptions {
    pub scrape: ScrapeOptions,
    pub export: ExportOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub list_url: Url,
    /// Follow "next" links on the listing. Off = first page only.
    pub follow_pagination: bool,
    pub net: NetOptions,
    pub pacing: Pacing,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            list_url: default_list_url(),
            follow_pagination: true,
            net: NetOptions::default(),
            pacing: Pacing::default(),
        }
    }
}

impl ScrapeOptions {
    pub fn set_list_url(&mut self, text: &str) -> Result<()> {
        self.list_url = Url::parse(text.trim())
            .map_err(|source| ScrapeError::Url { input: s!(text), source })?;
        Ok(())
    }

    /// The diagnostic category of the listing (`FinalDiag=31` → `"31"`).
    pub fn grade(&self) -> Option<String> {
        self.list_url
            .query_pairs()
            .find(|(k, _)| k == GRADE_PARAM)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn default_list_url() -> Url {
    Url::parse(DEFAULT_LIST_URL).expect("DEFAULT_LIST_URL is an absolute URL")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(TIMEOUT_SECS),
            user_agent: s!(USER_AGENT),
        }
    }
}

/// Fixed blocking pauses between successive requests of the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub detail: Duration,
    pub image: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            detail: Duration::from_millis(DETAIL_PAUSE_MS),
            image: Duration::from_millis(IMAGE_PAUSE_MS),
        }
    }
}

impl Pacing {
    /// No pauses at all (fixtures, tests).
    pub fn none() -> Self {
        Self { detail: Duration::ZERO, image: Duration::ZERO }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> char {
        match self { ExportFormat::Csv => ',', ExportFormat::Tsv => '\t' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Explicit table path. `None` → `<DEFAULT_TABLE_FILE>.<ext>` in the working dir.
    pub table_path: Option<PathBuf>,
    /// Explicit images root. `None` → `images_<grade>` (or `images`).
    pub images_dir: Option<PathBuf>,
    /// Gate for image materialization, decided before the run.
    pub download_images: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            table_path: None,
            images_dir: None,
            download_images: false,
        }
    }
}

impl ExportOptions {
    pub fn table_path(&self) -> PathBuf {
        match &self.table_path {
            Some(p) => p.clone(),
            None => PathBuf::from(join!(DEFAULT_TABLE_FILE, ".", self.format.ext())),
        }
    }

    pub fn images_root(&self, grade: Option<&str>) -> PathBuf {
        if let Some(dir) = &self.images_dir {
            return dir.clone();
        }
        match grade {
            Some(g) => PathBuf::from(join!(DEFAULT_IMAGES_DIR, "_", &file_stem(g, "x"))),
            None => PathBuf::from(DEFAULT_IMAGES_DIR),
        }
    }
}
