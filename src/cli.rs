// src/cli.rs
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{self, WrapErr};
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing::warn;

use crate::{
    config::{AppOptions, ExportFormat},
    core::HttpClient,
    progress::Progress,
    runner::{self, RunSummary},
};

#[derive(Parser, Debug)]
#[command(name = "atlas_scrape", version, about = "Scrape colposcopy atlas cases into a table and image folders")]
pub struct Args {
    /// Listing URL (its FinalDiag value names the images folder)
    #[arg(short, long, env = "ATLAS_LIST_URL")]
    pub url: Option<String>,

    /// Output table path [default: colposcopy_cases.<format>]
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Download images after the table is written
    #[arg(long, value_enum, default_value_t = ImagesChoice::Ask, env = "ATLAS_IMAGES")]
    pub images: ImagesChoice,

    /// Images root [default: images_<FinalDiag>]
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Only read the first listing page
    #[arg(long)]
    pub no_paginate: bool,

    #[arg(long, default_value_t = crate::config::consts::DETAIL_PAUSE_MS)]
    pub detail_delay_ms: u64,

    #[arg(long, default_value_t = crate::config::consts::IMAGE_PAUSE_MS)]
    pub image_delay_ms: u64,

    /// Per-request timeout
    #[arg(long, default_value_t = crate::config::consts::TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Tsv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ImagesChoice {
    Yes,
    No,
    /// Prompt once the table is written (no terminal → no)
    Ask,
}

impl Args {
    /// Map flags onto options. `Ask` leaves `download_images` off; the prompt decides later.
    pub fn to_options(&self) -> eyre::Result<AppOptions> {
        let mut opts = AppOptions::default();
        if let Some(u) = &self.url {
            opts.scrape.set_list_url(u)?;
        }
        opts.scrape.follow_pagination = !self.no_paginate;
        opts.scrape.pacing.detail = Duration::from_millis(self.detail_delay_ms);
        opts.scrape.pacing.image = Duration::from_millis(self.image_delay_ms);
        opts.scrape.net.timeout = Duration::from_secs(self.timeout_secs);

        opts.export.format = match self.format {
            Format::Csv => ExportFormat::Csv,
            Format::Tsv => ExportFormat::Tsv,
        };
        opts.export.table_path = self.out.clone();
        opts.export.images_dir = self.images_dir.clone();
        opts.export.download_images = self.images == ImagesChoice::Yes;
        Ok(opts)
    }
}

/// Prints one line per event on stdout.
pub struct ConsoleProgress {
    stage: String,
    total: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { stage: s!(), total: 0 }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, stage: &str, total: usize) {
        self.stage = s!(stage);
        self.total = total;
        println!("\nStarting {stage}: {total} items");
    }
    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }
    fn item_done(&mut self, index: usize, label: &str) {
        println!("  [{index}/{}] {label}", self.total);
    }
    fn item_failed(&mut self, index: usize, label: &str, reason: &str) {
        println!("  [{index}/{}] SKIPPED {label}: {reason}", self.total);
    }
    fn finish(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

pub fn run() -> eyre::Result<()> {
    let args = Args::parse();
    crate::log::init(args.verbose);

    let opts = args.to_options()?;
    let client = HttpClient::new(&opts.scrape.net)?;
    let mut progress = ConsoleProgress::new();

    println!("{}", "=".repeat(70));
    println!("IARC Atlas of Colposcopy Scraper");
    println!("{}", "=".repeat(70));

    let mut scraped = runner::scrape_and_export(&opts, &client, Some(&mut progress))
        .wrap_err("writing the case table failed")?;

    let want_images = match args.images {
        ImagesChoice::Yes => true,
        ImagesChoice::No => false,
        ImagesChoice::Ask => scraped.summary.table_path.is_some() && ask_download()?,
    };
    if want_images && !scraped.records.is_empty() {
        runner::download_images(&opts, &client, &mut scraped, Some(&mut progress));
    }

    print_summary(&scraped.summary);
    Ok(())
}

fn ask_download() -> eyre::Result<bool> {
    if !std::io::stdin().is_terminal() {
        warn!("no terminal attached; not downloading images (use --images yes)");
        return Ok(false);
    }
    println!();
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Do you want to download all images?")
        .default(false)
        .interact()
        .wrap_err("reading the download answer")
}

fn print_summary(s: &RunSummary) {
    println!("\n{}", "=".repeat(70));
    println!(
        "Listed {} cases over {} page(s); extracted {}, skipped {}.",
        s.cases_listed, s.listing_pages, s.extracted, s.skipped.len()
    );
    if s.malformed_rows > 0 {
        println!("Ignored {} malformed listing rows.", s.malformed_rows);
    }
    if let Some(e) = &s.listing_aborted {
        println!("Listing stopped early: {e}");
    }
    for sk in &s.skipped {
        println!("  skipped case {} ({}): {}", sk.case_number, sk.case_id, sk.error);
    }
    if let Some(r) = &s.images {
        println!(
            "Images: {} downloaded ({} bytes), {} already present, {} failed.",
            r.downloaded, r.bytes_written, r.skipped_existing, r.failures.len()
        );
        for f in &r.failures {
            println!("  {} {}: {}", f.case_id, f.target.display(), f.error);
        }
    }
    println!("{}", "=".repeat(70));
}
