// tests/materialize.rs

mod common;

use std::fs;
use std::path::Path;
use std::time::Duration;

use atlas_scrape::config::consts::METADATA_FILE;
use atlas_scrape::file::materialize_images;
use atlas_scrape::scrape::fetch_case;
use atlas_scrape::specs::DetailSpec;
use atlas_scrape::{CaseRecord, CaseSummary, ErrorKind};
use common::{FixtureSite, Recorder, SITE};
use url::Url;

fn records(site: &FixtureSite) -> Vec<CaseRecord> {
    let spec = DetailSpec::new().unwrap();
    [(1, "AABB"), (2, "AACC")]
        .into_iter()
        .map(|(n, id)| {
            let summary = CaseSummary {
                case_number: n,
                case_id: id.to_string(),
                detail_link: Url::parse(SITE)
                    .unwrap()
                    .join(&format!("atlascolpodetail.php?Id={id}&cat=31"))
                    .unwrap(),
                listing_diagnosis: Some("Squamous cell carcinoma".to_string()),
            };
            fetch_case(site, &spec, &summary).unwrap()
        })
        .collect()
}

fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    for case in fs::read_dir(root).unwrap() {
        let case = case.unwrap().path();
        for f in fs::read_dir(&case).unwrap() {
            let f = f.unwrap().path();
            files.push((f.strip_prefix(root).unwrap().display().to_string(), fs::read(&f).unwrap()));
        }
    }
    files.sort();
    files
}

#[test]
fn second_run_fetches_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("images_31");
    let site = FixtureSite::atlas();
    let recs = records(&site);
    site.requests.borrow_mut().clear();

    let first = materialize_images(&site, &recs, &root, Duration::ZERO, None);
    assert_eq!(first.downloaded, 4);
    assert!(first.failures.is_empty());
    assert_eq!(site.requests.borrow().len(), 4);
    let before = snapshot(&root);
    assert_eq!(before.len(), 6); // 4 images + 2 sidecars

    site.requests.borrow_mut().clear();
    let second = materialize_images(&site, &recs, &root, Duration::ZERO, None);
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.skipped_existing, 4);
    assert_eq!(second.bytes_written, 0);
    assert!(site.requests.borrow().is_empty());
    assert_eq!(snapshot(&root), before);
}

#[test]
fn partial_folder_only_fetches_what_is_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("images");
    let site = FixtureSite::atlas();
    let recs = records(&site);

    let dir = root.join("case_AABB");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("2_After_acetic_acid.jpg"), b"kept").unwrap();
    site.requests.borrow_mut().clear();

    let report = materialize_images(&site, &recs, &root, Duration::ZERO, None);
    assert_eq!(report.downloaded, 3);
    assert_eq!(report.skipped_existing, 1);
    assert_eq!(site.requested("AABB2.jpg"), 0);
    assert_eq!(fs::read(dir.join("2_After_acetic_acid.jpg")).unwrap(), b"kept");
}

#[test]
fn per_file_failures_do_not_stop_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("images_31");
    // AABB3.jpg is missing from the site.
    let site = FixtureSite::new()
        .with(common::LIST_URL, common::fixture("listing.html"))
        .with("atlascolpodetail.php?Id=AABB&cat=31", common::fixture("detail_AABB.html"))
        .with("atlascolpodetail.php?Id=AACC&cat=31", common::fixture("detail_AACC.html"))
        .with("atlas/AABB1.jpg", b"one".to_vec())
        .with("atlas/AABB2.jpg", b"two".to_vec())
        .with("atlas/AACC1.jpg", b"three".to_vec());
    let recs = records(&site);

    // A directory squats on the first image's file name.
    let aabb = root.join("case_AABB");
    fs::create_dir_all(aabb.join("1_After_normal_saline.jpg")).unwrap();

    let mut progress = Recorder::default();
    let report = materialize_images(&site, &recs, &root, Duration::ZERO, Some(&mut progress));

    assert_eq!(report.cases, 2);
    assert_eq!(report.downloaded, 2);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].error.kind(), ErrorKind::Filesystem);
    assert!(report.failures[0].target.ends_with("1_After_normal_saline.jpg"));
    assert_eq!(report.failures[1].error.kind(), ErrorKind::Network);
    assert!(report.failures[1].target.ends_with("3_After_Lugols_iodine.jpg"));

    assert!(aabb.join("2_After_acetic_acid.jpg").is_file());
    assert!(!aabb.join("3_After_Lugols_iodine.jpg").exists());
    assert!(!aabb.join("1_After_normal_saline.jpg.part").exists());
    assert_eq!(fs::read(root.join("case_AACC").join("1_After_acetic_acid.jpg")).unwrap(), b"three");
    assert_eq!(progress.events.iter().filter(|e| e.starts_with("failed")).count(), 2);
    assert_eq!(progress.events.first().map(String::as_str), Some("begin images 4"));
}

#[test]
fn blocked_case_folder_skips_only_that_case() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("images_31");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("case_AABB"), b"not a folder").unwrap();
    let site = FixtureSite::atlas();
    let recs = records(&site);

    let report = materialize_images(&site, &recs, &root, Duration::ZERO, None);
    assert_eq!(report.cases, 1);
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].case_id, "AABB");
    assert!(root.join("case_AACC").join(METADATA_FILE).is_file());
}

#[test]
fn downloads_are_paced_within_and_across_cases() {
    let tmp = tempfile::tempdir().unwrap();
    let site = FixtureSite::atlas();
    let recs = records(&site);

    let started = std::time::Instant::now();
    let report = materialize_images(&site, &recs, &tmp.path().join("images_31"), Duration::from_millis(30), None);
    assert_eq!(report.downloaded, 4);
    // Three pauses: between AABB's images and across to AACC, none before the first.
    assert!(started.elapsed() >= Duration::from_millis(90));
}

#[test]
fn present_files_cost_no_pause() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("images_31");
    let site = FixtureSite::atlas();
    let recs = records(&site);
    materialize_images(&site, &recs, &root, Duration::ZERO, None);

    let started = std::time::Instant::now();
    let report = materialize_images(&site, &recs, &root, Duration::from_millis(250), None);
    assert_eq!(report.skipped_existing, 4);
    assert!(started.elapsed() < Duration::from_millis(250));
}
