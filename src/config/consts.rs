// src/config/consts.rs

// Net config
pub const DEFAULT_LIST_URL: &str = "https://screening.iarc.fr/atlascolpodiag_list.php?FinalDiag=31&e=,0,1,2,3,8,10,15,19,30,31,43,46,47,60,61,68,73,83,88,89,93,96,102,105,111#0";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const TIMEOUT_SECS: u64 = 30;
pub const MAX_REDIRECTS: usize = 5;

// Listing query parameter naming the diagnostic category
pub const GRADE_PARAM: &str = "FinalDiag";

// Pacing (be polite)
pub const DETAIL_PAUSE_MS: u64 = 1_000;
pub const IMAGE_PAUSE_MS: u64 = 500;

// Export
pub const DEFAULT_TABLE_FILE: &str = "colposcopy_cases";
pub const DEFAULT_IMAGES_DIR: &str = "images";
pub const CASE_DIR_PREFIX: &str = "case_";
pub const METADATA_FILE: &str = "metadata.txt";
pub const DEFAULT_IMAGE_EXT: &str = ".jpg";

// Swede score value color on detail pages
pub const SWEDE_SCORE_COLOR: &str = "#FFAB19";
