// src/config/consts.rs

// Net config
pub const BASE_ORIGIN: &str = "https://www.cwl.gov.cn";
pub const NOTICE_PATH: &str = "/ygkj/kjgg/";
pub const USER_AGENT: &str = concat!("cwl_scrape/", env!("CARGO_PKG_VERSION"));
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9";

// Archive
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_ARCHIVE_FILE: &str = "lottery_data.json";
pub const LOCK_SUFFIX: &str = "lock";
pub const CORRUPT_SUFFIX: &str = "corrupt";
pub const STALE_LOCK_SECS: u64 = 30 * 60; // longest plausible run, with margin
