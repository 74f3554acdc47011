use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Output file for one load into `table`: {table}-{YYMMDD}-{HHMMSSmmm}.parquet
///
/// Every run appends a new file instead of rewriting an earlier one.
pub fn load_file_path(output_dir: &Path, table: &str, at: DateTime<Utc>) -> PathBuf {
    let filename = format!("{}-{}.parquet", table, at.format("%y%m%d-%H%M%S%3f"));
    output_dir.join(filename)
}

/// First path from [`load_file_path`] that does not exist yet
///
/// Loads landing in the same millisecond get a `-1`, `-2`, ... suffix.
pub fn unique_load_path(output_dir: &Path, table: &str, at: DateTime<Utc>) -> PathBuf {
    let base = load_file_path(output_dir, table, at);
    if !base.exists() {
        return base;
    }

    let stem = format!("{}-{}", table, at.format("%y%m%d-%H%M%S%3f"));
    (1u32..)
        .map(|n| output_dir.join(format!("{}-{}.parquet", stem, n)))
        .find(|path| !path.exists())
        .unwrap_or(base)
}
