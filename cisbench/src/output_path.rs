//! Output file naming

use std::path::{Path, PathBuf};

/// First free path for `stem.extension` in `dir`
///
/// Returns `dir/stem.extension` when nothing exists there, otherwise the
/// first of `stem(1).extension`, `stem(2).extension`, ... that is free.
///
/// # Parameters
/// * `dir` - Directory the file will be written to
/// * `stem` - File name without extension
/// * `extension` - Extension without the leading dot
pub fn unique_output_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let candidate = dir.join(format!("{}.{}", stem, extension));
    if !candidate.exists() {
        return candidate;
    }

    (1usize..)
        .map(|n| dir.join(format!("{}({}).{}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
