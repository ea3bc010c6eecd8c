use std::path::{Path, PathBuf};
use tokio::fs;
use crate::utils::{SolverError, SolverResult};

/// Get file extension as string
pub fn get_extension(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_string())
}

/// Get the file name without its final extension
pub fn file_stem(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Lists regular files in `dir` whose extension matches `extension`
/// exactly, in directory enumeration order.
pub async fn files_with_extension(dir: impl AsRef<Path>, extension: &str) -> SolverResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| SolverError::filesystem(dir, e))?;

    let mut matches = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SolverError::filesystem(dir, e))?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file && get_extension(&path).as_deref() == Some(extension) {
            matches.push(path);
        }
    }
    Ok(matches)
}
