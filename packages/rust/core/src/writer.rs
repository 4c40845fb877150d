//! `documentation.json` output.
//!
//! The file is written to a hidden temp sibling first and renamed into place,
//! so an interrupted or failed run never leaves a truncated file behind.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use navtree_shared::{Documentation, NavTreeError, Result};

/// Write `doc` as pretty-printed JSON to `path`, atomically.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_documentation(path: &Path, doc: &Documentation) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| NavTreeError::io(parent, e))?;
    }

    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');

    let temp = temp_path(path);
    if let Err(e) = std::fs::write(&temp, &json) {
        let _ = std::fs::remove_file(&temp);
        return Err(NavTreeError::io(&temp, e));
    }

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(NavTreeError::io(path, e));
    }

    debug!(bytes = json.len(), "wrote documentation file");
    Ok(())
}

/// Load a previously written documentation file.
pub fn read_documentation(path: &Path) -> Result<Documentation> {
    let content = std::fs::read_to_string(path).map_err(|e| NavTreeError::io(path, e))?;

    serde_json::from_str(&content)
        .map_err(|e| NavTreeError::parse(format!("failed to parse {}: {e}", path.display())))
}

/// `dir/.name.tmp` next to the target.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "documentation.json".into());
    path.with_file_name(format!(".{name}.tmp"))
}
