use crate::models::FileItem;
use ignore::WalkBuilder;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Canonicalizes a user-supplied path, rejecting paths that do not exist.
pub fn validate_path(requested_path: &str) -> Result<PathBuf, String> {
    let base_path = PathBuf::from(requested_path);
    if !base_path.exists() {
        return Err(format!("Path does not exist: {}", requested_path));
    }
    base_path
        .canonicalize()
        .map_err(|e| format!("Failed to canonicalize path: {}", e))
}

/// Like `validate_path`, but the target must be a directory.
pub fn validate_directory(requested_path: &str) -> Result<PathBuf, String> {
    let path = validate_path(requested_path)?;
    if !path.is_dir() {
        return Err(format!("Not a directory: {}", requested_path));
    }
    Ok(path)
}

fn icon_for(name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        "📁"
    } else if name.ends_with(".py") {
        "🐍"
    } else {
        "📄"
    }
}

/// Lists the immediate children of a directory for the file-tree sidebar.
/// Hidden entries are skipped; directories sort first, natural order within
/// each kind.
pub fn list_directory(path: &Path) -> Result<Vec<FileItem>, String> {
    debug!("Listing directory: {}", path.display());
    let entries = fs::read_dir(path).map_err(|e| format!("Failed to read directory: {}", e))?;
    let mut items = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read directory entry: {}", e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let entry_path = entry.path();
        let is_dir = entry_path.is_dir();
        items.push(FileItem {
            icon: icon_for(&name, is_dir).to_string(),
            path: entry_path.to_string_lossy().to_string(),
            name,
            is_dir,
        });
    }

    items.sort_by(|a, b| {
        if a.is_dir != b.is_dir {
            return b.is_dir.cmp(&a.is_dir);
        }
        natord::compare(&a.name, &b.name)
    });
    Ok(items)
}

/// Walks a directory and returns the forward-slash relative paths of every
/// file under it, honoring .gitignore and skipping hidden entries. The result
/// feeds `path_tree::build_path_tree`, giving the same nested shape the
/// browser-side directory picker produces.
pub fn relative_paths(root: &Path) -> Result<Vec<String>, String> {
    debug!("Walking directory for relative paths: {}", root.display());
    let mut paths = Vec::new();
    // Gitignore rules apply whether or not the folder is a git checkout.
    for result in WalkBuilder::new(root).require_git(false).build() {
        let entry = result.map_err(|e| format!("Failed to walk directory: {}", e))?;
        if !entry.file_type().map_or(false, |ft| ft.is_file()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| format!("Walked outside the root: {}", e))?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        paths.push(segments.join("/"));
    }
    paths.sort();
    Ok(paths)
}
