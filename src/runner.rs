use log::info;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

const DEFAULT_TEMP_NAME: &str = "temp_script.py";

/// Replaces characters that are path separators or forbidden in filenames on
/// at least one supported platform.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

/// Writes an unsaved editor buffer into the OS temp directory so it can be
/// handed to the interpreter.
pub async fn save_temp_file(filename: Option<&str>, content: &str) -> Result<PathBuf, String> {
    let name = sanitize_filename(filename.unwrap_or(DEFAULT_TEMP_NAME));
    let path = env::temp_dir().join(name);
    fs::write(&path, content)
        .await
        .map_err(|e| format!("Failed to write temp file '{}': {}", path.display(), e))?;
    Ok(path)
}

fn interpreter() -> String {
    env::var("PYTHON").unwrap_or_else(|_| "python3".to_string())
}

/// Launches the interpreter on a file and detaches. Output is not captured
/// and the process is never waited on, matching the editor's fire-and-forget
/// run button.
pub fn run_file(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()));
    }
    let program = interpreter();
    let child = Command::new(&program)
        .arg(path)
        .spawn()
        .map_err(|e| format!("Failed to launch '{}': {}", program, e))?;
    info!(
        "Started '{} {}' (pid {:?})",
        program,
        path.display(),
        child.id()
    );
    Ok(())
}
