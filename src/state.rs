use crate::config::EditorConfig;
use std::path::{Path, PathBuf};

/// Per-session editor state shared across handlers.
///
/// Created once on startup and guarded by an `RwLock` behind `web::Data`;
/// replaces the free-floating globals of the original frontend.
#[derive(Debug)]
pub struct EditorState {
    pub current_file: Option<PathBuf>,
    pub file_modified: bool,
    pub current_directory: Option<PathBuf>,
    pub config: EditorConfig,
}

impl EditorState {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            current_file: None,
            file_modified: false,
            current_directory: None,
            config,
        }
    }

    /// Records a freshly opened or saved file and remembers it as the last
    /// file in the config.
    pub fn set_current_file(&mut self, path: &Path) {
        self.current_file = Some(path.to_path_buf());
        self.file_modified = false;
        self.config.last_file = path.to_string_lossy().to_string();
    }

    pub fn set_current_directory(&mut self, path: &Path) {
        self.current_directory = Some(path.to_path_buf());
    }
}
