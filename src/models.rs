use serde::{Deserialize, Serialize};

/// One entry in a directory listing, shaped for the file-tree sidebar.
#[derive(Debug, Serialize)]
pub struct FileItem {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct ListRequest {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub path: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct NewFileRequest {
    pub dirpath: Option<String>,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub old_path: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryRequest {
    pub path: String,
}

/// Tree request: either an explicit relative path list (browser directory
/// picker) or a server-side directory to walk.
#[derive(Debug, Deserialize)]
pub struct TreeRequest {
    pub paths: Option<Vec<String>>,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub code: String,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveTempRequest {
    pub filename: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub path: Option<String>,
}
