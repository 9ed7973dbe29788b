use crate::ai::{ChatClient, ChatError};
use crate::code_blocks::{parse_ai_response, DEFAULT_HEURISTICS};
use crate::config::ConfigUpdate;
use crate::file_system::{list_directory, validate_directory, validate_path};
use crate::models::{
    ChatRequest, DeleteRequest, DirectoryRequest, ListRequest, NewFileRequest, OpenRequest,
    RenameRequest, RunRequest, SaveRequest, SaveTempRequest, TreeRequest,
};
use crate::path_tree::build_path_tree;
use crate::runner;
use crate::state::EditorState;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::{debug, info, warn};
use path_clean::PathClean;
use rust_embed::RustEmbed;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs as tokio_fs;
use tokio::sync::RwLock;

#[derive(RustEmbed)]
#[folder = "public/"]
struct Asset;

pub type SharedState = web::Data<RwLock<EditorState>>;

#[get("/api/connect")]
pub async fn connect() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "message": "Connection successful" }))
}

#[get("/api/config")]
pub async fn get_config(state: SharedState) -> HttpResponse {
    let state = state.read().await;
    HttpResponse::Ok().json(&state.config)
}

#[post("/api/config")]
pub async fn update_config(state: SharedState, req: web::Json<ConfigUpdate>) -> HttpResponse {
    let mut state = state.write().await;
    state.config.apply(req.into_inner());
    if let Err(e) = state.config.save() {
        warn!("Failed to persist config: {}", e);
        return HttpResponse::InternalServerError().json(json!({ "success": false, "error": e }));
    }
    info!("Config updated");
    HttpResponse::Ok().json(json!({ "success": true }))
}

#[post("/api/file/list")]
pub async fn list_files(state: SharedState, req: web::Json<ListRequest>) -> HttpResponse {
    let requested = match &req.path {
        Some(p) => Some(p.clone()),
        None => {
            let state = state.read().await;
            state
                .current_directory
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
        }
    };
    let requested = match requested {
        Some(p) => p,
        None => {
            warn!("File list request with no path and no open directory");
            return HttpResponse::BadRequest().json(json!({ "error": "Invalid path" }));
        }
    };

    let path = match validate_directory(&requested) {
        Ok(p) => p,
        Err(e) => {
            warn!("Path validation failed for '{}': {}", requested, e);
            return HttpResponse::BadRequest().json(json!({ "error": "Invalid path" }));
        }
    };

    match list_directory(&path) {
        Ok(items) => HttpResponse::Ok().json(json!({
            "items": items,
            "current_path": path.to_string_lossy(),
        })),
        Err(e) => {
            warn!("Failed to list '{}': {}", path.display(), e);
            HttpResponse::InternalServerError().json(json!({ "error": e }))
        }
    }
}

#[post("/api/file/open")]
pub async fn open_file(state: SharedState, req: web::Json<OpenRequest>) -> HttpResponse {
    debug!("Opening file: {}", req.path);
    match tokio_fs::read_to_string(&req.path).await {
        Ok(content) => {
            let path = PathBuf::from(&req.path);
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            {
                let mut state = state.write().await;
                state.set_current_file(&path);
                if let Err(e) = state.config.save() {
                    warn!("Failed to persist last_file: {}", e);
                }
            }
            info!("Opened file: {}", req.path);
            HttpResponse::Ok().json(json!({
                "success": true,
                "content": content,
                "filename": filename,
                "path": req.path,
            }))
        }
        Err(e) => {
            warn!("Failed to open file '{}': {}", req.path, e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[post("/api/file/save")]
pub async fn save_file(state: SharedState, req: web::Json<SaveRequest>) -> HttpResponse {
    let path = match &req.path {
        Some(p) => PathBuf::from(p),
        None => {
            let state = state.read().await;
            match &state.current_file {
                Some(p) => p.clone(),
                None => {
                    warn!("Save request with no path and no open file");
                    return HttpResponse::BadRequest().json(json!({ "error": "Path is required" }));
                }
            }
        }
    };

    match tokio_fs::write(&path, &req.content).await {
        Ok(()) => {
            let mut state = state.write().await;
            state.current_file = Some(path.clone());
            state.file_modified = false;
            info!("Saved file: {}", path.display());
            HttpResponse::Ok().json(json!({ "success": true, "message": "File saved" }))
        }
        Err(e) => {
            warn!("Failed to save file '{}': {}", path.display(), e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[post("/api/file/new")]
pub async fn new_file(state: SharedState, req: web::Json<NewFileRequest>) -> HttpResponse {
    if req.filename.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "Filename required" }));
    }
    let dirpath = match &req.dirpath {
        Some(p) => PathBuf::from(p),
        None => {
            let state = state.read().await;
            match &state.current_directory {
                Some(p) => p.clone(),
                None => {
                    warn!("New file request with no directory context");
                    return HttpResponse::BadRequest().json(json!({ "error": "Directory required" }));
                }
            }
        }
    };

    let path = dirpath.join(&req.filename).clean();
    match tokio_fs::write(&path, "").await {
        Ok(()) => {
            info!("Created file: {}", path.display());
            HttpResponse::Ok().json(json!({ "success": true, "path": path.to_string_lossy() }))
        }
        Err(e) => {
            warn!("Failed to create file '{}': {}", path.display(), e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[post("/api/file/delete")]
pub async fn delete_path(req: web::Json<DeleteRequest>) -> HttpResponse {
    let path = Path::new(&req.path);
    let result = if path.is_file() {
        tokio_fs::remove_file(path).await
    } else if path.is_dir() {
        tokio_fs::remove_dir_all(path).await
    } else {
        // Nothing on disk; deleting is a no-op, same as the original editor.
        warn!("Delete request for nonexistent path: {}", req.path);
        Ok(())
    };

    match result {
        Ok(()) => {
            info!("Deleted: {}", req.path);
            HttpResponse::Ok().json(json!({ "success": true }))
        }
        Err(e) => {
            warn!("Failed to delete '{}': {}", req.path, e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[post("/api/file/rename")]
pub async fn rename_path(req: web::Json<RenameRequest>) -> HttpResponse {
    let old_path = Path::new(&req.old_path);
    let new_path = match old_path.parent() {
        Some(parent) => parent.join(&req.new_name).clean(),
        None => PathBuf::from(&req.new_name),
    };

    match tokio_fs::rename(old_path, &new_path).await {
        Ok(()) => {
            info!("Renamed '{}' to '{}'", req.old_path, new_path.display());
            HttpResponse::Ok().json(json!({
                "success": true,
                "new_path": new_path.to_string_lossy(),
            }))
        }
        Err(e) => {
            warn!("Failed to rename '{}': {}", req.old_path, e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[post("/api/directory/open")]
pub async fn open_directory(state: SharedState, req: web::Json<DirectoryRequest>) -> HttpResponse {
    match validate_directory(&req.path) {
        Ok(path) => {
            let mut state = state.write().await;
            state.set_current_directory(&path);
            info!("Opened directory: {}", path.display());
            HttpResponse::Ok().json(json!({ "success": true, "path": path.to_string_lossy() }))
        }
        Err(e) => {
            warn!("Directory validation failed for '{}': {}", req.path, e);
            HttpResponse::BadRequest().json(json!({ "error": "Invalid directory" }))
        }
    }
}

#[post("/api/directory/tree")]
pub async fn directory_tree(req: web::Json<TreeRequest>) -> HttpResponse {
    let start_time = Instant::now();

    let paths: Vec<String> = if let Some(paths) = &req.paths {
        paths.clone()
    } else if let Some(path) = &req.path {
        let root = match validate_directory(path) {
            Ok(p) => p,
            Err(e) => {
                warn!("Path validation failed for '{}': {}", path, e);
                return HttpResponse::BadRequest().json(json!({ "success": false, "error": e }));
            }
        };
        match crate::file_system::relative_paths(&root) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Failed to walk '{}': {}", root.display(), e);
                return HttpResponse::InternalServerError()
                    .json(json!({ "success": false, "error": e }));
            }
        }
    } else {
        return HttpResponse::BadRequest()
            .json(json!({ "success": false, "error": "Either 'paths' or 'path' is required" }));
    };

    let tree = build_path_tree(paths.iter().map(String::as_str));
    let duration = start_time.elapsed();
    info!("Built tree from {} paths in {:.2?}.", paths.len(), duration);
    HttpResponse::Ok().json(json!({ "success": true, "tree": tree }))
}

#[post("/api/file/save_temp")]
pub async fn save_temp(req: web::Json<SaveTempRequest>) -> HttpResponse {
    match runner::save_temp_file(req.filename.as_deref(), &req.content).await {
        Ok(path) => {
            debug!("Saved temp file: {}", path.display());
            HttpResponse::Ok().json(json!({ "success": true, "path": path.to_string_lossy() }))
        }
        Err(e) => {
            warn!("Failed to save temp file: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e }))
        }
    }
}

#[post("/api/code/run")]
pub async fn run_code(state: SharedState, req: web::Json<RunRequest>) -> HttpResponse {
    let path = match &req.path {
        Some(p) => PathBuf::from(p),
        None => {
            let state = state.read().await;
            match &state.current_file {
                Some(p) => p.clone(),
                None => {
                    warn!("Run request with no path and no open file");
                    return HttpResponse::BadRequest().json(json!({ "error": "File not found" }));
                }
            }
        }
    };

    if !path.exists() {
        warn!("Run request for nonexistent file: {}", path.display());
        return HttpResponse::BadRequest().json(json!({ "error": "File not found" }));
    }

    match runner::run_file(&path) {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true, "message": "Code started" })),
        Err(e) => {
            warn!("Failed to run '{}': {}", path.display(), e);
            HttpResponse::InternalServerError().json(json!({ "error": e }))
        }
    }
}

#[post("/api/ai/chat")]
pub async fn ai_chat(
    state: SharedState,
    client: web::Data<ChatClient>,
    req: web::Json<ChatRequest>,
) -> HttpResponse {
    if req.message.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "Message required" }));
    }

    let (api_key, model) = {
        let state = state.read().await;
        let model = req
            .model
            .clone()
            .unwrap_or_else(|| state.config.selected_model.clone());
        (state.config.resolved_api_key(), model)
    };
    let api_key = match api_key {
        Some(key) => key,
        None => {
            warn!("Chat request without a configured API key");
            return HttpResponse::BadRequest().json(json!({ "error": "API key is not configured" }));
        }
    };

    info!("Chat request for model '{}'", model);
    let start_time = Instant::now();
    match client.chat(&api_key, &model, &req.message, &req.code).await {
        Ok(response) => {
            let duration = start_time.elapsed();
            info!("Chat request completed in {:.2?}.", duration);
            let parsed = parse_ai_response(&response, &req.message, &DEFAULT_HEURISTICS);
            HttpResponse::Ok().json(json!({
                "success": true,
                "response": response,
                "prose": parsed.prose,
                "code_blocks": parsed.code,
                "has_code": !parsed.code.is_empty(),
            }))
        }
        Err(e) => {
            warn!("Chat request failed: {}", e);
            let status = match &e {
                ChatError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ChatError::Connect => StatusCode::SERVICE_UNAVAILABLE,
                ChatError::Api { status, .. } => StatusCode::from_u16(*status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let message = match e {
                ChatError::Api { message, .. } => message,
                other => other.to_string(),
            };
            HttpResponse::build(status).json(json!({ "error": message }))
        }
    }
}

pub async fn static_handler(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };
    debug!("Serving static asset: {}", path);

    match Asset::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(content.data.into_owned())
        }
        None => HttpResponse::NotFound().body("404 Not Found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use actix_web::{test, App};
    use serde_json::Value;
    use tempfile::tempdir;

    fn shared_state() -> SharedState {
        web::Data::new(RwLock::new(EditorState::new(EditorConfig::default())))
    }

    #[actix_rt::test]
    async fn connect_reports_success() {
        let app = test::init_service(App::new().service(connect)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/connect").to_request()).await;
        assert!(resp.status().is_success());
    }

    // Tests that persist the config share one stable location; per-test
    // tempdirs would race through the process-global env var.
    fn point_config_at_temp() {
        std::env::set_var("EDITOR_CONFIG", std::env::temp_dir().join("codedesk_test_config.json"));
    }

    #[actix_rt::test]
    async fn config_round_trip() {
        point_config_at_temp();
        let state = shared_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(get_config)
                .service(update_config),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/config").to_request()).await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert!(body["models"].as_array().unwrap().len() > 1);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/config")
                .set_json(json!({ "selected_model": "test/model" }))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        assert_eq!(state.read().await.config.selected_model, "test/model");
    }

    #[actix_rt::test]
    async fn save_then_open_round_trips_content() {
        point_config_at_temp();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("script.py");
        let state = shared_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(save_file)
                .service(open_file),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/file/save")
                .set_json(json!({ "path": file_path.to_str().unwrap(), "content": "print(1)\n" }))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/file/open")
                .set_json(json!({ "path": file_path.to_str().unwrap() }))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["content"], "print(1)\n");
        assert_eq!(body["filename"], "script.py");
        assert!(!state.read().await.file_modified);
    }

    #[actix_rt::test]
    async fn list_without_path_or_directory_is_rejected() {
        let app = test::init_service(App::new().app_data(shared_state()).service(list_files)).await;
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/file/list").set_json(json!({})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn tree_from_browser_paths() {
        let app = test::init_service(App::new().service(directory_tree)).await;
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/directory/tree")
                .set_json(json!({ "paths": ["proj/src/a.py", "proj/readme.md"] }))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["tree"],
            json!({ "proj": { "src": { "a.py": null }, "readme.md": null } })
        );
    }

    #[actix_rt::test]
    async fn tree_requires_some_input() {
        let app = test::init_service(App::new().service(directory_tree)).await;
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/directory/tree").set_json(json!({})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn new_file_and_rename() {
        let dir = tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(shared_state())
                .service(new_file)
                .service(rename_path)
                .service(delete_path),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/file/new")
                .set_json(json!({ "dirpath": dir.path().to_str().unwrap(), "filename": "draft.py" }))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        let created = dir.path().join("draft.py");
        assert!(created.exists());

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/file/rename")
                .set_json(json!({ "old_path": created.to_str().unwrap(), "new_name": "final.py" }))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        let renamed = dir.path().join("final.py");
        assert!(renamed.exists());

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/file/delete")
                .set_json(json!({ "path": renamed.to_str().unwrap() }))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        assert!(!renamed.exists());
    }

    #[actix_rt::test]
    async fn chat_rejects_empty_message() {
        let client = web::Data::new(ChatClient::new().unwrap());
        let app = test::init_service(
            App::new()
                .app_data(shared_state())
                .app_data(client)
                .service(ai_chat),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/ai/chat")
                .set_json(json!({ "message": "" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
