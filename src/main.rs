mod ai;
mod code_blocks;
mod config;
mod file_system;
mod handlers;
mod models;
mod path_tree;
mod runner;
mod state;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use ai::ChatClient;
use config::EditorConfig;
use log::{info, warn};
use rustls::ServerConfig;
use rustls_pemfile::{certs, pkcs8_private_keys};
use state::EditorState;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tokio::sync::RwLock;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    // Log level defaults to info; override with RUST_LOG as usual.
    env::set_var("RUST_LOG", env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));
    env_logger::init();

    let port = env::var("PORT").unwrap_or_else(|_| "7783".to_string());
    let addr = format!("127.0.0.1:{}", port);
    info!("Server running at http://{}", addr);

    let editor_config = EditorConfig::load();
    let state = web::Data::new(RwLock::new(EditorState::new(editor_config)));
    let chat_client = web::Data::new(
        ChatClient::new().map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );

    let mut http_server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(chat_client.clone())
            .service(handlers::connect)
            .service(handlers::get_config)
            .service(handlers::update_config)
            .service(handlers::list_files)
            .service(handlers::open_file)
            .service(handlers::save_file)
            .service(handlers::new_file)
            .service(handlers::delete_path)
            .service(handlers::rename_path)
            .service(handlers::open_directory)
            .service(handlers::directory_tree)
            .service(handlers::save_temp)
            .service(handlers::run_code)
            .service(handlers::ai_chat)
            .default_service(web::to(handlers::static_handler))
    });

    if let (Ok(cert_path), Ok(key_path)) = (env::var("CERT_PATH"), env::var("KEY_PATH")) {
        if !Path::new(&cert_path).exists() || !Path::new(&key_path).exists() {
            warn!("CERT_PATH or KEY_PATH points to a non-existent file. Starting without HTTPS.");
            http_server = http_server.bind(addr)?;
        } else {
            info!("Attempting to start HTTPS server...");
            let cert_file = &mut BufReader::new(File::open(cert_path)?);
            let key_file = &mut BufReader::new(File::open(key_path)?);
            let cert_chain = certs(cert_file).collect::<Result<Vec<_>, _>>()?;
            let mut keys = pkcs8_private_keys(key_file).collect::<Result<Vec<_>, _>>()?;

            if keys.is_empty() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "No private keys found in key file",
                ));
            }

            let tls_config = ServerConfig::builder()
                .with_no_client_auth()
                .with_single_cert(cert_chain, keys.remove(0).into())
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

            info!("Successfully configured TLS. Binding to https://{}", addr);
            http_server = http_server.bind_rustls_0_23(addr, tls_config)?;
        }
    } else {
        info!("No CERT_PATH or KEY_PATH found in env. Starting plain HTTP server.");
        http_server = http_server.bind(addr)?;
    }

    http_server.run().await
}
