use anyhow::Result;
use colored::Colorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::web::routes::{self, AppState};
use crate::web::session_manager::SessionManager;

/// Web server configuration
pub struct WebServerConfig {
    pub bind_addr: SocketAddr,
    pub app_config: AppConfig,
    pub log_dir: Option<PathBuf>,
    pub web_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Web server instance
pub struct WebServer {
    config: WebServerConfig,
    session_manager: Arc<SessionManager>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebServerConfig) -> Self {
        let session_manager = Arc::new(SessionManager::new(
            config.app_config.clone(),
            config.log_dir.clone(),
        ));

        Self {
            config,
            session_manager,
        }
    }

    /// Start the web server
    pub async fn start(self) -> Result<()> {
        let app_state = AppState {
            session_manager: self.session_manager.clone(),
            verbose: self.config.verbose,
        };

        let mut app = routes::create_router(app_state);

        // CORS for development against a separately served page
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);

        // Serve extra static assets (the avatar icon lives here)
        if let Some(web_dir) = &self.config.web_dir {
            if web_dir.exists() {
                println!("Serving static files from: {}", web_dir.display());
                app = app.nest_service("/static", ServeDir::new(web_dir));
            }
        }

        println!("🌐 Web server starting on http://{}", self.config.bind_addr);
        println!(
            "   WebSocket endpoint: ws://{}/ws/{{session_id}}",
            self.config.bind_addr
        );
        println!(
            "   API endpoints: http://{}/api/sessions",
            self.config.bind_addr
        );

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Run the web server from parsed CLI arguments
pub async fn run_web_server(cli: &Cli, app_config: AppConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", cli.web_bind, cli.web_port).parse()?;

    println!("{} Starting ethoschat web server...", "🌐".cyan());
    println!("   Address: {}", addr);

    let config = WebServerConfig {
        bind_addr: addr,
        app_config,
        log_dir: cli.log_conversations.then(|| PathBuf::from(".")),
        web_dir: cli.web_dir.clone(),
        verbose: cli.verbose,
    };

    let server = WebServer::new(config);
    server.start().await
}
