use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for ethoschat
#[derive(Parser)]
#[command(name = "ethoschat")]
#[command(about = "Ethoschat - web chat front-end for a hosted ethics assistant")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the settings file holding the token issuer URL
    #[arg(long, value_name = "PATH", default_value = "settings.json")]
    pub settings: PathBuf,

    /// Web server port
    #[arg(long, default_value = "8080", env = "ETHOSCHAT_WEB_PORT")]
    pub web_port: u16,

    /// Web server bind address
    #[arg(long, default_value = "127.0.0.1", env = "ETHOSCHAT_WEB_BIND")]
    pub web_bind: String,

    /// Directory of extra static assets served under /static
    #[arg(long, value_name = "PATH")]
    pub web_dir: Option<PathBuf>,

    /// Append each conversation to a JSONL file under logs/
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub log_conversations: bool,

    /// Enable verbose debug output (dumps incoming WebSocket messages)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
