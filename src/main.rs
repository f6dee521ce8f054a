use anyhow::Result;
use dotenvy::dotenv;
use ricemill::App;
use ricemill::bridge::Request;
use ricemill::config::AppConfig;
use ricemill::dialog::TerminalDialogs;
use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

fn init_logging() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "ricemill=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    }
}

/// Reads one request per stdin line and answers each on its own stdout line.
/// File dialogs prompt on stderr and take their answer from the next line.
fn main() -> Result<()> {
    dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let mut app = App::open(&config, Box::new(TerminalDialogs))?;
    info!(path = %config.db_path().display(), "store ready");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        // Lock per line so dialogs can read the following line themselves.
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(trimmed) {
            Ok(request) => app.handle_request(request),
            Err(err) => {
                warn!(error = %err, "malformed request");
                json!({ "error": format!("Malformed request: {err}") })
            }
        };

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }

    info!("stdin closed, exiting");
    Ok(())
}
