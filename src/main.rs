use anyhow::Result;
use log::*;
use std::path::PathBuf;
use std::sync::Arc;
use todo_tui::{
    app::App,
    backend::{Backend, HttpBackend, LocalBackend},
    cli::{build_cli, Command},
    config::Config,
    gateway::Gateway,
    logger::{level_for_verbosity, Logger, Sink},
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let mut config = Config::new();
    config.load(matches.value_of("config"))?;
    if let ("token", Some(sub)) = matches.subcommand() {
        config.save_todoist_token(sub.value_of("token").unwrap_or_default())?;
        if let Some(path) = config.file_path() {
            println!("Todoist token saved to {}", path.display());
        }
        return Ok(());
    }
    if let Some(url) = matches.value_of("api") {
        config.api_url = Some(url.to_string());
    }
    if let Some(dir) = matches.value_of("local") {
        config.api_url = None;
        config.data_dir = Some(PathBuf::from(dir));
    }
    let level = level_for_verbosity(matches.occurrences_of("verbose"));

    let command = Command::from_matches(&matches)?;
    match command {
        Some(command) => {
            Logger::new(level, Sink::Stderr).init()?;
            let gateway = Gateway::new(open_backend(&config)?);
            command.execute(&gateway, &mut std::io::stdout()).await
        }
        None => {
            let backend = open_backend(&config)?;
            App::start(config, backend, level).await
        }
    }
}

/// Return the remote backend when a URL is configured, otherwise the
/// standalone one on the data directory.
///
fn open_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    match &config.api_url {
        Some(url) => {
            debug!("Using backend at {}", url);
            Ok(Arc::new(HttpBackend::new(url, config.request_timeout())?))
        }
        None => {
            let dir = config.resolved_data_dir()?;
            debug!("Running standalone on {}", dir.display());
            Ok(Arc::new(LocalBackend::open(&dir, config.todoist_settings())?))
        }
    }
}
