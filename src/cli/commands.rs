//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::datastore::{Connector, MemoryConnector, RecordStore, StoreError, MEMORY_SCHEME};
use crate::http_server::{HttpServer, TokenState};
use crate::observability::{init_logging, Event, LogFormat};
use crate::tokenizer::TokenService;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Connector for the configured datastore URI
///
/// Only the in-process `memory://` backend ships with the crate; any other
/// scheme is refused here, before the server binds.
pub fn build_connector(config: &Config) -> CliResult<Arc<dyn Connector>> {
    let uri = config.datastore.uri.as_str();
    if uri.starts_with(MEMORY_SCHEME) {
        return Ok(Arc::new(MemoryConnector::new()));
    }
    Err(CliError::Datastore(StoreError::datastore(format!(
        "unsupported datastore uri '{}': expected {}",
        uri, MEMORY_SCHEME
    ))))
}

/// Wires store, service and HTTP state from a loaded config
pub fn build_state(config: &Config) -> CliResult<Arc<TokenState>> {
    let store = RecordStore::new(config.datastore.store_config(), build_connector(config)?);
    let mut service = TokenService::new(Arc::new(store), config.datastore.collection.clone());
    if let Some(key) = config.encryption_key() {
        service = service.with_encryption_key(key)?;
    }
    Ok(Arc::new(TokenState::new(Arc::new(service), config.page_record_count)))
}

/// Start the HTTP server
///
/// `port` overrides the configured HTTP port.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    if let Err(e) = init_logging(&config.log_level, LogFormat::for_api_mode(&config.api_mode)) {
        eprintln!("{}", e);
    }
    info!(event = Event::BootStart.as_str(), api_mode = %config.api_mode, "starting tarpon");
    info!(
        event = Event::ConfigLoaded.as_str(),
        path = %config_path.display(),
        collection = %config.datastore.collection,
        max_records = config.datastore.max_records,
        "configuration loaded"
    );

    let state = build_state(&config)?;
    let server = HttpServer::new(config.http.clone(), state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate configuration and open the datastore once
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let state = build_state(&config)?;
    state.service.store().connect()?;

    println!("configuration ok: {}", config_path.display());
    println!("  listen:      {}", config.http.socket_addr());
    println!(
        "  datastore:   {} / {} / {}",
        config.datastore.uri, config.datastore.database, config.datastore.collection
    );
    println!("  max records: {}", config.datastore.max_records);
    println!(
        "  encryption:  {}",
        if config.encryption_key().is_some() { "on" } else { "off" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_config_memory_datastore() {
        let file = write_config(r#"{"datastore": {"uri": "memory://"}}"#);
        assert!(check_config(file.path()).is_ok());
    }

    #[test]
    fn test_check_config_unreachable_datastore() {
        let file = write_config(r#"{"datastore": {"uri": "mongodb://localhost:27017"}}"#);
        assert!(matches!(check_config(file.path()), Err(CliError::Datastore(_))));
    }

    #[test]
    fn test_build_connector_refuses_unknown_scheme() {
        let mut config = Config::default();
        assert!(build_connector(&config).is_ok());

        config.datastore.uri = "mongodb://localhost:27017".to_string();
        let err = build_connector(&config).err().unwrap();
        assert!(matches!(err, CliError::Datastore(StoreError::Datastore(_))));
        assert!(err.to_string().contains("mongodb://localhost:27017"));
        assert!(build_state(&config).is_err());
    }

    #[test]
    fn test_build_state_with_key() {
        let config = Config {
            encryption_key: "0123456789abcdef".to_string(),
            ..Default::default()
        };
        let state = build_state(&config).unwrap();
        assert_eq!(state.page_record_count, 25);
        assert_eq!(state.service.collection(), "community");
    }
}
