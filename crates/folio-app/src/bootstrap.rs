use std::sync::Arc;

use folio_api::{ApiServer, ApiState, ContentSource, SessionRegistry};
use folio_config::{LogStyle, ServerConfig, hash_secret};
use folio_core::demo::demo_store;
use folio_core::{PublicSite, SessionScope, SharedContentStore};
use folio_data::{LocalBlobStore, PgContentStore};
use folio_events::EventBus;
use folio_telemetry::{
    GlobalContextGuard, LogFormat, LoggingConfig, Metrics, build_sha, init_logging,
    record_app_mode,
};
use tracing::{error, info, warn};

use crate::cli::{Cli, Command, ExportArgs, HashPasswordArgs};
use crate::error::{AppError, AppResult};
use crate::export::write_snapshot;

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns an error if configuration, wiring or the command itself fails.
pub async fn run_app(cli: Cli) -> AppResult<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Export(args) => export(&args).await,
        Command::HashPassword(args) => hash_password(&args),
    }
}

const fn log_format(style: Option<LogStyle>) -> LogFormat {
    match style {
        Some(LogStyle::Json) => LogFormat::Json,
        Some(LogStyle::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    }
}

fn load_config() -> AppResult<ServerConfig> {
    let config = folio_config::load().map_err(|err| AppError::config("config.load", err))?;
    init_logging(&LoggingConfig {
        level: &config.log_level,
        format: log_format(config.log_style),
        build_sha: build_sha(),
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    Ok(config)
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise the in-memory demo dataset.
async fn open_store(config: &ServerConfig) -> AppResult<(ContentSource, SharedContentStore)> {
    if let Some(url) = config.database_url.as_deref() {
        let store = PgContentStore::connect(url)
            .await
            .map_err(|err| AppError::data("content_store.connect", err))?;
        info!("content store connected");
        return Ok((ContentSource::Database, Arc::new(store)));
    }

    let store = demo_store().map_err(|source| AppError::Demo { source })?;
    warn!("DATABASE_URL not set; serving the demo dataset from memory");
    Ok((ContentSource::Demo, Arc::new(store)))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn serve() -> AppResult<()> {
    let config = load_config()?;
    let _context = GlobalContextGuard::new("bootstrap");
    info!("Folio bootstrap starting");

    let (source, store) = open_store(&config).await?;
    record_app_mode(source.as_str());

    let blobs = LocalBlobStore::open(config.media_root.clone(), config.media_base_url.clone())
        .await
        .map_err(|err| AppError::data("blob_store.open", err))?;
    let media_root = blobs.root().to_path_buf();

    let telemetry =
        Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
    let events = EventBus::new();
    let registry = SessionRegistry::new(
        config.admin.clone(),
        config.session_ttl,
        events.clone(),
        telemetry.clone(),
    );
    let scope = Arc::new(SessionScope::new(Arc::new(registry), events));

    let state = ApiState::new(
        source,
        store,
        Arc::new(blobs),
        Arc::clone(&scope),
        telemetry,
    );
    let api = ApiServer::new(Arc::new(state), &media_root);

    let addr = config.socket_addr();
    info!(addr = %addr, source = source.as_str(), "Launching HTTP listener");
    let served = api.serve(addr, shutdown_signal()).await;

    let ended = scope.teardown().await;
    info!(sessions_ended = ended, "Folio shut down");
    served.map_err(|err| AppError::server("api.serve", err))
}

async fn export(args: &ExportArgs) -> AppResult<()> {
    let config = load_config()?;
    let _context = GlobalContextGuard::new("export");
    let (source, store) = open_store(&config).await?;
    let site = PublicSite::new(store);

    let summary = write_snapshot(&site, &args.out_dir).await?;
    info!(
        out_dir = %args.out_dir.display(),
        files = summary.files.len(),
        source = source.as_str(),
        "static export written"
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
fn hash_password(args: &HashPasswordArgs) -> AppResult<()> {
    let hash = hash_secret(&args.password).map_err(|err| AppError::config("hash_secret", err))?;
    println!("{hash}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_config::verify_secret;

    #[test]
    fn log_style_maps_to_formatter() {
        assert_eq!(log_format(Some(LogStyle::Json)), LogFormat::Json);
        assert_eq!(log_format(Some(LogStyle::Pretty)), LogFormat::Pretty);
        assert_eq!(log_format(None), LogFormat::infer());
    }

    #[test]
    fn hash_password_accepts_any_input() {
        let args = HashPasswordArgs {
            password: "hunter2".into(),
        };
        assert!(hash_password(&args).is_ok());
        let hash = hash_secret(&args.password).expect("hash");
        assert!(verify_secret(&hash, "hunter2").expect("verify"));
    }
}
