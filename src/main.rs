use std::{path::Path, process, sync::Arc};

use levelkeep::{
    application::{
        error::AppError,
        levels::{LevelService, ServedResponse},
        repos::LevelStore,
    },
    cache::{ItemCache, LruByteCache},
    config,
    domain::LevelPayload,
    infra::{db::PostgresLevelStore, error::InfraError, memory::MemoryLevelStore, telemetry},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            report_application_error(&error);
            process::exit(2);
        }
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

/// Returns whether the command was served successfully.
async fn run() -> Result<bool, AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let response = match cli_args.command {
        config::Command::Migrate => {
            run_migrations(&settings).await?;
            return Ok(true);
        }
        config::Command::Batch(args) => {
            let service = build_service(&settings, args.ephemeral).await?;
            let summary = service
                .run_batch(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await
                .map_err(InfraError::from)?;
            return Ok(summary.all_succeeded());
        }
        config::Command::Get(args) => {
            let service = build_service(&settings, false).await?;
            service.get_level(&args.id).await
        }
        config::Command::List => {
            let service = build_service(&settings, false).await?;
            service.list_levels().await
        }
        config::Command::Put(args) => {
            let payload = read_payload(&args).await?;
            let service = build_service(&settings, false).await?;
            service.put_level(&args.id, payload).await
        }
        config::Command::Delete(args) => {
            let service = build_service(&settings, false).await?;
            service.delete_level(&args.id).await
        }
    };

    print_response(&response).await?;
    Ok(response.is_success())
}

async fn run_migrations(settings: &config::Settings) -> Result<(), AppError> {
    let pool = connect(settings).await?;
    PostgresLevelStore::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    info!(target = "levelkeep::migrate", "Migrations applied");
    Ok(())
}

async fn build_service(
    settings: &config::Settings,
    ephemeral: bool,
) -> Result<LevelService, AppError> {
    let store = init_store(settings, ephemeral).await?;
    let backend = Arc::new(LruByteCache::new(&settings.cache));
    let cache = ItemCache::new(settings.cache.clone(), backend);
    Ok(LevelService::new(store, cache, settings.listing.page_limit))
}

async fn init_store(
    settings: &config::Settings,
    ephemeral: bool,
) -> Result<Arc<dyn LevelStore>, AppError> {
    if ephemeral {
        info!(
            root = %settings.store.collection_root,
            "Using in-memory level store for this session"
        );
        return Ok(Arc::new(MemoryLevelStore::new()));
    }

    let pool = connect(settings).await?;
    PostgresLevelStore::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresLevelStore::new(
        pool,
        settings.store.collection_root.clone(),
    )))
}

async fn connect(settings: &config::Settings) -> Result<sqlx::PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresLevelStore::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn read_payload(args: &config::PutArgs) -> Result<LevelPayload, AppError> {
    let raw = if args.reads_stdin() {
        let mut buffer = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buffer)
            .await
            .map_err(InfraError::from)?;
        buffer
    } else {
        read_file(&args.payload).await?
    };

    serde_json::from_slice(&raw).map_err(|err| AppError::from(InfraError::payload(err)))
}

async fn read_file(path: &Path) -> Result<Vec<u8>, AppError> {
    tokio::fs::read(path)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn print_response(response: &ServedResponse) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(&response.body)
        .map_err(|err| AppError::unexpected(format!("failed to render response: {err}")))?;

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{}\n{rendered}\n", response.status).as_bytes())
        .await
        .map_err(InfraError::from)?;
    stdout.flush().await.map_err(InfraError::from)?;
    Ok(())
}
