use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use culinairy::catalog::RecipeCatalog;
use culinairy::config::{get_config, CliArgs};
use culinairy::embeddings::{index_catalog, EmbeddingIndex, EmbeddingModel, NimEmbeddingClient};
use culinairy::llm::{ChatModel, NimChatClient};
use culinairy::{create_app, db, run_migrations, AppState};

/// Sets up the tracing subscriber
///
/// `RUST_LOG` wins over `--debug`. With `--log-dir`, events are also written
/// to a daily rolling file; the returned guard must live as long as the program.
fn setup_logging(args: &CliArgs) -> Result<Option<WorkerGuard>> {
    let default_level = if args.debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "culinairy.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);
    if args.log_json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    Ok(guard)
}

/// Resolves once Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let _log_guard = setup_logging(&args).context("Failed to set up logging")?;

    let config = get_config(args);

    // Initialize the database pool and bring the schema up to date
    let pool = db::init_pool(&config.database_url).context("Failed to create database pool")?;
    {
        let mut conn = pool.get().context("Failed to get database connection")?;
        run_migrations(&mut conn)?;
    }

    let catalog = Arc::new(
        RecipeCatalog::load(Path::new(&config.recipes_path), config.image_base_url.clone())
            .context("Failed to load recipes")?,
    );
    info!("Recipe catalog ready with {} recipes", catalog.len());

    let chat_client = NimChatClient::from_config(&config)?;
    info!("Using chat model {} at {}", chat_client.model(), config.llm_url);
    let chat: Arc<dyn ChatModel> = Arc::new(chat_client);
    let embedder: Arc<dyn EmbeddingModel> = Arc::new(NimEmbeddingClient::from_config(&config)?);
    let index = Arc::new(EmbeddingIndex::new());

    // Index in the background; searches fall back to lexical ranking until it is done
    if config.index_on_startup {
        let (catalog, embedder, index) = (catalog.clone(), embedder.clone(), index.clone());
        tokio::spawn(async move {
            let indexed = index_catalog(&catalog, embedder.as_ref(), &index).await;
            info!("Embedded {} of {} recipes", indexed, catalog.len());
        });
    }

    let app = create_app(AppState {
        pool: Arc::new(pool),
        catalog,
        chat,
        embedder,
        index,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
