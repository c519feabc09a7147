use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};
use verity_core::embeddings::EmbeddingBackend;
use verity_core::{AssessorConfig, CredibilityAssessor, VerityConfig};

use verity_server::http::{self, AppState};
use verity_server::subsystems::{classifier, embedder, retrieve};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "verity.toml")]
    config: String,

    /// Check database connectivity and exit
    #[arg(long)]
    health: bool,

    /// Embed and store a JSON Lines reference corpus, then exit
    #[arg(long, value_name = "FILE")]
    ingest: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match VerityConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    let needs_db = args.health
        || args.ingest.is_some()
        || config.retrieval.backend.as_str() != "memory";

    let pool = if needs_db {
        match verity_core::db::create_pool(&config.database).await {
            Ok(p) => Some(p),
            Err(e) => {
                eprintln!("Failed to connect to database: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    if args.health {
        let pool = pool.as_ref().context("database pool missing")?;
        match verity_core::db::health_check(pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }

        match verity_core::db::check_pgvector(pool).await {
            Ok(v) => println!("✅ pgvector version: {}", v),
            Err(e) => {
                println!("❌ pgvector check failed: {}", e);
                std::process::exit(1);
            }
        }

        match verity_core::db::corpus_size(pool).await {
            Ok(n) => println!("✅ Reference articles: {}", n),
            Err(e) => println!("⚠️  Reference table unavailable: {}", e),
        }

        println!("✅ Verity DB health check passed");
        return Ok(());
    }

    let backend: Arc<dyn EmbeddingBackend> = Arc::from(
        embedder::create_backend_from_config(&config)
            .context("Failed to create embedding backend")?,
    );

    if let Some(path) = args.ingest {
        let pool = pool.as_ref().context("database pool missing")?;
        let records = verity_core::corpus::load_corpus(&path)
            .with_context(|| format!("Failed to load corpus from {}", path.display()))?;
        verity_ingest::ensure_schema(pool, backend.dimensions()).await?;

        let report = verity_ingest::ingest_corpus(
            pool,
            backend.as_ref(),
            records,
            config.retrieval.ingest_concurrency,
        )
        .await;

        println!(
            "Ingested {} of {} reference articles ({} failed)",
            report.inserted,
            report.total(),
            report.failed
        );
        if report.inserted == 0 && report.failed > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    let text_classifier: Arc<dyn verity_core::TextClassifier> = Arc::from(
        classifier::create_classifier_from_config(&config)
            .context("Failed to create classifier")?,
    );
    let retriever = retrieve::build_retriever(&config, pool.clone(), backend).await?;

    let assessor = CredibilityAssessor::new(
        text_classifier,
        retriever,
        AssessorConfig::from(&config),
    )?;
    tracing::info!(
        classifier = assessor.classifier_name(),
        retriever = assessor.retriever_name(),
        k = assessor.config().k,
        "Credibility assessor ready"
    );

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = AppState {
        assessor: Arc::new(assessor),
        pool,
    };
    http::start_http_server(state, &config, tx.subscribe()).await?;

    Ok(())
}
