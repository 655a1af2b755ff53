use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use cimentra_ai::ChatClient;
use cimentra_core::ReferencePeriod;
use cimentra_intake::{Pipeline, PipelineOptions};
use cimentra_server::{AppState, router};
use cimentra_store::RestStore;

/// Cimentra intake server: turns free-text messages into project records.
#[derive(Parser, Debug)]
#[command(name = "cimentra", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "CIMENTRA_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Base URL of the relational store (PostgREST/Supabase).
    #[arg(long, env = "CIMENTRA_STORE_URL")]
    store_url: String,

    /// Service key for the store.
    #[arg(long, env = "CIMENTRA_STORE_KEY", hide_env_values = true)]
    store_key: String,

    /// Base URL of the chat-completion endpoint.
    #[arg(long, env = "CIMENTRA_OPENAI_URL", default_value = "https://api.openai.com")]
    openai_url: String,

    /// API key for the model endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// Model used for extraction.
    #[arg(long, env = "CIMENTRA_MODEL", default_value = "gpt-3.5-turbo-1106")]
    model: String,

    /// Fixed reference period (YYYY-MM) for relative dates. Defaults to the
    /// current month at request time.
    #[arg(long, env = "CIMENTRA_REFERENCE_PERIOD")]
    reference_period: Option<ReferencePeriod>,

    /// Reject messages unless name, locality, client, and start date were
    /// all extracted.
    #[arg(long, env = "CIMENTRA_REQUIRE_ALL_FIELDS")]
    require_all_fields: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let extractor = Arc::new(ChatClient::new(
        args.openai_url,
        args.openai_api_key,
        args.model,
    ));
    let store = Arc::new(RestStore::new(args.store_url, args.store_key));
    let options = PipelineOptions {
        require_all_fields: args.require_all_fields,
        reference_period: args.reference_period,
    };
    let state = Arc::new(AppState {
        pipeline: Pipeline::new(extractor, store, options),
    });

    let app = router(state);
    tracing::info!(bind = %args.bind, "cimentra intake v{}", env!("CARGO_PKG_VERSION"));
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
