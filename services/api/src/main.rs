use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use tikiti_api::config::ApiConfig;
use tikiti_api::infra::daraja::DarajaGateway;
use tikiti_api::router::build_router;
use tikiti_api::state::AppState;
use tikiti_core::tracing::init_tracing;
use tikiti_identity::webhook::WebhookVerifier;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let webhook_verifier = WebhookVerifier::new(&config.identity_webhook_secret)
        .expect("malformed IDENTITY_WEBHOOK_SECRET");
    let gateway = DarajaGateway::new(&config);

    let state = AppState {
        db,
        config: Arc::new(config),
        gateway,
        webhook_verifier,
    };

    let router = build_router(state.clone());
    let http_addr = format!("0.0.0.0:{}", state.config.api_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
