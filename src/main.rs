use classroom_review::api::{ApiClient, ApiError};
use classroom_review::config::Config;
use classroom_review::session::{Session, TokenStore};
use classroom_review::state::{AppState, ViewRegistry};
use classroom_review::routes;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classroom_review=info,tower_http=info".into()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let store = TokenStore::new(&config.token_file);
    let session = Session::resolve(&config, &store)?;
    let api = ApiClient::new(&config.api_url, session, config.http_timeout)?;

    match api.me().await {
        Ok(user) => tracing::info!("Signed in as {} ({})", user.display_name(), user.username),
        Err(ApiError::Unauthorized(message)) => {
            store.clear()?;
            return Err(format!("stored token was rejected ({}); set CLASSROOM_TOKEN again", message).into());
        }
        Err(e) => tracing::warn!("Could not verify session against {}: {}", api.base_url(), e),
    }

    let views = Arc::new(ViewRegistry::new(Arc::new(api.clone())));
    let state = Arc::new(AppState {
        api,
        config: config.clone(),
        views: views.clone(),
    });

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Classroom client listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    views.close_all().await;
    Ok(())
}
