use std::sync::Arc;

use tableside_agent::{AgentRuntime, GeminiClient, LlmClient, LlmError};
use tableside_core::config::{AppConfig, ConfigError, LoadOptions};
use tableside_db::repositories::{SqlDealRepository, SqlMenuRepository, SqlOrderRepository};
use tableside_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::info;

use crate::state::{AppState, TableSessions};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("chat client setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let client: Option<Arc<dyn LlmClient>> = if config.llm_enabled() {
        let gemini = GeminiClient::from_config(&config.llm).map_err(BootstrapError::Llm)?;
        info!(
            event_name = "system.bootstrap.llm_ready",
            correlation_id = "bootstrap",
            model = gemini.model(),
            "chat assistant enabled"
        );
        let client: Arc<dyn LlmClient> = Arc::new(gemini);
        Some(client)
    } else {
        info!(
            event_name = "system.bootstrap.llm_offline",
            correlation_id = "bootstrap",
            "no chat provider configured, using offline replies"
        );
        None
    };

    let state = AppState {
        menu: Arc::new(SqlMenuRepository::new(db_pool.clone())),
        deals: Arc::new(SqlDealRepository::new(db_pool.clone())),
        orders: Arc::new(SqlOrderRepository::new(db_pool.clone())),
        sessions: Arc::new(TableSessions::default()),
        agent: AgentRuntime::new(client, config.restaurant.currency.clone()),
        restaurant: Arc::new(config.restaurant.clone()),
    };

    Ok(Application { config, db_pool, state })
}
