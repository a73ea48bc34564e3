use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::telegram::TelegramClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CharacterService, PartyService, PeriodService, SeaOrmAuthService,
    SeaOrmCharacterService, SeaOrmPartyService, SeaOrmPeriodService, SeaOrmStatisticsService,
    SeaOrmVisitService, StatisticsService, VisitService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across everything HTTP-based to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Raidlog/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    /// Bot API client, absent while no bot token is configured.
    pub telegram: Option<Arc<TelegramClient>>,

    pub auth_service: Arc<dyn AuthService>,

    pub period_service: Arc<dyn PeriodService>,

    pub visit_service: Arc<dyn VisitService>,

    pub statistics_service: Arc<dyn StatisticsService>,

    pub character_service: Arc<dyn CharacterService>,

    pub party_service: Arc<dyn PartyService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let telegram = if config.telegram.bot_token.is_empty() {
            None
        } else {
            let http_client = build_shared_http_client(30)?;
            Some(Arc::new(TelegramClient::with_shared_client(
                http_client,
                config.telegram.bot_token.clone(),
                config.telegram.api_base_url.clone(),
            )))
        };

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone(), config.security.clone()))
                as Arc<dyn AuthService>;
        let period_service =
            Arc::new(SeaOrmPeriodService::new(store.clone())) as Arc<dyn PeriodService>;
        let visit_service =
            Arc::new(SeaOrmVisitService::new(store.clone())) as Arc<dyn VisitService>;
        let statistics_service =
            Arc::new(SeaOrmStatisticsService::new(store.clone())) as Arc<dyn StatisticsService>;
        let character_service =
            Arc::new(SeaOrmCharacterService::new(store.clone())) as Arc<dyn CharacterService>;
        let party_service =
            Arc::new(SeaOrmPartyService::new(store.clone())) as Arc<dyn PartyService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            telegram,
            auth_service,
            period_service,
            visit_service,
            statistics_service,
            character_service,
            party_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
