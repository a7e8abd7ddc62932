use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::locks::SessionLocks;

use crate::config::AppConfig;
use crate::domain::catalog::TemplateCatalog;
use crate::domain::credits::CreditPolicy;
use crate::domain::repositories::{
    AdRepository, CreditsProvider, GenerationService, WizardSessionRepository,
};
use crate::infrastructure::baas::{
    BaasClient, HttpAdRepository, HttpCreditsProvider, HttpGenerationService,
};
use crate::infrastructure::memory::{
    InMemoryAdRepository, InMemoryCreditsLedger, InMemoryGenerationService,
};
use crate::infrastructure::repositories::InMemorySessionRepository;

/// Shared handler state
///
/// Every collaborator sits behind its trait so the router runs unchanged
/// against the hosted backend or the in-memory adapters.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TemplateCatalog>,
    pub sessions: Arc<dyn WizardSessionRepository>,
    pub session_locks: Arc<SessionLocks>,
    pub credits: Arc<dyn CreditsProvider>,
    pub ads: Arc<dyn AdRepository>,
    pub generator: Arc<dyn GenerationService>,
    pub policy: CreditPolicy,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    /// Wires the collaborators named by the configuration
    ///
    /// The catalog is verified first; a broken table stops start-up.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let catalog = TemplateCatalog::builtin();
        catalog.verify().map_err(|e| e.to_string())?;
        let policy = CreditPolicy::new(config.cost_per_sample).map_err(|e| e.to_string())?;

        let state = match &config.baas {
            Some(baas) => {
                tracing::info!(url = %baas.url, function = %baas.generation_function, "using hosted backend");
                let client = BaasClient::new(&baas.url, &baas.anon_key, config.generation_timeout)?;
                Self {
                    catalog: Arc::new(catalog),
                    sessions: Arc::new(InMemorySessionRepository::new()),
                    session_locks: Arc::new(SessionLocks::new()),
                    credits: Arc::new(HttpCreditsProvider::new(client.clone())),
                    ads: Arc::new(HttpAdRepository::new(client.clone())),
                    generator: Arc::new(HttpGenerationService::new(
                        client,
                        &baas.generation_function,
                    )),
                    policy,
                    jwt_secret: Arc::from(config.jwt_secret.as_str()),
                }
            }
            None => {
                let ledger = Arc::new(InMemoryCreditsLedger::new(config.starting_credits));
                Self::in_memory(
                    Arc::new(catalog),
                    ledger,
                    Arc::new(InMemoryAdRepository::new()),
                    policy,
                    &config.jwt_secret,
                )
            }
        };

        Ok(state)
    }

    /// State backed entirely by process memory
    pub fn in_memory(
        catalog: Arc<TemplateCatalog>,
        ledger: Arc<InMemoryCreditsLedger>,
        ads: Arc<InMemoryAdRepository>,
        policy: CreditPolicy,
        jwt_secret: &str,
    ) -> Self {
        Self {
            catalog,
            sessions: Arc::new(InMemorySessionRepository::new()),
            session_locks: Arc::new(SessionLocks::new()),
            credits: ledger.clone(),
            ads,
            generator: Arc::new(InMemoryGenerationService::new(ledger, policy)),
            policy,
            jwt_secret: Arc::from(jwt_secret),
        }
    }

    /// Discards sessions idle for longer than `ttl`
    pub async fn sweep_idle_sessions(&self, ttl: Duration) -> Result<usize, String> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| e.to_string())?;
        let removed = self.sessions.delete_idle_since(Utc::now() - ttl).await?;
        self.session_locks.prune().await;
        Ok(removed)
    }

    /// Runs `sweep_idle_sessions` in the background for the life of the process
    pub fn spawn_session_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let state = self.clone();
        let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match state.sweep_idle_sessions(ttl).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "discarded idle wizard sessions"),
                    Err(e) => tracing::warn!("session sweep failed: {}", e),
                }
            }
        })
    }
}
