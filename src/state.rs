use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    auth::jwt::JwtKeys,
    config::{AppConfig, StoreBackend},
    store::{MemoryStore, PgStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = match config.store {
            StoreBackend::Postgres => {
                Arc::new(PgStore::connect(&config.database).await?) as Arc<dyn Store>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new()) as Arc<dyn Store>
            }
        };
        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            store,
            config,
            keys,
        }
    }

    /// Owner filter for record mutations, `None` unless `OWNER_SCOPED_MUTATIONS` is on.
    pub fn mutation_owner(&self, user_id: i32) -> Option<i32> {
        self.config.owner_scoped_mutations.then_some(user_id)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
