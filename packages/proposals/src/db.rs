// ABOUTME: Database connection management and storage initialization
// ABOUTME: Shared DbState handed to every API handler

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use proposalpilot_ai::{AIService, UsageLogStorage};
use proposalpilot_billing::SubscriptionStorage;
use proposalpilot_briefs::BriefStorage;
use proposalpilot_storage::{connect_pool, StorageError};
use proposalpilot_templates::{seed_system_templates, TemplateStorage};

use crate::clients::ClientStorage;
use crate::storage::ProposalStorage;
use crate::users::UserStorage;

/// Shared database state for API handlers
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub ai: Arc<AIService>,
    pub user_storage: Arc<UserStorage>,
    pub client_storage: Arc<ClientStorage>,
    pub brief_storage: Arc<BriefStorage>,
    pub proposal_storage: Arc<ProposalStorage>,
    pub template_storage: Arc<TemplateStorage>,
    pub subscription_storage: Arc<SubscriptionStorage>,
    pub usage_log_storage: Arc<UsageLogStorage>,
}

impl DbState {
    /// Create database state from an initialized pool
    pub fn new(pool: SqlitePool, ai: Arc<AIService>) -> Self {
        Self {
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            client_storage: Arc::new(ClientStorage::new(pool.clone())),
            brief_storage: Arc::new(BriefStorage::new(pool.clone())),
            proposal_storage: Arc::new(ProposalStorage::new(pool.clone())),
            template_storage: Arc::new(TemplateStorage::new(pool.clone())),
            subscription_storage: Arc::new(SubscriptionStorage::new(pool.clone())),
            usage_log_storage: Arc::new(UsageLogStorage::new(pool.clone())),
            ai,
            pool,
        }
    }

    /// Initialize database state with default configuration
    pub async fn init() -> Result<Self, StorageError> {
        Self::init_with_path(None).await
    }

    /// Initialize database state with an optional custom database path
    pub async fn init_with_path(database_path: Option<PathBuf>) -> Result<Self, StorageError> {
        let database_path = database_path.unwrap_or_else(proposalpilot_core::database_file);
        let pool = connect_pool(&database_path).await?;

        Self::init_with_pool(pool, Arc::new(AIService::new())).await
    }

    /// Run migrations and seeding against an existing pool. Used directly by
    /// tests running on their own databases.
    pub async fn init_with_pool(
        pool: SqlitePool,
        ai: Arc<AIService>,
    ) -> Result<Self, StorageError> {
        sqlx::migrate!("../storage/migrations")
            .run(&pool)
            .await
            .map_err(StorageError::Migration)?;

        debug!("Database migrations completed");

        seed_system_templates(&pool).await?;

        Ok(Self::new(pool, ai))
    }
}
