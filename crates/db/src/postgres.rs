//! PostgreSQL-backed store (sqlx).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use todo_core::listing::ListQuery;
use todo_core::todo::{NewTodo, Todo};
use todo_core::types::TodoId;

use crate::connection::Connector;
use crate::error::StoreResult;
use crate::repositories::TodoRepo;
use crate::store::TodoStore;
use crate::DbPool;

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a request waits for a pooled connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, settings: &PoolSettings) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database answers.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create the `todos` table and its indexes if they do not exist yet.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// [`TodoStore`] over a shared sqlx pool.
#[derive(Clone)]
pub struct PgTodoStore {
    pool: DbPool,
}

impl PgTodoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Todo>> {
        TodoRepo::list(&self.pool, query)
            .await?
            .into_iter()
            .map(Todo::try_from)
            .collect()
    }

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        TodoRepo::find_by_id(&self.pool, id)
            .await?
            .map(Todo::try_from)
            .transpose()
    }

    async fn insert(&self, todo: &NewTodo) -> StoreResult<Todo> {
        let row = TodoRepo::create(&self.pool, todo).await?;
        Todo::try_from(row)
    }

    async fn replace(&self, todo: &Todo) -> StoreResult<Option<Todo>> {
        TodoRepo::update(&self.pool, todo)
            .await?
            .map(Todo::try_from)
            .transpose()
    }

    async fn delete(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        TodoRepo::delete(&self.pool, id)
            .await?
            .map(Todo::try_from)
            .transpose()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Opens a pool, checks it answers and bootstraps the schema.
pub struct PgConnector {
    database_url: String,
    settings: PoolSettings,
}

impl PgConnector {
    pub fn new(database_url: impl Into<String>, settings: PoolSettings) -> Self {
        Self {
            database_url: database_url.into(),
            settings,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> StoreResult<Arc<dyn TodoStore>> {
        let pool = create_pool(&self.database_url, &self.settings).await?;
        tracing::debug!("Database connection pool created");

        health_check(&pool).await?;
        tracing::debug!("Database health check passed");

        run_migrations(&pool).await?;
        tracing::debug!("Database schema ready");

        let store: Arc<dyn TodoStore> = Arc::new(PgTodoStore::new(pool));
        Ok(store)
    }
}
