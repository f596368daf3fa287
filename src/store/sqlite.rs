//! SQLite-backed [`RecipeStore`].
//!
//! Schema lives in `migrations/` and is applied on [`SqliteStore::open`].
//! Foreign keys are enabled on every connection so step rows cascade with
//! their recipe; `delete_recipe` additionally removes steps explicitly inside
//! the same transaction.

use std::{path::Path, str::FromStr, sync::Arc};

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::config::StorageConfig;
use crate::recipe::{Recipe, RecipeId, Step};
use crate::store::contract::{check_step_set, RecipeFeed, RecipeStore, StepFeed, StorageError};

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Recipe store over a pooled SQLite database.
///
/// Cheap to clone; clones share the pool and the live feeds.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    recipes_tx: Arc<watch::Sender<Vec<Recipe>>>,
    revision_tx: Arc<watch::Sender<u64>>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url` and apply
    /// migrations.
    ///
    /// In-memory URLs get exactly one connection that never expires, so
    /// every query sees the same database.
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let in_memory = is_in_memory(database_url);
        if !in_memory {
            ensure_sqlite_parent_dir_exists(database_url)?;
        }

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let (recipes_tx, _) = watch::channel(Vec::new());
        let (revision_tx, _) = watch::channel(0u64);
        let store = Self {
            pool,
            recipes_tx: Arc::new(recipes_tx),
            revision_tx: Arc::new(revision_tx),
        };
        store.publish().await?;

        log::info!("store: opened {database_url}");
        Ok(store)
    }

    /// Open the database described by `config`.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::open(&config.database_url(), config.max_connections).await
    }

    /// Open a private in-memory database (tests, throwaway sessions).
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::open(IN_MEMORY_URL, 1).await
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), StorageError> {
        let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Re-read the recipe list and notify every live feed.
    async fn publish(&self) -> Result<(), StorageError> {
        let rows = sqlx::query(
            "SELECT id, name, ingredients, steps_text, preparation_time
             FROM recipes
             ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let recipes = rows
            .iter()
            .map(recipe_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("store: publishing {} recipes", recipes.len());
        self.recipes_tx.send_replace(recipes);
        self.revision_tx.send_modify(|revision| *revision += 1);
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for SqliteStore {
    fn list_recipes(&self) -> RecipeFeed {
        WatchStream::new(self.recipes_tx.subscribe())
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StorageError> {
        let row = sqlx::query(
            "SELECT id, name, ingredients, steps_text, preparation_time
             FROM recipes
             WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(recipe_from_row).transpose()
    }

    async fn insert_recipe(&self, recipe: &Recipe) -> Result<RecipeId, StorageError> {
        let row = sqlx::query(
            "INSERT INTO recipes (id, name, ingredients, steps_text, preparation_time)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 ingredients = excluded.ingredients,
                 steps_text = excluded.steps_text,
                 preparation_time = excluded.preparation_time
             RETURNING id",
        )
        .bind(recipe.id.map(|id| id.0))
        .bind(&recipe.name)
        .bind(&recipe.ingredients)
        .bind(&recipe.steps_text)
        .bind(&recipe.preparation_time)
        .fetch_one(&self.pool)
        .await?;

        let id = RecipeId(row.try_get::<i64, _>(0)?);
        log::debug!("store: saved recipe {id} ({:?})", recipe.name);

        self.publish().await?;
        Ok(id)
    }

    async fn delete_recipe(&self, id: RecipeId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM steps WHERE recipe_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        log::debug!("store: deleted recipe {id}");
        self.publish().await
    }

    async fn list_steps(&self, recipe_id: RecipeId) -> Result<Vec<Step>, StorageError> {
        let rows = sqlx::query(
            "SELECT recipe_id, position, description, duration
             FROM steps
             WHERE recipe_id = ?
             ORDER BY position ASC",
        )
        .bind(recipe_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(step_from_row).collect()
    }

    fn watch_steps(&self, recipe_id: RecipeId) -> StepFeed {
        let store = self.clone();
        WatchStream::new(self.revision_tx.subscribe())
            .then(move |_| {
                let store = store.clone();
                async move { store.list_steps(recipe_id).await }
            })
            .boxed()
    }

    async fn replace_steps(&self, recipe_id: RecipeId, steps: &[Step]) -> Result<(), StorageError> {
        check_step_set(recipe_id, steps)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM steps WHERE recipe_id = ?")
            .bind(recipe_id.0)
            .execute(&mut *tx)
            .await?;

        for step in steps {
            sqlx::query(
                "INSERT INTO steps (recipe_id, position, description, duration)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(recipe_id.0)
            .bind(i64::from(step.position))
            .bind(&step.description)
            .bind(&step.duration)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        log::debug!("store: recipe {recipe_id} now has {} steps", steps.len());
        self.publish().await
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn recipe_from_row(row: &SqliteRow) -> Result<Recipe, StorageError> {
    Ok(Recipe {
        id: Some(RecipeId(row.try_get("id")?)),
        name: row.try_get("name")?,
        ingredients: row.try_get("ingredients")?,
        steps_text: row.try_get("steps_text")?,
        preparation_time: row.try_get("preparation_time")?,
    })
}

fn step_from_row(row: &SqliteRow) -> Result<Step, StorageError> {
    let position: i64 = row.try_get("position")?;
    Ok(Step {
        recipe_id: RecipeId(row.try_get("recipe_id")?),
        position: u32::try_from(position).map_err(|_| {
            StorageError::InvalidSteps(format!("stored position {position} out of range"))
        })?,
        description: row.try_get("description")?,
        duration: row.try_get("duration")?,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<(), StorageError> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
