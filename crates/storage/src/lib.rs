use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use sqlx::{Row, SqlitePool};
use voyage_core::Trip;

/// Durable home of the trip history. Whole-list semantics: `save_trips`
/// replaces the stored set, and `load_trips` returns it in the order it
/// was saved.
pub trait TripRepository: Send + Sync {
    async fn load_trips(&self) -> Result<Vec<Trip>>;
    async fn save_trips(&self, trips: &[Trip]) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    trips: Arc<RwLock<Vec<Trip>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TripRepository for MemoryStore {
    async fn load_trips(&self) -> Result<Vec<Trip>> {
        Ok(self.trips.read().clone())
    }

    async fn save_trips(&self, trips: &[Trip]) -> Result<()> {
        *self.trips.write() = trips.to_vec();
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trips (
              trip_id TEXT PRIMARY KEY,
              position INTEGER NOT NULL,
              status TEXT NOT NULL,
              destination TEXT NOT NULL,
              trip_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl TripRepository for SqliteStore {
    async fn load_trips(&self) -> Result<Vec<Trip>> {
        let rows = sqlx::query(
            r#"
            SELECT trip_json
            FROM trips
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut trips = Vec::with_capacity(rows.len());
        for row in rows {
            let trip_json: String = row.get("trip_json");
            let trip = serde_json::from_str(&trip_json).context("corrupt trip record")?;
            trips.push(trip);
        }

        Ok(trips)
    }

    async fn save_trips(&self, trips: &[Trip]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM trips").execute(&mut *tx).await?;

        for (position, trip) in trips.iter().enumerate() {
            let trip_json = serde_json::to_string(trip)?;
            sqlx::query(
                r#"
                INSERT INTO trips (trip_id, position, status, destination, trip_json)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&trip.id)
            .bind(position as i64)
            .bind(trip.status.as_str())
            .bind(&trip.request.destination)
            .bind(trip_json)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }
}

impl TripRepository for Store {
    async fn load_trips(&self) -> Result<Vec<Trip>> {
        match self {
            Store::Memory(store) => store.load_trips().await,
            Store::Sqlite(store) => store.load_trips().await,
        }
    }

    async fn save_trips(&self, trips: &[Trip]) -> Result<()> {
        match self {
            Store::Memory(store) => store.save_trips(trips).await,
            Store::Sqlite(store) => store.save_trips(trips).await,
        }
    }
}
