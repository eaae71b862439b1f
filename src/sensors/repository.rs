use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{insert_statement, ReadingKind};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The only way readings reach the store.
#[async_trait]
pub trait SensorRepository<R: ReadingKind>: Send + Sync {
    /// Insert one reading as a single statement and return it as stored,
    /// with `id` and `captured_at` filled in by the store.
    ///
    /// Dropping the returned future abandons the insert.
    async fn create(&self, reading: R::New) -> Result<R, RepositoryError>;
}

/// Postgres-backed repository for any `ReadingKind`.
pub struct PgSensorRepository<R> {
    pool: PgPool,
    insert_sql: String,
    _kind: PhantomData<fn() -> R>,
}

impl<R: ReadingKind> PgSensorRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            insert_sql: insert_statement::<R>(),
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<R: ReadingKind> SensorRepository<R> for PgSensorRepository<R> {
    async fn create(&self, reading: R::New) -> Result<R, RepositoryError> {
        let query = sqlx::query_as::<_, R>(&self.insert_sql);
        let row = R::bind_values(reading, query).fetch_one(&self.pool).await?;
        debug!(sensor = R::SENSOR, table = R::TABLE, id = row.id(), "Reading inserted");
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sqlx::PgPool;

    use super::*;
    use crate::db::models::{
        CombinedReading, NewCombinedReading, NewSingleProbeReading, SingleProbeReading,
    };

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn create_fills_id_and_timestamp(pool: PgPool) {
        let repo = PgSensorRepository::<CombinedReading>::new(pool);
        let before = Utc::now();

        let row = repo
            .create(NewCombinedReading {
                temperature: 21.5,
                humidity: 55.2,
            })
            .await
            .unwrap();

        assert!(row.id > 0);
        assert_eq!(row.temperature, 21.5);
        assert_eq!(row.humidity, 55.2);
        // now() is transaction start, allow for clock skew between client and server
        assert!(row.captured_at >= before - chrono::Duration::seconds(5));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn identical_readings_get_distinct_ids(pool: PgPool) {
        let repo = PgSensorRepository::<SingleProbeReading>::new(pool.clone());
        let new = NewSingleProbeReading { temperature: 4.25 };

        let first = repo.create(new).await.unwrap();
        let second = repo.create(new).await.unwrap();
        assert_ne!(first.id, second.id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ds18b20_readings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn kinds_write_to_their_own_tables(pool: PgPool) {
        PgSensorRepository::<CombinedReading>::new(pool.clone())
            .create(NewCombinedReading {
                temperature: 19.0,
                humidity: 40.0,
            })
            .await
            .unwrap();

        let sht31: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sht31_readings")
            .fetch_one(&pool)
            .await
            .unwrap();
        let ds18b20: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ds18b20_readings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((sht31, ds18b20), (1, 0));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn closed_pool_reports_database_error(pool: PgPool) {
        let repo = PgSensorRepository::<SingleProbeReading>::new(pool.clone());
        pool.close().await;

        let err = repo
            .create(NewSingleProbeReading { temperature: 1.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
