pub mod repository;

#[cfg(test)]
pub(crate) mod memory;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, Postgres,
};

use crate::db::models::{
    CombinedReading, NewCombinedReading, NewSingleProbeReading, SingleProbeReading,
};

pub use repository::{PgSensorRepository, RepositoryError, SensorRepository};

// ---------------------------------------------------------------------------
// ReadingKind
// ---------------------------------------------------------------------------

/// Describes how one kind of reading is stored: which table, which value
/// columns, and how a not-yet-persisted reading binds to them.
///
/// Every table shares the `id BIGSERIAL` / `captured_at TIMESTAMPTZ DEFAULT now()`
/// pair; only the value columns vary.
pub trait ReadingKind:
    for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static
{
    /// Sensor model name, used in log fields and response messages.
    const SENSOR: &'static str;
    /// Table name. Set explicitly so renaming the type never renames storage.
    const TABLE: &'static str;
    /// Value columns, in the order `bind_values` binds them.
    const COLUMNS: &'static [&'static str];

    type New: Send + 'static;

    fn bind_values<'q>(
        new: Self::New,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments>;

    /// Combine store-assigned fields with client values.
    fn assemble(id: i64, captured_at: DateTime<Utc>, new: Self::New) -> Self;

    fn id(&self) -> i64;
}

impl ReadingKind for CombinedReading {
    const SENSOR: &'static str = "SHT31";
    const TABLE: &'static str = "sht31_readings";
    const COLUMNS: &'static [&'static str] = &["temperature", "humidity"];

    type New = NewCombinedReading;

    fn bind_values<'q>(
        new: NewCombinedReading,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments> {
        query.bind(new.temperature).bind(new.humidity)
    }

    fn assemble(id: i64, captured_at: DateTime<Utc>, new: NewCombinedReading) -> Self {
        Self {
            id,
            temperature: new.temperature,
            humidity: new.humidity,
            captured_at,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl ReadingKind for SingleProbeReading {
    const SENSOR: &'static str = "DS18B20";
    const TABLE: &'static str = "ds18b20_readings";
    const COLUMNS: &'static [&'static str] = &["temperature"];

    type New = NewSingleProbeReading;

    fn bind_values<'q>(
        new: NewSingleProbeReading,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments> {
        query.bind(new.temperature)
    }

    fn assemble(id: i64, captured_at: DateTime<Utc>, new: NewSingleProbeReading) -> Self {
        Self {
            id,
            temperature: new.temperature,
            captured_at,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// `INSERT ... RETURNING` statement for `R`. The store fills `id` and
/// `captured_at`; both come back in the returned row.
pub fn insert_statement<R: ReadingKind>() -> String {
    let columns = R::COLUMNS.join(", ");
    let placeholders = (1..=R::COLUMNS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         RETURNING id, {columns}, captured_at",
        table = R::TABLE,
    )
}
