//! Postgres implementation of the Trellis storage seam.
//!
//! Row-returning statements are wrapped in a CTE and collapsed through
//! `to_jsonb`, so every row crosses the seam as one JSON object regardless
//! of the column list. Data-modifying statements with `RETURNING` work the
//! same way.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{Arguments, Postgres, Row, Transaction};
use trellis_api::{Param, Store, StoreError, StoreTx};

pub struct PostgresStore {
    pool: sqlx::PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(backend)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(backend)?;
        Ok(Box::new(PgTx { tx }))
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn query(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Vec<serde_json::Value>, StoreError> {
        let args = bind_params(params)?;
        let recs = sqlx::query_with(&jsonify(sql), args)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(backend)?;
        let mut rows = Vec::with_capacity(recs.len());
        for rec in recs {
            rows.push(
                rec.try_get::<serde_json::Value, _>("row")
                    .map_err(backend)?,
            );
        }
        Ok(rows)
    }

    async fn execute(&mut self, sql: &str, params: &[Param]) -> Result<u64, StoreError> {
        let args = bind_params(params)?;
        let result = sqlx::query_with(sql, args)
            .execute(&mut *self.tx)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::Close(e.to_string()))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| StoreError::Close(e.to_string()))
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Collapse each result row into one JSON object column named `row`.
fn jsonify(sql: &str) -> String {
    format!("WITH q AS ({}) SELECT to_jsonb(q) AS \"row\" FROM q", sql)
}

fn bind_params(params: &[Param]) -> Result<PgArguments, StoreError> {
    let mut args = PgArguments::default();
    for p in params {
        let added = match p {
            Param::Null => args.add(Option::<String>::None),
            Param::Bool(b) => args.add(*b),
            Param::Int(i) => args.add(*i),
            Param::Float(f) => args.add(*f),
            Param::Text(s) => args.add(s.clone()),
        };
        added.map_err(|e| StoreError::Backend(e.to_string()))?;
    }
    Ok(args)
}
