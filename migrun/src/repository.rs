//! Generic CRUD over a [`Record`] type

use std::marker::PhantomData;

use crate::error::Result;
use crate::query::Query;
use crate::sql;
use crate::traits::{ExecuteResult, FromRow, Pool, Record, ToValue};
use crate::value::Value;

/// CRUD access to the table behind `T`.
///
/// Holds a reference to whatever it runs against; pass a transaction to
/// group several calls.
///
/// ```ignore
/// let templates = Repository::<_, Template>::new(&pool);
/// let id = templates.insert(&template).await?.last_insert_id;
/// let found = templates.get_one(id).await?;
/// ```
pub struct Repository<'p, P, T> {
    pool: &'p P,
    _record: PhantomData<fn() -> T>,
}

impl<'p, P, T> Repository<'p, P, T>
where
    P: Pool,
    T: Record + FromRow + Send,
{
    pub fn new(pool: &'p P) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<T>> {
        Query::new(sql::select_all(&T::TABLE))
            .fetch_all(self.pool)
            .await
    }

    /// Rows matching `condition`, a SQL fragment with `?` placeholders.
    pub async fn get_where(&self, condition: &str, params: Vec<Value>) -> Result<Vec<T>> {
        Query::new(sql::select_where(&T::TABLE, condition))
            .bind_values(params)
            .fetch_all(self.pool)
            .await
    }

    pub async fn get_one(&self, key: impl ToValue) -> Result<Option<T>> {
        Query::new(sql::select_by_key(&T::TABLE)?)
            .bind(key)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn insert(&self, record: &T) -> Result<ExecuteResult> {
        Query::new(sql::insert(&T::TABLE))
            .bind_values(record.insert_values())
            .execute(self.pool)
            .await
    }

    pub async fn update(&self, record: &T) -> Result<ExecuteResult> {
        Query::new(sql::update(&T::TABLE)?)
            .bind_values(record.update_values())
            .execute(self.pool)
            .await
    }

    pub async fn delete(&self, key: impl ToValue) -> Result<ExecuteResult> {
        Query::new(sql::delete_by_key(&T::TABLE)?)
            .bind(key)
            .execute(self.pool)
            .await
    }
}
