//! Transaction traits

use crate::error::Result;
use crate::traits::Pool;
use std::future::Future;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    /// InnoDB's own default.
    #[default]
    RepeatableRead,
    Serializable,
}

/// An open transaction.
///
/// A transaction is itself a [`Pool`], so anything that takes `&impl Pool`
/// (repositories, the ledger) runs inside it unchanged.
///
/// ```ignore
/// let tx = pool.begin().await?;
/// tx.execute_script(sql).await?;
/// Repository::<_, LedgerEntry>::new(&tx).insert(&entry).await?;
/// tx.commit().await?;
/// ```
pub trait Transaction: Pool {
    /// Commit, making all changes permanent. The transaction cannot be used afterwards.
    fn commit(&self) -> impl Future<Output = Result<()>> + Send;

    /// Roll back all changes. The transaction cannot be used afterwards.
    fn rollback(&self) -> impl Future<Output = Result<()>> + Send;
}

/// A pool that can open transactions.
pub trait Transactional: Pool {
    /// The transaction type for this pool.
    type Tx: Transaction + Send + Sync;

    /// Begin a new transaction with the default isolation level.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx>> + Send;

    /// Begin a new transaction with the specified isolation level.
    fn begin_with(&self, level: IsolationLevel) -> impl Future<Output = Result<Self::Tx>> + Send;
}
