//! Scoped in-memory statement store.
//!
//! The production triple store lives behind the storage layer; this store
//! exists for throwaway work: loading an uploaded payload under a synthetic
//! context, running a check over it, and guaranteeing that nothing survives
//! the call. Writes go through a [`Transaction`] guard: `commit()` publishes
//! atomically, and a guard dropped without commit rolls back, including when
//! a panic unwinds through it.

use crate::codec::{parse_statements, RdfError, RdfFormat};
use crate::statements::StatementSet;
use crate::term::{GraphId, Iri, Statement};

/// Graph-partitioned in-memory statement store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: StatementSet,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed statements.
    pub fn statements(&self) -> &StatementSet {
        &self.committed
    }

    /// Begin a transaction. Writes are buffered in a working copy until
    /// [`Transaction::commit`]; dropping the guard discards them.
    pub fn transaction(&mut self) -> Transaction<'_> {
        let working = self.committed.clone();
        Transaction {
            store: self,
            working,
            committed: false,
        }
    }

    /// Run scoped work inside a transaction that is always rolled back.
    ///
    /// The closure receives the guard by reference, so it cannot commit;
    /// whatever it stages is gone when `scoped` returns, on the success
    /// path, on early returns, and on unwind.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Transaction<'_>) -> R) -> R {
        let mut txn = self.transaction();
        f(&mut txn)
    }
}

/// Write guard over a [`MemoryStore`].
#[derive(Debug)]
pub struct Transaction<'a> {
    store: &'a mut MemoryStore,
    working: StatementSet,
    committed: bool,
}

impl Transaction<'_> {
    /// Stage a statement, returning whether it was new.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.working.insert(statement)
    }

    /// Stage removal of every statement in `context`.
    pub fn remove_graph(&mut self, context: &GraphId) {
        self.working.remove_graph(context);
    }

    /// Parse `bytes` as `format` and stage the result. When `graph` is given,
    /// every parsed statement is rehomed into that context. Returns the
    /// number of newly staged statements.
    pub fn load(
        &mut self,
        bytes: &[u8],
        format: RdfFormat,
        graph: Option<&Iri>,
    ) -> Result<usize, RdfError> {
        let parsed = parse_statements(bytes, format)?;
        let mut added = 0;
        for mut statement in parsed {
            if let Some(graph) = graph {
                statement.graph = Some(graph.clone());
            }
            if self.working.insert(statement) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Read view over committed plus staged statements.
    pub fn statements(&self) -> &StatementSet {
        &self.working
    }

    /// Publish the staged state.
    pub fn commit(mut self) {
        self.store.committed = std::mem::take(&mut self.working);
        self.committed = true;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!(
                staged = self.working.len(),
                "rolling back uncommitted transaction"
            );
        }
    }
}
