//! The `GraphStore` trait: the query/update seam every accessor talks to.

use std::future::Future;

use crate::client::GraphError;
use crate::mutations::Update;
use crate::queries::{Select, Solution};

/// A triple store that can answer SELECT queries and apply updates.
///
/// Implemented by [`SparqlClient`](crate::SparqlClient) for a live endpoint
/// and by [`MemoryStore`](crate::MemoryStore) for tests and dry runs.
///
/// All methods return `Send` futures so stores can be shared across tasks
/// on a multi-threaded runtime.
pub trait GraphStore: Send + Sync {
    /// Run a SELECT and return every solution, in store order.
    fn select<'a>(
        &'a self,
        query: &'a Select,
    ) -> impl Future<Output = Result<Vec<Solution>, GraphError>> + Send + 'a;

    /// Apply an update. Operations within one update are sent together.
    fn update<'a>(
        &'a self,
        update: &'a Update,
    ) -> impl Future<Output = Result<(), GraphError>> + Send + 'a;
}
