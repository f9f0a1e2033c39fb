//! acmidm-graph: SPARQL access to the triple store.
//!
//! Queries and updates are assembled from typed terms ([`Iri`], [`Literal`],
//! [`Var`]) and rendered to SPARQL text only at the edge, so caller data is
//! always escaped. Two [`GraphStore`] backends are provided: an HTTP
//! [`SparqlClient`] and an in-memory [`MemoryStore`].

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod store;
pub mod term;

pub use client::{GraphError, SparqlClient, SparqlConfig};
pub use memory::MemoryStore;
pub use mutations::{Update, UpdateOperation};
pub use queries::{Select, Solution};
pub use store::GraphStore;
pub use term::{Iri, Literal, PatternTerm, Term, Triple, TriplePattern, Var};
