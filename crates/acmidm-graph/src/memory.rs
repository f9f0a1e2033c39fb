//! In-memory triple store.
//!
//! Evaluates [`Select`] and [`Update`] directly against a quad set, with the
//! same matching rules a SPARQL endpoint applies to a basic graph pattern.
//! Used by tests and by dry runs that should not touch a real store.

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use crate::client::GraphError;
use crate::mutations::{Update, UpdateOperation};
use crate::queries::{Select, Solution};
use crate::store::GraphStore;
use crate::term::{Iri, PatternTerm, Term, Triple, TriplePattern};

/// A triple within a named graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quad {
    pub graph: Iri,
    pub triple: Triple,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    quads: RwLock<BTreeSet<Quad>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple to `graph` directly, bypassing updates.
    pub fn insert(&self, graph: &Iri, triple: Triple) {
        self.quads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Quad {
                graph: graph.clone(),
                triple,
            });
    }

    /// Number of quads across all graphs.
    pub fn len(&self) -> usize {
        self.quads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All triples in `graph`, in sorted order.
    pub fn triples_in(&self, graph: &Iri) -> Vec<Triple> {
        self.quads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|q| &q.graph == graph)
            .map(|q| q.triple.clone())
            .collect()
    }

    /// Evaluate a SELECT synchronously.
    pub fn evaluate(&self, query: &Select) -> Vec<Solution> {
        let quads = self.quads.read().unwrap_or_else(PoisonError::into_inner);
        let mut solutions = match_patterns(&quads, query.graph(), query.patterns());
        for solution in &mut solutions {
            solution.retain_vars(query.projection());
        }
        if let Some(limit) = query.limit_value() {
            solutions.truncate(limit);
        }
        solutions
    }

    /// Apply an update synchronously. Operations run in order.
    pub fn apply(&self, update: &Update) -> usize {
        let mut quads = self.quads.write().unwrap_or_else(PoisonError::into_inner);
        let mut changed = 0;

        for op in update.operations() {
            match op {
                UpdateOperation::InsertData { graph, triples } => {
                    for triple in triples {
                        let inserted = quads.insert(Quad {
                            graph: graph.clone(),
                            triple: triple.clone(),
                        });
                        changed += usize::from(inserted);
                    }
                }
                UpdateOperation::DeleteWhere { graph, patterns } => {
                    let doomed: Vec<Quad> = match_patterns(&quads, Some(graph), patterns)
                        .iter()
                        .flat_map(|solution| {
                            patterns
                                .iter()
                                .filter_map(move |p| instantiate(p, solution))
                        })
                        .map(|triple| Quad {
                            graph: graph.clone(),
                            triple,
                        })
                        .collect();
                    for quad in doomed {
                        changed += usize::from(quads.remove(&quad));
                    }
                }
            }
        }
        changed
    }
}

impl GraphStore for MemoryStore {
    async fn select(&self, query: &Select) -> Result<Vec<Solution>, GraphError> {
        Ok(self.evaluate(query))
    }

    async fn update(&self, update: &Update) -> Result<(), GraphError> {
        let changed = self.apply(update);
        tracing::trace!(changed, "Applied in-memory update");
        Ok(())
    }
}

// ── Basic graph pattern evaluation ───────────────────────────────

/// Nested-loop join of `patterns` over the quads of `graph` (all graphs if `None`).
fn match_patterns(
    quads: &BTreeSet<Quad>,
    graph: Option<&Iri>,
    patterns: &[TriplePattern],
) -> Vec<Solution> {
    let mut solutions = vec![Solution::new()];

    for pattern in patterns {
        let mut next = Vec::new();
        for solution in &solutions {
            for quad in quads.iter().filter(|q| graph.map_or(true, |g| &q.graph == g)) {
                if let Some(extended) = match_triple(pattern, &quad.triple, solution) {
                    next.push(extended);
                }
            }
        }
        solutions = next;
        if solutions.is_empty() {
            break;
        }
    }
    solutions
}

fn match_triple(pattern: &TriplePattern, triple: &Triple, solution: &Solution) -> Option<Solution> {
    let mut extended = solution.clone();
    let predicate = Term::Iri(triple.predicate.clone());

    let matched = match_term(&pattern.subject, &triple.subject, &mut extended)
        && match_term(&pattern.predicate, &predicate, &mut extended)
        && match_term(&pattern.object, &triple.object, &mut extended);

    matched.then_some(extended)
}

fn match_term(pattern: &PatternTerm, actual: &Term, solution: &mut Solution) -> bool {
    match pattern {
        PatternTerm::Term(term) => term == actual,
        PatternTerm::Var(var) => match solution.get(var.name()) {
            Some(bound) => bound == actual,
            None => {
                solution.bind(var.name(), actual.clone());
                true
            }
        },
    }
}

/// Ground `pattern` with `solution`; `None` if a position stays unbound
/// or the predicate is not an IRI.
fn instantiate(pattern: &TriplePattern, solution: &Solution) -> Option<Triple> {
    let resolve = |term: &PatternTerm| match term {
        PatternTerm::Term(t) => Some(t.clone()),
        PatternTerm::Var(v) => solution.get(v.name()).cloned(),
    };

    let predicate = resolve(&pattern.predicate)?.as_iri()?.clone();
    Some(Triple {
        subject: resolve(&pattern.subject)?,
        predicate,
        object: resolve(&pattern.object)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Literal, Var, RDF_TYPE};

    const FOAF: &str = "http://xmlns.com/foaf/0.1/";

    fn app_graph() -> Iri {
        Iri::new("http://mu.semte.ch/application")
    }

    fn other_graph() -> Iri {
        Iri::new("http://mu.semte.ch/other")
    }

    fn foaf(local: &str) -> Iri {
        Iri::new(format!("{FOAF}{local}"))
    }

    fn seed(store: &MemoryStore) {
        let alice = Iri::new("http://x/alice");
        let bob = Iri::new("http://x/bob");
        store.insert(&app_graph(), Triple::new(alice.clone(), RDF_TYPE, foaf("Person")));
        store.insert(&app_graph(), Triple::new(alice, foaf("firstName"), Literal::string("Alice")));
        store.insert(&app_graph(), Triple::new(bob.clone(), RDF_TYPE, foaf("Person")));
        store.insert(&other_graph(), Triple::new(bob, foaf("firstName"), Literal::string("Bob")));
    }

    #[test]
    fn joins_patterns_on_shared_variables() {
        let store = MemoryStore::new();
        seed(&store);

        let person = Var::new("person");
        let name = Var::new("name");
        let q = Select::new()
            .var(person.clone())
            .var(name.clone())
            .pattern(person.clone(), Iri::new(RDF_TYPE), foaf("Person"))
            .pattern(person, foaf("firstName"), name);

        let rows = store.evaluate(&q);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn from_graph_scopes_matching() {
        let store = MemoryStore::new();
        seed(&store);

        let person = Var::new("person");
        let q = Select::new()
            .var(person.clone())
            .from_graph(app_graph())
            .pattern(person.clone(), Iri::new(RDF_TYPE), foaf("Person"))
            .pattern(person, foaf("firstName"), Var::new("name"));

        let rows = store.evaluate(&q);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("person"), Some("http://x/alice"));
        assert!(rows[0].get("name").is_none(), "unprojected var leaked");
    }

    #[test]
    fn limit_truncates_solutions() {
        let store = MemoryStore::new();
        seed(&store);

        let q = Select::new()
            .pattern(Var::new("s"), Var::new("p"), Var::new("o"))
            .limit(1);
        assert_eq!(store.evaluate(&q).len(), 1);
    }

    #[test]
    fn insert_data_is_set_semantics() {
        let store = MemoryStore::new();
        let triple = Triple::new(Iri::new("http://x/s"), "http://x/p", Literal::string("v"));
        let update = Update::new()
            .insert_data(app_graph(), vec![triple.clone()])
            .insert_data(app_graph(), vec![triple]);

        assert_eq!(store.apply(&update), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_where_removes_only_matched_triples_in_graph() {
        let store = MemoryStore::new();
        seed(&store);

        let update = Update::new().delete_where(
            app_graph(),
            vec![TriplePattern::new(
                Var::new("who"),
                foaf("firstName"),
                Var::new("name"),
            )],
        );

        assert_eq!(store.apply(&update), 1);
        // Bob's name lives in another graph and survives.
        assert_eq!(store.triples_in(&other_graph()).len(), 1);
        assert_eq!(store.triples_in(&app_graph()).len(), 2);
    }

    #[test]
    fn delete_where_requires_the_whole_pattern_to_match() {
        let store = MemoryStore::new();
        seed(&store);

        let bob = Iri::new("http://x/bob");
        let update = Update::new().delete_where(
            app_graph(),
            vec![
                TriplePattern::new(&bob, Iri::new(RDF_TYPE), Var::new("t")),
                TriplePattern::new(&bob, foaf("firstName"), Var::new("n")),
            ],
        );

        assert_eq!(store.apply(&update), 0);
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn graph_store_impl_roundtrips() {
        let store = MemoryStore::new();
        let s = Iri::new("http://x/s");
        store
            .update(&Update::new().insert_data(
                app_graph(),
                vec![Triple::new(s.clone(), "http://x/p", Literal::string("a \"quoted\" value"))],
            ))
            .await
            .unwrap();

        let rows = store
            .select(
                &Select::new()
                    .from_graph(app_graph())
                    .pattern(&s, Iri::new("http://x/p"), Var::new("v")),
            )
            .await
            .unwrap();
        assert_eq!(rows[0].value("v"), Some("a \"quoted\" value"));
    }
}
