//! SELECT query builder and result solutions.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::client::GraphError;
use crate::term::{render_iri, render_pattern_term, Iri, Literal, PatternTerm, Position, Prefixes, Term, TriplePattern, Var};

/// A `SELECT` over a single basic graph pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    prefixes: Prefixes,
    projection: Vec<Var>,
    graph: Option<Iri>,
    patterns: Vec<TriplePattern>,
    limit: Option<usize>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, name: &str, namespace: &str) -> Self {
        self.prefixes.declare(name, namespace);
        self
    }

    pub fn prefixes<'a>(mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (name, namespace) in entries {
            self.prefixes.declare(name, namespace);
        }
        self
    }

    /// Add a projected variable. With no projection the query selects `*`.
    pub fn var(mut self, var: Var) -> Self {
        self.projection.push(var);
        self
    }

    /// Restrict the query to `graph` via `FROM`.
    pub fn from_graph(mut self, graph: Iri) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn pattern(
        mut self,
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        self.patterns
            .push(TriplePattern::new(subject, predicate, object));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn projection(&self) -> &[Var] {
        &self.projection
    }

    pub fn graph(&self) -> Option<&Iri> {
        self.graph.as_ref()
    }

    pub fn patterns(&self) -> &[TriplePattern] {
        &self.patterns
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// Render as SPARQL query text.
    pub fn to_sparql(&self) -> String {
        let mut out = self.prefixes.render();

        out.push_str("SELECT");
        if self.projection.is_empty() {
            out.push_str(" *");
        }
        for var in &self.projection {
            out.push(' ');
            out.push_str(&var.to_string());
        }
        out.push('\n');

        if let Some(graph) = &self.graph {
            out.push_str(&format!(
                "FROM {}\n",
                render_iri(graph, &Prefixes::new(), Position::Object)
            ));
        }

        out.push_str("WHERE {\n");
        for pattern in &self.patterns {
            out.push_str("  ");
            out.push_str(&render_pattern(pattern, &self.prefixes));
            out.push('\n');
        }
        out.push('}');

        if let Some(limit) = self.limit {
            out.push_str(&format!("\nLIMIT {limit}"));
        }
        out
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sparql())
    }
}

/// Render one triple pattern as `s p o .`.
pub(crate) fn render_pattern(pattern: &TriplePattern, prefixes: &Prefixes) -> String {
    format!(
        "{} {} {} .",
        render_pattern_term(&pattern.subject, prefixes, Position::Subject),
        render_pattern_term(&pattern.predicate, prefixes, Position::Predicate),
        render_pattern_term(&pattern.object, prefixes, Position::Object),
    )
}

// ── Solutions ────────────────────────────────────────────────────

/// One row of variable bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    bindings: BTreeMap<String, Term>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &str) -> Option<&Term> {
        self.bindings.get(var)
    }

    pub fn bind(&mut self, var: impl Into<String>, term: Term) {
        self.bindings.insert(var.into(), term);
    }

    /// The string value bound to `var`, whatever its term kind.
    pub fn value(&self, var: &str) -> Option<&str> {
        self.get(var).map(Term::value)
    }

    /// Like [`Solution::value`], but a missing binding is an error.
    pub fn require_value(&self, var: &str) -> Result<&str, GraphError> {
        self.value(var).ok_or_else(|| GraphError::MissingBinding {
            var: var.to_string(),
        })
    }

    /// The IRI bound to `var`; any other term kind is an error.
    pub fn require_iri(&self, var: &str) -> Result<&str, GraphError> {
        match self.get(var) {
            Some(Term::Iri(iri)) => Ok(iri.as_str()),
            Some(_) => Err(GraphError::UnexpectedTerm {
                var: var.to_string(),
                expected: "IRI",
            }),
            None => Err(GraphError::MissingBinding {
                var: var.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn retain_vars(&mut self, vars: &[Var]) {
        if vars.is_empty() {
            return;
        }
        self.bindings
            .retain(|name, _| vars.iter().any(|v| v.name() == name));
    }
}

// ── SPARQL JSON results ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ResultsDocument {
    results: ResultsBody,
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    bindings: Vec<BTreeMap<String, JsonTerm>>,
}

#[derive(Debug, Deserialize)]
struct JsonTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    datatype: Option<String>,
    #[serde(rename = "xml:lang")]
    lang: Option<String>,
}

impl JsonTerm {
    fn into_term(self) -> Result<Term, GraphError> {
        match self.kind.as_str() {
            "uri" => Ok(Term::Iri(Iri::new(self.value))),
            "bnode" => Ok(Term::Blank(self.value)),
            "literal" | "typed-literal" => Ok(Term::Literal(match (self.datatype, self.lang) {
                (_, Some(lang)) => Literal::lang(self.value, lang),
                (Some(dt), None) => Literal::typed(self.value, dt),
                (None, None) => Literal::string(self.value),
            })),
            other => Err(GraphError::Serialization(format!(
                "Unknown binding type in SPARQL results: {other}"
            ))),
        }
    }
}

/// Decode an `application/sparql-results+json` document.
pub fn parse_results_json(body: &str) -> Result<Vec<Solution>, GraphError> {
    let doc: ResultsDocument = serde_json::from_str(body)
        .map_err(|e| GraphError::Serialization(format!("Invalid SPARQL results: {e}")))?;

    doc.results
        .bindings
        .into_iter()
        .map(|row| {
            let mut solution = Solution::new();
            for (var, term) in row {
                solution.bind(var, term.into_term()?);
            }
            Ok(solution)
        })
        .collect()
}
