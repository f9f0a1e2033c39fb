//! SPARQL update builder.
//!
//! An [`Update`] is a sequence of operations sent as one request. Each
//! operation names its graph explicitly.

use std::fmt;

use crate::queries::render_pattern;
use crate::term::{render_iri, render_term, Iri, Position, Prefixes, Triple, TriplePattern};

/// A single update operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOperation {
    /// `INSERT DATA { GRAPH <g> { ... } }`
    InsertData { graph: Iri, triples: Vec<Triple> },
    /// `DELETE WHERE { GRAPH <g> { ... } }`
    DeleteWhere {
        graph: Iri,
        patterns: Vec<TriplePattern>,
    },
}

/// A SPARQL update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    prefixes: Prefixes,
    operations: Vec<UpdateOperation>,
}

impl Update {
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

    pub fn insert_data(mut self, graph: Iri, triples: Vec<Triple>) -> Self {
        self.operations
            .push(UpdateOperation::InsertData { graph, triples });
        self
    }

    pub fn delete_where(mut self, graph: Iri, patterns: Vec<TriplePattern>) -> Self {
        self.operations
            .push(UpdateOperation::DeleteWhere { graph, patterns });
        self
    }

    pub fn operations(&self) -> &[UpdateOperation] {
        &self.operations
    }

    /// Render as SPARQL update text.
    pub fn to_sparql(&self) -> String {
        let mut out = self.prefixes.render();
        let rendered: Vec<String> = self
            .operations
            .iter()
            .map(|op| self.render_operation(op))
            .collect();
        out.push_str(&rendered.join(" ;\n"));
        out
    }

    fn render_operation(&self, op: &UpdateOperation) -> String {
        let (keyword, graph, lines) = match op {
            UpdateOperation::InsertData { graph, triples } => (
                "INSERT DATA",
                graph,
                triples
                    .iter()
                    .map(|t| render_triple(t, &self.prefixes))
                    .collect::<Vec<_>>(),
            ),
            UpdateOperation::DeleteWhere { graph, patterns } => (
                "DELETE WHERE",
                graph,
                patterns
                    .iter()
                    .map(|p| render_pattern(p, &self.prefixes))
                    .collect::<Vec<_>>(),
            ),
        };

        let mut out = format!(
            "{keyword} {{\n  GRAPH {} {{\n",
            render_iri(graph, &Prefixes::new(), Position::Object)
        );
        for line in lines {
            out.push_str("    ");
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("  }\n}");
        out
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sparql())
    }
}

fn render_triple(triple: &Triple, prefixes: &Prefixes) -> String {
    format!(
        "{} {} {} .",
        render_term(&triple.subject, prefixes, Position::Subject),
        render_iri(&triple.predicate, prefixes, Position::Predicate),
        render_term(&triple.object, prefixes, Position::Object),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Literal, Var};

    const MU: &str = "http://mu.semte.ch/vocabularies/core/";
    const SESSION: &str = "http://mu.semte.ch/vocabularies/session/";

    fn graph() -> Iri {
        Iri::new("http://mu.semte.ch/application")
    }

    #[test]
    fn renders_insert_data_inside_graph() {
        let session = Iri::new("http://mu.semte.ch/sessions/abc");
        let update = Update::new().prefix("mu", MU).insert_data(
            graph(),
            vec![Triple::new(
                session,
                "http://mu.semte.ch/vocabularies/core/uuid",
                Literal::string("42"),
            )],
        );

        assert_eq!(
            update.to_sparql(),
            "PREFIX mu: <http://mu.semte.ch/vocabularies/core/>\n\
             INSERT DATA {\n  GRAPH <http://mu.semte.ch/application> {\n    \
             <http://mu.semte.ch/sessions/abc> mu:uuid \"42\" .\n  }\n}"
        );
    }

    #[test]
    fn joins_operations_with_semicolons() {
        let session = Iri::new("http://mu.semte.ch/sessions/abc");
        let update = Update::new()
            .prefix("session", SESSION)
            .delete_where(
                graph(),
                vec![TriplePattern::new(
                    &session,
                    Iri::new("http://mu.semte.ch/vocabularies/session/account"),
                    Var::new("account"),
                )],
            )
            .delete_where(
                graph(),
                vec![TriplePattern::new(
                    &session,
                    Iri::new("http://mu.semte.ch/vocabularies/session/group"),
                    Var::new("group"),
                )],
            );

        let text = update.to_sparql();
        assert_eq!(text.matches("DELETE WHERE").count(), 2);
        assert!(text.contains("}\n} ;\nDELETE WHERE"));
        assert!(text.contains("<http://mu.semte.ch/sessions/abc> session:account ?account ."));
        assert_eq!(update.operations().len(), 2);
    }

    #[test]
    fn hostile_subject_cannot_escape_the_graph_block() {
        let update = Update::new().insert_data(
            graph(),
            vec![Triple::new(
                Iri::new("http://x/s> } } ; DROP ALL ; INSERT DATA { GRAPH <http://x/g> { <http://x/s"),
                "http://x/p",
                Literal::string("v"),
            )],
        );
        let text = update.to_sparql();
        assert!(!text.contains("> } }"));
        assert_eq!(text.matches('{').count(), 2);
    }
}
