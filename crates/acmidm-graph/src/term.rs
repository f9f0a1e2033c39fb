//! RDF terms and their SPARQL rendering.
//!
//! Values only reach query text through [`Iri`] and [`Literal`], which keep
//! the raw value and escape it when rendered. There is no way to splice
//! unescaped text into a [`Select`](crate::queries::Select) or
//! [`Update`](crate::mutations::Update).

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

// ── Terms ────────────────────────────────────────────────────────

/// An IRI, stored unescaped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Iri(String);

impl Iri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape_iri(&self.0))
    }
}

/// Datatype or language tag attached to a literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LiteralKind {
    Plain,
    Typed(Iri),
    Lang(String),
}

/// An RDF literal, stored unescaped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    value: String,
    kind: LiteralKind,
}

impl Literal {
    /// A plain string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Plain,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Typed(datatype.into()),
        }
    }

    pub fn lang(value: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Lang(tag.into()),
        }
    }

    /// An `xsd:dateTime` literal in UTC with millisecond precision.
    pub fn date_time(at: DateTime<Utc>) -> Self {
        Self::typed(
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
            XSD_DATE_TIME,
        )
    }

    /// The lexical form.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> &LiteralKind {
        &self.kind
    }
}

/// A ground RDF term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
    Blank(String),
}

impl Term {
    /// IRI string, literal lexical form, or blank node label.
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(iri) => iri.as_str(),
            Term::Literal(lit) => lit.value(),
            Term::Blank(label) => label.as_str(),
        }
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

/// A query variable. Names are chosen by code, never by callers' data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(&'static str);

impl Var {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A position in a triple pattern: a variable or a ground term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    Var(Var),
    Term(Term),
}

impl From<Var> for PatternTerm {
    fn from(var: Var) -> Self {
        PatternTerm::Var(var)
    }
}

impl From<&Var> for PatternTerm {
    fn from(var: &Var) -> Self {
        PatternTerm::Var(var.clone())
    }
}

impl From<Term> for PatternTerm {
    fn from(term: Term) -> Self {
        PatternTerm::Term(term)
    }
}

impl From<Iri> for PatternTerm {
    fn from(iri: Iri) -> Self {
        PatternTerm::Term(Term::Iri(iri))
    }
}

impl From<&Iri> for PatternTerm {
    fn from(iri: &Iri) -> Self {
        PatternTerm::Term(Term::Iri(iri.clone()))
    }
}

impl From<Literal> for PatternTerm {
    fn from(lit: Literal) -> Self {
        PatternTerm::Term(Term::Literal(lit))
    }
}

// ── Triples ──────────────────────────────────────────────────────

/// A ground triple, as written by `INSERT DATA`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// A triple pattern in a basic graph pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

// ── Prefixes ─────────────────────────────────────────────────────

/// Prefix declarations used to compact IRIs in rendered queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefixes {
    entries: Vec<(String, String)>,
}

impl Prefixes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name:` for `namespace`. Redeclaring a name replaces it.
    pub fn declare(&mut self, name: impl Into<String>, namespace: impl Into<String>) {
        let name = name.into();
        let namespace = namespace.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = namespace,
            None => self.entries.push((name, namespace)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `prefix:local` for `iri`, if a declared namespace covers it with a
    /// local name that needs no escaping.
    pub fn compact(&self, iri: &Iri) -> Option<String> {
        self.entries
            .iter()
            .find_map(|(name, ns)| {
                let local = iri.as_str().strip_prefix(ns.as_str())?;
                is_simple_local_name(local).then(|| format!("{name}:{local}"))
            })
    }

    /// `PREFIX` lines, one per declaration.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, ns) in &self.entries {
            out.push_str(&format!("PREFIX {name}: {}\n", escape_iri(ns)));
        }
        out
    }
}

fn is_simple_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ── Rendering ────────────────────────────────────────────────────

/// Where a term appears; `rdf:type` renders as `a` in predicate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Subject,
    Predicate,
    Object,
}

pub(crate) fn render_iri(iri: &Iri, prefixes: &Prefixes, position: Position) -> String {
    if position == Position::Predicate && iri.as_str() == RDF_TYPE {
        return "a".to_string();
    }
    prefixes
        .compact(iri)
        .unwrap_or_else(|| escape_iri(iri.as_str()))
}

pub(crate) fn render_term(term: &Term, prefixes: &Prefixes, position: Position) -> String {
    match term {
        Term::Iri(iri) => render_iri(iri, prefixes, position),
        Term::Literal(lit) => render_literal(lit, prefixes),
        Term::Blank(label) => format!("_:{label}"),
    }
}

pub(crate) fn render_pattern_term(
    term: &PatternTerm,
    prefixes: &Prefixes,
    position: Position,
) -> String {
    match term {
        PatternTerm::Var(var) => var.to_string(),
        PatternTerm::Term(term) => render_term(term, prefixes, position),
    }
}

pub(crate) fn render_literal(lit: &Literal, prefixes: &Prefixes) -> String {
    let quoted = escape_string(lit.value());
    match lit.kind() {
        LiteralKind::Plain => quoted,
        LiteralKind::Typed(dt) => {
            format!("{quoted}^^{}", render_iri(dt, prefixes, Position::Object))
        }
        LiteralKind::Lang(tag) => {
            let tag: String = tag
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            format!("{quoted}@{tag}")
        }
    }
}

/// Quote `raw` as a SPARQL string literal.
///
/// Every character that could end or alter the literal is written as an
/// ECHAR escape sequence. A `\u` sequence in `raw` is kept as text, which an
/// endpoint that expands codepoint escapes before parsing would rewrite.
pub fn escape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Wrap `raw` in angle brackets as a SPARQL IRI reference.
///
/// Characters not allowed inside `<...>` are percent-encoded. SPARQL
/// resolves `\u` escapes before parsing, so they cannot be used here.
/// The encoding is many-to-one: `a>` and `a%3E` produce the same token.
pub fn escape_iri(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('<');
    for c in raw.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => percent_encode(&mut out, c),
            c if (c as u32) <= 0x20 || c == '\u{7F}' => percent_encode(&mut out, c),
            c => out.push(c),
        }
    }
    out.push('>');
    out
}

fn percent_encode(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).bytes() {
        out.push_str(&format!("%{byte:02X}"));
    }
}
