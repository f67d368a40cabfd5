//! RDF term model.
//!
//! Ontovault keeps its own small term model instead of exposing a parser
//! library's types at the API boundary: statements flow between this core and
//! the surrounding storage/controller layers, and those layers must not be
//! coupled to the parsing stack. Parsers populate these types; everything
//! downstream (identity codec, import orderer, connectivity validator) only
//! reads them.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// An Internationalized Resource Identifier.
///
/// Stored as-read; Ontovault treats IRIs as opaque identifiers and never
/// normalizes or resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `#`/`/` segment, for diagnostics.
    pub fn local_name(&self) -> &str {
        self.0.rsplit(['#', '/']).next().unwrap_or(&self.0)
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A statement endpoint that can occupy the subject position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Iri(Iri),
    /// Blank node, identified by its document-scoped label.
    Blank(String),
}

impl Resource {
    pub fn iri(value: impl Into<String>) -> Self {
        Resource::Iri(Iri::new(value))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Resource::Iri(iri) => Some(iri),
            Resource::Blank(_) => None,
        }
    }
}

impl From<Iri> for Resource {
    fn from(iri: Iri) -> Self {
        Resource::Iri(iri)
    }
}

/// An RDF literal: lexical form plus at most one of datatype or language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<Iri>,
    pub language: Option<String>,
}

impl Literal {
    pub fn simple(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

/// Anything that can occupy the object position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Resource(Resource),
    Literal(Literal),
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Resource(Resource::Iri(Iri::new(value)))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Resource(resource) => resource.as_iri(),
            Term::Literal(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl From<Resource> for Term {
    fn from(resource: Resource) -> Self {
        Term::Resource(resource)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

/// Named-graph selector: one specific named graph, or the default graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphId {
    Default,
    Named(Iri),
}

impl GraphId {
    /// Whether a statement carrying `graph` belongs to this context.
    pub fn matches(&self, graph: &Option<Iri>) -> bool {
        match (self, graph) {
            (GraphId::Default, None) => true,
            (GraphId::Named(wanted), Some(got)) => wanted == got,
            _ => false,
        }
    }
}

/// A single RDF statement (quad-shaped; `graph = None` is the default graph).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Resource,
    pub predicate: Iri,
    pub object: Term,
    pub graph: Option<Iri>,
}

impl Statement {
    pub fn new(subject: Resource, predicate: Iri, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
        }
    }

    /// Edge between two IRI resources in the default graph. Most of the
    /// vocabulary-driven statements Ontovault emits have this shape.
    pub fn link(subject: &Iri, predicate: &str, object: &Iri) -> Self {
        Self::new(
            Resource::Iri(subject.clone()),
            Iri::new(predicate),
            Term::Resource(Resource::Iri(object.clone())),
        )
    }

    pub fn in_graph(mut self, graph: Iri) -> Self {
        self.graph = Some(graph);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iri_local_name_splits_on_hash_and_slash() {
        assert_eq!(Iri::new("http://example.org/a/b#c").local_name(), "c");
        assert_eq!(Iri::new("http://example.org/a/b").local_name(), "b");
        assert_eq!(Iri::new("urn:x").local_name(), "urn:x");
    }

    #[test]
    fn term_as_iri_ignores_literals_and_blanks() {
        assert!(Term::iri("http://example.org/x").as_iri().is_some());
        assert!(Term::Literal(Literal::simple("x")).as_iri().is_none());
        assert!(Term::Resource(Resource::Blank("b0".into())).as_iri().is_none());
    }

    #[test]
    fn graph_id_matches_default_and_named() {
        let g = Iri::new("http://example.org/graph");
        assert!(GraphId::Default.matches(&None));
        assert!(!GraphId::Default.matches(&Some(g.clone())));
        assert!(GraphId::Named(g.clone()).matches(&Some(g.clone())));
        assert!(!GraphId::Named(g).matches(&None));
    }

    #[test]
    fn link_builds_default_graph_statement() {
        let a = Iri::new("http://example.org/a");
        let b = Iri::new("http://example.org/b");
        let st = Statement::link(&a, "http://example.org/p", &b);
        assert_eq!(st.graph, None);
        assert_eq!(st.object.as_iri(), Some(&b));

        let g = Iri::new("http://example.org/g");
        assert_eq!(st.in_graph(g.clone()).graph, Some(g));
    }
}
