//! Statement sets with pattern-filtered reads.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::term::{GraphId, Iri, Resource, Statement, Term};

/// An in-memory statement collection.
///
/// Duplicates are suppressed and iteration follows insertion order, so every
/// read over the same set is deterministic. The pattern-filtered
/// [`matching`](StatementSet::matching) read is the interface the identity
/// codec, import orderer and connectivity validator are written against; a
/// production triple-store connection satisfies the same contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Statement>", from = "Vec<Statement>")]
pub struct StatementSet {
    statements: Vec<Statement>,
    seen: HashSet<Statement>,
}

impl StatementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a statement, returning whether it was new.
    pub fn insert(&mut self, statement: Statement) -> bool {
        if !self.seen.insert(statement.clone()) {
            return false;
        }
        self.statements.push(statement);
        true
    }

    pub fn extend(&mut self, statements: impl IntoIterator<Item = Statement>) {
        for statement in statements {
            self.insert(statement);
        }
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.seen.contains(statement)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Pattern-filtered read: `None` in a position matches anything, `None`
    /// in the graph position matches every context.
    pub fn matching<'a>(
        &'a self,
        subject: Option<&'a Resource>,
        predicate: Option<&'a Iri>,
        object: Option<&'a Term>,
        graph: Option<&'a GraphId>,
    ) -> impl Iterator<Item = &'a Statement> + 'a {
        self.statements.iter().filter(move |st| {
            subject.map_or(true, |s| st.subject == *s)
                && predicate.map_or(true, |p| st.predicate == *p)
                && object.map_or(true, |o| st.object == *o)
                && graph.map_or(true, |g| g.matches(&st.graph))
        })
    }

    /// Objects of every `(subject, predicate, ?)` statement, any context.
    pub fn objects_of<'a>(
        &'a self,
        subject: &'a Resource,
        predicate: &'a Iri,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(Some(subject), Some(predicate), None, None)
            .map(|st| &st.object)
    }

    /// Subjects of every `(?, predicate, object)` statement, any context.
    pub fn subjects_with<'a>(
        &'a self,
        predicate: &'a Iri,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.matching(None, Some(predicate), Some(object), None)
            .map(|st| &st.subject)
    }

    /// View of the statements belonging to one context.
    pub fn graph_statements<'a>(
        &'a self,
        context: &'a GraphId,
    ) -> impl Iterator<Item = &'a Statement> + 'a {
        self.statements
            .iter()
            .filter(move |st| context.matches(&st.graph))
    }

    /// Every IRI appearing as a subject or object within `context`.
    /// Predicates are edge labels, not nodes; literals and blank labels are
    /// not IRIs.
    pub fn iri_nodes_in(&self, context: &GraphId) -> BTreeSet<Iri> {
        let mut nodes = BTreeSet::new();
        for st in self.graph_statements(context) {
            if let Some(iri) = st.subject.as_iri() {
                nodes.insert(iri.clone());
            }
            if let Some(iri) = st.object.as_iri() {
                nodes.insert(iri.clone());
            }
        }
        nodes
    }

    /// Drops every statement belonging to `context`.
    pub fn remove_graph(&mut self, context: &GraphId) {
        self.statements.retain(|st| !context.matches(&st.graph));
        self.seen.retain(|st| !context.matches(&st.graph));
    }
}

impl From<Vec<Statement>> for StatementSet {
    fn from(statements: Vec<Statement>) -> Self {
        let mut set = Self::new();
        set.extend(statements);
        set
    }
}

impl From<StatementSet> for Vec<Statement> {
    fn from(set: StatementSet) -> Self {
        set.statements
    }
}

impl FromIterator<Statement> for StatementSet {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
