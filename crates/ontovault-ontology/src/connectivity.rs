//! Structural connectivity validation of artifact graphs.
//!
//! An artifact graph is well-formed when every resource it mentions is
//! reachable from its single declared top object. Upload and edit handlers
//! run this gate before committing a graph; a disconnected resource is a
//! data-quality problem the submitter has to fix, never something to repair
//! silently.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use thiserror::Error;

use ontovault_rdf::codec::RdfFormat;
use ontovault_rdf::statements::StatementSet;
use ontovault_rdf::store::MemoryStore;
use ontovault_rdf::term::{GraphId, Iri, Resource, Term};
use ontovault_rdf::vocab;

/// Synthetic context payload checks load into; never persisted.
const PAYLOAD_CONTEXT: &str = "urn:ontovault:payload-check";

/// A structurally invalid artifact graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// Zero or several top-object declarations; with no unambiguous root
    /// there is nothing to check reachability from.
    #[error("expected exactly one top object declaration, found {count}")]
    AmbiguousTopObject { count: usize },
    /// Resources unreachable from the declared top object.
    #[error("{} resource(s) unreachable from the top object", nodes.len())]
    Disconnected { nodes: BTreeSet<Iri> },
}

/// Collect every resource in `context` that is not reachable from `root`.
///
/// Candidates are the IRI-valued statement endpoints; literals are never
/// nodes, and blank nodes are traversed (a chain through a blank node keeps
/// its IRI targets connected) but not reported, since an anonymous placeholder
/// is nothing a submitter could fix by name. The walk follows subject-to-object
/// edges breadth-first and returns early the moment every candidate has been
/// accounted for: artifact graphs are large and usually fully connected, so
/// finishing the walk would be wasted work.
///
/// `root` itself and the schema-level OWL resources (`owl:Thing`,
/// `owl:Ontology`, `owl:Individual`, `owl:NamedIndividual`) are exempt: they
/// appear in most artifacts without being part of the artifact's own
/// structure.
pub fn find_disconnected_nodes(
    root: &Iri,
    statements: &StatementSet,
    context: &GraphId,
) -> BTreeSet<Iri> {
    let excluded = [
        root.as_str(),
        vocab::OWL_THING,
        vocab::OWL_ONTOLOGY,
        vocab::OWL_INDIVIDUAL,
        vocab::OWL_NAMED_INDIVIDUAL,
    ];

    let mut edges: HashMap<&Resource, Vec<&Resource>> = HashMap::new();
    let mut nodes_to_check: BTreeSet<Iri> = BTreeSet::new();
    for st in statements.graph_statements(context) {
        if let Some(subject) = st.subject.as_iri() {
            if !excluded.contains(&subject.as_str()) {
                nodes_to_check.insert(subject.clone());
            }
        }
        if let Term::Resource(object) = &st.object {
            if let Some(object) = object.as_iri() {
                if !excluded.contains(&object.as_str()) {
                    nodes_to_check.insert(object.clone());
                }
            }
            edges.entry(&st.subject).or_default().push(object);
        }
    }
    if nodes_to_check.is_empty() {
        return nodes_to_check;
    }

    let start = Resource::Iri(root.clone());
    let mut visited: HashSet<&Resource> = HashSet::new();
    let mut queue: VecDeque<&Resource> = VecDeque::new();
    visited.insert(&start);
    queue.push_back(&start);

    while let Some(node) = queue.pop_front() {
        for &next in edges.get(node).into_iter().flatten() {
            if visited.insert(next) {
                if let Some(reached) = next.as_iri() {
                    nodes_to_check.remove(reached);
                    if nodes_to_check.is_empty() {
                        return nodes_to_check;
                    }
                }
                queue.push_back(next);
            }
        }
    }
    nodes_to_check
}

/// Validate that `context` holds a single-rooted, fully connected artifact.
///
/// The root is the object of the one `hasTopObject` statement in the
/// context. Zero or several such statements are [`StructureError::AmbiguousTopObject`];
/// unreachable resources are [`StructureError::Disconnected`] with the
/// offending IRIs.
pub fn validate_structure(
    statements: &StatementSet,
    context: &GraphId,
) -> Result<(), StructureError> {
    let top_pred = Iri::new(vocab::HAS_TOP_OBJECT);
    let roots: Vec<&Iri> = statements
        .matching(None, Some(&top_pred), None, Some(context))
        .filter_map(|st| st.object.as_iri())
        .collect();

    let root = match roots.as_slice() {
        [root] => (*root).clone(),
        _ => {
            tracing::warn!(
                count = roots.len(),
                "artifact graph must declare exactly one top object"
            );
            return Err(StructureError::AmbiguousTopObject { count: roots.len() });
        }
    };

    let nodes = find_disconnected_nodes(&root, statements, context);
    if nodes.is_empty() {
        Ok(())
    } else {
        tracing::warn!(
            root = %root,
            count = nodes.len(),
            "artifact graph has resources unreachable from the top object"
        );
        Err(StructureError::Disconnected { nodes })
    }
}

/// Boolean gate over [`validate_structure`], for callers that only accept or
/// reject. Callers needing to report *why* should use `validate_structure`;
/// `false` alone cannot distinguish a missing root from a disconnected graph.
pub fn is_connected_structure(statements: &StatementSet, context: &GraphId) -> bool {
    validate_structure(statements, context).is_ok()
}

/// Connectivity gate over a raw payload.
///
/// Loads the payload into a throwaway in-memory store under a synthetic
/// context, checks it, and guarantees the store is torn down on every exit
/// path. An unparsable payload is rejected (`false`) rather than surfaced as
/// an error: at this boundary the only question is whether the upload may
/// proceed.
pub fn is_connected_payload(bytes: &[u8], format: RdfFormat) -> bool {
    let mut store = MemoryStore::new();
    store.scoped(|txn| {
        let context = Iri::new(PAYLOAD_CONTEXT);
        match txn.load(bytes, format, Some(&context)) {
            Ok(_) => is_connected_structure(txn.statements(), &GraphId::Named(context)),
            Err(err) => {
                tracing::warn!(%err, "rejecting unparsable artifact payload");
                false
            }
        }
    })
}
