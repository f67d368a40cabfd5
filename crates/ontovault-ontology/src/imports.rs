//! Import-dependency ordering over ontology schemas.
//!
//! Schemas must be materialized imported-before-importer. The orderer
//! consumes an [`ImportMap`] snapshot built by the schema loader and produces
//! a deterministic total order; mutual imports have no defined order and fail
//! the whole sort.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use ontovault_rdf::statements::StatementSet;
use ontovault_rdf::term::Iri;
use ontovault_rdf::vocab;

/// Ontology IRI -> the set of ontology IRIs it imports.
///
/// Whether the sets are direct imports or the transitive closure is the
/// caller's choice; see [`sort_by_imports`] for why it matters.
pub type ImportMap = BTreeMap<Iri, BTreeSet<Iri>>;

/// A mutual import between two ontologies.
///
/// Ordering is undefined under a cycle and must not be guessed; the sort is
/// aborted and the pair surfaced so the schema data can be corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cyclic import between `{first}` and `{second}`")]
pub struct CyclicImport {
    pub first: Iri,
    pub second: Iri,
}

/// Compare two ontologies for load order.
///
/// 1. `a == b` is `Equal`.
/// 2. A mutual import is a [`CyclicImport`] failure.
/// 3. An importer sorts after what it imports.
/// 4. Unrelated ontologies order by import count, fewer imports first, since
///    shallow ontologies are likely ancestors.
/// 5. Equal counts order by the number of imports not shared with the other
///    side, fewer first.
/// 6. Remaining ties break lexically on the IRI, for determinism.
///
/// Steps 4–5 are heuristic; they only produce a guaranteed topological order
/// when `map` carries each ontology's full transitive closure.
pub fn compare_imports(a: &Iri, b: &Iri, map: &ImportMap) -> Result<Ordering, CyclicImport> {
    if a == b {
        return Ok(Ordering::Equal);
    }

    let empty = BTreeSet::new();
    let imports_a = map.get(a).unwrap_or(&empty);
    let imports_b = map.get(b).unwrap_or(&empty);

    match (imports_a.contains(b), imports_b.contains(a)) {
        (true, true) => Err(CyclicImport {
            first: a.clone(),
            second: b.clone(),
        }),
        (true, false) => Ok(Ordering::Greater),
        (false, true) => Ok(Ordering::Less),
        (false, false) => {
            let by_count = imports_a.len().cmp(&imports_b.len());
            if by_count != Ordering::Equal {
                return Ok(by_count);
            }
            let unshared_a = imports_a.difference(imports_b).count();
            let unshared_b = imports_b.difference(imports_a).count();
            let by_unshared = unshared_a.cmp(&unshared_b);
            if by_unshared != Ordering::Equal {
                return Ok(by_unshared);
            }
            Ok(a.as_str().cmp(b.as_str()))
        }
    }
}

/// Sort ontologies into load order.
///
/// Precondition: `map` should carry each candidate's **full transitive**
/// import closure. A direct-imports-only map still sorts deterministically,
/// but the result is only a plausible order, not a guaranteed topological
/// one. Use [`transitive_closure`] first when in doubt.
///
/// Any mutual import among the candidates aborts the whole sort; a partial
/// order over cyclic data would silently load schemas in a wrong order.
pub fn sort_by_imports(mut iris: Vec<Iri>, map: &ImportMap) -> Result<Vec<Iri>, CyclicImport> {
    let empty = BTreeSet::new();
    for (i, a) in iris.iter().enumerate() {
        let imports_a = map.get(a).unwrap_or(&empty);
        for b in &iris[i + 1..] {
            if imports_a.contains(b) && map.get(b).unwrap_or(&empty).contains(a) {
                return Err(CyclicImport {
                    first: a.clone(),
                    second: b.clone(),
                });
            }
        }
    }

    // Mutual imports were rejected above, so the comparator cannot fail here.
    iris.sort_by(|a, b| compare_imports(a, b, map).unwrap_or(Ordering::Equal));
    Ok(iris)
}

/// Expand a direct-imports map to its transitive closure.
///
/// Establishes the precondition of [`sort_by_imports`]. Closure is plain
/// reachability: mutual cycles are carried through untouched (detection is
/// the sort's job) and self-imports are never introduced.
pub fn transitive_closure(direct: &ImportMap) -> ImportMap {
    let mut closed = direct.clone();
    loop {
        let mut additions: Vec<(Iri, Vec<Iri>)> = Vec::new();
        for (ontology, imports) in &closed {
            let mut indirect = Vec::new();
            for import in imports {
                if let Some(theirs) = closed.get(import) {
                    for transitive in theirs {
                        if transitive != ontology && !imports.contains(transitive) {
                            indirect.push(transitive.clone());
                        }
                    }
                }
            }
            if !indirect.is_empty() {
                additions.push((ontology.clone(), indirect));
            }
        }
        if additions.is_empty() {
            return closed;
        }
        for (ontology, indirect) in additions {
            closed.entry(ontology).or_default().extend(indirect);
        }
    }
}

/// Build a direct-imports map from `owl:imports` statements.
///
/// Every ontology-typed subject gets an entry even when it imports nothing,
/// so importless schemas still participate in the sort.
pub fn direct_imports_from_statements(statements: &StatementSet) -> ImportMap {
    use ontovault_rdf::term::Term;

    let rdf_type = Iri::new(vocab::RDF_TYPE);
    let owl_ontology = Term::iri(vocab::OWL_ONTOLOGY);
    let imports_pred = Iri::new(vocab::OWL_IMPORTS);

    let mut map = ImportMap::new();
    for typed in statements.matching(None, Some(&rdf_type), Some(&owl_ontology), None) {
        if let Some(subject) = typed.subject.as_iri() {
            map.entry(subject.clone()).or_default();
        }
    }
    for st in statements.matching(None, Some(&imports_pred), None, None) {
        let (Some(subject), Some(object)) = (st.subject.as_iri(), st.object.as_iri()) else {
            tracing::debug!(statement = ?st, "skipping non-IRI owl:imports statement");
            continue;
        };
        map.entry(subject.clone()).or_default().insert(object.clone());
    }
    map
}
