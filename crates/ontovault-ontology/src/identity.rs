//! Versioned ontology identity and its statement codec.
//!
//! Every artifact ontology is identified by a base IRI plus a version IRI,
//! optionally accompanied by the companion ontology that holds the axioms an
//! external reasoner derived for that exact version. The codec converts
//! identities to and from RDF statements so they survive upload, retrieval
//! and edit round trips.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ontovault_rdf::codec::{parse_statements, serialize_statements, RdfError, RdfFormat};
use ontovault_rdf::statements::StatementSet;
use ontovault_rdf::term::{Iri, Resource, Statement, Term};
use ontovault_rdf::vocab;

/// Identity of one ontology version.
///
/// Immutable once constructed. A fresh inferred companion is generated per
/// base-version and never versioned itself, so the companion can always be
/// regenerated from `(base, version)` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyIdentity {
    base_iri: Iri,
    version_iri: Option<Iri>,
    inferred_iri: Option<Iri>,
}

impl OntologyIdentity {
    /// Identity of an ontology no version has been minted for yet.
    pub fn unversioned(base_iri: Iri) -> Self {
        Self {
            base_iri,
            version_iri: None,
            inferred_iri: None,
        }
    }

    pub fn versioned(base_iri: Iri, version_iri: Iri) -> Self {
        Self {
            base_iri,
            version_iri: Some(version_iri),
            inferred_iri: None,
        }
    }

    pub fn with_inferred(base_iri: Iri, version_iri: Iri, inferred_iri: Iri) -> Self {
        Self {
            base_iri,
            version_iri: Some(version_iri),
            inferred_iri: Some(inferred_iri),
        }
    }

    pub fn base_iri(&self) -> &Iri {
        &self.base_iri
    }

    pub fn version_iri(&self) -> Option<&Iri> {
        self.version_iri.as_ref()
    }

    pub fn inferred_iri(&self) -> Option<&Iri> {
        self.inferred_iri.as_ref()
    }

    /// Emit the statements describing this identity.
    ///
    /// An identity without a version cannot be round-tripped; asking for its
    /// statements is a precondition violation, not a data problem.
    pub fn to_statements(&self) -> Result<Vec<Statement>, IdentityError> {
        let version = self.version_iri.as_ref().ok_or(IdentityError::Incomplete)?;

        let mut out = vec![
            Statement::link(&self.base_iri, vocab::RDF_TYPE, &Iri::new(vocab::OWL_ONTOLOGY)),
            Statement::link(version, vocab::RDF_TYPE, &Iri::new(vocab::OWL_ONTOLOGY)),
            Statement::link(&self.base_iri, vocab::OWL_VERSION_IRI, version),
        ];
        if let Some(inferred) = &self.inferred_iri {
            out.push(Statement::link(
                inferred,
                vocab::RDF_TYPE,
                &Iri::new(vocab::OWL_ONTOLOGY),
            ));
            out.push(Statement::link(version, vocab::INFERRED_VERSION, inferred));
        }
        Ok(out)
    }

    /// Serialize the identity statements to text.
    pub fn to_serialized(&self, format: RdfFormat) -> Result<String, IdentityError> {
        let set: StatementSet = self.to_statements()?.into_iter().collect();
        Ok(serialize_statements(&set, format)?)
    }
}

// Identity is (base, version). The inferred companion is informational: a
// reconstructed identity must stay interchangeable with the plain
// (base, version) pair used elsewhere in the system, whether or not the
// companion was recoverable.
impl PartialEq for OntologyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.base_iri == other.base_iri && self.version_iri == other.version_iri
    }
}

impl Eq for OntologyIdentity {}

impl Hash for OntologyIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_iri.hash(state);
        self.version_iri.hash(state);
    }
}

/// Errors from the identity codec.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The identity has no version IRI; unversioned identities cannot be
    /// serialized.
    #[error("ontology identity has no version IRI and cannot be serialized")]
    Incomplete,
    #[error(transparent)]
    Rdf(#[from] RdfError),
}

/// Recover every identity described by a statement set.
///
/// A subject counts when it is typed `owl:Ontology` and carries an
/// `owl:versionIRI`. The inferred companion is resolved per version, in
/// order of preference:
///
/// 1. dedicated `inferredVersion` statements, one identity per statement
///    (a version may have been linked to several companions over time);
/// 2. otherwise [`inferred_candidates_from_importers`];
/// 3. otherwise a single identity with no companion.
///
/// Blank-node subjects and non-IRI objects are skipped with a diagnostic;
/// malformed data degrades to fewer recovered identities, never an error.
pub fn identities_from_statements(statements: &StatementSet) -> Vec<OntologyIdentity> {
    let rdf_type = Iri::new(vocab::RDF_TYPE);
    let owl_ontology = Term::iri(vocab::OWL_ONTOLOGY);
    let version_pred = Iri::new(vocab::OWL_VERSION_IRI);
    let inferred_pred = Iri::new(vocab::INFERRED_VERSION);

    let mut out = Vec::new();
    let mut seen_bases: BTreeSet<Iri> = BTreeSet::new();

    for typed in statements.matching(None, Some(&rdf_type), Some(&owl_ontology), None) {
        let base = match typed.subject.as_iri() {
            Some(iri) => iri,
            None => {
                tracing::debug!(subject = ?typed.subject, "skipping blank ontology subject");
                continue;
            }
        };
        if !seen_bases.insert(base.clone()) {
            continue;
        }

        for versioned in statements.matching(Some(&typed.subject), Some(&version_pred), None, None)
        {
            let version = match versioned.object.as_iri() {
                Some(iri) => iri,
                None => {
                    tracing::debug!(base = %base, "skipping non-IRI versionIRI object");
                    continue;
                }
            };

            let version_subject = Resource::Iri(version.clone());
            let dedicated: Vec<&Iri> = statements
                .matching(Some(&version_subject), Some(&inferred_pred), None, None)
                .filter_map(|st| st.object.as_iri())
                .collect();

            if !dedicated.is_empty() {
                for inferred in dedicated {
                    out.push(OntologyIdentity::with_inferred(
                        base.clone(),
                        version.clone(),
                        inferred.clone(),
                    ));
                }
                continue;
            }

            let fallback = inferred_candidates_from_importers(statements, version);
            if fallback.is_empty() {
                out.push(OntologyIdentity::versioned(base.clone(), version.clone()));
            } else {
                for candidate in fallback {
                    out.push(OntologyIdentity::with_inferred(
                        base.clone(),
                        version.clone(),
                        candidate,
                    ));
                }
            }
        }
    }
    out
}

/// Fallback resolution of the inferred companion for a version.
///
/// Artifacts written before the dedicated `inferredVersion` predicate existed
/// recorded the companion only as an `owl:imports` edge pointing at the
/// version. Any other ontology that legitimately imports the version matches
/// this pattern too, so candidates from this path are heuristic. It runs only
/// when zero dedicated statements exist; dedicated statements always win
/// outright.
pub fn inferred_candidates_from_importers(statements: &StatementSet, version: &Iri) -> Vec<Iri> {
    let imports_pred = Iri::new(vocab::OWL_IMPORTS);
    let version_term = Term::Resource(Resource::Iri(version.clone()));

    let mut candidates = Vec::new();
    for importer in statements.subjects_with(&imports_pred, &version_term) {
        match importer.as_iri() {
            Some(iri) => {
                tracing::debug!(
                    version = %version,
                    importer = %iri,
                    "resolved inferred companion from importer fallback"
                );
                candidates.push(iri.clone());
            }
            None => tracing::debug!(importer = ?importer, "skipping blank importer"),
        }
    }
    candidates
}

/// Parse text and recover identities from the result.
///
/// Parse failures are a distinct error from "parsed fine, found nothing"
/// (which is `Ok(vec![])`).
pub fn identities_from_str(
    text: &str,
    format: RdfFormat,
) -> Result<Vec<OntologyIdentity>, IdentityError> {
    let set: StatementSet = parse_statements(text.as_bytes(), format)?
        .into_iter()
        .collect();
    Ok(identities_from_statements(&set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn iri(text: &str) -> Iri {
        Iri::new(text)
    }

    fn base() -> Iri {
        iri("http://example.org/onto")
    }

    fn version() -> Iri {
        iri("http://example.org/onto/v3")
    }

    fn inferred() -> Iri {
        iri("http://example.org/onto/v3/inferred")
    }

    #[test]
    fn equality_and_hashing_ignore_the_inferred_companion() {
        let plain = OntologyIdentity::versioned(base(), version());
        let with_inferred = OntologyIdentity::with_inferred(base(), version(), inferred());
        assert_eq!(plain, with_inferred);

        let mut set = HashSet::new();
        set.insert(plain);
        assert!(set.contains(&with_inferred));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn identities_differing_in_version_are_distinct() {
        let v3 = OntologyIdentity::versioned(base(), version());
        let v4 = OntologyIdentity::versioned(base(), iri("http://example.org/onto/v4"));
        assert_ne!(v3, v4);
    }

    #[test]
    fn unversioned_identity_cannot_be_serialized() {
        let id = OntologyIdentity::unversioned(base());
        assert!(matches!(
            id.to_statements(),
            Err(IdentityError::Incomplete)
        ));
    }

    #[test]
    fn versioned_identity_emits_the_three_core_statements() {
        let id = OntologyIdentity::versioned(base(), version());
        let statements = id.to_statements().expect("versioned");
        assert_eq!(statements.len(), 3);
        assert!(statements
            .iter()
            .any(|st| st.predicate.as_str() == vocab::OWL_VERSION_IRI));
    }

    #[test]
    fn inferred_companion_adds_type_and_link_statements() {
        let id = OntologyIdentity::with_inferred(base(), version(), inferred());
        let statements = id.to_statements().expect("versioned");
        assert_eq!(statements.len(), 5);
        assert!(statements.iter().any(|st| {
            st.predicate.as_str() == vocab::INFERRED_VERSION
                && st.object.as_iri() == Some(&inferred())
        }));
    }

    #[test]
    fn round_trip_without_companion() {
        let id = OntologyIdentity::versioned(base(), version());
        let set: StatementSet = id.to_statements().expect("versioned").into_iter().collect();
        let recovered = identities_from_statements(&set);
        assert_eq!(recovered, vec![id]);
        assert_eq!(recovered[0].inferred_iri(), None);
    }

    #[test]
    fn round_trip_recovers_the_dedicated_companion() {
        let id = OntologyIdentity::with_inferred(base(), version(), inferred());
        let set: StatementSet = id.to_statements().expect("versioned").into_iter().collect();
        let recovered = identities_from_statements(&set);
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].inferred_iri(), Some(&inferred()));
    }

    #[test]
    fn importer_fallback_resolves_the_companion() {
        let mut set: StatementSet = OntologyIdentity::versioned(base(), version())
            .to_statements()
            .expect("versioned")
            .into_iter()
            .collect();
        set.insert(Statement::link(&inferred(), vocab::OWL_IMPORTS, &version()));

        let recovered = identities_from_statements(&set);
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].inferred_iri(), Some(&inferred()));
    }

    #[test]
    fn dedicated_companion_wins_over_the_importer_fallback() {
        let other = iri("http://example.org/unrelated");
        let mut set: StatementSet =
            OntologyIdentity::with_inferred(base(), version(), inferred())
                .to_statements()
                .expect("versioned")
                .into_iter()
                .collect();
        // An unrelated ontology importing the version must not displace the
        // dedicated link.
        set.insert(Statement::link(&other, vocab::OWL_IMPORTS, &version()));

        let recovered = identities_from_statements(&set);
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].inferred_iri(), Some(&inferred()));
    }

    #[test]
    fn multiple_dedicated_links_yield_one_identity_each() {
        let second = iri("http://example.org/onto/v3/inferred-2");
        let mut set: StatementSet =
            OntologyIdentity::with_inferred(base(), version(), inferred())
                .to_statements()
                .expect("versioned")
                .into_iter()
                .collect();
        set.insert(Statement::link(&version(), vocab::INFERRED_VERSION, &second));

        let recovered = identities_from_statements(&set);
        let companions: Vec<_> = recovered
            .iter()
            .filter_map(|id| id.inferred_iri())
            .collect();
        assert_eq!(recovered.len(), 2);
        assert!(companions.contains(&&inferred()));
        assert!(companions.contains(&&second));
    }

    #[test]
    fn ontology_without_version_is_not_an_identity() {
        let mut set = StatementSet::new();
        set.insert(Statement::link(
            &base(),
            vocab::RDF_TYPE,
            &iri(vocab::OWL_ONTOLOGY),
        ));
        assert!(identities_from_statements(&set).is_empty());
    }

    #[test]
    fn blank_subjects_degrade_gracefully() {
        let mut set = StatementSet::new();
        set.insert(Statement::new(
            Resource::Blank("b0".into()),
            iri(vocab::RDF_TYPE),
            Term::iri(vocab::OWL_ONTOLOGY),
        ));
        set.insert(Statement::new(
            Resource::Blank("b0".into()),
            iri(vocab::OWL_VERSION_IRI),
            Term::iri("http://example.org/v"),
        ));
        assert!(identities_from_statements(&set).is_empty());
    }

    #[test]
    fn string_round_trip_through_ntriples() {
        let id = OntologyIdentity::with_inferred(base(), version(), inferred());
        let text = id.to_serialized(RdfFormat::NTriples).expect("serialize");
        let recovered = identities_from_str(&text, RdfFormat::NTriples).expect("parse");
        assert_eq!(recovered, vec![id]);
        assert_eq!(recovered[0].inferred_iri(), Some(&inferred()));
    }

    #[test]
    fn malformed_text_is_an_error_not_an_empty_result() {
        let err = identities_from_str("@@@ not rdf", RdfFormat::Turtle).expect_err("malformed");
        assert!(matches!(err, IdentityError::Rdf(_)));
        assert!(identities_from_str("", RdfFormat::NTriples)
            .expect("empty input parses")
            .is_empty());
    }
}
