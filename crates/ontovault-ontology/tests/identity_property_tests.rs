use ontovault_ontology::identity::{identities_from_statements, OntologyIdentity};
use ontovault_rdf::statements::StatementSet;
use ontovault_rdf::term::{Iri, Statement};
use ontovault_rdf::vocab;
use proptest::prelude::*;

const MAX_IDENTITIES: usize = 6;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

/// Distinct-by-construction (base, version, inferred) triples: the version
/// extends the base and the companion extends the version.
fn identity_strategy() -> impl Strategy<Value = (Iri, Iri, Iri)> {
    (segment(), 1u32..100).prop_map(|(name, rev)| {
        let base = format!("http://example.org/ontology/{name}");
        let version = format!("{base}/v{rev}");
        let inferred = format!("{version}/inferred");
        (Iri::new(base), Iri::new(version), Iri::new(inferred))
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn versioned_identities_round_trip((base, version, _inferred) in identity_strategy()) {
        let id = OntologyIdentity::versioned(base, version);
        let set: StatementSet = id.to_statements().expect("versioned").into_iter().collect();
        let recovered = identities_from_statements(&set);
        prop_assert_eq!(recovered.len(), 1);
        prop_assert_eq!(&recovered[0], &id);
        prop_assert_eq!(recovered[0].inferred_iri(), None);
    }

    #[test]
    fn dedicated_companions_survive_the_round_trip((base, version, inferred) in identity_strategy()) {
        let id = OntologyIdentity::with_inferred(base, version, inferred.clone());
        let set: StatementSet = id.to_statements().expect("versioned").into_iter().collect();
        let recovered = identities_from_statements(&set);
        prop_assert_eq!(recovered.len(), 1);
        prop_assert_eq!(recovered[0].inferred_iri(), Some(&inferred));
    }

    #[test]
    fn importer_fallback_recovers_the_companion((base, version, inferred) in identity_strategy()) {
        // Old-style linkage: no dedicated statement, only an import edge from
        // the companion to the version.
        let id = OntologyIdentity::versioned(base, version.clone());
        let mut set: StatementSet = id.to_statements().expect("versioned").into_iter().collect();
        set.insert(Statement::link(&inferred, vocab::OWL_IMPORTS, &version));

        let recovered = identities_from_statements(&set);
        prop_assert_eq!(recovered.len(), 1);
        prop_assert_eq!(recovered[0].inferred_iri(), Some(&inferred));
    }

    #[test]
    fn many_identities_in_one_set_are_all_recovered(
        triples in proptest::collection::btree_set(identity_strategy(), 1..MAX_IDENTITIES)
    ) {
        let identities: Vec<OntologyIdentity> = triples
            .into_iter()
            .map(|(base, version, inferred)| OntologyIdentity::with_inferred(base, version, inferred))
            .collect();

        let mut set = StatementSet::new();
        for id in &identities {
            set.extend(id.to_statements().expect("versioned"));
        }

        let recovered = identities_from_statements(&set);
        for id in &identities {
            prop_assert!(recovered.contains(id), "missing {:?}", id);
        }
    }
}
