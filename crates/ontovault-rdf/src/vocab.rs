//! Fixed predicate and class vocabulary.
//!
//! The named-graph conventions and predicate IRIs used by persisted artifacts
//! are an already-agreed contract with the storage layer; they are collected
//! here so no other module spells out a raw IRI.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
pub const OWL_VERSION_IRI: &str = "http://www.w3.org/2002/07/owl#versionIRI";
pub const OWL_IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";
pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
/// Legacy spelling found in artifacts written before `owl:NamedIndividual`
/// was adopted; still honored when excluding schema-level resources.
pub const OWL_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#Individual";

/// Ontovault predicate namespace.
pub const ONTOVAULT_NS: &str = "http://ontovault.org/ns#";
/// Links an ontology version to the companion ontology holding its
/// reasoner-derived axioms.
pub const INFERRED_VERSION: &str = "http://ontovault.org/ns#inferredVersion";
/// Links an artifact to the single root resource of its graph.
pub const HAS_TOP_OBJECT: &str = "http://ontovault.org/ns#hasTopObject";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ontovault_predicates_live_in_the_project_namespace() {
        assert!(INFERRED_VERSION.starts_with(ONTOVAULT_NS));
        assert!(HAS_TOP_OBJECT.starts_with(ONTOVAULT_NS));
    }
}
