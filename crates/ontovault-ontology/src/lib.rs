//! Ontology identity, import ordering and connectivity validation.
//!
//! The three algorithms every Ontovault operation leans on for correctness:
//!
//! 1. **Identity** ([`identity`]): the `(base, version, inferred)` identity
//!    of an ontology and its lossless statement codec.
//! 2. **Import ordering** ([`imports`]): a deterministic, cycle-refusing
//!    total order over schemas, imported-before-importer.
//! 3. **Connectivity** ([`connectivity`]): the single-root reachability gate
//!    artifact graphs must pass before an upload or edit is committed.
//!
//! Everything is a stateless function over [`ontovault_rdf`] statement sets;
//! callers hand in the data and keep ownership of it. The components are
//! independently usable and safe to run concurrently over independent sets.

pub mod connectivity;
pub mod identity;
pub mod imports;

pub use connectivity::{
    find_disconnected_nodes, is_connected_payload, is_connected_structure, validate_structure,
    StructureError,
};
pub use identity::{
    identities_from_statements, identities_from_str, inferred_candidates_from_importers,
    IdentityError, OntologyIdentity,
};
pub use imports::{
    compare_imports, direct_imports_from_statements, sort_by_imports, transitive_closure,
    CyclicImport, ImportMap,
};
