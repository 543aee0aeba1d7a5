//! IRI vocabulary for the credit-analysis knowledge graph.
//!
//! Callers author triples against two namespaces: `kb:` for individuals
//! (formulas, metrics, companies) and `kgclass:` for ontology classes.
//! Standard RDF/RDFS/XSD vocabularies are re-exported from oxigraph so
//! datatype IRIs don't get retyped by hand.

use crate::graph::Term;

pub use oxigraph::model::vocab::{rdf, rdfs, xsd};

/// Namespace for knowledge-base individuals (`kb:`).
pub const KB_NS: &str = "https://cacm-kg.dev/kb#";

/// Namespace for ontology classes (`kgclass:`).
pub const KGCLASS_NS: &str = "https://cacm-kg.dev/class#";

/// An individual in the `kb:` namespace, e.g. `kb("FF_001")`.
pub fn kb(local: &str) -> Term {
    Term::iri(format!("{KB_NS}{local}"))
}

/// A class in the `kgclass:` namespace, e.g. `kgclass("FinancialFormula")`.
pub fn kgclass(local: &str) -> Term {
    Term::iri(format!("{KGCLASS_NS}{local}"))
}

/// `rdf:type` as a predicate term.
pub fn rdf_type() -> Term {
    Term::iri(rdf::TYPE.as_str())
}

/// `rdfs:label` as a predicate term.
pub fn rdfs_label() -> Term {
    Term::iri(rdfs::LABEL.as_str())
}
