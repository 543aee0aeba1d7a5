// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # cacm-kg
//!
//! Knowledge-graph access layer for credit-analysis agent workflows: an
//! in-memory RDF graph that loads Turtle documents, answers SPARQL SELECT/ASK
//! queries, accepts new triples, and persists itself back to Turtle.
//!
//! ## Architecture
//!
//! - **Data model** (`graph`): crate-owned RDF terms, triples, and binding rows,
//!   serde-serializable so query results can flow to workflow steps as JSON
//! - **Store** (`graph::store`): oxigraph-backed [`KnowledgeBase`] implementing
//!   load / query / ingest / persist with explicit replace-vs-merge semantics
//! - **Vocabulary** (`vocab`): credit-ontology namespaces and well-known terms
//! - **Errors** (`error`): one diagnostic enum per operation family
//!
//! ## Library usage
//!
//! ```no_run
//! use cacm_kg::graph::store::KnowledgeBase;
//! use cacm_kg::graph::Triple;
//! use cacm_kg::vocab;
//!
//! let kb = KnowledgeBase::new().unwrap();
//! kb.load_replace("data/credit_ontology.ttl").unwrap();
//! let rows = kb
//!     .select(
//!         "PREFIX kgclass: <https://cacm-kg.dev/class#> \
//!          PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> \
//!          SELECT ?label WHERE { ?f a kgclass:FinancialFormula ; rdfs:label ?label }",
//!     )
//!     .unwrap();
//! kb.add_triples(&[Triple::new(
//!     vocab::kb("FF_010"),
//!     vocab::rdfs_label(),
//!     cacm_kg::graph::Term::literal("Interest Coverage Ratio"),
//! )])
//! .unwrap();
//! ```
//!
//! [`KnowledgeBase`]: graph::store::KnowledgeBase

pub mod error;
pub mod graph;
pub mod vocab;
