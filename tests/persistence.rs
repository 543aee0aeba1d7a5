//! Persistence tests for the knowledge-graph access layer.
//!
//! These tests verify that a persisted graph survives a full
//! persist + reload cycle (two-session style) as an equivalent triple set,
//! and that persistence failures surface as structured errors.

use std::collections::HashSet;

use cacm_kg::error::PersistError;
use cacm_kg::graph::store::KnowledgeBase;
use cacm_kg::graph::{Term, Triple};
use cacm_kg::vocab;

fn seed_kb() -> KnowledgeBase {
    let kb = KnowledgeBase::new().unwrap();
    kb.add_triples(&[
        Triple::new(
            vocab::kb("FF_001"),
            vocab::rdf_type(),
            vocab::kgclass("FinancialFormula"),
        ),
        Triple::new(
            vocab::kb("FF_001"),
            vocab::rdfs_label(),
            Term::literal("Debt-to-Equity Ratio"),
        ),
        Triple::new(
            vocab::kb("FF_001"),
            vocab::kb("threshold"),
            Term::typed_literal("0.8", vocab::xsd::DECIMAL.as_str()),
        ),
        Triple::new(
            vocab::kb("FF_001"),
            vocab::rdfs_label(),
            Term::lang_literal("Verschuldungsgrad", "de"),
        ),
    ])
    .unwrap();
    kb
}

fn triple_set(kb: &KnowledgeBase) -> HashSet<Triple> {
    kb.all_triples().unwrap().into_iter().collect()
}

#[test]
fn persist_then_reload_reproduces_triple_set() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kb.ttl");

    // First session: build and persist.
    let before = {
        let kb = seed_kb();
        kb.persist(&path).unwrap();
        triple_set(&kb)
    };

    // Second session: reload and compare as sets (order-independent).
    let kb = KnowledgeBase::new().unwrap();
    let loaded = kb.load_replace(&path).unwrap();
    assert_eq!(loaded, before.len());
    assert_eq!(triple_set(&kb), before);
}

#[test]
fn persist_overwrites_existing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kb.ttl");

    let kb = seed_kb();
    kb.persist(&path).unwrap();

    // Shrink the graph, persist again: the file must reflect only the
    // current graph, not the union with its previous content.
    kb.clear().unwrap();
    kb.add_triples(&[Triple::new(
        vocab::kb("FF_002"),
        vocab::rdfs_label(),
        Term::literal("Current Ratio"),
    )])
    .unwrap();
    kb.persist(&path).unwrap();

    let reloaded = KnowledgeBase::new().unwrap();
    assert_eq!(reloaded.load_replace(&path).unwrap(), 1);
    assert_eq!(triple_set(&reloaded), triple_set(&kb));
}

#[test]
fn persist_empty_graph_roundtrips_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("empty.ttl");

    let kb = KnowledgeBase::new().unwrap();
    kb.persist(&path).unwrap();

    let reloaded = KnowledgeBase::new().unwrap();
    assert_eq!(reloaded.load_replace(&path).unwrap(), 0);
    assert!(reloaded.is_empty().unwrap());
}

#[test]
fn persist_into_missing_directory_is_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("no/such/dir/kb.ttl");

    let kb = seed_kb();
    let err = kb.persist(&path).unwrap_err();
    assert!(matches!(err, PersistError::Io { .. }));
}

#[test]
fn merge_after_reload_stays_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kb.ttl");

    let kb = seed_kb();
    kb.persist(&path).unwrap();

    // Merging a file the graph was just persisted from adds nothing.
    assert_eq!(kb.load_merge(&path).unwrap(), 0);
    assert_eq!(kb.len().unwrap(), 4);
}
