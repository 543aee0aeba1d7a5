//! Oxigraph-backed knowledge base with SPARQL query capabilities.
//!
//! One in-memory RDF graph per [`KnowledgeBase`] instance. Loading is
//! explicit — [`load_replace`](KnowledgeBase::load_replace) swaps in a freshly
//! parsed graph, [`load_merge`](KnowledgeBase::load_merge) unions into the
//! current one — and persistence is a separate, explicit operation. Queries
//! never trigger a reload.
//!
//! Every operation takes `&self` and is internally serialized through an
//! `RwLock`, so a `KnowledgeBase` can be shared behind `Arc` by the agent
//! framework without further coordination.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::RwLock;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::GraphNameRef;
use oxigraph::sparql::{Query, QueryResults};
use oxigraph::store::Store;

use crate::error::{AddError, KgResult, LoadError, PersistError, QueryError, StoreError};

use super::{BindingRow, QueryOutcome, Term, Triple};

/// Configuration for a [`KnowledgeBase`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Base IRI used to resolve relative IRIs in loaded Turtle documents.
    /// `None` means documents must use absolute IRIs (or declare their own
    /// `@base`). Does not apply to SPARQL queries.
    pub base_iri: Option<String>,
}

/// In-memory RDF graph with Turtle loading, SPARQL querying, triple
/// ingestion, and Turtle persistence.
pub struct KnowledgeBase {
    config: StoreConfig,
    store: RwLock<Store>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base with the default configuration.
    pub fn new() -> KgResult<Self> {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty knowledge base with the given configuration.
    pub fn with_config(config: StoreConfig) -> KgResult<Self> {
        let store = Store::new().map_err(|e| StoreError::Backend {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self {
            config,
            store: RwLock::new(store),
        })
    }

    /// Parse the Turtle document at `path` into a staging store.
    ///
    /// The live graph is never touched here, so a parse failure can never
    /// leave a partial graph behind.
    fn parse_turtle(&self, path: &Path) -> Result<Store, LoadError> {
        let data = std::fs::read(path).map_err(|source| LoadError::FileRead {
            path: path.display().to_string(),
            source,
        })?;

        let mut parser = RdfParser::from_format(RdfFormat::Turtle);
        if let Some(base) = &self.config.base_iri {
            parser = parser
                .with_base_iri(base.as_str())
                .map_err(|e| LoadError::InvalidBaseIri {
                    iri: base.clone(),
                    message: e.to_string(),
                })?;
        }

        let staged = Store::new().map_err(|e| LoadError::Storage {
            message: format!("failed to create staging store: {e}"),
        })?;
        staged
            .load_from_reader(parser, data.as_slice())
            .map_err(|e| LoadError::Syntax {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(staged)
    }

    /// Load the Turtle document at `path`, replacing the current graph.
    ///
    /// The document is parsed fully before the swap, so on failure the
    /// previous graph is left intact. Returns the number of triples loaded.
    pub fn load_replace(&self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let staged = self.parse_turtle(path)?;
        let count = staged.len().map_err(|e| LoadError::Storage {
            message: e.to_string(),
        })?;

        let mut store = self.store.write().expect("store lock poisoned");
        *store = staged;
        tracing::info!(path = %path.display(), triples = count, "graph replaced from turtle");
        Ok(count)
    }

    /// Load the Turtle document at `path`, merging its triples into the
    /// current graph (set union — duplicates collapse).
    ///
    /// Returns the number of triples actually added. Parse failures leave the
    /// current graph untouched.
    pub fn load_merge(&self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let staged = self.parse_turtle(path)?;

        let store = self.store.write().expect("store lock poisoned");
        let mut added = 0usize;
        for quad in staged.iter() {
            let quad = quad.map_err(|e| LoadError::Storage {
                message: e.to_string(),
            })?;
            let inserted = store.insert(&quad).map_err(|e| LoadError::Storage {
                message: e.to_string(),
            })?;
            if inserted {
                added += 1;
            }
        }
        tracing::info!(path = %path.display(), added, "turtle merged into graph");
        Ok(added)
    }

    /// Evaluate a SPARQL SELECT or ASK query against the current graph.
    ///
    /// The full result set is materialized before returning; nothing is
    /// streamed. CONSTRUCT and DESCRIBE are rejected as
    /// [`QueryError::UnsupportedForm`].
    pub fn query(&self, sparql: &str) -> Result<QueryOutcome, QueryError> {
        let store = self.store.read().expect("store lock poisoned");
        let results = match store.query(sparql) {
            Ok(results) => results,
            // Classify after the fact: a failed parse of the same text means
            // the query never ran; otherwise evaluation itself failed.
            Err(e) => {
                return Err(match Query::parse(sparql, None) {
                    Err(syntax) => QueryError::Syntax {
                        message: syntax.to_string(),
                    },
                    Ok(_) => QueryError::Evaluation {
                        message: e.to_string(),
                    },
                });
            }
        };

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| QueryError::Evaluation {
                        message: e.to_string(),
                    })?;
                    let mut row = BindingRow::default();
                    for (var, term) in solution.iter() {
                        let term =
                            Term::from_ox(term).ok_or_else(|| QueryError::Evaluation {
                                message: format!(
                                    "unsupported term kind bound to ?{}",
                                    var.as_str()
                                ),
                            })?;
                        row.insert(var.as_str(), term);
                    }
                    rows.push(row);
                }
                tracing::debug!(rows = rows.len(), "sparql select evaluated");
                Ok(QueryOutcome::Solutions(rows))
            }
            QueryResults::Boolean(answer) => {
                tracing::debug!(answer, "sparql ask evaluated");
                Ok(QueryOutcome::Boolean(answer))
            }
            QueryResults::Graph(_) => Err(QueryError::UnsupportedForm {
                form: "CONSTRUCT/DESCRIBE".into(),
            }),
        }
    }

    /// Evaluate a SELECT query, returning its binding rows.
    pub fn select(&self, sparql: &str) -> Result<Vec<BindingRow>, QueryError> {
        match self.query(sparql)? {
            QueryOutcome::Solutions(rows) => Ok(rows),
            QueryOutcome::Boolean(_) => Err(QueryError::UnsupportedForm {
                form: "ASK (use `ask` for boolean queries)".into(),
            }),
        }
    }

    /// Evaluate an ASK query, returning its boolean answer.
    pub fn ask(&self, sparql: &str) -> Result<bool, QueryError> {
        match self.query(sparql)? {
            QueryOutcome::Boolean(answer) => Ok(answer),
            QueryOutcome::Solutions(_) => Err(QueryError::UnsupportedForm {
                form: "SELECT (use `select` for binding rows)".into(),
            }),
        }
    }

    /// Insert triples into the graph, returning the number actually added
    /// (exact duplicates are no-ops under set semantics).
    ///
    /// The whole batch is validated before any insert, so a malformed triple
    /// fails the call with the graph unchanged.
    pub fn add_triples(&self, triples: &[Triple]) -> Result<usize, AddError> {
        let mut quads = Vec::with_capacity(triples.len());
        for triple in triples {
            quads.push(triple.to_ox_quad()?);
        }

        let store = self.store.write().expect("store lock poisoned");
        let mut added = 0usize;
        for quad in &quads {
            let inserted = store.insert(quad).map_err(|e| AddError::Storage {
                message: e.to_string(),
            })?;
            if inserted {
                added += 1;
            }
        }
        tracing::debug!(requested = triples.len(), added, "triples ingested");
        Ok(added)
    }

    /// Serialize the full graph as Turtle to `path`, overwriting any
    /// existing file.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| PersistError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let store = self.store.read().expect("store lock poisoned");
        store
            .dump_graph_to_writer(GraphNameRef::DefaultGraph, RdfFormat::Turtle, &mut writer)
            .map_err(|e| PersistError::Serialize {
                message: e.to_string(),
            })?;
        writer.flush().map_err(|source| PersistError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "graph persisted to turtle");
        Ok(())
    }

    /// Drop all triples from the graph.
    pub fn clear(&self) -> KgResult<()> {
        let store = self.store.write().expect("store lock poisoned");
        store.clear().map_err(|e| StoreError::Backend {
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Number of triples in the graph.
    pub fn len(&self) -> KgResult<usize> {
        let store = self.store.read().expect("store lock poisoned");
        Ok(store.len().map_err(|e| StoreError::Backend {
            message: e.to_string(),
        })?)
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> KgResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of all triples in the graph, order unspecified.
    pub fn all_triples(&self) -> KgResult<Vec<Triple>> {
        let rows = self.select("SELECT ?s ?p ?o WHERE { ?s ?p ?o }")?;
        let mut triples = Vec::with_capacity(rows.len());
        for row in &rows {
            if let (Some(s), Some(p), Some(o)) = (row.get("s"), row.get("p"), row.get("o")) {
                triples.push(Triple::new(s.clone(), p.clone(), o.clone()));
            }
        }
        Ok(triples)
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;

    fn kb_with(triples: &[Triple]) -> KnowledgeBase {
        let kb = KnowledgeBase::new().unwrap();
        kb.add_triples(triples).unwrap();
        kb
    }

    fn formula(local: &str, label: &str) -> [Triple; 2] {
        [
            Triple::new(
                vocab::kb(local),
                vocab::rdf_type(),
                vocab::kgclass("FinancialFormula"),
            ),
            Triple::new(vocab::kb(local), vocab::rdfs_label(), Term::literal(label)),
        ]
    }

    #[test]
    fn add_and_select() {
        let kb = kb_with(&formula("FF_001", "Debt-to-Equity Ratio"));

        let rows = kb
            .select("SELECT ?s ?p ?o WHERE { ?s ?p ?o }")
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn duplicate_adds_are_noops() {
        let triples = formula("FF_001", "Debt-to-Equity Ratio");
        let kb = KnowledgeBase::new().unwrap();

        assert_eq!(kb.add_triples(&triples).unwrap(), 2);
        assert_eq!(kb.add_triples(&triples).unwrap(), 0);
        assert_eq!(kb.len().unwrap(), 2);
    }

    #[test]
    fn ask_query() {
        let kb = kb_with(&formula("FF_001", "Debt-to-Equity Ratio"));

        let exists = kb
            .ask("PREFIX kb: <https://cacm-kg.dev/kb#> ASK { kb:FF_001 ?p ?o }")
            .unwrap();
        assert!(exists);

        let missing = kb
            .ask("PREFIX kb: <https://cacm-kg.dev/kb#> ASK { kb:FF_999 ?p ?o }")
            .unwrap();
        assert!(!missing);
    }

    #[test]
    fn invalid_sparql_is_syntax_error() {
        let kb = KnowledgeBase::new().unwrap();
        let err = kb.query("SELEKT ?s WHERE { ?s ?p ?o }").unwrap_err();
        assert!(matches!(err, QueryError::Syntax { .. }));
    }

    #[test]
    fn construct_is_unsupported() {
        let kb = KnowledgeBase::new().unwrap();
        let err = kb
            .query("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }")
            .unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedForm { .. }));
    }

    #[test]
    fn select_rejects_ask_and_vice_versa() {
        let kb = KnowledgeBase::new().unwrap();
        assert!(matches!(
            kb.select("ASK { ?s ?p ?o }").unwrap_err(),
            QueryError::UnsupportedForm { .. }
        ));
        assert!(matches!(
            kb.ask("SELECT ?s WHERE { ?s ?p ?o }").unwrap_err(),
            QueryError::UnsupportedForm { .. }
        ));
    }

    #[test]
    fn malformed_triple_fails_whole_batch() {
        let kb = KnowledgeBase::new().unwrap();
        let batch = [
            Triple::new(
                vocab::kb("FF_001"),
                vocab::rdfs_label(),
                Term::literal("fine"),
            ),
            Triple::new(
                vocab::kb("FF_002"),
                vocab::rdfs_label(),
                Term::typed_literal("twelve", "http://www.w3.org/2001/XMLSchema#integer"),
            ),
        ];
        assert!(kb.add_triples(&batch).is_err());
        // Validate-then-insert: nothing from the batch landed.
        assert!(kb.is_empty().unwrap());
    }

    #[test]
    fn clear_empties_graph() {
        let kb = kb_with(&formula("FF_001", "Debt-to-Equity Ratio"));
        assert!(!kb.is_empty().unwrap());
        kb.clear().unwrap();
        assert!(kb.is_empty().unwrap());
    }

    #[test]
    fn nonexistent_path_is_load_error() {
        let kb = kb_with(&formula("FF_001", "Debt-to-Equity Ratio"));
        let err = kb.load_replace("/no/such/file.ttl").unwrap_err();
        assert!(matches!(err, LoadError::FileRead { .. }));
        // Prior graph intact.
        assert_eq!(kb.len().unwrap(), 2);
    }

    #[test]
    fn all_triples_snapshot() {
        let triples = formula("FF_001", "Debt-to-Equity Ratio");
        let kb = kb_with(&triples);

        let snapshot = kb.all_triples().unwrap();
        assert_eq!(snapshot.len(), 2);
        for t in &triples {
            assert!(snapshot.contains(t));
        }
    }
}
