//! Rich diagnostic error types for the knowledge-graph access layer.
//!
//! Each operation family (load, query, add, persist) defines its own error
//! type with miette `#[diagnostic]` derives, providing error codes, help text,
//! and source chains so callers know exactly what went wrong and how to fix it.
//! Failures are always returned as values; the enclosing workflow step decides
//! whether to retry, skip, or abort.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the knowledge-graph access layer.
///
/// Each variant wraps an operation-family error, preserving the full
/// diagnostic chain (error codes, help text, sources) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum KgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Add(#[from] AddError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors from loading a Turtle document into the graph.
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read turtle file: {path}")]
    #[diagnostic(
        code(cacm::load::io),
        help(
            "Check that the file exists, is readable, and that the path is \
             spelled correctly. Relative paths are resolved against the \
             process working directory."
        )
    )]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed turtle in {path}: {message}")]
    #[diagnostic(
        code(cacm::load::syntax),
        help(
            "The document is not valid Turtle. Common causes: an unterminated \
             @prefix directive, a statement missing its closing '.', or a typed \
             literal with a malformed datatype IRI. The in-memory graph was \
             left unchanged."
        )
    )]
    Syntax { path: String, message: String },

    #[error("invalid base IRI \"{iri}\": {message}")]
    #[diagnostic(
        code(cacm::load::base_iri),
        help(
            "The configured base IRI must be a valid absolute IRI, \
             e.g. \"https://cacm-kg.dev/kb#\". Fix it in StoreConfig."
        )
    )]
    InvalidBaseIri { iri: String, message: String },

    #[error("graph storage error during load: {message}")]
    #[diagnostic(
        code(cacm::load::storage),
        help(
            "The underlying RDF store rejected the operation. This should not \
             happen for in-memory graphs — if it persists, file a bug report."
        )
    )]
    Storage { message: String },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Errors from evaluating a SPARQL query.
#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("SPARQL syntax error: {message}")]
    #[diagnostic(
        code(cacm::query::syntax),
        help(
            "The query text failed to parse. Check for missing PREFIX \
             declarations, unbalanced braces, or stray characters in the \
             generated query."
        )
    )]
    Syntax { message: String },

    #[error("unsupported query form: {form}")]
    #[diagnostic(
        code(cacm::query::unsupported_form),
        help(
            "Only SELECT and ASK queries are supported by this layer. \
             Rewrite CONSTRUCT/DESCRIBE queries as SELECT over the same \
             pattern and rebuild the triples from the binding rows."
        )
    )]
    UnsupportedForm { form: String },

    #[error("SPARQL evaluation failed: {message}")]
    #[diagnostic(
        code(cacm::query::evaluation),
        help(
            "The query parsed but could not be evaluated against the current \
             graph. The graph was not modified."
        )
    )]
    Evaluation { message: String },
}

// ---------------------------------------------------------------------------
// Add errors
// ---------------------------------------------------------------------------

/// Errors from ingesting authored triples.
///
/// The whole batch is validated before any triple is inserted, so an
/// `AddError` always leaves the graph unchanged.
#[derive(Debug, Error, Diagnostic)]
pub enum AddError {
    #[error("invalid IRI \"{iri}\": {message}")]
    #[diagnostic(
        code(cacm::add::invalid_iri),
        help(
            "Every IRI term must be a valid absolute IRI. Prefixed names like \
             kb:FF_001 must be expanded before insertion — use the vocab \
             helpers to build full IRIs."
        )
    )]
    InvalidIri { iri: String, message: String },

    #[error("invalid blank node id \"{id}\": {message}")]
    #[diagnostic(
        code(cacm::add::invalid_blank),
        help("Blank node identifiers must match the Turtle BLANK_NODE_LABEL production.")
    )]
    InvalidBlankNodeId { id: String, message: String },

    #[error("invalid language tag \"{tag}\": {message}")]
    #[diagnostic(
        code(cacm::add::invalid_language),
        help("Language tags must follow BCP 47, e.g. \"en\" or \"en-US\".")
    )]
    InvalidLanguageTag { tag: String, message: String },

    #[error("literal \"{value}\" is not a valid lexical form for {datatype}")]
    #[diagnostic(
        code(cacm::add::invalid_lexical),
        help(
            "The literal's value does not parse under its declared XSD \
             datatype. Either fix the value or drop the datatype annotation \
             to store it as a plain string."
        )
    )]
    InvalidLexicalForm { value: String, datatype: String },

    #[error("literal term {term} cannot be a subject")]
    #[diagnostic(
        code(cacm::add::literal_subject),
        help("RDF subjects must be IRIs or blank nodes, never literals.")
    )]
    LiteralSubject { term: String },

    #[error("predicate {term} must be an IRI")]
    #[diagnostic(
        code(cacm::add::non_iri_predicate),
        help("RDF predicates must be IRIs; blank nodes and literals are not allowed.")
    )]
    NonIriPredicate { term: String },

    #[error("literal with language \"{language}\" also declares datatype {datatype}")]
    #[diagnostic(
        code(cacm::add::language_with_datatype),
        help(
            "A language-tagged literal is implicitly rdf:langString and cannot \
             carry another datatype. Drop one of the two annotations."
        )
    )]
    ConflictingLanguageDatatype { language: String, datatype: String },

    #[error("graph storage error during insert: {message}")]
    #[diagnostic(
        code(cacm::add::storage),
        help(
            "The underlying RDF store rejected the insert. This should not \
             happen for in-memory graphs — if it persists, file a bug report."
        )
    )]
    Storage { message: String },
}

// ---------------------------------------------------------------------------
// Persist errors
// ---------------------------------------------------------------------------

/// Errors from serializing the graph back to Turtle on disk.
#[derive(Debug, Error, Diagnostic)]
pub enum PersistError {
    #[error("failed to write turtle file: {path}")]
    #[diagnostic(
        code(cacm::persist::io),
        help(
            "Check that the parent directory exists, that you have write \
             permission, and that the disk is not full. An existing file at \
             the path is overwritten, not appended to."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("turtle serialization failed: {message}")]
    #[diagnostic(
        code(cacm::persist::serialize),
        help(
            "The graph could not be serialized as Turtle. This usually means \
             an I/O failure mid-write; the target file may be truncated."
        )
    )]
    Serialize { message: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors from the backing RDF store itself, outside the four operation
/// families (construction, counting, clearing).
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("RDF store backend error: {message}")]
    #[diagnostic(
        code(cacm::store::backend),
        help(
            "The in-memory RDF store reported an internal error. \
             If this happens reproducibly, file a bug report."
        )
    )]
    Backend { message: String },
}

/// Convenience alias for functions returning knowledge-graph results.
pub type KgResult<T> = std::result::Result<T, KgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_converts_to_kg_error() {
        let err = LoadError::Syntax {
            path: "a.ttl".into(),
            message: "unexpected token".into(),
        };
        let kg: KgError = err.into();
        assert!(matches!(kg, KgError::Load(LoadError::Syntax { .. })));
    }

    #[test]
    fn add_error_converts_to_kg_error() {
        let err = AddError::InvalidLexicalForm {
            value: "abc".into(),
            datatype: "http://www.w3.org/2001/XMLSchema#integer".into(),
        };
        let kg: KgError = err.into();
        assert!(matches!(kg, KgError::Add(AddError::InvalidLexicalForm { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = QueryError::UnsupportedForm {
            form: "CONSTRUCT".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("CONSTRUCT"));

        let err = AddError::InvalidLexicalForm {
            value: "twelve".into(),
            datatype: "http://www.w3.org/2001/XMLSchema#integer".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("twelve"));
        assert!(msg.contains("integer"));
    }

    #[test]
    fn io_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LoadError::FileRead {
            path: "missing.ttl".into(),
            source: io,
        };
        let source = std::error::Error::source(&err);
        assert!(source.is_some());
    }
}
