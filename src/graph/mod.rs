//! Knowledge graph data model shared by the store and its callers.
//!
//! The crate owns its own [`Term`]/[`Triple`] types instead of exposing
//! oxigraph's: authored triples arrive from agent code as plain data (often
//! deserialized from a workflow step's JSON input), get validated here, and
//! are converted to oxigraph terms only at the store boundary. Query results
//! travel the other way, from oxigraph solutions into serde-friendly
//! [`BindingRow`]s the orchestrator can hand to the next step.

pub mod store;

use std::collections::BTreeMap;
use std::fmt;

use oxigraph::model as ox;
use oxigraph::model::vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};

use crate::error::AddError;

/// One RDF term: an IRI reference, a blank node, or a literal.
///
/// A literal carries at most one of `datatype` / `language`; a
/// language-tagged literal is implicitly `rdf:langString`, and a literal with
/// neither annotation is a plain `xsd:string`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Term {
    Iri {
        value: String,
    },
    Blank {
        id: String,
    },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl Term {
    /// An IRI reference term.
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri { value: value.into() }
    }

    /// A blank node term with the given label (without the `_:` prefix).
    pub fn blank(id: impl Into<String>) -> Self {
        Term::Blank { id: id.into() }
    }

    /// A plain string literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal, e.g. `"1.5"^^xsd:decimal`.
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// A language-tagged literal, e.g. `"Verschuldungsgrad"@de`.
    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// The IRI string, if this term is an IRI.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri { value } => Some(value),
            _ => None,
        }
    }

    /// The lexical value, if this term is a literal.
    pub fn literal_value(&self) -> Option<&str> {
        match self {
            Term::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Convert an oxigraph term from a query solution into the crate model.
    ///
    /// `xsd:string` datatypes are normalized away so plain literals compare
    /// equal regardless of which side of the boundary they were built on.
    /// Returns `None` for term kinds outside the RDF 1.1 data model.
    pub(crate) fn from_ox(term: &ox::Term) -> Option<Term> {
        match term {
            ox::Term::NamedNode(n) => Some(Term::iri(n.as_str())),
            ox::Term::BlankNode(b) => Some(Term::blank(b.as_str())),
            ox::Term::Literal(l) => {
                if let Some(lang) = l.language() {
                    Some(Term::lang_literal(l.value(), lang))
                } else if l.datatype() == xsd::STRING {
                    Some(Term::literal(l.value()))
                } else {
                    Some(Term::typed_literal(l.value(), l.datatype().as_str()))
                }
            }
            _ => None,
        }
    }

    fn to_ox_named(&self) -> Result<ox::NamedNode, AddError> {
        match self {
            Term::Iri { value } => ox::NamedNode::new(value.as_str()).map_err(|e| AddError::InvalidIri {
                iri: value.clone(),
                message: e.to_string(),
            }),
            other => Err(AddError::NonIriPredicate {
                term: other.to_string(),
            }),
        }
    }

    fn to_ox_literal(
        value: &str,
        datatype: Option<&str>,
        language: Option<&str>,
    ) -> Result<ox::Literal, AddError> {
        match (language, datatype) {
            (Some(lang), dt) => {
                if let Some(dt) = dt {
                    if dt != rdf::LANG_STRING.as_str() {
                        return Err(AddError::ConflictingLanguageDatatype {
                            language: lang.to_string(),
                            datatype: dt.to_string(),
                        });
                    }
                }
                ox::Literal::new_language_tagged_literal(value, lang).map_err(|e| {
                    AddError::InvalidLanguageTag {
                        tag: lang.to_string(),
                        message: e.to_string(),
                    }
                })
            }
            (None, Some(dt)) if dt != xsd::STRING.as_str() => {
                if !lexical_form_is_valid(value, dt) {
                    return Err(AddError::InvalidLexicalForm {
                        value: value.to_string(),
                        datatype: dt.to_string(),
                    });
                }
                let datatype = ox::NamedNode::new(dt).map_err(|e| AddError::InvalidIri {
                    iri: dt.to_string(),
                    message: e.to_string(),
                })?;
                Ok(ox::Literal::new_typed_literal(value, datatype))
            }
            (None, _) => Ok(ox::Literal::new_simple_literal(value)),
        }
    }

    /// Convert to an oxigraph term in object position.
    pub(crate) fn to_ox_object(&self) -> Result<ox::Term, AddError> {
        match self {
            Term::Iri { .. } => Ok(self.to_ox_named()?.into()),
            Term::Blank { id } => Ok(ox::BlankNode::new(id.as_str())
                .map_err(|e| AddError::InvalidBlankNodeId {
                    id: id.clone(),
                    message: e.to_string(),
                })?
                .into()),
            Term::Literal {
                value,
                datatype,
                language,
            } => Ok(Self::to_ox_literal(value, datatype.as_deref(), language.as_deref())?.into()),
        }
    }
}

impl fmt::Display for Term {
    /// N-Triples-style rendering, used in error messages and logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri { value } => write!(f, "<{value}>"),
            Term::Blank { id } => write!(f, "_:{id}"),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{value}\"")?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")?;
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")?;
                }
                Ok(())
            }
        }
    }
}

/// A triple (subject, predicate, object) in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// The subject of the triple (IRI or blank node).
    pub subject: Term,
    /// The predicate of the triple (IRI).
    pub predicate: Term,
    /// The object of the triple.
    pub object: Term,
}

impl Triple {
    /// Create a new triple. Positional constraints (no literal subjects, IRI
    /// predicates) are checked at insertion time, not here.
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Convert to an oxigraph quad in the default graph, validating all terms.
    pub(crate) fn to_ox_quad(&self) -> Result<ox::Quad, AddError> {
        let predicate = self.predicate.to_ox_named()?;
        let object = self.object.to_ox_object()?;
        match &self.subject {
            Term::Iri { .. } => Ok(ox::Quad::new(
                self.subject.to_ox_named()?,
                predicate,
                object,
                ox::GraphName::DefaultGraph,
            )),
            Term::Blank { id } => {
                let blank = ox::BlankNode::new(id.as_str()).map_err(|e| AddError::InvalidBlankNodeId {
                    id: id.clone(),
                    message: e.to_string(),
                })?;
                Ok(ox::Quad::new(
                    blank,
                    predicate,
                    object,
                    ox::GraphName::DefaultGraph,
                ))
            }
            Term::Literal { .. } => Err(AddError::LiteralSubject {
                term: self.subject.to_string(),
            }),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// One solution of a SPARQL SELECT query: variable name → bound term.
///
/// Unbound variables are absent from the map. Serializes transparently as a
/// JSON object keyed by variable name (without the `?`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingRow {
    bindings: BTreeMap<String, Term>,
}

impl BindingRow {
    /// The term bound to `var`, if any.
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.bindings.get(var)
    }

    /// Number of bound variables in this row.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over (variable, term) pairs in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, var: impl Into<String>, term: Term) {
        self.bindings.insert(var.into(), term);
    }
}

/// The outcome of a SPARQL query: solution rows for SELECT, a boolean for ASK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum QueryOutcome {
    Solutions(Vec<BindingRow>),
    Boolean(bool),
}

impl QueryOutcome {
    /// The solution rows, if this was a SELECT outcome.
    pub fn rows(&self) -> Option<&[BindingRow]> {
        match self {
            QueryOutcome::Solutions(rows) => Some(rows),
            QueryOutcome::Boolean(_) => None,
        }
    }

    /// The boolean answer, if this was an ASK outcome.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryOutcome::Boolean(b) => Some(*b),
            QueryOutcome::Solutions(_) => None,
        }
    }

    /// JSON view of the outcome, as handed to workflow steps.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Check a literal's lexical form against the core XSD datatypes.
///
/// Unknown or non-XSD datatypes pass: this layer validates what it can
/// without dragging in a full XSD type system.
fn lexical_form_is_valid(value: &str, datatype: &str) -> bool {
    let Some(local) = datatype.strip_prefix("http://www.w3.org/2001/XMLSchema#") else {
        return true;
    };
    match local {
        "integer" | "long" | "int" | "short" | "byte" | "negativeInteger" | "nonPositiveInteger" => {
            value.parse::<i128>().is_ok()
        }
        "nonNegativeInteger" | "positiveInteger" | "unsignedLong" | "unsignedInt"
        | "unsignedShort" | "unsignedByte" => {
            value.parse::<i128>().map(|n| n >= 0).unwrap_or(false)
        }
        "decimal" => {
            let digits = value
                .strip_prefix('+')
                .or_else(|| value.strip_prefix('-'))
                .unwrap_or(value);
            !digits.is_empty()
                && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
                && digits.chars().filter(|c| *c == '.').count() <= 1
                && digits.chars().any(|c| c.is_ascii_digit())
        }
        "double" | "float" => value.parse::<f64>().is_ok(),
        "boolean" => matches!(value, "true" | "false" | "0" | "1"),
        _ => true,
    }
}
