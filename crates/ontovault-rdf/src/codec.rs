//! Format-tagged RDF text codecs.
//!
//! Parsing uses Sophia for the concrete syntaxes (N-Triples, Turtle, N-Quads,
//! TriG, RDF/XML) and serde_json for the RDF/JSON object form. Parsed terms
//! are re-read from Sophia's display form into the Ontovault term model, so
//! the parser stack never leaks past this module.
//!
//! Serialization is deterministic: statements are emitted in sorted order so
//! the same set always produces the same text.

use std::io::{BufReader, Cursor};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sophia::api::prelude::*;
use sophia::turtle::serializer::nt::write_term;
use thiserror::Error;

use crate::statements::StatementSet;
use crate::term::{Iri, Literal, Resource, Statement, Term};

/// The text formats Ontovault can exchange statement sets in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    NQuads,
    TriG,
    RdfXml,
    RdfJson,
}

impl RdfFormat {
    /// Resolve a file extension to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "nt" | "ntriples" => Some(Self::NTriples),
            "ttl" | "turtle" => Some(Self::Turtle),
            "nq" | "nquads" => Some(Self::NQuads),
            "trig" => Some(Self::TriG),
            "rdf" | "owl" | "xml" => Some(Self::RdfXml),
            "rj" | "json" => Some(Self::RdfJson),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NTriples => "ntriples",
            Self::Turtle => "turtle",
            Self::NQuads => "nquads",
            Self::TriG => "trig",
            Self::RdfXml => "rdfxml",
            Self::RdfJson => "rdfjson",
        }
    }
}

impl std::fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors from the text codecs.
#[derive(Debug, Error)]
pub enum RdfError {
    /// The input could not be parsed in the tagged format.
    #[error("malformed {format} input: {message}")]
    Malformed { format: RdfFormat, message: String },
    /// No format is registered for the given file extension.
    #[error("unsupported RDF format: .{0}")]
    UnsupportedFormat(String),
    /// The format has no Ontovault serializer (parse-only format).
    #[error("serialization to {0} is not supported")]
    UnsupportedSerialization(RdfFormat),
    #[error("RDF/JSON encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for the per-statement sinks handed to Sophia.
#[derive(Debug, Error)]
#[error("{message}")]
struct SinkError {
    message: String,
}

impl SinkError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse `bytes` as `format` into statements.
///
/// Triple formats yield default-graph statements; quad formats carry their
/// graph labels through. Unparsable input is a [`RdfError::Malformed`].
pub fn parse_statements(bytes: &[u8], format: RdfFormat) -> Result<Vec<Statement>, RdfError> {
    let reader = BufReader::new(Cursor::new(bytes));
    let mut out = Vec::new();
    match format {
        RdfFormat::NTriples => {
            let parser = sophia::turtle::parser::nt::parse_bufread(reader);
            collect_triples(parser, format, &mut out)?;
        }
        RdfFormat::Turtle => {
            let parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            collect_triples(parser, format, &mut out)?;
        }
        RdfFormat::NQuads => {
            let parser = sophia::turtle::parser::nq::parse_bufread(reader);
            collect_quads(parser, format, &mut out)?;
        }
        RdfFormat::TriG => {
            let parser = sophia::turtle::parser::trig::parse_bufread(reader);
            collect_quads(parser, format, &mut out)?;
        }
        RdfFormat::RdfXml => {
            let parser = sophia::xml::parser::parse_bufread(reader);
            collect_triples(parser, format, &mut out)?;
        }
        RdfFormat::RdfJson => parse_rdf_json(bytes, &mut out)?,
    }
    Ok(out)
}

/// Read a file, resolving the format from its extension.
pub fn parse_statements_from_path(path: &Path) -> Result<Vec<Statement>, RdfError> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let format = RdfFormat::from_extension(ext)
        .ok_or_else(|| RdfError::UnsupportedFormat(ext.to_string()))?;
    let bytes = std::fs::read(path)?;
    parse_statements(&bytes, format)
}

fn collect_triples<S>(
    mut source: S,
    format: RdfFormat,
    out: &mut Vec<Statement>,
) -> Result<(), RdfError>
where
    S: TripleSource,
{
    source
        .try_for_each_triple(|t| -> std::result::Result<(), SinkError> {
            let subject = parse_resource_display(&term_to_nt(t.s()))?;
            let Resource::Iri(predicate) = parse_resource_display(&term_to_nt(t.p()))? else {
                // A non-IRI predicate carries no agreed meaning; drop it.
                return Ok(());
            };
            let object = parse_term_display(&term_to_nt(t.o()))?;
            out.push(Statement {
                subject,
                predicate,
                object,
                graph: None,
            });
            Ok(())
        })
        .map_err(|e| RdfError::Malformed {
            format,
            message: e.to_string(),
        })
}

fn collect_quads<S>(
    mut source: S,
    format: RdfFormat,
    out: &mut Vec<Statement>,
) -> Result<(), RdfError>
where
    S: QuadSource,
{
    source
        .try_for_each_quad(|q| -> std::result::Result<(), SinkError> {
            let subject = parse_resource_display(&term_to_nt(q.s()))?;
            let Resource::Iri(predicate) = parse_resource_display(&term_to_nt(q.p()))? else {
                return Ok(());
            };
            let object = parse_term_display(&term_to_nt(q.o()))?;
            let graph = match q.g() {
                None => None,
                Some(g) => match parse_resource_display(&term_to_nt(g))? {
                    Resource::Iri(iri) => Some(iri),
                    Resource::Blank(label) => {
                        // Named graphs are IRIs in Ontovault's storage contract.
                        tracing::debug!(%label, "skipping statement in blank-labelled graph");
                        return Ok(());
                    }
                },
            };
            out.push(Statement {
                subject,
                predicate,
                object,
                graph,
            });
            Ok(())
        })
        .map_err(|e| RdfError::Malformed {
            format,
            message: e.to_string(),
        })
}

/// Render a Sophia term into its N-Triples display form.
fn term_to_nt<T: sophia::api::term::Term>(t: T) -> String {
    let mut buf = Vec::new();
    // Writing into an in-memory buffer is infallible.
    let _ = write_term(&mut buf, t);
    String::from_utf8_lossy(&buf).into_owned()
}

fn parse_resource_display(term: &str) -> Result<Resource, SinkError> {
    let s = term.trim();
    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Resource::Iri(Iri::new(iri)));
    }
    if let Some(label) = s.strip_prefix("_:") {
        return Ok(Resource::Blank(label.to_string()));
    }
    Err(SinkError::new(format!(
        "expected IRI or blank node, got: {s}"
    )))
}

fn parse_term_display(term: &str) -> Result<Term, SinkError> {
    let s = term.trim();
    if !s.starts_with('"') {
        return parse_resource_display(s).map(Term::Resource);
    }

    // Literal in N-Triples display form: find the unescaped closing quote.
    let mut end = None;
    let mut escaped = false;
    for (i, ch) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => {
                end = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(end) = end else {
        return Err(SinkError::new(format!(
            "literal missing closing quote: {s}"
        )));
    };

    let lexical = unescape_literal(&s[1..end]);
    let rest = s[end + 1..].trim();

    let literal = if let Some(lang) = rest.strip_prefix('@') {
        Literal::tagged(lexical, lang)
    } else if let Some(dt) = rest.strip_prefix("^^") {
        let dt = dt.trim();
        let dt = dt.strip_prefix('<').and_then(|t| t.strip_suffix('>')).unwrap_or(dt);
        Literal::typed(lexical, Iri::new(dt))
    } else {
        Literal::simple(lexical)
    };
    Ok(Term::Literal(literal))
}

fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// Serialization
// ============================================================================

/// Serialize a statement set to text.
///
/// Supported writers: N-Triples, N-Quads and RDF/JSON. N-Triples and RDF/JSON
/// have no quad syntax, so graph labels are flattened into the default graph
/// there; use N-Quads when contexts must survive. Output is sorted, so equal
/// sets serialize identically.
pub fn serialize_statements(set: &StatementSet, format: RdfFormat) -> Result<String, RdfError> {
    match format {
        RdfFormat::NTriples => Ok(write_nlines(set, false)),
        RdfFormat::NQuads => Ok(write_nlines(set, true)),
        RdfFormat::RdfJson => serialize_rdf_json(set),
        other => Err(RdfError::UnsupportedSerialization(other)),
    }
}

fn write_nlines(set: &StatementSet, with_graphs: bool) -> String {
    let mut lines: Vec<String> = set
        .iter()
        .map(|st| {
            let mut line = format!(
                "{} <{}> {}",
                resource_display(&st.subject),
                st.predicate,
                term_display(&st.object)
            );
            if with_graphs {
                if let Some(graph) = &st.graph {
                    line.push_str(&format!(" <{graph}>"));
                }
            }
            line.push_str(" .");
            line
        })
        .collect();
    lines.sort();
    lines.dedup();
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn resource_display(resource: &Resource) -> String {
    match resource {
        Resource::Iri(iri) => format!("<{iri}>"),
        Resource::Blank(label) => format!("_:{label}"),
    }
}

fn term_display(term: &Term) -> String {
    match term {
        Term::Resource(resource) => resource_display(resource),
        Term::Literal(literal) => {
            let mut out = format!("\"{}\"", escape_literal(&literal.lexical));
            if let Some(lang) = &literal.language {
                out.push('@');
                out.push_str(lang);
            } else if let Some(datatype) = &literal.datatype {
                out.push_str(&format!("^^<{datatype}>"));
            }
            out
        }
    }
}

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// RDF/JSON
// ============================================================================

fn json_malformed(message: impl Into<String>) -> RdfError {
    RdfError::Malformed {
        format: RdfFormat::RdfJson,
        message: message.into(),
    }
}

fn parse_rdf_json(bytes: &[u8], out: &mut Vec<Statement>) -> Result<(), RdfError> {
    let root: Value =
        serde_json::from_slice(bytes).map_err(|e| json_malformed(e.to_string()))?;
    let Value::Object(subjects) = root else {
        return Err(json_malformed("top level must be an object"));
    };

    for (subject_key, predicates) in subjects {
        let subject = match subject_key.strip_prefix("_:") {
            Some(label) => Resource::Blank(label.to_string()),
            None => Resource::Iri(Iri::new(subject_key)),
        };
        let Value::Object(predicates) = predicates else {
            return Err(json_malformed("subject entry must map predicates to arrays"));
        };
        for (predicate, values) in predicates {
            let Value::Array(values) = values else {
                return Err(json_malformed(format!(
                    "values of predicate {predicate} must be an array"
                )));
            };
            let predicate = Iri::new(predicate);
            for value in values {
                let object = parse_rdf_json_value(&value)?;
                out.push(Statement {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    object,
                    graph: None,
                });
            }
        }
    }
    Ok(())
}

fn parse_rdf_json_value(value: &Value) -> Result<Term, RdfError> {
    let Value::Object(fields) = value else {
        return Err(json_malformed("value entries must be objects"));
    };
    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| json_malformed("value entry missing `type`"))?;
    let lexical = fields
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| json_malformed("value entry missing `value`"))?;

    match kind {
        "uri" => Ok(Term::iri(lexical)),
        "bnode" => Ok(Term::Resource(Resource::Blank(
            lexical.trim_start_matches("_:").to_string(),
        ))),
        "literal" => {
            let literal = if let Some(lang) = fields.get("lang").and_then(Value::as_str) {
                Literal::tagged(lexical, lang)
            } else if let Some(dt) = fields.get("datatype").and_then(Value::as_str) {
                Literal::typed(lexical, Iri::new(dt))
            } else {
                Literal::simple(lexical)
            };
            Ok(Term::Literal(literal))
        }
        other => Err(json_malformed(format!("unknown value type: {other}"))),
    }
}

fn serialize_rdf_json(set: &StatementSet) -> Result<String, RdfError> {
    // serde_json's default map is ordered by key, which gives us sorted
    // subjects and predicates for free.
    let mut root: Map<String, Value> = Map::new();
    for st in set.iter() {
        let subject_key = match &st.subject {
            Resource::Iri(iri) => iri.as_str().to_string(),
            Resource::Blank(label) => format!("_:{label}"),
        };
        let predicates = root
            .entry(subject_key)
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(predicates) = predicates else {
            unreachable!("subject entries are always objects");
        };
        let values = predicates
            .entry(st.predicate.as_str().to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(values) = values else {
            unreachable!("predicate entries are always arrays");
        };
        values.push(rdf_json_value(&st.object));
    }

    // Sort value arrays too, so equal sets always produce the same document.
    for predicates in root.values_mut() {
        if let Value::Object(predicates) = predicates {
            for values in predicates.values_mut() {
                if let Value::Array(values) = values {
                    values.sort_by_key(|v| v.to_string());
                    values.dedup();
                }
            }
        }
    }

    Ok(serde_json::to_string_pretty(&Value::Object(root))?)
}

fn rdf_json_value(term: &Term) -> Value {
    let mut fields = Map::new();
    match term {
        Term::Resource(Resource::Iri(iri)) => {
            fields.insert("type".into(), Value::String("uri".into()));
            fields.insert("value".into(), Value::String(iri.as_str().to_string()));
        }
        Term::Resource(Resource::Blank(label)) => {
            fields.insert("type".into(), Value::String("bnode".into()));
            fields.insert("value".into(), Value::String(format!("_:{label}")));
        }
        Term::Literal(literal) => {
            fields.insert("type".into(), Value::String("literal".into()));
            fields.insert("value".into(), Value::String(literal.lexical.clone()));
            if let Some(lang) = &literal.language {
                fields.insert("lang".into(), Value::String(lang.clone()));
            } else if let Some(dt) = &literal.datatype {
                fields.insert("datatype".into(), Value::String(dt.as_str().to_string()));
            }
        }
    }
    Value::Object(fields)
}
