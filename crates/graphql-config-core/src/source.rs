//! Loaded GraphQL sources

use graphql_parser::{query, schema};

use crate::error::{Error, Result, SourceLocation};

/// Type system definitions (`type`, `schema`, `extend`, `directive`, ...)
pub type TypeDefs = schema::Document<'static, String>;

/// Executable definitions (operations and fragments)
pub type Operations = query::Document<'static, String>;

/// The parsed form of a source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDocument {
    TypeSystem(TypeDefs),
    Executable(Operations),
}

/// The result of loading one pointer: parsed document, raw text and origin
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Where the source came from (file path, URL, or `inline`)
    pub location: String,
    /// The raw GraphQL text
    pub raw: String,
    /// The parsed document
    pub document: SourceDocument,
}

impl Source {
    /// Parse GraphQL text, as type definitions first and operations second.
    pub fn parse(location: impl Into<String>, raw: impl Into<String>) -> Result<Self> {
        let location = location.into();
        let raw = raw.into();
        let document = parse_document(&raw).map_err(|e| {
            e.with_source_location(SourceLocation {
                file: location.clone(),
                line: None,
                column: None,
            })
        })?;

        Ok(Self {
            location,
            raw,
            document,
        })
    }

    /// Type definitions, if this source holds type system definitions
    pub fn type_defs(&self) -> Option<&TypeDefs> {
        match &self.document {
            SourceDocument::TypeSystem(doc) => Some(doc),
            SourceDocument::Executable(_) => None,
        }
    }

    /// Operations and fragments, if this source holds executable definitions
    pub fn operations(&self) -> Option<&Operations> {
        match &self.document {
            SourceDocument::Executable(doc) => Some(doc),
            SourceDocument::TypeSystem(_) => None,
        }
    }

    /// Check if this source holds operations/fragments
    pub fn is_executable(&self) -> bool {
        matches!(self.document, SourceDocument::Executable(_))
    }

    /// Check if the source has no definitions at all
    pub fn is_empty(&self) -> bool {
        match &self.document {
            SourceDocument::TypeSystem(doc) => doc.definitions.is_empty(),
            SourceDocument::Executable(doc) => doc.definitions.is_empty(),
        }
    }
}

/// True when `raw` holds nothing but whitespace, commas and `#` comments.
///
/// The first real token of a document always precedes any `#` on its line,
/// so cutting each line at the first `#` cannot hide it.
fn is_blank(raw: &str) -> bool {
    raw.lines().all(|line| {
        let code = line.split('#').next().unwrap_or("");
        code.chars()
            .all(|c| c.is_whitespace() || c == ',' || c == '\u{feff}')
    })
}

fn parse_document(raw: &str) -> Result<SourceDocument> {
    if is_blank(raw) {
        return Ok(SourceDocument::TypeSystem(schema::Document {
            definitions: Vec::new(),
        }));
    }

    let schema_err = match schema::parse_schema::<String>(raw) {
        Ok(doc) => return Ok(SourceDocument::TypeSystem(doc.into_static())),
        Err(e) => e,
    };

    match query::parse_query::<String>(raw) {
        Ok(doc) => Ok(SourceDocument::Executable(doc.into_static())),
        Err(query_err) => Err(Error::parse(format!(
            "Not a valid GraphQL document.\n  As type definitions: {}\n  As operations: {}",
            schema_err.to_string().trim(),
            query_err.to_string().trim()
        ))),
    }
}
