//! Error types for graphql-config
//!
//! Every error carries enough context (project name, config file, or the
//! unresolved pointer) to locate the offending configuration entry.

use std::fmt;
use std::path::Path;

/// Result type alias for graphql-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for graphql-config operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Key path in the raw config where the error occurred (e.g., "projects.api.schema")
    pub path: Option<String>,
    /// Source location (config file, GraphQL file) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl SourceLocation {
    /// Location pointing at a whole file
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            file: path.as_ref().display().to_string(),
            line: None,
            column: None,
        }
    }
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error parsing configuration text or GraphQL source
    Parse,
    /// The configuration defines neither a schema nor any project
    ConfigEmpty,
    /// The configuration has a malformed shape
    InvalidConfig,
    /// No project with that name, or no project matches a file
    ProjectNotFound { target: String },
    /// A project requested an extension nobody registered
    ExtensionMissing { project: String, extension: String },
    /// An extension name is already taken
    ExtensionAlreadyRegistered { name: String },
    /// A project has no `schema` pointer
    SchemaMissing { project: String },
    /// Error while resolving a pointer through a loader registry
    Loader(LoaderErrorKind),
    /// GraphQL type definitions could not be merged or built into a schema
    Schema,
    /// I/O error (unreadable file, etc.)
    Io,
    /// Internal error (bug in graphql-config)
    Internal,
}

/// Specific loader error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderErrorKind {
    /// The registry has no loaders and the pointer needs one
    LoadersMissing { pointer: String },
    /// Every registered loader declined the pointer
    NoResult { pointer: String },
    /// A loader failed while loading
    Custom { loader: String, message: String },
}

impl Error {
    fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::from_kind(ErrorKind::Parse)
        }
    }

    /// Create an empty config error
    pub fn config_empty(filepath: impl AsRef<Path>) -> Self {
        Self {
            source_location: Some(SourceLocation::file(filepath)),
            help: Some("Define a top-level `schema` or at least one entry under `projects`".into()),
            ..Self::from_kind(ErrorKind::ConfigEmpty)
        }
    }

    /// Create an invalid config error for the value at `path`
    pub fn invalid_config(path: impl Into<String>, message: impl Into<String>) -> Self {
        let p = path.into();
        Self {
            path: if p.is_empty() { None } else { Some(p) },
            cause: Some(message.into()),
            ..Self::from_kind(ErrorKind::InvalidConfig)
        }
    }

    /// Create a project not found error for an unknown project name
    pub fn project_not_found(name: impl Into<String>) -> Self {
        let n = name.into();
        Self {
            help: Some(format!(
                "Check that '{}' is declared under `projects` in the configuration",
                n
            )),
            ..Self::from_kind(ErrorKind::ProjectNotFound {
                target: format!("Project '{}' not found", n),
            })
        }
    }

    /// Create a project not found error for a file no project claims
    pub fn no_project_for_file(filepath: impl AsRef<Path>) -> Self {
        Self {
            help: Some(
                "Add the file to a project's `include`, or declare a project without \
                 `include`/`exclude` to act as a catch-all"
                    .into(),
            ),
            ..Self::from_kind(ErrorKind::ProjectNotFound {
                target: format!(
                    "File '{}' doesn't match any project",
                    filepath.as_ref().display()
                ),
            })
        }
    }

    /// Create an extension missing error
    pub fn extension_missing(project: impl Into<String>, extension: impl Into<String>) -> Self {
        let ext = extension.into();
        Self {
            help: Some(format!(
                "Register the '{}' extension when constructing the Config",
                ext
            )),
            ..Self::from_kind(ErrorKind::ExtensionMissing {
                project: project.into(),
                extension: ext,
            })
        }
    }

    /// Create an extension already registered error
    pub fn extension_already_registered(name: impl Into<String>) -> Self {
        let n = name.into();
        Self {
            help: Some(format!(
                "Use register_with_force(..., true) to override the '{}' extension",
                n
            )),
            ..Self::from_kind(ErrorKind::ExtensionAlreadyRegistered { name: n })
        }
    }

    /// Create a schema missing error; callers add the key path with
    /// [`Error::with_path`]
    pub fn schema_missing(project: impl Into<String>) -> Self {
        let p = project.into();
        Self {
            help: Some("Add a `schema` pointer to the project".into()),
            ..Self::from_kind(ErrorKind::SchemaMissing { project: p })
        }
    }

    /// Create a loaders missing error
    pub fn loaders_missing(pointer: impl Into<String>) -> Self {
        Self {
            help: Some("Register at least one loader before loading pointers".into()),
            ..Self::from_kind(ErrorKind::Loader(LoaderErrorKind::LoadersMissing {
                pointer: pointer.into(),
            }))
        }
    }

    /// Create a loader no result error
    pub fn loader_no_result(pointer: impl Into<String>) -> Self {
        let p = pointer.into();
        Self {
            help: Some(format!(
                "Check that '{}' exists relative to the config file, or register a loader for it",
                p
            )),
            ..Self::from_kind(ErrorKind::Loader(LoaderErrorKind::NoResult { pointer: p }))
        }
    }

    /// Create a custom loader error
    pub fn loader_custom(loader: impl Into<String>, message: impl Into<String>) -> Self {
        let loader_id = loader.into();
        Self {
            help: Some(format!("Check the '{}' loader implementation", loader_id)),
            ..Self::from_kind(ErrorKind::Loader(LoaderErrorKind::Custom {
                loader: loader_id,
                message: message.into(),
            }))
        }
    }

    /// Create a schema merge/build error
    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::from_kind(ErrorKind::Schema)
        }
    }

    /// Create an I/O error
    pub fn io(file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            source_location: Some(SourceLocation::file(file)),
            cause: Some(message.into()),
            ..Self::from_kind(ErrorKind::Io)
        }
    }

    /// Create an internal error (bug in graphql-config)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            help: Some("This is likely a bug in graphql-config. Please report it.".into()),
            cause: Some(message.into()),
            ..Self::from_kind(ErrorKind::Internal)
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Point the error at a config file
    pub fn in_file(self, filepath: impl AsRef<Path>) -> Self {
        self.with_source_location(SourceLocation::file(filepath))
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::ConfigEmpty => write!(f, "Configuration is empty")?,
            ErrorKind::InvalidConfig => write!(f, "Invalid configuration")?,
            ErrorKind::ProjectNotFound { target } => write!(f, "{}", target)?,
            ErrorKind::ExtensionMissing { project, extension } => write!(
                f,
                "Project {} is missing {} extension",
                project, extension
            )?,
            ErrorKind::ExtensionAlreadyRegistered { name } => {
                write!(f, "Extension '{}' is already registered", name)?
            }
            ErrorKind::SchemaMissing { project } => {
                write!(f, "Project '{}' has no schema configured", project)?
            }
            ErrorKind::Loader(l) => match l {
                LoaderErrorKind::LoadersMissing { pointer } => {
                    write!(f, "Loaders are missing (pointer: {})", pointer)?
                }
                LoaderErrorKind::NoResult { pointer } => {
                    write!(f, "None of provided loaders could resolve: {}", pointer)?
                }
                LoaderErrorKind::Custom { loader, message } => {
                    write!(f, "Loader '{}' error: {}", loader, message)?
                }
            },
            ErrorKind::Schema => write!(f, "Schema error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::Internal => write!(f, "Internal error")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
                if let Some(column) = loc.column {
                    write!(f, ":{}", column)?;
                }
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_not_found_display() {
        let err = Error::project_not_found("web");
        let display = format!("{}", err);

        assert!(display.contains("Project 'web' not found"));
        assert!(display.contains("Help:"));
        assert!(matches!(err.kind, ErrorKind::ProjectNotFound { .. }));
    }

    #[test]
    fn test_no_project_for_file_display() {
        let err = Error::no_project_for_file("src/unrelated.txt");
        let display = format!("{}", err);

        assert!(display.contains("File 'src/unrelated.txt' doesn't match any project"));
    }

    #[test]
    fn test_extension_missing_display() {
        let err = Error::extension_missing("api", "endpoints");
        let display = format!("{}", err);

        assert!(display.contains("Project api is missing endpoints extension"));
        assert!(display.contains("Register the 'endpoints' extension"));
    }

    #[test]
    fn test_loader_errors_name_pointer() {
        let missing = Error::loaders_missing("schema.graphql");
        assert!(missing.to_string().contains("schema.graphql"));
        assert_eq!(
            missing.kind,
            ErrorKind::Loader(LoaderErrorKind::LoadersMissing {
                pointer: "schema.graphql".into()
            })
        );

        let no_result = Error::loader_no_result("./api/*.graphql");
        assert!(no_result
            .to_string()
            .contains("None of provided loaders could resolve: ./api/*.graphql"));
    }

    #[test]
    fn test_loader_custom_error() {
        let err = Error::loader_custom("url", "connection refused");
        let display = format!("{}", err);

        assert!(display.contains("Loader 'url' error: connection refused"));
        assert!(display.contains("Help:"));
    }

    #[test]
    fn test_config_empty_names_file() {
        let err = Error::config_empty("/proj/graphql.config.json");
        let display = format!("{}", err);

        assert!(display.contains("Configuration is empty"));
        assert!(display.contains("File: /proj/graphql.config.json"));
    }

    #[test]
    fn test_invalid_config_with_file() {
        let err = Error::invalid_config("projects.api.extensions", "expected a mapping")
            .in_file("/proj/.graphqlrc.yml");
        let display = format!("{}", err);

        assert!(display.contains("Invalid configuration"));
        assert!(display.contains("Path: projects.api.extensions"));
        assert!(display.contains("File: /proj/.graphqlrc.yml"));
        assert!(display.contains("expected a mapping"));
    }

    #[test]
    fn test_invalid_config_root_path() {
        let err = Error::invalid_config("", "expected a mapping");
        assert!(err.path.is_none());
    }

    #[test]
    fn test_schema_missing() {
        let err = Error::schema_missing("web")
            .with_path("projects.web.schema")
            .in_file("/proj/graphql.config.json");
        let display = format!("{}", err);

        assert!(display.contains("Project 'web' has no schema configured"));
        assert!(display.contains("Path: projects.web.schema"));
        assert!(display.contains("/proj/graphql.config.json"));
    }

    #[test]
    fn test_with_source_location_line_and_column() {
        let err = Error::parse("Unexpected `}`").with_source_location(SourceLocation {
            file: "schema.graphql".into(),
            line: Some(3),
            column: Some(7),
        });

        assert!(err.to_string().contains("schema.graphql:3:7"));
    }

    #[test]
    fn test_with_help() {
        let err = Error::schema("bad merge").with_help("Rename one of the types");
        assert!(err.to_string().contains("Help: Rename one of the types"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("Unexpected state");
        let display = format!("{}", err);

        assert!(display.contains("Internal error"));
        assert!(display.contains("Unexpected state"));
    }
}
