//! A single project: its pointers, membership rules and loading entry points

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::extension::{ExtensionRegistry, ExtensionView};
use crate::loader::LoaderRegistry;
use crate::matcher;
use crate::pointer::Pointer;
use crate::schema::{merge_sources, SchemaFormat, SchemaOutput};
use crate::source::Source;
use crate::value::{Mapping, Value};

/// Pointer fields and extension payloads of one project, already classified
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectEntry {
    pub schema: Option<Pointer>,
    pub documents: Option<Pointer>,
    pub include: Option<Pointer>,
    pub exclude: Option<Pointer>,
    pub extensions: Mapping,
    /// Location of the project mapping in the configuration; empty for a
    /// single-project configuration
    pub key_path: String,
}

/// Join a key onto a dotted key path that may be empty
fn join_key(key_path: &str, key: &str) -> String {
    if key_path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", key_path, key)
    }
}

impl ProjectEntry {
    /// Classify a raw project mapping.
    ///
    /// `key_path` is the location of the mapping in the configuration
    /// (empty for a single-project configuration) and prefixes error paths.
    pub fn from_value(value: &Value, key_path: &str) -> Result<Self> {
        let at = |key: &str| join_key(key_path, key);

        let map = value.as_mapping().ok_or_else(|| {
            Error::invalid_config(
                key_path,
                format!("expected a mapping, found {}", value.type_name()),
            )
        })?;

        let pointer = |key: &str| -> Result<Option<Pointer>> {
            match map.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(raw) => Pointer::from_value(raw)
                    .map(Some)
                    .map_err(|e| Error::invalid_config(at(key), e.to_string())),
            }
        };

        let extensions = match map.get("extensions") {
            None | Some(Value::Null) => Mapping::new(),
            Some(Value::Mapping(m)) => m.clone(),
            Some(other) => {
                return Err(Error::invalid_config(
                    at("extensions"),
                    format!("expected a mapping, found {}", other.type_name()),
                ))
            }
        };

        Ok(Self {
            schema: pointer("schema")?,
            documents: pointer("documents")?,
            include: pointer("include")?,
            exclude: pointer("exclude")?,
            extensions,
            key_path: key_path.to_string(),
        })
    }
}

/// One named project of a configuration
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    name: String,
    filepath: PathBuf,
    dirpath: PathBuf,
    schema: Option<Pointer>,
    documents: Option<Pointer>,
    include: Option<Pointer>,
    exclude: Option<Pointer>,
    extensions: Mapping,
    key_path: String,
    registry: Arc<ExtensionRegistry>,
    schema_loaders: LoaderRegistry,
    document_loaders: LoaderRegistry,
}

impl ProjectConfig {
    /// Create a project owned by the configuration at `filepath`.
    ///
    /// Both loader registries get the built-in loaders followed by every
    /// loader the registered extensions contribute.
    pub fn new(
        name: impl Into<String>,
        filepath: impl Into<PathBuf>,
        entry: ProjectEntry,
        registry: Arc<ExtensionRegistry>,
    ) -> Self {
        let filepath = filepath.into();
        let dirpath = match filepath.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut schema_loaders = LoaderRegistry::with_builtins(&dirpath);
        for loader in registry.schema_loaders() {
            schema_loaders.register(loader);
        }
        let mut document_loaders = LoaderRegistry::with_builtins(&dirpath);
        for loader in registry.document_loaders() {
            document_loaders.register(loader);
        }

        Self {
            name: name.into(),
            filepath,
            dirpath,
            schema: entry.schema,
            documents: entry.documents,
            include: entry.include,
            exclude: entry.exclude,
            extensions: entry.extensions,
            key_path: entry.key_path,
            registry,
            schema_loaders,
            document_loaders,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the configuration file declaring this project
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Directory relative pointers resolve against
    pub fn dirpath(&self) -> &Path {
        &self.dirpath
    }

    pub fn schema(&self) -> Option<&Pointer> {
        self.schema.as_ref()
    }

    pub fn documents(&self) -> Option<&Pointer> {
        self.documents.as_ref()
    }

    pub fn include(&self) -> Option<&Pointer> {
        self.include.as_ref()
    }

    pub fn exclude(&self) -> Option<&Pointer> {
        self.exclude.as_ref()
    }

    /// Raw `extensions` map
    pub fn extensions(&self) -> &Mapping {
        &self.extensions
    }

    /// Dotted location of the project in its configuration, e.g.
    /// `projects.api`; empty for a single-project configuration
    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    pub fn schema_loaders(&self) -> &LoaderRegistry {
        &self.schema_loaders
    }

    pub fn document_loaders(&self) -> &LoaderRegistry {
        &self.document_loaders
    }

    /// Check if the project declares `include` or `exclude`
    pub fn has_include_or_exclude(&self) -> bool {
        self.include.is_some() || self.exclude.is_some()
    }

    /// Check if `extensions.<name>` is set to a truthy value
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.get(name).is_some_and(Value::is_truthy)
    }

    /// Resolve an extension against the shared registry and combine it with
    /// this project's payload and pointer fields.
    pub fn extension(&self, name: &str) -> Result<ExtensionView> {
        let declaration = self
            .registry
            .get(name)
            .ok_or_else(|| Error::extension_missing(&self.name, name).in_file(&self.filepath))?;

        let config = self.extensions.get(name).cloned().unwrap_or_default();
        if !matches!(config, Value::Null | Value::Bool(_) | Value::Mapping(_)) {
            return Err(Error::invalid_config(
                join_key(&self.key_path, &format!("extensions.{}", name)),
                format!("expected a mapping, found {}", config.type_name()),
            )
            .in_file(&self.filepath));
        }

        Ok(ExtensionView {
            name: name.to_string(),
            project: self.name.clone(),
            key_path: join_key(&self.key_path, &format!("extensions.{}", name)),
            declaration: Arc::clone(declaration),
            config,
            schema: self.schema.clone(),
            documents: self.documents.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        })
    }

    /// Deserialize an extension's combined view into a caller type
    pub fn extension_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.extension(name)?
            .deserialize()
            .map_err(|e| e.in_file(&self.filepath))
    }

    /// Load and merge the project's schema in the requested format.
    ///
    /// File pointers are read through `tokio::fs`; await this inside a Tokio
    /// runtime.
    pub async fn get_schema(&self, format: SchemaFormat) -> Result<SchemaOutput> {
        let path = join_key(&self.key_path, "schema");
        let pointer = self.schema.as_ref().ok_or_else(|| {
            Error::schema_missing(&self.name)
                .with_path(path.clone())
                .in_file(&self.filepath)
        })?;

        self.load_schema(pointer, format).await.map_err(|e| {
            if e.path.is_none() {
                e.with_path(path)
            } else {
                e
            }
        })
    }

    /// Load and merge the type definitions `pointer` refers to.
    ///
    /// Operation and fragment sources are dropped before merging. Needs a
    /// Tokio runtime, like [`ProjectConfig::get_schema`].
    pub async fn load_schema(&self, pointer: &Pointer, format: SchemaFormat) -> Result<SchemaOutput> {
        let sources = self.schema_loaders.load(pointer, None).await?;
        log::debug!(
            "Project '{}' loaded {} schema source(s) from {}",
            self.name,
            sources.len(),
            pointer
        );
        let merged = merge_sources(&sources)?;
        SchemaOutput::render(merged, format)
    }

    /// Load the project's documents; empty when none are configured.
    ///
    /// File pointers are read through `tokio::fs`; await this inside a Tokio
    /// runtime.
    pub async fn get_documents(&self) -> Result<Vec<Source>> {
        match &self.documents {
            Some(pointer) => self.load_documents(pointer).await,
            None => Ok(Vec::new()),
        }
    }

    /// Load the documents `pointer` refers to; needs a Tokio runtime
    pub async fn load_documents(&self, pointer: &Pointer) -> Result<Vec<Source>> {
        self.document_loaders.load(pointer, None).await
    }

    /// Check whether a file belongs to this project.
    ///
    /// Schema and documents membership wins over `exclude`; otherwise the
    /// file must escape `exclude` and hit `include`.
    pub fn matches(&self, filepath: impl AsRef<Path>) -> bool {
        let filepath = filepath.as_ref();
        let hits = |pointer: &Option<Pointer>| {
            pointer
                .as_ref()
                .is_some_and(|p| matcher::matches(filepath, &self.dirpath, p))
        };

        if hits(&self.schema) || hits(&self.documents) {
            return true;
        }
        if hits(&self.exclude) {
            return false;
        }
        hits(&self.include)
    }
}
