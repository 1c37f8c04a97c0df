//! Extension registry
//!
//! Extensions are named, pluggable blocks attached to projects through the
//! `extensions` map of the configuration. A [`Config`](crate::Config) holds
//! one [`ExtensionRegistry`], populated at construction and shared read-only
//! with every project.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::loader::Loader;
use crate::pointer::Pointer;
use crate::value::{Mapping, Value};

/// Declaration of an extension, registered under its name
pub trait ExtensionDeclaration: Send + Sync {
    /// Name the extension is registered and referenced under
    fn name(&self) -> &str;

    /// Loaders added to every project's schema registry
    fn schema_loaders(&self) -> Vec<Arc<dyn Loader>> {
        Vec::new()
    }

    /// Loaders added to every project's documents registry
    fn document_loaders(&self) -> Vec<Arc<dyn Loader>> {
        Vec::new()
    }
}

/// A declaration that only reserves a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExtension {
    name: String,
}

impl NamedExtension {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ExtensionDeclaration for NamedExtension {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of extension declarations, keyed by name in registration order
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: IndexMap<String, Arc<dyn ExtensionDeclaration>>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.names())
            .finish()
    }
}

impl ExtensionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. The first declaration for a name stays; later
    /// ones are ignored.
    pub fn register(&mut self, declaration: Arc<dyn ExtensionDeclaration>) {
        let name = declaration.name().to_string();
        if self.extensions.contains_key(&name) {
            log::warn!(
                "Extension '{}' is already registered; ignoring the later declaration",
                name
            );
            return;
        }
        self.extensions.insert(name, declaration);
    }

    /// Register a declaration, replacing an existing one when `force` is set.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(Error)` if force=false and the name is taken
    pub fn register_with_force(
        &mut self,
        declaration: Arc<dyn ExtensionDeclaration>,
        force: bool,
    ) -> Result<()> {
        let name = declaration.name().to_string();
        if !force && self.extensions.contains_key(&name) {
            return Err(Error::extension_already_registered(&name));
        }
        self.extensions.insert(name, declaration);
        Ok(())
    }

    /// Get a declaration by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ExtensionDeclaration>> {
        self.extensions.get(name)
    }

    /// Check if an extension is registered
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.extensions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Schema loaders contributed by all declarations, in registration order
    pub fn schema_loaders(&self) -> Vec<Arc<dyn Loader>> {
        self.extensions
            .values()
            .flat_map(|d| d.schema_loaders())
            .collect()
    }

    /// Document loaders contributed by all declarations, in registration order
    pub fn document_loaders(&self) -> Vec<Arc<dyn Loader>> {
        self.extensions
            .values()
            .flat_map(|d| d.document_loaders())
            .collect()
    }
}

/// A project's view of one extension: the registered declaration, the
/// project's payload for it, and the project's pointer fields.
#[derive(Clone)]
pub struct ExtensionView {
    pub name: String,
    pub project: String,
    /// Dotted location of the payload, e.g. `projects.api.extensions.endpoints`
    pub key_path: String,
    pub declaration: Arc<dyn ExtensionDeclaration>,
    /// The project's `extensions.<name>` value (`Null` when absent)
    pub config: Value,
    pub schema: Option<Pointer>,
    pub documents: Option<Pointer>,
    pub include: Option<Pointer>,
    pub exclude: Option<Pointer>,
}

impl fmt::Debug for ExtensionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionView")
            .field("name", &self.name)
            .field("project", &self.project)
            .field("key_path", &self.key_path)
            .field("config", &self.config)
            .field("schema", &self.schema)
            .field("documents", &self.documents)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .finish()
    }
}

impl ExtensionView {
    /// Flatten into one mapping: the payload's keys, then the pointer fields.
    /// Pointer fields overwrite payload keys of the same name.
    pub fn to_value(&self) -> Value {
        let mut merged = Value::Mapping(Mapping::new());
        if self.config.is_mapping() {
            merged.merge_shallow(self.config.clone());
        }

        let mut pointers = Mapping::new();
        let fields = [
            ("schema", &self.schema),
            ("documents", &self.documents),
            ("include", &self.include),
            ("exclude", &self.exclude),
        ];
        for (key, pointer) in fields {
            if let Some(pointer) = pointer {
                pointers.insert(key.to_string(), pointer.to_value());
            }
        }
        merged.merge_shallow(Value::Mapping(pointers));

        merged
    }

    /// Deserialize the flattened view into a caller type
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_value().to_json())
            .map_err(|e| Error::invalid_config(&self.key_path, e.to_string()))
    }
}
