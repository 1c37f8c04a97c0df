//! Loader architecture
//!
//! Loaders turn a single resolved pointer into a [`Source`]. A
//! [`LoaderRegistry`] holds an ordered list of loaders and a base directory,
//! expands globs, unwraps configured pointers, and hands each concrete pointer
//! to the first loader that claims it and produces a result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use ignore::WalkBuilder;
use indexmap::IndexSet;

use crate::error::{Error, Result};
use crate::matcher;
use crate::pointer::{Pointer, MAX_POINTER_DEPTH};
use crate::source::Source;
use crate::value::{Mapping, Value};

/// File extensions claimed by [`FileLoader`]
pub const GRAPHQL_EXTENSIONS: &[&str] = &["graphql", "graphqls", "gql", "gqls"];

/// Characters that make a path segment a pattern rather than a literal name
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Options passed to loaders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoaderOptions {
    /// Base directory for relative pointers
    pub cwd: PathBuf,
    /// Loader-specific settings, e.g. from a configured pointer
    pub settings: Mapping,
}

impl LoaderOptions {
    /// Create options rooted at `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            settings: Mapping::new(),
        }
    }

    /// Add a setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Get a setting
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Copy of these options with `overlay` applied; overlay keys win.
    pub fn merged_with(&self, overlay: &Mapping) -> Self {
        let mut merged = self.clone();
        for (key, value) in overlay {
            merged.settings.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Resolve a pointer against `cwd`
    pub fn resolve_path(&self, pointer: &str) -> PathBuf {
        let path = Path::new(pointer);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Trait for loader implementations
#[async_trait]
pub trait Loader: Send + Sync {
    /// Stable identity used to deduplicate registrations
    fn loader_id(&self) -> &str;

    /// Whether this loader handles `pointer`; must not mutate state
    async fn can_load(&self, pointer: &str, options: &LoaderOptions) -> bool;

    /// Load the pointer; `Ok(None)` lets the next loader try
    async fn load(&self, pointer: &str, options: &LoaderOptions) -> Result<Option<Source>>;
}

/// Ordered collection of loaders bound to a base directory
#[derive(Clone)]
pub struct LoaderRegistry {
    loaders: Vec<Arc<dyn Loader>>,
    cwd: PathBuf,
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("loaders", &self.loader_ids())
            .field("cwd", &self.cwd)
            .finish()
    }
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            loaders: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Create a registry with the built-in file and string loaders
    pub fn with_builtins(cwd: impl Into<PathBuf>) -> Self {
        let mut registry = Self::new(cwd);
        registry.register(Arc::new(FileLoader));
        registry.register(Arc::new(StringLoader));
        registry
    }

    /// Register a loader. A loader whose id is already present is ignored.
    pub fn register(&mut self, loader: Arc<dyn Loader>) {
        if self.contains(loader.loader_id()) {
            log::trace!("Loader '{}' already registered", loader.loader_id());
            return;
        }
        self.loaders.push(loader);
    }

    /// Check if a loader id is registered
    pub fn contains(&self, loader_id: &str) -> bool {
        self.loaders.iter().any(|l| l.loader_id() == loader_id)
    }

    /// Registered loader ids, in priority order
    pub fn loader_ids(&self) -> Vec<&str> {
        self.loaders.iter().map(|l| l.loader_id()).collect()
    }

    /// Number of registered loaders
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Check if no loaders are registered
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Base directory for relative pointers and glob expansion
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Load every source a pointer refers to.
    ///
    /// Globs expand to files under `cwd`; configured pointers merge their
    /// options into `options`; literals go to the first loader that claims
    /// them and returns a source. Results keep pointer order.
    ///
    /// Only list nesting counts toward [`MAX_POINTER_DEPTH`], the same rule
    /// [`Pointer::from_value`] applies, so a classified pointer always loads
    /// without tripping the limit.
    ///
    /// The built-in [`FileLoader`] reads through `tokio::fs`, so this must be
    /// awaited inside a Tokio runtime when file pointers are involved.
    pub async fn load(&self, pointer: &Pointer, options: Option<LoaderOptions>) -> Result<Vec<Source>> {
        let mut options = options.unwrap_or_default();
        options.cwd = self.cwd.clone();
        self.load_at_depth(pointer, options, 0).await
    }

    fn load_at_depth<'a>(
        &'a self,
        pointer: &'a Pointer,
        options: LoaderOptions,
        depth: usize,
    ) -> BoxFuture<'a, Result<Vec<Source>>> {
        async move {
            if depth > MAX_POINTER_DEPTH {
                return Err(Error::invalid_config(
                    "",
                    format!(
                        "Pointer '{}' nests deeper than {} levels",
                        pointer, MAX_POINTER_DEPTH
                    ),
                ));
            }

            match pointer {
                Pointer::Glob(pattern) => {
                    let expanded: Vec<Pointer> = expand_glob(&self.cwd, pattern)?
                        .into_iter()
                        .map(Pointer::Literal)
                        .collect();
                    log::debug!("Glob '{}' matched {} file(s)", pattern, expanded.len());
                    self.load_all(&expanded, &options, depth).await
                }
                Pointer::Sequence(items) => self.load_all(items, &options, depth + 1).await,
                Pointer::Configured {
                    target,
                    options: inner,
                } => {
                    self.load_at_depth(target, options.merged_with(inner), depth)
                        .await
                }
                Pointer::Literal(pointer) => self.load_literal(pointer, &options).await,
            }
        }
        .boxed()
    }

    async fn load_all(
        &self,
        pointers: &[Pointer],
        options: &LoaderOptions,
        depth: usize,
    ) -> Result<Vec<Source>> {
        let results = try_join_all(
            pointers
                .iter()
                .map(|p| self.load_at_depth(p, options.clone(), depth)),
        )
        .await?;

        Ok(results.into_iter().flatten().collect())
    }

    async fn load_literal(&self, pointer: &str, options: &LoaderOptions) -> Result<Vec<Source>> {
        if self.loaders.is_empty() {
            return Err(Error::loaders_missing(pointer));
        }

        for loader in &self.loaders {
            if !loader.can_load(pointer, options).await {
                log::trace!("Loader '{}' declined '{}'", loader.loader_id(), pointer);
                continue;
            }
            if let Some(source) = loader.load(pointer, options).await? {
                log::trace!("Loader '{}' resolved '{}'", loader.loader_id(), pointer);
                return Ok(vec![source]);
            }
        }

        Err(Error::loader_no_result(pointer))
    }
}

/// Expand a glob relative to `cwd` into existing files, deduplicated, in
/// walk order (depth first, names sorted).
///
/// Dotfiles and dot-directories are skipped, unlike membership matching.
fn expand_glob(cwd: &Path, pattern: &str) -> Result<Vec<String>> {
    let (root, relative) = split_glob_root(cwd, &matcher::normalize(pattern));
    let glob = matcher::compile(&relative).map_err(|e| {
        Error::invalid_config("", format!("Invalid glob pattern '{}': {}", pattern, e))
    })?;

    let mut builder = WalkBuilder::new(&root);
    builder
        .standard_filters(false)
        .hidden(true)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b));
    if !relative.contains("**") {
        builder.max_depth(Some(relative.split('/').count()));
    }

    let mut files = IndexSet::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable glob entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(&root) else {
            continue;
        };
        if glob.is_match(rel) {
            files.insert(path.to_string_lossy().into_owned());
        }
    }

    Ok(files.into_iter().collect())
}

/// Split a normalized pattern into the directory to walk (its leading literal
/// segments resolved against `cwd`) and the remaining pattern. The last
/// segment always stays in the pattern.
fn split_glob_root(cwd: &Path, pattern: &str) -> (PathBuf, String) {
    let mut root = if pattern.starts_with('/') {
        PathBuf::from("/")
    } else {
        cwd.to_path_buf()
    };

    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let literal = segments
        .iter()
        .take_while(|s| !s.contains(GLOB_META))
        .count()
        .min(segments.len().saturating_sub(1));

    for segment in &segments[..literal] {
        root.push(segment);
    }
    (root, segments[literal..].join("/"))
}

/// Built-in loader for `.graphql`/`.gql` files on disk.
///
/// Reads through `tokio::fs` and needs a running Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl FileLoader {
    fn has_graphql_extension(pointer: &str) -> bool {
        Path::new(pointer)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| GRAPHQL_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Loader for FileLoader {
    fn loader_id(&self) -> &str {
        "file"
    }

    async fn can_load(&self, pointer: &str, options: &LoaderOptions) -> bool {
        if !Self::has_graphql_extension(pointer) {
            return false;
        }
        tokio::fs::metadata(options.resolve_path(pointer))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn load(&self, pointer: &str, options: &LoaderOptions) -> Result<Option<Source>> {
        let path = options.resolve_path(pointer);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::io(&path, format!("Failed to read '{}': {}", pointer, e)))?;

        Source::parse(path.display().to_string(), raw).map(Some)
    }
}

/// Built-in loader for pointers that are GraphQL text themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLoader;

#[async_trait]
impl Loader for StringLoader {
    fn loader_id(&self) -> &str {
        "string"
    }

    async fn can_load(&self, pointer: &str, _options: &LoaderOptions) -> bool {
        Source::parse("inline", pointer)
            .map(|source| !source.is_empty())
            .unwrap_or(false)
    }

    async fn load(&self, pointer: &str, _options: &LoaderOptions) -> Result<Option<Source>> {
        Source::parse("inline", pointer).map(Some)
    }
}
