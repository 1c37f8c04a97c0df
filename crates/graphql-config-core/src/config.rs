//! Top-level configuration: the set of named projects
//!
//! A raw configuration is either a single project
//!
//! ```yaml
//! schema: schema.graphql
//! documents: src/**/*.graphql
//! ```
//!
//! which becomes one project named `default`, or a multi-project mapping
//!
//! ```yaml
//! projects:
//!   api: { schema: api.graphql }
//!   web: { schema: web.graphql, include: ["src/**"] }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::extension::{ExtensionDeclaration, ExtensionRegistry};
use crate::project::{ProjectConfig, ProjectEntry};
use crate::validation;
use crate::value::Value;

/// Name of the project a single-project configuration produces
pub const DEFAULT_PROJECT: &str = "default";

/// A raw configuration together with the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    /// Path of the configuration file; relative pointers resolve against its directory
    pub filepath: PathBuf,
    /// The raw configuration value
    pub config: Value,
}

impl ConfigSource {
    pub fn new(filepath: impl Into<PathBuf>, config: Value) -> Self {
        Self {
            filepath: filepath.into(),
            config,
        }
    }
}

/// Normalized configuration owning its projects and extension registry
#[derive(Debug, Clone)]
pub struct Config {
    filepath: PathBuf,
    dirpath: PathBuf,
    projects: IndexMap<String, ProjectConfig>,
    extensions: Arc<ExtensionRegistry>,
}

impl Config {
    /// Build a configuration from a raw value and extension declarations.
    ///
    /// Declarations are registered first (the first one per name stays), then
    /// every project is created against the frozen registry.
    pub fn new(
        source: ConfigSource,
        extensions: Vec<Arc<dyn ExtensionDeclaration>>,
    ) -> Result<Self> {
        let ConfigSource { filepath, config } = source;
        validation::validate(&config, &filepath)?;

        let mut registry = ExtensionRegistry::new();
        for declaration in extensions {
            registry.register(declaration);
        }
        let registry = Arc::new(registry);

        let map = config.as_mapping().ok_or_else(|| {
            Error::invalid_config(
                "",
                format!("expected a mapping, found {}", config.type_name()),
            )
            .in_file(&filepath)
        })?;

        let mut projects = IndexMap::new();
        match map
            .get("projects")
            .and_then(Value::as_mapping)
            .filter(|p| !p.is_empty())
        {
            Some(raw_projects) => {
                for (name, raw) in raw_projects {
                    let entry = ProjectEntry::from_value(raw, &format!("projects.{}", name))
                        .map_err(|e| e.in_file(&filepath))?;
                    log::debug!("Configured project '{}' from {}", name, filepath.display());
                    projects.insert(
                        name.clone(),
                        ProjectConfig::new(name.as_str(), &filepath, entry, Arc::clone(&registry)),
                    );
                }
            }
            None => {
                if !map.get("schema").is_some_and(|s| !s.is_null()) {
                    return Err(Error::config_empty(&filepath));
                }
                let entry =
                    ProjectEntry::from_value(&config, "").map_err(|e| e.in_file(&filepath))?;
                log::debug!("Configured single project from {}", filepath.display());
                projects.insert(
                    DEFAULT_PROJECT.to_string(),
                    ProjectConfig::new(DEFAULT_PROJECT, &filepath, entry, Arc::clone(&registry)),
                );
            }
        }

        let dirpath = match filepath.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            filepath,
            dirpath,
            projects,
            extensions: registry,
        })
    }

    /// Parse JSON configuration text
    pub fn from_json(
        filepath: impl Into<PathBuf>,
        json: &str,
        extensions: Vec<Arc<dyn ExtensionDeclaration>>,
    ) -> Result<Self> {
        let filepath = filepath.into();
        let value: Value =
            serde_json::from_str(json).map_err(|e| Error::parse(e.to_string()).in_file(&filepath))?;
        Self::new(ConfigSource::new(filepath, value), extensions)
    }

    /// Parse YAML configuration text
    pub fn from_yaml(
        filepath: impl Into<PathBuf>,
        yaml: &str,
        extensions: Vec<Arc<dyn ExtensionDeclaration>>,
    ) -> Result<Self> {
        let filepath = filepath.into();
        let value: Value =
            serde_yaml::from_str(yaml).map_err(|e| Error::parse(e.to_string()).in_file(&filepath))?;
        Self::new(ConfigSource::new(filepath, value), extensions)
    }

    /// Path of the configuration file
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Directory of the configuration file
    pub fn dirpath(&self) -> &Path {
        &self.dirpath
    }

    /// The shared extension registry
    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Projects in declaration order
    pub fn projects(&self) -> impl Iterator<Item = &ProjectConfig> {
        self.projects.values()
    }

    /// Project names in declaration order
    pub fn project_names(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    /// Get a project by name; `None` or an empty name selects `default`
    pub fn get_project(&self, name: Option<&str>) -> Result<&ProjectConfig> {
        let name = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_PROJECT);
        self.projects
            .get(name)
            .ok_or_else(|| Error::project_not_found(name).in_file(&self.filepath))
    }

    /// Get the `default` project
    pub fn get_default(&self) -> Result<&ProjectConfig> {
        self.get_project(None)
    }

    /// Find the project a file belongs to.
    ///
    /// The first project (in declaration order) whose membership rules match
    /// wins. Failing that, the first project without `include`/`exclude`
    /// acts as a catch-all.
    pub fn get_project_for_file(&self, filepath: impl AsRef<Path>) -> Result<&ProjectConfig> {
        let filepath = filepath.as_ref();

        if let Some(project) = self.projects.values().find(|p| p.matches(filepath)) {
            log::debug!("File '{}' matched project '{}'", filepath.display(), project.name());
            return Ok(project);
        }

        if let Some(project) = self.projects.values().find(|p| !p.has_include_or_exclude()) {
            log::debug!(
                "File '{}' assigned to catch-all project '{}'",
                filepath.display(),
                project.name()
            );
            return Ok(project);
        }

        Err(Error::no_project_for_file(filepath).in_file(&self.filepath))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::extension::NamedExtension;
    use crate::schema::SchemaFormat;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const FILE: &str = "/proj/graphql.config.json";

    fn yaml_config(src: &str) -> Config {
        Config::from_yaml("/proj/.graphqlrc.yml", src, vec![]).unwrap()
    }

    fn json_config(src: &str) -> Config {
        Config::from_json(FILE, src, vec![]).unwrap()
    }

    #[test]
    fn test_single_project_is_default() {
        let config = json_config(r#"{"schema": "schema.graphql"}"#);

        assert_eq!(config.project_names(), vec!["default"]);
        let default = config.get_default().unwrap();
        assert!(std::ptr::eq(default, config.get_project(None).unwrap()));
        assert!(std::ptr::eq(default, config.get_project(Some("default")).unwrap()));
        assert!(std::ptr::eq(default, config.get_project(Some("")).unwrap()));
        assert_eq!(default.name(), "default");
        assert_eq!(config.dirpath(), Path::new("/proj"));
    }

    #[test]
    fn test_multi_project_lookup() {
        let config = yaml_config(
            "projects:\n  A: { schema: a.graphql }\n  B: { schema: b.graphql }\n",
        );

        let a = config.get_project(Some("A")).unwrap();
        let b = config.get_project(Some("B")).unwrap();
        assert_eq!(a.name(), "A");
        assert_eq!(b.name(), "B");
        assert!(!std::ptr::eq(a, b));

        let err = config.get_project(Some("C")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ProjectNotFound { .. }));
        assert!(err.to_string().contains("Project 'C' not found"));
        assert!(err.to_string().contains(".graphqlrc.yml"));
    }

    #[test]
    fn test_multi_project_without_default() {
        let config = yaml_config("projects:\n  api: { schema: api.graphql }\n");

        let err = config.get_default().unwrap_err();
        assert!(err.to_string().contains("Project 'default' not found"));
    }

    #[test]
    fn test_project_order_is_declaration_order() {
        let config = yaml_config(
            "projects:\n  zeta: { schema: z.graphql }\n  alpha: { schema: a.graphql }\n",
        );
        let names: Vec<&str> = config.projects().map(ProjectConfig::name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_configs() {
        for src in ["{}", r#"{"projects": {}}"#, r#"{"documents": "src/**"}"#] {
            let err = Config::from_json(FILE, src, vec![]).unwrap_err();
            assert_eq!(err.kind, ErrorKind::ConfigEmpty, "config: {}", src);
            assert!(err.to_string().contains(FILE));
        }
    }

    #[test]
    fn test_invalid_extensions_shape() {
        let err = Config::from_yaml(
            FILE,
            "projects:\n  api:\n    schema: api.graphql\n    extensions: true\n",
            vec![],
        )
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidConfig);
        assert_eq!(err.path.as_deref(), Some("projects.api.extensions"));
        assert!(err.to_string().contains(FILE));
    }

    #[test]
    fn test_parse_errors_name_file() {
        let err = Config::from_json(FILE, "{ not json", vec![]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.to_string().contains(FILE));

        let err = Config::from_yaml("/proj/.graphqlrc.yml", "schema: [a", vec![]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_config_source_constructor() {
        let raw: Value = serde_json::from_str(r#"{"schema": "schema.graphql"}"#).unwrap();
        let config = Config::new(ConfigSource::new(FILE, raw), vec![]).unwrap();

        assert_eq!(config.filepath(), Path::new(FILE));
        assert_eq!(config.get_default().unwrap().dirpath(), Path::new("/proj"));
    }

    #[test]
    fn test_project_for_file_scenario() {
        let config = json_config(
            r#"{"projects": {
                "api": {"schema": "api.graphql"},
                "web": {"schema": "web.graphql", "include": ["src/**"]}
            }}"#,
        );

        assert_eq!(config.get_project_for_file("src/app.ts").unwrap().name(), "web");
        assert_eq!(config.get_project_for_file("api.graphql").unwrap().name(), "api");
        assert_eq!(config.get_project_for_file("/proj/web.graphql").unwrap().name(), "web");
        // api declares no include/exclude, so it catches everything else
        assert_eq!(config.get_project_for_file("unrelated.txt").unwrap().name(), "api");
    }

    #[test]
    fn test_project_for_file_no_catch_all() {
        let config = json_config(
            r#"{"projects": {
                "api": {"schema": "api.graphql", "include": "api/**"},
                "web": {"schema": "web.graphql", "include": ["src/**"]}
            }}"#,
        );

        let err = config.get_project_for_file("unrelated.txt").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ProjectNotFound { .. }));
        assert!(err
            .to_string()
            .contains("File 'unrelated.txt' doesn't match any project"));
    }

    #[test]
    fn test_project_for_file_first_match_wins() {
        let config = yaml_config(
            "projects:\n  one: { schema: a.graphql, include: 'src/**' }\n  two: { schema: b.graphql, include: 'src/**' }\n",
        );

        assert_eq!(config.get_project_for_file("src/x.ts").unwrap().name(), "one");
    }

    #[test]
    fn test_project_for_file_exclude_then_catch_all() {
        let config = yaml_config(
            "projects:\n  web: { schema: web.graphql, include: 'src/**', exclude: 'src/legacy/**' }\n  rest: { schema: rest.graphql }\n",
        );

        assert_eq!(config.get_project_for_file("src/legacy/old.ts").unwrap().name(), "rest");
        assert_eq!(config.get_project_for_file("src/new.ts").unwrap().name(), "web");
    }

    #[test]
    fn test_dotfiles_are_members() {
        let config = yaml_config(
            "projects:\n  a: { schema: a.graphql, include: '*.graphql' }\n  b: { schema: b.graphql, include: 'other/**' }\n",
        );

        assert_eq!(config.get_project_for_file(".hidden.graphql").unwrap().name(), "a");
    }

    #[test]
    fn test_extensions_are_shared() {
        let config = Config::from_yaml(
            FILE,
            "projects:\n  api: { schema: api.graphql, extensions: { endpoints: { url: x } } }\n  web: { schema: web.graphql }\n",
            vec![
                Arc::new(NamedExtension::new("endpoints")),
                Arc::new(NamedExtension::new("endpoints")),
            ],
        )
        .unwrap();

        assert_eq!(config.extensions().names(), vec!["endpoints"]);

        let api = config.get_project(Some("api")).unwrap();
        assert!(api.has_extension("endpoints"));
        assert_eq!(api.extension("endpoints").unwrap().project, "api");

        let web = config.get_project(Some("web")).unwrap();
        assert!(!web.has_extension("endpoints"));
        assert!(web.extension("endpoints").unwrap().config.is_null());

        let err = web.extension("codegen").unwrap_err();
        assert!(err.to_string().contains("Project web is missing codegen extension"));
    }

    #[tokio::test]
    async fn test_default_schema_as_sdl() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.graphql"), "type Query { hello: String }").unwrap();

        let config = Config::from_json(
            dir.path().join("graphql.config.json"),
            r#"{"schema": "schema.graphql"}"#,
            vec![],
        )
        .unwrap();

        let sdl = config
            .get_default()
            .unwrap()
            .get_schema(SchemaFormat::Sdl)
            .await
            .unwrap()
            .into_sdl()
            .unwrap();

        assert!(sdl.contains("type Query"));
        assert!(sdl.contains("hello: String"));
    }

    #[tokio::test]
    async fn test_multi_project_loads_relative_to_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/schema.graphql"), "type Query { api: Int }").unwrap();
        fs::write(dir.path().join("web.graphql"), "type Query { web: Int }").unwrap();

        let config = Config::from_yaml(
            dir.path().join(".graphqlrc.yml"),
            "projects:\n  api: { schema: api/schema.graphql }\n  web: { schema: web.graphql }\n",
            vec![],
        )
        .unwrap();

        let api = config
            .get_project(Some("api"))
            .unwrap()
            .get_schema(SchemaFormat::Sdl)
            .await
            .unwrap()
            .into_sdl()
            .unwrap();
        assert!(api.contains("api: Int"));
        assert!(!api.contains("web: Int"));
    }

    #[test]
    fn test_numeric_and_boolean_project_names() {
        let config = yaml_config("projects:\n  2024: { schema: a.graphql }\n  true: { schema: b.graphql }\n");

        assert_eq!(config.project_names(), vec!["2024", "true"]);
        assert_eq!(config.get_project(Some("2024")).unwrap().name(), "2024");
        assert_eq!(config.get_project_for_file("b.graphql").unwrap().name(), "true");
    }

    #[test]
    fn test_brace_include_selects_project() {
        let config = yaml_config(
            "projects:\n  api: { schema: api.graphql }\n  web: { schema: web.graphql, include: 'src/**/*.{ts,tsx}' }\n",
        );

        assert_eq!(config.get_project_for_file("src/app.tsx").unwrap().name(), "web");
        assert_eq!(config.get_project_for_file("/proj/src/lib/util.ts").unwrap().name(), "web");
    }

    #[tokio::test]
    async fn test_project_error_paths_follow_config_shape() {
        let dir = TempDir::new().unwrap();

        let single = Config::from_yaml(dir.path().join(".graphqlrc.yml"), "schema: missing.graphql", vec![]).unwrap();
        let err = single.get_default().unwrap().get_schema(SchemaFormat::Sdl).await.unwrap_err();
        assert_eq!(err.path.as_deref(), Some("schema"));

        let multi = Config::from_yaml(
            dir.path().join(".graphqlrc.yml"),
            "projects:\n  api: { schema: missing.graphql }\n",
            vec![],
        )
        .unwrap();
        let err = multi.get_project(Some("api")).unwrap().get_schema(SchemaFormat::Sdl).await.unwrap_err();
        assert_eq!(err.path.as_deref(), Some("projects.api.schema"));
    }
}
