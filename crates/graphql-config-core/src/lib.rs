//! graphql-config-core: GraphQL project configuration
//!
//! This crate normalizes a GraphQL configuration (single- or multi-project)
//! into named projects, decides which project a file belongs to, loads and
//! merges project schemas and documents through pluggable loaders, and
//! attaches named extensions to projects.
//!
//! # Example
//!
//! ```rust
//! use graphql_config_core::Config;
//!
//! let yaml = r#"
//! projects:
//!   api:
//!     schema: api.graphql
//!   web:
//!     schema: web.graphql
//!     include: ["src/**"]
//! "#;
//!
//! let config = Config::from_yaml("/proj/.graphqlrc.yml", yaml, vec![]).unwrap();
//! assert_eq!(config.get_project_for_file("src/app.ts").unwrap().name(), "web");
//! assert_eq!(config.get_project_for_file("api.graphql").unwrap().name(), "api");
//! ```

pub mod error;
pub mod extension;
pub mod loader;
pub mod matcher;
pub mod pointer;
pub mod schema;
pub mod source;
pub mod validation;
pub mod value;

mod config;
mod project;

pub use config::{Config, ConfigSource, DEFAULT_PROJECT};
pub use error::{Error, ErrorKind, LoaderErrorKind, Result};
pub use extension::{ExtensionDeclaration, ExtensionRegistry, ExtensionView, NamedExtension};
pub use loader::{FileLoader, Loader, LoaderOptions, LoaderRegistry, StringLoader};
pub use pointer::Pointer;
pub use project::{ProjectConfig, ProjectEntry};
pub use schema::{GraphQLSchema, SchemaFormat, SchemaOutput};
pub use source::Source;
pub use value::{Mapping, Value};
