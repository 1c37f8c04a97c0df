//! GraphQL schema primitives
//!
//! Parsing, printing and merging of type definitions, plus [`GraphQLSchema`],
//! the validated structured form a project's schema is built into.
//!
//! Merge rules:
//! - same-named types of the same kind are combined; fields, input fields,
//!   enum values, union members, interfaces and directives are unioned by name
//! - a field declared twice with different types is an error
//! - `extend type` definitions are folded into their base type
//! - directive definitions are deduplicated by name, first one wins

use std::fmt;

use graphql_parser::schema::{
    Definition, Directive, DirectiveDefinition, Document, EnumValue, Field, InputValue,
    SchemaDefinition, Type, TypeDefinition, TypeExtension,
};
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::source::{Source, TypeDefs};

/// Scalars every schema has without declaring them
pub const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

type TypeDef = TypeDefinition<'static, String>;
type TypeExt = TypeExtension<'static, String>;

/// Output representation requested from a schema load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFormat {
    /// Validated [`GraphQLSchema`]
    #[default]
    Schema,
    /// Merged syntax tree
    Document,
    /// Printed SDL text
    Sdl,
}

/// A loaded schema in the requested representation
#[derive(Debug, Clone)]
pub enum SchemaOutput {
    Schema(GraphQLSchema),
    Document(TypeDefs),
    Sdl(String),
}

impl SchemaOutput {
    /// Render merged type definitions into `format`
    pub fn render(merged: TypeDefs, format: SchemaFormat) -> Result<Self> {
        Ok(match format {
            SchemaFormat::Schema => SchemaOutput::Schema(GraphQLSchema::build(&merged)?),
            SchemaFormat::Document => SchemaOutput::Document(merged),
            SchemaFormat::Sdl => SchemaOutput::Sdl(print_type_defs(&merged)),
        })
    }

    /// The representation this output is in
    pub fn format(&self) -> SchemaFormat {
        match self {
            SchemaOutput::Schema(_) => SchemaFormat::Schema,
            SchemaOutput::Document(_) => SchemaFormat::Document,
            SchemaOutput::Sdl(_) => SchemaFormat::Sdl,
        }
    }

    pub fn into_schema(self) -> Option<GraphQLSchema> {
        match self {
            SchemaOutput::Schema(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_document(self) -> Option<TypeDefs> {
        match self {
            SchemaOutput::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_sdl(self) -> Option<String> {
        match self {
            SchemaOutput::Sdl(s) => Some(s),
            _ => None,
        }
    }
}

/// Parse SDL text into type definitions
pub fn parse_type_defs(sdl: &str) -> Result<TypeDefs> {
    graphql_parser::parse_schema::<String>(sdl)
        .map(|doc| doc.into_static())
        .map_err(|e| Error::parse(e.to_string()))
}

/// Print type definitions as SDL text
pub fn print_type_defs(document: &TypeDefs) -> String {
    document.to_string()
}

/// Merge the type definitions of every type-system source.
///
/// Operation/fragment sources are skipped.
pub fn merge_sources(sources: &[Source]) -> Result<TypeDefs> {
    let documents = sources.iter().filter_map(|source| {
        if source.is_executable() {
            log::debug!("Skipping operations in '{}' while merging schema", source.location);
        }
        source.type_defs()
    });
    merge_type_defs(documents)
}

/// Merge several sets of type definitions into one
pub fn merge_type_defs<'a, I>(documents: I) -> Result<TypeDefs>
where
    I: IntoIterator<Item = &'a TypeDefs>,
{
    let mut schema_def: Option<SchemaDefinition<'static, String>> = None;
    let mut directives: IndexMap<String, DirectiveDefinition<'static, String>> = IndexMap::new();
    let mut types: IndexMap<String, TypeDef> = IndexMap::new();
    let mut extensions: Vec<TypeExt> = Vec::new();

    for document in documents {
        for definition in &document.definitions {
            match definition.clone() {
                Definition::SchemaDefinition(def) => merge_schema_definition(&mut schema_def, def)?,
                Definition::DirectiveDefinition(def) => {
                    directives.entry(def.name.clone()).or_insert(def);
                }
                Definition::TypeDefinition(def) => {
                    let name = type_name(&def).to_string();
                    match types.get_mut(&name) {
                        Some(existing) => merge_type(existing, def)?,
                        None => {
                            types.insert(name, def);
                        }
                    }
                }
                Definition::TypeExtension(ext) => extensions.push(ext),
            }
        }
    }

    let mut orphans = Vec::new();
    for ext in extensions {
        if let Some(orphan) = fold_extension(&mut types, ext)? {
            orphans.push(orphan);
        }
    }

    let mut definitions = Vec::new();
    definitions.extend(schema_def.map(Definition::SchemaDefinition));
    definitions.extend(directives.into_values().map(Definition::DirectiveDefinition));
    definitions.extend(types.into_values().map(Definition::TypeDefinition));
    definitions.extend(orphans.into_iter().map(Definition::TypeExtension));

    Ok(Document { definitions })
}

fn merge_schema_definition(
    target: &mut Option<SchemaDefinition<'static, String>>,
    incoming: SchemaDefinition<'static, String>,
) -> Result<()> {
    if let Some(existing) = target.as_mut() {
        merge_root(&mut existing.query, incoming.query, "query")?;
        merge_root(&mut existing.mutation, incoming.mutation, "mutation")?;
        merge_root(&mut existing.subscription, incoming.subscription, "subscription")?;
        merge_directives(&mut existing.directives, incoming.directives);
    } else {
        *target = Some(incoming);
    }
    Ok(())
}

fn merge_root(existing: &mut Option<String>, incoming: Option<String>, operation: &str) -> Result<()> {
    let Some(other) = incoming else {
        return Ok(());
    };
    if let Some(current) = existing.as_deref() {
        if current != other {
            return Err(Error::schema(format!(
                "Conflicting {} root types: \"{}\" and \"{}\"",
                operation, current, other
            )));
        }
        return Ok(());
    }
    *existing = Some(other);
    Ok(())
}

fn merge_type(existing: &mut TypeDef, incoming: TypeDef) -> Result<()> {
    match (existing, incoming) {
        (TypeDefinition::Object(base), TypeDefinition::Object(other)) => {
            fill_description(&mut base.description, other.description);
            merge_names(&mut base.implements_interfaces, other.implements_interfaces);
            merge_directives(&mut base.directives, other.directives);
            merge_fields(&base.name, &mut base.fields, other.fields)?;
        }
        (TypeDefinition::Interface(base), TypeDefinition::Interface(other)) => {
            fill_description(&mut base.description, other.description);
            merge_names(&mut base.implements_interfaces, other.implements_interfaces);
            merge_directives(&mut base.directives, other.directives);
            merge_fields(&base.name, &mut base.fields, other.fields)?;
        }
        (TypeDefinition::InputObject(base), TypeDefinition::InputObject(other)) => {
            fill_description(&mut base.description, other.description);
            merge_directives(&mut base.directives, other.directives);
            merge_input_values(&base.name, &mut base.fields, other.fields)?;
        }
        (TypeDefinition::Union(base), TypeDefinition::Union(other)) => {
            fill_description(&mut base.description, other.description);
            merge_directives(&mut base.directives, other.directives);
            merge_names(&mut base.types, other.types);
        }
        (TypeDefinition::Enum(base), TypeDefinition::Enum(other)) => {
            fill_description(&mut base.description, other.description);
            merge_directives(&mut base.directives, other.directives);
            merge_enum_values(&mut base.values, other.values);
        }
        (TypeDefinition::Scalar(base), TypeDefinition::Scalar(other)) => {
            fill_description(&mut base.description, other.description);
            merge_directives(&mut base.directives, other.directives);
        }
        (base, other) => {
            return Err(Error::schema(format!(
                "Unable to merge GraphQL type \"{}\": defined both as {} and as {}",
                type_name(base),
                kind_name(base),
                kind_name(&other)
            )));
        }
    }
    Ok(())
}

/// Fold an extension into its base type; hands the extension back if the
/// base type is not defined.
fn fold_extension(types: &mut IndexMap<String, TypeDef>, ext: TypeExt) -> Result<Option<TypeExt>> {
    let name = extension_name(&ext).to_string();
    let Some(base) = types.get_mut(&name) else {
        return Ok(Some(ext));
    };

    match (base, ext) {
        (TypeDefinition::Object(base), TypeExtension::Object(ext)) => {
            merge_names(&mut base.implements_interfaces, ext.implements_interfaces);
            merge_directives(&mut base.directives, ext.directives);
            merge_fields(&name, &mut base.fields, ext.fields)?;
        }
        (TypeDefinition::Interface(base), TypeExtension::Interface(ext)) => {
            merge_names(&mut base.implements_interfaces, ext.implements_interfaces);
            merge_directives(&mut base.directives, ext.directives);
            merge_fields(&name, &mut base.fields, ext.fields)?;
        }
        (TypeDefinition::InputObject(base), TypeExtension::InputObject(ext)) => {
            merge_directives(&mut base.directives, ext.directives);
            merge_input_values(&name, &mut base.fields, ext.fields)?;
        }
        (TypeDefinition::Union(base), TypeExtension::Union(ext)) => {
            merge_directives(&mut base.directives, ext.directives);
            merge_names(&mut base.types, ext.types);
        }
        (TypeDefinition::Enum(base), TypeExtension::Enum(ext)) => {
            merge_directives(&mut base.directives, ext.directives);
            merge_enum_values(&mut base.values, ext.values);
        }
        (TypeDefinition::Scalar(base), TypeExtension::Scalar(ext)) => {
            merge_directives(&mut base.directives, ext.directives);
        }
        (base, _) => {
            return Err(Error::schema(format!(
                "Cannot extend {} \"{}\" with an extension of a different kind",
                kind_name(base),
                name
            )));
        }
    }
    Ok(None)
}

fn merge_fields(
    owner: &str,
    base: &mut Vec<Field<'static, String>>,
    incoming: Vec<Field<'static, String>>,
) -> Result<()> {
    for field in incoming {
        match base.iter().position(|f| f.name == field.name) {
            Some(index) => {
                let existing = &mut base[index];
                let coordinate = format!("{}.{}", owner, field.name);
                if existing.field_type != field.field_type {
                    return Err(Error::schema(format!(
                        "Unable to merge GraphQL field `{}`: field already defined with a different type. \
                         Declared as \"{}\" and got \"{}\"",
                        coordinate,
                        type_ref(&existing.field_type),
                        type_ref(&field.field_type)
                    )));
                }
                fill_description(&mut existing.description, field.description);
                merge_directives(&mut existing.directives, field.directives);
                merge_input_values(&coordinate, &mut existing.arguments, field.arguments)?;
            }
            None => base.push(field),
        }
    }
    Ok(())
}

fn merge_input_values(
    owner: &str,
    base: &mut Vec<InputValue<'static, String>>,
    incoming: Vec<InputValue<'static, String>>,
) -> Result<()> {
    for value in incoming {
        match base.iter().position(|v| v.name == value.name) {
            Some(index) => {
                let existing = &mut base[index];
                if existing.value_type != value.value_type {
                    return Err(Error::schema(format!(
                        "Unable to merge GraphQL input value `{}.{}`: declared as \"{}\" and got \"{}\"",
                        owner,
                        value.name,
                        type_ref(&existing.value_type),
                        type_ref(&value.value_type)
                    )));
                }
                fill_description(&mut existing.description, value.description);
                merge_directives(&mut existing.directives, value.directives);
            }
            None => base.push(value),
        }
    }
    Ok(())
}

fn merge_enum_values(base: &mut Vec<EnumValue<'static, String>>, incoming: Vec<EnumValue<'static, String>>) {
    for value in incoming {
        match base.iter().position(|v| v.name == value.name) {
            Some(index) => {
                let existing = &mut base[index];
                fill_description(&mut existing.description, value.description);
                merge_directives(&mut existing.directives, value.directives);
            }
            None => base.push(value),
        }
    }
}

fn merge_names(base: &mut Vec<String>, incoming: Vec<String>) {
    for name in incoming {
        if !base.contains(&name) {
            base.push(name);
        }
    }
}

fn merge_directives(base: &mut Vec<Directive<'static, String>>, incoming: Vec<Directive<'static, String>>) {
    for directive in incoming {
        let present = base
            .iter()
            .any(|d| d.name == directive.name && d.arguments == directive.arguments);
        if !present {
            base.push(directive);
        }
    }
}

fn fill_description(base: &mut Option<String>, incoming: Option<String>) {
    if base.is_none() {
        *base = incoming;
    }
}

fn type_name(def: &TypeDef) -> &str {
    match def {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}

fn extension_name(ext: &TypeExt) -> &str {
    match ext {
        TypeExtension::Scalar(t) => &t.name,
        TypeExtension::Object(t) => &t.name,
        TypeExtension::Interface(t) => &t.name,
        TypeExtension::Union(t) => &t.name,
        TypeExtension::Enum(t) => &t.name,
        TypeExtension::InputObject(t) => &t.name,
    }
}

fn kind_name(def: &TypeDef) -> &'static str {
    match def {
        TypeDefinition::Scalar(_) => "scalar",
        TypeDefinition::Object(_) => "object type",
        TypeDefinition::Interface(_) => "interface",
        TypeDefinition::Union(_) => "union",
        TypeDefinition::Enum(_) => "enum",
        TypeDefinition::InputObject(_) => "input object",
    }
}

fn type_ref(ty: &Type<'static, String>) -> String {
    match ty {
        Type::NamedType(name) => name.clone(),
        Type::ListType(inner) => format!("[{}]", type_ref(inner)),
        Type::NonNullType(inner) => format!("{}!", type_ref(inner)),
    }
}

fn named_type<'t>(ty: &'t Type<'static, String>) -> &'t str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => named_type(inner),
    }
}

/// A merged, validated GraphQL schema
#[derive(Debug, Clone)]
pub struct GraphQLSchema {
    document: TypeDefs,
    /// Type name to index in `document.definitions`
    types: IndexMap<String, usize>,
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl GraphQLSchema {
    /// Build a schema from type definitions.
    ///
    /// The definitions are merged first, so repeated types and extensions are
    /// folded. Fails on extensions of undefined types, missing root types,
    /// and references to undefined types.
    pub fn build(document: &TypeDefs) -> Result<Self> {
        let document = merge_type_defs([document])?;

        let mut types = IndexMap::new();
        let mut schema_def = None;
        for (index, definition) in document.definitions.iter().enumerate() {
            match definition {
                Definition::TypeDefinition(def) => {
                    types.insert(type_name(def).to_string(), index);
                }
                Definition::SchemaDefinition(def) => schema_def = Some(def.clone()),
                Definition::TypeExtension(ext) => {
                    return Err(Error::schema(format!(
                        "Cannot extend type \"{}\" because it is not defined",
                        extension_name(ext)
                    )));
                }
                Definition::DirectiveDefinition(_) => {}
            }
        }

        let mut schema = Self {
            document,
            types,
            query: None,
            mutation: None,
            subscription: None,
        };

        match schema_def {
            Some(def) => {
                schema.query = def.query;
                schema.mutation = def.mutation;
                schema.subscription = def.subscription;
            }
            None => {
                schema.query = schema.conventional_root("Query");
                schema.mutation = schema.conventional_root("Mutation");
                schema.subscription = schema.conventional_root("Subscription");
            }
        }

        schema.check_roots()?;
        schema.check_references()?;
        Ok(schema)
    }

    fn conventional_root(&self, name: &str) -> Option<String> {
        match self.get_type(name) {
            Some(TypeDefinition::Object(_)) => Some(name.to_string()),
            _ => None,
        }
    }

    fn check_roots(&self) -> Result<()> {
        let roots = [
            ("query", &self.query),
            ("mutation", &self.mutation),
            ("subscription", &self.subscription),
        ];
        for (operation, root) in roots {
            let Some(name) = root else { continue };
            match self.get_type(name) {
                Some(TypeDefinition::Object(_)) => {}
                Some(other) => {
                    return Err(Error::schema(format!(
                        "{} root type \"{}\" must be an object type, found {}",
                        operation,
                        name,
                        kind_name(other)
                    )))
                }
                None => {
                    return Err(Error::schema(format!(
                        "{} root type \"{}\" is not defined",
                        operation, name
                    )))
                }
            }
        }
        Ok(())
    }

    fn check_references(&self) -> Result<()> {
        for definition in &self.document.definitions {
            match definition {
                Definition::TypeDefinition(TypeDefinition::Object(t)) => {
                    for interface in &t.implements_interfaces {
                        self.require_type(interface, &t.name)?;
                    }
                    self.check_fields(&t.name, &t.fields)?;
                }
                Definition::TypeDefinition(TypeDefinition::Interface(t)) => {
                    for interface in &t.implements_interfaces {
                        self.require_type(interface, &t.name)?;
                    }
                    self.check_fields(&t.name, &t.fields)?;
                }
                Definition::TypeDefinition(TypeDefinition::Union(t)) => {
                    for member in &t.types {
                        self.require_type(member, &t.name)?;
                    }
                }
                Definition::TypeDefinition(TypeDefinition::InputObject(t)) => {
                    for field in &t.fields {
                        self.require_type(
                            named_type(&field.value_type),
                            &format!("{}.{}", t.name, field.name),
                        )?;
                    }
                }
                Definition::DirectiveDefinition(d) => {
                    for arg in &d.arguments {
                        self.require_type(
                            named_type(&arg.value_type),
                            &format!("@{}({}:)", d.name, arg.name),
                        )?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn check_fields(&self, owner: &str, fields: &[Field<'static, String>]) -> Result<()> {
        for field in fields {
            let coordinate = format!("{}.{}", owner, field.name);
            self.require_type(named_type(&field.field_type), &coordinate)?;
            for arg in &field.arguments {
                self.require_type(
                    named_type(&arg.value_type),
                    &format!("{}({}:)", coordinate, arg.name),
                )?;
            }
        }
        Ok(())
    }

    fn require_type(&self, name: &str, referenced_by: &str) -> Result<()> {
        if self.has_type(name) {
            Ok(())
        } else {
            Err(Error::schema(format!(
                "Unknown type \"{}\" referenced by \"{}\"",
                name, referenced_by
            )))
        }
    }

    /// Check if a type is defined (built-in scalars always are)
    pub fn has_type(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || self.types.contains_key(name)
    }

    /// Get a type definition by name
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        let index = *self.types.get(name)?;
        match self.document.definitions.get(index) {
            Some(Definition::TypeDefinition(def)) => Some(def),
            _ => None,
        }
    }

    /// Names of the declared types, in definition order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Name of the query root type
    pub fn query_type(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Name of the mutation root type
    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation.as_deref()
    }

    /// Name of the subscription root type
    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription.as_deref()
    }

    /// The merged type definitions
    pub fn document(&self) -> &TypeDefs {
        &self.document
    }

    pub fn into_document(self) -> TypeDefs {
        self.document
    }

    /// Print as SDL
    pub fn print(&self) -> String {
        print_type_defs(&self.document)
    }
}

impl fmt::Display for GraphQLSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn sdl(text: &str) -> TypeDefs {
        parse_type_defs(text).unwrap()
    }

    fn field_names(schema: &GraphQLSchema, type_name: &str) -> Vec<String> {
        match schema.get_type(type_name) {
            Some(TypeDefinition::Object(t)) => t.fields.iter().map(|f| f.name.clone()).collect(),
            other => panic!("expected object type {}, got {:?}", type_name, other),
        }
    }

    #[test]
    fn test_merge_unions_object_fields() {
        let a = sdl("type Query { hello: String }");
        let b = sdl("type Query { world: Int }\ntype User { id: ID! }");

        let merged = merge_type_defs([&a, &b]).unwrap();
        let schema = GraphQLSchema::build(&merged).unwrap();

        assert_eq!(field_names(&schema, "Query"), vec!["hello", "world"]);
        assert_eq!(schema.type_names().collect::<Vec<_>>(), vec!["Query", "User"]);
    }

    #[test]
    fn test_merge_same_field_same_type_is_fine() {
        let a = sdl("type Query { hello: String }");
        let b = sdl("type Query { hello: String }");

        let merged = merge_type_defs([&a, &b]).unwrap();
        assert_eq!(print_type_defs(&merged), print_type_defs(&a));
    }

    #[test]
    fn test_merge_field_type_conflict() {
        let a = sdl("type Query { hello: String }");
        let b = sdl("type Query { hello: Int! }");

        let err = merge_type_defs([&a, &b]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Schema);
        let message = err.to_string();
        assert!(message.contains("Query.hello"));
        assert!(message.contains("\"String\""));
        assert!(message.contains("\"Int!\""));
    }

    #[test]
    fn test_merge_kind_conflict() {
        let a = sdl("type Thing { id: ID }");
        let b = sdl("enum Thing { A }");

        let err = merge_type_defs([&a, &b]).unwrap_err();
        assert!(err.to_string().contains("object type"));
        assert!(err.to_string().contains("enum"));
    }

    #[test]
    fn test_merge_folds_extensions() {
        let a = sdl("extend type Query { b: Int }");
        let b = sdl("type Query { a: Int }");

        let merged = merge_type_defs([&a, &b]).unwrap();
        assert_eq!(merged.definitions.len(), 1);

        let schema = GraphQLSchema::build(&merged).unwrap();
        assert_eq!(field_names(&schema, "Query"), vec!["a", "b"]);
    }

    #[test]
    fn test_orphan_extension_is_kept_but_not_buildable() {
        let doc = sdl("extend type Missing { a: Int }");

        let merged = merge_type_defs([&doc]).unwrap();
        assert!(matches!(merged.definitions[0], Definition::TypeExtension(_)));

        let err = GraphQLSchema::build(&merged).unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_merge_enums_and_unions() {
        let a = sdl("enum Role { ADMIN }\nunion Result = A\ntype A { id: ID }\ntype B { id: ID }");
        let b = sdl("enum Role { USER ADMIN }\nunion Result = B");

        let merged = merge_type_defs([&a, &b]).unwrap();
        let schema = GraphQLSchema::build(&merged).unwrap();

        match schema.get_type("Role") {
            Some(TypeDefinition::Enum(e)) => {
                let values: Vec<&str> = e.values.iter().map(|v| v.name.as_str()).collect();
                assert_eq!(values, vec!["ADMIN", "USER"]);
            }
            other => panic!("expected enum, got {:?}", other),
        }
        match schema.get_type("Result") {
            Some(TypeDefinition::Union(u)) => assert_eq!(u.types, vec!["A", "B"]),
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_interface_implements() {
        let a = sdl("interface Node { id: ID! }\ninterface Named { name: String }\ninterface Entity implements Node { id: ID! }");
        let b = sdl("interface Entity implements Named { name: String }");
        let c = sdl("interface Timestamped { at: String }\nextend interface Entity implements Timestamped { at: String }");

        let merged = merge_type_defs([&a, &b, &c]).unwrap();
        let schema = GraphQLSchema::build(&merged).unwrap();

        match schema.get_type("Entity") {
            Some(TypeDefinition::Interface(i)) => {
                assert_eq!(i.implements_interfaces, vec!["Node", "Named", "Timestamped"]);
            }
            other => panic!("expected interface, got {:?}", other),
        }
        assert!(print_type_defs(&merged).contains("interface Entity implements Node & Named & Timestamped"));
    }

    #[test]
    fn test_build_rejects_unknown_interface_on_interface() {
        let err = GraphQLSchema::build(&sdl("interface Entity implements Node { id: ID! }")).unwrap_err();
        assert!(err.to_string().contains("Unknown type \"Node\" referenced by \"Entity\""));
    }

    #[test]
    fn test_conflicting_schema_roots() {
        let a = sdl("schema { query: Q1 }\ntype Q1 { a: Int }");
        let b = sdl("schema { query: Q2 }\ntype Q2 { a: Int }");

        let err = merge_type_defs([&a, &b]).unwrap_err();
        assert!(err.to_string().contains("Conflicting query root types"));
    }

    #[test]
    fn test_build_conventional_roots() {
        let schema = GraphQLSchema::build(&sdl(
            "type Query { a: Int }\ntype Mutation { b: Int }",
        ))
        .unwrap();

        assert_eq!(schema.query_type(), Some("Query"));
        assert_eq!(schema.mutation_type(), Some("Mutation"));
        assert_eq!(schema.subscription_type(), None);
    }

    #[test]
    fn test_build_explicit_roots() {
        let schema =
            GraphQLSchema::build(&sdl("schema { query: Root }\ntype Root { a: Int }")).unwrap();
        assert_eq!(schema.query_type(), Some("Root"));

        let err = GraphQLSchema::build(&sdl("schema { query: Nope }")).unwrap_err();
        assert!(err.to_string().contains("\"Nope\" is not defined"));
    }

    #[test]
    fn test_build_rejects_unknown_types() {
        let err = GraphQLSchema::build(&sdl("type Query { user(id: ID!): User }")).unwrap_err();
        assert!(err
            .to_string()
            .contains("Unknown type \"User\" referenced by \"Query.user\""));

        let err = GraphQLSchema::build(&sdl("type Query { a(filter: Filter): Int }")).unwrap_err();
        assert!(err.to_string().contains("Query.a(filter:)"));
    }

    #[test]
    fn test_print_round_trip() {
        let doc = sdl(
            "type Query { users(first: Int = 10): [User!]! }\n\
             type User implements Node { id: ID! }\ninterface Node { id: ID! }",
        );

        let printed = print_type_defs(&merge_type_defs([&doc]).unwrap());
        let reprinted = print_type_defs(&parse_type_defs(&printed).unwrap());

        assert_eq!(printed, reprinted);
    }

    #[test]
    fn test_render_formats() {
        let merged = sdl("type Query { hello: String }");

        let sdl_out = SchemaOutput::render(merged.clone(), SchemaFormat::Sdl).unwrap();
        assert_eq!(sdl_out.format(), SchemaFormat::Sdl);
        let text = sdl_out.into_sdl().unwrap();
        assert!(text.contains("type Query"));
        assert!(text.contains("hello: String"));

        let doc = SchemaOutput::render(merged.clone(), SchemaFormat::Document)
            .unwrap()
            .into_document()
            .unwrap();
        assert_eq!(doc, merged);

        let schema = SchemaOutput::render(merged, SchemaFormat::Schema)
            .unwrap()
            .into_schema()
            .unwrap();
        assert_eq!(schema.query_type(), Some("Query"));
    }

    #[test]
    fn test_merge_sources_skips_operations() {
        let sources = vec![
            Source::parse("a.graphql", "type Query { a: Int }").unwrap(),
            Source::parse("q.graphql", "query { a }").unwrap(),
        ];

        let merged = merge_sources(&sources).unwrap();
        assert_eq!(merged.definitions.len(), 1);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_type_defs("type {").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }
}
