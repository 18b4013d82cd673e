//! Schema - Attribute and block schemas for resource types
//!
//! Providers describe each resource type as a tree of attributes and nested
//! blocks. The scaffold generator only reads these trees; they come from a
//! [`SchemaSource`], usually [`ProviderSchemas`] loaded from the JSON that
//! `terraform providers schema -json` prints.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::addrs::{ParseError, Provider, ResourceMode, try_parse_provider_source};
use crate::diagnostics::Diagnostic;

/// Attribute value type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "JsonValue")]
pub enum AttributeType {
    String,
    Number,
    Bool,
    /// Any type, decided at runtime
    #[default]
    Dynamic,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, AttributeType>),
    Tuple(Vec<AttributeType>),
}

impl AttributeType {
    /// Name shown to users, e.g. `string` or `map of list of number`
    pub fn friendly_name(&self) -> String {
        match self {
            AttributeType::String => "string".to_string(),
            AttributeType::Number => "number".to_string(),
            AttributeType::Bool => "bool".to_string(),
            AttributeType::Dynamic => "dynamic".to_string(),
            AttributeType::List(inner) => format!("list of {}", inner.friendly_name()),
            AttributeType::Set(inner) => format!("set of {}", inner.friendly_name()),
            AttributeType::Map(inner) => format!("map of {}", inner.friendly_name()),
            AttributeType::Object(_) => "object".to_string(),
            AttributeType::Tuple(_) => "tuple".to_string(),
        }
    }

    /// Decode the JSON type notation: `"string"`, `["list", "string"]`,
    /// `["object", {"a": "number"}]`, `["tuple", ["string", "bool"]]`.
    fn from_json(value: &JsonValue) -> Result<Self, String> {
        match value {
            JsonValue::String(name) => match name.as_str() {
                "string" => Ok(AttributeType::String),
                "number" => Ok(AttributeType::Number),
                "bool" => Ok(AttributeType::Bool),
                "dynamic" => Ok(AttributeType::Dynamic),
                other => Err(format!("unknown primitive type {:?}", other)),
            },
            JsonValue::Array(items) => match items.as_slice() {
                [JsonValue::String(kind), inner, ..] => match (kind.as_str(), inner) {
                    ("list", _) => Ok(AttributeType::List(Box::new(Self::from_json(inner)?))),
                    ("set", _) => Ok(AttributeType::Set(Box::new(Self::from_json(inner)?))),
                    ("map", _) => Ok(AttributeType::Map(Box::new(Self::from_json(inner)?))),
                    ("object", JsonValue::Object(fields)) => {
                        let mut attrs = BTreeMap::new();
                        for (name, field) in fields {
                            attrs.insert(name.clone(), Self::from_json(field)?);
                        }
                        Ok(AttributeType::Object(attrs))
                    }
                    ("tuple", JsonValue::Array(elems)) => Ok(AttributeType::Tuple(
                        elems.iter().map(Self::from_json).collect::<Result<_, _>>()?,
                    )),
                    (other, _) => Err(format!("unknown type constructor {:?}", other)),
                },
                _ => Err(format!("invalid type expression {}", value)),
            },
            _ => Err(format!("invalid type expression {}", value)),
        }
    }
}

impl TryFrom<JsonValue> for AttributeType {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.friendly_name())
    }
}

/// How many instances of a nested block (or nested attribute object) appear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    #[default]
    Single,
    Group,
    List,
    Set,
    Map,
}

/// Who supplies an attribute's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The user must set it
    Required,
    /// The user may set it
    Optional,
    /// Only the provider sets it
    Computed,
}

/// Object-typed attribute described by its own attribute map
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NestedAttributes {
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default)]
    pub nesting_mode: NestingMode,
}

/// Attribute schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type", default)]
    pub attr_type: AttributeType,
    #[serde(default)]
    pub nested_type: Option<NestedAttributes>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub deprecated: bool,
}

impl Attribute {
    pub fn new(attr_type: AttributeType) -> Self {
        Self {
            attr_type,
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn presence(&self) -> Presence {
        if self.required {
            Presence::Required
        } else if self.optional {
            Presence::Optional
        } else {
            Presence::Computed
        }
    }

    /// Friendly type name, taking nested attribute objects into account
    pub fn type_name(&self) -> String {
        match &self.nested_type {
            Some(nested) => match nested.nesting_mode {
                NestingMode::Single | NestingMode::Group => "object".to_string(),
                NestingMode::List => "list of object".to_string(),
                NestingMode::Set => "set of object".to_string(),
                NestingMode::Map => "map of object".to_string(),
            },
            None => self.attr_type.friendly_name(),
        }
    }
}

/// A configuration block: attributes plus nested block types
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default)]
    pub block_types: BTreeMap<String, NestedBlock>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn block(mut self, name: impl Into<String>, nested: NestedBlock) -> Self {
        self.block_types.insert(name.into(), nested);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// A nested block type and its cardinality
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NestedBlock {
    #[serde(default)]
    pub nesting_mode: NestingMode,
    #[serde(default)]
    pub block: Block,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
}

impl NestedBlock {
    pub fn new(nesting_mode: NestingMode, block: Block) -> Self {
        Self {
            nesting_mode,
            block,
            min_items: 0,
            max_items: 0,
        }
    }

    pub fn with_min_items(mut self, min_items: u64) -> Self {
        self.min_items = min_items;
        self
    }

    pub fn with_max_items(mut self, max_items: u64) -> Self {
        self.max_items = max_items;
        self
    }

    /// A block whose minimum cardinality forces at least one instance
    pub fn is_required(&self) -> bool {
        self.min_items > 0
    }
}

/// Versioned schema for one resource type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub block: Block,
}

/// Everything a single provider describes
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderSchema {
    /// Schema of the provider's own configuration block
    #[serde(default)]
    pub provider: Schema,
    #[serde(default)]
    pub resource_schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    pub data_source_schemas: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, type_name: impl Into<String>, block: Block) -> Self {
        self.resource_schemas
            .insert(type_name.into(), Schema { version: 0, block });
        self
    }

    pub fn data_source(mut self, type_name: impl Into<String>, block: Block) -> Self {
        self.data_source_schemas
            .insert(type_name.into(), Schema { version: 0, block });
        self
    }

    pub fn schema_for_resource_type(&self, mode: ResourceMode, type_name: &str) -> Option<&Block> {
        let schemas = match mode {
            ResourceMode::Managed => &self.resource_schemas,
            ResourceMode::Data => &self.data_source_schemas,
        };
        schemas.get(type_name).map(|schema| &schema.block)
    }
}

/// Schema loading error
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid provider address {key:?} in schema document: {cause}")]
    InvalidProviderKey { key: String, cause: ParseError },
}

/// Anything that can hand out provider schemas
pub trait SchemaSource {
    fn provider_schema(&self, provider: &Provider) -> Option<&ProviderSchema>;

    fn has_provider(&self, provider: &Provider) -> bool {
        self.provider_schema(provider).is_some()
    }

    fn resource_type_schema(
        &self,
        provider: &Provider,
        mode: ResourceMode,
        type_name: &str,
    ) -> Option<&Block> {
        self.provider_schema(provider)?
            .schema_for_resource_type(mode, type_name)
    }

    /// Like [`SchemaSource::resource_type_schema`], but explains a miss
    fn lookup(
        &self,
        provider: &Provider,
        mode: ResourceMode,
        type_name: &str,
    ) -> Result<&Block, Diagnostic> {
        let Some(schema) = self.provider_schema(provider) else {
            return Err(Diagnostic::error(
                "Missing provider schema",
                format!("No schema is available for provider {}", provider),
            ));
        };

        let kind = match mode {
            ResourceMode::Managed => "resource type",
            ResourceMode::Data => "data source",
        };
        schema
            .schema_for_resource_type(mode, type_name)
            .ok_or_else(|| {
                Diagnostic::error(
                    "Missing resource schema",
                    format!(
                        "Provider {} has no {} named {:?}",
                        provider.for_display(),
                        kind,
                        type_name
                    ),
                )
            })
    }
}

/// In-memory schema catalog keyed by provider address
#[derive(Debug, Clone, Default)]
pub struct ProviderSchemas {
    providers: HashMap<Provider, ProviderSchema>,
}

#[derive(Deserialize)]
struct SchemasDocument {
    #[serde(default)]
    format_version: Option<String>,
    #[serde(default)]
    provider_schemas: BTreeMap<String, ProviderSchema>,
}

impl ProviderSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: Provider, schema: ProviderSchema) {
        self.providers.insert(provider, schema);
    }

    pub fn with_provider(mut self, provider: Provider, schema: ProviderSchema) -> Self {
        self.insert(provider, schema);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider addresses in sorted order
    pub fn providers(&self) -> Vec<&Provider> {
        let mut providers: Vec<&Provider> = self.providers.keys().collect();
        providers.sort();
        providers
    }

    /// Load the document printed by `terraform providers schema -json`.
    ///
    /// Keys of `provider_schemas` are provider source strings and go through
    /// the same parser as user input.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: SchemasDocument = serde_json::from_str(json)?;
        debug!(
            "loading {} provider schema(s), format version {}",
            document.provider_schemas.len(),
            document.format_version.as_deref().unwrap_or("unknown")
        );

        let mut schemas = Self::new();
        for (key, schema) in document.provider_schemas {
            let provider = try_parse_provider_source(&key)
                .map_err(|cause| SchemaError::InvalidProviderKey { key, cause })?;
            debug!(
                "provider {} has {} resource type(s) and {} data source(s)",
                provider,
                schema.resource_schemas.len(),
                schema.data_source_schemas.len()
            );
            schemas.insert(provider, schema);
        }
        Ok(schemas)
    }
}

impl SchemaSource for ProviderSchemas {
    fn provider_schema(&self, provider: &Provider) -> Option<&ProviderSchema> {
        self.providers.get(provider)
    }
}
