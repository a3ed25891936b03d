//! AsyncAPI document types and loading.
//!
//! Only the parts of an AsyncAPI 2.x document the generator reads are modeled:
//! servers, channels, security schemes and schema components. Every map whose
//! order is meaningful is an [`IndexMap`], so component and property
//! declaration order survives parsing.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::Accessibility;

/// Prefix of a `$ref` pointing at a schema component.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// A parsed AsyncAPI document.
#[derive(Debug, Deserialize)]
pub struct AsyncApiDocument {
    /// AsyncAPI specification version (e.g., `"2.6.0"`).
    pub asyncapi: String,

    /// Application metadata.
    pub info: Info,

    /// Servers keyed by name.
    #[serde(default)]
    pub servers: IndexMap<String, Server>,

    /// Channels keyed by channel name (e.g., `"user/signedup"`).
    #[serde(default)]
    pub channels: IndexMap<String, Channel>,

    /// Reusable components.
    #[serde(default)]
    pub components: Components,
}

/// Document `info` block.
#[derive(Debug, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A broker the application connects to.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub url: String,

    /// Protocol name (e.g., `"amqp"`).
    pub protocol: String,

    #[serde(default)]
    pub protocol_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Security requirements: each entry maps a scheme name to its scopes.
    #[serde(default)]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

/// A channel and the operations available on it.
#[derive(Debug, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub subscribe: Option<Operation>,

    #[serde(default)]
    pub publish: Option<Operation>,
}

/// A publish or subscribe operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    /// Message definition, kept opaque.
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

/// The `components` block.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Schema components keyed by name, in declaration order.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,

    /// Security schemes keyed by name.
    #[serde(default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// A security scheme definition.
#[derive(Debug, Deserialize)]
pub struct SecurityScheme {
    /// Scheme type (e.g., `"userPassword"`, `"X509"`).
    #[serde(rename = "type")]
    pub scheme_type: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// A JSON-Schema-style schema object, used both for components and properties.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Primitive type name (e.g., `"string"`, `"integer"`).
    #[serde(rename = "type", default)]
    pub schema_type: Option<String>,

    /// Reference to another component (`#/components/schemas/<key>`).
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,

    /// Composition list; a `$ref` member names the superclass.
    #[serde(default)]
    pub all_of: Vec<Schema>,

    /// Property whose value selects the concrete subclass.
    #[serde(default)]
    pub discriminator: Option<Discriminator>,

    /// Marks a property as the discriminator.
    #[serde(rename = "x-discriminator", default)]
    pub is_discriminator: bool,

    /// Field accessibility in generated classes (default: private).
    #[serde(rename = "x-accessibility", default)]
    pub accessibility: Option<Accessibility>,

    /// Namespace override for the generated class.
    #[serde(rename = "x-namespace", default)]
    pub namespace: Option<String>,
}

/// A discriminator declaration.
///
/// AsyncAPI uses a bare property name; OpenAPI-style documents use an object
/// with `propertyName`. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    Name(String),
    Object {
        #[serde(rename = "propertyName")]
        property_name: String,
    },
}

impl Discriminator {
    /// Name of the discriminating property.
    pub fn property_name(&self) -> &str {
        match self {
            Discriminator::Name(name) => name,
            Discriminator::Object { property_name } => property_name,
        }
    }
}

impl Schema {
    /// Component key referenced by this schema's `$ref`, if it is a component ref.
    pub fn component_ref(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
    }
}

impl AsyncApiDocument {
    /// Security schemes required by the named server, in requirement order.
    ///
    /// Requirement entries naming a scheme absent from `components` are skipped.
    pub fn server_security_schemes(&self, server: &str) -> Result<Vec<(&str, &SecurityScheme)>> {
        let Some(srv) = self.servers.get(server) else {
            return Err(Error::ServerNotFound {
                name: server.to_string(),
                available: self
                    .servers
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        };

        let mut schemes = Vec::new();
        for requirement in &srv.security {
            for name in requirement.keys() {
                let Some((key, scheme)) = self.components.security_schemes.get_key_value(name)
                else {
                    continue;
                };
                if !schemes.iter().any(|(n, _)| *n == key.as_str()) {
                    schemes.push((key.as_str(), scheme));
                }
            }
        }
        Ok(schemes)
    }
}

/// Parse an AsyncAPI document from JSON text.
pub fn parse_document(content: &str) -> Result<AsyncApiDocument> {
    let document: AsyncApiDocument = serde_json::from_str(content)?;
    Ok(document)
}

/// Load an AsyncAPI document from disk.
pub fn load_document(path: &Path) -> Result<AsyncApiDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(&content)
}
