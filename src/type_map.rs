//! Built-in type registry, per-backend type mappings and naming helpers.
//!
//! # Built-in types
//!
//! | Schema type | PHP    | TypeScript  |
//! |-------------|--------|-------------|
//! | `array`     | `array`  | `unknown[]` |
//! | `string`    | `string` | `string`    |
//! | `integer`   | `int`    | `number`    |
//! | `number`    | `int`    | `number`    |
//!
//! Any other type name is either a schema component (user-defined) or an
//! unresolved reference.

use std::collections::BTreeMap;
use std::fmt;

/// A primitive type every backend must know how to spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuiltInType {
    Array,
    String,
    Integer,
    Number,
}

impl BuiltInType {
    /// All built-in types, in registry order.
    pub const ALL: [BuiltInType; 4] = [
        BuiltInType::Array,
        BuiltInType::String,
        BuiltInType::Integer,
        BuiltInType::Number,
    ];

    /// Schema spelling of the type.
    pub fn name(self) -> &'static str {
        match self {
            BuiltInType::Array => "array",
            BuiltInType::String => "string",
            BuiltInType::Integer => "integer",
            BuiltInType::Number => "number",
        }
    }
}

impl fmt::Display for BuiltInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of type names treated as built-in for one generation run.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    built_ins: Vec<BuiltInType>,
}

impl TypeRegistry {
    /// A registry recognizing exactly the given built-ins.
    pub fn new(built_ins: impl IntoIterator<Item = BuiltInType>) -> Self {
        let mut list: Vec<BuiltInType> = Vec::new();
        for ty in built_ins {
            if !list.contains(&ty) {
                list.push(ty);
            }
        }
        Self { built_ins: list }
    }

    /// The standard registry: `array`, `string`, `integer`, `number`.
    pub fn standard() -> Self {
        Self::new(BuiltInType::ALL)
    }

    /// Resolve a schema type name to a registered built-in.
    pub fn lookup(&self, type_name: &str) -> Option<BuiltInType> {
        self.built_ins
            .iter()
            .copied()
            .find(|ty| ty.name() == type_name)
    }

    pub fn is_built_in(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    /// True iff the name is not in the built-in set.
    pub fn is_user_defined(&self, type_name: &str) -> bool {
        !self.is_built_in(type_name)
    }

    /// Registered built-ins, in registry order.
    pub fn built_ins(&self) -> &[BuiltInType] {
        &self.built_ins
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// A backend's spelling for each built-in type.
///
/// Lookups never fail loudly: a missing entry returns `None` and the backend
/// decides how to report it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapping {
    entries: BTreeMap<BuiltInType, String>,
}

impl TypeMapping {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the spelling of one built-in.
    pub fn with(mut self, ty: BuiltInType, syntax: impl Into<String>) -> Self {
        self.entries.insert(ty, syntax.into());
        self
    }

    /// Remove the spelling of one built-in.
    pub fn without(mut self, ty: BuiltInType) -> Self {
        self.entries.remove(&ty);
        self
    }

    /// Target-language spelling of a built-in.
    pub fn get(&self, ty: BuiltInType) -> Option<&str> {
        self.entries.get(&ty).map(String::as_str)
    }

    /// Built-ins of `registry` this mapping cannot spell.
    pub fn unmapped(&self, registry: &TypeRegistry) -> Vec<BuiltInType> {
        registry
            .built_ins()
            .iter()
            .copied()
            .filter(|ty| !self.entries.contains_key(ty))
            .collect()
    }
}

/// Convert a component key to PascalCase for class names.
///
/// Any non-alphanumeric character separates words; existing capitals inside a
/// word are kept:
/// - `"user_signed_up"` → `"UserSignedUp"`
/// - `"dog"` → `"Dog"`
/// - `"HTTPRequest"` → `"HTTPRequest"`
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .map(upper_case_first)
        .collect()
}

/// Upper-case the first character.
pub fn upper_case_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
    }
}

/// Lower-case the first character.
pub fn lower_case_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().to_string() + chars.as_str(),
    }
}

/// Class-name prefix for a channel.
///
/// `/`, `<`, `>` and `-` separate tokens; each token is upper-cased first and
/// the tokens are joined:
/// - `"user/signed-up"` → `"UserSignedUp"`
/// - `"pet/<petId>/adopted"` → `"PetPetIdAdopted"`
pub fn channel_class_prefix(channel: &str) -> String {
    channel
        .split(['/', '<', '>', '-', ' '])
        .map(upper_case_first)
        .collect()
}
