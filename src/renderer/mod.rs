//! Class renderers.
//!
//! A [`ClassRenderer`] turns one [`Class`] of a [`ClassModel`] into text
//! fragments for one target language; [`ClassFragments`] collects them and
//! the renderer's [`assemble`](ClassRenderer::assemble) lays them out as a
//! file. Renderers only read the model.
//!
//! # Adding a backend
//!
//! ```ignore
//! use asyncapi_class_gen::renderer::{ClassFragments, ClassRenderer};
//!
//! struct KotlinRenderer { mapping: TypeMapping }
//!
//! impl ClassRenderer for KotlinRenderer {
//!     fn name(&self) -> &'static str { "kotlin" }
//!     fn type_mapping(&self) -> &TypeMapping { &self.mapping }
//!     fn file_name(&self, class: &Class) -> String { format!("{}.kt", class.name()) }
//!     // ... one method per fragment ...
//! }
//! ```

pub mod php;
pub mod typescript;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;

pub use php::PhpRenderer;
pub use typescript::TypeScriptRenderer;

use crate::error::{Error, Result};
use crate::model::{Class, ClassModel, InstanceVariable, TypeRef};
use crate::type_map::TypeMapping;

/// The fragment capabilities a target-language backend provides.
pub trait ClassRenderer: Send + Sync {
    /// Backend identifier used in diagnostics (e.g., `"php"`).
    fn name(&self) -> &'static str;

    /// Spelling of built-in types in the target language.
    fn type_mapping(&self) -> &TypeMapping;

    /// Text placed before everything else in the file.
    fn preamble(&self, class: &Class) -> String;

    /// Modifiers placed before the `class` keyword.
    fn access_modifiers(&self, class: &Class) -> Vec<String>;

    fn class_name(&self, class: &Class) -> String;

    /// Output path relative to the output directory. Must depend only on the
    /// class.
    fn file_path(&self, class: &Class) -> String {
        self.file_name(class)
    }

    fn file_name(&self, class: &Class) -> String;

    fn namespace_block(&self, class: &Class) -> String;

    /// Import statements for the superclass and every user-defined field type,
    /// deduplicated, in first-seen order.
    fn uses_block(&self, model: &ClassModel, class: &Class) -> String;

    /// Doc comment wrapping the class annotations.
    fn class_comment(&self, model: &ClassModel, class: &Class) -> Result<String>;

    fn class_annotations(&self, model: &ClassModel, class: &Class) -> Result<String>;

    fn extends_clause(&self, model: &ClassModel, class: &Class) -> String;

    /// Field declarations for the class's non-discriminator members.
    fn instance_variables_block(&self, class: &Class) -> Result<String>;

    fn constructor_block(&self, model: &ClassModel, class: &Class) -> Result<String>;

    /// Getter/setter pairs for private non-discriminator members only.
    fn accessors_block(&self, class: &Class) -> Result<String>;

    /// Target-language type of a variable: built-ins through
    /// [`type_mapping`](Self::type_mapping), classes by their own name.
    fn variable_type(&self, variable: &InstanceVariable) -> Result<String> {
        match variable.ty() {
            TypeRef::BuiltIn(ty) => self
                .type_mapping()
                .get(*ty)
                .map(str::to_string)
                .ok_or_else(|| Error::UnmappedBuiltIn {
                    backend: self.name().to_string(),
                    type_name: ty.name().to_string(),
                }),
            TypeRef::UserDefined { name, .. } => Ok(name.clone()),
        }
    }

    /// Lay the fragments out as a complete file.
    fn assemble(&self, fragments: &ClassFragments) -> String;
}

/// Every fragment of one class, ready to be assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassFragments {
    pub preamble: String,
    pub access_modifiers: Vec<String>,
    pub class_name: String,
    pub namespace: String,
    pub uses: String,
    pub comment: String,
    pub extends: String,
    pub instance_variables: String,
    pub constructor: String,
    pub accessors: String,
}

impl ClassFragments {
    /// Ask `renderer` for every fragment of `class`.
    pub fn render(renderer: &dyn ClassRenderer, model: &ClassModel, class: &Class) -> Result<Self> {
        Ok(Self {
            preamble: renderer.preamble(class),
            access_modifiers: renderer.access_modifiers(class),
            class_name: renderer.class_name(class),
            namespace: renderer.namespace_block(class),
            uses: renderer.uses_block(model, class),
            comment: renderer.class_comment(model, class)?,
            extends: renderer.extends_clause(model, class),
            instance_variables: renderer.instance_variables_block(class)?,
            constructor: renderer.constructor_block(model, class)?,
            accessors: renderer.accessors_block(class)?,
        })
    }

    /// `modifiers class Name extends Super`, without the body.
    pub fn declaration(&self) -> String {
        let mut parts: Vec<&str> = self.access_modifiers.iter().map(String::as_str).collect();
        parts.push("class");
        parts.push(&self.class_name);
        if !self.extends.is_empty() {
            parts.push(&self.extends);
        }
        parts.join(" ")
    }

    /// Field, constructor and accessor blocks separated by blank lines.
    pub fn body(&self) -> String {
        join_blocks(
            [
                self.instance_variables.as_str(),
                self.constructor.as_str(),
                self.accessors.as_str(),
            ],
            "\n\n",
        )
    }
}

/// A class some other class needs to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference<'m> {
    pub name: &'m str,
    pub package: &'m str,
}

/// Classes `class` refers to: its superclass first, then the types of its
/// non-discriminator members, deduplicated in first-seen order. The class
/// itself is never included.
pub fn referenced_classes<'m>(model: &'m ClassModel, class: &'m Class) -> IndexSet<Reference<'m>> {
    let mut refs = IndexSet::new();
    if let Some(super_class) = model.super_class(class) {
        refs.insert(Reference {
            name: super_class.name(),
            package: super_class.package(),
        });
    }
    for variable in class.declared_members() {
        if let TypeRef::UserDefined { name, package } = variable.ty() {
            if name == class.name() && package == class.package() {
                continue;
            }
            refs.insert(Reference { name, package });
        }
    }
    refs
}

/// Join the non-empty blocks with `separator`.
pub fn join_blocks<'a>(blocks: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    blocks
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Target languages with a built-in backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Php,
    TypeScript,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Php, Target::TypeScript];

    pub fn name(self) -> &'static str {
        match self {
            Target::Php => "php",
            Target::TypeScript => "typescript",
        }
    }

    /// A renderer for this target with its default type mapping.
    pub fn renderer(self) -> Box<dyn ClassRenderer> {
        match self {
            Target::Php => Box::new(PhpRenderer::new()),
            Target::TypeScript => Box::new(TypeScriptRenderer::new()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "php" => Ok(Target::Php),
            "typescript" | "ts" => Ok(Target::TypeScript),
            _ => Err(Error::UnknownTarget {
                name: s.to_string(),
                available: Target::ALL
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

/// Look a backend up by target name.
pub fn renderer_for(name: &str) -> Result<Box<dyn ClassRenderer>> {
    name.parse::<Target>().map(Target::renderer)
}
