//! The language-independent class model.
//!
//! A [`ClassModel`] is produced once by the
//! [`ClassHierarchyEvaluator`](crate::evaluator::ClassHierarchyEvaluator) and is
//! read-only afterwards. Classes live in an arena; a superclass is a
//! [`ClassId`] into that arena, so renderers walk the hierarchy through the
//! model rather than through owned pointers.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::type_map::BuiltInType;

/// Index of a class inside its [`ClassModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Visibility of a generated field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Public,
    Protected,
    #[default]
    Private,
}

impl Accessibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Protected => "protected",
            Accessibility::Private => "private",
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type of an instance variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A registered primitive.
    BuiltIn(BuiltInType),
    /// Another generated class, named by its class name and package.
    UserDefined { name: String, package: String },
}

impl TypeRef {
    /// Schema name for built-ins, class name for user-defined types.
    pub fn name(&self) -> &str {
        match self {
            TypeRef::BuiltIn(ty) => ty.name(),
            TypeRef::UserDefined { name, .. } => name,
        }
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self, TypeRef::BuiltIn(_))
    }

    pub fn is_user_defined(&self) -> bool {
        matches!(self, TypeRef::UserDefined { .. })
    }
}

/// A typed field of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceVariable {
    name: String,
    ty: TypeRef,
    accessibility: Accessibility,
    discriminator: bool,
}

impl InstanceVariable {
    pub fn new(name: impl Into<String>, ty: TypeRef, accessibility: Accessibility) -> Self {
        Self {
            name: name.into(),
            ty,
            accessibility,
            discriminator: false,
        }
    }

    /// A discriminator variable.
    pub fn discriminator(name: impl Into<String>, ty: TypeRef, accessibility: Accessibility) -> Self {
        Self {
            discriminator: true,
            ..Self::new(name, ty, accessibility)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    pub fn is_private(&self) -> bool {
        self.accessibility == Accessibility::Private
    }

    pub fn is_discriminator(&self) -> bool {
        self.discriminator
    }
}

/// One generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    name: String,
    package: String,
    super_class: Option<ClassId>,
    instance_variables: Vec<InstanceVariable>,
    description: Option<String>,
}

impl Class {
    pub(crate) fn new(
        name: String,
        package: String,
        super_class: Option<ClassId>,
        instance_variables: Vec<InstanceVariable>,
        description: Option<String>,
    ) -> Self {
        Self {
            name,
            package,
            super_class,
            instance_variables,
            description,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace / package the class belongs to.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn super_class_id(&self) -> Option<ClassId> {
        self.super_class
    }

    pub fn has_super_class(&self) -> bool {
        self.super_class.is_some()
    }

    /// All instance variables, in schema declaration order.
    pub fn instance_variables(&self) -> &[InstanceVariable] {
        &self.instance_variables
    }

    /// Instance variables that are rendered as members: everything except
    /// discriminators.
    pub fn declared_members(&self) -> impl Iterator<Item = &InstanceVariable> {
        self.instance_variables
            .iter()
            .filter(|v| !v.is_discriminator())
    }

    pub fn discriminators(&self) -> impl Iterator<Item = &InstanceVariable> {
        self.instance_variables.iter().filter(|v| v.is_discriminator())
    }

    /// Schema description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// `package\Name`-style identity used in diagnostics.
    pub fn qualified_name(&self, separator: &str) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}{separator}{}", self.package, self.name)
        }
    }
}

/// The ordered, immutable set of classes for one generation run.
#[derive(Debug, Clone, Default)]
pub struct ClassModel {
    classes: Vec<Class>,
    by_name: HashMap<(String, String), ClassId>,
}

impl ClassModel {
    /// Build the lookup index. Callers guarantee (package, name) uniqueness.
    pub(crate) fn new(classes: Vec<Class>) -> Self {
        let by_name = classes
            .iter()
            .enumerate()
            .map(|(i, c)| ((c.package.clone(), c.name.clone()), ClassId(i)))
            .collect();
        Self { classes, by_name }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in model order.
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.classes.iter().enumerate().map(|(i, c)| (ClassId(i), c))
    }

    pub fn get(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(id.0)
    }

    /// Look a class up by package and name.
    pub fn lookup(&self, package: &str, name: &str) -> Option<&Class> {
        self.by_name
            .get(&(package.to_string(), name.to_string()))
            .and_then(|id| self.get(*id))
    }

    pub fn super_class(&self, class: &Class) -> Option<&Class> {
        class.super_class.and_then(|id| self.get(id))
    }

    /// Ancestors of `class`, nearest first.
    ///
    /// The evaluator rejects cycles, so the walk always terminates; the length
    /// guard only protects hand-built models.
    pub fn ancestors<'a>(&'a self, class: &'a Class) -> impl Iterator<Item = &'a Class> + 'a {
        let limit = self.classes.len();
        std::iter::successors(self.super_class(class), move |c| self.super_class(c)).take(limit)
    }

    /// The discriminator a subclass dispatches on.
    ///
    /// Only the direct superclass is consulted: it must declare exactly one
    /// discriminator. `Ok(None)` for root classes.
    pub fn super_discriminator<'a>(&'a self, class: &'a Class) -> Result<Option<&'a InstanceVariable>> {
        let Some(super_class) = self.super_class(class) else {
            return Ok(None);
        };
        let found: Vec<&InstanceVariable> = super_class.discriminators().collect();
        match found.as_slice() {
            [one] => Ok(Some(*one)),
            [] => Err(Error::MissingDiscriminator {
                class: class.name().to_string(),
                super_class: super_class.name().to_string(),
            }),
            many => Err(Error::AmbiguousDiscriminator {
                class: class.name().to_string(),
                super_class: super_class.name().to_string(),
                fields: many
                    .iter()
                    .map(|v| v.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// The nearest ancestor of `class` that already declares a variable named
    /// `name`.
    pub fn inherited_variable<'a>(
        &'a self,
        class: &'a Class,
        name: &str,
    ) -> Option<(&'a Class, &'a InstanceVariable)> {
        self.ancestors(class).find_map(|ancestor| {
            ancestor
                .instance_variables()
                .iter()
                .find(|v| v.name() == name)
                .map(|v| (ancestor, v))
        })
    }
}
