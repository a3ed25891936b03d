//! PHP model classes.
//!
//! Subclasses carry a JMS Serializer `@Discriminator` annotation naming the
//! discriminator field declared by their direct superclass, so polymorphic payloads
//! deserialize into the right class. Files are named `<Class>.class.php`.

use std::fmt::Write;

use indexmap::IndexSet;

use super::{ClassFragments, ClassRenderer, join_blocks, referenced_classes};
use crate::error::Result;
use crate::model::{Class, ClassModel, InstanceVariable};
use crate::type_map::{BuiltInType, TypeMapping, upper_case_first};

const DISCRIMINATOR_ANNOTATION: &str = "JMS\\Serializer\\Annotation\\Discriminator";

/// Renders classes as PHP 7.4+ typed-property classes.
#[derive(Debug, Clone)]
pub struct PhpRenderer {
    mapping: TypeMapping,
}

impl PhpRenderer {
    /// A renderer with [`PhpRenderer::default_mapping`].
    pub fn new() -> Self {
        Self::with_mapping(Self::default_mapping())
    }

    pub fn with_mapping(mapping: TypeMapping) -> Self {
        Self { mapping }
    }

    /// `array → array`, `string → string`, `integer → int`, `number → int`.
    pub fn default_mapping() -> TypeMapping {
        TypeMapping::new()
            .with(BuiltInType::Array, "array")
            .with(BuiltInType::String, "string")
            .with(BuiltInType::Integer, "int")
            .with(BuiltInType::Number, "int")
    }

    fn namespace(class: &Class) -> &str {
        class.package()
    }

    fn qualify(package: &str, name: &str) -> String {
        if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}\\{name}")
        }
    }

    fn getter(&self, variable: &InstanceVariable) -> Result<String> {
        let ty = self.variable_type(variable)?;
        let name = variable.name();
        let method = upper_case_first(name);
        Ok(format!(
            "  public function get{method}(): {ty}\n  {{\n    return $this->{name};\n  }}"
        ))
    }

    fn setter(&self, variable: &InstanceVariable) -> Result<String> {
        let ty = self.variable_type(variable)?;
        let name = variable.name();
        let method = upper_case_first(name);
        Ok(format!(
            "  public function set{method}({ty} ${name}): void\n  {{\n    $this->{name} = ${name};\n  }}"
        ))
    }
}

impl Default for PhpRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRenderer for PhpRenderer {
    fn name(&self) -> &'static str {
        "php"
    }

    fn type_mapping(&self) -> &TypeMapping {
        &self.mapping
    }

    fn preamble(&self, _class: &Class) -> String {
        String::new()
    }

    fn access_modifiers(&self, _class: &Class) -> Vec<String> {
        Vec::new()
    }

    fn class_name(&self, class: &Class) -> String {
        class.name().to_string()
    }

    fn file_name(&self, class: &Class) -> String {
        format!("{}.class.php", class.name())
    }

    fn namespace_block(&self, class: &Class) -> String {
        let namespace = Self::namespace(class);
        if namespace.is_empty() {
            String::new()
        } else {
            format!("namespace {namespace};")
        }
    }

    fn uses_block(&self, model: &ClassModel, class: &Class) -> String {
        let mut uses: IndexSet<String> = IndexSet::new();
        for (i, reference) in referenced_classes(model, class).iter().enumerate() {
            uses.insert(Self::qualify(reference.package, reference.name));
            // The superclass comes first; subclasses also need the annotation.
            if i == 0 && class.has_super_class() {
                uses.insert(DISCRIMINATOR_ANNOTATION.to_string());
            }
        }
        uses.iter()
            .map(|target| format!("use {target};"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn class_comment(&self, model: &ClassModel, class: &Class) -> Result<String> {
        let annotations = self.class_annotations(model, class)?;
        let description = class
            .description()
            .map(|d| {
                d.lines()
                    .map(|line| format!(" * {line}").trim_end().to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        let inner = join_blocks([description.as_str(), annotations.as_str()], "\n *\n");
        if inner.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("/**\n{inner}\n */"))
    }

    fn class_annotations(&self, model: &ClassModel, class: &Class) -> Result<String> {
        let Some(discriminator) = model.super_discriminator(class)? else {
            return Ok(String::new());
        };
        let name = class.name();
        let qualified = Self::qualify(Self::namespace(class), name);
        Ok(format!(
            " * @Discriminator(field=\"{}\", map={{\"{name}\" = \"{qualified}\"}})",
            discriminator.name()
        ))
    }

    fn extends_clause(&self, model: &ClassModel, class: &Class) -> String {
        model
            .super_class(class)
            .map(|s| format!("extends {}", s.name()))
            .unwrap_or_default()
    }

    fn instance_variables_block(&self, class: &Class) -> Result<String> {
        let mut lines = Vec::new();
        for variable in class.declared_members() {
            let ty = self.variable_type(variable)?;
            lines.push(format!(
                "  {} {ty} ${};",
                variable.accessibility(),
                variable.name()
            ));
        }
        Ok(lines.join("\n"))
    }

    fn constructor_block(&self, _model: &ClassModel, class: &Class) -> Result<String> {
        let mut parameters = Vec::new();
        let mut assignments = String::new();
        for variable in class.declared_members() {
            let ty = self.variable_type(variable)?;
            let name = variable.name();
            parameters.push(format!("{ty} ${name}"));
            let _ = writeln!(assignments, "    $this->{name} = ${name};");
        }

        Ok(format!(
            "  public function __construct({})\n  {{\n{assignments}  }}",
            parameters.join(", ")
        ))
    }

    fn accessors_block(&self, class: &Class) -> Result<String> {
        let mut pairs = Vec::new();
        for variable in class.declared_members().filter(|v| v.is_private()) {
            pairs.push(format!(
                "{}\n\n{}",
                self.getter(variable)?,
                self.setter(variable)?
            ));
        }
        Ok(pairs.join("\n\n"))
    }

    fn assemble(&self, fragments: &ClassFragments) -> String {
        let mut declaration = String::new();
        if !fragments.comment.is_empty() {
            let _ = writeln!(declaration, "{}", fragments.comment);
        }
        let _ = writeln!(declaration, "{}", fragments.declaration());
        declaration.push_str("{\n");
        let body = fragments.body();
        if !body.is_empty() {
            let _ = writeln!(declaration, "{body}");
        }
        declaration.push('}');

        let mut out = join_blocks(
            [
                "<?php",
                fragments.preamble.as_str(),
                fragments.namespace.as_str(),
                fragments.uses.as_str(),
                declaration.as_str(),
            ],
            "\n\n",
        );
        out.push('\n');
        out
    }
}
