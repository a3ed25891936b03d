//! TypeScript model classes.
//!
//! One exported class per file (`<Class>.ts`), importing its superclass and
//! field types from sibling modules. Private members are stored as `_name`
//! behind `get`/`set` accessors. Subclass constructors take the inherited
//! members first and forward them to `super`.

use std::fmt::Write;

use super::{ClassFragments, ClassRenderer, join_blocks, referenced_classes};
use crate::error::Result;
use crate::model::{Class, ClassModel, InstanceVariable};
use crate::type_map::{BuiltInType, TypeMapping};

/// Renders classes as TypeScript ES modules.
#[derive(Debug, Clone)]
pub struct TypeScriptRenderer {
    mapping: TypeMapping,
}

impl TypeScriptRenderer {
    pub fn new() -> Self {
        Self::with_mapping(Self::default_mapping())
    }

    pub fn with_mapping(mapping: TypeMapping) -> Self {
        Self { mapping }
    }

    /// `array → unknown[]`, `string → string`, `integer → number`, `number → number`.
    pub fn default_mapping() -> TypeMapping {
        TypeMapping::new()
            .with(BuiltInType::Array, "unknown[]")
            .with(BuiltInType::String, "string")
            .with(BuiltInType::Integer, "number")
            .with(BuiltInType::Number, "number")
    }

    fn storage_name(variable: &InstanceVariable) -> String {
        if variable.is_private() {
            format!("_{}", variable.name())
        } else {
            variable.name().to_string()
        }
    }
}

impl Default for TypeScriptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRenderer for TypeScriptRenderer {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn type_mapping(&self) -> &TypeMapping {
        &self.mapping
    }

    fn preamble(&self, _class: &Class) -> String {
        "// Generated from an AsyncAPI document. Do not edit.".to_string()
    }

    fn access_modifiers(&self, _class: &Class) -> Vec<String> {
        vec!["export".to_string()]
    }

    fn class_name(&self, class: &Class) -> String {
        class.name().to_string()
    }

    fn file_name(&self, class: &Class) -> String {
        format!("{}.ts", class.name())
    }

    fn namespace_block(&self, _class: &Class) -> String {
        String::new()
    }

    fn uses_block(&self, model: &ClassModel, class: &Class) -> String {
        referenced_classes(model, class)
            .iter()
            .map(|r| format!("import {{ {0} }} from './{0}';", r.name))
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
        Ok(model.super_discriminator(class)?
            .map(|d| format!(" * @discriminator {} {}", d.name(), class.name()))
            .unwrap_or_default())
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
            lines.push(format!(
                "  {} {}: {};",
                variable.accessibility(),
                Self::storage_name(variable),
                self.variable_type(variable)?
            ));
        }
        Ok(lines.join("\n"))
    }

    fn constructor_block(&self, model: &ClassModel, class: &Class) -> Result<String> {
        let ancestors: Vec<&Class> = model.ancestors(class).collect();
        let inherited: Vec<&InstanceVariable> = ancestors
            .into_iter()
            .rev()
            .flat_map(|a| a.declared_members())
            .collect();

        let mut parameters = Vec::new();
        for variable in inherited.iter().copied().chain(class.declared_members()) {
            parameters.push(format!("{}: {}", variable.name(), self.variable_type(variable)?));
        }

        let mut body = String::new();
        if class.has_super_class() {
            let args: Vec<&str> = inherited.iter().map(|v| v.name()).collect();
            let _ = writeln!(body, "    super({});", args.join(", "));
        }
        for variable in class.declared_members() {
            let _ = writeln!(
                body,
                "    this.{} = {};",
                Self::storage_name(variable),
                variable.name()
            );
        }

        Ok(format!(
            "  constructor({}) {{\n{body}  }}",
            parameters.join(", ")
        ))
    }

    fn accessors_block(&self, class: &Class) -> Result<String> {
        let mut pairs = Vec::new();
        for variable in class.declared_members().filter(|v| v.is_private()) {
            let ty = self.variable_type(variable)?;
            let name = variable.name();
            pairs.push(format!(
                "  get {name}(): {ty} {{\n    return this._{name};\n  }}\n\n  set {name}(value: {ty}) {{\n    this._{name} = value;\n  }}"
            ));
        }
        Ok(pairs.join("\n\n"))
    }

    fn assemble(&self, fragments: &ClassFragments) -> String {
        let mut declaration = String::new();
        if !fragments.comment.is_empty() {
            let _ = writeln!(declaration, "{}", fragments.comment);
        }
        let _ = writeln!(declaration, "{} {{", fragments.declaration());
        let body = fragments.body();
        if !body.is_empty() {
            let _ = writeln!(declaration, "{body}");
        }
        declaration.push('}');

        let mut out = join_blocks(
            [
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
