//! Class hierarchy evaluation.
//!
//! Turns the schema components of an [`AsyncApiDocument`] into a
//! [`ClassModel`]:
//!
//! - one class per component, in document order
//! - one instance variable per property, in declaration order
//! - `allOf` with a `$ref` member is inheritance; inline members add properties
//! - property types resolve through the [`TypeRegistry`] (built-ins) or to
//!   another component (user-defined)
//! - every subclass's direct superclass must declare exactly one discriminator
//! - a subclass may not redeclare a variable one of its ancestors declares
//!
//! Evaluation is a pure function of the document, the registry and the
//! namespace. Errors are reported in model order.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::document::{AsyncApiDocument, Schema};
use crate::error::{Error, Result};
use crate::model::{Class, ClassId, ClassModel, InstanceVariable, TypeRef};
use crate::type_map::{TypeRegistry, to_pascal_case};

/// Builds a [`ClassModel`] from schema components.
#[derive(Debug, Clone)]
pub struct ClassHierarchyEvaluator<'a> {
    registry: &'a TypeRegistry,
    namespace: String,
}

/// Name and package assigned to a component before its body is evaluated.
struct Header<'s> {
    key: &'s str,
    name: String,
    package: String,
}

impl<'a> ClassHierarchyEvaluator<'a> {
    /// An evaluator placing classes in `namespace` unless a component sets
    /// `x-namespace`.
    pub fn new(registry: &'a TypeRegistry, namespace: impl Into<String>) -> Self {
        Self {
            registry,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Evaluate every schema component of `document`.
    pub fn evaluate(&self, document: &AsyncApiDocument) -> Result<ClassModel> {
        self.evaluate_schemas(&document.components.schemas)
    }

    /// Evaluate a set of schema components keyed by component name.
    pub fn evaluate_schemas(&self, schemas: &IndexMap<String, Schema>) -> Result<ClassModel> {
        let headers = self.assign_names(schemas)?;
        let ids: HashMap<&str, ClassId> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.key, ClassId(i)))
            .collect();

        let mut classes = Vec::with_capacity(headers.len());
        for (header, schema) in headers.iter().zip(schemas.values()) {
            let class = self.evaluate_class(header, schema, &headers, &ids)?;
            tracing::debug!(
                class = %class.name(),
                package = %class.package(),
                fields = class.instance_variables().len(),
                "evaluated class"
            );
            classes.push(class);
        }

        check_acyclic(&classes)?;
        let model = ClassModel::new(classes);
        check_discriminators(&model)?;
        check_redeclared_fields(&model)?;

        tracing::debug!(classes = model.len(), "class model finalized");
        Ok(model)
    }

    fn assign_names<'s>(&self, schemas: &'s IndexMap<String, Schema>) -> Result<Vec<Header<'s>>> {
        let mut seen: HashMap<(String, String), &str> = HashMap::new();
        let mut headers = Vec::with_capacity(schemas.len());

        for (key, schema) in schemas {
            let name = to_pascal_case(key);
            if name.is_empty() {
                return Err(Error::Document(format!(
                    "schema component '{key}' does not yield a class name"
                )));
            }
            let package = schema
                .namespace
                .clone()
                .unwrap_or_else(|| self.namespace.clone());

            if let Some(first) = seen.insert((package.clone(), name.clone()), key) {
                return Err(Error::DuplicateClass {
                    package,
                    name,
                    first: first.to_string(),
                    second: key.clone(),
                });
            }
            headers.push(Header {
                key: key.as_str(),
                name,
                package,
            });
        }
        Ok(headers)
    }

    fn evaluate_class(
        &self,
        header: &Header<'_>,
        schema: &Schema,
        headers: &[Header<'_>],
        ids: &HashMap<&str, ClassId>,
    ) -> Result<Class> {
        let class_name = &header.name;

        // The component itself plus every inline `allOf` member contribute
        // properties; `$ref` members name the superclass.
        let mut bodies: Vec<&Schema> = vec![schema];
        let mut super_refs: Vec<&str> = Vec::new();
        for member in &schema.all_of {
            match (&member.reference, member.component_ref()) {
                (Some(_), Some(key)) => super_refs.push(key),
                (Some(reference), None) => {
                    return Err(Error::UnresolvedType {
                        class: class_name.clone(),
                        field: "allOf".to_string(),
                        type_name: reference.clone(),
                    });
                }
                (None, _) => bodies.push(member),
            }
        }

        if super_refs.len() > 1 {
            return Err(Error::MultipleSuperClasses {
                class: class_name.clone(),
                candidates: super_refs.join(", "),
            });
        }
        let super_class = match super_refs.first() {
            None => None,
            Some(key) => Some(*ids.get(key).ok_or_else(|| Error::UnresolvedType {
                class: class_name.clone(),
                field: "allOf".to_string(),
                type_name: format!("{}{key}", crate::document::SCHEMA_REF_PREFIX),
            })?),
        };

        let mut variables: IndexMap<&str, InstanceVariable> = IndexMap::new();
        for body in &bodies {
            for (prop_name, prop) in &body.properties {
                let ty = self.resolve_type(class_name, prop_name, prop, headers, ids)?;
                let accessibility = prop.accessibility.unwrap_or_default();
                let is_discriminator = prop.is_discriminator
                    || bodies.iter().any(|b| {
                        b.discriminator
                            .as_ref()
                            .is_some_and(|d| d.property_name() == prop_name)
                    });
                let variable = if is_discriminator {
                    InstanceVariable::discriminator(prop_name.as_str(), ty, accessibility)
                } else {
                    InstanceVariable::new(prop_name.as_str(), ty, accessibility)
                };
                variables.insert(prop_name.as_str(), variable);
            }
        }

        for body in &bodies {
            if let Some(discriminator) = &body.discriminator {
                let field = discriminator.property_name();
                if !variables.contains_key(field) {
                    return Err(Error::DiscriminatorNotFound {
                        class: class_name.clone(),
                        field: field.to_string(),
                    });
                }
            }
        }

        Ok(Class::new(
            class_name.clone(),
            header.package.clone(),
            super_class,
            variables.into_values().collect(),
            schema.description.clone(),
        ))
    }

    fn resolve_type(
        &self,
        class_name: &str,
        field: &str,
        prop: &Schema,
        headers: &[Header<'_>],
        ids: &HashMap<&str, ClassId>,
    ) -> Result<TypeRef> {
        let unresolved = |type_name: &str| Error::UnresolvedType {
            class: class_name.to_string(),
            field: field.to_string(),
            type_name: type_name.to_string(),
        };

        if let Some(reference) = &prop.reference {
            let id = prop
                .component_ref()
                .and_then(|key| ids.get(key))
                .ok_or_else(|| unresolved(reference.as_str()))?;
            let target = &headers[id.index()];
            return Ok(TypeRef::UserDefined {
                name: target.name.clone(),
                package: target.package.clone(),
            });
        }

        match &prop.schema_type {
            Some(type_name) => self
                .registry
                .lookup(type_name)
                .map(TypeRef::BuiltIn)
                .ok_or_else(|| unresolved(type_name.as_str())),
            None => Err(Error::MissingFieldType {
                class: class_name.to_string(),
                field: field.to_string(),
            }),
        }
    }
}

/// Reject any class that transitively extends itself.
fn check_acyclic(classes: &[Class]) -> Result<()> {
    for (start, class) in classes.iter().enumerate() {
        let mut chain = vec![start];
        let mut current = class.super_class_id();
        while let Some(id) = current {
            let idx = id.index();
            if chain.contains(&idx) {
                chain.push(idx);
                let names: Vec<&str> = chain.iter().map(|&i| classes[i].name()).collect();
                return Err(Error::CyclicInheritance {
                    chain: names.join(" -> "),
                });
            }
            chain.push(idx);
            current = classes[idx].super_class_id();
        }
    }
    Ok(())
}

/// Every subclass's direct superclass must declare exactly one discriminator.
fn check_discriminators(model: &ClassModel) -> Result<()> {
    for (_, class) in model.iter() {
        model.super_discriminator(class)?;
    }
    Ok(())
}

/// Reject subclasses that redeclare a variable an ancestor already declares.
fn check_redeclared_fields(model: &ClassModel) -> Result<()> {
    for (_, class) in model.iter() {
        for variable in class.instance_variables() {
            if let Some((ancestor, _)) = model.inherited_variable(class, variable.name()) {
                return Err(Error::RedeclaredField {
                    class: class.name().to_string(),
                    field: variable.name().to_string(),
                    ancestor: ancestor.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::model::Accessibility;
    use crate::type_map::BuiltInType;

    fn evaluate(schemas: &str) -> Result<ClassModel> {
        let json = format!(
            r#"{{
                "asyncapi": "2.6.0",
                "info": {{ "title": "Test", "version": "1.0.0" }},
                "components": {{ "schemas": {schemas} }}
            }}"#
        );
        let document = parse_document(&json).unwrap();
        let registry = TypeRegistry::standard();
        ClassHierarchyEvaluator::new(&registry, "App\\Models").evaluate(&document)
    }

    const ANIMAL_AND_DOG: &str = r##"{
        "Animal": {
            "type": "object",
            "discriminator": "type",
            "properties": {
                "type": { "type": "string" },
                "age": { "type": "integer" }
            }
        },
        "Dog": {
            "allOf": [
                { "$ref": "#/components/schemas/Animal" },
                { "type": "object", "properties": { "breed": { "type": "string" } } }
            ]
        }
    }"##;

    #[test]
    fn animal_and_dog_hierarchy() {
        let model = evaluate(ANIMAL_AND_DOG).unwrap();
        assert_eq!(model.len(), 2);

        let animal = model.lookup("App\\Models", "Animal").unwrap();
        assert!(animal.super_class_id().is_none());
        assert_eq!(animal.discriminators().count(), 1);
        assert_eq!(animal.instance_variables()[0].name(), "type");
        assert_eq!(
            animal.instance_variables()[1].ty(),
            &TypeRef::BuiltIn(BuiltInType::Integer)
        );

        let dog = model.lookup("App\\Models", "Dog").unwrap();
        assert_eq!(model.super_class(dog).map(Class::name), Some("Animal"));
        let fields: Vec<&str> = dog.instance_variables().iter().map(|v| v.name()).collect();
        assert_eq!(fields, ["breed"]);
        assert_eq!(dog.instance_variables()[0].accessibility(), Accessibility::Private);
    }

    #[test]
    fn field_order_is_preserved() {
        let model = evaluate(
            r#"{ "Order": { "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "number" },
                "mid": { "type": "array" }
            } } }"#,
        )
        .unwrap();
        let names: Vec<&str> = model.classes()[0]
            .instance_variables()
            .iter()
            .map(|v| v.name())
            .collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn references_are_order_independent() {
        let model = evaluate(
            r##"{
                "Owner": { "properties": { "pet": { "$ref": "#/components/schemas/pet_profile" } } },
                "pet_profile": { "properties": { "name": { "type": "string" } } }
            }"##,
        )
        .unwrap();
        let pet = &model.classes()[0].instance_variables()[0];
        assert_eq!(
            pet.ty(),
            &TypeRef::UserDefined {
                name: "PetProfile".into(),
                package: "App\\Models".into()
            }
        );
    }

    #[test]
    fn subclass_before_superclass() {
        let model = evaluate(
            r##"{
                "Cat": { "allOf": [ { "$ref": "#/components/schemas/Animal" } ] },
                "Animal": { "discriminator": "kind", "properties": { "kind": { "type": "string" } } }
            }"##,
        )
        .unwrap();
        let cat = &model.classes()[0];
        assert_eq!(model.super_class(cat).map(Class::name), Some("Animal"));
    }

    #[test]
    fn x_discriminator_flag() {
        let model = evaluate(
            r#"{ "Base": { "properties": { "kind": { "type": "string", "x-discriminator": true } } } }"#,
        )
        .unwrap();
        assert!(model.classes()[0].instance_variables()[0].is_discriminator());
    }

    #[test]
    fn missing_discriminator_is_rejected() {
        let err = evaluate(
            r##"{
                "Animal": { "properties": { "age": { "type": "integer" } } },
                "Dog": { "allOf": [ { "$ref": "#/components/schemas/Animal" } ] }
            }"##,
        )
        .unwrap_err();
        match err {
            Error::MissingDiscriminator { class, super_class } => {
                assert_eq!(class, "Dog");
                assert_eq!(super_class, "Animal");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ambiguous_discriminator_is_rejected() {
        let err = evaluate(
            r##"{
                "Animal": { "discriminator": "type", "properties": {
                    "type": { "type": "string" },
                    "kind": { "type": "string", "x-discriminator": true }
                } },
                "Dog": { "allOf": [ { "$ref": "#/components/schemas/Animal" } ] }
            }"##,
        )
        .unwrap_err();
        match err {
            Error::AmbiguousDiscriminator { class, fields, .. } => {
                assert_eq!(class, "Dog");
                assert_eq!(fields, "type, kind");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn intermediate_class_without_discriminator_is_rejected() {
        let err = evaluate(
            r##"{
                "Animal": { "discriminator": "type", "properties": { "type": { "type": "string" } } },
                "Dog": { "allOf": [ { "$ref": "#/components/schemas/Animal" } ] },
                "Puppy": { "allOf": [ { "$ref": "#/components/schemas/Dog" } ] }
            }"##,
        )
        .unwrap_err();
        match err {
            Error::MissingDiscriminator { class, super_class } => {
                assert_eq!(class, "Puppy");
                assert_eq!(super_class, "Dog");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn each_level_dispatches_on_its_own_superclass() {
        let model = evaluate(
            r##"{
                "Animal": { "discriminator": "type", "properties": { "type": { "type": "string" } } },
                "Dog": { "allOf": [
                    { "$ref": "#/components/schemas/Animal" },
                    { "discriminator": "kind", "properties": { "kind": { "type": "string" } } }
                ] },
                "Puppy": { "allOf": [ { "$ref": "#/components/schemas/Dog" } ] }
            }"##,
        )
        .unwrap();
        let dog = model.lookup("App\\Models", "Dog").unwrap();
        let puppy = model.lookup("App\\Models", "Puppy").unwrap();
        assert_eq!(
            model.super_discriminator(dog).unwrap().map(InstanceVariable::name),
            Some("type")
        );
        assert_eq!(
            model.super_discriminator(puppy).unwrap().map(InstanceVariable::name),
            Some("kind")
        );
    }

    #[test]
    fn redeclared_inherited_field_is_rejected() {
        let err = evaluate(
            r##"{
                "Animal": { "discriminator": "type", "properties": {
                    "type": { "type": "string" },
                    "age": { "type": "integer" }
                } },
                "Dog": { "allOf": [
                    { "$ref": "#/components/schemas/Animal" },
                    { "properties": {
                        "age": { "type": "integer" },
                        "breed": { "type": "string" }
                    } }
                ] }
            }"##,
        )
        .unwrap_err();
        match err {
            Error::RedeclaredField {
                class,
                field,
                ancestor,
            } => {
                assert_eq!(class, "Dog");
                assert_eq!(field, "age");
                assert_eq!(ancestor, "Animal");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unresolved_builtin_type() {
        let err = evaluate(r#"{ "Flag": { "properties": { "on": { "type": "boolean" } } } }"#)
            .unwrap_err();
        match err {
            Error::UnresolvedType {
                class,
                field,
                type_name,
            } => {
                assert_eq!(class, "Flag");
                assert_eq!(field, "on");
                assert_eq!(type_name, "boolean");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unresolved_component_reference() {
        let err = evaluate(
            r##"{ "Owner": { "properties": { "pet": { "$ref": "#/components/schemas/Ghost" } } } }"##,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { .. }));
        assert!(err.to_string().contains("#/components/schemas/Ghost"));
    }

    #[test]
    fn unresolved_super_class() {
        let err = evaluate(
            r##"{ "Dog": { "allOf": [ { "$ref": "#/components/schemas/Ghost" } ] } }"##,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { ref field, .. } if field == "allOf"));
    }

    #[test]
    fn missing_field_type() {
        let err = evaluate(r#"{ "Thing": { "properties": { "x": { "description": "?" } } } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingFieldType { .. }));
    }

    #[test]
    fn discriminator_must_name_a_property() {
        let err = evaluate(
            r#"{ "Animal": { "discriminator": "type", "properties": { "age": { "type": "integer" } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DiscriminatorNotFound { .. }));
    }

    #[test]
    fn cyclic_inheritance_is_rejected() {
        let err = evaluate(
            r##"{
                "A": { "discriminator": "t", "properties": { "t": { "type": "string" } },
                       "allOf": [ { "$ref": "#/components/schemas/B" } ] },
                "B": { "discriminator": "t", "properties": { "t": { "type": "string" } },
                       "allOf": [ { "$ref": "#/components/schemas/A" } ] }
            }"##,
        )
        .unwrap_err();
        match err {
            Error::CyclicInheritance { chain } => assert_eq!(chain, "A -> B -> A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_extension_is_a_cycle() {
        let err = evaluate(
            r##"{ "Loop": { "allOf": [ { "$ref": "#/components/schemas/Loop" } ] } }"##,
        )
        .unwrap_err();
        assert!(matches!(err, Error::CyclicInheritance { ref chain } if chain == "Loop -> Loop"));
    }

    #[test]
    fn multiple_super_classes_are_rejected() {
        let err = evaluate(
            r##"{
                "A": { "discriminator": "t", "properties": { "t": { "type": "string" } } },
                "B": { "discriminator": "t", "properties": { "t": { "type": "string" } } },
                "C": { "allOf": [
                    { "$ref": "#/components/schemas/A" },
                    { "$ref": "#/components/schemas/B" }
                ] }
            }"##,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MultipleSuperClasses { .. }));
    }

    #[test]
    fn namespace_override() {
        let model = evaluate(
            r##"{
                "Money": { "x-namespace": "App\\Shared", "properties": { "amount": { "type": "number" } } },
                "Invoice": { "properties": { "total": { "$ref": "#/components/schemas/Money" } } }
            }"##,
        )
        .unwrap();
        assert!(model.lookup("App\\Shared", "Money").is_some());
        let total = &model.lookup("App\\Models", "Invoice").unwrap().instance_variables()[0];
        assert_eq!(
            total.ty(),
            &TypeRef::UserDefined {
                name: "Money".into(),
                package: "App\\Shared".into()
            }
        );
    }

    #[test]
    fn duplicate_class_names_are_rejected() {
        let err = evaluate(
            r#"{ "user_event": { "properties": {} }, "UserEvent": { "properties": {} } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateClass { .. }));
    }

    #[test]
    fn custom_registry_narrows_built_ins() {
        let json = r#"{
            "asyncapi": "2.6.0",
            "info": { "title": "Test", "version": "1.0.0" },
            "components": { "schemas": { "Reading": { "properties": { "v": { "type": "number" } } } } }
        }"#;
        let document = parse_document(json).unwrap();
        let registry = TypeRegistry::new([BuiltInType::String]);
        let err = ClassHierarchyEvaluator::new(&registry, "App")
            .evaluate(&document)
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { ref type_name, .. } if type_name == "number"));
    }
}
