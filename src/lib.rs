//! Generate DTO model classes from AsyncAPI schema components.
//!
//! `asyncapi-class-gen` reads the `components.schemas` of an
//! [AsyncAPI](https://www.asyncapi.com/) document, evaluates them into a
//! language-independent class hierarchy and renders one source file per class
//! for a target language.
//!
//! # Pipeline
//!
//! ```text
//! AsyncAPI document ─> ClassHierarchyEvaluator ─> ClassModel ─> codegen ─> ClassRenderer ─> artifacts
//!                      (evaluator.rs)             (model.rs)    (codegen.rs) (renderer/)
//! ```
//!
//! # Features
//!
//! - Inheritance through `allOf` + `$ref`; each superclass declares exactly one
//!   discriminator and subclasses never redeclare inherited fields
//! - Built-in types (`array`, `string`, `integer`, `number`) mapped per backend
//! - Deduplicated, insertion-ordered imports
//! - Accessors for private fields only; discriminators are never redeclared
//! - PHP (JMS Serializer discriminator annotations) and TypeScript backends
//! - Deterministic output: byte-identical across runs
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! use asyncapi_class_gen::{codegen, document, evaluator::ClassHierarchyEvaluator};
//! use asyncapi_class_gen::renderer::PhpRenderer;
//! use asyncapi_class_gen::type_map::TypeRegistry;
//!
//! let document = document::load_document(Path::new("asyncapi.json"))?;
//! let registry = TypeRegistry::standard();
//! let model = ClassHierarchyEvaluator::new(&registry, "App\\Models").evaluate(&document)?;
//! let generation = codegen::generate(&PhpRenderer::new(), &model)?;
//! codegen::write_artifacts(Path::new("src/Models"), &generation.artifacts)?;
//! # Ok::<(), asyncapi_class_gen::error::Error>(())
//! ```

pub mod codegen;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod renderer;
pub mod type_map;
