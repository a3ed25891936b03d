//! Generation driver: renders a [`ClassModel`] into file artifacts.
//!
//! Each class is rendered on its own, so a class that fails to render does not
//! affect its siblings. The run as a whole still fails when any class fails or
//! when two classes map to the same output path. Output is deterministic:
//! artifacts follow model order and contain byte-identical text across runs.

use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::model::{Class, ClassModel};
use crate::renderer::{ClassFragments, ClassRenderer};

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory.
    pub path: String,
    pub content: String,
}

/// Statistics collected during generation for reporting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationStats {
    pub classes_generated: usize,
    pub subclasses_generated: usize,
    pub fields_generated: usize,
    pub accessor_pairs_generated: usize,
    pub discriminator_fields_skipped: usize,
}

/// The artifacts of a successful run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub artifacts: Vec<Artifact>,
    pub stats: GenerationStats,
}

/// Outcome of rendering one class.
#[derive(Debug)]
pub struct ClassOutcome<'m> {
    pub class: &'m Class,
    pub result: Result<Artifact>,
}

/// Render a single class into an artifact.
pub fn render_class(
    renderer: &dyn ClassRenderer,
    model: &ClassModel,
    class: &Class,
) -> Result<Artifact> {
    let fragments = ClassFragments::render(renderer, model, class)?;
    let artifact = Artifact {
        path: renderer.file_path(class),
        content: renderer.assemble(&fragments),
    };
    tracing::debug!(
        backend = renderer.name(),
        class = %class.name(),
        path = %artifact.path,
        bytes = artifact.content.len(),
        "rendered class"
    );
    Ok(artifact)
}

/// Render every class independently, in model order.
pub fn render_each<'m>(renderer: &dyn ClassRenderer, model: &'m ClassModel) -> Vec<ClassOutcome<'m>> {
    model
        .classes()
        .iter()
        .map(|class| ClassOutcome {
            class,
            result: render_class(renderer, model, class),
        })
        .collect()
}

/// Render the whole model with one backend.
///
/// Fails with [`Error::Render`] listing every class that could not be rendered,
/// or with [`Error::DuplicatePath`] when two classes share an output path.
pub fn generate(renderer: &dyn ClassRenderer, model: &ClassModel) -> Result<Generation> {
    let mut stats = GenerationStats::default();
    let mut artifacts = Vec::with_capacity(model.len());
    let mut failures: Vec<String> = Vec::new();

    for outcome in render_each(renderer, model) {
        match outcome.result {
            Ok(artifact) => {
                record_class(&mut stats, outcome.class);
                artifacts.push((outcome.class, artifact));
            }
            Err(e) => {
                tracing::warn!(class = %outcome.class.name(), error = %e, "class failed to render");
                failures.push(format!("{}: {e}", outcome.class.name()));
            }
        }
    }

    if !failures.is_empty() {
        return Err(Error::Render {
            count: failures.len(),
            summary: failures.join("; "),
        });
    }

    let mut owners: IndexMap<&str, &Class> = IndexMap::new();
    for (class, artifact) in &artifacts {
        if let Some(first) = owners.insert(artifact.path.as_str(), class) {
            return Err(Error::DuplicatePath {
                path: artifact.path.clone(),
                first: first.qualified_name("\\"),
                second: class.qualified_name("\\"),
            });
        }
    }

    tracing::info!(
        backend = renderer.name(),
        classes = stats.classes_generated,
        subclasses = stats.subclasses_generated,
        "generation complete"
    );

    Ok(Generation {
        artifacts: artifacts.into_iter().map(|(_, a)| a).collect(),
        stats,
    })
}

fn record_class(stats: &mut GenerationStats, class: &Class) {
    stats.classes_generated += 1;
    if class.has_super_class() {
        stats.subclasses_generated += 1;
    }
    for variable in class.instance_variables() {
        if variable.is_discriminator() {
            stats.discriminator_fields_skipped += 1;
            continue;
        }
        stats.fields_generated += 1;
        if variable.is_private() {
            stats.accessor_pairs_generated += 1;
        }
    }
}

/// Write artifacts under `output_dir`, creating parent directories as needed.
pub fn write_artifacts(output_dir: &Path, artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        write_file(&output_dir.join(&artifact.path), &artifact.content)?;
    }
    Ok(())
}

/// Write content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::evaluator::ClassHierarchyEvaluator;
    use crate::renderer::{PhpRenderer, TypeScriptRenderer};
    use crate::type_map::{BuiltInType, TypeRegistry};

    fn model(schemas: &str) -> ClassModel {
        let json = format!(
            r#"{{
                "asyncapi": "2.6.0",
                "info": {{ "title": "Test", "version": "1.0.0" }},
                "components": {{ "schemas": {schemas} }}
            }}"#
        );
        let document = parse_document(&json).unwrap();
        ClassHierarchyEvaluator::new(&TypeRegistry::standard(), "App\\Models")
            .evaluate(&document)
            .unwrap()
    }

    const ANIMALS: &str = r##"{
        "Animal": {
            "discriminator": "type",
            "properties": {
                "type": { "type": "string" },
                "age": { "type": "integer" }
            }
        },
        "Dog": {
            "allOf": [
                { "$ref": "#/components/schemas/Animal" },
                { "properties": {
                    "breed": { "type": "string" },
                    "weight": { "type": "number", "x-accessibility": "public" }
                } }
            ]
        }
    }"##;

    #[test]
    fn one_artifact_per_class_in_model_order() {
        let model = model(ANIMALS);
        let generation = generate(&PhpRenderer::new(), &model).unwrap();
        let paths: Vec<&str> = generation.artifacts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, ["Animal.class.php", "Dog.class.php"]);
        assert_eq!(
            generation.stats,
            GenerationStats {
                classes_generated: 2,
                subclasses_generated: 1,
                fields_generated: 3,
                accessor_pairs_generated: 2,
                discriminator_fields_skipped: 1,
            }
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let model = model(ANIMALS);
        let renderer = PhpRenderer::new();
        let first = generate(&renderer, &model).unwrap().artifacts;
        let second = generate(&renderer, &model).unwrap().artifacts;
        assert_eq!(first, second);
    }

    #[test]
    fn failing_class_does_not_affect_siblings() {
        let model = model(ANIMALS);
        let renderer =
            PhpRenderer::with_mapping(PhpRenderer::default_mapping().without(BuiltInType::Number));

        let outcomes = render_each(&renderer, &model);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());

        // The sibling renders exactly as it does with a complete mapping.
        let complete = render_class(&PhpRenderer::new(), &model, &model.classes()[0]).unwrap();
        assert_eq!(outcomes[0].result.as_ref().unwrap(), &complete);

        let err = generate(&renderer, &model).unwrap_err();
        match err {
            Error::Render { count, summary } => {
                assert_eq!(count, 1);
                assert!(summary.starts_with("Dog: "));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_paths_fail_the_run() {
        let model = model(
            r#"{
                "Money": { "properties": { "amount": { "type": "number" } } },
                "money": { "x-namespace": "App\\Shared", "properties": {} }
            }"#,
        );
        let err = generate(&PhpRenderer::new(), &model).unwrap_err();
        match err {
            Error::DuplicatePath {
                path,
                first,
                second,
            } => {
                assert_eq!(path, "Money.class.php");
                assert_eq!(first, "App\\Models\\Money");
                assert_eq!(second, "App\\Shared\\Money");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn backends_render_the_same_model_concurrently() {
        let model = model(ANIMALS);
        let php = PhpRenderer::new();
        let ts = TypeScriptRenderer::new();

        let (php_out, ts_out) = std::thread::scope(|s| {
            let a = s.spawn(|| generate(&php, &model).unwrap());
            let b = s.spawn(|| generate(&ts, &model).unwrap());
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_eq!(php_out.artifacts.len(), 2);
        assert_eq!(ts_out.artifacts[1].path, "Dog.ts");
        assert!(php_out.artifacts[1].content.contains("public int $weight;"));
        assert!(ts_out.artifacts[1].content.contains("public weight: number;"));
    }

    #[test]
    fn write_artifacts_creates_directories() {
        let dir = std::env::temp_dir().join(format!(
            "asyncapi-class-gen-codegen-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let artifacts = vec![Artifact {
            path: "nested/Ping.class.php".into(),
            content: "<?php\n".into(),
        }];
        write_artifacts(&dir, &artifacts).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.join("nested/Ping.class.php")).unwrap(),
            "<?php\n"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
}
