use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use asyncapi_class_gen::codegen;
use asyncapi_class_gen::document::{self, AsyncApiDocument};
use asyncapi_class_gen::error::Result;
use asyncapi_class_gen::evaluator::ClassHierarchyEvaluator;
use asyncapi_class_gen::model::ClassModel;
use asyncapi_class_gen::renderer::Target;
use asyncapi_class_gen::type_map::{TypeRegistry, channel_class_prefix};

/// Generate model classes from an AsyncAPI document.
///
/// Evaluates the document's schema components into a class hierarchy and
/// writes one source file per class for the selected target language.
#[derive(Parser)]
#[command(name = "asyncapi-class-gen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one source file per schema component.
    Generate {
        /// Path to the AsyncAPI document (JSON).
        #[arg(long)]
        document: PathBuf,

        /// Namespace / package for generated models.
        #[arg(
            long,
            default_value = "App\\Models",
            env = "ASYNCAPI_MODELS_NAMESPACE"
        )]
        models_namespace: String,

        /// Target language: php or typescript.
        #[arg(long, default_value = "php", env = "ASYNCAPI_TARGET")]
        target: Target,

        /// Output directory for generated files.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Suppress non-error output.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Summarize servers, channels and the evaluated class hierarchy.
    Inspect {
        /// Path to the AsyncAPI document (JSON).
        #[arg(long)]
        document: PathBuf,

        /// Server whose security schemes to list.
        #[arg(long)]
        server: Option<String>,

        /// Namespace / package for generated models.
        #[arg(
            long,
            default_value = "App\\Models",
            env = "ASYNCAPI_MODELS_NAMESPACE"
        )]
        models_namespace: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Generate { quiet: true, .. });
    init_tracing(quiet);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            document,
            models_namespace,
            target,
            output_dir,
            quiet: _,
        } => {
            tracing::info!(path = %document.display(), "loading document");
            let doc = document::load_document(&document)?;
            let model = evaluate(&doc, &models_namespace)?;
            tracing::info!(
                title = %doc.info.title,
                classes = model.len(),
                %target,
                "evaluated class hierarchy"
            );

            let renderer = target.renderer();
            let generation = codegen::generate(renderer.as_ref(), &model)?;
            codegen::write_artifacts(&output_dir, &generation.artifacts)?;

            let stats = &generation.stats;
            tracing::info!(
                files = generation.artifacts.len(),
                fields = stats.fields_generated,
                accessor_pairs = stats.accessor_pairs_generated,
                discriminators_skipped = stats.discriminator_fields_skipped,
                output = %output_dir.display(),
                "done"
            );
        }

        Commands::Inspect {
            document,
            server,
            models_namespace,
        } => {
            let doc = document::load_document(&document)?;
            let model = evaluate(&doc, &models_namespace)?;
            print_summary(&doc, &model, server.as_deref())?;
        }
    }

    Ok(())
}

fn evaluate(doc: &AsyncApiDocument, namespace: &str) -> Result<ClassModel> {
    let registry = TypeRegistry::standard();
    ClassHierarchyEvaluator::new(&registry, namespace).evaluate(doc)
}

fn print_summary(doc: &AsyncApiDocument, model: &ClassModel, server: Option<&str>) -> Result<()> {
    println!("{} v{}", doc.info.title, doc.info.version);

    println!("\nServers:");
    for (name, srv) in &doc.servers {
        let version = srv.protocol_version.as_deref().unwrap_or("-");
        println!("  {name}: {} ({} {version})", srv.url, srv.protocol);
    }

    println!("\nChannels:");
    for name in doc.channels.keys() {
        println!("  {name} -> {}", channel_class_prefix(name));
    }

    if let Some(server) = server {
        println!("\nSecurity schemes for {server}:");
        for (name, scheme) in doc.server_security_schemes(server)? {
            println!("  {name}: {}", scheme.scheme_type);
        }
    }

    println!("\nClasses:");
    for class in model.classes() {
        match model.super_class(class) {
            Some(parent) => println!("  {} extends {}", class.qualified_name("\\"), parent.name()),
            None => println!("  {}", class.qualified_name("\\")),
        }
    }
    Ok(())
}
