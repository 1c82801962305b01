use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tlgen_compiler::{compile_files, read_schema, Compilation, CompileOptions, TlError};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tlgen")]
#[command(about = "Generate C# classes from TL type and function schemas", long_about = None)]
struct Cli {
    /// Log more (`-v` for info, `-vv` for debug). `RUST_LOG` overrides this.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SchemaArgs {
    /// Schema file with the type declarations
    #[arg(short, long)]
    types: PathBuf,

    /// Schema file with the function declarations
    #[arg(short, long)]
    functions: PathBuf,

    /// Skip malformed declarations and undeclared types with a warning
    #[arg(long)]
    lenient: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile both schemas and write one source file per unit
    Generate {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Output directory; `Objects/` and `Functions/` are created inside it
        #[arg(short, long)]
        out: PathBuf,

        /// Namespace of the generated sources
        #[arg(long)]
        namespace: Option<String>,

        /// Static class every generated class is nested in
        #[arg(long)]
        container: Option<String>,
    },

    /// Print the finished type graph as JSON (to stdout)
    Dump {
        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Parse, build and verify both schemas without writing anything
    Check {
        #[command(flatten)]
        schema: SchemaArgs,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn options(schema: &SchemaArgs) -> CompileOptions {
    CompileOptions {
        strict: !schema.lenient,
        ..CompileOptions::default()
    }
}

/// Reads and builds both schemas, then runs the verifier.
fn build(schema: &SchemaArgs) -> Result<Compilation, TlError> {
    let types = read_schema(&schema.types)?;
    let functions = read_schema(&schema.functions)?;

    let mut compilation = Compilation::new(options(schema));
    compilation.add_types(&schema.types.display().to_string(), &types)?;
    compilation.add_functions(&schema.functions.display().to_string(), &functions)?;
    compilation.verify()?;
    Ok(compilation)
}

fn main() -> Result<(), TlError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Generate { schema, out, namespace, container } => {
            let mut options = options(schema);
            if let Some(namespace) = namespace {
                options.codegen.namespace = namespace.clone();
            }
            if let Some(container) = container {
                options.codegen.container = container.clone();
            }
            let files = compile_files(&schema.types, &schema.functions, out, &options)?;
            println!("Generated {} files in {}", files.len(), out.display());
            Ok(())
        }

        Commands::Dump { schema } => {
            let compilation = build(schema)?;
            let json = serde_json::to_string_pretty(compilation.graph())?;
            println!("{}", json);
            Ok(())
        }

        Commands::Check { schema } => {
            let compilation = build(schema)?;
            let graph = compilation.graph();
            println!(
                "{} types, {} functions, {} units",
                graph.len(),
                graph.functions().len(),
                compilation.units().len()
            );
            Ok(())
        }
    }
}
