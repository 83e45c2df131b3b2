//! CLI for the protomut mutation engine.
//!
//! Messages and schemas are JSON files; see `protomut_schema::SchemaDef` for
//! the schema layout.
//!
//! # Usage
//!
//! ```bash
//! # Mutate an empty Node ten times and print the result
//! protomut mutate --schema node.json --message-type Node --iterations 10
//!
//! # Mutate a stored message with a growth budget, writing the result
//! protomut mutate --schema node.json --message-type Node --input seed.json \
//!     --seed 7 --hint 128 --output mutated.json
//!
//! # Cross two messages over
//! protomut crossover --schema node.json --message-type Node --first a.json --second b.json
//!
//! # Report depth and missing required fields
//! protomut check --schema node.json --message-type Node --input mutated.json
//! ```
//!
//! Set `RUST_LOG=trace` to see every edit the engine applies.

use clap::{Parser, Subcommand};
use protomut::files::{load_message, load_schema, message_type, save_message};
use protomut::{DynamicMessage, Mutator, MutatorConfig, DEFAULT_MAX_DEPTH};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "protomut")]
#[command(about = "Structure-aware mutation of schema-described messages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply random edits to a message.
    Mutate {
        /// Schema definition (JSON).
        #[arg(long)]
        schema: PathBuf,

        /// Name of the message type to mutate.
        #[arg(short, long)]
        message_type: String,

        /// Starting message (JSON); an empty message if omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Random seed for reproducibility.
        #[arg(short, long, default_value = "0")]
        seed: u32,

        /// Number of edits to apply.
        #[arg(short = 'n', long, default_value = "1")]
        iterations: usize,

        /// Growth budget in bytes per edit.
        #[arg(long, default_value = "64")]
        hint: usize,

        /// Deepest allowed message nesting.
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Leave required fields unset instead of filling them.
        #[arg(long)]
        no_keep_initialized: bool,

        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge material from one message into another.
    Crossover {
        #[arg(long)]
        schema: PathBuf,

        #[arg(short, long)]
        message_type: String,

        /// Message donating fields; left unchanged.
        #[arg(long)]
        first: PathBuf,

        /// Message receiving fields.
        #[arg(long)]
        second: PathBuf,

        #[arg(short, long, default_value = "0")]
        seed: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report nesting depth and unset required fields.
    Check {
        #[arg(long)]
        schema: PathBuf,

        #[arg(short, long)]
        message_type: String,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Mutate {
            schema,
            message_type,
            input,
            seed,
            iterations,
            hint,
            max_depth,
            no_keep_initialized,
            output,
        } => {
            let config = MutatorConfig {
                max_depth,
                keep_initialized: !no_keep_initialized,
                ..Default::default()
            };
            run_mutate(
                &schema,
                &message_type,
                input.as_deref(),
                seed,
                iterations,
                hint,
                config,
                output.as_deref(),
            )
        }
        Commands::Crossover {
            schema,
            message_type,
            first,
            second,
            seed,
            output,
        } => run_crossover(&schema, &message_type, &first, &second, seed, output.as_deref()),
        Commands::Check {
            schema,
            message_type,
            input,
            max_depth,
        } => run_check(&schema, &message_type, &input, max_depth),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_mutate(
    schema_path: &Path,
    type_name: &str,
    input: Option<&Path>,
    seed: u32,
    iterations: usize,
    hint: usize,
    config: MutatorConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let schema = load_schema(schema_path)?;
    let descriptor = message_type(&schema, type_name)?;
    let mut message = match input {
        Some(path) => load_message(path, &descriptor)?,
        None => DynamicMessage::new(descriptor),
    };

    let mut mutator = Mutator::with_config(config)?;
    mutator.seed(seed);
    for _ in 0..iterations {
        mutator.mutate(&mut message, hint);
    }
    log::info!("applied {} edits, depth {}", iterations, message.depth());
    emit(&message, output)
}

fn run_crossover(
    schema_path: &Path,
    type_name: &str,
    first: &Path,
    second: &Path,
    seed: u32,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let schema = load_schema(schema_path)?;
    let descriptor = message_type(&schema, type_name)?;
    let donor = load_message(first, &descriptor)?;
    let mut receiver = load_message(second, &descriptor)?;

    let mut mutator = Mutator::new();
    mutator.seed(seed);
    mutator.cross_over(&donor, &mut receiver);
    emit(&receiver, output)
}

fn run_check(
    schema_path: &Path,
    type_name: &str,
    input: &Path,
    max_depth: usize,
) -> Result<(), Box<dyn Error>> {
    let schema = load_schema(schema_path)?;
    let descriptor = message_type(&schema, type_name)?;
    let message = load_message(input, &descriptor)?;
    let mut mutator = Mutator::new();
    mutator.set_max_depth(max_depth)?;

    let depth = message.depth();
    let missing = message.missing_required();
    println!("Type:      {}", descriptor.name());
    println!("Depth:     {} (max {})", depth, max_depth);
    if missing.is_empty() {
        println!("Required:  all set");
    } else {
        println!("Required:  {} unset", missing.len());
        for path in &missing {
            println!("  - {}", path);
        }
    }

    if depth > max_depth || !mutator.is_initialized(&message) {
        return Err("message violates the depth bound or required-field rules".into());
    }
    Ok(())
}

fn emit(message: &DynamicMessage, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => save_message(path, message)?,
        None => println!("{}", serde_json::to_string_pretty(&message.to_json())?),
    }
    Ok(())
}
