//! `nodekit` CLI - run comfy-nodekit nodes outside a graph host.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array4;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comfy_nodekit::image::{self, BatchFailurePolicy, ImageFormat, OutputTarget, SaveImageRequest};
use comfy_nodekit::node::ValueType;
use comfy_nodekit::{dimensions, presets, sampler, seed, Config, NodeRegistry, Value};

/// Run dimension, preset, seed, sampler and image-saving nodes from the command line.
#[derive(Parser, Debug)]
#[command(name = "nodekit")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory for saved images (overrides NODEKIT_OUTPUT_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Directory for previews (overrides NODEKIT_TEMP_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Stop a batch at the first image that fails to save.
    #[arg(long, global = true)]
    abort_on_error: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the schema of every registered node as JSON.
    List {
        /// Only print this node.
        #[arg(value_name = "NODE")]
        node: Option<String>,
    },

    /// Run a registered node.
    Run {
        /// Node name, e.g. ScaleDimensions.
        #[arg(value_name = "NODE")]
        node: String,

        /// Input as name=value. Images take comma-separated paths, latents a
        /// shape such as 1x4x128x128.
        #[arg(short, long = "input", value_name = "NAME=VALUE")]
        inputs: Vec<String>,
    },

    /// Scale a width/height pair, rounding to multiples of 8.
    Scale {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(short, long, default_value = "1.5", value_name = "FLOAT")]
        factor: f64,
    },

    /// Resolve a preset label, or list all presets without one.
    Preset {
        #[arg(value_name = "LABEL")]
        label: Option<String>,
        #[arg(long, default_value = "1024")]
        width: u32,
        #[arg(long, default_value = "1024")]
        height: u32,
        #[arg(long)]
        swap: bool,
    },

    /// Check a seed, or generate one.
    Seed {
        #[arg(value_name = "INT", allow_hyphen_values = true)]
        value: Option<i128>,
    },

    /// Validate a sampler/scheduler combination.
    Combo {
        #[arg(value_name = "SAMPLER")]
        sampler: String,
        #[arg(value_name = "SCHEDULER")]
        scheduler: String,
        #[arg(long, default_value = "20", allow_hyphen_values = true)]
        steps: i64,
        #[arg(long, default_value = "7.0", allow_hyphen_values = true)]
        cfg: f64,
    },

    /// Re-encode image files through the batch saver.
    Save {
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long, default_value = "ComfyUI")]
        prefix: String,
        /// png, jpeg or webp.
        #[arg(long, default_value = "png")]
        format: String,
        /// JPEG/WebP quality (1-100).
        #[arg(short, long, default_value = "95", value_name = "INT")]
        quality: u8,
        /// PNG compression level (0-9).
        #[arg(long, default_value = "4", value_name = "INT")]
        compression: u8,
        /// Lossless WebP.
        #[arg(long)]
        lossless: bool,
        /// Write to the temp directory instead of the output directory.
        #[arg(long)]
        preview: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("comfy_nodekit={log_level},nodekit={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    match args.command {
        Command::List { node } => {
            let registry = NodeRegistry::with_builtin_nodes()?;
            let schema = registry.schema()?;
            let shown = match node {
                Some(name) => schema
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| anyhow!("unknown node {name}"))?,
                None => schema,
            };
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }

        Command::Run { node, inputs } => {
            let registry = NodeRegistry::with_builtin_nodes()?;
            let descriptor = registry
                .get(&node)
                .ok_or_else(|| anyhow!("unknown node {node}"))?;

            let mut values = HashMap::new();
            for raw in &inputs {
                let (name, text) = raw
                    .split_once('=')
                    .ok_or_else(|| anyhow!("input {raw:?} is not NAME=VALUE"))?;
                let spec = descriptor
                    .inputs
                    .iter()
                    .find(|spec| spec.name == name)
                    .ok_or_else(|| anyhow!("node {node} has no input {name}"))?;
                let value = parse_input(spec.value_type, text)
                    .with_context(|| format!("Failed to parse input {name}"))?;
                values.insert(name.to_string(), value);
            }

            let outputs = registry
                .execute(&node, values, &config)
                .with_context(|| format!("Failed to run {node}"))?;

            let named: serde_json::Map<String, serde_json::Value> = descriptor
                .outputs
                .iter()
                .zip(&outputs)
                .map(|(spec, value)| (spec.name.to_string(), value.to_json()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&named)?);
        }

        Command::Scale {
            width,
            height,
            factor,
        } => {
            let dims = dimensions::scale(width, height, factor)?;
            println!("{}x{}", dims.width, dims.height);
        }

        Command::Preset {
            label,
            width,
            height,
            swap,
        } => match label {
            Some(label) => {
                let dims = presets::resolve(&label, width, height);
                let dims = if swap { dims.swapped() } else { dims };
                println!("{}x{}", dims.width, dims.height);
            }
            None => {
                for label in presets::LABELS.iter() {
                    println!("{label}");
                }
            }
        },

        Command::Seed { value } => match value {
            Some(value) => {
                let valid = seed::validate(value);
                println!("valid: {valid}");
                println!("seed: {}", seed::sanitize(value));
            }
            None => println!("{}", seed::generate()),
        },

        Command::Combo {
            sampler,
            scheduler,
            steps,
            cfg,
        } => {
            let combo = sampler::validate_combo(&sampler, &scheduler, steps, cfg);
            println!("{}", serde_json::to_string_pretty(&combo)?);
        }

        Command::Save {
            inputs,
            prefix,
            format,
            quality,
            compression,
            lossless,
            preview,
        } => {
            let format = ImageFormat::from_parts(&format, quality, compression, lossless)?;
            save_files(&inputs, &prefix, format, !preview, &config)?;
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_env().context("Failed to read configuration")?;

    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(dir) = &args.temp_dir {
        config.temp_dir.clone_from(dir);
    }
    if args.abort_on_error {
        config.failure_policy = BatchFailurePolicy::AbortOnFirstError;
    }

    config.validate()?;
    Ok(config)
}

/// Parse a CLI input according to the declared socket type.
fn parse_input(value_type: ValueType, text: &str) -> Result<Value> {
    let value = match value_type {
        ValueType::Int => Value::Int(text.trim().parse()?),
        ValueType::Float => Value::Float(text.trim().parse()?),
        ValueType::Boolean => Value::Boolean(text.trim().parse()?),
        ValueType::String => Value::String(text.to_string()),
        ValueType::Image => {
            let paths: Vec<&str> = text.split(',').map(str::trim).collect();
            Value::Image(image::load_images(&paths)?)
        }
        ValueType::Latent => {
            let dims = text
                .split(['x', 'X'])
                .map(|part| part.trim().parse::<usize>())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let &[batch, channels, height, width] = dims.as_slice() else {
                bail!("latent shape must be BxCxHxW, got {text:?}");
            };
            Value::Latent(Array4::zeros((batch, channels, height, width)))
        }
    };
    Ok(value)
}

/// Save each file as its own batch so differently sized inputs can be mixed.
fn save_files(
    inputs: &[PathBuf],
    prefix: &str,
    format: ImageFormat,
    save_output: bool,
    config: &Config,
) -> Result<()> {
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Saving [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let mut saved = 0;
    let mut failed = 0;

    for input in inputs {
        let images = image::load_image(input)
            .with_context(|| format!("Failed to load {}", input.display()))?;

        let report = SaveImageRequest {
            images: &images,
            filename_prefix: prefix,
            format,
            target: OutputTarget::from_save_output(save_output),
        }
        .save(config)
        .with_context(|| format!("Failed to save {}", input.display()))?;

        for file in &report.saved {
            pb.println(format!("{} -> {}", input.display(), file.path.display()));
        }
        saved += report.saved.len();
        failed += report.failed.len();
        pb.inc(1);
    }

    pb.finish_and_clear();
    println!("Saved {saved} image(s), {failed} failed");

    Ok(())
}
