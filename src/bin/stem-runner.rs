use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stem_runner::core::{device, stereo};
use stem_runner::{
    build_engine, BatchRequest, BatchRunner, DeviceSelector, ModelSpec, ModelType, RunRequest,
    SeparationConfig, SingleFileRunner,
};

#[derive(Parser)]
#[command(name = "stem-runner")]
#[command(about = "Inference driver for audio source-separation models", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ModelArgs {
    /// Model architecture tag
    #[arg(long, value_enum, default_value = "mdx23c")]
    model_type: ModelType,

    /// Path to the separation config (YAML)
    #[arg(long)]
    config: PathBuf,

    /// Optional checkpoint to load into the model
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Device ids; pass several for data-parallel inference
    #[arg(long, num_args = 1.., default_value = "0")]
    device_ids: Vec<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Separate a single audio file
    File {
        #[command(flatten)]
        model: ModelArgs,

        /// Input audio file
        #[arg(long)]
        input_file: PathBuf,

        /// Directory to store the stems in
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,

        /// Invert vocals to get an instrumental (folder runs only)
        #[arg(long)]
        extract_instrumental: bool,

        /// Pre-narrowing of the stereo image, 0 disables
        #[arg(long, default_value_t = 0)]
        stereo_narrowing: i32,
    },

    /// Separate every audio file in a folder
    Folder {
        #[command(flatten)]
        model: ModelArgs,

        /// Folder with mixtures to process
        #[arg(long)]
        input_folder: PathBuf,

        /// Directory to store the stems in
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,

        /// Invert vocals to get an instrumental
        #[arg(long)]
        extract_instrumental: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "info",
        (_, 1) => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> stem_runner::Result<()> {
    match cli.command {
        Commands::File {
            model,
            input_file,
            store_dir,
            extract_instrumental,
            stereo_narrowing,
        } => {
            stereo::validate_width(stereo_narrowing)?;
            let (config, engine, device) = setup(&model)?;

            if extract_instrumental {
                warn!("--extract-instrumental is only applied in folder mode");
            }

            let request = RunRequest::single_file(input_file, store_dir, stereo_narrowing);
            let mut runner = SingleFileRunner::new(engine.as_ref(), &device, &config);
            let report = runner.run(&request)?;
            for path in &report.written {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Folder {
            model,
            input_folder,
            store_dir,
            extract_instrumental,
        } => {
            let (config, engine, device) = setup(&model)?;

            let request = BatchRequest::folder(input_folder, store_dir)
                .with_instrumental(extract_instrumental);
            let runner = BatchRunner::new(engine.as_ref(), &device, &config).quiet(cli.quiet);
            let report = runner.run(&request)?;
            println!(
                "Processed {} of {} files ({} skipped) in {:.2} sec",
                report.succeeded,
                report.total,
                report.skipped,
                report.elapsed.as_secs_f64()
            );
            Ok(())
        }
    }
}

type Setup = (
    SeparationConfig,
    Box<dyn stem_runner::SeparationEngine>,
    stem_runner::DeviceHandle,
);

fn setup(model: &ModelArgs) -> stem_runner::Result<Setup> {
    let config = SeparationConfig::load(&model.config)?;
    info!("instruments: {:?}", config.active_instruments());

    if let Some(checkpoint) = &model.checkpoint {
        info!("starting from checkpoint: {}", checkpoint.display());
    }

    let spec = ModelSpec {
        model_type: model.model_type,
        config: config.clone(),
        checkpoint: model.checkpoint.clone(),
    };
    let engine = build_engine(&spec)?;

    let selector = DeviceSelector::from_ids(&model.device_ids);
    let device = device::resolve(&selector, engine.supports_accelerator());

    Ok((config, engine, device))
}
