//! Command-line driver: trains a network from a data file, runs a trained
//! network on a single input, and reads or writes its weights.
//!
//! Usage:
//!   netprop train --data learnData.txt --save learnDataWeights.txt
//!   netprop run --topology 2,4,1 --weights learnDataWeights.txt --input 1 0

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use netprop::{LearnData, Logging, NetConfig, Network, StopCondition, Trainer};

#[derive(Parser, Debug)]
#[command(name = "netprop")]
#[command(about = "Train and run a tanh feedforward network with momentum")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON file with `eta`, `alpha` and `smoothing_window`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the initial weights
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train on a `topology:` / `in:` / `out:` data file
    Train {
        /// Training data file
        #[arg(short, long, default_value = "learnData.txt")]
        data: PathBuf,

        /// Start from previously saved weights
        #[arg(long)]
        load: Option<PathBuf>,

        /// Write the trained weights here
        #[arg(long)]
        save: Option<PathBuf>,

        /// Passes over the training data
        #[arg(short, long, default_value = "1", conflicts_with_all = ["target_error", "seconds"])]
        epochs: usize,

        /// Keep training until an epoch's mean error drops below this
        #[arg(long, conflicts_with = "seconds")]
        target_error: Option<f64>,

        /// Keep training for this many seconds
        #[arg(long)]
        seconds: Option<u64>,

        /// Log the current sample every N passes (0 disables)
        #[arg(long, default_value = "500")]
        report_every: usize,
    },

    /// Feed one input through a trained network
    Run {
        /// Neurons per layer, e.g. 2,4,1
        #[arg(short, long, value_delimiter = ',', required = true)]
        topology: Vec<usize>,

        /// Saved weights
        #[arg(short, long, default_value = "learnDataWeights.txt")]
        weights: PathBuf,

        /// Input values
        #[arg(short, long, num_args = 1.., allow_negative_numbers = true, required = true)]
        input: Vec<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level: Level = cli
        .log_level
        .parse()
        .with_context(|| format!("invalid log level `{}`", cli.log_level))?;
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => NetConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => NetConfig::default(),
    };

    match cli.command {
        Commands::Train {
            data,
            load,
            save,
            epochs,
            target_error,
            seconds,
            report_every,
        } => {
            let learn_data = LearnData::open(&data)
                .with_context(|| format!("failed to read training data {}", data.display()))?;
            let mut network = build_network(learn_data.topology(), config, cli.seed)?;
            if let Some(path) = &load {
                netprop::load_weights(&mut network, path)
                    .with_context(|| format!("failed to load weights {}", path.display()))?;
            }

            let stop = match (target_error, seconds) {
                (Some(error), _) => StopCondition::ErrorThreshold(error),
                (None, Some(secs)) => Duration::from_secs(secs).into(),
                (None, None) => StopCondition::Epochs(epochs),
            };
            let summary = Trainer::new()
                .logging(Logging::Iterations(report_every))
                .stop_condition(stop)
                .train(&mut network, learn_data.examples())?;

            println!();
            println!("FINAL SCORES FROM THE NEURAL NETWORK");
            println!("Passes: {}", summary.passes);
            if let Some((inputs, targets)) = learn_data.examples().last() {
                let outputs = network.run(inputs);
                show_vector_vals("Inputs:", inputs);
                show_vector_vals("Target Outputs:", targets);
                show_vector_vals("Network Outputs:", &outputs);
            }
            println!("Last epoch error: {}", summary.training_error);
            println!("Net recent average error: {}", summary.recent_average_error);

            if let Some(path) = &save {
                netprop::save_weights(&network, path)
                    .with_context(|| format!("failed to save weights {}", path.display()))?;
                info!("Wrote weights to {}", path.display());
            }
        }
        Commands::Run {
            topology,
            weights,
            input,
        } => {
            let mut network = build_network(&topology, config, cli.seed)?;
            netprop::load_weights(&mut network, &weights)
                .with_context(|| format!("failed to load weights {}", weights.display()))?;
            anyhow::ensure!(
                input.len() == network.input_len(),
                "expected {} input values, got {}",
                network.input_len(),
                input.len()
            );
            let outputs = network.run(&input);
            show_vector_vals("Inputs:", &input);
            show_vector_vals("Network Outputs:", &outputs);
        }
    }
    Ok(())
}

fn build_network(topology: &[usize], config: NetConfig, seed: Option<u64>) -> Result<Network> {
    let network = match seed {
        Some(seed) => Network::with_rng(topology, config, &mut StdRng::seed_from_u64(seed)),
        None => Network::new(topology, config),
    };
    network.context("failed to build network")
}

fn show_vector_vals(label: &str, values: &[f64]) {
    println!("{} {}", label, values.iter().join(" "));
}
