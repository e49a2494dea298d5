use std::path::PathBuf;

use clap::Parser;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use muzero_classic::config::{BaseConfig, ClassicControlConfig, TrainingConfig};
use muzero_classic::env::VideoConfig;
use muzero_classic::error::Result;

/// Probe a classic control task and play random episodes through the
/// MuZero game wrapper.
#[derive(Parser)]
#[command(name = "muzero-classic", about = "MuZero classic control configuration")]
struct Cli {
    /// Environment identifier
    #[arg(long, default_value = "CartPole-v1")]
    env: String,

    /// JSON file with hyperparameter overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of episodes to play
    #[arg(long, default_value_t = 3)]
    episodes: usize,

    /// Record every episode as JSON into this directory
    #[arg(long)]
    record: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => BaseConfig::from_json_file(path)?,
        None => BaseConfig::classic_control(),
    };
    let mut config = ClassicControlConfig::with_base(base)?;

    let video = match &cli.record {
        Some(dir) => VideoConfig::record_to(dir).with_predicate(|_| true),
        None => VideoConfig::disabled(),
    };
    let spec = config.set_game(&cli.env, &video)?;

    for (name, value) in config.hparams()? {
        println!("{:<28} {}", name, value);
    }

    let network = config.get_uniform_network()?;
    let mut rng = match config.base().seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for episode in 0..cli.episodes {
        let mut game = config.new_game(&video, Some(episode as u64))?;
        let observation = game.reset();
        let first = network.initial_inference(observation.view().insert_axis(Axis(0)))?;

        let mut total_reward = 0.0;
        while !game.is_terminal() && game.len() < config.base().max_moves {
            let action = rng.gen_range(0..spec.action_space_size);
            total_reward += game.step(action)?.reward;
        }

        tracing::info!(
            "Episode {}: {} decisions, discounted reward {:.2}, initial value estimate {:.4}",
            episode,
            game.len(),
            total_reward,
            first.value[0]
        );
    }

    Ok(())
}
