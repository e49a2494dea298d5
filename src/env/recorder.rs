use ndarray::Array1;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Environment, Step};
use crate::error::{Error, Result};

/// Decides from the episode index whether an episode is recorded
pub type EpisodePredicate = Arc<dyn Fn(usize) -> bool + Send + Sync>;

/// Recording settings, validated as a whole before any environment is built.
#[derive(Clone)]
pub struct VideoConfig {
    pub enabled: bool,
    pub destination_path: Option<PathBuf>,
    pub episode_predicate: Option<EpisodePredicate>,
    pub name_prefix: String,
}

impl VideoConfig {
    /// Recording switched off
    pub fn disabled() -> Self {
        VideoConfig {
            enabled: false,
            destination_path: None,
            episode_predicate: None,
            name_prefix: "rl-video".to_string(),
        }
    }

    /// Record into `destination` with the default episode schedule
    pub fn record_to(destination: impl Into<PathBuf>) -> Self {
        VideoConfig {
            enabled: true,
            destination_path: Some(destination.into()),
            ..Self::disabled()
        }
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(usize) -> bool + Send + Sync + 'static,
    {
        self.episode_predicate = Some(Arc::new(predicate));
        self
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.destination_path.is_none() {
            return Err(Error::precondition("save_path cannot be None if saving video"));
        }
        if self.name_prefix.is_empty() {
            return Err(Error::invalid_parameter("name_prefix", "must not be empty"));
        }
        Ok(())
    }

    /// The configured predicate, or the capped cubic schedule
    pub fn predicate(&self) -> EpisodePredicate {
        self.episode_predicate
            .clone()
            .unwrap_or_else(|| Arc::new(capped_cubic_schedule))
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for VideoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoConfig")
            .field("enabled", &self.enabled)
            .field("destination_path", &self.destination_path)
            .field("episode_predicate", &self.episode_predicate.as_ref().map(|_| "<fn>"))
            .field("name_prefix", &self.name_prefix)
            .finish()
    }
}

/// Episodes 0, 1, 8, 27, ... (perfect cubes) below 1000, then every 1000th.
pub fn capped_cubic_schedule(episode: usize) -> bool {
    if episode < 1000 {
        let root = (episode as f64).cbrt().round() as usize;
        root * root * root == episode
    } else {
        episode % 1000 == 0
    }
}

#[derive(Serialize)]
struct RecordedStep {
    action: usize,
    reward: f32,
    observation: Vec<f32>,
    terminated: bool,
    truncated: bool,
}

#[derive(Serialize)]
struct EpisodeRecording {
    env_id: String,
    episode: usize,
    initial_observation: Vec<f32>,
    total_reward: f32,
    steps: Vec<RecordedStep>,
}

/// Writes the transitions of selected episodes as JSON files.
///
/// File name: `{name_prefix}-episode-{n}.json`, written when the episode ends
/// (or when it is abandoned by a reset or drop).
pub struct EpisodeRecorder {
    env: Box<dyn Environment>,
    destination: PathBuf,
    predicate: EpisodePredicate,
    name_prefix: String,
    episodes_started: usize,
    current: Option<EpisodeRecording>,
}

impl EpisodeRecorder {
    pub fn new(
        env: Box<dyn Environment>,
        destination: impl Into<PathBuf>,
        predicate: EpisodePredicate,
        name_prefix: impl Into<String>,
    ) -> Result<Self> {
        let destination = destination.into();
        fs::create_dir_all(&destination)?;
        Ok(EpisodeRecorder {
            env,
            destination,
            predicate,
            name_prefix: name_prefix.into(),
            episodes_started: 0,
            current: None,
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path of the file for episode `episode`
    pub fn episode_path(&self, episode: usize) -> PathBuf {
        self.destination
            .join(format!("{}-episode-{}.json", self.name_prefix, episode))
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(recording) = self.current.take() {
            let path = self.episode_path(recording.episode);
            let mut writer = BufWriter::new(fs::File::create(&path)?);
            serde_json::to_writer(&mut writer, &recording)?;
            writer.flush()?;
            tracing::debug!(path = %path.display(), steps = recording.steps.len(), "wrote episode recording");
        }
        Ok(())
    }
}

impl Environment for EpisodeRecorder {
    fn id(&self) -> &str {
        self.env.id()
    }

    fn reset(&mut self) -> Array1<f32> {
        if let Err(err) = self.flush() {
            tracing::warn!("failed to write abandoned episode recording: {}", err);
        }

        let observation = self.env.reset();
        let episode = self.episodes_started;
        self.episodes_started += 1;

        if (self.predicate)(episode) {
            self.current = Some(EpisodeRecording {
                env_id: self.env.id().to_string(),
                episode,
                initial_observation: observation.to_vec(),
                total_reward: 0.0,
                steps: Vec::new(),
            });
        }
        observation
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let step = self.env.step(action)?;
        if let Some(recording) = self.current.as_mut() {
            recording.total_reward += step.reward;
            recording.steps.push(RecordedStep {
                action,
                reward: step.reward,
                observation: step.observation.to_vec(),
                terminated: step.terminated,
                truncated: step.truncated,
            });
        }
        if step.done() {
            if let Err(err) = self.flush() {
                tracing::warn!("failed to write episode recording: {}", err);
            }
        }
        Ok(step)
    }

    fn action_space_size(&self) -> usize {
        self.env.action_space_size()
    }

    fn observation_size(&self) -> usize {
        self.env.observation_size()
    }

    fn seed(&mut self, seed: u64) {
        self.env.seed(seed)
    }
}

impl Drop for EpisodeRecorder {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!("failed to write episode recording on drop: {}", err);
        }
    }
}
