//! Deterministic registry harness

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gamevis_cloud::{PointCloud, PointXyzRgb};
use gamevis_core::{ManualClock, Stamp};
use gamevis_msgs::{CloudMessage, Marker};
use gamevis_registry::{ColorPrompt, GameVisualizer, VisualizerConfig};
use gamevis_transport::{LocalBus, Subscription};

/// Color input that answers from a fixed script, then hits EOF
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    lines: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl ColorPrompt for ScriptedPrompt {
    fn read_channel(&mut self, _label: &str) -> Option<String> {
        self.lines.pop_front()
    }
}

/// Registry wired to a bus and clock the test controls
pub struct TestHarness {
    pub visualizer: GameVisualizer,
    pub bus: LocalBus,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    pub const START: Stamp = Stamp(1_000_000);

    pub fn new() -> Self {
        Self::with_config(VisualizerConfig {
            rng_seed: Some(0x5eed),
            ..Default::default()
        })
    }

    pub fn with_config(config: VisualizerConfig) -> Self {
        Self::with_prompt(config, ScriptedPrompt::default())
    }

    pub fn with_prompt(config: VisualizerConfig, prompt: ScriptedPrompt) -> Self {
        let bus = LocalBus::new();
        let clock = Arc::new(ManualClock::new(Self::START));
        let visualizer = GameVisualizer::new(config, Arc::new(bus.clone()), clock.clone())
            .with_prompt(Box::new(prompt));
        TestHarness {
            visualizer,
            bus,
            clock,
        }
    }

    pub fn tick(&self, dt: Duration) -> Stamp {
        self.clock.advance(dt)
    }

    pub fn points_of(&self, id: &str) -> Subscription<CloudMessage> {
        let topic = format!("{}{}", id, self.visualizer.config().points_suffix);
        self.bus.subscribe_points(&topic)
    }

    pub fn markers_of(&self, id: &str) -> Subscription<Marker> {
        let topic = format!("{}{}", id, self.visualizer.config().marker_suffix);
        self.bus.subscribe_markers(&topic)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// `n` points on a line along x, colored with a marker color the registry
/// must paint over
pub fn line_cloud(n: usize) -> PointCloud {
    (0..n)
        .map(|i| PointXyzRgb::new(i as f32 * 0.1, 0.0, 0.0).with_rgb(255, 0, 255))
        .collect()
}

/// `n` random points in a unit cube with random colors
pub fn random_cloud(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            PointXyzRgb::new(rng.gen(), rng.gen(), rng.gen()).with_rgb(rng.gen(), rng.gen(), rng.gen())
        })
        .collect()
}
