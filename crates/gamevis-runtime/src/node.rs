//! Visualizer Node - one registry bound to one bus

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use gamevis_core::{Clock, SystemClock, VisResult};
use gamevis_registry::{ColorPrompt, GameVisualizer, StdinPrompt};
use gamevis_transport::LocalBus;

use crate::{init_tracing, NodeConfig};

/// Registry handle shared between callers.
///
/// The mutex makes every lookup-then-mutate sequence atomic.
pub type SharedVisualizer = Arc<Mutex<GameVisualizer>>;

/// A visualizer wired to an in-process bus
pub struct VisualizerNode {
    config: NodeConfig,
    bus: LocalBus,
    visualizer: SharedVisualizer,
}

impl VisualizerNode {
    /// Build a node on a fresh bus with the wall clock and stdin color input
    pub fn new(config: NodeConfig) -> Self {
        Self::with_parts(config, LocalBus::new(), Arc::new(SystemClock), Box::new(StdinPrompt))
    }

    /// Build a node from injected parts
    pub fn with_parts(
        config: NodeConfig,
        bus: LocalBus,
        clock: Arc<dyn Clock>,
        prompt: Box<dyn ColorPrompt>,
    ) -> Self {
        let visualizer = GameVisualizer::new(config.visualizer.clone(), Arc::new(bus.clone()), clock)
            .with_prompt(prompt);
        VisualizerNode {
            config,
            bus,
            visualizer: Arc::new(Mutex::new(visualizer)),
        }
    }

    /// Install tracing from the node's telemetry settings, then build the node
    pub fn start(config: NodeConfig) -> VisResult<Self> {
        let installed = init_tracing(&config.telemetry)?;
        let node = Self::new(config);
        info!(subscriber_installed = installed, "visualizer node started");
        Ok(node)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Bus the registry publishes on, for subscribers
    pub fn bus(&self) -> &LocalBus {
        &self.bus
    }

    pub fn handle(&self) -> SharedVisualizer {
        Arc::clone(&self.visualizer)
    }

    /// Blank every channel and forget every entity
    pub fn shutdown(&self) -> VisResult<()> {
        let mut vis = self.visualizer.lock();
        vis.clear_all_visuals()?;
        vis.clear_all_entities();
        info!("visualizer node stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use gamevis_cloud::{PointCloud, PointXyzRgb};
    use gamevis_core::{ColorTriple, ManualClock, Position3D, Stamp};
    use gamevis_msgs::MarkerAction;

    struct NoInput;

    impl ColorPrompt for NoInput {
        fn read_channel(&mut self, _label: &str) -> Option<String> {
            None
        }
    }

    fn node() -> VisualizerNode {
        VisualizerNode::with_parts(
            NodeConfig::default(),
            LocalBus::new(),
            Arc::new(ManualClock::new(Stamp::from_millis(10))),
            Box::new(NoInput),
        )
    }

    #[test]
    fn test_concurrent_players() {
        let node = node();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let vis = node.handle();
                thread::spawn(move || {
                    let id = format!("bot{}", t);
                    vis.lock().add_player(&id, "bot.dae", false, false, t).unwrap();
                    for i in 0..5 {
                        let cloud: PointCloud = vec![PointXyzRgb::new(i as f32, 0.0, 0.0)].into_iter().collect();
                        vis.lock().add_player_points(&id, cloud).unwrap();
                        vis.lock()
                            .move_player_marker(&id, Position3D::new(i as f32, 0.0, 0.0))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let vis = node.handle();
        let vis = vis.lock();
        assert_eq!(vis.player_ids(), vec!["bot0", "bot1", "bot2", "bot3"]);
        for id in vis.player_ids() {
            assert_eq!(vis.player(id).unwrap().points().len(), 5);
        }
        assert_eq!(node.bus().published_count("bot2/points"), 5);
    }

    #[test]
    fn test_shutdown_blanks_and_forgets() {
        let node = node();
        node.handle()
            .lock()
            .add_environment("room1", ColorTriple::new(1, 2, 3))
            .unwrap();
        let mut markers = node.bus().subscribe_markers("room1/marker");

        node.shutdown().unwrap();
        assert_eq!(markers.latest().unwrap().action, MarkerAction::DeleteAll);
        assert!(node.handle().lock().is_empty());
        assert_eq!(node.bus().publisher_count("room1/marker"), 0);
    }
}
