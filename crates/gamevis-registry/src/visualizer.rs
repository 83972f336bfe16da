//! Game Visualizer - the entity visual registry
//!
//! Owns the environment and player mappings. Every operation on an id that
//! is not registered fails with `VisError::UnknownEntity`.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use gamevis_cloud::CloudSource;
use gamevis_core::{
    Clock, ColorRgba, ColorTriple, EntityId, EntityKind, Position3D, VisError, VisResult,
};
use gamevis_msgs::Marker;
use gamevis_transport::{ChannelFactory, QosProfile};

use crate::{ColorPrompt, ColorStrategy, StdinPrompt, VisualState, VisualizerConfig};

/// Entity visual registry
pub struct GameVisualizer {
    config: VisualizerConfig,
    channels: Arc<dyn ChannelFactory>,
    clock: Arc<dyn Clock>,
    prompt: Box<dyn ColorPrompt>,
    rng: StdRng,
    environments: HashMap<String, VisualState>,
    players: HashMap<String, VisualState>,
}

impl GameVisualizer {
    /// Create a registry reading interactive colors from stdin
    pub fn new(config: VisualizerConfig, channels: Arc<dyn ChannelFactory>, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(frame_id = %config.frame_id, "created game visualizer");
        GameVisualizer {
            config,
            channels,
            clock,
            prompt: Box::new(StdinPrompt),
            rng,
            environments: HashMap::new(),
            players: HashMap::new(),
        }
    }

    /// Replace the interactive color input
    pub fn with_prompt(mut self, prompt: Box<dyn ColorPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Whole-registry operations
    // ------------------------------------------------------------------

    /// Send an empty cloud and a delete-all marker on every channel.
    /// Entities stay registered.
    pub fn clear_all_visuals(&self) -> VisResult<()> {
        let stamp = self.clock.now();
        for vis in self.environments.values().chain(self.players.values()) {
            vis.publish_clear(&self.config.frame_id, stamp)?;
        }
        info!(
            environments = self.environments.len(),
            players = self.players.len(),
            "cleared visuals"
        );
        Ok(())
    }

    /// Forget every entity and release its channels
    pub fn clear_all_entities(&mut self) {
        self.environments.clear();
        self.players.clear();
        info!("cleared objects");
    }

    // ------------------------------------------------------------------
    // Environments
    // ------------------------------------------------------------------

    /// Register an environment, replacing any previous entry with this id.
    /// A replaced entry's channels are released first, so nothing it sent
    /// is replayed to late joiners.
    pub fn add_environment(&mut self, id: &str, color: ColorTriple) -> VisResult<()> {
        self.environments.remove(id);
        let ns = self.config.environment_namespace.clone();
        let marker = Marker::mesh(self.config.frame_id.clone(), ns, String::new());
        let vis = self.bind(EntityKind::Environment, id, color, marker)?;
        self.environments.insert(id.to_string(), vis);
        info!(entity = id, ?color, "added environment");
        Ok(())
    }

    /// Place the environment's mesh marker: unit scale, identity
    /// orientation, neutral gray at `alpha`, never expires
    pub fn set_environment_marker(
        &mut self,
        id: &str,
        mesh_resource: &str,
        position: Position3D,
        alpha: f32,
    ) -> VisResult<()> {
        let frame_id = self.config.frame_id.clone();
        let ns = self.config.environment_namespace.clone();
        let vis = lookup_mut(&mut self.environments, EntityKind::Environment, id)?;

        let mut marker = Marker::mesh(frame_id, ns, mesh_resource);
        marker.set_position(position);
        marker.color = ColorRgba::NEUTRAL_GRAY.with_alpha(alpha);
        *vis.marker_mut() = marker;

        info!(entity = id, mesh = mesh_resource, "added environment marker");
        Ok(())
    }

    pub fn publish_environment_marker(&mut self, id: &str) -> VisResult<()> {
        let stamp = self.clock.now();
        lookup_mut(&mut self.environments, EntityKind::Environment, id)?.publish_marker(stamp)?;
        info!(entity = id, "published environment marker");
        Ok(())
    }

    /// Recolor the cloud to the environment color and replace the stored one
    pub fn set_environment_points(&mut self, id: &str, source: impl Into<CloudSource>) -> VisResult<()> {
        let vis = lookup_mut(&mut self.environments, EntityKind::Environment, id)?;
        let cloud = source.into().into_cloud()?;
        let count = cloud.len();
        vis.replace_points(cloud);
        info!(entity = id, points = count, "added environment points");
        Ok(())
    }

    pub fn publish_environment_points(&self, id: &str) -> VisResult<()> {
        let vis = lookup(&self.environments, EntityKind::Environment, id)?;
        vis.publish_points(&self.config.frame_id, self.clock.now())?;
        info!(entity = id, points = vis.points().len(), "published environment points");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// Register a player, replacing any previous entry with this id.
    ///
    /// The color comes from interactive input when `use_interactive_color`
    /// is set, else a random color for `kind_tag == -1`, else the palette of
    /// the tag's kind. With `tint_marker_by_color` the marker is tinted with
    /// that color; otherwise it uses the mesh's embedded materials.
    pub fn add_player(
        &mut self,
        id: &str,
        mesh_resource: &str,
        use_interactive_color: bool,
        tint_marker_by_color: bool,
        kind_tag: i32,
    ) -> VisResult<()> {
        let strategy = ColorStrategy::select(use_interactive_color, kind_tag);
        let color = strategy.resolve(
            self.prompt.as_mut(),
            &mut self.rng,
            self.config.input_validation,
        );

        let mut marker = Marker::mesh(self.config.frame_id.clone(), id, mesh_resource);
        if tint_marker_by_color {
            marker.color = color.normalized();
        } else {
            marker.mesh_use_embedded_materials = true;
        }

        self.players.remove(id);
        let vis = self.bind(EntityKind::Player, id, color, marker)?;
        self.players.insert(id.to_string(), vis);
        info!(entity = id, ?strategy, ?color, "added player");
        Ok(())
    }

    /// Move the player's marker and publish it right away
    pub fn move_player_marker(&mut self, id: &str, position: Position3D) -> VisResult<()> {
        lookup_mut(&mut self.players, EntityKind::Player, id)?
            .marker_mut()
            .set_position(position);
        self.publish_player_marker(id)
    }

    pub fn publish_player_marker(&mut self, id: &str) -> VisResult<()> {
        let stamp = self.clock.now();
        lookup_mut(&mut self.players, EntityKind::Player, id)?.publish_marker(stamp)?;
        debug!(entity = id, "published player marker");
        Ok(())
    }

    /// Recolor the cloud to the player color, append it to the stored
    /// cloud and publish the result
    pub fn add_player_points(&mut self, id: &str, source: impl Into<CloudSource>) -> VisResult<()> {
        let vis = lookup_mut(&mut self.players, EntityKind::Player, id)?;
        let cloud = source.into().into_cloud()?;
        vis.accrete_points(cloud);
        self.publish_player_points(id)
    }

    pub fn publish_player_points(&self, id: &str) -> VisResult<()> {
        let vis = lookup(&self.players, EntityKind::Player, id)?;
        vis.publish_points(&self.config.frame_id, self.clock.now())?;
        debug!(entity = id, points = vis.points().len(), "published player points");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn environment(&self, id: &str) -> VisResult<&VisualState> {
        lookup(&self.environments, EntityKind::Environment, id)
    }

    pub fn player(&self, id: &str) -> VisResult<&VisualState> {
        lookup(&self.players, EntityKind::Player, id)
    }

    pub fn environment_ids(&self) -> Vec<&str> {
        sorted_ids(&self.environments)
    }

    pub fn player_ids(&self) -> Vec<&str> {
        sorted_ids(&self.players)
    }

    /// Registered entities across both mappings
    pub fn len(&self) -> usize {
        self.environments.len() + self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bind(&self, kind: EntityKind, id: &str, color: ColorTriple, marker: Marker) -> VisResult<VisualState> {
        let entity = EntityId::new(id);
        let qos = QosProfile::latched(self.config.history_depth);
        let points_channel = self
            .channels
            .points_channel(&entity.topic(&self.config.points_suffix), qos)?;
        let marker_channel = self
            .channels
            .marker_channel(&entity.topic(&self.config.marker_suffix), qos)?;
        Ok(VisualState::new(entity, kind, color, marker, points_channel, marker_channel))
    }
}

fn lookup<'a>(map: &'a HashMap<String, VisualState>, kind: EntityKind, id: &str) -> VisResult<&'a VisualState> {
    map.get(id).ok_or_else(|| VisError::unknown(kind, id))
}

fn lookup_mut<'a>(
    map: &'a mut HashMap<String, VisualState>,
    kind: EntityKind,
    id: &str,
) -> VisResult<&'a mut VisualState> {
    map.get_mut(id).ok_or_else(|| VisError::unknown(kind, id))
}

fn sorted_ids(map: &HashMap<String, VisualState>) -> Vec<&str> {
    let mut ids: Vec<&str> = map.keys().map(String::as_str).collect();
    ids.sort_unstable();
    ids
}
