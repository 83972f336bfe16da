//! End-to-end registry scenarios over the in-process bus

use std::time::Duration;

use proptest::prelude::*;

use gamevis_cloud::{write_pcd_binary, CloudSource, PointCloud};
use gamevis_core::{ColorRgba, ColorTriple, Position3D, Stamp, VisError};
use gamevis_msgs::MarkerAction;
use gamevis_registry::{InputValidation, VisualizerConfig};

use crate::{line_cloud, random_cloud, ScriptedPrompt, TestHarness};

fn seeded(seed: u64) -> VisualizerConfig {
    VisualizerConfig {
        rng_seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_environment_points_take_environment_color() {
    let mut h = TestHarness::new();
    h.visualizer
        .add_environment("room1", ColorTriple::new(10, 20, 30))
        .unwrap();
    h.visualizer.set_environment_points("room1", line_cloud(5)).unwrap();

    let mut sub = h.points_of("room1");
    h.tick(Duration::from_millis(50));
    h.visualizer.publish_environment_points("room1").unwrap();

    let msg = sub.latest().unwrap();
    assert_eq!(msg.header.frame_id, "map");
    assert_eq!(msg.header.stamp, TestHarness::START + Duration::from_millis(50));
    let cloud = PointCloud::from_message(&msg).unwrap();
    assert_eq!(cloud.len(), 5);
    assert!(cloud.is_uniform(ColorTriple::new(10, 20, 30)));
}

#[test]
fn test_environment_marker_is_gray_and_persistent() {
    let mut h = TestHarness::new();
    h.visualizer
        .add_environment("room1", ColorTriple::new(10, 20, 30))
        .unwrap();
    h.visualizer
        .set_environment_marker("room1", "package://arena/room.dae", Position3D::new(1.0, 2.0, 3.0), 0.4)
        .unwrap();

    let mut sub = h.markers_of("room1");
    h.visualizer.publish_environment_marker("room1").unwrap();

    let marker = sub.latest().unwrap();
    assert_eq!(marker.ns, "environment");
    assert_eq!(marker.id, 0);
    assert_eq!(marker.mesh_resource, "package://arena/room.dae");
    assert_eq!(marker.pose.position, Position3D::new(1.0, 2.0, 3.0));
    assert!(marker.pose.orientation.is_identity());
    assert_eq!(marker.color, ColorRgba::NEUTRAL_GRAY.with_alpha(0.4));
    assert!(marker.is_persistent());
}

#[test]
fn test_tinted_quadruped_marker() {
    let mut h = TestHarness::new();
    h.visualizer.add_player("bot1", "bot.dae", false, true, 1).unwrap();

    assert_eq!(h.visualizer.player("bot1").unwrap().color(), ColorTriple::new(102, 194, 165));

    let mut sub = h.markers_of("bot1");
    h.visualizer
        .move_player_marker("bot1", Position3D::new(1.0, 2.0, 3.0))
        .unwrap();

    let marker = sub.latest().unwrap();
    assert_eq!(marker.ns, "bot1");
    assert_eq!(marker.pose.position, Position3D::new(1.0, 2.0, 3.0));
    assert_eq!(marker.color.r, 102.0 / 255.0);
    assert_eq!(marker.color.g, 194.0 / 255.0);
    assert_eq!(marker.color.b, 165.0 / 255.0);
    assert_eq!(marker.color.a, 1.0);
    assert!(!marker.mesh_use_embedded_materials);
}

#[test]
fn test_untinted_marker_uses_embedded_materials() {
    let mut h = TestHarness::new();
    h.visualizer.add_player("crane", "gantry.dae", false, false, 2).unwrap();
    let marker = h.visualizer.player("crane").unwrap().marker();
    assert!(marker.mesh_use_embedded_materials);
    assert_eq!(marker.color, ColorRgba::TRANSPARENT);
}

#[test]
fn test_player_points_accumulate() {
    let mut h = TestHarness::new();
    h.visualizer.add_player("bot1", "bot.dae", false, false, 0).unwrap();
    let mut sub = h.points_of("bot1");

    h.visualizer.add_player_points("bot1", line_cloud(3)).unwrap();
    h.visualizer.add_player_points("bot1", random_cloud(4, 9)).unwrap();

    let published = sub.drain();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].point_count(), 3);
    assert_eq!(published[1].point_count(), 7);

    let cloud = PointCloud::from_message(&published[1]).unwrap();
    assert!(cloud.is_uniform(ColorTriple::new(252, 141, 98)));
}

#[test]
fn test_environment_points_replace() {
    let mut h = TestHarness::new();
    h.visualizer.add_environment("room1", ColorTriple::new(1, 2, 3)).unwrap();
    h.visualizer.set_environment_points("room1", line_cloud(8)).unwrap();
    h.visualizer.set_environment_points("room1", line_cloud(2)).unwrap();
    assert_eq!(h.visualizer.environment("room1").unwrap().points().len(), 2);
}

#[test]
fn test_environment_points_from_pcd_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("room.pcd");
    let file = std::fs::File::create(&path).unwrap();
    write_pcd_binary(&random_cloud(12, 3), file).unwrap();

    let mut h = TestHarness::new();
    h.visualizer.add_environment("room1", ColorTriple::new(9, 9, 9)).unwrap();
    h.visualizer
        .set_environment_points("room1", CloudSource::File(path))
        .unwrap();

    let stored = h.visualizer.environment("room1").unwrap().points();
    assert_eq!(stored.len(), 12);
    assert!(stored.is_uniform(ColorTriple::new(9, 9, 9)));
}

#[test]
fn test_encoded_wire_cloud_is_accepted() {
    let wire = random_cloud(6, 1)
        .to_message("sensor", Stamp::from_millis(5))
        .unwrap()
        .encode()
        .unwrap();

    let mut h = TestHarness::new();
    h.visualizer.add_player("bot1", "bot.dae", false, false, 1).unwrap();
    h.visualizer.add_player_points("bot1", wire).unwrap();
    assert_eq!(h.visualizer.player("bot1").unwrap().points().len(), 6);
}

#[test]
fn test_clear_all_entities_forgets_ids() {
    let mut h = TestHarness::new();
    h.visualizer.add_environment("room1", ColorTriple::new(1, 2, 3)).unwrap();
    h.visualizer.add_player("bot1", "bot.dae", false, false, 0).unwrap();
    h.visualizer.clear_all_entities();

    assert!(h.visualizer.is_empty());
    let err = h.visualizer.publish_environment_points("room1").unwrap_err();
    assert!(err.is_unknown_entity());
    let err = h
        .visualizer
        .move_player_marker("bot1", Position3D::zero())
        .unwrap_err();
    assert!(matches!(err, VisError::UnknownEntity { .. }));
    assert_eq!(h.bus.publisher_count("bot1/marker"), 0);
}

#[test]
fn test_late_joiner_after_clear_gets_nothing() {
    let mut h = TestHarness::new();
    h.visualizer.add_environment("room1", ColorTriple::new(1, 2, 3)).unwrap();
    h.visualizer.set_environment_points("room1", line_cloud(7)).unwrap();
    h.visualizer.publish_environment_points("room1").unwrap();
    h.visualizer.clear_all_entities();

    assert!(h.points_of("room1").drain().is_empty());

    h.visualizer.add_environment("room1", ColorTriple::new(40, 50, 60)).unwrap();
    assert!(h.points_of("room1").drain().is_empty());
    h.visualizer.publish_environment_points("room1").unwrap();

    let replayed = h.points_of("room1").drain();
    assert_eq!(replayed.len(), 1);
    assert!(replayed[0].is_empty());
}

#[test]
fn test_clear_all_visuals_keeps_entities() {
    let mut h = TestHarness::new();
    h.visualizer.add_environment("room1", ColorTriple::new(1, 2, 3)).unwrap();
    h.visualizer.set_environment_points("room1", line_cloud(4)).unwrap();
    h.visualizer.add_player("bot1", "bot.dae", false, false, 0).unwrap();

    let mut env_points = h.points_of("room1");
    let mut bot_marker = h.markers_of("bot1");
    h.visualizer.clear_all_visuals().unwrap();

    assert!(env_points.latest().unwrap().is_empty());
    assert_eq!(bot_marker.latest().unwrap().action, MarkerAction::DeleteAll);

    assert_eq!(h.visualizer.len(), 2);
    assert_eq!(h.visualizer.environment("room1").unwrap().points().len(), 4);
    h.visualizer.publish_environment_points("room1").unwrap();
    assert_eq!(env_points.latest().unwrap().point_count(), 4);
}

#[test]
fn test_unknown_ids_fail_without_side_effects() {
    let mut h = TestHarness::new();
    assert!(h
        .visualizer
        .set_environment_points("ghost", line_cloud(1))
        .unwrap_err()
        .is_unknown_entity());
    assert!(h
        .visualizer
        .add_player_points("ghost", line_cloud(1))
        .unwrap_err()
        .is_unknown_entity());
    assert!(h.visualizer.publish_player_points("ghost").unwrap_err().is_unknown_entity());
    assert!(h.bus.topics().is_empty());
}

#[test]
fn test_interactive_out_of_range_red_is_kept() {
    let prompt = ScriptedPrompt::new(["300", "0", "0"]);
    let mut h = TestHarness::with_prompt(seeded(4), prompt);
    h.visualizer.add_player("bot1", "bot.dae", true, false, 0).unwrap();
    assert_eq!(h.visualizer.player("bot1").unwrap().color(), ColorTriple::new(300, 0, 0));
}

#[test]
fn test_interactive_wide_red_is_narrowed() {
    let prompt = ScriptedPrompt::new(["40000", "0", "0"]);
    let mut h = TestHarness::with_prompt(seeded(4), prompt);
    h.visualizer.add_player("bot1", "bot.dae", true, false, 0).unwrap();
    assert_eq!(h.visualizer.player("bot1").unwrap().color(), ColorTriple::new(-25536, 0, 0));
}

#[test]
fn test_interactive_out_of_range_blue_is_replaced() {
    let prompt = ScriptedPrompt::new(["0", "0", "300"]);
    let mut h = TestHarness::with_prompt(seeded(4), prompt);
    h.visualizer.add_player("bot1", "bot.dae", true, false, 0).unwrap();
    let color = h.visualizer.player("bot1").unwrap().color();
    assert_eq!((color.r, color.g), (0, 0));
    assert!((0..=255).contains(&color.b));
}

#[test]
fn test_symmetric_validation_replaces_red() {
    let config = VisualizerConfig {
        input_validation: InputValidation::Symmetric,
        ..seeded(4)
    };
    let prompt = ScriptedPrompt::new(["300", "0", "0"]);
    let mut h = TestHarness::with_prompt(config, prompt);
    h.visualizer.add_player("bot1", "bot.dae", true, false, 0).unwrap();
    assert!(h.visualizer.player("bot1").unwrap().color().is_in_range());
}

#[test]
fn test_same_seed_same_random_colors() {
    let colors = |seed| {
        let mut h = TestHarness::with_config(seeded(seed));
        (0..5)
            .map(|i| {
                let id = format!("bot{}", i);
                h.visualizer.add_player(&id, "bot.dae", false, false, -1).unwrap();
                h.visualizer.player(&id).unwrap().color()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(colors(21), colors(21));
}

#[test]
fn test_late_subscriber_sees_retained_marker() {
    let mut h = TestHarness::new();
    h.visualizer.add_player("bot1", "bot.dae", false, false, 0).unwrap();
    h.visualizer
        .move_player_marker("bot1", Position3D::new(4.0, 0.0, 0.0))
        .unwrap();

    let mut late = h.markers_of("bot1");
    assert_eq!(late.latest().unwrap().pose.position, Position3D::new(4.0, 0.0, 0.0));
}

#[test]
fn test_readding_player_resets_state() {
    let mut h = TestHarness::new();
    h.visualizer.add_player("bot1", "bot.dae", false, false, 0).unwrap();
    h.visualizer.add_player_points("bot1", line_cloud(3)).unwrap();
    h.visualizer.add_player("bot1", "bot.dae", false, false, 1).unwrap();

    let vis = h.visualizer.player("bot1").unwrap();
    assert!(vis.points().is_empty());
    assert_eq!(vis.color(), ColorTriple::new(102, 194, 165));
    assert_eq!(h.bus.publisher_count("bot1/points"), 1);
}

proptest! {
    #[test]
    fn prop_palette_lookup(tag in any::<i32>().prop_filter("not random", |t| *t != -1)) {
        let mut h = TestHarness::new();
        h.visualizer.add_player("p", "p.dae", false, false, tag).unwrap();
        let expected = match tag {
            0 => ColorTriple::new(252, 141, 98),
            1 => ColorTriple::new(102, 194, 165),
            _ => ColorTriple::new(141, 160, 203),
        };
        prop_assert_eq!(h.visualizer.player("p").unwrap().color(), expected);
    }

    #[test]
    fn prop_random_players_in_range(seed in any::<u64>()) {
        let mut h = TestHarness::with_config(seeded(seed));
        h.visualizer.add_player("p", "p.dae", false, false, -1).unwrap();
        prop_assert!(h.visualizer.player("p").unwrap().color().is_in_range());
    }

    #[test]
    fn prop_accumulated_count(batches in proptest::collection::vec(0usize..20, 1..6)) {
        let mut h = TestHarness::new();
        h.visualizer.add_player("p", "p.dae", false, false, 0).unwrap();
        for n in &batches {
            h.visualizer.add_player_points("p", line_cloud(*n)).unwrap();
        }
        let total: usize = batches.iter().sum();
        prop_assert_eq!(h.visualizer.player("p").unwrap().points().len(), total);
    }
}
