//! Color resolution for new players
//!
//! Strategies are evaluated in a fixed order: interactive input wins over the
//! random tag, which wins over the per-kind palette.

use gamevis_core::ColorTriple;
use rand::Rng;
use tracing::warn;

use crate::{parse_leading_int, ColorPrompt, InputValidation};

/// Kind tag that asks for a random color
pub const RANDOM_KIND_TAG: i32 = -1;

/// Player categories with a fixed palette
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PlayerKind {
    Drone = 0,
    Quadruped = 1,
    Gantry = 2,
}

impl PlayerKind {
    /// Unknown tags fall back to `Gantry`
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            0 => PlayerKind::Drone,
            1 => PlayerKind::Quadruped,
            _ => PlayerKind::Gantry,
        }
    }

    pub fn palette(self) -> ColorTriple {
        match self {
            PlayerKind::Drone => ColorTriple::new(252, 141, 98),
            PlayerKind::Quadruped => ColorTriple::new(102, 194, 165),
            PlayerKind::Gantry => ColorTriple::new(141, 160, 203),
        }
    }
}

/// How a player's color is chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorStrategy {
    Interactive,
    Random,
    Palette(PlayerKind),
}

impl ColorStrategy {
    pub fn select(use_interactive: bool, kind_tag: i32) -> Self {
        if use_interactive {
            ColorStrategy::Interactive
        } else if kind_tag == RANDOM_KIND_TAG {
            ColorStrategy::Random
        } else {
            ColorStrategy::Palette(PlayerKind::from_tag(kind_tag))
        }
    }

    pub fn resolve<R: Rng + ?Sized>(
        self,
        prompt: &mut dyn ColorPrompt,
        rng: &mut R,
        validation: InputValidation,
    ) -> ColorTriple {
        match self {
            ColorStrategy::Interactive => read_interactive(prompt, rng, validation),
            ColorStrategy::Random => random_color(rng),
            ColorStrategy::Palette(kind) => kind.palette(),
        }
    }
}

pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> ColorTriple {
    ColorTriple::new(random_channel(rng), random_channel(rng), random_channel(rng))
}

fn random_channel<R: Rng + ?Sized>(rng: &mut R) -> i16 {
    rng.gen_range(0..=255)
}

/// Read R, G and B. Malformed channels get a random value instead.
///
/// Channels that are not range-checked are narrowed to `i16` with wrapping,
/// so `"40000"` is stored as -25536.
pub fn read_interactive<R: Rng + ?Sized>(
    prompt: &mut dyn ColorPrompt,
    rng: &mut R,
    validation: InputValidation,
) -> ColorTriple {
    let mut channels = [0i16; 3];
    for (i, label) in ["R", "G", "B"].into_iter().enumerate() {
        let range_checked = match validation {
            InputValidation::Legacy => i == 2,
            InputValidation::Symmetric => true,
        };

        let raw = prompt.read_channel(label);
        let value = raw
            .as_deref()
            .and_then(parse_leading_int)
            .filter(|v| !range_checked || (0..=255).contains(v));

        channels[i] = match value {
            Some(v) => v as i16,
            None => {
                let v = random_channel(rng);
                warn!(
                    channel = label,
                    input = ?raw.as_deref().map(str::trim),
                    substitute = v,
                    "color input rejected"
                );
                v
            }
        };
    }
    ColorTriple::new(channels[0], channels[1], channels[2])
}
