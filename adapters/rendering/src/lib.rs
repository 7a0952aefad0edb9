#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Crowd Runner adapters.

use anyhow::Result as AnyResult;
use glam::Vec3;
use std::{error::Error, fmt, time::Duration};

use crowd_runner_core::{DoorSide, RgbColor, UnitCategory, UnitId};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color dimmed towards black by the provided amount.
    #[must_use]
    pub fn dim(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            red: self.red * keep,
            green: self.green * keep,
            blue: self.blue * keep,
            alpha: self.alpha,
        }
    }
}

impl From<RgbColor> for Color {
    fn from(color: RgbColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Fill color conventionally used for units of the given category.
#[must_use]
pub const fn category_color(category: UnitCategory) -> Color {
    match category {
        UnitCategory::Generic => Color::from_rgb_u8(96, 96, 110),
        UnitCategory::Empty => Color::from_rgb_u8(70, 110, 70),
        UnitCategory::Long => Color::from_rgb_u8(90, 90, 140),
        UnitCategory::Hard => Color::from_rgb_u8(140, 80, 80),
    }
}

/// One face of a rendered door pair.
#[derive(Clone, Debug, PartialEq)]
pub struct DoorFacePresentation {
    /// Side of the pair the face occupies.
    pub side: DoorSide,
    /// Display label combining the arithmetic symbol and magnitude.
    pub label: String,
    /// Fill color of the face.
    pub color: Color,
}

impl DoorFacePresentation {
    /// Creates a new door face descriptor.
    #[must_use]
    pub fn new(side: DoorSide, label: impl Into<String>, color: Color) -> Self {
        Self {
            side,
            label: label.into(),
            color,
        }
    }
}

/// Rendered bonus door spanning the road at a unit's start offset.
#[derive(Clone, Debug, PartialEq)]
pub struct DoorPresentation {
    /// Identifier of the unit carrying the door.
    pub unit: UnitId,
    /// Offset along the track axis where the door stands.
    pub offset: f32,
    /// Whether the door currently accepts a choice; spent doors render dim.
    pub armed: bool,
    /// Face occupying the non-positive lateral half.
    pub left: DoorFacePresentation,
    /// Face occupying the positive lateral half.
    pub right: DoorFacePresentation,
}

/// Rendered strip of road covering one placed unit's interval.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackStripPresentation {
    /// Identifier of the unit the strip covers.
    pub unit: UnitId,
    /// Start offset of the strip along the track axis.
    pub start: f32,
    /// End offset of the strip along the track axis.
    pub end: f32,
    /// Fill color derived from the unit's category.
    pub color: Color,
}

impl TrackStripPresentation {
    /// Creates a new strip descriptor covering a non-empty interval.
    pub fn new(unit: UnitId, start: f32, end: f32, color: Color) -> Result<Self, RenderingError> {
        if end <= start {
            return Err(RenderingError::EmptyStrip { start, end });
        }
        Ok(Self {
            unit,
            start,
            end,
            color,
        })
    }

    /// Length of the strip along the track axis.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// Rendered crowd runner positioned relative to the crowd anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunnerPresentation {
    /// Position relative to the crowd anchor on the ground plane.
    pub position: Vec3,
    /// Fill color of the runner's body.
    pub color: Color,
}

impl RunnerPresentation {
    /// Creates a new runner descriptor.
    #[must_use]
    pub const fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}

/// Counter label floating above the crowd.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterPresentation {
    /// Number of runners currently in the crowd.
    pub count: u32,
    /// Rendered text of the counter.
    pub label: String,
}

impl CounterPresentation {
    /// Creates a counter descriptor for the provided runner count.
    #[must_use]
    pub fn new(count: u32) -> Self {
        Self {
            count,
            label: count.to_string(),
        }
    }
}

/// Scene description combining the track window, doors and the crowd.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Road strips covering the currently placed units, in offset order.
    pub strips: Vec<TrackStripPresentation>,
    /// Doors standing on the placed units.
    pub doors: Vec<DoorPresentation>,
    /// Crowd runners positioned relative to the crowd anchor.
    pub runners: Vec<RunnerPresentation>,
    /// Counter label floating above the crowd.
    pub counter: CounterPresentation,
    /// Observer offset along the track axis.
    pub observer: f32,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        strips: Vec<TrackStripPresentation>,
        doors: Vec<DoorPresentation>,
        runners: Vec<RunnerPresentation>,
        counter: CounterPresentation,
        observer: f32,
    ) -> Self {
        Self {
            strips,
            doors,
            runners,
            counter,
            observer,
        }
    }

    /// Total road length currently covered by the scene's strips.
    #[must_use]
    pub fn covered_length(&self) -> f32 {
        self.strips.iter().map(TrackStripPresentation::length).sum()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Crowd Runner scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame
    /// delta and may replace the scene content before it is rendered,
    /// allowing adapters to animate world snapshots deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Track strips must cover a positive-length interval.
    EmptyStrip {
        /// Start offset that failed validation.
        start: f32,
        /// End offset that failed validation.
        end: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStrip { start, end } => {
                write!(f, "track strip must end after it starts ({start}..{end})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_creation_rejects_empty_intervals() {
        let error = TrackStripPresentation::new(UnitId::new(0), 10.0, 10.0, Color::from_rgb_u8(0, 0, 0))
            .expect_err("zero-length strips must be rejected");
        assert_eq!(
            error,
            RenderingError::EmptyStrip {
                start: 10.0,
                end: 10.0
            }
        );
    }

    #[test]
    fn covered_length_sums_strip_intervals() {
        let color = category_color(UnitCategory::Generic);
        let strips = vec![
            TrackStripPresentation::new(UnitId::new(0), 0.0, 10.0, color).expect("valid strip"),
            TrackStripPresentation::new(UnitId::new(1), 10.0, 17.5, color).expect("valid strip"),
        ];
        let scene = Scene::new(strips, Vec::new(), Vec::new(), CounterPresentation::new(0), 0.0);
        assert!((scene.covered_length() - 17.5).abs() < 1e-6);
    }

    #[test]
    fn dimming_moves_channels_towards_black() {
        let color = Color::from_rgb_u8(200, 100, 50).dim(0.5);
        assert!((color.red - 200.0 / 255.0 * 0.5).abs() < 1e-6);
        assert!((color.alpha - 1.0).abs() < 1e-6);
    }

    #[test]
    fn byte_colors_convert_to_unit_channels() {
        let color: Color = RgbColor::from_rgb(255, 0, 128).into();
        assert!((color.red - 1.0).abs() < 1e-6);
        assert!((color.green - 0.0).abs() < 1e-6);
        assert!((color.blue - 128.0 / 255.0).abs() < 1e-6);
    }
}
