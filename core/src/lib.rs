#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crowd Runner engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. It also holds the static
//! configuration data model: weighted chunk tables and door pair configs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Crowd Runner.";

/// Minimum spacing a placed unit occupies along the generation axis.
///
/// Definitions with a shorter (or non-positive) length are padded to this
/// value at placement time so the cursor always advances.
pub const MIN_UNIT_LENGTH: f32 = 0.01;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records the observer's position projected onto the generation axis.
    SetObserverPosition {
        /// Offset of the observer along the generation axis.
        position: f32,
    },
    /// Replaces the crowd configuration and resets the runner count.
    ConfigureCrowd {
        /// Nominal spacing between successive spiral rings.
        base_spacing: f32,
        /// Angle in degrees advanced per runner index (golden angle).
        angle_step_degrees: f32,
        /// Maximum world radius of the crowd; 0 disables compression.
        max_world_radius: f32,
        /// Maximum number of runners; 0 means unlimited.
        max_count: u32,
        /// Number of runners present after configuration.
        initial_count: u32,
    },
    /// Removes every placed unit and resets the streaming cursor.
    ClearTrack,
    /// Materializes one unit at the current cursor position.
    PlaceUnit {
        /// Definition of the unit to place.
        definition: UnitDefinition,
    },
    /// Releases window-front units whose end lies before the cutoff.
    ReleaseBehind {
        /// Offset on the generation axis behind which units despawn.
        cutoff: f32,
    },
    /// Reports that an actor entered a door unit's trigger region.
    EnterDoor {
        /// Identifier of the unit carrying the door.
        unit: UnitId,
        /// Kind of actor that entered the region.
        actor: ActorKind,
        /// Lateral offset of the actor relative to the door's local center.
        lateral_offset: f32,
    },
    /// Reports that an actor entered the finish unit's trigger region.
    EnterFinish {
        /// Identifier of the finish unit.
        unit: UnitId,
        /// Kind of actor that entered the region.
        actor: ActorKind,
    },
    /// Applies an arithmetic bonus to the crowd population.
    ApplyBonus {
        /// Arithmetic kind dispatched on by the crowd.
        kind: BonusKind,
        /// Unsigned magnitude of the bonus.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the observer position was recorded.
    ObserverMoved {
        /// Offset of the observer along the generation axis.
        position: f32,
    },
    /// Confirms that all placed units were removed.
    TrackCleared,
    /// Confirms that a unit was placed into the active window.
    UnitPlaced {
        /// Identifier assigned to the placed unit.
        unit: UnitId,
        /// Category tag of the placed unit.
        category: UnitCategory,
        /// Start offset of the occupied interval.
        start: f32,
        /// End offset of the occupied interval.
        end: f32,
        /// Indicates whether the unit carries a bonus door.
        has_door: bool,
    },
    /// Confirms that a unit fell behind the window and was released.
    UnitReleased {
        /// Identifier of the released unit.
        unit: UnitId,
    },
    /// Announces that a door side was chosen by a qualifying actor.
    DoorChosen {
        /// Identifier of the unit carrying the door.
        unit: UnitId,
        /// Side resolved from the actor's lateral offset.
        side: DoorSide,
        /// Arithmetic kind configured on the chosen side.
        kind: BonusKind,
        /// Absolute magnitude configured on the chosen side.
        amount: u32,
    },
    /// Reports that a door entry was ignored for diagnostics.
    DoorIgnored {
        /// Identifier of the unit named by the entry report.
        unit: UnitId,
        /// Specific reason the entry did not resolve a side.
        reason: DoorIgnoreReason,
    },
    /// Announces that a non-one-shot door became armed again.
    DoorRearmed {
        /// Identifier of the unit carrying the door.
        unit: UnitId,
    },
    /// Announces the new runner count after a crowd mutation.
    CrowdChanged {
        /// Number of runners after the mutation.
        count: u32,
    },
    /// Announces that a qualifying actor reached the finish unit.
    FinishReached {
        /// Identifier of the finish unit.
        unit: UnitId,
    },
}

/// Reasons a door entry report may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorIgnoreReason {
    /// No placed unit with the provided identifier exists.
    UnknownUnit,
    /// The named unit does not carry a door.
    NoDoor,
    /// The entering actor does not match the door's required actor.
    WrongActor,
    /// The door was already used and has not re-armed yet.
    NotArmed,
}

/// Unique identifier assigned to a placed unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Category tag grouping generation units for repetition constraints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    /// Ordinary gameplay chunk.
    #[default]
    Generic,
    /// Chunk without obstacles or doors.
    Empty,
    /// Chunk noticeably longer than average.
    Long,
    /// Chunk with demanding obstacle placement.
    Hard,
}

/// Kinds of actors that can enter trigger regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// The player-controlled leader of the crowd.
    Player,
    /// An individual crowd runner.
    Runner,
}

/// Sides of a bonus door pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorSide {
    /// Side at a non-positive lateral offset.
    Left,
    /// Side at a positive lateral offset.
    Right,
}

/// Arithmetic kinds a door may apply to the crowd population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Adds the amount to the runner count.
    Addition,
    /// Removes the amount from the runner count.
    Subtraction,
    /// Multiplies the runner count by the amount.
    Multiplication,
    /// Divides the runner count by the amount, rounding down.
    Division,
}

impl BonusKind {
    /// Reports whether the kind grows the crowd.
    #[must_use]
    pub const fn is_bonus(self) -> bool {
        matches!(self, Self::Addition | Self::Multiplication)
    }

    /// Renders the display label for a door face with the provided magnitude.
    #[must_use]
    pub fn format_label(self, amount: u32) -> String {
        match self {
            Self::Addition => format!("+{amount}"),
            Self::Subtraction => format!("-{amount}"),
            Self::Multiplication => format!("\u{d7}{amount}"),
            Self::Division => format!("\u{f7}{}", amount.max(1)),
        }
    }
}

/// Byte RGB color used by door presentation configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Face color applied to sides whose kind grows the crowd.
pub const DEFAULT_BONUS_COLOR: RgbColor = RgbColor::from_rgb(0x2e, 0xcc, 0x40);

/// Face color applied to sides whose kind shrinks the crowd.
pub const DEFAULT_PENALTY_COLOR: RgbColor = RgbColor::from_rgb(0xff, 0x41, 0x36);

/// Configuration of one side of a door pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorSideConfig {
    /// Arithmetic kind applied when this side is chosen.
    pub kind: BonusKind,
    /// Signed configured magnitude; the absolute value is forwarded.
    pub amount: i32,
    /// Optional replacement for the generated face label.
    pub label_override: Option<String>,
}

impl DoorSideConfig {
    /// Creates a side configuration without a label override.
    #[must_use]
    pub const fn new(kind: BonusKind, amount: i32) -> Self {
        Self {
            kind,
            amount,
            label_override: None,
        }
    }

    /// Absolute magnitude forwarded to the crowd when chosen.
    #[must_use]
    pub const fn magnitude(&self) -> u32 {
        self.amount.unsigned_abs()
    }

    /// Resolves the face label, honoring the override when present.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.label_override {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => self.kind.format_label(self.magnitude()),
        }
    }
}

/// Configuration of a door pair: two independently configured sides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorPairConfig {
    /// Side resolved for non-positive lateral offsets.
    pub left: DoorSideConfig,
    /// Side resolved for positive lateral offsets.
    pub right: DoorSideConfig,
    /// Face color applied to crowd-growing sides.
    pub bonus_color: RgbColor,
    /// Face color applied to crowd-shrinking sides.
    pub penalty_color: RgbColor,
}

impl DoorPairConfig {
    /// Creates a door pair with the default face colors.
    #[must_use]
    pub const fn new(left: DoorSideConfig, right: DoorSideConfig) -> Self {
        Self {
            left,
            right,
            bonus_color: DEFAULT_BONUS_COLOR,
            penalty_color: DEFAULT_PENALTY_COLOR,
        }
    }

    /// Retrieves the configuration of the requested side.
    #[must_use]
    pub const fn side(&self, side: DoorSide) -> &DoorSideConfig {
        match side {
            DoorSide::Left => &self.left,
            DoorSide::Right => &self.right,
        }
    }
}

/// Trigger behavior of a placed door.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorBehavior {
    /// Allows only one choice; the door never re-arms afterwards.
    pub one_shot: bool,
    /// Delay before a non-one-shot door re-arms; zero re-arms immediately.
    pub rearm_delay: Duration,
    /// Kind of actor permitted to trigger the door.
    pub required_actor: ActorKind,
}

impl Default for DoorBehavior {
    fn default() -> Self {
        Self {
            one_shot: true,
            rearm_delay: Duration::ZERO,
            required_actor: ActorKind::Player,
        }
    }
}

/// Complete door attachment for a generation unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorConfig {
    /// Values and presentation of the two door sides.
    pub pair: DoorPairConfig,
    /// Trigger behavior of the door.
    pub behavior: DoorBehavior,
}

/// Immutable template describing one spawnable unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Human-readable name used in diagnostics and displays.
    pub name: String,
    /// Spacing the unit occupies along the generation axis.
    pub length: f32,
    /// Category tag used by repetition constraints.
    pub category: UnitCategory,
    /// Optional bonus door carried by the unit.
    pub door: Option<DoorConfig>,
}

impl UnitDefinition {
    /// Creates a door-less unit definition.
    #[must_use]
    pub fn new(name: impl Into<String>, length: f32, category: UnitCategory) -> Self {
        Self {
            name: name.into(),
            length,
            category,
            door: None,
        }
    }

    /// Attaches a door configuration to the definition.
    #[must_use]
    pub fn with_door(mut self, door: DoorConfig) -> Self {
        self.door = Some(door);
        self
    }

    /// Length padded to the minimum placement spacing.
    #[must_use]
    pub fn clamped_length(&self) -> f32 {
        self.length.max(MIN_UNIT_LENGTH)
    }
}

/// One weighted candidate of an [`EntryTable`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Unit template spawned when the entry is chosen; `None` disables it.
    pub definition: Option<UnitDefinition>,
    /// Relative selection weight; non-positive weights are never chosen.
    pub weight: f32,
    /// Maximum same-category run length; 0 means unlimited.
    pub max_consecutive_category: u32,
    /// Permits the entry to follow itself immediately.
    pub allow_immediate_repeat: bool,
}

impl PoolEntry {
    /// Creates an unconstrained entry for the provided definition.
    #[must_use]
    pub fn new(definition: UnitDefinition, weight: f32) -> Self {
        Self {
            definition: Some(definition),
            weight,
            max_consecutive_category: 0,
            allow_immediate_repeat: true,
        }
    }

    /// Reports whether the entry may ever be chosen.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.weight > 0.0 && self.definition.is_some()
    }
}

/// Ordered weighted pool of candidate generation units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryTable {
    /// Candidate entries; order provides the deterministic tie-break.
    pub entries: Vec<PoolEntry>,
}

impl EntryTable {
    /// Creates a table from the provided entries.
    #[must_use]
    pub fn new(entries: Vec<PoolEntry>) -> Self {
        Self { entries }
    }

    /// Verifies that the table can produce at least one unit.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.entries.is_empty() {
            return Err(TableError::Empty);
        }
        if !self.entries.iter().any(PoolEntry::is_selectable) {
            return Err(TableError::NoSelectableEntry);
        }
        Ok(())
    }
}

/// Reasons an [`EntryTable`] cannot drive generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TableError {
    /// The table contains no entries at all.
    #[error("entry table contains no entries")]
    Empty,
    /// Every entry has zero weight or a missing definition.
    #[error("entry table contains no selectable entry")]
    NoSelectableEntry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn bonus_kind_round_trips_through_bincode() {
        assert_round_trip(&BonusKind::Division);
    }

    #[test]
    fn unit_category_round_trips_through_bincode() {
        assert_round_trip(&UnitCategory::Long);
    }

    #[test]
    fn door_pair_config_round_trips_through_bincode() {
        let pair = DoorPairConfig::new(
            DoorSideConfig::new(BonusKind::Addition, 5),
            DoorSideConfig::new(BonusKind::Division, -2),
        );
        assert_round_trip(&pair);
    }

    #[test]
    fn entry_table_round_trips_through_bincode() {
        let table = EntryTable::new(vec![PoolEntry::new(
            UnitDefinition::new("corridor", 30.0, UnitCategory::Generic),
            2.5,
        )]);
        assert_round_trip(&table);
    }

    #[test]
    fn labels_match_arithmetic_kinds() {
        assert_eq!(BonusKind::Addition.format_label(5), "+5");
        assert_eq!(BonusKind::Subtraction.format_label(3), "-3");
        assert_eq!(BonusKind::Multiplication.format_label(2), "\u{d7}2");
        assert_eq!(BonusKind::Division.format_label(0), "\u{f7}1");
    }

    #[test]
    fn label_override_wins_when_non_blank() {
        let mut side = DoorSideConfig::new(BonusKind::Addition, 10);
        assert_eq!(side.label(), "+10");
        side.label_override = Some("  ".to_owned());
        assert_eq!(side.label(), "+10");
        side.label_override = Some("MEGA".to_owned());
        assert_eq!(side.label(), "MEGA");
    }

    #[test]
    fn magnitude_is_absolute() {
        let side = DoorSideConfig::new(BonusKind::Subtraction, -7);
        assert_eq!(side.magnitude(), 7);
    }

    #[test]
    fn bonus_kinds_classify_growth() {
        assert!(BonusKind::Addition.is_bonus());
        assert!(BonusKind::Multiplication.is_bonus());
        assert!(!BonusKind::Subtraction.is_bonus());
        assert!(!BonusKind::Division.is_bonus());
    }

    #[test]
    fn empty_table_fails_validation() {
        assert_eq!(EntryTable::default().validate(), Err(TableError::Empty));
    }

    #[test]
    fn weightless_table_fails_validation() {
        let mut entry = PoolEntry::new(
            UnitDefinition::new("dead", 10.0, UnitCategory::Generic),
            0.0,
        );
        entry.weight = 0.0;
        let table = EntryTable::new(vec![entry]);
        assert_eq!(table.validate(), Err(TableError::NoSelectableEntry));
    }

    #[test]
    fn short_lengths_are_padded() {
        let definition = UnitDefinition::new("sliver", 0.0, UnitCategory::Generic);
        assert!((definition.clamped_length() - MIN_UNIT_LENGTH).abs() < f32::EPSILON);
    }
}
