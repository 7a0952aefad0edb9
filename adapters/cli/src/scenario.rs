//! TOML scenario files describing the unit pool and crowd setup.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use crowd_runner_core::{
    BonusKind, Command, DoorBehavior, DoorConfig, DoorPairConfig, DoorSideConfig, EntryTable,
    PoolEntry, UnitCategory, UnitDefinition,
};
use crowd_runner_world::{DEFAULT_BASE_SPACING, GOLDEN_ANGLE_DEGREES};
use serde::Deserialize;

const SUPPORTED_SCENARIO_VERSION: u32 = 1;

/// Scenario contents loaded from a TOML file or built in.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    version: u32,
    /// Crowd setup; the bootstrap defaults apply when absent.
    #[serde(default)]
    pub(crate) crowd: Option<CrowdSettings>,
    /// Unit placed first at offset zero, bypassing the pool.
    #[serde(default)]
    pub(crate) start: Option<UnitSpec>,
    /// Unit terminating fixed-length tracks, bypassing the pool.
    #[serde(default)]
    pub(crate) finish: Option<UnitSpec>,
    /// Weighted pool of body unit candidates.
    pub(crate) units: Vec<UnitSpec>,
}

impl Scenario {
    /// Loads and validates a scenario from the provided TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file at {}", path.display()))?;
        let scenario: Self =
            toml::from_str(&contents).context("failed to parse scenario toml contents")?;
        if scenario.version != SUPPORTED_SCENARIO_VERSION {
            bail!(
                "unsupported scenario version {}; expected {}",
                scenario.version,
                SUPPORTED_SCENARIO_VERSION
            );
        }
        if scenario.units.is_empty() {
            bail!("scenario declares no units");
        }
        Ok(scenario)
    }

    /// Built-in scenario used when no file is provided.
    pub(crate) fn built_in() -> Self {
        let double_doors = UnitSpec {
            name: "double doors".into(),
            length: 12.0,
            category: UnitCategory::Generic,
            weight: 2.0,
            max_run: 0,
            allow_repeat: false,
            door: Some(DoorSpec {
                left: FaceSpec {
                    kind: BonusKind::Addition,
                    amount: 5,
                },
                right: FaceSpec {
                    kind: BonusKind::Multiplication,
                    amount: 2,
                },
                one_shot: true,
                rearm_seconds: 0.0,
            }),
        };
        let hazard_doors = UnitSpec {
            name: "hazard doors".into(),
            length: 12.0,
            category: UnitCategory::Hard,
            weight: 1.0,
            max_run: 1,
            allow_repeat: false,
            door: Some(DoorSpec {
                left: FaceSpec {
                    kind: BonusKind::Subtraction,
                    amount: -3,
                },
                right: FaceSpec {
                    kind: BonusKind::Division,
                    amount: 2,
                },
                one_shot: true,
                rearm_seconds: 0.0,
            }),
        };
        Self {
            version: SUPPORTED_SCENARIO_VERSION,
            crowd: None,
            start: Some(UnitSpec::plain("starting gate", 5.0, UnitCategory::Empty)),
            finish: Some(UnitSpec::plain("finish line", 8.0, UnitCategory::Empty)),
            units: vec![
                UnitSpec::plain("straight", 10.0, UnitCategory::Generic),
                UnitSpec {
                    weight: 0.6,
                    max_run: 2,
                    ..UnitSpec::plain("breather", 8.0, UnitCategory::Empty)
                },
                UnitSpec {
                    weight: 0.8,
                    ..UnitSpec::plain("long stretch", 20.0, UnitCategory::Long)
                },
                double_doors,
                hazard_doors,
            ],
        }
    }

    /// Converts the unit specs into the weighted pool table.
    pub(crate) fn table(&self) -> EntryTable {
        EntryTable::new(self.units.iter().map(UnitSpec::entry).collect())
    }

    /// Runner count requested by the scenario, when it sets one.
    pub(crate) fn initial_count(&self) -> Option<u32> {
        self.crowd
            .as_ref()
            .map(|settings| settings.initial_count)
            .filter(|&count| count > 0)
    }

    /// Command seeding the crowd from the scenario settings.
    pub(crate) fn crowd_command(&self, initial_count: u32) -> Option<Command> {
        self.crowd.as_ref().map(|settings| Command::ConfigureCrowd {
            base_spacing: settings.base_spacing,
            angle_step_degrees: settings.angle_step_degrees,
            max_world_radius: settings.max_world_radius,
            max_count: settings.max_count,
            initial_count,
        })
    }
}

/// Crowd layout settings carried by a scenario.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CrowdSettings {
    #[serde(default = "default_base_spacing")]
    pub(crate) base_spacing: f32,
    #[serde(default = "default_angle_step")]
    pub(crate) angle_step_degrees: f32,
    #[serde(default)]
    pub(crate) max_world_radius: f32,
    #[serde(default)]
    pub(crate) max_count: u32,
    #[serde(default)]
    pub(crate) initial_count: u32,
}

fn default_base_spacing() -> f32 {
    DEFAULT_BASE_SPACING
}

fn default_angle_step() -> f32 {
    GOLDEN_ANGLE_DEGREES
}

/// One spawnable unit described by a scenario.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct UnitSpec {
    pub(crate) name: String,
    pub(crate) length: f32,
    #[serde(default)]
    pub(crate) category: UnitCategory,
    #[serde(default = "default_weight")]
    pub(crate) weight: f32,
    /// Longest allowed run of same-category picks; zero disables the cap.
    #[serde(default)]
    pub(crate) max_run: u32,
    #[serde(default = "default_allow_repeat")]
    pub(crate) allow_repeat: bool,
    #[serde(default)]
    pub(crate) door: Option<DoorSpec>,
}

fn default_weight() -> f32 {
    1.0
}

fn default_allow_repeat() -> bool {
    true
}

impl UnitSpec {
    fn plain(name: &str, length: f32, category: UnitCategory) -> Self {
        Self {
            name: name.into(),
            length,
            category,
            weight: 1.0,
            max_run: 0,
            allow_repeat: true,
            door: None,
        }
    }

    /// Materializes the spawnable definition, attaching the door if any.
    pub(crate) fn definition(&self) -> UnitDefinition {
        let definition = UnitDefinition::new(self.name.clone(), self.length, self.category);
        match &self.door {
            Some(door) => definition.with_door(door.config()),
            None => definition,
        }
    }

    fn entry(&self) -> PoolEntry {
        let mut entry = PoolEntry::new(self.definition(), self.weight);
        entry.max_consecutive_category = self.max_run;
        entry.allow_immediate_repeat = self.allow_repeat;
        entry
    }
}

/// Door attachment described by a scenario.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DoorSpec {
    pub(crate) left: FaceSpec,
    pub(crate) right: FaceSpec,
    #[serde(default = "default_one_shot")]
    pub(crate) one_shot: bool,
    #[serde(default)]
    pub(crate) rearm_seconds: f32,
}

fn default_one_shot() -> bool {
    true
}

impl DoorSpec {
    fn config(&self) -> DoorConfig {
        DoorConfig {
            pair: DoorPairConfig::new(self.left.side_config(), self.right.side_config()),
            behavior: DoorBehavior {
                one_shot: self.one_shot,
                rearm_delay: Duration::from_secs_f32(self.rearm_seconds.max(0.0)),
                ..DoorBehavior::default()
            },
        }
    }
}

/// One door face described by a scenario.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FaceSpec {
    pub(crate) kind: BonusKind,
    pub(crate) amount: i32,
}

impl FaceSpec {
    fn side_config(&self) -> DoorSideConfig {
        DoorSideConfig::new(self.kind, self.amount)
    }
}
