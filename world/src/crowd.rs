//! Crowd population model: count arithmetic and the Vogel spiral layout.

use crowd_runner_core::BonusKind;
use glam::Vec3;

/// Variable-size collection of identical runners arranged on a spiral.
///
/// Only the count and the layout parameters are stored; runner positions are
/// derived from their index, so removing runners always trims from the end of
/// the collection. Layout recomputation is deferred behind a dirty flag and
/// performed once per simulation tick.
#[derive(Clone, Debug)]
pub(crate) struct Crowd {
    count: u32,
    base_spacing: f32,
    angle_step_degrees: f32,
    max_world_radius: f32,
    max_count: u32,
    positions: Vec<Vec3>,
    dirty: bool,
}

impl Crowd {
    pub(crate) fn new(
        base_spacing: f32,
        angle_step_degrees: f32,
        max_world_radius: f32,
        max_count: u32,
        initial_count: u32,
    ) -> Self {
        let mut crowd = Self {
            count: 0,
            base_spacing,
            angle_step_degrees,
            max_world_radius,
            max_count,
            positions: Vec::new(),
            dirty: true,
        };
        crowd.count = crowd.grown_target(initial_count);
        crowd
    }

    pub(crate) fn configure(
        &mut self,
        base_spacing: f32,
        angle_step_degrees: f32,
        max_world_radius: f32,
        max_count: u32,
        initial_count: u32,
    ) {
        *self = Self::new(
            base_spacing,
            angle_step_degrees,
            max_world_radius,
            max_count,
            initial_count,
        );
    }

    /// Applies one arithmetic bonus, returning the new count on mutation.
    ///
    /// Growth is capped by `max_count`, shrinkage is clamped at zero, and
    /// amounts that the kind treats as degenerate (0, or 1 for the
    /// multiplicative kinds) leave the crowd untouched.
    pub(crate) fn apply_bonus(&mut self, kind: BonusKind, amount: u32) -> Option<u32> {
        let target = match kind {
            BonusKind::Addition => {
                if amount == 0 {
                    self.count
                } else {
                    self.grown_target(self.count.saturating_add(amount))
                }
            }
            BonusKind::Subtraction => self.count.saturating_sub(amount),
            BonusKind::Multiplication => {
                if amount <= 1 {
                    self.count
                } else {
                    self.grown_target(self.count.saturating_mul(amount))
                }
            }
            BonusKind::Division => {
                if amount <= 1 {
                    self.count
                } else {
                    self.count / amount
                }
            }
        };

        if target == self.count {
            return None;
        }

        self.count = target;
        self.dirty = true;
        Some(self.count)
    }

    /// Caps a desired count at the capacity without ever shrinking the crowd.
    fn grown_target(&self, desired: u32) -> u32 {
        let capped = if self.max_count > 0 {
            desired.min(self.max_count)
        } else {
            desired
        };
        capped.max(self.count)
    }

    /// Recomputes cached runner positions when the layout is dirty.
    pub(crate) fn relayout_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        let spacing = self.effective_spacing();
        let mut positions = Vec::with_capacity(self.count as usize);
        for index in 0..self.count {
            positions.push(self.position_at(index, spacing));
        }
        self.positions = positions;
        self.dirty = false;
    }

    /// Spiral spacing after radius compression.
    ///
    /// Compression only shrinks spacing; it never grows past `base_spacing`.
    pub(crate) fn effective_spacing(&self) -> f32 {
        if self.count == 0 || self.max_world_radius <= 0.0 {
            return self.base_spacing;
        }
        let desired_radius = self.base_spacing * (self.count as f32).sqrt();
        if desired_radius > self.max_world_radius {
            self.base_spacing * (self.max_world_radius / desired_radius)
        } else {
            self.base_spacing
        }
    }

    /// Outer radius currently occupied by the crowd.
    pub(crate) fn bounding_radius(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.effective_spacing() * (self.count as f32).sqrt()
    }

    fn position_at(&self, index: u32, spacing: f32) -> Vec3 {
        let i = index as f32;
        let angle = (i * self.angle_step_degrees).to_radians();
        let ring = spacing * i.sqrt();
        Vec3::new(ring * angle.cos(), 0.0, ring * angle.sin())
    }

    pub(crate) fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn positions(&self) -> &[Vec3] {
        &self.positions
    }
}
