use log::debug;

use crate::{core::rigidbody::RigidBody, utils::allocator::Arena};

/// Tracks per-body settling and flips bodies to the rest state.
///
/// A body whose kinetic-energy proxy stays below the threshold for the
/// required number of consecutive ticks stops being integrated and stops
/// generating broadphase work until something disturbs it.
#[derive(Debug, Clone, Copy)]
pub struct RestTracker {
    pub energy_threshold: f32,
    pub required_ticks: u32,
}

impl RestTracker {
    pub fn new(energy_threshold: f32, required_ticks: u32) -> Self {
        Self {
            energy_threshold,
            required_ticks: required_ticks.max(1),
        }
    }

    pub fn update(&self, bodies: &mut Arena<RigidBody>) {
        for body in bodies.iter_mut() {
            if body.is_at_rest {
                continue;
            }

            if body.motion() < self.energy_threshold {
                body.rest_ticks += 1;
                if body.rest_ticks >= self.required_ticks {
                    body.is_at_rest = true;
                    debug!("body {:?} put to rest", body.id);
                }
            } else {
                body.rest_ticks = 0;
            }
        }
    }
}
