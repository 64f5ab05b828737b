use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    core::{rigidbody::RigidBody, types::MaterialPair},
    utils::allocator::BodyHandle,
};

/// A single point of contact between two bodies.
///
/// The normal points from body A toward body B.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub point: Vec3,
    pub normal: Vec3,
    pub depth: f32,
    pub material: MaterialPair,
}

/// Contact manifold for one candidate pair. The narrowphase produces zero or
/// one manifold per pair.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    pub contacts: Vec<Contact>,
}

impl ContactManifold {
    pub fn generate(body_a: &RigidBody, body_b: &RigidBody) -> Option<Self> {
        use crate::collision::narrowphase::NarrowPhase;

        let contact = NarrowPhase::collide(body_a, body_b)?;
        Some(ContactManifold {
            contacts: vec![contact],
        })
    }
}
