use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::shapes::CollisionShape;
use super::types::{Aabb, Material};
use crate::error::{PhysicsError, PhysicsResult};
use crate::utils::allocator::BodyHandle;

/// Dynamic state of a simulated rigid body.
///
/// Mass and inertia are stored as their inverses so an immovable body is the
/// ordinary value zero rather than a division hazard. A body without a
/// collision shape still integrates but is invisible to collision detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub id: BodyHandle,
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub inverse_mass: f32,
    pub inverse_inertia: Mat3,
    pub collision_shape: Option<CollisionShape>,
    pub material: Material,
    pub is_at_rest: bool,
    pub(crate) rest_ticks: u32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            id: BodyHandle::default(),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            inverse_mass: 1.0,
            inverse_inertia: Mat3::IDENTITY,
            collision_shape: None,
            material: Material::default(),
            is_at_rest: false,
            rest_ticks: 0,
        }
    }
}

impl RigidBody {
    pub fn new(id: BodyHandle) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// An inverse mass of zero marks the body as immovable.
    pub fn is_static(&self) -> bool {
        self.inverse_mass == 0.0
    }

    pub fn set_position(&mut self, position: Vec3) -> PhysicsResult<()> {
        if !position.is_finite() {
            return Err(PhysicsError::InvalidState {
                quantity: "position",
            });
        }
        self.position = position;
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Quat) -> PhysicsResult<()> {
        if !orientation.is_finite() {
            return Err(PhysicsError::InvalidState {
                quantity: "orientation",
            });
        }
        self.orientation = orientation.normalize();
        Ok(())
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) -> PhysicsResult<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::InvalidState {
                quantity: "linear velocity",
            });
        }
        self.linear_velocity = velocity;
        self.wake();
        Ok(())
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) -> PhysicsResult<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::InvalidState {
                quantity: "angular velocity",
            });
        }
        self.angular_velocity = velocity;
        self.wake();
        Ok(())
    }

    pub fn set_inverse_mass(&mut self, inverse_mass: f32) -> PhysicsResult<()> {
        if !inverse_mass.is_finite() || inverse_mass < 0.0 {
            return Err(PhysicsError::InvalidState {
                quantity: "inverse mass",
            });
        }
        self.inverse_mass = inverse_mass;
        Ok(())
    }

    pub fn set_inverse_inertia(&mut self, inverse_inertia: Mat3) -> PhysicsResult<()> {
        if !inverse_inertia.is_finite() {
            return Err(PhysicsError::InvalidState {
                quantity: "inverse inertia",
            });
        }
        self.inverse_inertia = inverse_inertia;
        Ok(())
    }

    /// Replaces the collision shape; the previous shape is dropped.
    pub fn set_collision_shape(&mut self, shape: Option<CollisionShape>) {
        self.collision_shape = shape;
        self.wake();
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// Forcing a body to rest removes it from broadphase candidate
    /// generation; waking it makes it visible again on the next tick.
    pub fn set_at_rest(&mut self, at_rest: bool) {
        if at_rest {
            self.is_at_rest = true;
        } else {
            self.wake();
        }
    }

    /// Applies an impulse at a world-space point, waking the body.
    pub fn apply_impulse(&mut self, impulse: Vec3, point: Vec3) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        let torque = (point - self.position).cross(impulse);
        self.angular_velocity += self.inverse_inertia * torque;
        self.wake();
    }

    pub fn wake(&mut self) {
        self.is_at_rest = false;
        self.rest_ticks = 0;
    }

    /// Kinetic-energy proxy driving rest transitions.
    pub fn motion(&self) -> f32 {
        self.linear_velocity.length_squared() + self.angular_velocity.length_squared()
    }

    /// World-space bounds of the collision shape, if the body has one.
    pub fn aabb(&self) -> Option<Aabb> {
        self.collision_shape
            .as_ref()
            .map(|shape| shape.aabb(self.position, self.orientation))
    }
}
