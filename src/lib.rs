//! Kinetica – rigid-body physics core for Rust.
//!
//! This crate implements the per-frame simulation loop of a discrete-time
//! rigid-body engine: numerical integration, broadphase pair culling,
//! narrowphase shape tests, impulse-based resolution, and rest-state
//! management. Scene storage, rendering, and scripting live outside the
//! crate and talk to it through [`PhysicsEngine`] handles and setters.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod engine;
pub mod error;
pub mod utils;

pub use glam::{Mat3, Quat, Vec3};

pub use collision::{
    broadphase::{BodyPair, Broadphase, BruteForce, Octree, SortAndSweep},
    contact::{Contact, ContactManifold},
    narrowphase::NarrowPhase,
};
pub use crate::core::{
    rigidbody::RigidBody,
    shapes::{CollisionShape, ShapeKind},
    types::{Aabb, Material, MaterialPair},
};
pub use dynamics::{
    integrator::{IntegrationScheme, Integrator},
    rest::RestTracker,
    solver::ContactSolver,
};
pub use engine::{DebugSnapshot, PhysicsEngine};
pub use error::{PhysicsError, PhysicsResult};
pub use utils::allocator::{Arena, BodyHandle};
