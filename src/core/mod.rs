//! Core types describing bodies, shapes, and shared physical data.

pub mod rigidbody;
pub mod shapes;
pub mod types;

pub use rigidbody::RigidBody;
pub use shapes::{CollisionShape, ShapeKind};
pub use types::{Aabb, Material, MaterialPair};
