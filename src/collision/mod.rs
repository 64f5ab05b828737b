//! Collision detection: broadphase pair generation, narrowphase tests, and
//! contact data.

pub mod broadphase;
pub mod contact;
pub mod narrowphase;

pub use broadphase::{BodyPair, Broadphase, BruteForce, Octree, SortAndSweep};
pub use contact::{Contact, ContactManifold};
pub use narrowphase::NarrowPhase;
