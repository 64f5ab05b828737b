//! Simulation dynamics: integration, contact resolution, and rest state.

pub mod integrator;
pub mod rest;
pub mod solver;

pub use integrator::{IntegrationScheme, Integrator};
pub use rest::RestTracker;
pub use solver::ContactSolver;
