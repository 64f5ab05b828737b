use glam::Vec3;
use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{
        broadphase::{BodyPair, Broadphase, Octree},
        contact::{Contact, ContactManifold},
    },
    config::{
        DEFAULT_DAMPING_FACTOR, DEFAULT_GRAVITY, DEFAULT_TIME_STEP, REST_ENERGY_THRESHOLD,
        REST_TICK_COUNT,
    },
    core::{rigidbody::RigidBody, types::Aabb},
    dynamics::{
        integrator::{IntegrationScheme, Integrator},
        rest::RestTracker,
        solver::ContactSolver,
    },
    error::{PhysicsError, PhysicsResult},
    utils::{
        allocator::{Arena, BodyHandle},
        logging::ScopedTimer,
    },
};

/// Read-only view of the simulation handed to debug-draw collaborators.
#[derive(Debug, Clone)]
pub struct DebugSnapshot {
    pub bounding_volumes: Vec<(BodyHandle, Aabb)>,
    pub contacts: Vec<Contact>,
}

/// Central simulation orchestrator.
///
/// Owns the body registry, the active broadphase strategy, the integration
/// scheme, and the global parameters (gravity, damping, fixed timestep).
/// Each tick runs the fixed phase order: integrate, broadphase, narrowphase,
/// resolve, rest evaluation. All parameters are per-instance state, so
/// multiple engines can coexist in one process.
pub struct PhysicsEngine {
    bodies: Arena<RigidBody>,
    broadphase: Box<dyn Broadphase>,
    integration: IntegrationScheme,
    damping_factor: f32,
    gravity: Vec3,
    time_step: f32,
    time_accumulated: f32,
    solver: ContactSolver,
    rest: RestTracker,
    last_contacts: Vec<Contact>,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl PhysicsEngine {
    pub fn new(time_step: f32) -> Self {
        let time_step = if time_step <= 0.0 {
            DEFAULT_TIME_STEP
        } else {
            time_step
        };

        Self {
            bodies: Arena::new(),
            broadphase: Box::new(Octree::default()),
            integration: IntegrationScheme::default(),
            damping_factor: DEFAULT_DAMPING_FACTOR,
            gravity: Vec3::from_slice(&DEFAULT_GRAVITY),
            time_step,
            time_accumulated: 0.0,
            solver: ContactSolver::default(),
            rest: RestTracker::new(REST_ENERGY_THRESHOLD, REST_TICK_COUNT),
            last_contacts: Vec::new(),
        }
    }

    /// Registers a default-constructed body and returns its handle.
    pub fn create_body(&mut self) -> BodyHandle {
        self.add_body(RigidBody::default())
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = self.bodies.insert(body);
        if let Some(stored) = self.bodies.get_mut(handle) {
            stored.id = handle;
        }
        handle
    }

    /// Removes a body. Contact entries referencing it are purged in the same
    /// call so no stale handle survives into the next tick or snapshot.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let removed = self.bodies.remove(handle);
        if removed.is_some() {
            self.last_contacts
                .retain(|contact| contact.body_a != handle && contact.body_b != handle);
        }
        removed
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn try_body(&self, handle: BodyHandle) -> PhysicsResult<&RigidBody> {
        self.bodies.get(handle).ok_or(PhysicsError::stale(handle))
    }

    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Swaps the broadphase strategy. Takes effect on the next tick.
    pub fn set_broadphase(&mut self, broadphase: Box<dyn Broadphase>) {
        self.broadphase = broadphase;
    }

    /// Selects the integration scheme. The choice is read at the start of
    /// the next tick; an in-flight tick is never split across schemes.
    pub fn set_integration_type(&mut self, scheme: IntegrationScheme) {
        self.integration = scheme;
    }

    pub fn integration_type(&self) -> IntegrationScheme {
        self.integration
    }

    pub fn set_damping_factor(&mut self, damping: f32) -> PhysicsResult<()> {
        if !damping.is_finite() || damping <= 0.0 || damping > 1.0 {
            return Err(PhysicsError::InvalidState {
                quantity: "damping factor",
            });
        }
        self.damping_factor = damping;
        Ok(())
    }

    pub fn damping_factor(&self) -> f32 {
        self.damping_factor
    }

    pub fn set_gravity(&mut self, gravity: Vec3) -> PhysicsResult<()> {
        if !gravity.is_finite() {
            return Err(PhysicsError::InvalidState {
                quantity: "gravity",
            });
        }
        self.gravity = gravity;
        Ok(())
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_rest_parameters(&mut self, energy_threshold: f32, required_ticks: u32) {
        self.rest = RestTracker::new(energy_threshold, required_ticks);
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Advances the simulation using a fixed-timestep accumulator: zero or
    /// more whole ticks run depending on the accumulated frame delta.
    pub fn step(&mut self, dt: f32) {
        self.time_accumulated += dt;
        while self.time_accumulated >= self.time_step {
            self.time_accumulated -= self.time_step;
            self.tick();
        }
    }

    /// Runs exactly one fixed-step simulation pass. Phase order is fixed:
    /// integrate, broadphase, narrowphase, resolve, rest evaluation.
    pub fn tick(&mut self) {
        let dt = self.time_step;
        let integrator = Integrator::new(self.integration, self.damping_factor);

        {
            let _timer = ScopedTimer::new("integrate");
            let gravity = self.gravity;
            for body in self.bodies.iter_mut() {
                integrator.integrate(body, gravity, dt);
            }
        }

        let pairs = {
            let _timer = ScopedTimer::new("broadphase");
            let mut pairs = self.broadphase.compute_pairs(&self.bodies);
            self.discard_resting_pairs(&mut pairs);
            pairs
        };

        let contacts = {
            let _timer = ScopedTimer::new("narrowphase");
            self.generate_contacts(&pairs)
        };
        debug!(
            "tick: {} candidate pairs, {} contacts",
            pairs.len(),
            contacts.len()
        );

        {
            let _timer = ScopedTimer::new("resolve");
            self.solver.resolve(&mut self.bodies, &contacts);
        }

        {
            let _timer = ScopedTimer::new("rest_update");
            self.rest.update(&mut self.bodies);
        }

        self.last_contacts = contacts;
    }

    /// A pair of two resting bodies cannot have moved into contact; a pair
    /// with at least one active body must still be tested.
    fn discard_resting_pairs(&self, pairs: &mut Vec<BodyPair>) {
        pairs.retain(|&(a, b)| {
            let rest_a = self.bodies.get(a).map(|body| body.is_at_rest).unwrap_or(true);
            let rest_b = self.bodies.get(b).map(|body| body.is_at_rest).unwrap_or(true);
            !(rest_a && rest_b)
        });
    }

    fn manifold_for(&self, a: BodyHandle, b: BodyHandle) -> Option<ContactManifold> {
        let body_a = self.bodies.get(a)?;
        let body_b = self.bodies.get(b)?;
        ContactManifold::generate(body_a, body_b)
    }

    /// Narrowphase evaluation is read-only over body state, so candidate
    /// pairs can be tested concurrently; all velocity and position writes
    /// happen afterwards in the sequential resolve phase.
    #[cfg(feature = "parallel")]
    fn generate_contacts(&self, pairs: &[BodyPair]) -> Vec<Contact> {
        pairs
            .par_iter()
            .filter_map(|&(a, b)| self.manifold_for(a, b))
            .flat_map(|manifold| manifold.contacts)
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn generate_contacts(&self, pairs: &[BodyPair]) -> Vec<Contact> {
        pairs
            .iter()
            .filter_map(|&(a, b)| self.manifold_for(a, b))
            .flat_map(|manifold| manifold.contacts)
            .collect()
    }

    /// Bounding volumes and last-tick contacts for the debug-draw overlay.
    /// Purely observational; simulation behavior does not depend on it.
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let bounding_volumes = self
            .bodies
            .iter()
            .filter_map(|body| body.aabb().map(|aabb| (body.id, aabb)))
            .collect();
        DebugSnapshot {
            bounding_volumes,
            contacts: self.last_contacts.clone(),
        }
    }
}
