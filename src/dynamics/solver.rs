use glam::Vec3;
use log::warn;

use crate::{
    collision::contact::Contact,
    config::{PENETRATION_SLOP, POSITION_CORRECTION_PERCENT, WAKE_IMPULSE_THRESHOLD},
    core::rigidbody::RigidBody,
    utils::allocator::Arena,
};

/// Impulse-based contact resolution.
///
/// Velocity is corrected along the contact normal using both bodies' inverse
/// mass and inverse inertia; residual penetration is resolved by a fractional
/// positional push-out that cannot feed energy back into the system.
#[derive(Debug, Clone, Copy)]
pub struct ContactSolver {
    pub correction_percent: f32,
    pub penetration_slop: f32,
}

impl Default for ContactSolver {
    fn default() -> Self {
        Self {
            correction_percent: POSITION_CORRECTION_PERCENT,
            penetration_slop: PENETRATION_SLOP,
        }
    }
}

impl ContactSolver {
    pub fn resolve(&self, bodies: &mut Arena<RigidBody>, contacts: &[Contact]) {
        for contact in contacts {
            let Some((body_a, body_b)) = bodies.get2_mut(contact.body_a, contact.body_b) else {
                continue;
            };
            self.resolve_contact(body_a, body_b, contact);
        }
    }

    fn resolve_contact(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, contact: &Contact) {
        let inverse_mass_sum = body_a.inverse_mass + body_b.inverse_mass;
        // Two immovable bodies overlapping is an expected configuration; the
        // impulse denominator would be zero, so skip before any division.
        if inverse_mass_sum <= f32::EPSILON {
            return;
        }

        let normal = contact.normal;
        let r_a = contact.point - body_a.position;
        let r_b = contact.point - body_b.position;

        let velocity_at_a = body_a.linear_velocity + body_a.angular_velocity.cross(r_a);
        let velocity_at_b = body_b.linear_velocity + body_b.angular_velocity.cross(r_b);
        let relative_velocity = velocity_at_b - velocity_at_a;
        let approach_speed = relative_velocity.dot(normal);

        if approach_speed < 0.0 {
            let angular_a = (body_a.inverse_inertia * r_a.cross(normal)).cross(r_a);
            let angular_b = (body_b.inverse_inertia * r_b.cross(normal)).cross(r_b);
            let denominator = inverse_mass_sum + (angular_a + angular_b).dot(normal);

            let restitution = contact.material.restitution;
            let impulse_magnitude = -(1.0 + restitution) * approach_speed / denominator;

            if !impulse_magnitude.is_finite() {
                warn!("contact impulse was non-finite, zeroing pair velocities");
                body_a.linear_velocity = Vec3::ZERO;
                body_a.angular_velocity = Vec3::ZERO;
                body_b.linear_velocity = Vec3::ZERO;
                body_b.angular_velocity = Vec3::ZERO;
                return;
            }

            let impulse = normal * impulse_magnitude;
            apply_contact_impulse(body_a, -impulse, r_a);
            apply_contact_impulse(body_b, impulse, r_b);

            self.apply_friction(
                body_a,
                body_b,
                contact,
                r_a,
                r_b,
                impulse_magnitude,
                inverse_mass_sum,
            );

            // A meaningful impulse disturbs a settled body. Active bodies
            // are left to the rest tracker's energy criterion.
            if impulse_magnitude.abs() > WAKE_IMPULSE_THRESHOLD {
                if body_a.is_at_rest {
                    body_a.wake();
                }
                if body_b.is_at_rest {
                    body_b.wake();
                }
            }
        }

        self.correct_positions(body_a, body_b, contact, inverse_mass_sum);
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_friction(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        contact: &Contact,
        r_a: Vec3,
        r_b: Vec3,
        normal_impulse: f32,
        inverse_mass_sum: f32,
    ) {
        let velocity_at_a = body_a.linear_velocity + body_a.angular_velocity.cross(r_a);
        let velocity_at_b = body_b.linear_velocity + body_b.angular_velocity.cross(r_b);
        let relative_velocity = velocity_at_b - velocity_at_a;

        let tangent =
            (relative_velocity - contact.normal * relative_velocity.dot(contact.normal))
                .normalize_or_zero();
        if tangent == Vec3::ZERO {
            return;
        }

        let angular_a = (body_a.inverse_inertia * r_a.cross(tangent)).cross(r_a);
        let angular_b = (body_b.inverse_inertia * r_b.cross(tangent)).cross(r_b);
        let denominator = inverse_mass_sum + (angular_a + angular_b).dot(tangent);
        if denominator <= f32::EPSILON {
            return;
        }

        let mut tangent_impulse = -relative_velocity.dot(tangent) / denominator;
        // Coulomb cone: tangential impulse is bounded by the normal impulse.
        let max_friction = contact.material.friction * normal_impulse.abs();
        tangent_impulse = tangent_impulse.clamp(-max_friction, max_friction);

        if !tangent_impulse.is_finite() {
            return;
        }

        let impulse = tangent * tangent_impulse;
        apply_contact_impulse(body_a, -impulse, r_a);
        apply_contact_impulse(body_b, impulse, r_b);
    }

    fn correct_positions(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        contact: &Contact,
        inverse_mass_sum: f32,
    ) {
        let residual = (contact.depth - self.penetration_slop).max(0.0);
        if residual <= 0.0 {
            return;
        }

        let correction =
            contact.normal * (residual / inverse_mass_sum) * self.correction_percent;
        body_a.position -= correction * body_a.inverse_mass;
        body_b.position += correction * body_b.inverse_mass;
    }
}

fn apply_contact_impulse(body: &mut RigidBody, impulse: Vec3, arm: Vec3) {
    body.linear_velocity += impulse * body.inverse_mass;
    body.angular_velocity += body.inverse_inertia * arm.cross(impulse);
}
