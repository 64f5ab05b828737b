use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::types::Aabb;

/// Discriminant used for narrowphase dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Sphere,
    Cuboid,
    Pyramid,
}

/// Convex collision geometry owned by a rigid body.
///
/// The set of shapes is closed, so narrowphase dispatch is a match on the
/// `(ShapeKind, ShapeKind)` pair rather than a virtual call per candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    Sphere {
        radius: f32,
    },
    /// Box described by half-extents along each local axis.
    Cuboid {
        half_extents: Vec3,
    },
    /// Square-based pyramid: base in the local XZ plane, apex along +Y.
    /// `half_extents` holds the base half-widths (x, z) and half-height (y).
    Pyramid {
        half_extents: Vec3,
    },
}

impl CollisionShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            CollisionShape::Sphere { .. } => ShapeKind::Sphere,
            CollisionShape::Cuboid { .. } => ShapeKind::Cuboid,
            CollisionShape::Pyramid { .. } => ShapeKind::Pyramid,
        }
    }

    /// Analytic inverse inertia tensor for the shape's canonical geometry,
    /// scaled by mass. An `inverse_mass` of zero means infinite mass and
    /// yields the zero tensor: no rotational response is ever computed from
    /// such a body.
    pub fn build_inverse_inertia(&self, inverse_mass: f32) -> Mat3 {
        if inverse_mass == 0.0 {
            return Mat3::ZERO;
        }
        let mass = 1.0 / inverse_mass;

        let inertia = match self {
            CollisionShape::Sphere { radius } => {
                Vec3::splat(0.4 * mass * radius * radius)
            }
            CollisionShape::Cuboid { half_extents } => {
                let l = *half_extents * 2.0;
                let factor = mass / 12.0;
                Vec3::new(
                    factor * (l.y * l.y + l.z * l.z),
                    factor * (l.x * l.x + l.z * l.z),
                    factor * (l.x * l.x + l.y * l.y),
                )
            }
            CollisionShape::Pyramid { half_extents } => {
                let h = *half_extents;
                Vec3::new(
                    mass * (h.z * h.z / 5.0 + 3.0 * h.y * h.y / 20.0),
                    mass * (h.x * h.x + h.z * h.z) / 5.0,
                    mass * (h.x * h.x / 5.0 + 3.0 * h.y * h.y / 20.0),
                )
            }
        };

        Mat3::from_diagonal(Vec3::new(
            safe_recip(inertia.x),
            safe_recip(inertia.y),
            safe_recip(inertia.z),
        ))
    }

    /// Radius of a sphere guaranteed to enclose the shape.
    pub fn bounding_radius(&self) -> f32 {
        match self {
            CollisionShape::Sphere { radius } => *radius,
            CollisionShape::Cuboid { half_extents } => half_extents.length(),
            CollisionShape::Pyramid { half_extents } => half_extents.length(),
        }
    }

    /// Half-extents of an axis-aligned box enclosing the shape in local space.
    pub fn bounding_half_extents(&self) -> Vec3 {
        match self {
            CollisionShape::Sphere { radius } => Vec3::splat(*radius),
            CollisionShape::Cuboid { half_extents } => *half_extents,
            CollisionShape::Pyramid { half_extents } => *half_extents,
        }
    }

    /// Conservative world-space bounds at the given pose. Exact for spheres
    /// and cuboids; for pyramids the enclosing box of the base is used.
    pub fn aabb(&self, position: Vec3, orientation: Quat) -> Aabb {
        match self {
            CollisionShape::Sphere { radius } => {
                Aabb::from_center_half_extents(position, Vec3::splat(*radius))
            }
            CollisionShape::Cuboid { .. } | CollisionShape::Pyramid { .. } => {
                let rotation = Mat3::from_quat(orientation);
                let abs_rotation = Mat3::from_cols(
                    rotation.x_axis.abs(),
                    rotation.y_axis.abs(),
                    rotation.z_axis.abs(),
                );
                let world_half = abs_rotation * self.bounding_half_extents();
                Aabb::from_center_half_extents(position, world_half)
            }
        }
    }

    /// Furthest point of the shape in the given local-space direction.
    pub fn support(&self, direction: Vec3) -> Vec3 {
        match self {
            CollisionShape::Sphere { radius } => direction.normalize_or_zero() * *radius,
            CollisionShape::Cuboid { half_extents } => Vec3::new(
                half_extents.x.copysign(direction.x),
                half_extents.y.copysign(direction.y),
                half_extents.z.copysign(direction.z),
            ),
            CollisionShape::Pyramid { half_extents } => {
                let h = *half_extents;
                let vertices = [
                    Vec3::new(-h.x, -h.y, -h.z),
                    Vec3::new(h.x, -h.y, -h.z),
                    Vec3::new(h.x, -h.y, h.z),
                    Vec3::new(-h.x, -h.y, h.z),
                    Vec3::new(0.0, h.y, 0.0),
                ];
                vertices
                    .into_iter()
                    .max_by(|a, b| a.dot(direction).total_cmp(&b.dot(direction)))
                    .unwrap_or(Vec3::ZERO)
            }
        }
    }

    /// Furthest point of the shape in a world-space direction at a pose.
    pub fn support_world(&self, direction: Vec3, position: Vec3, orientation: Quat) -> Vec3 {
        let local_direction = orientation.conjugate() * direction;
        position + orientation * self.support(local_direction)
    }
}

fn safe_recip(value: f32) -> f32 {
    if value.abs() < f32::EPSILON {
        0.0
    } else {
        1.0 / value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_mass_yields_zero_inverse_inertia() {
        let shapes = [
            CollisionShape::Sphere { radius: 1.0 },
            CollisionShape::Cuboid {
                half_extents: Vec3::ONE,
            },
            CollisionShape::Pyramid {
                half_extents: Vec3::ONE,
            },
        ];
        for shape in shapes {
            assert_eq!(shape.build_inverse_inertia(0.0), Mat3::ZERO);
        }
    }

    #[test]
    fn sphere_inverse_inertia_matches_analytic_value() {
        let shape = CollisionShape::Sphere { radius: 2.0 };
        let inverse = shape.build_inverse_inertia(0.5);
        // I = (2/5) * m * r^2 = 0.4 * 2.0 * 4.0 = 3.2
        let expected = 1.0 / 3.2;
        assert!((inverse.x_axis.x - expected).abs() < 1e-6);
        assert!((inverse.y_axis.y - expected).abs() < 1e-6);
        assert!((inverse.z_axis.z - expected).abs() < 1e-6);
    }

    #[test]
    fn pyramid_inverse_inertia_is_positive_on_the_diagonal() {
        let shape = CollisionShape::Pyramid {
            half_extents: Vec3::new(1.0, 2.0, 1.5),
        };
        let inverse = shape.build_inverse_inertia(1.0);
        assert!(inverse.x_axis.x > 0.0);
        assert!(inverse.y_axis.y > 0.0);
        assert!(inverse.z_axis.z > 0.0);
        // Base is wider in z than x, so inertia about x is larger.
        assert!(inverse.x_axis.x < inverse.z_axis.z);
    }

    #[test]
    fn bounding_radius_encloses_support_points() {
        let shape = CollisionShape::Pyramid {
            half_extents: Vec3::new(1.0, 3.0, 2.0),
        };
        for direction in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 1.0, 1.0)] {
            assert!(shape.support(direction).length() <= shape.bounding_radius() + 1e-5);
        }
    }
}
