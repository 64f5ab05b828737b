use glam::{Quat, Vec3};

use crate::{
    collision::contact::Contact,
    core::{
        rigidbody::RigidBody,
        shapes::{CollisionShape, ShapeKind},
        types::Material,
    },
};

const EPSILON: f32 = 1e-6;

/// Exact per-pair tests, dispatched on the shape-kind pair.
///
/// Sphere pairs and sphere-vs-cuboid use closed-form tests; cuboid pairs use
/// a separating-axis test; any pair involving a pyramid goes through the
/// support-point (GJK) path with EPA penetration recovery.
pub struct NarrowPhase;

impl NarrowPhase {
    pub fn collide(body_a: &RigidBody, body_b: &RigidBody) -> Option<Contact> {
        let shape_a = body_a.collision_shape.as_ref()?;
        let shape_b = body_b.collision_shape.as_ref()?;

        let geometry = match (shape_a.kind(), shape_b.kind()) {
            (ShapeKind::Sphere, ShapeKind::Sphere) => {
                let (radius_a, radius_b) = match (shape_a, shape_b) {
                    (
                        CollisionShape::Sphere { radius: ra },
                        CollisionShape::Sphere { radius: rb },
                    ) => (*ra, *rb),
                    _ => unreachable!(),
                };
                sphere_sphere(body_a.position, radius_a, body_b.position, radius_b)
            }
            (ShapeKind::Sphere, ShapeKind::Cuboid) => {
                sphere_cuboid(body_a.position, shape_a, body_b, shape_b)
            }
            (ShapeKind::Cuboid, ShapeKind::Sphere) => {
                sphere_cuboid(body_b.position, shape_b, body_a, shape_a).map(flip)
            }
            (ShapeKind::Cuboid, ShapeKind::Cuboid) => separating_axis_cuboids(body_a, body_b),
            _ => Gjk::intersect(
                shape_a,
                body_a.position,
                body_a.orientation,
                shape_b,
                body_b.position,
                body_b.orientation,
            ),
        }?;

        Some(Contact {
            body_a: body_a.id,
            body_b: body_b.id,
            point: geometry.point,
            normal: geometry.normal,
            depth: geometry.depth,
            material: Material::combine(&body_a.material, &body_b.material),
        })
    }
}

/// Raw geometric result of a shape-pair test; the normal points A toward B.
#[derive(Debug, Clone, Copy)]
struct ContactGeometry {
    point: Vec3,
    normal: Vec3,
    depth: f32,
}

fn flip(geometry: ContactGeometry) -> ContactGeometry {
    ContactGeometry {
        normal: -geometry.normal,
        ..geometry
    }
}

fn sphere_sphere(
    center_a: Vec3,
    radius_a: f32,
    center_b: Vec3,
    radius_b: f32,
) -> Option<ContactGeometry> {
    let delta = center_b - center_a;
    let radius_sum = radius_a + radius_b;
    let distance_squared = delta.length_squared();
    if distance_squared >= radius_sum * radius_sum {
        return None;
    }

    let distance = distance_squared.sqrt();
    let normal = if distance > EPSILON {
        delta / distance
    } else {
        // Concentric spheres have no meaningful axis; pick one.
        Vec3::X
    };
    let depth = radius_sum - distance;

    Some(ContactGeometry {
        point: center_a + normal * (radius_a - depth * 0.5),
        normal,
        depth,
    })
}

/// Sphere (body A) versus cuboid (body B) via the closest point on the box.
fn sphere_cuboid(
    sphere_center: Vec3,
    sphere_shape: &CollisionShape,
    cuboid: &RigidBody,
    cuboid_shape: &CollisionShape,
) -> Option<ContactGeometry> {
    let radius = match sphere_shape {
        CollisionShape::Sphere { radius } => *radius,
        _ => return None,
    };
    let half_extents = match cuboid_shape {
        CollisionShape::Cuboid { half_extents } => *half_extents,
        _ => return None,
    };

    let local_center = cuboid.orientation.conjugate() * (sphere_center - cuboid.position);
    let clamped = local_center.clamp(-half_extents, half_extents);

    if clamped == local_center {
        // Sphere center inside the box: exit through the nearest face.
        let distances = half_extents - local_center.abs();
        let (axis, exit) = if distances.x <= distances.y && distances.x <= distances.z {
            (Vec3::new(1.0f32.copysign(local_center.x), 0.0, 0.0), distances.x)
        } else if distances.y <= distances.z {
            (Vec3::new(0.0, 1.0f32.copysign(local_center.y), 0.0), distances.y)
        } else {
            (Vec3::new(0.0, 0.0, 1.0f32.copysign(local_center.z)), distances.z)
        };
        let outward = cuboid.orientation * axis;
        return Some(ContactGeometry {
            point: sphere_center,
            normal: -outward,
            depth: radius + exit,
        });
    }

    let delta = local_center - clamped;
    let distance_squared = delta.length_squared();
    if distance_squared >= radius * radius {
        return None;
    }

    let distance = distance_squared.sqrt();
    let closest = cuboid.position + cuboid.orientation * clamped;
    Some(ContactGeometry {
        point: closest,
        normal: (closest - sphere_center) / distance.max(EPSILON),
        depth: radius - distance,
    })
}

/// Separating-axis test over the 15 candidate axes of two oriented cuboids.
fn separating_axis_cuboids(body_a: &RigidBody, body_b: &RigidBody) -> Option<ContactGeometry> {
    let half_a = match body_a.collision_shape.as_ref()? {
        CollisionShape::Cuboid { half_extents } => *half_extents,
        _ => return None,
    };
    let half_b = match body_b.collision_shape.as_ref()? {
        CollisionShape::Cuboid { half_extents } => *half_extents,
        _ => return None,
    };

    let relative = body_b.position - body_a.position;
    let axes_a = oriented_axes(body_a.orientation);
    let axes_b = oriented_axes(body_b.orientation);

    let mut candidates = Vec::with_capacity(15);
    candidates.extend_from_slice(&axes_a);
    candidates.extend_from_slice(&axes_b);
    for axis_a in &axes_a {
        for axis_b in &axes_b {
            let cross = axis_a.cross(*axis_b);
            if cross.length_squared() > EPSILON {
                candidates.push(cross.normalize());
            }
        }
    }

    let mut min_overlap = f32::MAX;
    let mut min_axis = Vec3::ZERO;
    for axis in candidates {
        let reach_a = project_extent(&axes_a, half_a, axis);
        let reach_b = project_extent(&axes_b, half_b, axis);
        let separation = relative.dot(axis);
        let overlap = reach_a + reach_b - separation.abs();
        if overlap <= 0.0 {
            return None;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            min_axis = if separation < 0.0 { -axis } else { axis };
        }
    }

    let shape_a = body_a.collision_shape.as_ref()?;
    let surface = shape_a.support_world(min_axis, body_a.position, body_a.orientation);
    Some(ContactGeometry {
        point: surface - min_axis * (min_overlap * 0.5),
        normal: min_axis,
        depth: min_overlap,
    })
}

fn oriented_axes(orientation: Quat) -> [Vec3; 3] {
    [
        orientation * Vec3::X,
        orientation * Vec3::Y,
        orientation * Vec3::Z,
    ]
}

fn project_extent(axes: &[Vec3; 3], half_extents: Vec3, direction: Vec3) -> f32 {
    axes[0].dot(direction).abs() * half_extents.x
        + axes[1].dot(direction).abs() * half_extents.y
        + axes[2].dot(direction).abs() * half_extents.z
}

/// Gilbert-Johnson-Keerthi intersection test over support points, with EPA
/// penetration recovery.
struct Gjk;

impl Gjk {
    const MAX_ITERATIONS: usize = 20;

    fn intersect(
        shape_a: &CollisionShape,
        position_a: Vec3,
        orientation_a: Quat,
        shape_b: &CollisionShape,
        position_b: Vec3,
        orientation_b: Quat,
    ) -> Option<ContactGeometry> {
        let mut simplex: Vec<Vec3> = Vec::with_capacity(4);
        let mut direction = position_b - position_a;
        if direction.length_squared() < EPSILON {
            direction = Vec3::X;
        }

        for _ in 0..Self::MAX_ITERATIONS {
            let point = Self::minkowski_support(
                shape_a,
                position_a,
                orientation_a,
                shape_b,
                position_b,
                orientation_b,
                direction,
            );
            if point.dot(direction) < 0.0 {
                return None;
            }

            simplex.push(point);
            if !Self::advance_simplex(&mut simplex, &mut direction) {
                continue;
            }

            // Origin enclosed: recover penetration depth and axis.
            let (depth, mut normal) = Epa::penetration(
                &simplex,
                shape_a,
                position_a,
                orientation_a,
                shape_b,
                position_b,
                orientation_b,
            );

            let relative = position_b - position_a;
            if normal.dot(relative) < 0.0 {
                normal = -normal;
            }

            // A shallow contact can leave EPA with a face normal nearly
            // perpendicular to the approach axis; trust the center axis then.
            let center_distance_squared = relative.length_squared();
            if center_distance_squared > EPSILON {
                let center_axis = relative / center_distance_squared.sqrt();
                if normal.dot(center_axis) < 0.5 && depth < 0.01 {
                    normal = center_axis;
                }
            }

            let surface = shape_a.support_world(normal, position_a, orientation_a);
            return Some(ContactGeometry {
                point: surface - normal * (depth * 0.5),
                normal,
                depth,
            });
        }

        None
    }

    #[allow(clippy::too_many_arguments)]
    fn minkowski_support(
        shape_a: &CollisionShape,
        position_a: Vec3,
        orientation_a: Quat,
        shape_b: &CollisionShape,
        position_b: Vec3,
        orientation_b: Quat,
        direction: Vec3,
    ) -> Vec3 {
        shape_a.support_world(direction, position_a, orientation_a)
            - shape_b.support_world(-direction, position_b, orientation_b)
    }

    /// Updates the simplex toward the origin. Returns true once the simplex
    /// is a tetrahedron containing the origin.
    fn advance_simplex(simplex: &mut Vec<Vec3>, direction: &mut Vec3) -> bool {
        match simplex.len() {
            1 => {
                *direction = -simplex[0];
                false
            }
            2 => {
                let a = simplex[1];
                let b = simplex[0];
                let ab = b - a;
                let ao = -a;
                let toward_origin = ab.cross(ao).cross(ab);
                if toward_origin.length_squared() < EPSILON {
                    // Origin sits on the segment: any perpendicular works.
                    let axis = if ab.x.abs() < 0.1 { Vec3::X } else { Vec3::Y };
                    *direction = ab.cross(axis);
                } else {
                    *direction = toward_origin;
                }
                false
            }
            3 => {
                let a = simplex[2];
                let b = simplex[1];
                let c = simplex[0];
                let ab = b - a;
                let ac = c - a;
                let ao = -a;
                let face = ab.cross(ac);

                if face.cross(ac).dot(ao) > 0.0 {
                    simplex.remove(1);
                    *direction = ac.cross(ao).cross(ac);
                    false
                } else if ab.cross(face).dot(ao) > 0.0 {
                    simplex.remove(0);
                    *direction = ab.cross(ao).cross(ab);
                    false
                } else {
                    if face.length_squared() < EPSILON {
                        *direction = Vec3::Y;
                    } else if face.dot(ao) > 0.0 {
                        *direction = face;
                    } else {
                        *direction = -face;
                    }
                    false
                }
            }
            4 => {
                let a = simplex[3];
                let b = simplex[2];
                let c = simplex[1];
                let d = simplex[0];
                let ab = b - a;
                let ac = c - a;
                let ad = d - a;
                let ao = -a;
                let abc = ab.cross(ac);
                let acd = ac.cross(ad);
                let adb = ad.cross(ab);

                if abc.dot(ao) > 0.0 {
                    simplex.remove(0);
                    *direction = abc;
                    false
                } else if acd.dot(ao) > 0.0 {
                    simplex.remove(2);
                    *direction = acd;
                    false
                } else if adb.dot(ao) > 0.0 {
                    simplex.remove(1);
                    *direction = adb;
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }
}

/// Expanding polytope algorithm: grows the terminal GJK simplex until the
/// face closest to the origin stops moving, yielding depth and normal.
struct Epa;

impl Epa {
    const MAX_ITERATIONS: usize = 32;

    #[allow(clippy::too_many_arguments)]
    fn penetration(
        simplex: &[Vec3],
        shape_a: &CollisionShape,
        position_a: Vec3,
        orientation_a: Quat,
        shape_b: &CollisionShape,
        position_b: Vec3,
        orientation_b: Quat,
    ) -> (f32, Vec3) {
        let fallback_axis = || {
            let axis = (position_b - position_a).normalize_or_zero();
            if axis == Vec3::ZERO {
                Vec3::X
            } else {
                axis
            }
        };

        if simplex.len() < 4 {
            let depth = simplex
                .iter()
                .map(|p| p.length())
                .fold(f32::MAX, f32::min)
                .min(0.01);
            return (depth.max(EPSILON), fallback_axis());
        }

        let mut polytope = simplex.to_vec();
        let mut faces = Self::initial_faces(&polytope);

        for _ in 0..Self::MAX_ITERATIONS {
            let (min_distance, normal) = Self::closest_face(&polytope, &faces);
            if min_distance >= f32::MAX * 0.5 {
                return (0.01, fallback_axis());
            }
            if min_distance < EPSILON {
                return (EPSILON, normal);
            }

            let support = Gjk::minkowski_support(
                shape_a,
                position_a,
                orientation_a,
                shape_b,
                position_b,
                orientation_b,
                normal,
            );
            if support.dot(normal) - min_distance < EPSILON {
                return (min_distance, normal);
            }

            Self::expand(&mut polytope, &mut faces, support);
        }

        let (min_distance, normal) = Self::closest_face(&polytope, &faces);
        if min_distance >= f32::MAX * 0.5 {
            (0.01, fallback_axis())
        } else {
            (min_distance, normal)
        }
    }

    fn initial_faces(polytope: &[Vec3]) -> Vec<(usize, usize, usize)> {
        let mut faces = vec![(0, 1, 2), (0, 2, 3), (0, 3, 1), (1, 3, 2)];
        // Wind every face so its normal points away from the enclosed origin.
        for face in &mut faces {
            let ab = polytope[face.1] - polytope[face.0];
            let ac = polytope[face.2] - polytope[face.0];
            if polytope[face.0].dot(ab.cross(ac)) < 0.0 {
                std::mem::swap(&mut face.1, &mut face.2);
            }
        }
        faces
    }

    fn closest_face(polytope: &[Vec3], faces: &[(usize, usize, usize)]) -> (f32, Vec3) {
        let mut min_distance = f32::MAX;
        let mut min_normal = Vec3::ZERO;

        for &(a, b, c) in faces {
            let ab = polytope[b] - polytope[a];
            let ac = polytope[c] - polytope[a];
            let normal = ab.cross(ac).normalize_or_zero();
            if normal == Vec3::ZERO {
                continue;
            }
            let distance = polytope[a].dot(normal);
            if distance < min_distance {
                min_distance = distance;
                min_normal = normal;
            }
        }

        (min_distance, min_normal)
    }

    fn expand(polytope: &mut Vec<Vec3>, faces: &mut Vec<(usize, usize, usize)>, support: Vec3) {
        let new_index = polytope.len();
        polytope.push(support);

        let mut loose_edges: Vec<(usize, usize)> = Vec::new();
        let mut i = 0;
        while i < faces.len() {
            let (a, b, c) = faces[i];
            let ab = polytope[b] - polytope[a];
            let ac = polytope[c] - polytope[a];
            let normal = ab.cross(ac).normalize_or_zero();

            if normal.dot(support - polytope[a]) > 0.0 {
                for edge in [(a, b), (b, c), (c, a)] {
                    // An edge shared by two removed faces is interior.
                    if let Some(found) = loose_edges.iter().position(|&e| e == (edge.1, edge.0)) {
                        loose_edges.swap_remove(found);
                    } else {
                        loose_edges.push(edge);
                    }
                }
                faces.swap_remove(i);
            } else {
                i += 1;
            }
        }

        for (a, b) in loose_edges {
            faces.push((a, b, new_index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::BodyHandle;

    fn sphere_body(index: u32, radius: f32, position: Vec3) -> RigidBody {
        let mut body = RigidBody::new(BodyHandle::from_index(index));
        body.position = position;
        body.collision_shape = Some(CollisionShape::Sphere { radius });
        body
    }

    fn cuboid_body(index: u32, half_extents: Vec3, position: Vec3) -> RigidBody {
        let mut body = RigidBody::new(BodyHandle::from_index(index));
        body.position = position;
        body.collision_shape = Some(CollisionShape::Cuboid { half_extents });
        body
    }

    fn pyramid_body(index: u32, half_extents: Vec3, position: Vec3) -> RigidBody {
        let mut body = RigidBody::new(BodyHandle::from_index(index));
        body.position = position;
        body.collision_shape = Some(CollisionShape::Pyramid { half_extents });
        body
    }

    #[test]
    fn unit_spheres_at_one_point_five_overlap_by_half() {
        let a = sphere_body(0, 1.0, Vec3::ZERO);
        let b = sphere_body(1, 1.0, Vec3::new(1.5, 0.0, 0.0));

        let contact = NarrowPhase::collide(&a, &b).expect("overlapping spheres");
        assert!((contact.depth - 0.5).abs() < 1e-5, "depth {}", contact.depth);
        assert!(contact.normal.x > 0.99);
    }

    #[test]
    fn unit_spheres_at_two_point_five_do_not_touch() {
        let a = sphere_body(0, 1.0, Vec3::ZERO);
        let b = sphere_body(1, 1.0, Vec3::new(2.5, 0.0, 0.0));
        assert!(NarrowPhase::collide(&a, &b).is_none());
    }

    #[test]
    fn sphere_against_cuboid_face_reports_face_normal() {
        let sphere = sphere_body(0, 0.5, Vec3::new(1.3, 0.0, 0.0));
        let cuboid = cuboid_body(1, Vec3::ONE, Vec3::ZERO);

        let contact = NarrowPhase::collide(&sphere, &cuboid).expect("sphere touches face");
        assert!((contact.depth - 0.2).abs() < 1e-5, "depth {}", contact.depth);
        // A is the sphere, so the normal points toward the box.
        assert!(contact.normal.x < -0.99);
    }

    #[test]
    fn rotated_cuboids_collide_where_aligned_ones_would_not() {
        let mut a = cuboid_body(0, Vec3::ONE, Vec3::ZERO);
        let b = cuboid_body(1, Vec3::ONE, Vec3::new(2.1, 0.0, 0.0));
        // Axis-aligned there is a 0.1 gap; rotated 45° about Z the reach
        // along X grows to sqrt(2).
        a.orientation = Quat::from_rotation_z(45.0f32.to_radians());

        let contact = NarrowPhase::collide(&a, &b).expect("rotated boxes touch");
        assert!(contact.depth > 0.0);
        assert!(contact.normal.x.abs() > 0.9);
    }

    #[test]
    fn pyramids_resting_base_to_base_overlap() {
        let a = pyramid_body(0, Vec3::ONE, Vec3::ZERO);
        let b = pyramid_body(1, Vec3::ONE, Vec3::new(0.5, 0.0, 0.0));

        let contact = NarrowPhase::collide(&a, &b).expect("overlapping pyramids");
        assert!(contact.depth > 0.0);
        assert!(contact.normal.dot(Vec3::X) > 0.0);
    }

    #[test]
    fn separated_pyramid_and_sphere_do_not_collide() {
        let a = pyramid_body(0, Vec3::ONE, Vec3::ZERO);
        let b = sphere_body(1, 0.5, Vec3::new(4.0, 0.0, 0.0));
        assert!(NarrowPhase::collide(&a, &b).is_none());
    }

    #[test]
    fn bodies_without_shapes_never_collide() {
        let a = RigidBody::new(BodyHandle::from_index(0));
        let b = sphere_body(1, 1.0, Vec3::ZERO);
        assert!(NarrowPhase::collide(&a, &b).is_none());
    }
}
