use kinetica::*;

fn sphere_body(index: u32, radius: f32, position: Vec3) -> RigidBody {
    let mut body = RigidBody::new(BodyHandle::from_index(index));
    body.set_position(position).unwrap();
    body.set_collision_shape(Some(CollisionShape::Sphere { radius }));
    body
}

fn cuboid_body(index: u32, half_extents: Vec3, position: Vec3) -> RigidBody {
    let mut body = RigidBody::new(BodyHandle::from_index(index));
    body.set_position(position).unwrap();
    body.set_collision_shape(Some(CollisionShape::Cuboid { half_extents }));
    body
}

#[test]
fn manifold_reports_expected_sphere_penetration() {
    let a = sphere_body(0, 1.0, Vec3::ZERO);
    let b = sphere_body(1, 1.0, Vec3::new(1.5, 0.0, 0.0));

    let manifold = ContactManifold::generate(&a, &b).expect("overlapping spheres");
    assert_eq!(manifold.contacts.len(), 1);

    let contact = &manifold.contacts[0];
    assert!((contact.depth - 0.5).abs() < 1e-5, "depth {}", contact.depth);
    assert!(contact.normal.x > 0.99);
    // Contact point sits between the surfaces.
    assert!(contact.point.x > 0.5 && contact.point.x < 1.0);
}

#[test]
fn manifold_is_absent_for_separated_spheres() {
    let a = sphere_body(0, 1.0, Vec3::ZERO);
    let b = sphere_body(1, 1.0, Vec3::new(2.5, 0.0, 0.0));
    assert!(ContactManifold::generate(&a, &b).is_none());
}

#[test]
fn sphere_resting_on_cuboid_has_downward_normal() {
    let floor = cuboid_body(0, Vec3::new(5.0, 1.0, 5.0), Vec3::ZERO);
    let ball = sphere_body(1, 0.5, Vec3::new(0.0, 1.4, 0.0));

    let manifold = ContactManifold::generate(&ball, &floor).expect("ball touches floor");
    let contact = &manifold.contacts[0];
    // A is the ball, so the normal points from the ball into the floor.
    assert!(contact.normal.y < -0.99, "normal {:?}", contact.normal);
    assert!((contact.depth - 0.1).abs() < 1e-5);
}

#[test]
fn shapeless_body_generates_no_manifold() {
    let mut ghost = RigidBody::new(BodyHandle::from_index(0));
    ghost.set_position(Vec3::ZERO).unwrap();
    let b = sphere_body(1, 1.0, Vec3::ZERO);

    assert!(ContactManifold::generate(&ghost, &b).is_none());
}

#[test]
fn pyramid_and_cuboid_overlap_is_detected() {
    let mut pyramid = RigidBody::new(BodyHandle::from_index(0));
    pyramid.set_position(Vec3::new(0.0, 0.4, 0.0)).unwrap();
    pyramid.set_collision_shape(Some(CollisionShape::Pyramid {
        half_extents: Vec3::ONE,
    }));
    let slab = cuboid_body(1, Vec3::new(4.0, 1.0, 4.0), Vec3::new(0.0, -1.0, 0.0));

    let manifold = ContactManifold::generate(&pyramid, &slab).expect("pyramid rests on slab");
    assert!(manifold.contacts[0].depth > 0.0);
}
