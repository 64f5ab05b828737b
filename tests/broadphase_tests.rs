use std::collections::HashSet;

use kinetica::*;

fn populate(bodies: &mut Arena<RigidBody>, positions: &[Vec3]) -> Vec<BodyHandle> {
    positions
        .iter()
        .map(|&position| {
            let mut body = RigidBody::default();
            body.set_position(position).unwrap();
            body.set_collision_shape(Some(CollisionShape::Sphere { radius: 1.0 }));
            let handle = bodies.insert(body);
            bodies.get_mut(handle).unwrap().id = handle;
            handle
        })
        .collect()
}

fn scattered_positions() -> Vec<Vec3> {
    let mut positions = Vec::new();
    for i in 0..24 {
        let f = i as f32;
        positions.push(Vec3::new(
            (f * 1.3) % 17.0,
            (f * 2.7) % 11.0,
            (f * 0.9) % 13.0,
        ));
    }
    positions
}

fn pair_set(pairs: &[BodyPair]) -> HashSet<(usize, usize)> {
    pairs.iter().map(|(a, b)| (a.index(), b.index())).collect()
}

#[test]
fn repeated_calls_return_identical_pair_sequences() {
    let mut bodies = Arena::new();
    populate(&mut bodies, &scattered_positions());

    for strategy in [
        Box::new(SortAndSweep::default()) as Box<dyn Broadphase>,
        Box::new(Octree::default()),
        Box::new(BruteForce),
    ] {
        let first = strategy.compute_pairs(&bodies);
        let second = strategy.compute_pairs(&bodies);
        assert_eq!(first, second, "strategy output must be reproducible");
    }
}

#[test]
fn octree_and_sweep_agree_with_brute_force() {
    let mut bodies = Arena::new();
    populate(&mut bodies, &scattered_positions());

    let reference = pair_set(&BruteForce.compute_pairs(&bodies));
    let sweep = pair_set(&SortAndSweep::default().compute_pairs(&bodies));
    let octree = pair_set(&Octree::default().compute_pairs(&bodies));

    assert_eq!(sweep, reference);
    assert_eq!(octree, reference);
}

#[test]
fn octree_never_duplicates_a_straddling_pair() {
    let mut bodies = Arena::new();
    // Two bodies straddling the root split plane land in several leaves.
    populate(
        &mut bodies,
        &[
            Vec3::splat(0.2),
            Vec3::splat(-0.2),
            Vec3::new(9.0, 9.0, 9.0),
            Vec3::new(-9.0, -9.0, -9.0),
        ],
    );

    let octree = Octree::new(4, 1, Box::new(SortAndSweep::default()));
    let pairs = octree.compute_pairs(&bodies);
    assert_eq!(pairs.len(), pair_set(&pairs).len());
    assert!(pair_set(&pairs).contains(&(0, 1)));
}

#[test]
fn bodies_without_shapes_are_excluded() {
    let mut bodies = Arena::new();
    let handles = populate(&mut bodies, &[Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)]);
    bodies.get_mut(handles[0]).unwrap().set_collision_shape(None);

    assert!(BruteForce.compute_pairs(&bodies).is_empty());
}

#[test]
fn empty_registry_yields_no_pairs() {
    let bodies: Arena<RigidBody> = Arena::new();
    assert!(Octree::default().compute_pairs(&bodies).is_empty());
    assert!(SortAndSweep::default().compute_pairs(&bodies).is_empty());
}

#[test]
fn no_self_pairs_are_reported() {
    let mut bodies = Arena::new();
    populate(&mut bodies, &scattered_positions());

    for (a, b) in SortAndSweep::default().compute_pairs(&bodies) {
        assert_ne!(a, b);
    }
}
