use std::collections::HashSet;

use glam::Vec3;
use log::warn;

use crate::{
    config::{DEFAULT_OCTREE_LEAF_CAPACITY, DEFAULT_OCTREE_MAX_DEPTH},
    core::{rigidbody::RigidBody, types::Aabb},
    utils::allocator::{Arena, BodyHandle},
};

/// Unordered candidate pair of body handles.
pub type BodyPair = (BodyHandle, BodyHandle);

/// Per-body input to pair generation: handle plus world-space bounds.
#[derive(Debug, Clone, Copy)]
pub struct BroadphaseEntry {
    pub handle: BodyHandle,
    pub aabb: Aabb,
}

/// Gathers broadphase entries in slot order. Bodies without a collision
/// shape never participate in pair generation.
pub fn collect_entries(bodies: &Arena<RigidBody>) -> Vec<BroadphaseEntry> {
    bodies
        .iter()
        .filter_map(|body| {
            body.aabb().map(|aabb| BroadphaseEntry {
                handle: body.id,
                aabb,
            })
        })
        .collect()
}

fn ordered(a: BodyHandle, b: BodyHandle) -> BodyPair {
    if a.index() < b.index() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Candidate-pair generation strategy.
///
/// Implementations must be deterministic: the same entries in the same order
/// always produce the same pair set, with each unordered pair reported once
/// and no self-pairs.
pub trait Broadphase: Send + Sync {
    fn compute_pairs(&self, bodies: &Arena<RigidBody>) -> Vec<BodyPair> {
        self.pairs_from_entries(&collect_entries(bodies))
    }

    fn pairs_from_entries(&self, entries: &[BroadphaseEntry]) -> Vec<BodyPair>;
}

/// All-pairs overlap testing. Quadratic, but has no spatial structure to
/// corrupt, which makes it the conservative fallback strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl Broadphase for BruteForce {
    fn pairs_from_entries(&self, entries: &[BroadphaseEntry]) -> Vec<BodyPair> {
        let mut pairs = Vec::new();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.aabb.overlaps(&b.aabb) {
                    pairs.push(ordered(a.handle, b.handle));
                }
            }
        }
        pairs
    }
}

/// Sort-and-sweep along a single axis.
///
/// Entries are sorted by their interval minimum on the sweep axis; the sweep
/// reports a pair whenever two intervals overlap on that axis and the full
/// three-axis box test confirms it. The one-axis sort is a necessary-but-not-
/// sufficient filter, never the final answer.
#[derive(Debug, Clone, Copy)]
pub struct SortAndSweep {
    /// Sweep axis index: 0 = X, 1 = Y, 2 = Z.
    pub axis: usize,
}

impl Default for SortAndSweep {
    fn default() -> Self {
        Self { axis: 0 }
    }
}

fn axis_value(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

impl Broadphase for SortAndSweep {
    fn pairs_from_entries(&self, entries: &[BroadphaseEntry]) -> Vec<BodyPair> {
        let axis = self.axis.min(2);
        let mut sorted: Vec<&BroadphaseEntry> = entries.iter().collect();
        // Tie-break on handle index so equal coordinates cannot reorder.
        sorted.sort_by(|a, b| {
            axis_value(a.aabb.min, axis)
                .total_cmp(&axis_value(b.aabb.min, axis))
                .then(a.handle.index().cmp(&b.handle.index()))
        });

        let mut pairs = Vec::new();
        for (i, a) in sorted.iter().enumerate() {
            let sweep_end = axis_value(a.aabb.max, axis);
            for b in &sorted[i + 1..] {
                if axis_value(b.aabb.min, axis) > sweep_end {
                    break;
                }
                if a.aabb.overlaps(&b.aabb) {
                    pairs.push(ordered(a.handle, b.handle));
                }
            }
        }
        pairs
    }
}

/// Hierarchical octree broadphase composed with an inner leaf strategy.
///
/// Space subdivides eight ways per node until either the configured depth or
/// the leaf capacity is reached. A body whose bounds straddle a boundary is
/// inserted into every child it touches, never split, so the same pair can
/// surface from several leaves and is deduplicated on the way out. Pair
/// generation inside a leaf is delegated to the composed strategy, which
/// keeps a dense leaf from degenerating into a brute-force scan.
pub struct Octree {
    max_depth: u32,
    leaf_capacity: usize,
    leaf_strategy: Box<dyn Broadphase>,
}

impl Octree {
    pub fn new(max_depth: u32, leaf_capacity: usize, leaf_strategy: Box<dyn Broadphase>) -> Self {
        Self {
            max_depth,
            leaf_capacity: leaf_capacity.max(1),
            leaf_strategy,
        }
    }

    fn octant(bounds: &Aabb, center: Vec3, index: usize) -> Aabb {
        let min = Vec3::new(
            if index & 1 == 0 { bounds.min.x } else { center.x },
            if index & 2 == 0 { bounds.min.y } else { center.y },
            if index & 4 == 0 { bounds.min.z } else { center.z },
        );
        let max = Vec3::new(
            if index & 1 == 0 { center.x } else { bounds.max.x },
            if index & 2 == 0 { center.y } else { bounds.max.y },
            if index & 4 == 0 { center.z } else { bounds.max.z },
        );
        Aabb::new(min, max)
    }

    fn descend(
        &self,
        entries: &[BroadphaseEntry],
        subset: &[usize],
        bounds: Aabb,
        depth: u32,
        pairs: &mut Vec<BodyPair>,
        seen: &mut HashSet<(usize, usize)>,
    ) {
        if subset.len() <= self.leaf_capacity || depth >= self.max_depth {
            let leaf: Vec<BroadphaseEntry> = subset.iter().map(|&i| entries[i]).collect();
            for pair in self.leaf_strategy.pairs_from_entries(&leaf) {
                if seen.insert((pair.0.index(), pair.1.index())) {
                    pairs.push(pair);
                }
            }
            return;
        }

        let center = bounds.center();
        for index in 0..8 {
            let child_bounds = Self::octant(&bounds, center, index);
            let child: Vec<usize> = subset
                .iter()
                .copied()
                .filter(|&i| entries[i].aabb.overlaps(&child_bounds))
                .collect();
            if !child.is_empty() {
                self.descend(entries, &child, child_bounds, depth + 1, pairs, seen);
            }
        }
    }
}

impl Default for Octree {
    fn default() -> Self {
        Self::new(
            DEFAULT_OCTREE_MAX_DEPTH,
            DEFAULT_OCTREE_LEAF_CAPACITY,
            Box::new(SortAndSweep::default()),
        )
    }
}

impl Broadphase for Octree {
    fn pairs_from_entries(&self, entries: &[BroadphaseEntry]) -> Vec<BodyPair> {
        if entries.len() < 2 {
            return Vec::new();
        }

        let mut bounds = entries[0].aabb;
        for entry in &entries[1..] {
            bounds = bounds.union(&entry.aabb);
        }
        if !bounds.is_finite() {
            debug_assert!(bounds.is_finite(), "octree world bounds are non-finite");
            warn!("octree bounds are non-finite, degrading to all-pairs sweep");
            return BruteForce.pairs_from_entries(entries);
        }

        let mut pairs = Vec::new();
        let mut seen = HashSet::new();
        let subset: Vec<usize> = (0..entries.len()).collect();
        self.descend(entries, &subset, bounds, 0, &mut pairs, &mut seen);
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u32, center: Vec3, half: f32) -> BroadphaseEntry {
        BroadphaseEntry {
            handle: BodyHandle::from_index(index),
            aabb: Aabb::from_center_half_extents(center, Vec3::splat(half)),
        }
    }

    fn pair_set(pairs: &[BodyPair]) -> HashSet<(usize, usize)> {
        pairs.iter().map(|(a, b)| (a.index(), b.index())).collect()
    }

    #[test]
    fn sweep_matches_brute_force_membership() {
        let entries = vec![
            entry(0, Vec3::ZERO, 1.0),
            entry(1, Vec3::new(1.5, 0.0, 0.0), 1.0),
            entry(2, Vec3::new(10.0, 0.0, 0.0), 1.0),
            entry(3, Vec3::new(1.5, 1.5, 0.0), 1.0),
        ];

        let sweep = SortAndSweep::default().pairs_from_entries(&entries);
        let brute = BruteForce.pairs_from_entries(&entries);
        assert_eq!(pair_set(&sweep), pair_set(&brute));
    }

    #[test]
    fn octree_reports_each_pair_once() {
        // Straddling the root center duplicates bodies across leaves.
        let entries = vec![
            entry(0, Vec3::splat(0.1), 1.0),
            entry(1, Vec3::splat(-0.1), 1.0),
            entry(2, Vec3::new(8.0, 8.0, 8.0), 1.0),
            entry(3, Vec3::new(-8.0, -8.0, -8.0), 1.0),
        ];

        let octree = Octree::new(3, 1, Box::new(SortAndSweep::default()));
        let pairs = octree.pairs_from_entries(&entries);
        let unique = pair_set(&pairs);
        assert_eq!(pairs.len(), unique.len());
        assert!(unique.contains(&(0, 1)));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(SortAndSweep::default().pairs_from_entries(&[]).is_empty());
        assert!(Octree::default().pairs_from_entries(&[]).is_empty());
        assert!(BruteForce.pairs_from_entries(&[]).is_empty());
    }
}
