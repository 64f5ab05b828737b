use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box used for broadphase culling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Surface coefficients consulted when two bodies collide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.2,
            friction: 0.4,
        }
    }
}

impl Material {
    /// Combined coefficients for a colliding pair: restitution is averaged,
    /// friction uses the geometric mean so one slick surface dominates.
    pub fn combine(a: &Material, b: &Material) -> MaterialPair {
        MaterialPair {
            restitution: 0.5 * (a.restitution + b.restitution),
            friction: (a.friction * b.friction).max(0.0).sqrt(),
        }
    }
}

/// Pairwise material coefficients attached to a contact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaterialPair {
    pub restitution: f32,
    pub friction: f32,
}

impl Default for MaterialPair {
    fn default() -> Self {
        Material::combine(&Material::default(), &Material::default())
    }
}
