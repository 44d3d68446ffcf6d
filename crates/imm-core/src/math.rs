use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 3-D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn min(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Linear interpolation between two vectors.
    pub fn lerp(&self, other: &Vec3, t: f32) -> Vec3 {
        *self + (*other - *self) * t
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// A rotation quaternion (x, y, z, w).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis` (need not be normalized).
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len = (axis.x * axis.x + axis.y * axis.y + axis.z * axis.z).sqrt();
        if len == 0.0 {
            return Quat::IDENTITY;
        }
        let (s, c) = (angle * 0.5).sin_cos();
        let k = s / len;
        Quat::new(axis.x * k, axis.y * k, axis.z * k, c)
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Whether this is a unit quaternion within a small tolerance.
    pub fn is_unit(&self) -> bool {
        (self.length() - 1.0).abs() < 1e-3
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

/// A layer transform: translation, unit-quaternion rotation, uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Transform3D {
    /// Identity transform: no translation, no rotation, scale 1.
    pub const IDENTITY: Transform3D = Transform3D {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    pub fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// A transform is usable when all components are finite and the rotation
    /// is a unit quaternion.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.rotation.is_unit()
            && self.scale.is_finite()
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// A box around `center` extending `radius` along every axis.
    pub fn around(center: Vec3, radius: f32) -> Self {
        let r = Vec3::splat(radius.abs());
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        Bounds3 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= self.max.x
            && p.y <= self.max.y
            && p.z <= self.max.z
    }

    /// Union of an iterator of boxes; `None` when empty.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Bounds3>) -> Option<Bounds3> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<Bounds3>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_lerp() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 20.0, -4.0);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-6);
        assert!((mid.y - 10.0).abs() < 1e-6);
        assert!((mid.z + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_quat_axis_angle_is_unit() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 3.0, 0.0), std::f32::consts::FRAC_PI_2);
        assert!(q.is_unit());
        assert!((q.y - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        assert_eq!(Quat::from_axis_angle(Vec3::ZERO, 1.0), Quat::IDENTITY);
    }

    #[test]
    fn test_transform_validity() {
        assert!(Transform3D::IDENTITY.is_valid());
        let mut t = Transform3D::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(t.is_valid());
        t.rotation = Quat::new(0.0, 0.0, 0.0, 2.0);
        assert!(!t.is_valid());
        t.rotation = Quat::IDENTITY;
        t.scale = f32::INFINITY;
        assert!(!t.is_valid());
    }

    #[test]
    fn test_bounds_union_and_contains() {
        let a = Bounds3::around(Vec3::ZERO, 1.0);
        let b = Bounds3::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 0.5, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(u.max, Vec3::new(3.0, 1.0, 1.0));
        assert!(u.contains(Vec3::new(2.5, 0.0, 0.0)));
        assert!(!a.contains(Vec3::new(2.5, 0.0, 0.0)));
    }

    #[test]
    fn test_bounds_new_orders_corners() {
        let b = Bounds3::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ONE);
        assert_eq!(b.center(), Vec3::splat(0.5));
    }

    #[test]
    fn test_bounds_around_overflow_not_finite() {
        assert!(Bounds3::around(Vec3::new(1.0e38, 0.0, 0.0), 1.0e30).is_finite());
        let far = Bounds3::around(Vec3::new(3.0e38, 0.0, 0.0), 1.0e38);
        assert!(!far.is_finite());
        assert_eq!(far.max.x, f32::INFINITY);
    }

    #[test]
    fn test_union_all_empty() {
        let none: [Bounds3; 0] = [];
        assert!(Bounds3::union_all(&none).is_none());
    }
}
