//! # Core Value Types
//!
//! Plain data shared by the simulator boundary and the task layer: the
//! double-precision [`Vec3`], the [`Axis`] selector, validated model handles
//! and the generalized [`KinematicState`].

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub, SubAssign};

/// A point or displacement in world coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).norm()
    }

    /// Distance between the projections of two points onto the x-y plane.
    #[must_use]
    pub fn planar_distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns the vector scaled to unit length, or `None` for a zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let n = self.norm();
        if n > 0.0 && n.is_finite() {
            Some(self / n)
        } else {
            None
        }
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        (self + other) / 2.0
    }

    /// Component-wise clamp into `[low, high]`.
    #[must_use]
    pub fn clamp(self, low: Self, high: Self) -> Self {
        Self::new(
            self.x.clamp(low.x, high.x),
            self.y.clamp(low.y, high.y),
            self.z.clamp(low.z, high.z),
        )
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Index<Axis> for Vec3 {
    type Output = f64;

    fn index(&self, axis: Axis) -> &f64 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, s: f64) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// World coordinate axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Handle to a body in a loaded model.
///
/// Handles are only produced by name lookups against the model that owns
/// them, so holding one means the body exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub(crate) usize);

/// Handle to a site (a named, body-attached reference point).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SiteId(pub(crate) usize);

/// Handle to a one-degree-of-freedom slide joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct JointId(pub(crate) usize);

impl BodyId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl SiteId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl JointId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Generalized joint positions and velocities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KinematicState {
    pub qpos: Vec<f64>,
    pub qvel: Vec<f64>,
}
