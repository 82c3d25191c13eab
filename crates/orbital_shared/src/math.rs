//! Mathematical types shared between the core and its collaborators.
//!
//! Orientation is a row-major 3x3 matrix whose rows are the object's right,
//! up and forward axes expressed in world space. `rotate` takes a world
//! vector into the object's local frame; `unrotate` goes the other way.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - position, velocity, direction
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit X vector
    pub const X: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit Z vector
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Orientation matrix. Rows are the local right, up and forward axes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Matrix3 {
    /// Right axis
    pub rvec: Vec3,
    /// Up axis
    pub uvec: Vec3,
    /// Forward axis
    pub fvec: Vec3,
}

impl Matrix3 {
    /// Creates a matrix from its three row axes.
    #[must_use]
    pub const fn new(rvec: Vec3, uvec: Vec3, fvec: Vec3) -> Self {
        Self { rvec, uvec, fvec }
    }

    /// Identity orientation
    pub const IDENTITY: Self = Self::new(Vec3::X, Vec3::Y, Vec3::Z);

    /// Rotation of `angle` radians about the world up axis.
    #[must_use]
    pub fn from_yaw(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            Vec3::new(cos, 0.0, -sin),
            Vec3::Y,
            Vec3::new(sin, 0.0, cos),
        )
    }

    /// Transpose. For an orthonormal orientation this is the inverse.
    #[must_use]
    pub fn transpose(self) -> Self {
        Self::new(
            Vec3::new(self.rvec.x, self.uvec.x, self.fvec.x),
            Vec3::new(self.rvec.y, self.uvec.y, self.fvec.y),
            Vec3::new(self.rvec.z, self.uvec.z, self.fvec.z),
        )
    }

    /// World -> local: dots `v` against each row.
    #[must_use]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        Vec3::new(self.rvec.dot(v), self.uvec.dot(v), self.fvec.dot(v))
    }

    /// Local -> world: weighted sum of the rows.
    #[must_use]
    pub fn unrotate(self, v: Vec3) -> Vec3 {
        self.rvec * v.x + self.uvec * v.y + self.fvec * v.z
    }

    /// Largest absolute element-wise difference, for tolerance checks.
    #[must_use]
    pub fn max_abs_diff(self, other: Self) -> f32 {
        let a: &[f32; 9] = bytemuck::cast_ref(&self);
        let b: &[f32; 9] = bytemuck::cast_ref(&other);
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f32::max)
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Matrix3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            rhs.unrotate(self.rvec),
            rhs.unrotate(self.uvec),
            rhs.unrotate(self.fvec),
        )
    }
}
