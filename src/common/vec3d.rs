use num::{Float, Num};
use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Sub};

/// A 3D vector generic over any numeric type.
///
/// Used for every per-axis quantity the flight computer handles: linear acceleration,
/// angular velocity, gravity bias and velocity estimates. Axis `y` is the rocket's
/// longitudinal (vertical on the pad) axis.
///
/// # Type Parameters
/// * `T` - The functionality for the vector depends on traits implemented by `T`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct Vec3D<T> {
    /// The x-component of the vector.
    x: T,
    /// The y-component of the vector.
    y: T,
    /// The z-component of the vector.
    z: T,
}

impl<T: Copy> Vec3D<T> {
    /// Creates a new vector with the given x, y and z components.
    pub const fn new(x: T, y: T, z: T) -> Self { Self { x, y, z } }

    pub const fn x(&self) -> T { self.x }

    pub const fn y(&self) -> T { self.y }

    pub const fn z(&self) -> T { self.z }

    /// Applies `f` to every component independently.
    ///
    /// # Arguments
    /// * `f` - The per-axis mapping.
    ///
    /// # Returns
    /// A new `Vec3D` holding the mapped components.
    pub fn map<U: Copy>(self, mut f: impl FnMut(T) -> U) -> Vec3D<U> {
        Vec3D::new(f(self.x), f(self.y), f(self.z))
    }

    /// Combines two vectors axis by axis.
    ///
    /// # Arguments
    /// * `other` - The right hand side vector.
    /// * `f` - Called once per axis with `(self_axis, other_axis)`.
    pub fn zip_with<U: Copy, R: Copy>(
        self,
        other: Vec3D<U>,
        mut f: impl FnMut(T, U) -> R,
    ) -> Vec3D<R> {
        Vec3D::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }

    /// Returns `true` if `pred` holds on all three axes.
    pub fn all(&self, mut pred: impl FnMut(T) -> bool) -> bool {
        pred(self.x) && pred(self.y) && pred(self.z)
    }
}

impl<T: Num + Copy> Vec3D<T> {
    /// Creates a zero vector (x = 0, y = 0, z = 0).
    pub fn zero() -> Self { Self::new(T::zero(), T::zero(), T::zero()) }
}

impl<T: Float> Vec3D<T> {
    /// Returns `true` if every component lies in the closed interval `[lo, hi]`.
    pub fn within(&self, lo: T, hi: T) -> bool { self.all(|v| v >= lo && v <= hi) }
}

impl<T: Num + Copy> Add for Vec3D<T> {
    type Output = Vec3D<T>;

    fn add(self, rhs: Self) -> Self::Output { self.zip_with(rhs, |a, b| a + b) }
}

impl<T: Num + Copy> Sub for Vec3D<T> {
    type Output = Vec3D<T>;

    fn sub(self, rhs: Self) -> Self::Output { self.zip_with(rhs, |a, b| a - b) }
}

impl<T: Num + Copy> Mul<T> for Vec3D<T> {
    type Output = Vec3D<T>;

    /// Scales every component by `rhs`.
    fn mul(self, rhs: T) -> Self::Output { self.map(|v| v * rhs) }
}

impl<T: Display> Display for Vec3D<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
