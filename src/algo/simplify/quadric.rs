//! Quadric error matrices.

use std::ops::{Add, AddAssign};

use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};

/// Sum of squared distances to a set of planes, as a symmetric 4x4 matrix.
///
/// For a homogeneous point `v = [x, y, z, 1]` the error is `vᵀ Q v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric(pub Matrix4<f64>);

impl Quadric {
    /// The quadric with no planes.
    pub fn zero() -> Self {
        Self(Matrix4::zeros())
    }

    /// Quadric of the plane through `point` with unit `normal`.
    ///
    /// A zero normal (degenerate face) contributes nothing.
    pub fn from_plane(normal: &Vector3<f64>, point: &Point3<f64>) -> Self {
        let plane = Vector4::new(normal.x, normal.y, normal.z, -normal.dot(&point.coords));
        Self(plane * plane.transpose())
    }

    /// Evaluate `vᵀ Q v` at `p`.
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let v = p.to_homogeneous();
        v.dot(&(self.0 * v))
    }

    /// The point minimising this quadric for a collapse of the edge `a`-`b`.
    ///
    /// Solves the top-left 3x3 system. Falls back to the midpoint when the
    /// system is singular, the solution is not finite, or it lands more than
    /// twice the edge length away from the midpoint.
    pub fn optimal(&self, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
        let midpoint = nalgebra::center(a, b);
        let m: Matrix3<f64> = self.0.fixed_view::<3, 3>(0, 0).into_owned();
        let rhs: Vector3<f64> = -self.0.fixed_view::<3, 1>(0, 3).into_owned();

        let scale = m.norm();
        if scale == 0.0 || m.determinant().abs() <= 1e-12 * scale.powi(3) {
            return midpoint;
        }
        let Some(inverse) = m.try_inverse() else {
            return midpoint;
        };

        let solved = Point3::from(inverse * rhs);
        let reach = 2.0 * (b - a).norm();
        if solved.coords.iter().all(|c| c.is_finite()) && (solved - midpoint).norm() <= reach {
            solved
        } else {
            midpoint
        }
    }
}

impl Default for Quadric {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(self, other: Quadric) -> Quadric {
        Quadric(self.0 + other.0)
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, other: Quadric) {
        self.0 += other.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_distance() {
        let q = Quadric::from_plane(&Vector3::z(), &Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(q.evaluate(&Point3::new(3.0, -2.0, 1.0)), 0.0);
        assert_relative_eq!(q.evaluate(&Point3::new(0.0, 0.0, 3.0)), 4.0);
    }

    #[test]
    fn test_addition() {
        let x = Quadric::from_plane(&Vector3::x(), &Point3::origin());
        let y = Quadric::from_plane(&Vector3::y(), &Point3::origin());
        let mut sum = x + y;
        assert_relative_eq!(sum.evaluate(&Point3::new(1.0, 2.0, 5.0)), 5.0);
        sum += Quadric::zero();
        assert_eq!(sum, x + y);
    }

    #[test]
    fn test_optimal_at_corner() {
        // Three orthogonal planes meet at (1, 2, 3).
        let corner = Point3::new(1.0, 2.0, 3.0);
        let q = Quadric::from_plane(&Vector3::x(), &corner)
            + Quadric::from_plane(&Vector3::y(), &corner)
            + Quadric::from_plane(&Vector3::z(), &corner);
        let p = q.optimal(&Point3::new(0.5, 2.0, 3.0), &Point3::new(1.5, 2.0, 3.0));
        assert_relative_eq!(p, corner, epsilon = 1e-12);
        assert_relative_eq!(q.evaluate(&p), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_optimal_falls_back_to_midpoint() {
        // A single plane leaves the system singular.
        let q = Quadric::from_plane(&Vector3::z(), &Point3::origin());
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 0.0, 0.0);
        assert_eq!(q.optimal(&a, &b), Point3::new(1.0, 0.0, 0.0));

        // The solved corner is far away from a short edge.
        let corner = Point3::new(10.0, 10.0, 10.0);
        let q = Quadric::from_plane(&Vector3::x(), &corner)
            + Quadric::from_plane(&Vector3::y(), &corner)
            + Quadric::from_plane(&Vector3::z(), &corner);
        assert_eq!(q.optimal(&a, &b), Point3::new(1.0, 0.0, 0.0));
    }
}
