//! Closed Catmull-Rom spline with arc-length parameterization.

use glam::Vec3;

use crate::error::{Result, VisualizerError};
use crate::params::CurveType;

/// Cubic polynomial c0 + c1 t + c2 t^2 + c3 t^3 for one axis of one segment
#[derive(Clone, Copy, Debug)]
struct Cubic {
    c0: f32,
    c1: f32,
    c2: f32,
    c3: f32,
}

impl Cubic {
    /// Hermite form from end points and end tangents
    fn hermite(x0: f32, x1: f32, t0: f32, t1: f32) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    /// Non-uniform Catmull-Rom between x1 and x2 with knot intervals dt0..dt2
    fn nonuniform_catmull_rom(
        x0: f32,
        x1: f32,
        x2: f32,
        x3: f32,
        dt0: f32,
        dt1: f32,
        dt2: f32,
    ) -> Self {
        let t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        // Rescale tangents to the [0, 1] segment parameter
        Self::hermite(x1, x2, t1 * dt1, t2 * dt1)
    }

    fn eval(&self, t: f32) -> f32 {
        let t2 = t * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t2 * t
    }
}

/// Closed spline through a fixed set of control points
#[derive(Clone, Debug)]
pub struct CatmullRomCurve {
    points: Vec<Vec3>,
    curve_type: CurveType,
    /// Cumulative length at `i / divisions` of the raw parameter
    arc_lengths: Vec<f32>,
}

impl CatmullRomCurve {
    /// Build the curve and its arc-length table
    pub fn new(points: &[[f32; 3]], curve_type: CurveType, divisions: usize) -> Result<Self> {
        if points.len() < 2 {
            return Err(VisualizerError::InvalidConfig(format!(
                "curve needs at least 2 points, got {}",
                points.len()
            )));
        }
        if divisions == 0 {
            return Err(VisualizerError::InvalidConfig(
                "arc length divisions must be > 0".to_string(),
            ));
        }

        let mut curve = Self {
            points: points.iter().copied().map(Vec3::from_array).collect(),
            curve_type,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_arc_lengths(divisions);
        Ok(curve)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total length of the closed loop
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at raw parameter `t` in [0, 1] (not uniform in distance)
    pub fn point(&self, t: f32) -> Vec3 {
        let l = self.points.len();
        let p = l as f32 * t;
        let mut segment = p.floor() as i64;
        let weight = p - segment as f32;
        segment = segment.rem_euclid(l as i64);

        let at = |offset: i64| self.points[(segment + offset).rem_euclid(l as i64) as usize];
        let (p0, p1, p2, p3) = (at(-1), at(0), at(1), at(2));

        let (dt0, dt1, dt2) = match self.curve_type.squared_distance_exponent() {
            Some(exponent) => {
                let mut dt0 = p0.distance_squared(p1).powf(exponent);
                let mut dt1 = p1.distance_squared(p2).powf(exponent);
                let mut dt2 = p2.distance_squared(p3).powf(exponent);
                // Safety check for repeated points
                if dt1 < 1e-4 {
                    dt1 = 1.0;
                }
                if dt0 < 1e-4 {
                    dt0 = dt1;
                }
                if dt2 < 1e-4 {
                    dt2 = dt1;
                }
                (dt0, dt1, dt2)
            }
            None => (1.0, 1.0, 1.0),
        };

        let axis = |a: f32, b: f32, c: f32, d: f32| {
            Cubic::nonuniform_catmull_rom(a, b, c, d, dt0, dt1, dt2).eval(weight)
        };
        Vec3::new(
            axis(p0.x, p1.x, p2.x, p3.x),
            axis(p0.y, p1.y, p2.y, p3.y),
            axis(p0.z, p1.z, p2.z, p3.z),
        )
    }

    fn compute_arc_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);
        for i in 1..=divisions {
            let current = self.point(i as f32 / divisions as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }

    /// Raw parameter at fraction `u` of the total arc length
    pub fn u_to_t(&self, u: f32) -> f32 {
        let lengths = &self.arc_lengths;
        let last = lengths.len() - 1;
        let target = u.clamp(0.0, 1.0) * lengths[last];

        // Last table entry not greater than the target
        let i = lengths.partition_point(|&len| len <= target).saturating_sub(1);
        if i >= last {
            return 1.0;
        }

        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };
        (i as f32 + fraction) / last as f32
    }

    /// Point at fraction `u` of the total arc length
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at raw parameter `t` (central difference)
    pub fn tangent(&self, t: f32) -> Vec3 {
        let delta = 0.0001;
        let t1 = (t - delta).max(0.0);
        let t2 = (t + delta).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or_zero()
    }

    /// Unit tangent at fraction `u` of the total arc length
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TUNNEL_CONTROL_POINTS;

    fn square() -> CatmullRomCurve {
        let points = [
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [-1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0],
        ];
        CatmullRomCurve::new(&points, CurveType::Chordal, 200).unwrap()
    }

    #[test]
    fn test_passes_through_control_points() {
        let curve = CatmullRomCurve::new(&TUNNEL_CONTROL_POINTS, CurveType::Chordal, 200).unwrap();
        let n = TUNNEL_CONTROL_POINTS.len();
        for (i, expected) in TUNNEL_CONTROL_POINTS.iter().enumerate() {
            let p = curve.point(i as f32 / n as f32);
            assert!(
                p.distance(Vec3::from_array(*expected)) < 1e-2,
                "point {} off: {:?}",
                i,
                p
            );
        }
    }

    #[test]
    fn test_closed_curve_periodicity() {
        let curve = CatmullRomCurve::new(&TUNNEL_CONTROL_POINTS, CurveType::Chordal, 200).unwrap();
        assert!(curve.point(0.0).distance(curve.point(1.0)) < 1e-2);
        assert!(curve.point_at(0.0).distance(curve.point_at(1.0)) < 1e-2);
    }

    #[test]
    fn test_arc_length_table() {
        let curve = square();
        assert!(curve.length() > 0.0);
        assert_eq!(curve.u_to_t(0.0), 0.0);
        assert_eq!(curve.u_to_t(1.0), 1.0);

        // Monotonic mapping
        let mut last = 0.0;
        for i in 1..=100 {
            let t = curve.u_to_t(i as f32 / 100.0);
            assert!(t >= last);
            last = t;
        }
    }

    #[test]
    fn test_symmetric_curve_halfway() {
        // Symmetric loop: half the arc length lands on the opposite control point
        let curve = square();
        let p = curve.point_at(0.5);
        assert!(p.distance(Vec3::new(-1.0, 0.0, 0.0)) < 1e-2, "{:?}", p);
    }

    #[test]
    fn test_tangent_is_unit() {
        let curve = square();
        for i in 0..10 {
            let tangent = curve.tangent_at(i as f32 / 10.0);
            assert!((tangent.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_uniform_and_centripetal_build() {
        for curve_type in [CurveType::Uniform, CurveType::Centripetal] {
            let curve = CatmullRomCurve::new(&TUNNEL_CONTROL_POINTS, curve_type, 50).unwrap();
            assert!(curve.length().is_finite());
        }
    }

    #[test]
    fn test_rejects_too_few_points() {
        assert!(CatmullRomCurve::new(&[[0.0; 3]], CurveType::Chordal, 10).is_err());
    }
}
