//! Bowed arc polylines between sphere points, binned by vote weight.
//!
//! An arc from `P1` to `P2` is sampled at `t = i / segments`:
//!
//! ```text
//! dir(t)   = normalize(P1 (1 - t) + P2 t)
//! point(t) = dir(t) * (1 + h sin(pi t))
//! h        = min_bow + (max_bow - min_bow) * theta / pi,  theta = acos(P1 . P2)
//! ```
//!
//! so the arc leaves and lands on the surface and lifts furthest at its
//! midpoint, longer arcs lifting higher.

use std::f64::consts::PI;

use serde::Serialize;

use crate::config::{PipelineConfig, VoteBin};
use crate::sphere::xrefs::CrossReference;
use crate::types::SpherePoint;
use crate::utils::{round_to, NORM_EPS};

const Z_AXIS: [f64; 3] = [0.0, 0.0, 1.0];
const Y_AXIS: [f64; 3] = [0.0, 1.0, 0.0];

#[inline]
fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
fn scale(a: &[f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// Angle between two unit vectors, in `[0, pi]`.
pub fn angular_distance(p1: &SpherePoint, p2: &SpherePoint) -> f64 {
    dot(p1, p2).clamp(-1.0, 1.0).acos()
}

/// A unit vector orthogonal to `p`, used when interpolation passes through the origin.
fn perpendicular(p: &SpherePoint) -> [f64; 3] {
    let mut perp = cross(p, &Z_AXIS);
    if norm(&perp) < NORM_EPS {
        perp = cross(p, &Y_AXIS);
    }
    let n = norm(&perp);
    if n < NORM_EPS {
        // p itself is ~zero; any axis will do.
        return [1.0, 0.0, 0.0];
    }
    scale(&perp, 1.0 / n)
}

/// Arc shape parameters.
#[derive(Debug, Clone, Copy)]
pub struct ArcParams {
    /// Bow height at theta = 0.
    pub min_bow: f64,
    /// Bow height at theta = pi.
    pub max_bow: f64,
    /// Segments per arc.
    pub segments: usize,
}

impl ArcParams {
    /// Take the arc settings out of a pipeline config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            min_bow: config.min_bow,
            max_bow: config.max_bow,
            segments: config.arc_segments,
        }
    }

    /// Bow height for an angular distance, linear over `[0, pi]`.
    pub fn bow_height(&self, theta: f64) -> f64 {
        self.min_bow + (self.max_bow - self.min_bow) * (theta / PI)
    }
}

/// Sample `segments + 1` points along the bowed arc from `p1` to `p2`.
pub fn arc_curve(p1: &SpherePoint, p2: &SpherePoint, height: f64, segments: usize) -> Vec<[f64; 3]> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let interp = [
                p1[0] * (1.0 - t) + p2[0] * t,
                p1[1] * (1.0 - t) + p2[1] * t,
                p1[2] * (1.0 - t) + p2[2] * t,
            ];
            let n = norm(&interp);
            let dir = if n < NORM_EPS {
                perpendicular(p1)
            } else {
                scale(&interp, 1.0 / n)
            };
            let bow = height * (PI * t).sin();
            scale(&dir, 1.0 + bow)
        })
        .collect()
}

/// Full arc for a pair: bow height from the angle, collapsed when the
/// endpoints coincide.
pub fn build_arc(p1: &SpherePoint, p2: &SpherePoint, params: &ArcParams) -> Vec<[f64; 3]> {
    let gap = [p1[0] - p2[0], p1[1] - p2[1], p1[2] - p2[2]];
    if norm(&gap) < NORM_EPS {
        return vec![*p1; params.segments.max(1) + 1];
    }
    let theta = angular_distance(p1, p2);
    arc_curve(p1, p2, params.bow_height(theta), params.segments)
}

/// Parallel coordinate lists with `None` separating polylines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Polylines {
    /// X coordinates.
    pub x: Vec<Option<f64>>,
    /// Y coordinates.
    pub y: Vec<Option<f64>>,
    /// Z coordinates.
    pub z: Vec<Option<f64>>,
}

impl Polylines {
    /// Append one polyline followed by a pen-up marker.
    pub fn push_polyline(&mut self, points: &[[f64; 3]], decimals: u32) {
        for p in points {
            self.x.push(Some(round_to(p[0], decimals)));
            self.y.push(Some(round_to(p[1], decimals)));
            self.z.push(Some(round_to(p[2], decimals)));
        }
        self.x.push(None);
        self.y.push(None);
        self.z.push(None);
    }

    /// Number of polylines (pen-up markers).
    pub fn polyline_count(&self) -> usize {
        self.x.iter().filter(|v| v.is_none()).count()
    }
}

/// One vote bin's renderable traces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteBinTrace {
    /// Inclusive lower vote bound.
    pub vote_min: i64,
    /// Exclusive upper vote bound.
    pub vote_max: i64,
    /// Display label.
    pub label: String,
    /// Arcs within one testament.
    pub count_intra: usize,
    /// Arcs across testaments.
    pub count_inter: usize,
    /// Same-testament polylines.
    pub intra: Polylines,
    /// Cross-testament polylines.
    pub inter: Polylines,
}

impl VoteBinTrace {
    fn empty(bin: &VoteBin) -> Self {
        Self {
            vote_min: bin.min,
            vote_max: bin.max,
            label: bin.label.clone(),
            count_intra: 0,
            count_inter: 0,
            intra: Polylines::default(),
            inter: Polylines::default(),
        }
    }
}

/// Index of the first bin containing `votes`.
pub fn assign_bin(bins: &[VoteBin], votes: i64) -> Option<usize> {
    bins.iter().position(|b| b.contains(votes))
}

/// Builds per-bin arc traces from resolved cross-references.
#[derive(Debug, Clone)]
pub struct ArcGeometryBuilder {
    params: ArcParams,
    bins: Vec<VoteBin>,
    decimals: u32,
}

impl ArcGeometryBuilder {
    /// Builder using the config's bins, bow range, segments and rounding.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            params: ArcParams::from_config(config),
            bins: config.vote_bins.clone(),
            decimals: config.arc_decimals,
        }
    }

    /// Bin and draw every arc whose endpoints have a sphere point.
    ///
    /// Arcs whose votes fall outside every bin are not drawn.
    pub fn build(&self, arcs: &[CrossReference], points: &[SpherePoint]) -> Vec<VoteBinTrace> {
        let mut traces: Vec<VoteBinTrace> = self.bins.iter().map(VoteBinTrace::empty).collect();

        for arc in arcs {
            let (Some(p1), Some(p2)) = (points.get(arc.a), points.get(arc.b)) else {
                continue;
            };
            let Some(bin_idx) = assign_bin(&self.bins, arc.votes) else {
                continue;
            };

            let curve = build_arc(p1, p2, &self.params);
            let trace = &mut traces[bin_idx];
            if arc.cross_testament {
                trace.inter.push_polyline(&curve, self.decimals);
                trace.count_inter += 1;
            } else {
                trace.intra.push_polyline(&curve, self.decimals);
                trace.count_intra += 1;
            }
        }

        traces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params() -> ArcParams {
        ArcParams {
            min_bow: 0.003,
            max_bow: 0.02,
            segments: 30,
        }
    }

    #[test]
    fn test_endpoints_on_surface_midpoint_lifted() {
        let p1 = [1.0, 0.0, 0.0];
        let p2 = [0.0, 1.0, 0.0];
        let curve = build_arc(&p1, &p2, &params());
        assert_eq!(curve.len(), 31);
        assert_abs_diff_eq!(norm(&curve[0]), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(norm(&curve[30]), 1.0, epsilon = 1e-12);

        let h = params().bow_height(PI / 2.0);
        assert_abs_diff_eq!(h, 0.0115, epsilon = 1e-12);
        assert_abs_diff_eq!(norm(&curve[15]), 1.0 + h, epsilon = 1e-12);
        for p in &curve {
            assert!(norm(p) <= 1.0 + h + 1e-12);
        }
    }

    #[test]
    fn test_bow_grows_with_angle() {
        let p = params();
        assert_abs_diff_eq!(p.bow_height(0.0), 0.003, epsilon = 1e-15);
        assert_abs_diff_eq!(p.bow_height(PI), 0.02, epsilon = 1e-15);
        assert!(p.bow_height(1.0) < p.bow_height(2.0));
    }

    #[test]
    fn test_identical_points_collapse() {
        let p = [0.0, 0.6, 0.8];
        let curve = build_arc(&p, &p, &params());
        assert_eq!(curve.len(), 31);
        assert!(curve.iter().all(|q| *q == p));
    }

    #[test]
    fn test_antipodal_uses_fallback_axis() {
        // Along z: the +Z cross product vanishes and +Y is used.
        let p1 = [0.0, 0.0, 1.0];
        let p2 = [0.0, 0.0, -1.0];
        let curve = arc_curve(&p1, &p2, params().bow_height(PI), 2);
        assert!(curve.iter().flatten().all(|c| c.is_finite()));
        assert_abs_diff_eq!(curve[1][0], -1.02, epsilon = 1e-12);
        assert_abs_diff_eq!(curve[1][1], 0.0, epsilon = 1e-12);

        // Off-axis antipodes take the +Z branch.
        let q1 = [1.0, 0.0, 0.0];
        let q2 = [-1.0, 0.0, 0.0];
        let mid = build_arc(&q1, &q2, &params())[15];
        assert!(mid.iter().all(|c| c.is_finite()));
        assert_abs_diff_eq!(dot(&mid, &q1), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(norm(&mid), 1.02, epsilon = 1e-12);
    }

    #[test]
    fn test_bin_boundary_goes_up() {
        let config = PipelineConfig::default();
        let bins = &config.vote_bins;
        assert_eq!(assign_bin(bins, 29), Some(0));
        assert_eq!(assign_bin(bins, 30), Some(1));
        assert_eq!(assign_bin(bins, 50), Some(2));
        assert_eq!(assign_bin(bins, 100), Some(3));
        assert_eq!(assign_bin(bins, 19), None);
        assert_eq!(assign_bin(bins, 9999), None);
    }

    #[test]
    fn test_builder_buckets_and_pen_up() {
        let config = PipelineConfig::default();
        let builder = ArcGeometryBuilder::new(&config);
        let points = vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let arcs = vec![
            CrossReference::new(0, 1, 30, false).unwrap(),
            CrossReference::new(1, 2, 30, true).unwrap(),
            CrossReference::new(0, 2, 35, false).unwrap(),
            CrossReference::new(0, 2, 10, false).unwrap(),
        ];
        let traces = builder.build(&arcs, &points);

        assert_eq!(traces.len(), 4);
        assert_eq!((traces[0].count_intra, traces[0].count_inter), (0, 0));
        assert_eq!((traces[1].count_intra, traces[1].count_inter), (2, 1));
        assert_eq!(traces[1].intra.polyline_count(), 2);
        assert_eq!(traces[1].intra.x.len(), 2 * 32);
        assert_eq!(traces[1].inter.x[31], None);
        assert_eq!(traces[1].inter.x[0], Some(0.0));
        assert_eq!(traces[1].inter.y[0], Some(1.0));
    }

    #[test]
    fn test_shape_independent_of_order() {
        let config = PipelineConfig::default();
        let builder = ArcGeometryBuilder::new(&config);
        let points = vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let a = CrossReference::new(0, 1, 40, false).unwrap();
        let one = builder.build(&[a], &points);
        let two = builder.build(&[a, a], &points);
        let n = one[1].intra.x.len();
        assert_eq!(one[1].intra.x[..], two[1].intra.x[..n]);
        assert_eq!(one[1].intra.x[..], two[1].intra.x[n..]);
    }
}
