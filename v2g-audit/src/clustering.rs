//! Endpoint Clusterer
//!
//! Merges raw wire endpoints that lie within a snap tolerance of each other
//! into canonical junction points.
//!
//! The merge is an incremental greedy single-link pass: endpoints are taken
//! in input order and each one either joins the first existing cluster whose
//! representative lies within the tolerance (the representative moves to the
//! midpoint of itself and the new point) or opens a new cluster.
//!
//! The outcome depends on input order. Representatives drift as they absorb
//! points, so a chain of near-tolerance points can pull one cluster across
//! several tolerance widths, and two drifting representatives can end up
//! closer than the tolerance without ever being merged. Clustering the
//! representatives a second time is only guaranteed to be a no-op when the
//! junctions of the drawing are well separated relative to the tolerance.

use crate::geometry::{distance, Point};

/// Cluster representatives produced by [`cluster_endpoints`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointClusters {
    representatives: Vec<Point>,
}

impl EndpointClusters {
    /// Representative point of each cluster, indexed by cluster number.
    pub fn representatives(&self) -> &[Point] {
        &self.representatives
    }

    pub fn len(&self) -> usize {
        self.representatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }

    /// Index of the cluster whose representative is closest to `p`.
    ///
    /// Ties go to the lowest index. `None` only when there are no clusters.
    pub fn nearest(&self, p: &Point) -> Option<usize> {
        self.nearest_with_distance(p).map(|(idx, _)| idx)
    }

    /// Like [`nearest`](Self::nearest), also returning the distance.
    pub fn nearest_with_distance(&self, p: &Point) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, rep) in self.representatives.iter().enumerate() {
            let d = distance(p, rep);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((idx, d)),
            }
        }
        best
    }
}

/// Cluster `points` with snap tolerance `tau`.
pub fn cluster_endpoints(points: &[Point], tau: f64) -> EndpointClusters {
    let mut representatives: Vec<Point> = Vec::new();

    for p in points {
        match representatives
            .iter_mut()
            .find(|rep| distance(p, rep) <= tau)
        {
            Some(rep) => *rep = rep.midpoint(p),
            None => representatives.push(*p),
        }
    }

    tracing::debug!(
        "Clustered {} endpoints into {} junctions (tau = {})",
        points.len(),
        representatives.len(),
        tau
    );

    EndpointClusters { representatives }
}
