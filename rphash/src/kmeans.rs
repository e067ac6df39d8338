// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Refinement of raw centroids into the final `k` cluster centers.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Error;

const DEFAULT_MAX_ITERATIONS: usize = 100;
const DEFAULT_SEED: u64 = 9001;

/// Reduces a set of raw centroids to at most `k` refined centroids.
pub trait Refiner {
    /// Returns the refined centroids.
    fn refine(&self, k: usize, centroids: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, Error>;
}

/// Lloyd's k-means over the raw centroids with k-means++ seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansRefiner {
    max_iterations: usize,
    seed: u64,
}

impl Default for KMeansRefiner {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl KMeansRefiner {
    /// Set the maximum number of Lloyd iterations.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the seed used to pick the initial centers.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Refiner for KMeansRefiner {
    fn refine(&self, k: usize, centroids: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, Error> {
        if k == 0 {
            return Err(Error::invalid_argument("k must be at least 1"));
        }
        if centroids.len() <= k {
            return Ok(centroids.to_vec());
        }
        let dimensions = centroids[0].len();
        if let Some((index, bad)) = centroids
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != dimensions)
        {
            let err = Error::dimension_mismatch(dimensions, bad.len());
            return Err(err.with_context("index", index));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centers = init_plus_plus(centroids, k, &mut rng);
        let mut labels = vec![usize::MAX; centroids.len()];
        for _ in 0..self.max_iterations {
            let mut changed = false;
            for (label, point) in labels.iter_mut().zip(centroids) {
                let nearest = nearest(&centers, point);
                if *label != nearest {
                    *label = nearest;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            update_centers(&mut centers, centroids, &labels);
        }
        Ok(centers)
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(centers: &[Vec<f64>], point: &[f64]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let distance = squared_distance(center, point);
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

fn init_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut chosen = vec![false; points.len()];
    let first = rng.random_range(0..points.len());
    chosen[first] = true;
    let mut centers = vec![points[first].clone()];
    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &points[first]))
        .collect();

    while centers.len() < k {
        let total: f64 = distances.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut pick = None;
            for (i, d) in distances.iter().enumerate() {
                if *d > 0.0 && target < *d {
                    pick = Some(i);
                    break;
                }
                target -= d;
            }
            // Rounding can walk past the last positive weight.
            pick.or_else(|| distances.iter().rposition(|d| *d > 0.0))
        } else {
            None
        };
        // All remaining points coincide with a center.
        let next = next
            .or_else(|| chosen.iter().position(|c| !c))
            .unwrap_or(0);
        chosen[next] = true;
        for (d, p) in distances.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &points[next]));
        }
        centers.push(points[next].clone());
    }
    centers
}

fn update_centers(centers: &mut [Vec<f64>], points: &[Vec<f64>], labels: &[usize]) {
    let dimensions = centers[0].len();
    let mut sums = vec![vec![0.0; dimensions]; centers.len()];
    let mut counts = vec![0usize; centers.len()];
    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (s, x) in sums[label].iter_mut().zip(point) {
            *s += x;
        }
    }
    for ((center, sum), count) in centers.iter_mut().zip(sums).zip(counts) {
        // Empty clusters keep their previous center.
        if count > 0 {
            *center = sum.into_iter().map(|s| s / count as f64).collect();
        }
    }
}
