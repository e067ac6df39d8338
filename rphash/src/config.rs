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

//! Run configuration and results shared between the passes of a clustering run.

use crate::countmin::DEFAULT_DEPTH;
use crate::countmin::DEFAULT_WIDTH;
use crate::countmin::MAX_TABLE_ENTRIES;
use crate::error::Error;
use crate::frequencies::HeavyHitterSketch;
use crate::frequencies::MAX_CAPACITY;
use crate::lsh::MAX_PROJECTED_DIMENSIONS;

/// Default modulus applied to projected keys.
pub const DEFAULT_HASH_MODULUS: u64 = (1 << 31) - 1;
/// Default seed of the random projection.
pub const DEFAULT_RANDOM_SEED: u64 = 9001;
/// Default number of projected coordinates.
pub const DEFAULT_PROJECTED_DIMENSIONS: usize = 24;

/// Parameters of a clustering run together with the results it publishes.
///
/// Use [`ClusterConfig::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    k: usize,
    dimensions: usize,
    hash_modulus: u64,
    random_seed: u64,
    projected_dimensions: usize,
    sketch_depth: usize,
    sketch_width: usize,
    sketch_seed: Option<u64>,
    previous_top_ids: Vec<i64>,
    centroids: Vec<Vec<f64>>,
}

impl ClusterConfig {
    /// Creates a builder for `k` clusters of `dimensions`-dimensional vectors.
    pub fn builder(k: usize, dimensions: usize) -> ClusterConfigBuilder {
        ClusterConfigBuilder {
            k,
            dimensions,
            hash_modulus: DEFAULT_HASH_MODULUS,
            random_seed: DEFAULT_RANDOM_SEED,
            projected_dimensions: DEFAULT_PROJECTED_DIMENSIONS,
            sketch_depth: DEFAULT_DEPTH,
            sketch_width: DEFAULT_WIDTH,
            sketch_seed: None,
        }
    }

    /// Returns the number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the vector dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns the modulus applied to projected keys.
    pub fn hash_modulus(&self) -> u64 {
        self.hash_modulus
    }

    /// Returns the seed of the random projection.
    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    /// Returns the number of projected coordinates.
    pub fn projected_dimensions(&self) -> usize {
        self.projected_dimensions
    }

    /// Returns the number of rows of the heavy-hitter sketch table.
    pub fn sketch_depth(&self) -> usize {
        self.sketch_depth
    }

    /// Returns the number of columns of the heavy-hitter sketch table.
    pub fn sketch_width(&self) -> usize {
        self.sketch_width
    }

    /// Returns the seed of the heavy-hitter sketch, `None` for process randomness.
    pub fn sketch_seed(&self) -> Option<u64> {
        self.sketch_seed
    }

    /// Returns the keys published by the last map pass.
    pub fn previous_top_ids(&self) -> &[i64] {
        &self.previous_top_ids
    }

    /// Publishes the keys found by a map pass.
    pub fn set_previous_top_ids(&mut self, ids: Vec<i64>) {
        self.previous_top_ids = ids;
    }

    /// Appends a centroid produced by a reduce pass.
    pub fn add_centroid(&mut self, centroid: Vec<f64>) {
        self.centroids.push(centroid);
    }

    /// Returns the centroids published so far.
    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Forgets published keys and centroids.
    pub fn clear_results(&mut self) {
        self.previous_top_ids.clear();
        self.centroids.clear();
    }
}

/// Builder for [`ClusterConfig`].
#[derive(Debug, Clone)]
pub struct ClusterConfigBuilder {
    k: usize,
    dimensions: usize,
    hash_modulus: u64,
    random_seed: u64,
    projected_dimensions: usize,
    sketch_depth: usize,
    sketch_width: usize,
    sketch_seed: Option<u64>,
}

impl ClusterConfigBuilder {
    /// Set the modulus applied to projected keys.
    pub fn hash_modulus(mut self, hash_modulus: u64) -> Self {
        self.hash_modulus = hash_modulus;
        self
    }

    /// Set the seed of the random projection.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the number of projected coordinates, in `[1, 64]`.
    pub fn projected_dimensions(mut self, projected_dimensions: usize) -> Self {
        self.projected_dimensions = projected_dimensions;
        self
    }

    /// Set the number of rows of the heavy-hitter sketch table.
    pub fn sketch_depth(mut self, depth: usize) -> Self {
        self.sketch_depth = depth;
        self
    }

    /// Set the number of columns of the heavy-hitter sketch table.
    pub fn sketch_width(mut self, width: usize) -> Self {
        self.sketch_width = width;
        self
    }

    /// Set the seed of the heavy-hitter sketch.
    pub fn sketch_seed(mut self, seed: u64) -> Self {
        self.sketch_seed = Some(seed);
        self
    }

    /// Validates the parameters and builds the configuration.
    pub fn build(self) -> Result<ClusterConfig, Error> {
        if self.k < 2 {
            let err = Error::invalid_argument("k must be at least 2");
            return Err(err.with_context("k", self.k));
        }
        let capacity = HeavyHitterSketch::capacity_for(self.k);
        if capacity > MAX_CAPACITY {
            let err = Error::invalid_argument(format!(
                "k * ln(k) must be at most {MAX_CAPACITY}, got {capacity}"
            ));
            return Err(err.with_context("k", self.k));
        }
        if self.dimensions == 0 {
            return Err(Error::invalid_argument("dimensions must be at least 1"));
        }
        if !(1..=MAX_PROJECTED_DIMENSIONS).contains(&self.projected_dimensions) {
            return Err(Error::invalid_argument(format!(
                "projected_dimensions must be in [1, {MAX_PROJECTED_DIMENSIONS}], got {}",
                self.projected_dimensions
            )));
        }
        if self.hash_modulus == 0 {
            return Err(Error::invalid_argument("hash_modulus must be positive"));
        }
        if self.sketch_depth == 0 || self.sketch_width == 0 {
            return Err(Error::invalid_argument(format!(
                "sketch table must be non-empty, got {}x{}",
                self.sketch_depth, self.sketch_width
            )));
        }
        match self.sketch_depth.checked_mul(self.sketch_width) {
            Some(entries) if entries < MAX_TABLE_ENTRIES => {}
            _ => {
                return Err(Error::invalid_argument(format!(
                    "sketch table must have fewer than {MAX_TABLE_ENTRIES} entries, got {}x{}",
                    self.sketch_depth, self.sketch_width
                )));
            }
        }
        Ok(ClusterConfig {
            k: self.k,
            dimensions: self.dimensions,
            hash_modulus: self.hash_modulus,
            random_seed: self.random_seed,
            projected_dimensions: self.projected_dimensions,
            sketch_depth: self.sketch_depth,
            sketch_width: self.sketch_width,
            sketch_seed: self.sketch_seed,
            previous_top_ids: vec![],
            centroids: vec![],
        })
    }
}
