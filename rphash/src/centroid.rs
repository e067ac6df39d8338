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

//! Centroid accumulators seeded from heavy-hitter keys.

use std::collections::HashSet;

/// Running centroid that accepts vectors whose key belongs to its acceptance set.
pub trait CentroidAccumulator {
    /// Returns true if a vector hashed to `key` belongs to this centroid.
    fn accepts(&self, key: i64) -> bool;

    /// Folds `vector` into the centroid.
    fn fold(&mut self, vector: &[f64]);

    /// Returns the centroid vector.
    fn finalize(&self) -> Vec<f64>;
}

/// Creates one accumulator per seeding key.
pub trait CentroidFactory {
    /// Accumulator type produced by this factory.
    type Accumulator: CentroidAccumulator;

    /// Creates an accumulator seeded from `key`.
    fn seed(&self, key: i64) -> Self::Accumulator;
}

/// Arithmetic mean of the vectors folded so far.
///
/// An accumulator that never received a vector finalizes to the zero vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningMean {
    ids: HashSet<i64>,
    mean: Vec<f64>,
    count: u64,
}

impl RunningMean {
    /// Creates an empty mean over `dimensions` coordinates accepting `key`.
    pub fn new(dimensions: usize, key: i64) -> Self {
        Self {
            ids: HashSet::from([key]),
            mean: vec![0.0; dimensions],
            count: 0,
        }
    }

    /// Adds `key` to the acceptance set.
    pub fn add_id(&mut self, key: i64) {
        self.ids.insert(key);
    }

    /// Returns the acceptance set.
    pub fn ids(&self) -> &HashSet<i64> {
        &self.ids
    }

    /// Returns the number of vectors folded in.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl CentroidAccumulator for RunningMean {
    fn accepts(&self, key: i64) -> bool {
        self.ids.contains(&key)
    }

    fn fold(&mut self, vector: &[f64]) {
        debug_assert_eq!(vector.len(), self.mean.len(), "dimension mismatch");
        self.count += 1;
        let n = self.count as f64;
        for (c, x) in self.mean.iter_mut().zip(vector) {
            *c += (x - *c) / n;
        }
    }

    fn finalize(&self) -> Vec<f64> {
        self.mean.clone()
    }
}

/// Factory of [`RunningMean`] accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningMeanFactory {
    dimensions: usize,
}

impl RunningMeanFactory {
    /// Creates a factory of means over `dimensions` coordinates.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl CentroidFactory for RunningMeanFactory {
    type Accumulator = RunningMean;

    fn seed(&self, key: i64) -> RunningMean {
        RunningMean::new(self.dimensions, key)
    }
}
