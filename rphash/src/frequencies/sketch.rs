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

//! Heavy-hitter sketch combining a frequency table with a bounded top-K tracker.

use crate::countmin::DEFAULT_DEPTH;
use crate::countmin::DEFAULT_WIDTH;
use crate::countmin::FrequencyTable;
use crate::frequencies::top_k::BoundedTopK;
use crate::frequencies::top_k::Candidate;

#[derive(Debug, Clone, Default)]
struct TopK {
    items: Vec<i64>,
    estimates: Vec<u64>,
}

/// Sketch tracking the approximately most frequent 64-bit keys of a stream.
///
/// See [`crate::frequencies`] for an overview.
#[derive(Debug, Clone)]
pub struct HeavyHitterSketch {
    table: FrequencyTable,
    tracker: BoundedTopK,
    top: Option<TopK>,
}

impl HeavyHitterSketch {
    /// Creates a sketch for `m` with default table dimensions and process randomness.
    ///
    /// # Panics
    ///
    /// Panics if [`HeavyHitterSketch::capacity_for`] yields zero, i.e. `m < 2`.
    pub fn new(m: usize) -> Self {
        Self::builder().build(m)
    }

    /// Creates a sketch for `m` with default table dimensions and the given seed.
    ///
    /// # Panics
    ///
    /// Panics if `m < 2`.
    pub fn with_seed(m: usize, seed: u64) -> Self {
        Self::builder().seed(seed).build(m)
    }

    /// Creates a builder for custom table dimensions.
    pub fn builder() -> HeavyHitterSketchBuilder {
        HeavyHitterSketchBuilder::default()
    }

    /// Returns the number of candidates tracked for `m`, `ceil(m * ln(m))`.
    ///
    /// Returns 0 for `m < 2`; saturates at `usize::MAX`.
    pub fn capacity_for(m: usize) -> usize {
        if m < 2 {
            return 0;
        }
        let m = m as f64;
        (m * m.ln()).ceil() as usize
    }

    /// Returns the maximum number of tracked candidates.
    pub fn capacity(&self) -> usize {
        self.tracker.capacity()
    }

    /// Returns the number of candidates currently tracked.
    ///
    /// This drops to zero once the top-K result has been materialized.
    pub fn num_candidates(&self) -> usize {
        self.tracker.len()
    }

    /// Returns the total number of observations.
    pub fn total_weight(&self) -> u64 {
        self.table.total_weight()
    }

    /// Returns true if nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the underlying frequency table.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// Records one occurrence of `item` and returns its updated estimate.
    ///
    /// Once the top-K result has been materialized only the table is updated.
    pub fn observe(&mut self, item: i64) -> u64 {
        let estimate = self.table.increment(item, 1);
        if self.top.is_none() {
            self.tracker.upsert(item, estimate);
        }
        estimate
    }

    /// Returns the current frequency estimate of `item`.
    pub fn estimate(&self, item: i64) -> u64 {
        self.table.estimate(item)
    }

    /// Returns the top-K items in ascending order of estimate.
    ///
    /// The first call drains the tracker; later calls return the memoized result.
    pub fn top_k(&mut self) -> &[i64] {
        &self.materialize().items
    }

    /// Returns the estimates matching [`HeavyHitterSketch::top_k`] position by position.
    pub fn top_k_estimates(&mut self) -> &[u64] {
        &self.materialize().estimates
    }

    /// Returns the memoized top-K result as candidates.
    pub fn top_candidates(&mut self) -> Vec<Candidate> {
        let top = self.materialize();
        top.items
            .iter()
            .zip(&top.estimates)
            .map(|(&item, &estimate)| Candidate::new(item, estimate))
            .collect()
    }

    fn materialize(&mut self) -> &TopK {
        let tracker = &mut self.tracker;
        self.top.get_or_insert_with(|| {
            let drained = tracker.drain_sorted();
            TopK {
                items: drained.iter().map(Candidate::item).collect(),
                estimates: drained.iter().map(Candidate::estimate).collect(),
            }
        })
    }
}

/// Builder for [`HeavyHitterSketch`].
#[derive(Debug, Clone)]
pub struct HeavyHitterSketchBuilder {
    depth: usize,
    width: usize,
    seed: Option<u64>,
}

impl Default for HeavyHitterSketchBuilder {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            width: DEFAULT_WIDTH,
            seed: None,
        }
    }
}

impl HeavyHitterSketchBuilder {
    /// Set the number of table rows.
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set the number of table columns.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set the seed for the row multipliers.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build a sketch tracking `ceil(m * ln(m))` candidates.
    ///
    /// # Panics
    ///
    /// Panics if `m < 2`, if `ceil(m * ln(m))` exceeds
    /// [`MAX_CAPACITY`](crate::frequencies::MAX_CAPACITY), or if the table dimensions are
    /// invalid.
    pub fn build(self, m: usize) -> HeavyHitterSketch {
        let capacity = HeavyHitterSketch::capacity_for(m);
        assert!(capacity > 0, "m must be at least 2, got {m}");
        let table = match self.seed {
            Some(seed) => FrequencyTable::with_seed(self.depth, self.width, seed),
            None => FrequencyTable::new(self.depth, self.width),
        };
        HeavyHitterSketch {
            table,
            tracker: BoundedTopK::new(capacity),
            top: None,
        }
    }
}
