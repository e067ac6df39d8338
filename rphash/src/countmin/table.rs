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

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Modulus applied to every row hash before the column reduction.
const PRIME_MODULUS: i64 = (1 << 31) - 1;

/// Exclusive upper bound on `depth * width`.
pub const MAX_TABLE_ENTRIES: usize = 1 << 30;

/// Default number of rows, `suggest_depth(0.999)`.
pub const DEFAULT_DEPTH: usize = 7;

/// Default number of columns, `suggest_width(0.01)`.
pub const DEFAULT_WIDTH: usize = 272;

/// Fixed-size Count-Min table of 64-bit counters.
///
/// Counters only ever grow; there is no removal, reset or decay.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    depth: usize,
    width: usize,
    seed: u64,
    total_weight: u64,
    counts: Vec<u64>,
    multipliers: Vec<i64>,
}

impl FrequencyTable {
    /// Creates a table whose row multipliers come from process randomness.
    ///
    /// # Panics
    ///
    /// Panics if `depth` or `width` is 0, or the table size exceeds the supported limit.
    pub fn new(depth: usize, width: usize) -> Self {
        Self::with_seed(depth, width, rand::random())
    }

    /// Creates a table whose row multipliers are derived from `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `depth` or `width` is 0, or the table size exceeds the supported limit.
    pub fn with_seed(depth: usize, width: usize, seed: u64) -> Self {
        let entries = entries_for_config(depth, width);
        Self {
            depth,
            width,
            seed,
            total_weight: 0,
            counts: vec![0; entries],
            multipliers: make_multipliers(seed, depth),
        }
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the number of columns per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the seed the row multipliers were drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the sum of all amounts added to the table.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Returns the relative error (epsilon) implied by the width.
    pub fn relative_error(&self) -> f64 {
        std::f64::consts::E / self.width as f64
    }

    /// Suggests the width needed for the given relative error.
    ///
    /// # Panics
    ///
    /// Panics if `relative_error` is not positive.
    pub fn suggest_width(relative_error: f64) -> usize {
        assert!(relative_error > 0.0, "relative_error must be positive");
        (std::f64::consts::E / relative_error).ceil() as usize
    }

    /// Suggests the depth needed for the given confidence.
    ///
    /// # Panics
    ///
    /// Panics if `confidence` is not in (0, 1).
    pub fn suggest_depth(confidence: f64) -> usize {
        assert!(
            confidence > 0.0 && confidence < 1.0,
            "confidence must be between 0 and 1 (exclusive)"
        );
        ((1.0 / (1.0 - confidence)).ln().ceil() as usize).max(1)
    }

    /// Adds `amount` to the counter of `key` in every row and returns the new estimate.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is 0.
    pub fn increment(&mut self, key: i64, amount: u64) -> u64 {
        assert!(amount > 0, "amount must be positive");
        self.total_weight = self.total_weight.saturating_add(amount);
        let mut min = u64::MAX;
        for row in 0..self.depth {
            let index = row * self.width + self.column(key, row);
            let count = self.counts[index].saturating_add(amount);
            self.counts[index] = count;
            min = min.min(count);
        }
        min
    }

    /// Returns the estimated frequency of `key` without modifying the table.
    pub fn estimate(&self, key: i64) -> u64 {
        (0..self.depth)
            .map(|row| self.counts[row * self.width + self.column(key, row)])
            .min()
            .unwrap_or(0)
    }

    fn column(&self, key: i64, row: usize) -> usize {
        let mut hash = self.multipliers[row].wrapping_mul(key);
        hash = hash.wrapping_add(hash >> 32);
        hash &= PRIME_MODULUS;
        hash as usize % self.width
    }
}

fn entries_for_config(depth: usize, width: usize) -> usize {
    assert!(depth > 0, "depth must be at least 1");
    assert!(width > 0, "width must be at least 1");
    let entries = depth
        .checked_mul(width)
        .expect("depth * width overflows usize");
    assert!(
        entries < MAX_TABLE_ENTRIES,
        "depth * width must be < {MAX_TABLE_ENTRIES}"
    );
    entries
}

fn make_multipliers(seed: u64, depth: usize) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..depth)
        .map(|_| rng.random_range(1..PRIME_MODULUS) | 1)
        .collect()
}
