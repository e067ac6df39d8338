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

//! Locality-sensitive hashing of vectors into 64-bit keys.
//!
//! [`ProjectionHasher`] projects a vector onto a small number of sparse random directions
//! and keeps the sign of every projected coordinate. Nearby vectors tend to share signs,
//! and therefore keys.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::ClusterConfig;
use crate::error::Error;

/// Maximum number of projected coordinates; one key bit per coordinate.
pub const MAX_PROJECTED_DIMENSIONS: usize = 64;

/// Maps a vector to a scalar key, deterministically for a fixed configuration.
pub trait KeyHasher {
    /// Returns the key of `vector`.
    fn hash_vector(&self, vector: &[f64]) -> Result<i64, Error>;
}

/// Sign-of-random-projection hasher.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionHasher {
    dimensions: usize,
    projected_dimensions: usize,
    hash_modulus: u64,
    // row-major, projected_dimensions x dimensions
    matrix: Vec<f64>,
}

impl ProjectionHasher {
    /// Creates a hasher from `dimensions` down to `projected_dimensions` coordinates.
    pub fn new(
        dimensions: usize,
        projected_dimensions: usize,
        hash_modulus: u64,
        seed: u64,
    ) -> Result<Self, Error> {
        if dimensions == 0 {
            return Err(Error::invalid_argument("dimensions must be at least 1"));
        }
        if !(1..=MAX_PROJECTED_DIMENSIONS).contains(&projected_dimensions) {
            return Err(Error::invalid_argument(format!(
                "projected_dimensions must be in [1, {MAX_PROJECTED_DIMENSIONS}], got {projected_dimensions}"
            )));
        }
        if hash_modulus == 0 {
            return Err(Error::invalid_argument("hash_modulus must be positive"));
        }

        let scale = (3.0 / projected_dimensions as f64).sqrt();
        let mut rng = StdRng::seed_from_u64(seed);
        let matrix = (0..projected_dimensions * dimensions)
            .map(|_| match rng.random_range(0..6u8) {
                0 => scale,
                1 => -scale,
                _ => 0.0,
            })
            .collect();
        Ok(Self {
            dimensions,
            projected_dimensions,
            hash_modulus,
            matrix,
        })
    }

    /// Creates the hasher described by a validated configuration.
    pub fn from_config(config: &ClusterConfig) -> Result<Self, Error> {
        Self::new(
            config.dimensions(),
            config.projected_dimensions(),
            config.hash_modulus(),
            config.random_seed(),
        )
    }

    /// Returns the input dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns the number of projected coordinates.
    pub fn projected_dimensions(&self) -> usize {
        self.projected_dimensions
    }

    /// Projects `vector` onto the random directions.
    pub fn project(&self, vector: &[f64]) -> Result<Vec<f64>, Error> {
        if vector.len() != self.dimensions {
            return Err(Error::dimension_mismatch(self.dimensions, vector.len()));
        }
        Ok(self
            .matrix
            .chunks_exact(self.dimensions)
            .map(|row| row.iter().zip(vector).map(|(a, b)| a * b).sum::<f64>())
            .collect())
    }
}

impl KeyHasher for ProjectionHasher {
    fn hash_vector(&self, vector: &[f64]) -> Result<i64, Error> {
        let projected = self.project(vector)?;
        let bits = decode_signs(&projected);
        Ok((bits % self.hash_modulus) as i64)
    }
}

fn decode_signs(projected: &[f64]) -> u64 {
    projected
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0.0)
        .fold(0u64, |acc, (i, _)| acc | (1 << i))
}
