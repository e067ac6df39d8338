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

//! Two-pass streaming clustering.
//!
//! The map pass hashes every vector to a key and feeds the key to a
//! [`HeavyHitterSketch`]; the heaviest keys are published to the [`ClusterConfig`]. The
//! reduce pass seeds one centroid accumulator per published key and folds every vector
//! into the first accumulator, in published order, that accepts its key. Vectors that no
//! accumulator accepts are dropped.
//!
//! # Examples
//!
//! ```
//! # use rphash::config::ClusterConfig;
//! # use rphash::pipeline::StreamingClusterer;
//! # use rphash::stream::InMemorySequence;
//! let vectors = vec![vec![1.0, 1.0], vec![1.1, 0.9], vec![-5.0, -5.0]];
//! let config = ClusterConfig::builder(2, 2).sketch_seed(1).build().unwrap();
//! let mut clusterer =
//!     StreamingClusterer::with_projection(config, InMemorySequence::new(vectors)).unwrap();
//! let raw = clusterer.raw_centroids().unwrap();
//! assert!(!raw.is_empty());
//! ```

use crate::centroid::CentroidAccumulator;
use crate::centroid::CentroidFactory;
use crate::centroid::RunningMeanFactory;
use crate::config::ClusterConfig;
use crate::error::Error;
use crate::frequencies::HeavyHitterSketch;
use crate::kmeans::Refiner;
use crate::lsh::KeyHasher;
use crate::lsh::ProjectionHasher;
use crate::stream::VectorSequence;

/// Streaming clusterer over a restartable vector sequence.
#[derive(Debug)]
pub struct StreamingClusterer<S, H, F> {
    config: ClusterConfig,
    sequence: S,
    hasher: H,
    factory: F,
    centroids: Option<Vec<Vec<f64>>>,
}

impl<S: VectorSequence> StreamingClusterer<S, ProjectionHasher, RunningMeanFactory> {
    /// Creates a clusterer using sign-of-projection keys and running-mean centroids.
    pub fn with_projection(config: ClusterConfig, sequence: S) -> Result<Self, Error> {
        let hasher = ProjectionHasher::from_config(&config)?;
        let factory = RunningMeanFactory::new(config.dimensions());
        Ok(Self::new(config, sequence, hasher, factory))
    }
}

impl<S, H, F> StreamingClusterer<S, H, F>
where
    S: VectorSequence,
    H: KeyHasher,
    F: CentroidFactory,
{
    /// Creates a clusterer from its collaborators.
    pub fn new(config: ClusterConfig, sequence: S, hasher: H, factory: F) -> Self {
        Self {
            config,
            sequence,
            hasher,
            factory,
            centroids: None,
        }
    }

    /// Returns the configuration and the results published so far.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Consumes the clusterer, returning its configuration.
    pub fn into_config(self) -> ClusterConfig {
        self.config
    }

    /// Runs the map pass and publishes the heaviest keys.
    ///
    /// The sequence is rewound before and after the pass.
    pub fn map(&mut self) -> Result<&mut Self, Error> {
        self.sequence.reset()?;
        let mut builder = HeavyHitterSketch::builder()
            .depth(self.config.sketch_depth())
            .width(self.config.sketch_width());
        if let Some(seed) = self.config.sketch_seed() {
            builder = builder.seed(seed);
        }
        let mut sketch = builder.build(self.config.k());

        let mut vectors = 0usize;
        while let Some(vector) = self.sequence.next_vector()? {
            let key = self.key_of(&vector, vectors)?;
            sketch.observe(key);
            vectors += 1;
        }

        let top = sketch.top_k().to_vec();
        tracing::debug!(
            vectors,
            candidates = top.len(),
            capacity = sketch.capacity(),
            "map pass complete"
        );
        self.config.set_previous_top_ids(top);
        self.sequence.reset()?;
        Ok(self)
    }

    /// Runs the reduce pass and publishes one centroid per published key.
    ///
    /// The sequence is rewound before and after the pass. Does nothing when the sequence is
    /// empty.
    pub fn reduce(&mut self) -> Result<&mut Self, Error> {
        self.sequence.reset()?;
        let Some(first) = self.sequence.next_vector()? else {
            tracing::debug!("reduce pass skipped on empty sequence");
            return Ok(self);
        };

        let mut accumulators: Vec<F::Accumulator> = self
            .config
            .previous_top_ids()
            .iter()
            .map(|&id| self.factory.seed(id))
            .collect();

        let mut vectors = 0usize;
        let mut matched = 0usize;
        let mut next = Some(first);
        while let Some(vector) = next {
            let key = self.key_of(&vector, vectors)?;
            if let Some(acc) = accumulators.iter_mut().find(|acc| acc.accepts(key)) {
                acc.fold(&vector);
                matched += 1;
            }
            vectors += 1;
            next = self.sequence.next_vector()?;
        }

        for acc in &accumulators {
            self.config.add_centroid(acc.finalize());
        }
        tracing::debug!(
            vectors,
            matched,
            dropped = vectors - matched,
            centroids = accumulators.len(),
            "reduce pass complete"
        );
        self.sequence.reset()?;
        Ok(self)
    }

    /// Runs the map pass followed by the reduce pass.
    ///
    /// Results published by earlier runs are discarded first.
    pub fn run(&mut self) -> Result<(), Error> {
        self.config.clear_results();
        self.map()?.reduce()?;
        self.centroids = Some(self.config.centroids().to_vec());
        Ok(())
    }

    /// Returns the raw centroids, running both passes on first use.
    pub fn raw_centroids(&mut self) -> Result<&[Vec<f64>], Error> {
        if self.centroids.is_none() {
            self.run()?;
        }
        Ok(self.centroids.as_deref().unwrap_or_default())
    }

    /// Returns the raw centroids refined down to `k` centroids.
    pub fn centroids<R: Refiner>(&mut self, refiner: &R) -> Result<Vec<Vec<f64>>, Error> {
        let k = self.config.k();
        let raw = self.raw_centroids()?;
        refiner.refine(k, raw)
    }

    /// Drops cached centroids and published results so the next request reruns both passes.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.centroids = None;
        self.config.clear_results();
        self.sequence.reset()
    }

    fn key_of(&self, vector: &[f64], index: usize) -> Result<i64, Error> {
        let expected = self.config.dimensions();
        if vector.len() != expected {
            let err = Error::dimension_mismatch(expected, vector.len());
            return Err(err.with_context("index", index));
        }
        self.hasher
            .hash_vector(vector)
            .map_err(|err| err.with_context("index", index))
    }
}
