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

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::test_data;
use googletest::assert_that;
use googletest::prelude::near;
use rphash::centroid::CentroidAccumulator;
use rphash::centroid::CentroidFactory;
use rphash::centroid::RunningMeanFactory;
use rphash::config::ClusterConfig;
use rphash::error::Error;
use rphash::error::ErrorKind;
use rphash::kmeans::KMeansRefiner;
use rphash::lsh::KeyHasher;
use rphash::pipeline::StreamingClusterer;
use rphash::stream::InMemorySequence;
use rphash::stream::LineFileSequence;
use rphash::stream::VectorSequence;

/// Keys a vector by its rounded first coordinate.
struct RoundHasher;

impl KeyHasher for RoundHasher {
    fn hash_vector(&self, vector: &[f64]) -> Result<i64, Error> {
        Ok(vector[0].round() as i64)
    }
}

/// Accumulator that accepts every key and counts what it folds.
struct Greedy {
    seen: usize,
}

impl CentroidAccumulator for Greedy {
    fn accepts(&self, _key: i64) -> bool {
        true
    }

    fn fold(&mut self, _vector: &[f64]) {
        self.seen += 1;
    }

    fn finalize(&self) -> Vec<f64> {
        vec![self.seen as f64]
    }
}

struct GreedyFactory;

impl CentroidFactory for GreedyFactory {
    type Accumulator = Greedy;

    fn seed(&self, _key: i64) -> Greedy {
        Greedy { seen: 0 }
    }
}

struct CountingSequence {
    inner: InMemorySequence,
    resets: Rc<Cell<usize>>,
}

impl VectorSequence for CountingSequence {
    fn next_vector(&mut self) -> Result<Option<Vec<f64>>, Error> {
        self.inner.next_vector()
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.resets.set(self.resets.get() + 1);
        self.inner.reset()
    }
}

/// Fails once, on the first attempt to read the vector at `fail_at`.
struct FailOnceSequence {
    inner: InMemorySequence,
    position: usize,
    fail_at: Option<usize>,
}

impl VectorSequence for FailOnceSequence {
    fn next_vector(&mut self) -> Result<Option<Vec<f64>>, Error> {
        if self.fail_at == Some(self.position) {
            self.fail_at = None;
            return Err(Error::new(ErrorKind::Io, "connection reset"));
        }
        self.position += 1;
        self.inner.next_vector()
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.position = 0;
        self.inner.reset()
    }
}

fn config(k: usize, dimensions: usize) -> ClusterConfig {
    ClusterConfig::builder(k, dimensions)
        .sketch_width(4096)
        .sketch_seed(11)
        .build()
        .unwrap()
}

fn two_groups() -> Vec<Vec<f64>> {
    vec![
        vec![0.1, 1.0],
        vec![10.2, 4.0],
        vec![-0.2, 3.0],
        vec![20.0, 0.0],
        vec![0.0, 5.0],
        vec![9.9, 6.0],
        vec![0.3, 7.0],
        vec![10.0, 8.0],
        vec![-0.1, 9.0],
    ]
}

#[test]
fn test_map_then_reduce() {
    let mut clusterer = StreamingClusterer::new(
        config(2, 2),
        InMemorySequence::new(two_groups()),
        RoundHasher,
        RunningMeanFactory::new(2),
    );
    clusterer.map().unwrap();
    // Ascending estimate: key 10 seen three times, key 0 five times; 20 was evicted.
    assert_eq!(clusterer.config().previous_top_ids(), &[10, 0]);

    clusterer.reduce().unwrap();
    let centroids = clusterer.config().centroids();
    assert_eq!(centroids.len(), 2);
    assert_that!(centroids[0][0], near(10.033333333, 1e-6));
    assert_that!(centroids[0][1], near(6.0, 1e-12));
    assert_that!(centroids[1][0], near(0.02, 1e-12));
    assert_that!(centroids[1][1], near(5.0, 1e-12));
}

#[test]
fn test_empty_sequence() {
    let mut clusterer = StreamingClusterer::new(
        config(3, 2),
        InMemorySequence::default(),
        RoundHasher,
        RunningMeanFactory::new(2),
    );
    assert!(clusterer.raw_centroids().unwrap().is_empty());
    assert!(clusterer.config().previous_top_ids().is_empty());
}

#[test]
fn test_unmatched_vector_is_dropped() {
    let mut published = config(2, 2);
    published.set_previous_top_ids(vec![99]);
    let mut clusterer = StreamingClusterer::new(
        published,
        InMemorySequence::new(vec![vec![5.0, 5.0]]),
        RoundHasher,
        RunningMeanFactory::new(2),
    );
    clusterer.reduce().unwrap();
    assert_eq!(clusterer.config().centroids(), &[vec![0.0, 0.0]]);
}

#[test]
fn test_first_match_wins() {
    let mut published = config(2, 1);
    published.set_previous_top_ids(vec![7, 8, 9]);
    let vectors = vec![vec![1.0], vec![2.0], vec![3.0]];
    let mut clusterer = StreamingClusterer::new(
        published,
        InMemorySequence::new(vectors),
        RoundHasher,
        GreedyFactory,
    );
    clusterer.reduce().unwrap();
    assert_eq!(
        clusterer.config().centroids(),
        &[vec![3.0], vec![0.0], vec![0.0]]
    );
}

#[test]
fn test_reduce_is_deterministic() {
    let run = || {
        let mut published = config(2, 2);
        published.set_previous_top_ids(vec![0, 10, 20]);
        let mut clusterer = StreamingClusterer::new(
            published,
            InMemorySequence::new(two_groups()),
            RoundHasher,
            RunningMeanFactory::new(2),
        );
        clusterer.reduce().unwrap();
        clusterer.into_config().centroids().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_centroids_are_cached() {
    let resets = Rc::new(Cell::new(0));
    let sequence = CountingSequence {
        inner: InMemorySequence::new(two_groups()),
        resets: resets.clone(),
    };
    let mut clusterer =
        StreamingClusterer::new(config(2, 2), sequence, RoundHasher, RunningMeanFactory::new(2));

    let first = clusterer.raw_centroids().unwrap().to_vec();
    // Each pass rewinds before and after reading.
    assert_eq!(resets.get(), 4);
    let second = clusterer.raw_centroids().unwrap().to_vec();
    assert_eq!(resets.get(), 4);
    assert_eq!(first, second);

    clusterer.reset().unwrap();
    assert!(clusterer.config().centroids().is_empty());
    assert_eq!(resets.get(), 5);
    let third = clusterer.raw_centroids().unwrap().to_vec();
    assert_eq!(resets.get(), 9);
    assert_eq!(first, third);
}

#[test]
fn test_rerun_after_read_error_starts_from_first_vector() {
    let vectors = vec![vec![5.0], vec![5.0], vec![9.0], vec![9.0], vec![9.0]];
    let sequence = FailOnceSequence {
        inner: InMemorySequence::new(vectors),
        position: 0,
        fail_at: Some(2),
    };
    let mut clusterer =
        StreamingClusterer::new(config(2, 1), sequence, RoundHasher, RunningMeanFactory::new(1));

    let err = clusterer.raw_centroids().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let raw = clusterer.raw_centroids().unwrap().to_vec();
    assert_eq!(clusterer.config().previous_top_ids(), &[5, 9]);
    assert_eq!(raw, vec![vec![5.0], vec![9.0]]);
}

#[test]
fn test_reduce_after_partial_read_sees_every_vector() {
    let mut published = config(2, 1);
    published.set_previous_top_ids(vec![5, 9]);
    let mut sequence = InMemorySequence::new(vec![vec![5.0], vec![9.0], vec![9.0]]);
    sequence.next_vector().unwrap();
    sequence.next_vector().unwrap();
    let mut clusterer = StreamingClusterer::new(published, sequence, RoundHasher, GreedyFactory);
    clusterer.reduce().unwrap();
    assert_eq!(clusterer.config().centroids(), &[vec![3.0], vec![0.0]]);
}

#[test]
fn test_dimension_mismatch_fails_run() {
    let vectors = vec![vec![1.0, 2.0], vec![1.0]];
    let mut clusterer = StreamingClusterer::new(
        config(2, 2),
        InMemorySequence::new(vectors),
        RoundHasher,
        RunningMeanFactory::new(2),
    );
    let err = clusterer.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.context("index"), Some("1"));
}

#[test]
fn test_projection_pipeline_on_file() {
    let config = ClusterConfig::builder(2, 3)
        .projected_dimensions(16)
        .sketch_seed(3)
        .build()
        .unwrap();
    let sequence = LineFileSequence::open(test_data("blobs.txt")).unwrap();
    let mut clusterer = StreamingClusterer::with_projection(config, sequence).unwrap();

    let raw = clusterer.raw_centroids().unwrap().to_vec();
    assert!(!raw.is_empty());
    assert!(raw.len() <= 2);
    assert_eq!(raw.len(), clusterer.config().previous_top_ids().len());

    let refined = clusterer.centroids(&KMeansRefiner::default()).unwrap();
    assert!(refined.len() <= 2);
    for centroid in &refined {
        assert_eq!(centroid.len(), 3);
        assert!(centroid.iter().all(|x| x.is_finite()));
    }
}
