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

//! # RPHash streaming core
//!
//! Approximate clustering of a vector stream in two passes. The first pass hashes every
//! vector with a locality-sensitive projection and finds the most frequent keys with a
//! Count-Min heavy-hitter sketch. The second pass seeds one centroid per frequent key and
//! folds the vectors sharing that key into it. The raw centroids can then be refined into
//! the final `k` clusters.
//!
//! This library is divided into modules that constitute distinct groups of functionality.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod centroid;
pub mod config;
pub mod countmin;
pub mod error;
pub mod frequencies;
pub mod kmeans;
pub mod lsh;
pub mod pipeline;
pub mod stream;
