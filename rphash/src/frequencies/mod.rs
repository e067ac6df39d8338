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

//! Heavy-hitter sketches for finding the most frequent hashed keys of a stream.
//!
//! # Overview
//!
//! [`HeavyHitterSketch`] pairs a Count-Min [`FrequencyTable`](crate::countmin::FrequencyTable)
//! with a [`BoundedTopK`] tracker. Every observation increments the table and re-ranks the
//! observed key by its fresh point estimate; when more than `K` keys are tracked, the key
//! with the lowest estimate is evicted.
//!
//! For a caller supplied `m` the sketch tracks `K = ceil(m * ln(m))` candidates, which
//! oversamples the `m` clusters a downstream consumer is looking for.
//!
//! # Accuracy
//!
//! Estimates are upper bounds on the true frequency: keys that collide in a row only ever
//! inflate each other's counters. A key that shares no row cell with any other key is
//! counted exactly.
//!
//! # Examples
//!
//! ```
//! # use rphash::frequencies::HeavyHitterSketch;
//! let mut sketch = HeavyHitterSketch::with_seed(4, 17);
//! for key in [10, 10, 10, 20, 20, 30] {
//!     sketch.observe(key);
//! }
//! let top = sketch.top_k().to_vec();
//! assert_eq!(top.last(), Some(&10));
//! assert!(sketch.top_k_estimates().last().copied().unwrap() >= 3);
//! ```

mod sketch;
mod top_k;

pub use self::sketch::HeavyHitterSketch;
pub use self::sketch::HeavyHitterSketchBuilder;
pub use self::top_k::BoundedTopK;
pub use self::top_k::Candidate;
pub use self::top_k::MAX_CAPACITY;
pub use self::top_k::derived_key;
