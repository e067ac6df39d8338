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

//! Count-Min frequency table for 64-bit hashed keys.
//!
//! The table keeps `depth` rows of `width` unsigned counters. Each row owns an odd
//! multiplier drawn once at construction; a key is mapped to one column per row and the
//! point estimate is the minimum of the touched counters. Estimates never under-count.
//!
//! # Usage
//!
//! ```rust
//! # use rphash::countmin::FrequencyTable;
//! let mut table = FrequencyTable::with_seed(5, 256, 7);
//! table.increment(42, 1);
//! assert_eq!(table.increment(42, 2), 3);
//! assert!(table.estimate(42) >= 3);
//! ```
//!
//! # Configuration Helpers
//!
//! ```rust
//! # use rphash::countmin::FrequencyTable;
//! let width = FrequencyTable::suggest_width(0.01);
//! let depth = FrequencyTable::suggest_depth(0.999);
//! assert_eq!((depth, width), (7, 272));
//! let _table = FrequencyTable::new(depth, width);
//! ```

mod table;
pub use self::table::DEFAULT_DEPTH;
pub use self::table::DEFAULT_WIDTH;
pub use self::table::FrequencyTable;
pub use self::table::MAX_TABLE_ENTRIES;
