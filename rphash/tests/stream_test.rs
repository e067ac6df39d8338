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

use common::test_data;
use rphash::error::ErrorKind;
use rphash::stream::LineFileSequence;
use rphash::stream::VectorSequence;

fn drain(seq: &mut impl VectorSequence) -> Vec<Vec<f64>> {
    let mut out = vec![];
    while let Some(v) = seq.next_vector().unwrap() {
        out.push(v);
    }
    out
}

#[test]
fn test_line_file_reads_and_rewinds() {
    let mut seq = LineFileSequence::open(test_data("blobs.txt")).unwrap();
    let first = drain(&mut seq);
    assert_eq!(first.len(), 40);
    assert!(first.iter().all(|v| v.len() == 3));
    assert_eq!(seq.next_vector().unwrap(), None);

    seq.reset().unwrap();
    let second = drain(&mut seq);
    assert_eq!(first, second);
}

#[test]
fn test_line_file_reports_bad_token() {
    let mut seq = LineFileSequence::open(test_data("malformed.txt")).unwrap();
    assert_eq!(seq.next_vector().unwrap(), Some(vec![1.0, 2.0, 3.0]));
    let err = seq.next_vector().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert_eq!(err.context("line"), Some("3"));
    assert!(err.message().contains("\"x\""));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_line_file_missing() {
    let path = std::env::temp_dir().join("rphash-missing-vectors.txt");
    let err = LineFileSequence::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.context("path").is_some());
    let source = std::error::Error::source(&err).unwrap();
    let io = source.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
}
