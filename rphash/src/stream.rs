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

//! Restartable sources of real-valued vectors.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Error;

/// A finite vector sequence that can be rewound any number of times.
pub trait VectorSequence {
    /// Returns the next vector, or `None` once the sequence is exhausted.
    fn next_vector(&mut self) -> Result<Option<Vec<f64>>, Error>;

    /// Rewinds the sequence to its first vector.
    fn reset(&mut self) -> Result<(), Error>;
}

/// Vector sequence over vectors held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySequence {
    vectors: Vec<Vec<f64>>,
    cursor: usize,
}

impl InMemorySequence {
    /// Creates a sequence positioned at the first of `vectors`.
    pub fn new(vectors: Vec<Vec<f64>>) -> Self {
        Self { vectors, cursor: 0 }
    }

    /// Returns the number of vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns true if the sequence holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl From<Vec<Vec<f64>>> for InMemorySequence {
    fn from(vectors: Vec<Vec<f64>>) -> Self {
        Self::new(vectors)
    }
}

impl VectorSequence for InMemorySequence {
    fn next_vector(&mut self) -> Result<Option<Vec<f64>>, Error> {
        let next = self.vectors.get(self.cursor).cloned();
        if next.is_some() {
            self.cursor += 1;
        }
        Ok(next)
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.cursor = 0;
        Ok(())
    }
}

/// Vector sequence reading one vector per line of whitespace-separated numbers.
///
/// Blank lines are skipped. Rewinding reopens the file.
#[derive(Debug)]
pub struct LineFileSequence {
    path: PathBuf,
    reader: BufReader<File>,
    line: usize,
    buf: String,
}

impl LineFileSequence {
    /// Opens `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let reader = open_reader(&path)?;
        Ok(Self {
            path,
            reader,
            line: 0,
            buf: String::new(),
        })
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VectorSequence for LineFileSequence {
    fn next_vector(&mut self) -> Result<Option<Vec<f64>>, Error> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|err| Error::io(self.path.display(), err))?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;
            if self.buf.trim().is_empty() {
                continue;
            }
            return parse_line(&self.buf)
                .map(Some)
                .map_err(|err| err.with_context("line", self.line))
                .map_err(|err| err.with_context("path", self.path.display()));
        }
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.reader = open_reader(&self.path)?;
        self.line = 0;
        Ok(())
    }
}

fn open_reader(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| Error::io(path.display(), err))
}

fn parse_line(line: &str) -> Result<Vec<f64>, Error> {
    line.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|err| {
                Error::invalid_data(format!("invalid number: {token:?}")).set_source(err)
            })
        })
        .collect()
}
