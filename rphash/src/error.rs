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

//! Error types for rphash operations

use std::fmt;

/// ErrorKind is all kinds of Error of rphash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The argument or configuration provided is invalid.
    InvalidArgument,
    /// The input data read from a vector source is malformed.
    InvalidData,
    /// Reading from the underlying vector source failed.
    Io,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::InvalidData => "InvalidData",
            ErrorKind::Io => "Io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all fallible rphash functions.
///
/// # Examples
///
/// ```
/// # use rphash::error::Error;
/// # use rphash::error::ErrorKind;
/// let err = Error::new(ErrorKind::InvalidArgument, "k must be positive");
/// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
/// assert_eq!(err.message(), "k must be positive");
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: vec![],
            source: None,
        }
    }

    /// Set the underlying error that caused this one.
    pub fn set_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Return the value recorded for a context key, if any.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

// Convenient constructors used within rphash crate.
impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, msg)
    }

    pub(crate) fn invalid_data(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidData, msg)
    }

    pub(crate) fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::invalid_argument(format!(
            "vector dimensionality mismatch: expected {expected}, got {actual}"
        ))
        .with_context("expected", expected)
        .with_context("actual", actual)
    }

    pub(crate) fn io(path: impl fmt::Display, err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, format!("failed to read vectors: {err}"))
            .with_context("path", path)
            .set_source(err)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source:")?;
            writeln!(f, "   {source:#}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            for (i, (k, v)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}: {v}")?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn test_format_consistency() {
        let err = Error::new(ErrorKind::InvalidArgument, "k must be at least 1");
        assert_snapshot!(err, @"InvalidArgument => k must be at least 1");
    }

    #[test]
    fn test_format_dimension_mismatch() {
        let err = Error::dimension_mismatch(3, 2).with_context("index", 7);
        assert_snapshot!(
            err,
            @"InvalidArgument, context: { expected: 3, actual: 2, index: 7 } => vector dimensionality mismatch: expected 3, got 2"
        );
        assert_eq!(err.context("index"), Some("7"));
        assert_eq!(err.context("missing"), None);
    }

    #[test]
    fn test_debug_lists_context() {
        let err = Error::invalid_data("bad token").with_context("line", 4);
        let rendered = format!("{err:?}");
        assert!(rendered.starts_with("InvalidData => bad token\n"));
        assert!(rendered.contains("   line: 4"));
    }

    #[test]
    fn test_io_keeps_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::io("blobs.txt", cause);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.context("path"), Some("blobs.txt"));
        assert_snapshot!(
            err,
            @"Io, context: { path: blobs.txt } => failed to read vectors: no such file"
        );

        let source = std::error::Error::source(&err).unwrap();
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
        assert!(format!("{err:?}").contains("Source:\n   no such file"));
    }
}
