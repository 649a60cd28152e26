//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Serialization error types.

use crate::serialization::Encoding;
use std::fmt;

/// Error that occurs during serialization.
#[derive(Debug)]
pub struct SerializationError {
    /// The underlying error message
    message: String,
    /// Optional source error
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SerializationError {
    /// Creates a new serialization error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new serialization error with a message and source.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Serialization error: {}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error that occurs during deserialization.
#[derive(Debug)]
pub struct DeserializationError {
    /// The underlying error message
    message: String,
    /// Optional source error
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DeserializationError {
    /// Creates a new deserialization error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new deserialization error with a message and source.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for DeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deserialization error: {}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for DeserializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// A frame that parsed in neither encoding.
///
/// `advertised` is the encoding implied by the frame kind; it was tried
/// first, then the other one.
#[derive(Debug)]
pub struct DecodeError {
    advertised: Encoding,
    primary: DeserializationError,
    fallback: DeserializationError,
}

impl DecodeError {
    pub(crate) fn new(
        advertised: Encoding,
        primary: DeserializationError,
        fallback: DeserializationError,
    ) -> Self {
        Self {
            advertised,
            primary,
            fallback,
        }
    }

    /// The encoding implied by the frame kind.
    pub fn advertised(&self) -> Encoding {
        self.advertised
    }

    /// The error from the advertised encoding.
    pub fn primary(&self) -> &DeserializationError {
        &self.primary
    }

    /// The error from the fallback encoding.
    pub fn fallback(&self) -> &DeserializationError {
        &self.fallback
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame is neither valid {} ({}) nor {} ({})",
            self.advertised.name(),
            self.primary,
            self.advertised.other().name(),
            self.fallback
        )
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.primary)
    }
}

impl From<rmp_serde::encode::Error> for SerializationError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::with_source("MessagePack serialization failed", err)
    }
}

impl From<rmp_serde::decode::Error> for DeserializationError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::with_source("MessagePack deserialization failed", err)
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source("JSON serialization failed", err)
    }
}

impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source("JSON deserialization failed", err)
    }
}
