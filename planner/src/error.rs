// Copyright 2025 Chainflip Labs GmbH
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! Error kinds surfaced by the planner and emitter. All of them are fatal at
//! the component boundary; there are no retries and no partial output.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	#[error("profile error: {0}")]
	Profile(String),
	#[error("invariant violation: {0}")]
	Invariant(String),
	#[error("key generation failed: {0}")]
	KeyGeneration(String),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("encoding error: {0}")]
	Encoding(String),
}

impl From<config::ConfigError> for Error {
	fn from(err: config::ConfigError) -> Self {
		Error::Profile(err.to_string())
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Encoding(err.to_string())
	}
}

impl From<serde_yaml::Error> for Error {
	fn from(err: serde_yaml::Error) -> Self {
		Error::Encoding(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
