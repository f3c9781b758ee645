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

//! Planner and artifact emitter for multi-chain cluster test deployments.
//!
//! A named profile describes several interlinked chains and their node
//! populations; the planner turns it into a graph of cryptographic
//! identities, expands cross-chain committee memberships, and the emitter
//! materializes per-chain genesis/config/keystore files plus a global
//! identity index for the cluster applier to project onto Kubernetes.

pub mod artifacts;
pub mod crypto;
pub mod error;
pub mod genesis;
pub mod identity;
pub mod planner;
pub mod profile;
pub mod settings;

#[cfg(test)]
pub mod testing;
