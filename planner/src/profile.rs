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

//! The declarative test profile: interlinked chains, per-chain populations and
//! cross-chain committee assignments, plus the counting and reference
//! invariants that must hold before any identity is synthesized.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::{Error, Result};

pub type ChainId = u64;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
	#[serde(default)]
	pub general: General,
	pub nodes: Nodes,
	pub chains: BTreeMap<String, ChainConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct General {
	/// Max key generations in flight at once.
	#[serde(default = "default_concurrency")]
	pub concurrency: usize,
	/// Shared keystore passphrase.
	#[serde(default = "default_password")]
	pub password: String,
	/// Capacity hint for the account collection channel.
	#[serde(default = "default_buffer")]
	pub buffer: usize,
	/// Suffix appended to `node-<id>` when deriving net addresses.
	#[serde(default = "default_net_suffix")]
	pub net_suffix: String,
	#[serde(default)]
	pub pretty_json: bool,
}

impl Default for General {
	fn default() -> Self {
		General {
			concurrency: default_concurrency(),
			password: default_password(),
			buffer: default_buffer(),
			net_suffix: default_net_suffix(),
			pretty_json: false,
		}
	}
}

fn default_concurrency() -> usize {
	8
}

fn default_password() -> String {
	"test".to_string()
}

fn default_buffer() -> usize {
	64
}

fn default_net_suffix() -> String {
	".p2p".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Nodes {
	/// Expected total of positive-ID entries after expansion. Cross-checked
	/// against the planner's own tally; delegators are excluded.
	pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
	pub id: ChainId,
	/// Equal to `id` for a root chain, the root's id otherwise.
	pub root_chain: ChainId,
	#[serde(default)]
	pub validators: Population,
	#[serde(default)]
	pub full_nodes: Population,
	#[serde(default)]
	pub delegators: Population,
	#[serde(default)]
	pub accounts: Population,
	#[serde(default)]
	pub committees: Vec<CommitteeAssignment>,

	/// Offset in seconds added to the emit-time clock; 0 disables the delay.
	#[serde(default)]
	pub sleep_until: i64,
	#[serde(default)]
	pub max_committee_size: Option<u64>,
	#[serde(default = "default_minimum_peers")]
	pub minimum_peers_to_start: u32,
	#[serde(default = "default_max_inbound")]
	pub max_inbound_peers: u32,
	#[serde(default = "default_max_outbound")]
	pub max_outbound_peers: u32,
	#[serde(default)]
	pub in_memory: bool,
	#[serde(default = "default_gossip_threshold")]
	pub gossip_threshold: u32,
	#[serde(default = "default_mempool_max_bytes")]
	pub mempool_max_bytes: u64,
	#[serde(default = "default_mempool_max_count")]
	pub mempool_max_count: u64,
}

fn default_minimum_peers() -> u32 {
	1
}

fn default_max_inbound() -> u32 {
	21
}

fn default_max_outbound() -> u32 {
	7
}

fn default_gossip_threshold() -> u32 {
	3
}

fn default_mempool_max_bytes() -> u64 {
	10_000_000
}

fn default_mempool_max_count() -> u64 {
	5_000
}

impl ChainConfig {
	pub fn is_root(&self) -> bool {
		self.root_chain == self.id
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Population {
	#[serde(default)]
	pub count: u64,
	#[serde(default)]
	pub staked_amount: u64,
	#[serde(default)]
	pub amount: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitteeAssignment {
	/// Target committee, i.e. the id of some chain in the profile.
	pub id: ChainId,
	/// Existing validators of this chain that also join the target committee
	/// and appear in both chains' genesis.
	#[serde(default)]
	pub repeated_identity_validator_count: u64,
	#[serde(default)]
	pub repeated_identity_delegator_count: u64,
	/// New validators staked only for the target committee, appearing only in
	/// the root chain's genesis.
	#[serde(default)]
	pub validator_count: u64,
	#[serde(default)]
	pub delegator_count: u64,
}

impl AppConfig {
	/// Chain-id to root-chain-id lookup for every chain in the profile.
	pub fn chain_roots(&self) -> BTreeMap<ChainId, ChainId> {
		self.chains.values().map(|chain| (chain.id, chain.root_chain)).collect()
	}

	pub fn chain_by_id(&self, id: ChainId) -> Option<&ChainConfig> {
		self.chains.values().find(|chain| chain.id == id)
	}

	/// Total positive-ID entries this profile will produce: regular validators
	/// and full nodes, plus one entry per repeated-identity expansion and per
	/// committee-only validator. Delegators are excluded.
	pub fn expected_node_count(&self) -> u64 {
		self.chains
			.values()
			.map(|chain| {
				chain.validators.count +
					chain.full_nodes.count +
					chain
						.committees
						.iter()
						.map(|ca| ca.repeated_identity_validator_count + ca.validator_count)
						.sum::<u64>()
			})
			.sum()
	}

	/// Enforces the structural invariants on the profile. Any violation is
	/// fatal; messages name the chain and the offending counts.
	pub fn validate(&self) -> Result<()> {
		if self.chains.is_empty() {
			return Err(Error::Invariant("profile has no chains".to_string()));
		}

		let mut seen_ids = BTreeSet::new();
		for (name, chain) in &self.chains {
			if !seen_ids.insert(chain.id) {
				return Err(Error::Invariant(format!(
					"chain {name}: id {} is used by more than one chain",
					chain.id
				)));
			}
		}

		for (name, chain) in &self.chains {
			if !seen_ids.contains(&chain.root_chain) {
				return Err(Error::Invariant(format!(
					"chain {name}: root chain {} is not a known chain id",
					chain.root_chain
				)));
			}
			for ca in &chain.committees {
				if !seen_ids.contains(&ca.id) {
					return Err(Error::Invariant(format!(
						"chain {name}: committee {} is not a known chain id",
						ca.id
					)));
				}
				if ca.repeated_identity_validator_count > chain.validators.count {
					return Err(Error::Invariant(format!(
						"chain {name}: committee {} repeats {} validators but only {} exist",
						ca.id, ca.repeated_identity_validator_count, chain.validators.count
					)));
				}
				if ca.repeated_identity_delegator_count > chain.delegators.count {
					return Err(Error::Invariant(format!(
						"chain {name}: committee {} repeats {} delegators but only {} exist",
						ca.id, ca.repeated_identity_delegator_count, chain.delegators.count
					)));
				}
			}
		}

		if !self.chains.values().any(|chain| chain.is_root() && chain.validators.count > 0) {
			return Err(Error::Invariant(
				"no root chain with at least one validator".to_string(),
			));
		}

		// Every nested chain needs a peer-eligible validator: a
		// repeated-identity assignment declared on its root chain, or a
		// committee-only validator targeting it from anywhere.
		for (name, chain) in self.chains.iter().filter(|(_, chain)| !chain.is_root()) {
			let repeated_on_root = self.chain_by_id(chain.root_chain).is_some_and(|root| {
				root.committees
					.iter()
					.any(|ca| ca.id == chain.id && ca.repeated_identity_validator_count > 0)
			});
			let committee_only = self.chains.values().any(|other| {
				other.committees.iter().any(|ca| ca.id == chain.id && ca.validator_count > 0)
			});
			if !repeated_on_root && !committee_only {
				return Err(Error::Invariant(format!(
					"nested chain {name} (id {}) has no validator assigned to its committee on root chain {}",
					chain.id, chain.root_chain
				)));
			}
		}

		let total = self.expected_node_count();
		if total != self.nodes.count {
			return Err(Error::Invariant(format!(
				"total entries ({total}) does not equal nodes.count ({})",
				self.nodes.count
			)));
		}

		Ok(())
	}

	/// Short human-readable summary, logged after validation passes.
	pub fn log_summary(&self, profile_name: &str) {
		tracing::info!(
			"profile {profile_name}: {} chains, {} nodes expected",
			self.chains.len(),
			self.nodes.count
		);
		for (name, chain) in &self.chains {
			tracing::info!(
				"  {name} (id {}, root {}): {} validators, {} full nodes, {} delegators, {} accounts, {} committees",
				chain.id,
				chain.root_chain,
				chain.validators.count,
				chain.full_nodes.count,
				chain.delegators.count,
				chain.accounts.count,
				chain.committees.len()
			);
		}
	}
}
