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

//! Profile builders shared by the unit tests. Chains are built through serde
//! so the same defaults apply as when loading a real catalog.

use crate::{
	identity::{net_address, NodeId, NodeIdentity, NodeType},
	profile::{AppConfig, ChainConfig, ChainId, CommitteeAssignment},
};

pub fn chain(id: ChainId, root: ChainId, validators: u64) -> ChainConfig {
	serde_yaml::from_str(&format!(
		"id: {id}\nroot_chain: {root}\nvalidators: {{count: {validators}, staked_amount: 1000000, amount: 100}}\n"
	))
	.expect("valid chain yaml")
}

pub fn committee(
	id: ChainId,
	repeated_validators: u64,
	repeated_delegators: u64,
	validators: u64,
	delegators: u64,
) -> CommitteeAssignment {
	CommitteeAssignment {
		id,
		repeated_identity_validator_count: repeated_validators,
		repeated_identity_delegator_count: repeated_delegators,
		validator_count: validators,
		delegator_count: delegators,
	}
}

pub fn profile(chains: Vec<(&str, ChainConfig)>, node_count: u64) -> AppConfig {
	let mut profile: AppConfig =
		serde_yaml::from_str(&format!("nodes: {{count: {node_count}}}\nchains: {{}}\n"))
			.expect("valid profile yaml");
	profile.chains =
		chains.into_iter().map(|(name, chain)| (name.to_string(), chain)).collect();
	profile
}

pub fn identity(id: NodeId, chain_id: ChainId, node_type: NodeType) -> NodeIdentity {
	NodeIdentity {
		id,
		chain_id,
		root_chain_id: chain_id,
		root_chain_node: None,
		peer_node: None,
		address: format!("{id:040x}"),
		public_key: format!("{id:096x}"),
		private_key: format!("{id:064x}"),
		node_type,
		committees: vec![chain_id],
		expanding_committees: Some(vec![]),
		genesis_chain_id: chain_id,
		net_address: (node_type != NodeType::Delegator).then(|| net_address(id, ".p2p")),
		staked_amount: 1_000_000,
		amount: 100,
		is_delegate: node_type == NodeType::Delegator,
		public_key_raw: vec![],
		private_key_raw: vec![],
	}
}
