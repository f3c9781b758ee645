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

//! The central identity entity and the cross-chain expansion step. An
//! expanded entry is a value copy of its base with selective overrides; the
//! base is never mutated in place.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::profile::ChainId;

/// Validators and full nodes use positive IDs (dense, pod-ordinal friendly);
/// delegators use negative IDs so they never punch holes in the positive
/// sequence.
pub type NodeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	Validator,
	Delegator,
	Fullnode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeIdentity {
	pub id: NodeId,
	/// The chain this identity belongs to: drives ids.json grouping, account
	/// placement and keystore placement.
	pub chain_id: ChainId,
	pub root_chain_id: ChainId,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub root_chain_node: Option<NodeId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub peer_node: Option<NodeId>,
	pub address: String,
	pub public_key: String,
	pub private_key: String,
	pub node_type: NodeType,
	/// Ordered; the first entry is the native chain for everything except
	/// committee-only entries.
	pub committees: Vec<ChainId>,
	/// The subset of `committees` that materializes an additional entry in
	/// the target chain. `None` marks a committee-only entry.
	#[serde(skip)]
	pub expanding_committees: Option<Vec<ChainId>>,
	/// Which chain's genesis validators this entry appears in. Differs from
	/// `chain_id` for committee-only and expanded entries.
	#[serde(skip)]
	pub genesis_chain_id: ChainId,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub net_address: Option<String>,
	pub staked_amount: u64,
	pub amount: u64,
	pub is_delegate: bool,
	#[serde(skip)]
	pub public_key_raw: Vec<u8>,
	#[serde(skip)]
	pub private_key_raw: Vec<u8>,
}

impl NodeIdentity {
	pub fn is_validator(&self) -> bool {
		self.node_type == NodeType::Validator
	}

	pub fn is_full_node(&self) -> bool {
		self.node_type == NodeType::Fullnode
	}

	/// Committee-only entries carry no expansion set at all, as opposed to
	/// an empty one.
	pub fn is_committee_only(&self) -> bool {
		self.expanding_committees.is_none()
	}

	pub fn nickname(&self) -> String {
		match self.node_type {
			NodeType::Delegator => format!("delegator-{}", self.id.unsigned_abs()),
			_ => format!("node-{}", self.id),
		}
	}
}

pub fn net_address(id: NodeId, suffix: &str) -> String {
	format!("tcp://node-{id}{suffix}")
}

/// Allocators for the IDs of expanded entries: validators continue above the
/// base positive range, delegators continue below the lowest negative ID.
pub struct ExpansionCursor {
	pub next_id: NodeId,
	pub next_delegator_id: NodeId,
}

/// Expands one base identity into the records that are actually emitted.
///
/// Full nodes, single-committee entries and committee-only entries map to a
/// single record. A multi-committee entry maps to its base record plus one
/// copy per expanding committee, retargeted at that committee's chain.
/// Non-expanding additional committees stay staked in the native genesis but
/// produce nothing here.
pub fn expand(
	base: &NodeIdentity,
	cursor: &mut ExpansionCursor,
	chain_roots: &BTreeMap<ChainId, ChainId>,
	suffix: &str,
) -> Vec<NodeIdentity> {
	let mut expanded = vec![base.clone()];

	let Some(expanding) = &base.expanding_committees else {
		// Committee-only records are never expanded further.
		return expanded;
	};

	for &target in expanding {
		let id = if base.is_delegate {
			cursor.next_delegator_id -= 1;
			cursor.next_delegator_id + 1
		} else {
			cursor.next_id += 1;
			cursor.next_id - 1
		};
		let mut copy = base.clone();
		copy.id = id;
		copy.chain_id = target;
		copy.genesis_chain_id = target;
		copy.root_chain_id = chain_roots.get(&target).copied().unwrap_or(target);
		copy.net_address = (!base.is_delegate).then(|| net_address(id, suffix));
		expanded.push(copy);
	}

	expanded
}
