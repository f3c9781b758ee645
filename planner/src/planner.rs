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

//! The identity/committee planner.
//!
//! Pass 1 walks the chains in lexicographic name order, allocates the
//! per-chain ID blocks and synthesizes key material concurrently. Pass 2
//! expands multi-committee entries into additional records in their target
//! chains. Pass 3 resolves every `root_chain_node`/`peer_node` pointer with
//! load-balanced selection over pre-seeded assignment counters.

use std::{
	collections::{BTreeMap, HashMap},
	sync::{Arc, Mutex},
};

use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};

use crate::{
	crypto::Keypair,
	error::{Error, Result},
	identity::{expand, net_address, ExpansionCursor, NodeId, NodeIdentity, NodeType},
	profile::{AppConfig, ChainConfig, ChainId, General},
};

/// An account funded in some chain's genesis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisAccount {
	pub address: String,
	pub amount: u64,
}

/// The frozen output of the planner: the full emission set plus the per-chain
/// account multisets.
#[derive(Debug)]
pub struct Plan {
	/// Every base identity and every expanded copy, sorted by `id`, with
	/// pointers resolved.
	pub identities: Vec<NodeIdentity>,
	/// Implicit role accounts plus synthetic filler, keyed by chain id.
	pub accounts: BTreeMap<ChainId, Vec<GenesisAccount>>,
}

impl Plan {
	/// The emission set restricted to one chain's genesis validators.
	pub fn genesis_validators(&self, chain_id: ChainId) -> impl Iterator<Item = &NodeIdentity> {
		self.identities.iter().filter(move |identity| identity.genesis_chain_id == chain_id)
	}

	/// Identities whose accounts and keystore land in the given chain.
	pub fn residents(&self, chain_id: ChainId) -> impl Iterator<Item = &NodeIdentity> {
		self.identities.iter().filter(move |identity| identity.chain_id == chain_id)
	}
}

struct CollectedAccount {
	chain_id: ChainId,
	address: String,
	amount: u64,
}

/// Everything about an identity that is known before its key exists.
struct IdentitySpec {
	id: NodeId,
	chain_id: ChainId,
	genesis_chain_id: ChainId,
	root_chain_id: ChainId,
	node_type: NodeType,
	committees: Vec<ChainId>,
	expanding: Option<Vec<ChainId>>,
	staked_amount: u64,
	amount: u64,
}

impl IdentitySpec {
	fn into_identity(self, keypair: Keypair, suffix: &str) -> NodeIdentity {
		let is_delegate = self.node_type == NodeType::Delegator;
		let public_key = hex::encode(&keypair.public_key);
		let private_key = hex::encode(&keypair.private_key);
		NodeIdentity {
			id: self.id,
			chain_id: self.chain_id,
			root_chain_id: self.root_chain_id,
			root_chain_node: None,
			peer_node: None,
			address: keypair.address,
			public_key,
			private_key,
			node_type: self.node_type,
			committees: self.committees,
			expanding_committees: self.expanding,
			genesis_chain_id: self.genesis_chain_id,
			net_address: (!is_delegate).then(|| net_address(self.id, suffix)),
			staked_amount: self.staked_amount,
			amount: self.amount,
			is_delegate,
			public_key_raw: keypair.public_key,
			private_key_raw: keypair.private_key,
		}
	}
}

/// Runs all three planner passes over a validated profile.
pub async fn plan(profile: &AppConfig) -> Result<Plan> {
	let chain_roots = profile.chain_roots();
	let semaphore = Arc::new(Semaphore::new(profile.general.concurrency.max(1)));
	let (account_tx, account_rx) = mpsc::channel(profile.general.buffer.max(1));
	let collector = tokio::spawn(collect_accounts(account_rx));

	let mut identities = Vec::new();
	let mut next_id: NodeId = 1;
	let mut next_delegator_id: NodeId = -1;

	// Pass 1: per-chain synthesis, chains in lexicographic name order.
	for (name, chain) in &profile.chains {
		let specs = chain_specs(chain, &chain_roots, &mut next_id, &mut next_delegator_id);
		tracing::debug!("chain {name}: synthesizing {} identities", specs.len());
		identities
			.extend(synthesize(specs, &profile.general, &semaphore, &account_tx).await?);

		for index in 1..=chain.accounts.count {
			account_tx
				.send(CollectedAccount {
					chain_id: chain.id,
					address: format!("{index:020x}"),
					amount: chain.accounts.amount,
				})
				.await
				.map_err(|_| {
					Error::Invariant("account collector stopped early".to_string())
				})?;
		}
	}
	drop(account_tx);
	let accounts = collector
		.await
		.map_err(|err| Error::Invariant(format!("account collector: {err}")))?;

	// Pass 2: cross-chain expansion, single-threaded over id order.
	identities.sort_by_key(|identity| identity.id);
	let mut cursor = ExpansionCursor { next_id, next_delegator_id };
	let mut expanded = Vec::with_capacity(identities.len());
	for base in &identities {
		expanded.extend(expand(base, &mut cursor, &chain_roots, &profile.general.net_suffix));
	}
	expanded.sort_by_key(|identity| identity.id);

	// The declared node count is a cross-check against our own tally.
	let total = expanded.iter().filter(|identity| identity.id > 0).count() as u64;
	if total != profile.nodes.count {
		return Err(Error::Invariant(format!(
			"total entries ({total}) does not equal nodes.count ({})",
			profile.nodes.count
		)));
	}

	// Pass 3: pointer assignment.
	assign_pointers(&mut expanded, &chain_roots)?;

	tracing::info!(
		"planned {} identities across {} chains",
		expanded.len(),
		profile.chains.len()
	);
	Ok(Plan { identities: expanded, accounts })
}

/// Allocates the chain's ID blocks and lays out its identity specs: regular
/// validators, committee-only validators, full nodes in the positive block;
/// regular then committee-only delegators in the negative block.
fn chain_specs(
	chain: &ChainConfig,
	chain_roots: &BTreeMap<ChainId, ChainId>,
	next_id: &mut NodeId,
	next_delegator_id: &mut NodeId,
) -> Vec<IdentitySpec> {
	let mut take_id = || {
		let id = *next_id;
		*next_id += 1;
		id
	};
	let mut specs = Vec::new();

	for index in 0..chain.validators.count {
		let mut committees = vec![chain.id];
		let mut expanding = Vec::new();
		for ca in &chain.committees {
			if index < ca.repeated_identity_validator_count {
				committees.push(ca.id);
				expanding.push(ca.id);
			}
		}
		specs.push(IdentitySpec {
			id: take_id(),
			chain_id: chain.id,
			genesis_chain_id: chain.id,
			root_chain_id: chain.root_chain,
			node_type: NodeType::Validator,
			committees,
			expanding: Some(expanding),
			staked_amount: chain.validators.staked_amount,
			amount: chain.validators.amount,
		});
	}

	// Committee-only validators live in the target chain but stay in the
	// originating chain's genesis.
	for ca in &chain.committees {
		for _ in 0..ca.validator_count {
			specs.push(IdentitySpec {
				id: take_id(),
				chain_id: ca.id,
				genesis_chain_id: chain.id,
				root_chain_id: chain_roots.get(&ca.id).copied().unwrap_or(ca.id),
				node_type: NodeType::Validator,
				committees: vec![ca.id],
				expanding: None,
				staked_amount: chain.validators.staked_amount,
				amount: chain.validators.amount,
			});
		}
	}

	for _ in 0..chain.full_nodes.count {
		specs.push(IdentitySpec {
			id: take_id(),
			chain_id: chain.id,
			genesis_chain_id: chain.id,
			root_chain_id: chain.root_chain,
			node_type: NodeType::Fullnode,
			committees: vec![chain.id],
			expanding: Some(vec![]),
			staked_amount: 0,
			amount: chain.full_nodes.amount,
		});
	}

	let mut take_delegator_id = || {
		let id = *next_delegator_id;
		*next_delegator_id -= 1;
		id
	};

	for index in 0..chain.delegators.count {
		let mut committees = vec![chain.id];
		let mut expanding = Vec::new();
		for ca in &chain.committees {
			if index < ca.repeated_identity_delegator_count {
				committees.push(ca.id);
				expanding.push(ca.id);
			}
		}
		specs.push(IdentitySpec {
			id: take_delegator_id(),
			chain_id: chain.id,
			genesis_chain_id: chain.id,
			root_chain_id: chain.root_chain,
			node_type: NodeType::Delegator,
			committees,
			expanding: Some(expanding),
			staked_amount: chain.delegators.staked_amount,
			amount: chain.delegators.amount,
		});
	}

	for ca in &chain.committees {
		for _ in 0..ca.delegator_count {
			specs.push(IdentitySpec {
				id: take_delegator_id(),
				chain_id: ca.id,
				genesis_chain_id: chain.id,
				root_chain_id: chain_roots.get(&ca.id).copied().unwrap_or(ca.id),
				node_type: NodeType::Delegator,
				committees: vec![ca.id],
				expanding: None,
				staked_amount: chain.delegators.staked_amount,
				amount: chain.delegators.amount,
			});
		}
	}

	specs
}

/// Generates key material for one chain's specs, at most
/// `general.concurrency` generations in flight. Identities are appended under
/// a mutex and re-sorted; accounts stream to the collector as they appear.
async fn synthesize(
	specs: Vec<IdentitySpec>,
	general: &General,
	semaphore: &Arc<Semaphore>,
	account_tx: &mpsc::Sender<CollectedAccount>,
) -> Result<Vec<NodeIdentity>> {
	let collected = Arc::new(Mutex::new(Vec::with_capacity(specs.len())));
	let mut producers = Vec::with_capacity(specs.len());

	for spec in specs {
		let semaphore = semaphore.clone();
		let account_tx = account_tx.clone();
		let collected = collected.clone();
		let suffix = general.net_suffix.clone();
		producers.push(tokio::spawn(async move {
			let _permit =
				semaphore.acquire_owned().await.expect("semaphore is never closed");
			let keypair = tokio::task::spawn_blocking(Keypair::generate)
				.await
				.map_err(|err| Error::KeyGeneration(err.to_string()))??;
			let identity = spec.into_identity(keypair, &suffix);
			account_tx
				.send(CollectedAccount {
					chain_id: identity.chain_id,
					address: identity.address.clone(),
					amount: identity.amount,
				})
				.await
				.map_err(|_| {
					Error::Invariant("account collector stopped early".to_string())
				})?;
			collected.lock().expect("planner mutex is never poisoned").push(identity);
			Ok::<(), Error>(())
		}));
	}

	// Barrier: every producer joins before the chain is considered done.
	futures::future::try_join_all(producers)
		.await
		.map_err(|err| Error::KeyGeneration(err.to_string()))?
		.into_iter()
		.collect::<Result<()>>()?;

	let mut identities = Arc::try_unwrap(collected)
		.expect("all producers joined")
		.into_inner()
		.expect("planner mutex is never poisoned");
	identities.sort_by_key(|identity| identity.id);
	Ok(identities)
}

async fn collect_accounts(
	mut account_rx: mpsc::Receiver<CollectedAccount>,
) -> BTreeMap<ChainId, Vec<GenesisAccount>> {
	let mut accounts: BTreeMap<ChainId, Vec<GenesisAccount>> = BTreeMap::new();
	while let Some(account) = account_rx.recv().await {
		accounts
			.entry(account.chain_id)
			.or_default()
			.push(GenesisAccount { address: account.address, amount: account.amount });
	}
	// Concurrent producers make the arrival order arbitrary; consumers treat
	// the accounts as an unordered multiset, so sort for stable artifacts.
	for list in accounts.values_mut() {
		list.sort_by(|a, b| a.address.cmp(&b.address));
	}
	accounts
}

/// Picks the least-assigned candidate, first-seen on ties, and counts the
/// pick.
fn pick_least(
	candidates: &[NodeId],
	assignments: &mut HashMap<NodeId, u64>,
) -> Option<NodeId> {
	let picked = candidates
		.iter()
		.copied()
		.min_by_key(|id| assignments.get(id).copied().unwrap_or_default())?;
	*assignments.entry(picked).or_default() += 1;
	Some(picked)
}

fn assign_pointers(
	identities: &mut [NodeIdentity],
	chain_roots: &BTreeMap<ChainId, ChainId>,
) -> Result<()> {
	let is_root_chain = |chain: ChainId| chain_roots.get(&chain).copied() == Some(chain);

	let mut root_validators_by_chain: HashMap<ChainId, Vec<NodeId>> = HashMap::new();
	let mut address_to_root_entry: HashMap<String, NodeId> = HashMap::new();
	for identity in identities.iter().filter(|identity| identity.is_validator()) {
		if is_root_chain(identity.chain_id) {
			root_validators_by_chain.entry(identity.chain_id).or_default().push(identity.id);
			address_to_root_entry.entry(identity.address.clone()).or_insert(identity.id);
		}
	}

	let mut nested_peers: HashMap<ChainId, Vec<NodeId>> = HashMap::new();
	let mut committee_only_peers: HashMap<ChainId, Vec<NodeId>> = HashMap::new();
	for identity in identities
		.iter()
		.filter(|identity| identity.is_validator() && !is_root_chain(identity.chain_id))
	{
		if identity.is_committee_only() {
			committee_only_peers.entry(identity.chain_id).or_default().push(identity.id);
		} else if address_to_root_entry.contains_key(identity.address.as_str()) {
			nested_peers.entry(identity.chain_id).or_default().push(identity.id);
		}
	}

	// Pre-seed the counters with the deterministic self and repeated-identity
	// pointers so load-balanced picks start from the real distribution.
	let mut root_assignments: HashMap<NodeId, u64> = HashMap::new();
	let mut peer_assignments: HashMap<NodeId, u64> = HashMap::new();
	for identity in identities.iter().filter(|identity| identity.is_validator()) {
		if is_root_chain(identity.chain_id) {
			*root_assignments.entry(identity.id).or_default() += 1;
			*peer_assignments.entry(identity.id).or_default() += 1;
		} else if identity.is_committee_only() {
			*peer_assignments.entry(identity.id).or_default() += 1;
		} else if let Some(&root_entry) =
			address_to_root_entry.get(identity.address.as_str())
		{
			*root_assignments.entry(root_entry).or_default() += 1;
			*peer_assignments.entry(identity.id).or_default() += 1;
		}
	}

	// Sequential assignment in id order makes counter tie-breaks
	// reproducible. Delegators hold no pointers.
	for index in 0..identities.len() {
		if identities[index].is_delegate {
			continue;
		}

		let (root_chain_node, peer_node) = {
			let identity = &identities[index];
			let on_root = is_root_chain(identity.chain_id);
			let repeated_root_entry = if identity.is_validator() {
				address_to_root_entry.get(identity.address.as_str()).copied()
			} else {
				None
			};

			let root_chain_node = if identity.is_validator() && on_root {
				identity.id
			} else if let Some(root_entry) = repeated_root_entry {
				root_entry
			} else {
				let candidates = root_validators_by_chain
					.get(&identity.root_chain_id)
					.map(Vec::as_slice)
					.unwrap_or(&[]);
				pick_least(candidates, &mut root_assignments).ok_or_else(|| {
					Error::Invariant(format!(
						"no root chain validator on chain {} for node {}",
						identity.root_chain_id, identity.id
					))
				})?
			};

			let peer_node = if identity.is_validator() &&
				(on_root || identity.is_committee_only() || repeated_root_entry.is_some())
			{
				identity.id
			} else if identity.is_full_node() && on_root {
				let candidates = root_validators_by_chain
					.get(&identity.chain_id)
					.map(Vec::as_slice)
					.unwrap_or(&[]);
				pick_least(candidates, &mut peer_assignments).ok_or_else(|| {
					Error::Invariant(format!(
						"no validator on root chain {} for full node {}",
						identity.chain_id, identity.id
					))
				})?
			} else {
				let candidates = match nested_peers.get(&identity.chain_id) {
					Some(peers) if !peers.is_empty() => peers.as_slice(),
					_ => committee_only_peers
						.get(&identity.chain_id)
						.map(Vec::as_slice)
						.unwrap_or(&[]),
				};
				pick_least(candidates, &mut peer_assignments).ok_or_else(|| {
					Error::Invariant(format!(
						"no peer candidate on chain {} for node {}",
						identity.chain_id, identity.id
					))
				})?
			};

			(root_chain_node, peer_node)
		};

		identities[index].root_chain_node = Some(root_chain_node);
		identities[index].peer_node = Some(peer_node);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{chain, committee, profile};

	fn by_id(plan: &Plan, id: NodeId) -> &NodeIdentity {
		plan.identities.iter().find(|identity| identity.id == id).unwrap()
	}

	#[tokio::test]
	async fn single_root_chain_self_references() {
		let profile = profile(vec![("chain_1", chain(1, 1, 2))], 2);
		let plan = plan(&profile).await.unwrap();

		assert_eq!(
			plan.identities.iter().map(|identity| identity.id).collect::<Vec<_>>(),
			vec![1, 2]
		);
		for identity in &plan.identities {
			assert_eq!(identity.root_chain_node, Some(identity.id));
			assert_eq!(identity.peer_node, Some(identity.id));
			assert_eq!(identity.committees, vec![1]);
			assert_eq!(identity.genesis_chain_id, 1);
		}
	}

	#[tokio::test]
	async fn repeated_identity_expansion() {
		let mut root = chain(1, 1, 3);
		root.committees.push(committee(2, 1, 0, 0, 0));
		let profile = profile(vec![("chain_1", root), ("chain_2", chain(2, 1, 0))], 4);
		let plan = plan(&profile).await.unwrap();

		assert_eq!(plan.identities.len(), 4);
		let base = by_id(&plan, 1);
		assert_eq!(base.committees, vec![1, 2]);
		assert_eq!(base.chain_id, 1);
		assert_eq!(base.root_chain_node, Some(1));
		assert_eq!(base.peer_node, Some(1));

		let copy = by_id(&plan, 4);
		assert_eq!(copy.chain_id, 2);
		assert_eq!(copy.genesis_chain_id, 2);
		assert_eq!(copy.address, base.address);
		assert_eq!(copy.public_key, base.public_key);
		assert_eq!(copy.root_chain_node, Some(1));
		assert_eq!(copy.peer_node, Some(4));
		assert_eq!(copy.net_address.as_deref(), Some("tcp://node-4.p2p"));

		// The untouched validators still self-reference.
		for id in [2, 3] {
			assert_eq!(by_id(&plan, id).peer_node, Some(id));
		}
	}

	#[tokio::test]
	async fn committee_only_validator_targets_the_nested_chain() {
		let mut root = chain(1, 1, 3);
		root.committees.push(committee(2, 0, 0, 1, 0));
		let profile = profile(vec![("chain_1", root), ("chain_2", chain(2, 1, 0))], 4);
		let plan = plan(&profile).await.unwrap();

		let committee_only = by_id(&plan, 4);
		assert_eq!(committee_only.chain_id, 2);
		assert_eq!(committee_only.genesis_chain_id, 1);
		assert_eq!(committee_only.committees, vec![2]);
		assert!(committee_only.is_committee_only());
		assert_eq!(committee_only.peer_node, Some(4));
		assert_eq!(committee_only.root_chain_node, Some(1));

		// Its account lands in the target chain.
		assert!(plan.accounts[&2]
			.iter()
			.any(|account| account.address == committee_only.address));
		assert!(plan.accounts.get(&1).is_none_or(|accounts| accounts
			.iter()
			.all(|account| account.address != committee_only.address)));
	}

	#[tokio::test]
	async fn delegators_use_negative_ids_and_hold_no_pointers() {
		let mut root = chain(1, 1, 1);
		root.delegators.count = 2;
		root.delegators.staked_amount = 500;
		root.delegators.amount = 50;
		let profile = profile(vec![("chain_1", root)], 1);
		let plan = plan(&profile).await.unwrap();

		assert_eq!(
			plan.identities.iter().map(|identity| identity.id).collect::<Vec<_>>(),
			vec![-2, -1, 1]
		);
		for delegator in plan.identities.iter().filter(|identity| identity.is_delegate) {
			assert_eq!(delegator.node_type, NodeType::Delegator);
			assert_eq!(delegator.net_address, None);
			assert_eq!(delegator.root_chain_node, None);
			assert_eq!(delegator.peer_node, None);
		}
	}

	#[tokio::test]
	async fn full_nodes_balance_across_root_validators() {
		let mut root = chain(1, 1, 3);
		root.full_nodes.count = 7;
		root.full_nodes.amount = 10;
		let profile = profile(vec![("chain_1", root)], 10);
		let plan = plan(&profile).await.unwrap();

		let mut per_validator: HashMap<NodeId, u64> = HashMap::new();
		for full_node in plan.identities.iter().filter(|identity| identity.is_full_node()) {
			assert_eq!(full_node.staked_amount, 0);
			*per_validator.entry(full_node.peer_node.unwrap()).or_default() += 1;
		}
		// Counters were pre-seeded with one self-pointer per validator, so
		// the seven picks land 3/2/2 at most.
		let max = per_validator.values().copied().max().unwrap();
		let min = per_validator.values().copied().min().unwrap();
		assert!(max - min <= 1, "unbalanced peer assignment: {per_validator:?}");
	}

	#[tokio::test]
	async fn nested_full_nodes_fall_back_to_committee_only_peers() {
		let mut root = chain(1, 1, 2);
		root.committees.push(committee(2, 0, 0, 1, 0));
		let mut nested = chain(2, 1, 0);
		nested.full_nodes.count = 2;
		nested.full_nodes.amount = 10;
		let profile = profile(vec![("chain_1", root), ("chain_2", nested)], 5);
		let plan = plan(&profile).await.unwrap();

		let committee_only = plan
			.identities
			.iter()
			.find(|identity| identity.is_committee_only())
			.unwrap()
			.id;
		for full_node in plan.identities.iter().filter(|identity| identity.is_full_node()) {
			assert_eq!(full_node.peer_node, Some(committee_only));
			assert_eq!(full_node.root_chain_node.map(|id| id > 0), Some(true));
		}
	}

	#[tokio::test]
	async fn tally_cross_check_rejects_a_lying_profile() {
		// Bypass profile validation on purpose: the planner re-checks.
		let profile = profile(vec![("chain_1", chain(1, 1, 2))], 3);
		let err = plan(&profile).await.unwrap_err();
		assert!(
			err.to_string()
				.contains("total entries (2) does not equal nodes.count (3)"),
			"{err}"
		);
	}

	#[tokio::test]
	async fn pointer_and_uniqueness_invariants_hold_on_a_busy_profile() {
		let mut root = chain(1, 1, 3);
		root.full_nodes.count = 1;
		root.full_nodes.amount = 10;
		root.delegators.count = 2;
		root.delegators.staked_amount = 500;
		root.delegators.amount = 50;
		root.committees.push(committee(2, 2, 1, 1, 1));
		root.committees.push(committee(3, 1, 0, 0, 0));
		let mut nested = chain(2, 1, 1);
		nested.full_nodes.count = 1;
		nested.full_nodes.amount = 10;
		let profile = profile(
			vec![("chain_1", root), ("chain_2", nested), ("chain_3", chain(3, 1, 0))],
			10,
		);
		profile.validate().unwrap();
		let plan = plan(&profile).await.unwrap();

		// Global id uniqueness, including expanded and negative ids.
		let mut ids: Vec<_> = plan.identities.iter().map(|identity| identity.id).collect();
		ids.sort_unstable();
		ids.dedup();
		assert_eq!(ids.len(), plan.identities.len());
		assert_eq!(
			plan.identities.iter().filter(|identity| identity.id > 0).count(),
			10
		);

		// No two entries share (chain, address) outside the delegator set.
		let mut placements: Vec<_> = plan
			.identities
			.iter()
			.filter(|identity| !identity.is_delegate)
			.map(|identity| (identity.chain_id, identity.address.clone()))
			.collect();
		placements.sort();
		placements.dedup();
		assert_eq!(
			placements.len(),
			plan.identities.iter().filter(|identity| !identity.is_delegate).count()
		);

		// Pointers resolve to validators on the right chains.
		let validators: HashMap<NodeId, (ChainId, ChainId)> = plan
			.identities
			.iter()
			.filter(|identity| identity.is_validator())
			.map(|identity| (identity.id, (identity.chain_id, identity.root_chain_id)))
			.collect();
		for identity in plan.identities.iter().filter(|identity| !identity.is_delegate) {
			let (root_chain, _) = validators[&identity.root_chain_node.unwrap()];
			assert_eq!(root_chain, identity.root_chain_id, "node {}", identity.id);

			let (peer_chain, _) = validators[&identity.peer_node.unwrap()];
			if identity.is_full_node() && identity.chain_id == identity.root_chain_id {
				assert_eq!(peer_chain, identity.root_chain_id, "node {}", identity.id);
			} else {
				assert_eq!(peer_chain, identity.chain_id, "node {}", identity.id);
			}
		}
	}

	#[tokio::test]
	async fn filler_accounts_are_deterministic() {
		let mut root = chain(1, 1, 1);
		root.accounts.count = 3;
		root.accounts.amount = 42;
		let profile = profile(vec![("chain_1", root)], 1);
		let plan = plan(&profile).await.unwrap();

		let fillers: Vec<_> = plan.accounts[&1]
			.iter()
			.filter(|account| account.amount == 42)
			.map(|account| account.address.clone())
			.collect();
		assert_eq!(
			fillers,
			vec![
				"00000000000000000001".to_string(),
				"00000000000000000002".to_string(),
				"00000000000000000003".to_string(),
			]
		);
	}
}
