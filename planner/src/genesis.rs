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

//! Genesis composition: the validator-committee projection rules, the params
//! defaults, and the streaming writer. Genesis files can be large, so the
//! validators are streamed and the pre-serialized accounts array is spliced
//! in rather than building one in-memory tree; the optional pretty pass
//! reparses the finished file.

use std::{
	collections::HashSet,
	fs,
	fs::File,
	io::{BufWriter, Write},
	path::Path,
};

use serde::Serialize;

use crate::{
	error::Result,
	identity::NodeIdentity,
	planner::{GenesisAccount, Plan},
	profile::{ChainConfig, ChainId},
	settings::SharedAccounts,
};

/// Fixed genesis timestamp; nodes only compare it, they never schedule by it.
pub const GENESIS_TIME: &str = "2024-01-01T00:00:00Z";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenesisValidator<'a> {
	address: &'a str,
	public_key: &'a str,
	committees: Vec<ChainId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	net_address: Option<&'a str>,
	staked_amount: u64,
	output: &'a str,
	delegate: bool,
}

/// Which committees an entry advertises in the genesis of `chain_id`.
///
/// Native entries advertise everything they are staked for; committee-only
/// entries advertise their (single) target committee; any other cross-chain
/// entry collapses to just the emitting chain.
pub fn committee_projection(identity: &NodeIdentity, chain_id: ChainId) -> Vec<ChainId> {
	if identity.committees.first() == Some(&chain_id) {
		identity.committees.clone()
	} else if identity.genesis_chain_id == chain_id &&
		identity.chain_id != chain_id &&
		identity.is_committee_only()
	{
		identity.committees.clone()
	} else {
		vec![chain_id]
	}
}

fn validator_entry(identity: &NodeIdentity, chain_id: ChainId) -> GenesisValidator<'_> {
	GenesisValidator {
		address: &identity.address,
		public_key: &identity.public_key,
		committees: committee_projection(identity, chain_id),
		net_address: identity.net_address.as_deref(),
		staked_amount: identity.staked_amount,
		output: &identity.address,
		delegate: identity.is_delegate,
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisParams {
	pub consensus: ConsensusParams,
	pub validator: ValidatorParams,
	pub fee: FeeParams,
	pub governance: GovernanceParams,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusParams {
	pub block_size: u64,
	pub protocol_version: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorParams {
	pub max_committee_size: u64,
	pub max_committees: u64,
	pub unstaking_blocks: u64,
	pub max_pause_blocks: u64,
	pub double_sign_slash_percentage: u64,
	pub non_sign_slash_percentage: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeParams {
	pub send_fee: u64,
	pub stake_fee: u64,
	pub edit_stake_fee: u64,
	pub unstake_fee: u64,
	pub certificate_results_fee: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceParams {
	pub dao_reward_percentage: u64,
}

pub const DEFAULT_MAX_COMMITTEE_SIZE: u64 = 100;

impl GenesisParams {
	/// Fixed defaults; only the committee size cap is profile-tunable.
	pub fn for_chain(chain: &ChainConfig) -> Self {
		GenesisParams {
			consensus: ConsensusParams { block_size: 1_000_000, protocol_version: 1 },
			validator: ValidatorParams {
				max_committee_size: chain
					.max_committee_size
					.unwrap_or(DEFAULT_MAX_COMMITTEE_SIZE),
				max_committees: 15,
				unstaking_blocks: 2,
				max_pause_blocks: 4380,
				double_sign_slash_percentage: 10,
				non_sign_slash_percentage: 1,
			},
			fee: FeeParams {
				send_fee: 10_000,
				stake_fee: 10_000,
				edit_stake_fee: 10_000,
				unstake_fee: 10_000,
				certificate_results_fee: 0,
			},
			governance: GovernanceParams { dao_reward_percentage: 10 },
		}
	}
}

/// The chain's genesis account list: the accounts collected for the chain,
/// then genesis-validator addresses not already funded, then every shared
/// account at the chain's configured account amount.
pub fn genesis_accounts(
	chain: &ChainConfig,
	plan: &Plan,
	shared: &SharedAccounts,
) -> Vec<GenesisAccount> {
	let mut accounts = plan.accounts.get(&chain.id).cloned().unwrap_or_default();
	let mut seen: HashSet<String> =
		accounts.iter().map(|account| account.address.clone()).collect();

	for identity in plan.genesis_validators(chain.id) {
		if seen.insert(identity.address.clone()) {
			accounts.push(GenesisAccount {
				address: identity.address.clone(),
				amount: chain.validators.amount,
			});
		}
	}
	for account in shared.values() {
		if seen.insert(account.address.clone()) {
			accounts.push(GenesisAccount {
				address: account.address.clone(),
				amount: chain.accounts.amount,
			});
		}
	}
	accounts
}

pub fn write_genesis(
	path: &Path,
	chain: &ChainConfig,
	plan: &Plan,
	accounts: &[GenesisAccount],
	pretty: bool,
) -> Result<()> {
	// Accounts are serialized up front; the validators stream out one by one.
	let accounts_json = serde_json::to_vec(accounts)?;
	let params = GenesisParams::for_chain(chain);

	let mut writer = BufWriter::new(File::create(path)?);
	write!(writer, "{{\"time\":\"{GENESIS_TIME}\",\"validators\":[")?;
	for (index, identity) in plan.genesis_validators(chain.id).enumerate() {
		if index > 0 {
			writer.write_all(b",")?;
		}
		serde_json::to_writer(&mut writer, &validator_entry(identity, chain.id))?;
	}
	writer.write_all(b"],\"accounts\":")?;
	writer.write_all(&accounts_json)?;
	writer.write_all(b",\"params\":")?;
	serde_json::to_writer(&mut writer, &params)?;
	writer.write_all(b"}")?;
	writer.flush()?;

	if pretty {
		reindent(path)?;
	}
	Ok(())
}

/// Re-reads and rewrites a JSON file with two-space indentation. Doubles as a
/// well-formedness check of what was just streamed out.
pub fn reindent(path: &Path) -> Result<()> {
	let value: serde_json::Value = serde_json::from_slice(&fs::read(path)?)?;
	let mut writer = BufWriter::new(File::create(path)?);
	serde_json::to_writer_pretty(&mut writer, &value)?;
	writer.flush()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		identity::NodeType,
		testing::{chain, identity},
	};

	#[test]
	fn native_entries_advertise_all_committees() {
		let mut native = identity(1, 1, NodeType::Validator);
		native.committees = vec![1, 2, 3];
		assert_eq!(committee_projection(&native, 1), vec![1, 2, 3]);
	}

	#[test]
	fn committee_only_entries_keep_their_target() {
		let mut committee_only = identity(4, 2, NodeType::Validator);
		committee_only.committees = vec![2];
		committee_only.expanding_committees = None;
		committee_only.genesis_chain_id = 1;
		assert_eq!(committee_projection(&committee_only, 1), vec![2]);
	}

	#[test]
	fn expanded_entries_collapse_to_the_emitting_chain() {
		let mut copy = identity(4, 2, NodeType::Validator);
		copy.committees = vec![1, 2];
		copy.expanding_committees = Some(vec![2]);
		copy.genesis_chain_id = 2;
		assert_eq!(committee_projection(&copy, 2), vec![2]);
	}

	#[test]
	fn max_committee_size_is_the_only_override() {
		let mut tuned = chain(1, 1, 1);
		tuned.max_committee_size = Some(7);
		assert_eq!(GenesisParams::for_chain(&tuned).validator.max_committee_size, 7);
		assert_eq!(
			GenesisParams::for_chain(&chain(1, 1, 1)).validator.max_committee_size,
			DEFAULT_MAX_COMMITTEE_SIZE
		);
	}

	#[tokio::test]
	async fn streamed_genesis_is_valid_json() {
		let profile = crate::testing::profile(vec![("chain_1", chain(1, 1, 2))], 2);
		let plan = crate::planner::plan(&profile).await.unwrap();
		let chain = &profile.chains["chain_1"];
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("genesis.json");

		let accounts = genesis_accounts(chain, &plan, &SharedAccounts::default());
		write_genesis(&path, chain, &plan, &accounts, false).unwrap();

		let value: serde_json::Value =
			serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
		assert_eq!(value["time"], GENESIS_TIME);
		assert_eq!(value["validators"].as_array().unwrap().len(), 2);
		assert_eq!(value["accounts"].as_array().unwrap().len(), 2);
		assert_eq!(value["params"]["validator"]["maxCommitteeSize"], 100);
		for validator in value["validators"].as_array().unwrap() {
			assert_eq!(validator["delegate"], false);
			assert_eq!(validator["output"], validator["address"]);
			assert_eq!(validator["committees"], serde_json::json!([1]));
		}
	}

	#[tokio::test]
	async fn pretty_pass_reindents_the_file() {
		let profile = crate::testing::profile(vec![("chain_1", chain(1, 1, 1))], 1);
		let plan = crate::planner::plan(&profile).await.unwrap();
		let chain = &profile.chains["chain_1"];
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("genesis.json");

		let accounts = genesis_accounts(chain, &plan, &SharedAccounts::default());
		write_genesis(&path, chain, &plan, &accounts, true).unwrap();

		let raw = fs::read_to_string(&path).unwrap();
		assert!(raw.contains("\n  \"validators\""), "expected two-space indentation");
		serde_json::from_str::<serde_json::Value>(&raw).unwrap();
	}
}
