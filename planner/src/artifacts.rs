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

//! The on-disk artifact tree: one directory per chain with genesis, node
//! config template and keystore, plus the global identity index. The tree is
//! recreated empty on every run so no prior artifacts leak into the next.

use std::{
	collections::BTreeMap,
	fs,
	fs::File,
	io::{BufWriter, Write as _},
	path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use crate::{
	crypto,
	crypto::EncryptedKey,
	error::Result,
	genesis::{genesis_accounts, write_genesis},
	identity::NodeIdentity,
	planner::Plan,
	profile::{AppConfig, ChainConfig},
	settings::SharedAccounts,
};

/// Placeholder substituted with the pod's node id by the init container.
pub const NODE_ID_SENTINEL: &str = "NODE_ID";

/// Placeholder substituted with the pod's root-chain node id.
pub const ROOT_NODE_ID_SENTINEL: &str = "ROOT_NODE_ID";

pub const GENESIS_FILE: &str = "genesis.json";
pub const CONFIG_FILE: &str = "config.json";
pub const KEYSTORE_FILE: &str = "keystore.json";
pub const IDS_FILE: &str = "ids.json";

/// Writes the whole artifact tree for one profile and returns its root.
pub fn emit(
	output_root: &Path,
	profile_name: &str,
	profile: &AppConfig,
	plan: &Plan,
	shared: &SharedAccounts,
) -> Result<PathBuf> {
	let root = output_root.join(profile_name);
	if root.exists() {
		fs::remove_dir_all(&root)?;
	}
	fs::create_dir_all(&root)?;

	for (name, chain) in &profile.chains {
		let dir = root.join(name);
		fs::create_dir_all(&dir)?;

		let accounts = genesis_accounts(chain, plan, shared);
		write_genesis(
			&dir.join(GENESIS_FILE),
			chain,
			plan,
			&accounts,
			profile.general.pretty_json,
		)?;
		write_json(
			&dir.join(CONFIG_FILE),
			&node_config(chain, profile),
			profile.general.pretty_json,
		)?;
		write_json(
			&dir.join(KEYSTORE_FILE),
			&keystore(chain, plan, shared, &profile.general.password)?,
			profile.general.pretty_json,
		)?;
		tracing::info!("chain {name}: wrote genesis, config and keystore");
	}

	write_json(
		&root.join(IDS_FILE),
		&ids_index(plan, shared),
		profile.general.pretty_json,
	)?;
	tracing::info!("wrote {} under {}", IDS_FILE, root.display());
	Ok(root)
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
	let mut writer = BufWriter::new(File::create(path)?);
	if pretty {
		serde_json::to_writer_pretty(&mut writer, value)?;
	} else {
		serde_json::to_writer(&mut writer, value)?;
	}
	writer.flush()?;
	Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeConfig {
	log_level: &'static str,
	node_id: &'static str,
	chain_id: u64,
	root_chain_id: u64,
	rpc_port: u16,
	admin_port: u16,
	wallet_port: u16,
	explorer_port: u16,
	metrics_port: u16,
	store_path: String,
	in_memory: bool,
	listen_address: &'static str,
	external_address: String,
	root_chain_url: String,
	max_inbound_peers: u32,
	max_outbound_peers: u32,
	minimum_peers_to_start: u32,
	gossip_threshold: u32,
	propose_vote_timeout_ms: u64,
	election_timeout_ms: u64,
	mempool_max_bytes: u64,
	mempool_max_count: u64,
	sleep_until: i64,
}

/// Root chains run a more generous propose-vote timeout than nested ones.
const ROOT_PROPOSE_VOTE_TIMEOUT_MS: u64 = 4000;
const NESTED_PROPOSE_VOTE_TIMEOUT_MS: u64 = 3000;

fn node_config(chain: &ChainConfig, profile: &AppConfig) -> NodeConfig {
	let suffix = &profile.general.net_suffix;
	NodeConfig {
		log_level: "info",
		node_id: NODE_ID_SENTINEL,
		chain_id: chain.id,
		root_chain_id: chain.root_chain,
		rpc_port: 50002,
		admin_port: 50003,
		wallet_port: 50001,
		explorer_port: 50000,
		metrics_port: 9090,
		store_path: format!("/data/node-{NODE_ID_SENTINEL}"),
		in_memory: chain.in_memory,
		listen_address: "tcp://0.0.0.0:9001",
		external_address: format!("tcp://node-{NODE_ID_SENTINEL}{suffix}"),
		root_chain_url: format!("tcp://node-{ROOT_NODE_ID_SENTINEL}{suffix}"),
		max_inbound_peers: chain.max_inbound_peers,
		max_outbound_peers: chain.max_outbound_peers,
		minimum_peers_to_start: chain.minimum_peers_to_start,
		gossip_threshold: chain.gossip_threshold,
		propose_vote_timeout_ms: if chain.is_root() {
			ROOT_PROPOSE_VOTE_TIMEOUT_MS
		} else {
			NESTED_PROPOSE_VOTE_TIMEOUT_MS
		},
		election_timeout_ms: 5000,
		mempool_max_bytes: chain.mempool_max_bytes,
		mempool_max_count: chain.mempool_max_count,
		sleep_until: if chain.sleep_until > 0 {
			Utc::now().timestamp() + chain.sleep_until
		} else {
			0
		},
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Keystore {
	address_map: BTreeMap<String, EncryptedKey>,
	nickname_map: BTreeMap<String, String>,
}

/// Keystore for one chain: every resident identity plus every shared account,
/// sealed under the shared passphrase.
fn keystore(
	chain: &ChainConfig,
	plan: &Plan,
	shared: &SharedAccounts,
	password: &str,
) -> Result<Keystore> {
	let mut address_map = BTreeMap::new();
	let mut nickname_map = BTreeMap::new();

	for identity in plan.residents(chain.id) {
		address_map.insert(
			identity.address.clone(),
			crypto::encrypt_key(password, &identity.public_key_raw, &identity.private_key_raw)?,
		);
		nickname_map.insert(identity.nickname(), identity.address.clone());
	}
	for (name, account) in shared {
		let public_key = crypto::decode_hex("publicKey", &account.public_key)?;
		address_map.insert(
			account.address.clone(),
			crypto::encrypt_key(password, &public_key, &account.private_key_raw)?,
		);
		nickname_map.insert(name.clone(), account.address.clone());
	}

	Ok(Keystore { address_map, nickname_map })
}

#[derive(Debug, Serialize)]
struct IdsIndex<'a> {
	#[serde(rename = "main-accounts", skip_serializing_if = "BTreeMap::is_empty")]
	main_accounts: &'a SharedAccounts,
	keys: BTreeMap<String, &'a NodeIdentity>,
}

/// The global identity index. Delegators are excluded: they never appear in
/// peer dial lists and pods are not named after them.
fn ids_index<'a>(plan: &'a Plan, shared: &'a SharedAccounts) -> IdsIndex<'a> {
	IdsIndex {
		main_accounts: shared,
		keys: plan
			.identities
			.iter()
			.filter(|identity| !identity.is_delegate)
			.map(|identity| (identity.nickname(), identity))
			.collect(),
	}
}
