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

//! Projects an artifact tree onto a namespace: per-kind config maps keyed by
//! chain, the global identity index, and one RPC load balancer per chain.
//! Config maps are upserted; services are create-only, so a re-run against an
//! unclean namespace surfaces AlreadyExists.

use std::{
	collections::{BTreeMap, BTreeSet, HashMap},
	fs,
	path::{Path, PathBuf},
};

use anyhow::Context;
use k8s_openapi::{
	api::core::v1::{ConfigMap, Service, ServicePort, ServiceSpec},
	apimachinery::pkg::{apis::meta::v1::ObjectMeta, util::intstr::IntOrString},
};
use kube::{
	api::{Api, PostParams},
	Client,
};
use serde::Deserialize;

use crate::settings::ApplierOptions;

/// Pod label the per-pod init container sets to its chain id; the services
/// select on it.
pub const CHAIN_ID_LABEL: &str = "chain-id";

pub const RPC_PORT_NAME: &str = "rpc";

/// The node RPC port, by convention.
pub const RPC_TARGET_PORT: i32 = 50002;

/// Per-chain artifact kinds, each grouped into one config map.
pub const FILE_KINDS: [&str; 3] = ["genesis", "config", "keystore"];

pub const IDS_CONFIG_MAP: &str = "ids";
pub const IDS_FILE: &str = "ids.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDir {
	pub chain_id: u64,
	pub path: PathBuf,
}

/// Sub-directories named `chain_<digits>`, in lexicographic name order.
pub fn discover_chain_dirs(root: &Path) -> anyhow::Result<Vec<ChainDir>> {
	let pattern = regex::Regex::new(r"^chain_(\d+)$").expect("valid chain dir pattern");
	let mut names = Vec::new();
	for entry in
		fs::read_dir(root).with_context(|| format!("reading {}", root.display()))?
	{
		let entry = entry?;
		if !entry.file_type()?.is_dir() {
			continue;
		}
		let name = entry.file_name().to_string_lossy().into_owned();
		if let Some(captures) = pattern.captures(&name) {
			let chain_id = captures[1]
				.parse::<u64>()
				.with_context(|| format!("chain id in directory name {name}"))?;
			names.push((name, ChainDir { chain_id, path: entry.path() }));
		}
	}
	names.sort_by(|(a, _), (b, _)| a.cmp(b));
	Ok(names.into_iter().map(|(_, dir)| dir).collect())
}

/// Pretty-printing a file validates its JSON as a side effect.
fn read_pretty_json(path: &Path) -> anyhow::Result<String> {
	let value: serde_json::Value =
		serde_json::from_slice(&fs::read(path).with_context(|| format!("reading {}", path.display()))?)
			.with_context(|| format!("{} is not valid json", path.display()))?;
	Ok(serde_json::to_string_pretty(&value)?)
}

/// One config map's worth of data for a file kind: `<kind>_<chainId>.json`
/// per chain.
pub fn config_map_data(
	kind: &str,
	chains: &[ChainDir],
) -> anyhow::Result<BTreeMap<String, String>> {
	chains
		.iter()
		.map(|chain| {
			Ok((
				format!("{kind}_{}.json", chain.chain_id),
				read_pretty_json(&chain.path.join(format!("{kind}.json")))?,
			))
		})
		.collect()
}

pub fn config_map(name: &str, data: BTreeMap<String, String>) -> ConfigMap {
	ConfigMap {
		metadata: ObjectMeta { name: Some(name.to_string()), ..Default::default() },
		data: Some(data),
		..Default::default()
	}
}

/// Create, or on AlreadyExists overwrite the whole `.data` of the existing
/// map.
pub async fn upsert_config_map(
	api: &Api<ConfigMap>,
	config_map: ConfigMap,
) -> anyhow::Result<()> {
	let name = config_map.metadata.name.clone().expect("config maps are always named");
	match api.create(&PostParams::default(), &config_map).await {
		Ok(_) => {
			tracing::info!("created config map {name}");
			Ok(())
		},
		Err(kube::Error::Api(err)) if err.code == 409 => {
			let mut existing = api.get(&name).await?;
			existing.data = config_map.data;
			api.replace(&name, &PostParams::default(), &existing).await?;
			tracing::info!("updated config map {name}");
			Ok(())
		},
		Err(err) => Err(err).with_context(|| format!("creating config map {name}")),
	}
}

#[derive(Deserialize)]
struct IdsFile {
	keys: HashMap<String, IdsEntry>,
}

#[derive(Deserialize)]
struct IdsEntry {
	#[serde(rename = "chainId")]
	chain_id: u64,
}

/// The distinct chain ids in use, read from the identity index.
pub fn chain_ids(ids_json: &str) -> anyhow::Result<Vec<u64>> {
	let ids: IdsFile = serde_json::from_str(ids_json).context("parsing ids.json")?;
	Ok(ids
		.keys
		.values()
		.map(|entry| entry.chain_id)
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect())
}

pub fn service_name(chain_id: u64) -> String {
	format!("rpc-lb-chain-{chain_id}")
}

pub fn rpc_service(chain_id: u64, start_port: i32) -> Service {
	Service {
		metadata: ObjectMeta {
			name: Some(service_name(chain_id)),
			labels: Some(BTreeMap::from([("type".to_string(), "chain".to_string())])),
			..Default::default()
		},
		spec: Some(ServiceSpec {
			type_: Some("LoadBalancer".to_string()),
			selector: Some(BTreeMap::from([
				("app".to_string(), "node".to_string()),
				(CHAIN_ID_LABEL.to_string(), chain_id.to_string()),
			])),
			ports: Some(vec![ServicePort {
				name: Some(RPC_PORT_NAME.to_string()),
				port: start_port + chain_id as i32,
				target_port: Some(IntOrString::Int(RPC_TARGET_PORT)),
				..Default::default()
			}]),
			..Default::default()
		}),
		..Default::default()
	}
}

/// Applies one artifact tree: upserts the four config maps, then creates the
/// per-chain services. A single failure aborts the remaining sequence.
pub async fn apply(
	client: Client,
	opts: &ApplierOptions,
	root: &Path,
	chains: &[ChainDir],
) -> anyhow::Result<()> {
	let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), &opts.namespace);

	for kind in FILE_KINDS {
		let data = config_map_data(kind, chains)?;
		tracing::info!("config map {kind}: {} entries", data.len());
		upsert_config_map(&config_maps, config_map(kind, data)).await?;
	}

	let ids_json = read_pretty_json(&root.join(IDS_FILE))?;
	let chain_ids = chain_ids(&ids_json)?;
	upsert_config_map(
		&config_maps,
		config_map(IDS_CONFIG_MAP, BTreeMap::from([(IDS_FILE.to_string(), ids_json)])),
	)
	.await?;

	let services: Api<Service> = Api::namespaced(client, &opts.namespace);
	for chain_id in chain_ids {
		let name = service_name(chain_id);
		services
			.create(&PostParams::default(), &rpc_service(chain_id, opts.start_port))
			.await
			.with_context(|| format!("creating service {name}"))?;
		tracing::info!(
			"created service {name}: port {} -> {RPC_TARGET_PORT}",
			opts.start_port + chain_id as i32
		);
	}

	Ok(())
}
