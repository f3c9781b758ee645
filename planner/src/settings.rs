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

//! Generator command line options and catalog loading. The profile catalog is
//! one YAML file of named profiles; a separate optional YAML file carries
//! shared accounts that are replicated into every chain.

use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use clap::Parser;
use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::{
	crypto,
	error::{Error, Result},
	profile::AppConfig,
};

/// Base name of the profile catalog inside the catalog directory; the
/// extension is resolved by the config loader.
pub const PROFILE_CATALOG_BASENAME: &str = "profiles";

/// Shared-accounts file inside the catalog directory. Missing is fine.
pub const SHARED_ACCOUNTS_FILE: &str = "accounts.yaml";

#[derive(Parser, Debug, Clone)]
pub struct GeneratorOptions {
	/// Profile to select from the catalog (case-insensitive).
	#[clap(long = "config", default_value = "default")]
	pub config: String,

	/// Directory holding the profile catalog.
	#[clap(long = "path", default_value = ".")]
	pub path: PathBuf,

	/// Artifact output root. Recreated empty on every run.
	#[clap(long = "output", default_value = "./artifacts")]
	pub output: PathBuf,
}

/// Loads the catalog from `<dir>/profiles.{yaml,...}` and selects one profile
/// by name, case-insensitively.
pub fn load_profile(dir: &Path, name: &str) -> Result<AppConfig> {
	let catalog_path = dir.join(PROFILE_CATALOG_BASENAME);
	let catalog: BTreeMap<String, AppConfig> = Config::builder()
		.add_source(File::with_name(&catalog_path.to_string_lossy()))
		.build()?
		.try_deserialize()?;

	let wanted = name.to_lowercase();
	catalog
		.into_iter()
		.find(|(profile_name, _)| profile_name.to_lowercase() == wanted)
		.map(|(_, profile)| profile)
		.ok_or_else(|| {
			Error::Profile(format!(
				"profile {name} not found in {}",
				catalog_path.display()
			))
		})
}

/// A pre-existing identity replicated across every chain's accounts and
/// keystore.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAccount {
	pub address: String,
	pub public_key: String,
	pub private_key: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	#[serde(skip)]
	pub private_key_raw: Vec<u8>,
}

pub type SharedAccounts = BTreeMap<String, SharedAccount>;

#[derive(Debug, Default, Deserialize)]
struct SharedAccountsFile {
	#[serde(default)]
	accounts: SharedAccounts,
}

/// Loads `<dir>/accounts.yaml`. A missing file is equivalent to an empty map;
/// private keys are hex-decoded eagerly so malformed material fails the run
/// before any artifact is written.
pub fn load_shared_accounts(dir: &Path) -> Result<SharedAccounts> {
	let path = dir.join(SHARED_ACCOUNTS_FILE);
	let raw = match std::fs::read_to_string(&path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound =>
			return Ok(SharedAccounts::default()),
		Err(err) => return Err(err.into()),
	};
	let mut accounts = serde_yaml::from_str::<SharedAccountsFile>(&raw)?.accounts;
	for (name, account) in &mut accounts {
		account.private_key_raw =
			crypto::decode_hex(&format!("shared account {name} privateKey"), &account.private_key)?;
	}
	Ok(accounts)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn write_catalog(dir: &Path, contents: &str) {
		let mut file = std::fs::File::create(dir.join("profiles.yaml")).unwrap();
		file.write_all(contents.as_bytes()).unwrap();
	}

	const CATALOG: &str = r#"
default:
  general:
    concurrency: 4
    password: secret
  nodes:
    count: 2
  chains:
    chain_1:
      id: 1
      root_chain: 1
      validators:
        count: 2
        staked_amount: 1000000
        amount: 100
Big:
  nodes:
    count: 1
  chains:
    chain_1:
      id: 1
      root_chain: 1
      validators:
        count: 1
"#;

	#[test]
	fn selects_profile_case_insensitively() {
		let dir = tempfile::TempDir::new().unwrap();
		write_catalog(dir.path(), CATALOG);

		let profile = load_profile(dir.path(), "DEFAULT").unwrap();
		assert_eq!(profile.general.concurrency, 4);
		assert_eq!(profile.general.password, "secret");
		assert_eq!(profile.nodes.count, 2);
		assert_eq!(profile.chains["chain_1"].validators.count, 2);

		let other = load_profile(dir.path(), "big").unwrap();
		assert_eq!(other.nodes.count, 1);
	}

	#[test]
	fn unknown_profile_is_a_profile_error() {
		let dir = tempfile::TempDir::new().unwrap();
		write_catalog(dir.path(), CATALOG);
		let err = load_profile(dir.path(), "nope").unwrap_err();
		assert!(matches!(err, Error::Profile(_)), "{err}");
	}

	#[test]
	fn missing_shared_accounts_file_is_empty() {
		let dir = tempfile::TempDir::new().unwrap();
		assert!(load_shared_accounts(dir.path()).unwrap().is_empty());
	}

	#[test]
	fn shared_accounts_decode_private_keys() {
		let dir = tempfile::TempDir::new().unwrap();
		std::fs::write(
			dir.path().join(SHARED_ACCOUNTS_FILE),
			r#"
accounts:
  faucet:
    address: aabbcc
    publicKey: ddeeff
    privateKey: "00112233"
"#,
		)
		.unwrap();

		let accounts = load_shared_accounts(dir.path()).unwrap();
		assert_eq!(accounts["faucet"].private_key_raw, vec![0x00, 0x11, 0x22, 0x33]);
	}

	#[test]
	fn corrupt_shared_accounts_fail() {
		let dir = tempfile::TempDir::new().unwrap();
		std::fs::write(
			dir.path().join(SHARED_ACCOUNTS_FILE),
			"accounts:\n  broken:\n    address: a\n    publicKey: b\n    privateKey: zz\n",
		)
		.unwrap();
		assert!(load_shared_accounts(dir.path()).is_err());
	}
}
