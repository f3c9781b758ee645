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

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct ApplierOptions {
	/// Artifact root produced by the generator.
	#[clap(long = "path", default_value = "./artifacts")]
	pub path: PathBuf,

	/// Profile sub-directory to apply.
	#[clap(long = "config", default_value = "default")]
	pub config: String,

	/// Namespace the config maps and services are created in.
	#[clap(long = "namespace", default_value = "canopy")]
	pub namespace: String,

	#[clap(long = "kubeconfig", default_value = "~/.kube/config")]
	pub kubeconfig: PathBuf,

	/// Timeout for the whole Kubernetes session, in seconds.
	#[clap(long = "timeout", default_value = "30")]
	pub timeout: u64,

	/// Base port for the per-chain load balancer services; chain N is exposed
	/// on start-port + N.
	#[clap(long = "start-port", default_value = "1000")]
	pub start_port: i32,
}

impl ApplierOptions {
	/// The kubeconfig path with a leading `~` resolved against $HOME.
	pub fn kubeconfig_path(&self) -> PathBuf {
		match self.kubeconfig.strip_prefix("~") {
			Ok(rest) => match std::env::var_os("HOME") {
				Some(home) => PathBuf::from(home).join(rest),
				None => self.kubeconfig.clone(),
			},
			Err(_) => self.kubeconfig.clone(),
		}
	}
}
