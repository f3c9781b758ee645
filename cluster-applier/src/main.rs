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

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kube::{
	config::{KubeConfigOptions, Kubeconfig},
	Client, Config,
};
use settings::ApplierOptions;

mod apply;
mod settings;

#[tokio::main]
async fn main() {
	tracing_subscriber::FmtSubscriber::builder()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init()
		.expect("setting default subscriber failed");

	std::process::exit(match run(ApplierOptions::parse()).await {
		Ok(_) => 0,
		Err(err) => {
			tracing::error!("{err:#}");
			1
		},
	})
}

async fn run(opts: ApplierOptions) -> anyhow::Result<()> {
	let root = opts.path.join(&opts.config);
	let chains =
		if root.is_dir() { apply::discover_chain_dirs(&root)? } else { Vec::new() };
	if chains.is_empty() {
		tracing::warn!("no chain directories found under {}, nothing to apply", root.display());
		return Ok(())
	}
	tracing::info!(
		"applying {} chains from {} to namespace {}",
		chains.len(),
		root.display(),
		opts.namespace
	);

	let client = client(&opts).await?;
	tokio::time::timeout(
		Duration::from_secs(opts.timeout),
		apply::apply(client, &opts, &root, &chains),
	)
	.await
	.context("kubernetes session timed out")?
}

async fn client(opts: &ApplierOptions) -> anyhow::Result<Client> {
	let kubeconfig_path = opts.kubeconfig_path();
	let kubeconfig = Kubeconfig::read_from(&kubeconfig_path)
		.with_context(|| format!("reading kubeconfig {}", kubeconfig_path.display()))?;
	let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
		.await
		.context("building kubernetes client configuration")?;
	Client::try_from(config).context("creating kubernetes client")
}
