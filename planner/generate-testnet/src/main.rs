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

use anyhow::Context;
use clap::Parser;
use testnet_planner::{artifacts, planner, settings, settings::GeneratorOptions};

#[tokio::main]
async fn main() {
	tracing_subscriber::FmtSubscriber::builder()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init()
		.expect("setting default subscriber failed");

	std::process::exit(match run(GeneratorOptions::parse()).await {
		Ok(_) => 0,
		Err(err) => {
			tracing::error!("{err:#}");
			1
		},
	})
}

async fn run(opts: GeneratorOptions) -> anyhow::Result<()> {
	let profile = settings::load_profile(&opts.path, &opts.config)
		.with_context(|| format!("loading profile {} from {}", opts.config, opts.path.display()))?;
	profile.validate()?;
	profile.log_summary(&opts.config);

	let shared = settings::load_shared_accounts(&opts.path)?;
	if !shared.is_empty() {
		tracing::info!("loaded {} shared accounts", shared.len());
	}

	let plan = planner::plan(&profile).await?;
	let tree = artifacts::emit(&opts.output, &opts.config, &profile, &plan, &shared)?;
	tracing::info!("artifacts written to {}", tree.display());
	Ok(())
}
