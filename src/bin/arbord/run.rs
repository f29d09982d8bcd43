// Copyright 2025 the arbor developers.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements the `run` subcommand.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use arbor::io::{BlockingIoConfig, BlockingIoProvider};
use arbor::server::Server;

use crate::args::RunArgs;
use crate::config;

/// Runs the server with the given arguments. This only returns if
/// serving fails.
pub fn run(args: RunArgs) -> Result<()> {
    let cfg = config::load_from_path(&args.config)?;

    // Command-line overrides win over the configuration file.
    let bind = args.bind.unwrap_or_else(|| {
        SocketAddr::new(
            args.ip.unwrap_or_else(|| cfg.bind.ip()),
            args.port.unwrap_or_else(|| cfg.bind.port()),
        )
    });

    let zones = config::build_zones(&cfg)?;
    for zone in &zones {
        info!("loaded zone {}", zone.context());
    }
    let server = Arc::new(Server::new(zones));

    let io_config = BlockingIoConfig {
        udp_workers: cfg.udp_workers,
    };
    let provider = BlockingIoProvider::bind(io_config, bind)
        .with_context(|| format!("failed to bind {}", bind))?;
    provider.serve(server).context("serving failed")?;
    Ok(())
}
