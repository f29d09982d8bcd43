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

//! Implements the server configuration file.
//!
//! Zones are populated programmatically (there is no zone-file
//! parser), so the configuration file carries the records inline:
//!
//! ```toml
//! bind = "127.0.0.1:9091"
//! udp-workers = 4
//!
//! [[zone]]
//! name = "example.com."
//!
//! [[zone.record]]
//! owner = "example.com."
//! type = "A"
//! ttl = 300
//! data = "192.0.2.1"
//!
//! [[zone.record]]
//! owner = "example.com."
//! type = "MX"
//! ttl = 300
//! data = "10 mail.example.com."
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::Deserialize;

use arbor::class::Class;
use arbor::name::Name;
use arbor::rr::{Rdata, Record, Ttl, Type};
use arbor::zone::{DictBackend, Zone};

////////////////////////////////////////////////////////////////////////
// CONFIGURATION STRUCTURE AND LOADING                                //
////////////////////////////////////////////////////////////////////////

/// The parsed configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    #[serde(default = "default_udp_workers")]
    pub udp_workers: usize,

    #[serde(default, rename = "zone")]
    pub zones: Vec<ZoneConfig>,
}

/// The configuration of a single zone.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub name: String,

    #[serde(default, rename = "record")]
    pub records: Vec<RecordConfig>,
}

/// The configuration of a single record within a zone.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordConfig {
    pub owner: String,

    #[serde(rename = "type")]
    pub rr_type: String,

    #[serde(default = "default_ttl")]
    pub ttl: u32,

    #[serde(default = "default_class")]
    pub class: String,

    pub data: String,
}

fn default_bind() -> SocketAddr {
    "127.0.0.1:9091".parse().unwrap()
}

fn default_udp_workers() -> usize {
    4
}

fn default_ttl() -> u32 {
    3600
}

fn default_class() -> String {
    "IN".to_owned()
}

/// Loads the server configuration from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = fs::read_to_string(path.as_ref())
        .context("failed to read the configuration file")?;
    let config: Config =
        toml::from_str(&raw_config).context("failed to parse the configuration file")?;
    debug!(
        "configuration loaded: bind address {}, {} UDP workers, {} zones",
        config.bind,
        config.udp_workers,
        config.zones.len()
    );
    Ok(config)
}

////////////////////////////////////////////////////////////////////////
// ZONE CONSTRUCTION                                                  //
////////////////////////////////////////////////////////////////////////

/// Builds the configured zones.
pub fn build_zones(config: &Config) -> Result<Vec<Zone>> {
    config.zones.iter().map(build_zone).collect()
}

fn build_zone(zone_config: &ZoneConfig) -> Result<Zone> {
    let context: Name = zone_config
        .name
        .parse()
        .map_err(|e| anyhow!("invalid zone name {:?}: {}", zone_config.name, e))?;
    let mut backend = DictBackend::new(context.clone());
    for record_config in &zone_config.records {
        let record = build_record(record_config)
            .with_context(|| format!("in zone {}", context))?;
        backend
            .add(record)
            .map_err(|e| anyhow!("cannot add record at {}: {}", record_config.owner, e))?;
    }
    Ok(Zone::with_dict(backend))
}

fn build_record(record_config: &RecordConfig) -> Result<Record> {
    let owner: Name = record_config
        .owner
        .parse()
        .map_err(|e| anyhow!("invalid owner {:?}: {}", record_config.owner, e))?;
    let rr_type: Type = record_config
        .rr_type
        .parse()
        .map_err(|e| anyhow!("invalid type {:?}: {}", record_config.rr_type, e))?;
    let class: Class = record_config
        .class
        .parse()
        .map_err(|e| anyhow!("invalid class {:?}: {}", record_config.class, e))?;
    let rdata = parse_rdata(rr_type, &record_config.data)
        .with_context(|| format!("invalid {} data {:?}", rr_type, record_config.data))?;
    Ok(Record {
        owner,
        class,
        ttl: Ttl::from(record_config.ttl),
        rdata,
    })
}

/// Parses the textual RDATA of a configured record.
fn parse_rdata(rr_type: Type, data: &str) -> Result<Rdata> {
    match rr_type {
        Type::A => Ok(Rdata::a(data.parse()?)),
        Type::AAAA => Ok(Rdata::aaaa(data.parse()?)),
        Type::CNAME => Ok(Rdata::Cname(parse_name(data)?)),
        Type::NS => Ok(Rdata::Ns(parse_name(data)?)),
        Type::PTR => Ok(Rdata::Ptr(parse_name(data)?)),
        Type::MX => {
            let (preference, exchanger) = data
                .split_once(' ')
                .ok_or_else(|| anyhow!("expected \"<preference> <exchanger>\""))?;
            Ok(Rdata::Mx {
                preference: preference.parse()?,
                exchanger: parse_name(exchanger)?,
            })
        }
        Type::SOA => {
            let fields: Vec<&str> = data.split_whitespace().collect();
            let &[mname, rname, serial, refresh, retry, expire, minimum] = fields.as_slice()
            else {
                return Err(anyhow!(
                    "expected \"<mname> <rname> <serial> <refresh> <retry> <expire> <minimum>\""
                ));
            };
            Ok(Rdata::Soa {
                mname: parse_name(mname)?,
                rname: parse_name(rname)?,
                serial: serial.parse()?,
                refresh: refresh.parse()?,
                retry: retry.parse()?,
                expire: expire.parse()?,
                minimum: minimum.parse()?,
            })
        }
        Type::TXT => {
            // The configured string becomes a single
            // <character-string>.
            if data.len() > 255 {
                return Err(anyhow!("TXT data is limited to 255 octets"));
            }
            let mut octets = Vec::with_capacity(1 + data.len());
            octets.push(data.len() as u8);
            octets.extend_from_slice(data.as_bytes());
            Ok(Rdata::Txt(octets.into()))
        }
        _ => Err(anyhow!("type {} cannot be configured", rr_type)),
    }
}

fn parse_name(text: &str) -> Result<Name> {
    text.parse()
        .map_err(|e| anyhow!("invalid domain name {:?}: {}", text, e))
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
