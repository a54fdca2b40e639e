use serde::Deserialize;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use std::str::FromStr;

use txbuilder::bitcoin::{transaction::Version, Amount, Network, Sequence};
use txbuilder::BuilderConfig;

#[derive(Default, Deserialize, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub builder: BuilderSection,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct NetworkConfig {
    pub network: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network: "bitcoin".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct BuilderSection {
    pub sequence: u32,
    pub version: i32,
    pub dust_floor: u64,
}

impl Default for BuilderSection {
    fn default() -> Self {
        Self {
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME.0,
            version: 1,
            dust_floor: BuilderConfig::DEFAULT_DUST_FLOOR,
        }
    }
}

pub fn load_config_from_file(path: String) -> Option<Config> {
    let contents = match read_file(&path) {
        Ok(contents) => contents,
        Err(e) => {
            log::info!("Error reading config file {}: {:?}", path, e);
            return None;
        }
    };
    match toml::from_str(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            log::info!("Error parsing config file {:?}", e);
            None
        }
    }
}

/// Turns the file settings into the builder's configuration.
pub fn get_builder_config(config: Config) -> Result<BuilderConfig, Box<dyn Error>> {
    let network = Network::from_str(&config.network.network)?;
    Ok(BuilderConfig {
        network,
        sequence: Sequence(config.builder.sequence),
        version: Version(config.builder.version),
        dust_floor: Amount::from_sat(config.builder.dust_floor),
    })
}

fn read_file(path: &str) -> Result<String, Box<dyn Error>> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}
