// Copyright 2024 Txbuilder Developers

// This file is part of Txbuilder

// Txbuilder is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Txbuilder is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
// General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Txbuilder. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use std::error::Error;
use std::io::Read;

mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    let args = cli::Cli::parse();

    setup_logging()?;

    let config = config::load_config_from_file(args.config_file).unwrap_or_default();
    let builder_config = config::get_builder_config(config)?;
    log::debug!("Using builder config {:?}", builder_config);

    let request = read_request(args.request)?;

    match txbuilder::build(&request, &builder_config) {
        Ok(response) => {
            println!("{}", serde_json::to_string(&response)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to build transaction: {}", e);
            Err(e.into())
        }
    }
}

fn read_request(path: Option<std::path::PathBuf>) -> Result<String, Box<dyn Error>> {
    let mut contents = String::new();
    match path {
        Some(path) => {
            std::fs::File::open(path)?.read_to_string(&mut contents)?;
        }
        None => {
            std::io::stdin().read_to_string(&mut contents)?;
        }
    }
    Ok(contents)
}

fn setup_logging() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    Ok(())
}
