use std::str::FromStr;

use bitcoin::{
    script::{Builder, PushBytesBuf},
    Address, AddressType, CompressedPublicKey, Network, ScriptBuf,
};

use crate::BuildError;

/// Which signing algorithm an address requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptType {
    Legacy,
    Witness(WitnessKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WitnessKind {
    PubkeyHash,
    ScriptHash,
    /// Witness program nested inside a pay-to-script-hash output.
    ScriptHashWrapped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    pub script_type: ScriptType,
    pub locking_script: ScriptBuf,
}

/// Decodes `address` for `network` and reports its script type and locking script.
///
/// Pay-to-script-hash is treated as a wrapped witness program. Everything that
/// is not a witness or script-hash address signs on the legacy path.
pub fn classify(address: &str, network: Network) -> Result<Classified, BuildError> {
    let address = parse_address(address, network)?;

    let script_type = match address.address_type() {
        Some(AddressType::P2wpkh) => ScriptType::Witness(WitnessKind::PubkeyHash),
        Some(AddressType::P2wsh) => ScriptType::Witness(WitnessKind::ScriptHash),
        Some(AddressType::P2sh) => ScriptType::Witness(WitnessKind::ScriptHashWrapped),
        _ => ScriptType::Legacy,
    };

    Ok(Classified {
        script_type,
        locking_script: address.script_pubkey(),
    })
}

/// Locking script paying to `address`.
pub fn locking_script(address: &str, network: Network) -> Result<ScriptBuf, BuildError> {
    Ok(parse_address(address, network)?.script_pubkey())
}

fn parse_address(address: &str, network: Network) -> Result<Address, BuildError> {
    Address::from_str(address)
        .map_err(|e| BuildError::InvalidAddress(format!("{}: {}", address, e)))?
        .require_network(network)
        .map_err(|e| BuildError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Parses a hex encoded locking script supplied with a spendable output.
pub fn parse_locking_script(hex: &str) -> Result<ScriptBuf, BuildError> {
    ScriptBuf::from_hex(hex).map_err(|e| BuildError::InvalidScript(format!("{}: {}", hex, e)))
}

/// The standard pay-to-witness-pubkey-hash script for `public_key`.
pub fn p2wpkh_script(public_key: &CompressedPublicKey) -> ScriptBuf {
    ScriptBuf::new_p2wpkh(&public_key.wpubkey_hash())
}

/// Unlocking script for a witness input: a single push of the P2WPKH program.
pub fn witness_unlocking_script(public_key: &CompressedPublicKey) -> Result<ScriptBuf, BuildError> {
    let program = PushBytesBuf::try_from(p2wpkh_script(public_key).into_bytes())
        .map_err(|e| BuildError::InvalidScript(format!("witness program push: {:?}", e)))?;

    Ok(Builder::new().push_slice(program).into_script())
}
