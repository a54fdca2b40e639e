//! Omni layer "simple send" payloads embedded in null-data outputs.

use bitcoin::{
    opcodes::all::OP_RETURN,
    script::{Builder, PushBytesBuf},
    Amount, TxOut,
};

use crate::BuildError;

/// ASCII "omni".
pub const OMNI_MARKER: [u8; 4] = *b"omni";
pub const PAYLOAD_VERSION: u16 = 0;
pub const TX_TYPE_SIMPLE_SEND: u16 = 0;
pub const PAYLOAD_LEN: usize = 20;

/// Encodes a simple-send payload: marker, version, type, currency id, amount.
/// Integers are big endian.
pub fn encode_aux_data(currency_id: u32, amount: u64) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[0..4].copy_from_slice(&OMNI_MARKER);
    payload[4..6].copy_from_slice(&PAYLOAD_VERSION.to_be_bytes());
    payload[6..8].copy_from_slice(&TX_TYPE_SIMPLE_SEND.to_be_bytes());
    payload[8..12].copy_from_slice(&currency_id.to_be_bytes());
    payload[12..20].copy_from_slice(&amount.to_be_bytes());
    payload
}

/// Zero value `OP_RETURN <payload>` output.
pub fn aux_output(currency_id: u32, amount: u64) -> Result<TxOut, BuildError> {
    let data = PushBytesBuf::try_from(encode_aux_data(currency_id, amount).to_vec())
        .map_err(|e| BuildError::InvalidScript(format!("omni payload push: {:?}", e)))?;

    Ok(TxOut {
        value: Amount::ZERO,
        script_pubkey: Builder::new()
            .push_opcode(OP_RETURN)
            .push_slice(data)
            .into_script(),
    })
}
