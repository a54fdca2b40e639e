use serde::{Deserialize, Serialize};

use crate::BuildError;

/// A previously created output the caller wants to spend, together with the
/// key that is authorized to spend it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SpendableOutput {
    pub address: String,
    pub txid: String,
    #[serde(rename = "outputindex")]
    pub output_index: u32,
    /// Hex encoded locking script of the output being spent.
    #[serde(rename = "pkscript")]
    pub pk_script: String,
    pub satoshis: u64,
    #[serde(rename = "public", default)]
    pub public_key: String,
    /// Hex encoded secret key or WIF.
    #[serde(rename = "private")]
    pub private_key: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DestinationOutput {
    pub to: String,
    pub satoshis: u64,
}

/// Overlay asset transfer carried in a null-data output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuxTransfer {
    pub currency_id: u32,
    pub amount: u64,
    /// Emit an extra dust output to the change address.
    pub reference_output: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BuildRequest {
    #[serde(rename = "cointype", default)]
    pub coin_type: String,
    pub utxos: Vec<SpendableOutput>,
    #[serde(default)]
    pub to: Vec<DestinationOutput>,
    #[serde(rename = "changeaddress")]
    pub change_address: String,
    pub fee: u64,
    pub dust: u64,
    #[serde(rename = "blockhash", default)]
    pub block_hash: String,
    #[serde(rename = "omniAddress", default)]
    pub omni_address: String,
    #[serde(rename = "omniCurrencyID", default)]
    pub omni_currency_id: u32,
    #[serde(rename = "omniAmount", default)]
    pub omni_amount: u64,
    #[serde(rename = "needOmniOut", default)]
    pub need_omni_out: u8,
}

impl BuildRequest {
    /// Parses and validates a JSON request.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let request: BuildRequest = serde_json::from_str(json)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.utxos.is_empty() {
            return Err(BuildError::new_malformed_request(
                "request has no spendable outputs",
            ));
        }
        Ok(())
    }

    /// The auxiliary-protocol block, active whenever a currency id is set.
    pub fn aux_transfer(&self) -> Option<AuxTransfer> {
        if self.omni_currency_id == 0 {
            return None;
        }
        Some(AuxTransfer {
            currency_id: self.omni_currency_id,
            amount: self.omni_amount,
            reference_output: self.need_omni_out == 1,
        })
    }

    pub fn total_input(&self) -> Result<u64, BuildError> {
        checked_sum(self.utxos.iter().map(|utxo| utxo.satoshis))
    }

    pub fn total_destination(&self) -> Result<u64, BuildError> {
        checked_sum(self.to.iter().map(|dest| dest.satoshis))
    }
}

fn checked_sum(mut amounts: impl Iterator<Item = u64>) -> Result<u64, BuildError> {
    amounts.try_fold(0u64, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| BuildError::new_malformed_request("amount sum overflows"))
    })
}

/// The finished transaction as handed back to the caller.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BuildResponse {
    #[serde(rename = "TxID")]
    pub txid: String,
    #[serde(rename = "HexTx")]
    pub hex_tx: String,
}
