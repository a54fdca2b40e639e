use std::str::FromStr;

use bitcoin::{consensus::encode::serialize_hex, Transaction, Txid};
use secp256k1::Secp256k1;

use crate::{
    crypto::{
        add_signature,
        signature::{Secp256k1Behavior, ScriptVerifier},
        ConsensusVerifier,
    },
    planner::{plan, OutputPlan},
    request::{BuildRequest, BuildResponse, SpendableOutput},
    transaction::{BuilderConfig, TransactionBuilder},
    BuildError,
};

// `TransferTransaction` spends the caller's outputs to the requested destinations.
pub struct TransferTransaction<'a> {
    transaction: Transaction,

    // spent outputs in input order, needed for signing
    utxos: &'a [SpendableOutput],

    plan: OutputPlan,
    config: BuilderConfig,
}

impl<'a> TransferTransaction<'a> {
    /// Creates the unsigned transaction for `request`.
    ///
    /// Outputs are planned and fixed first, then one unsigned input is added per
    /// spendable output.
    ///
    /// # Returns
    /// Result containing a new `TransferTransaction` or a `BuildError`
    pub fn new(request: &'a BuildRequest, config: &BuilderConfig) -> Result<Self, BuildError> {
        request.validate()?;

        let plan = plan(request, config)?;
        let builder = TransactionBuilder::new(config).add_outputs(plan.outputs.clone());

        let builder = request
            .utxos
            .iter()
            .try_fold(builder, |builder, utxo| {
                let txid = Txid::from_str(&utxo.txid).map_err(|e| {
                    BuildError::MalformedRequest(format!("txid {}: {}", utxo.txid, e))
                })?;
                Ok::<_, BuildError>(builder.add_input(txid, utxo.output_index))
            })?;

        Ok(TransferTransaction {
            transaction: builder.build(),
            utxos: &request.utxos,
            plan,
            config: *config,
        })
    }

    /// Signs every input in order, stopping at the first failure.
    ///
    /// # Arguments
    /// * `secp` - The secp256k1 context
    /// * `verifier` - Script engine used to check legacy inputs
    pub fn sign_inputs<E, V>(&mut self, secp: &E, verifier: &V) -> Result<(), BuildError>
    where
        E: Secp256k1Behavior,
        V: ScriptVerifier,
    {
        for (input_idx, utxo) in self.utxos.iter().enumerate() {
            add_signature(
                &mut self.transaction,
                input_idx,
                utxo,
                self.config.network,
                secp,
                verifier,
            )?;
        }
        Ok(())
    }

    pub fn plan(&self) -> &OutputPlan {
        &self.plan
    }

    pub fn build(self) -> Transaction {
        self.transaction
    }
}

/// Builds and signs the transaction described by `request`.
pub fn build_transaction(
    request: &BuildRequest,
    config: &BuilderConfig,
) -> Result<Transaction, BuildError> {
    let secp = Secp256k1::new();

    let mut transfer = TransferTransaction::new(request, config)?;
    transfer.sign_inputs(&secp, &ConsensusVerifier)?;
    let transaction = transfer.build();

    log::info!(
        "Built transaction {} with {} inputs and {} outputs",
        transaction.compute_txid(),
        transaction.input.len(),
        transaction.output.len()
    );

    Ok(transaction)
}

/// Wire form of a finished transaction: lowercase hex and display-order txid.
pub fn to_response(transaction: &Transaction) -> BuildResponse {
    BuildResponse {
        txid: transaction.compute_txid().to_string(),
        hex_tx: serialize_hex(transaction),
    }
}

/// Parses a JSON build request and returns the signed transaction.
pub fn build(json: &str, config: &BuilderConfig) -> Result<BuildResponse, BuildError> {
    let request = BuildRequest::from_json(json)?;
    if !request.coin_type.is_empty() {
        log::debug!("Building {} transaction", request.coin_type);
    }

    let transaction = build_transaction(&request, config)?;
    Ok(to_response(&transaction))
}

// unit tests
#[cfg(test)]
mod tests {
    use bitcoin::{Address, Amount, Network, PublicKey};
    use rand::Rng;
    use secp256k1::{All, SecretKey};

    use crate::{
        crypto::signature::{MockScriptVerifier, MockSecp256k1Behavior},
        request::DestinationOutput,
    };

    use super::*;

    fn setup(input_count: usize) -> (Secp256k1<All>, BuildRequest) {
        let secp = Secp256k1::new();
        let mut rng = rand::thread_rng();

        let utxos = (0..input_count)
            .map(|i| {
                let data: [u8; 32] = rng.gen();
                let secret_key = SecretKey::from_slice(&data).unwrap();
                let address =
                    Address::p2pkh(&PublicKey::new(secret_key.public_key(&secp)), Network::Bitcoin);
                SpendableOutput {
                    address: address.to_string(),
                    txid: format!("{:064x}", i + 1),
                    output_index: i as u32,
                    pk_script: address.script_pubkey().to_hex_string(),
                    satoshis: 100_000,
                    public_key: String::new(),
                    private_key: secret_key.display_secret().to_string(),
                }
            })
            .collect();

        let change = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH".to_string();
        let request = BuildRequest {
            coin_type: "BTC".to_string(),
            utxos,
            to: vec![DestinationOutput {
                to: change.clone(),
                satoshis: 50_000,
            }],
            change_address: change,
            fee: 1_000,
            dust: 546,
            block_hash: String::new(),
            omni_address: String::new(),
            omni_currency_id: 0,
            omni_amount: 0,
            need_omni_out: 0,
        };

        (secp, request)
    }

    #[test]
    fn test_new_transfer_has_unsigned_inputs() {
        let (_, request) = setup(3);

        let transfer = TransferTransaction::new(&request, &BuilderConfig::default()).unwrap();
        let tx = transfer.build();

        assert_eq!(tx.input.len(), 3);
        assert_eq!(tx.output.len(), 2);
        assert!(tx.input.iter().all(|i| i.script_sig.is_empty()));
        assert_eq!(tx.input[2].previous_output.vout, 2);
        assert_eq!(
            tx.input[0].previous_output.txid.to_string(),
            format!("{:064x}", 1)
        );
    }

    #[test]
    fn test_sign_inputs_checks_every_legacy_input() {
        let (secp, request) = setup(3);
        let mut transfer = TransferTransaction::new(&request, &BuilderConfig::default()).unwrap();

        let mut mock_verifier = MockScriptVerifier::new();
        mock_verifier.expect_verify().times(3).returning(|_, _, _, _| Ok(()));

        transfer
            .sign_inputs(&secp, &mock_verifier)
            .expect("Failed to sign inputs");

        assert_eq!(transfer.plan().change, Some(Amount::from_sat(249_000)));
        assert!(transfer
            .build()
            .input
            .iter()
            .all(|i| !i.script_sig.is_empty()));
    }

    #[test]
    fn test_first_invalid_input_stops_signing() {
        let (secp, request) = setup(3);
        let mut transfer = TransferTransaction::new(&request, &BuilderConfig::default()).unwrap();

        let mut mock_verifier = MockScriptVerifier::new();
        mock_verifier
            .expect_verify()
            .times(2)
            .returning(|_, idx, _, _| {
                if idx == 1 {
                    Err("ERR_EQUALVERIFY".to_string())
                } else {
                    Ok(())
                }
            });

        let result = transfer.sign_inputs(&secp, &mock_verifier);

        assert!(matches!(
            result,
            Err(BuildError::ScriptValidationFailed { input: 1, .. })
        ));
    }

    #[test]
    fn test_key_error_surfaces_unchanged() {
        let (_, mut request) = setup(1);
        request.utxos[0].private_key = "not a key".to_string();
        let mut transfer = TransferTransaction::new(&request, &BuilderConfig::default()).unwrap();

        let mock_secp = MockSecp256k1Behavior::new();
        let mock_verifier = MockScriptVerifier::new();

        let result = transfer.sign_inputs(&mock_secp, &mock_verifier);
        assert!(matches!(result, Err(BuildError::SigningFailed(_))));
    }

    #[test]
    fn test_bad_txid_is_malformed() {
        let (_, mut request) = setup(1);
        request.utxos[0].txid = "xyz".to_string();

        let result = TransferTransaction::new(&request, &BuilderConfig::default());
        assert!(matches!(result, Err(BuildError::MalformedRequest(_))));
    }

    #[test]
    fn test_build_transaction_is_deterministic() {
        let (_, request) = setup(2);

        let first = build_transaction(&request, &BuilderConfig::default()).unwrap();
        let second = build_transaction(&request, &BuilderConfig::default()).unwrap();

        assert_eq!(to_response(&first), to_response(&second));
    }
}
