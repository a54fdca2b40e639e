use bitcoin::{
    absolute::LockTime, transaction::Version, Amount, Network, OutPoint, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Txid, Witness,
};

/// Settings shared by every build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Network addresses are decoded for.
    pub network: Network,
    /// Sequence number of every input.
    pub sequence: Sequence,
    /// Transaction format version.
    pub version: Version,
    /// Lower bound on the change threshold. The threshold actually applied is
    /// `max(request.dust, dust_floor)`: change at or below it is folded into
    /// the fee.
    pub dust_floor: Amount,
}

impl BuilderConfig {
    pub const DEFAULT_DUST_FLOOR: u64 = 546;
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            network: Network::Bitcoin,
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            version: Version::ONE,
            dust_floor: Amount::from_sat(Self::DEFAULT_DUST_FLOOR),
        }
    }
}

/// A builder for constructing Bitcoin transactions.
pub struct TransactionBuilder {
    /// The transaction being built.
    transaction: Transaction,
    sequence: Sequence,
}

impl TransactionBuilder {
    /// Creates a new TransactionBuilder with an empty transaction in the
    /// configured format version.
    pub fn new(config: &BuilderConfig) -> Self {
        Self {
            transaction: Transaction {
                version: config.version,
                lock_time: LockTime::ZERO,
                input: vec![],
                output: vec![],
            },
            sequence: config.sequence,
        }
    }

    /// Adds an unsigned input spending `vout` of `txid`.
    ///
    /// # Returns
    /// Self, allowing for method chaining
    pub fn add_input(mut self, txid: Txid, vout: u32) -> Self {
        self.transaction.input.push(TxIn {
            previous_output: OutPoint { txid, vout },
            script_sig: ScriptBuf::new(), // filled in by the input signer
            sequence: self.sequence,
            witness: Witness::default(),
        });
        self
    }

    /// Appends already planned outputs in order.
    pub fn add_outputs(mut self, outputs: Vec<TxOut>) -> Self {
        self.transaction.output.extend(outputs);
        self
    }

    /// Finalizes the transaction building process.
    ///
    /// # Returns
    /// The built Transaction
    pub fn build(self) -> Transaction {
        self.transaction
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_inputs_signal_replace_by_fee() {
        let txid =
            Txid::from_str("4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b")
                .unwrap();
        let tx = TransactionBuilder::new(&BuilderConfig::default())
            .add_input(txid, 3)
            .build();

        assert_eq!(tx.version, Version::ONE);
        assert_eq!(tx.input.len(), 1);
        assert_eq!(tx.input[0].previous_output.vout, 3);
        assert_eq!(tx.input[0].sequence, Sequence(0xfffffffd));
        assert!(tx.input[0].sequence.is_rbf());
        assert!(tx.input[0].script_sig.is_empty());
    }

    #[test]
    fn test_outputs_keep_insertion_order() {
        let output = |sat| TxOut {
            value: Amount::from_sat(sat),
            script_pubkey: ScriptBuf::new(),
        };
        let tx = TransactionBuilder::new(&BuilderConfig::default())
            .add_outputs(vec![output(1), output(2)])
            .add_outputs(vec![output(3)])
            .build();

        let values: Vec<u64> = tx.output.iter().map(|o| o.value.to_sat()).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
