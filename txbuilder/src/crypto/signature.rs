use bitcoin::{
    consensus::encode::serialize,
    ecdsa,
    hashes::Hash,
    hex::FromHex,
    script::{Builder, PushBytesBuf},
    sighash::{EcdsaSighashType, SighashCache},
    Amount, CompressedPublicKey, Network, PrivateKey, PublicKey, Script, ScriptBuf, Transaction,
    Witness,
};
use mockall::automock;
use secp256k1::{ecdsa::Signature, All, Message, Secp256k1, SecretKey};

use crate::{
    request::SpendableOutput,
    script::{classify, p2wpkh_script, parse_locking_script, witness_unlocking_script, ScriptType},
    BuildError,
};

// traits for mock testing

/// Trait for secp256k1 behavior, including key derivation, signing and verification.
#[automock]
pub trait Secp256k1Behavior {
    fn public_key(&self, secret_key: &SecretKey) -> secp256k1::PublicKey;

    /// Signs a digest with deterministic (RFC 6979) ECDSA.
    fn sign_ecdsa(&self, msg: &Message, secret_key: &SecretKey) -> Signature;

    fn verify_ecdsa(
        &self,
        msg: &Message,
        signature: &Signature,
        public_key: &secp256k1::PublicKey,
    ) -> Result<(), bitcoin::secp256k1::Error>;
}

/// Executes a locking script against a spending transaction.
#[automock]
pub trait ScriptVerifier {
    fn verify(
        &self,
        locking_script: &Script,
        input_idx: usize,
        amount: Amount,
        spending_tx: &[u8],
    ) -> Result<(), String>;
}

// Implementations for concrete types

impl Secp256k1Behavior for Secp256k1<All> {
    fn public_key(&self, secret_key: &SecretKey) -> secp256k1::PublicKey {
        secret_key.public_key(self)
    }

    fn sign_ecdsa(&self, msg: &Message, secret_key: &SecretKey) -> Signature {
        self.sign_ecdsa(msg, secret_key)
    }

    fn verify_ecdsa(
        &self,
        msg: &Message,
        signature: &Signature,
        public_key: &secp256k1::PublicKey,
    ) -> Result<(), bitcoin::secp256k1::Error> {
        self.verify_ecdsa(msg, signature, public_key)
    }
}

/// Script verification backed by libbitcoinconsensus.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsensusVerifier;

impl ScriptVerifier for ConsensusVerifier {
    fn verify(
        &self,
        locking_script: &Script,
        input_idx: usize,
        amount: Amount,
        spending_tx: &[u8],
    ) -> Result<(), String> {
        locking_script
            .verify(input_idx, amount, spending_tx)
            .map_err(|e| e.to_string())
    }
}

/// Unlocking data produced for one input.
#[derive(Clone, Debug, PartialEq)]
pub struct UnlockingData {
    pub script_type: ScriptType,
    pub script_sig: ScriptBuf,
    pub witness: Witness,
}

/// Parses a 32 byte hex secret key, falling back to WIF.
pub fn parse_secret_key(private_key: &str) -> Result<SecretKey, BuildError> {
    if let Ok(bytes) = <[u8; 32]>::from_hex(private_key) {
        return Ok(SecretKey::from_slice(&bytes)?);
    }

    PrivateKey::from_wif(private_key)
        .map(|key| key.inner)
        .map_err(|e| BuildError::SigningFailed(format!("unparsable private key: {}", e)))
}

/// Computes the unlocking data for input `input_idx` of `transaction`.
///
/// All outputs must already be in place: both digests commit to them. The
/// witness digest uses the P2WPKH script of the signing key as script code,
/// the legacy digest uses `prev_script`.
pub fn sign_input<E>(
    transaction: &Transaction,
    input_idx: usize,
    utxo: &SpendableOutput,
    prev_script: &Script,
    network: Network,
    secp: &E,
) -> Result<UnlockingData, BuildError>
where
    E: Secp256k1Behavior,
{
    let secret_key = parse_secret_key(&utxo.private_key)?;
    let public_key = CompressedPublicKey(secp.public_key(&secret_key));
    let script_type = classify(&utxo.address, network)?.script_type;

    match script_type {
        ScriptType::Witness(kind) => {
            log::debug!("Signing input {} on the witness path ({:?})", input_idx, kind);

            let script_code = p2wpkh_script(&public_key);
            let mut sighash_cache = SighashCache::new(transaction);
            let sighash = sighash_cache
                .p2wpkh_signature_hash(
                    input_idx,
                    &script_code,
                    Amount::from_sat(utxo.satoshis),
                    EcdsaSighashType::All,
                )
                .map_err(|e| BuildError::SigningFailed(e.to_string()))?;

            let signature = sign_digest(sighash.to_byte_array(), &secret_key, &public_key, secp)?;

            Ok(UnlockingData {
                script_type,
                script_sig: witness_unlocking_script(&public_key)?,
                witness: Witness::from_slice(&[
                    signature.to_vec(),
                    public_key.to_bytes().to_vec(),
                ]),
            })
        }
        ScriptType::Legacy => {
            log::debug!("Signing input {} on the legacy path", input_idx);

            let sighash_cache = SighashCache::new(transaction);
            let sighash = sighash_cache
                .legacy_signature_hash(input_idx, prev_script, EcdsaSighashType::All.to_u32())
                .map_err(|e| BuildError::SigningFailed(e.to_string()))?;

            let signature = sign_digest(sighash.to_byte_array(), &secret_key, &public_key, secp)?;
            let signature = PushBytesBuf::try_from(signature.to_vec())
                .map_err(|e| BuildError::SigningFailed(format!("signature push: {:?}", e)))?;

            Ok(UnlockingData {
                script_type,
                script_sig: Builder::new()
                    .push_slice(signature)
                    .push_key(&PublicKey::new(public_key.0))
                    .into_script(),
                witness: Witness::default(),
            })
        }
    }
}

/// Signs input `input_idx` and stores the unlocking data in `transaction`.
///
/// Legacy inputs are then checked by executing `utxo`'s locking script; a
/// failure aborts the build.
pub fn add_signature<E, V>(
    transaction: &mut Transaction,
    input_idx: usize,
    utxo: &SpendableOutput,
    network: Network,
    secp: &E,
    verifier: &V,
) -> Result<(), BuildError>
where
    E: Secp256k1Behavior,
    V: ScriptVerifier,
{
    let prev_script = parse_locking_script(&utxo.pk_script)?;
    let unlocking = sign_input(transaction, input_idx, utxo, &prev_script, network, secp)?;
    let script_type = unlocking.script_type;

    let input = transaction.input.get_mut(input_idx).ok_or_else(|| {
        BuildError::SigningFailed(format!("input {} does not exist", input_idx))
    })?;
    input.script_sig = unlocking.script_sig;
    input.witness = unlocking.witness;

    if script_type == ScriptType::Legacy {
        verifier
            .verify(
                &prev_script,
                input_idx,
                Amount::from_sat(utxo.satoshis),
                &serialize(transaction),
            )
            .map_err(|reason| BuildError::ScriptValidationFailed {
                input: input_idx,
                reason,
            })?;
    }

    Ok(())
}

fn sign_digest<E>(
    digest: [u8; 32],
    secret_key: &SecretKey,
    public_key: &CompressedPublicKey,
    secp: &E,
) -> Result<ecdsa::Signature, BuildError>
where
    E: Secp256k1Behavior,
{
    let message = Message::from_digest(digest);
    let signature = secp.sign_ecdsa(&message, secret_key);

    // Verify the signature
    secp.verify_ecdsa(&message, &signature, &public_key.0)?;

    Ok(ecdsa::Signature::sighash_all(signature))
}
