use bitcoin::{
    key::Secp256k1,
    secp256k1::{All, SecretKey},
    Address, CompressedPublicKey, Network, PublicKey,
};
use rand::Rng;
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(dead_code)]
pub enum Kind {
    P2pkh,
    P2shP2wpkh,
    P2wpkh,
}

pub struct Key {
    pub secret_key: SecretKey,
    pub public_key: CompressedPublicKey,
    pub address: Address,
}

pub fn setup() -> Secp256k1<All> {
    Secp256k1::new()
}

pub fn generate_key(secp: &Secp256k1<All>, kind: Kind) -> Key {
    let mut rng = rand::thread_rng();

    let data: [u8; 32] = rng.gen();
    let secret_key = SecretKey::from_slice(&data).unwrap();
    let public_key = CompressedPublicKey(secret_key.public_key(secp));

    let address = match kind {
        Kind::P2pkh => Address::p2pkh(&PublicKey::new(public_key.0), Network::Bitcoin),
        Kind::P2shP2wpkh => Address::p2shwpkh(&public_key, Network::Bitcoin),
        Kind::P2wpkh => Address::p2wpkh(&public_key, Network::Bitcoin),
    };

    Key {
        secret_key,
        public_key,
        address,
    }
}

pub fn utxo_json(key: &Key, txid_seed: u64, vout: u32, satoshis: u64) -> Value {
    json!({
        "address": key.address.to_string(),
        "txid": format!("{:064x}", txid_seed),
        "outputindex": vout,
        "pkscript": key.address.script_pubkey().to_hex_string(),
        "satoshis": satoshis,
        "public": key.public_key.to_string(),
        "private": key.secret_key.display_secret().to_string(),
    })
}

pub fn request_json(utxos: Vec<Value>, to: Vec<(&Address, u64)>, change: &Address, fee: u64) -> Value {
    json!({
        "cointype": "BTC",
        "utxos": utxos,
        "to": to
            .into_iter()
            .map(|(address, satoshis)| json!({"to": address.to_string(), "satoshis": satoshis}))
            .collect::<Vec<_>>(),
        "changeaddress": change.to_string(),
        "fee": fee,
        "dust": 546,
    })
}
