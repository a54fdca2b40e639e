pub mod signature;

pub use signature::{add_signature, sign_input, ConsensusVerifier, UnlockingData};
