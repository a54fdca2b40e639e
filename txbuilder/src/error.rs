use core::fmt;

#[derive(Debug)]
pub enum BuildError {
    /// The request JSON or one of its fields could not be parsed.
    MalformedRequest(String),
    InvalidAddress(String),
    InvalidScript(String),
    /// Private key parsing, digest computation or signature generation failed.
    SigningFailed(String),
    /// Executing the locking script against the new unlocking script failed.
    ScriptValidationFailed { input: usize, reason: String },
    InsufficientFunds { available: u64, required: u64 },
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::MalformedRequest(err.to_string())
    }
}

impl From<bitcoin::secp256k1::Error> for BuildError {
    fn from(err: bitcoin::secp256k1::Error) -> Self {
        BuildError::SigningFailed(err.to_string())
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MalformedRequest(msg) => write!(f, "Malformed request: {}", msg),
            BuildError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            BuildError::InvalidScript(msg) => write!(f, "Invalid script: {}", msg),
            BuildError::SigningFailed(msg) => write!(f, "Signing failed: {}", msg),
            BuildError::ScriptValidationFailed { input, reason } => {
                write!(f, "Script validation failed for input {}: {}", input, reason)
            }
            BuildError::InsufficientFunds {
                available,
                required,
            } => write!(
                f,
                "Insufficient funds: {} sat available, {} sat required",
                available, required
            ),
        }
    }
}

impl std::error::Error for BuildError {}

impl BuildError {
    pub fn new_malformed_request(message: &str) -> Self {
        BuildError::MalformedRequest(message.to_string())
    }
}
