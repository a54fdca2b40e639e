pub mod crypto;
pub mod error;
pub mod omni;
pub mod planner;
pub mod request;
pub mod script;
pub mod transaction;
pub mod transfer;

pub use bitcoin;
pub use error::BuildError;
pub use request::{BuildRequest, BuildResponse};
pub use transaction::BuilderConfig;
pub use transfer::{build, build_transaction, TransferTransaction};
