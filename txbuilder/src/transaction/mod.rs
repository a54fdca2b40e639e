pub mod builder;

pub use builder::{BuilderConfig, TransactionBuilder};
