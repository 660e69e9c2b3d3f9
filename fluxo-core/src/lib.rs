//! fluxo-core: transaction entity shape and processing-clock helpers

pub mod time;
pub mod transaction;

pub use transaction::{MAX_DESCRIPTION_LEN, NewTransaction, TransactionStatus, TransactionType};
