pub mod account;
pub mod money;
pub mod transaction;

pub use account::{Account, Organization};
pub use money::Money;
pub use transaction::{
    Direction, NewLedgerTransaction, FALLBACK_SOURCE_NAME, IMPORT_CHANNEL_CSV,
    IMPORT_ORIGIN_AI_EXTRACTION,
};
