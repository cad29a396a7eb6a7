//! Match history and match lifecycle tracking

pub mod ledger;
pub mod log;

pub use ledger::MatchLedger;
pub use log::MatchHistory;
