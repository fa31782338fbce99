mod ledger;
mod money;
mod reward;
mod transaction;

pub use ledger::*;
pub use money::*;
pub use reward::*;
pub use transaction::*;
