pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

pub use application::{DepositOutcome, LedgerStore};
pub use domain::*;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
