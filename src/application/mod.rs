// Application layer: the ledger store and read models built on top of it.
// Presentation code (the CLI) talks only to this layer.

pub mod error;
pub mod reporting;
pub mod store;

pub use error::*;
pub use reporting::*;
pub use store::*;
