//! Core library for the ofx-export command line application.
//!
//! The library turns a snapshot of a user's aggregator accounts and
//! transactions into an OFX interchange document. The modules are structured
//! to keep responsibilities narrow and composable: IO adapters live under
//! [`io`], the input records and enumerations inside [`model`], the ledger
//! that repairs the snapshot's gaps (synthesized transaction identifiers,
//! transfer reconciliation) in [`ledger`], and the file-to-file
//! orchestration under [`export`].

pub mod error;
pub mod export;
pub mod io;
pub mod ledger;
pub mod model;

pub use error::{ExportError, Result};
