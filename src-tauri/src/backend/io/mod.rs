//! # IO Module
//!
//! The boundary between the domain logic and the outside world. The only
//! external collaborator is the wallet-sync service, reached through the
//! `WalletSyncBackend` trait so tests can substitute a canned backend.

pub mod sync_backend;

pub use sync_backend::*;
