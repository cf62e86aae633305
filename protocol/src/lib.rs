// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Remit Protocol - Core Library
//!
//! Builds, balances, signs and dispatches a single lovelace transfer on a
//! Cardano-style UTXO ledger. One sender, one recipient, one key, one run.
//!
//! ## Architecture
//!
//! - **config** - Validated signer configuration and protocol constants.
//! - **crypto** - BLAKE2b hashing and Ed25519 payment keys.
//! - **chain** - The chain query seam and its Blockfrost implementation.
//! - **transaction** - Inputs, outputs, metadata, fee balancing, body
//!   assembly, signing and verification.
//! - **dispatch** - Submit the signed payload or write it to disk.
//! - **pipeline** - Runs the stages above in order for one transfer.
//! - **error** - The five-way error taxonomy every failure lands in.
//!
//! ## Design Philosophy
//!
//! 1. Money is integers. Every lovelace sum is checked.
//! 2. Bytes are hashed once. The body that is signed is the body that ships.
//! 3. Nothing touches the network until the request itself is known to be valid.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod transaction;

pub use error::Error;
pub use pipeline::{Aborted, Stage, TransferPipeline, TransferReport, TransferRequest};
