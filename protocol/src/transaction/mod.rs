//! # Transaction Module
//!
//! Construction, balancing, signing and verification of a single-recipient
//! lovelace transfer.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        - Lovelace, TransactionHash, TransactionId
//! address.rs      - Shelley payment addresses (bech32 <-> bytes)
//! cbor.rs         - Canonical CBOR helpers
//! inputs.rs       - Input collection from the sender's UTXO set
//! outputs.rs      - Outputs and the minimum-UTXO rule
//! metadata.rs     - Labelled text metadata and its hash
//! balance.rs      - Fee and change resolution
//! builder.rs      - Fluent TransactionBuilder, frozen bodies
//! signing.rs      - Vkey witnesses and the signed transaction
//! verification.rs - Self-check of a signed transaction
//! error.rs        - FundsError and BuildError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Collect** - [`collect_inputs`] turns every spendable UTXO into an input.
//! 2. **Compose** - [`compose_recipient_output`] builds the payment output.
//! 3. **Annotate** - [`encode_metadata`] labels the annotation lines.
//! 4. **Balance** - [`balance`] settles fee, change and ttl.
//! 5. **Assemble** - [`assemble_body`] freezes the body and hashes it.
//! 6. **Sign** - [`sign_transaction`] adds the single vkey witness.
//! 7. **Verify** - [`verify_transaction`] re-checks the result before it leaves.
//!
//! ## Design Decisions
//!
//! - Transaction ids are BLAKE2b-256 of the canonical body encoding. The
//!   body is encoded once when frozen, and those exact bytes are hashed,
//!   signed over and embedded in the signed transaction.
//! - All amounts are [`Lovelace`] with checked arithmetic. No floating point
//!   anywhere near monetary values.

pub mod address;
pub mod balance;
pub mod builder;
pub mod cbor;
pub mod error;
pub mod inputs;
pub mod metadata;
pub mod outputs;
pub mod signing;
pub mod types;
pub mod verification;

pub use address::{Address, AddressError};
pub use balance::{balance, min_fee, BalanceRequest, FeeResolution};
pub use builder::{assemble_body, FrozenBody, TransactionBody, TransactionBuilder};
pub use error::{BuildError, FundsError};
pub use inputs::{collect_inputs, CollectedInputs, TransactionInput};
pub use metadata::{encode_metadata, AuxiliaryData, AuxiliaryDataHash, MetadataEntry, MetadataError};
pub use outputs::{compose_recipient_output, min_utxo_value, TransactionOutput};
pub use signing::{sign_transaction, SignedTransaction, VkeyWitness, WitnessSet};
pub use types::{Lovelace, TransactionHash, TransactionId, ValueError};
pub use verification::{verify_transaction, TransactionError};
