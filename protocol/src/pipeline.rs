//! # Transfer Pipeline
//!
//! Drives one transfer through every stage, strictly in order:
//!
//! ```text
//! Init -> ParamsFetched -> InputsCollected -> OutputsComposed
//!      -> MetadataAttached -> FeeAndChangeResolved -> BodyAssembled
//!      -> Signed -> (Submitted | Persisted)
//! ```
//!
//! Any stage may abort the run. An [`Aborted`] error records the last stage
//! reached and the categorized [`Error`]. Request checks (zero amount,
//! spending limit, recipient network) happen in `Init`, before any call to
//! the chain service.

use std::fmt;

use crate::chain::ChainQuery;
use crate::config::{ConfigError, SignerConfig};
use crate::dispatch::{dispatch, DispatchMode, DispatchOutcome};
use crate::error::Error;
use crate::transaction::address::Address;
use crate::transaction::balance::{balance, BalanceRequest};
use crate::transaction::builder::assemble_body;
use crate::transaction::inputs::collect_inputs;
use crate::transaction::metadata::{encode_metadata, AuxiliaryData};
use crate::transaction::outputs::compose_recipient_output;
use crate::transaction::signing::sign_transaction;
use crate::transaction::types::{Lovelace, TransactionId};
use crate::transaction::verification::verify_transaction;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ParamsFetched,
    InputsCollected,
    OutputsComposed,
    MetadataAttached,
    FeeAndChangeResolved,
    BodyAssembled,
    Signed,
    Submitted,
    Persisted,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::ParamsFetched => "params_fetched",
            Stage::InputsCollected => "inputs_collected",
            Stage::OutputsComposed => "outputs_composed",
            Stage::MetadataAttached => "metadata_attached",
            Stage::FeeAndChangeResolved => "fee_and_change_resolved",
            Stage::BodyAssembled => "body_assembled",
            Stage::Signed => "signed",
            Stage::Submitted => "submitted",
            Stage::Persisted => "persisted",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run that stopped before dispatch completed.
#[derive(Debug, thiserror::Error)]
#[error("transfer aborted after {stage}: {error}")]
pub struct Aborted {
    pub stage: Stage,
    pub error: Error,
}

// ---------------------------------------------------------------------------
// Request / Report
// ---------------------------------------------------------------------------

/// One transfer: who gets how much, and what to do with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: Address,
    pub amount: Lovelace,
    pub mode: DispatchMode,
}

impl TransferRequest {
    /// Parses the recipient's bech32 address.
    pub fn new(recipient: &str, amount: Lovelace, mode: DispatchMode) -> Result<Self, Error> {
        let recipient = recipient
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                field: "recipient",
                source,
            })?;
        Ok(Self {
            recipient,
            amount,
            mode,
        })
    }
}

/// Summary of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub tx_id: TransactionId,
    pub inputs_used: usize,
    pub total_input: Lovelace,
    pub amount: Lovelace,
    pub fee: Lovelace,
    pub change: Option<Lovelace>,
    pub ttl: u64,
    pub signed_size: usize,
    pub outcome: DispatchOutcome,
}

// ---------------------------------------------------------------------------
// TransferPipeline
// ---------------------------------------------------------------------------

/// Runs transfers for one sender against one chain service.
pub struct TransferPipeline<'a, Q: ChainQuery + ?Sized> {
    config: &'a SignerConfig,
    chain: &'a Q,
}

impl<'a, Q: ChainQuery + ?Sized> TransferPipeline<'a, Q> {
    pub fn new(config: &'a SignerConfig, chain: &'a Q) -> Self {
        Self { config, chain }
    }

    /// Builds, signs and dispatches one transfer.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferReport, Aborted> {
        let mut stage = Stage::Init;
        match self.run(request, &mut stage).await {
            Ok(report) => Ok(report),
            Err(error) => {
                tracing::debug!(stage = %stage, kind = error.kind(), "transfer aborted");
                Err(Aborted { stage, error })
            }
        }
    }

    /// Request checks that need no chain data.
    fn check_request(&self, request: &TransferRequest) -> Result<(), Error> {
        if request.amount.is_zero() {
            return Err(ConfigError::ZeroAmount.into());
        }
        if request.amount > self.config.spending_limit {
            return Err(ConfigError::SpendingLimitExceeded {
                requested: request.amount,
                limit: self.config.spending_limit,
            }
            .into());
        }
        if !self.config.network.accepts(&request.recipient) {
            return Err(ConfigError::WrongNetwork {
                field: "recipient",
                address: request.recipient.to_string(),
                network: self.config.network,
            }
            .into());
        }
        Ok(())
    }

    async fn run(&self, request: &TransferRequest, stage: &mut Stage) -> Result<TransferReport, Error> {
        self.check_request(request)?;
        let sender = &self.config.sender_address;
        tracing::info!(
            sender = %sender,
            recipient = %request.recipient,
            amount = request.amount.as_u64(),
            "starting transfer"
        );

        let params = self.chain.latest_parameters().await?;
        let tip = self.chain.latest_tip().await?;
        advance(stage, Stage::ParamsFetched);

        let utxos = self.chain.spendable_outputs(sender).await?;
        let collected = collect_inputs(&utxos, self.config.signing_key().key_hash())?;
        tracing::info!(
            inputs = collected.inputs.len(),
            total = collected.total.as_u64(),
            "collected inputs"
        );
        advance(stage, Stage::InputsCollected);

        let recipient =
            compose_recipient_output(&request.recipient, request.amount, params.coins_per_utxo_byte)?;
        advance(stage, Stage::OutputsComposed);

        let auxiliary_data: Option<AuxiliaryData> =
            encode_metadata(&self.config.metadata).map_err(ConfigError::from)?;
        if let Some(aux) = &auxiliary_data {
            tracing::debug!(entries = aux.entries().len(), hash = %aux.hash().to_hex(), "metadata attached");
        }
        advance(stage, Stage::MetadataAttached);

        let resolution = balance(&BalanceRequest {
            inputs: &collected,
            recipient: &recipient,
            change_address: sender,
            auxiliary_data: auxiliary_data.as_ref(),
            params: &params,
            tip,
        })?;
        if !resolution.folded_change.is_zero() {
            tracing::info!(
                folded = resolution.folded_change.as_u64(),
                "change below minimum output value added to fee"
            );
        }
        tracing::info!(
            fee = resolution.fee.as_u64(),
            change = resolution.change.as_ref().map(|c| c.value.as_u64()),
            ttl = resolution.ttl,
            "fee and change resolved"
        );
        advance(stage, Stage::FeeAndChangeResolved);

        let body = assemble_body(
            &collected.inputs,
            &recipient,
            resolution.change.as_ref(),
            resolution.fee,
            resolution.ttl,
            auxiliary_data.as_ref().map(AuxiliaryData::hash),
        )?;
        tracing::debug!(tx_id = %body.id(), body_size = body.cbor().len(), "body assembled");
        advance(stage, Stage::BodyAssembled);

        let signed = sign_transaction(body, auxiliary_data, self.config.signing_key())?;
        verify_transaction(&signed)?;
        let signed_size = signed.size();
        advance(stage, Stage::Signed);

        let outcome = dispatch(self.chain, &signed, &request.mode).await?;
        advance(
            stage,
            match outcome {
                DispatchOutcome::Submitted(_) => Stage::Submitted,
                DispatchOutcome::Persisted(_) => Stage::Persisted,
            },
        );

        Ok(TransferReport {
            tx_id: signed.id(),
            inputs_used: collected.inputs.len(),
            total_input: collected.total,
            amount: request.amount,
            fee: resolution.fee,
            change: resolution.change.map(|c| c.value),
            ttl: resolution.ttl,
            signed_size,
            outcome,
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    tracing::debug!(from = %stage, to = %next, "stage transition");
    *stage = next;
}
