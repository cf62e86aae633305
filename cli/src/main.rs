// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # remit
//!
//! Entry point for the `remit` binary. Parses arguments, initializes
//! logging, loads the signer configuration, runs one transfer and maps the
//! result to the process exit code: 0 on success, 1 on any failure.

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use remit_protocol::chain::BlockfrostClient;
use remit_protocol::config::SignerConfig;
use remit_protocol::dispatch::DispatchMode;
use remit_protocol::{Aborted, Error, TransferPipeline, TransferReport, TransferRequest};

use cli::RemitCli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = RemitCli::parse();
    logging::init_logging(logging::DEFAULT_LOG_FILTER, cli.log_format);

    match run(cli).await {
        Ok(report) => {
            println!("{}", report.outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(kind = error_kind(&err), "{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: RemitCli) -> Result<TransferReport> {
    let config = SignerConfig::load(&cli.config)?;
    tracing::info!(
        config = %cli.config.display(),
        network = %config.network,
        sender = %config.sender_address,
        "configuration loaded"
    );

    let mode = if cli.submit {
        DispatchMode::Submit
    } else {
        DispatchMode::Persist { path: cli.out_file }
    };
    let request = TransferRequest::new(&cli.recipient, cli.lovelace, mode)?;

    let client = BlockfrostClient::new(
        config.chain_service.base_url.clone(),
        config.chain_service.project_id.clone(),
    );
    let report = TransferPipeline::new(&config, &client)
        .transfer(&request)
        .await?;

    tracing::info!(
        tx_id = %report.tx_id,
        fee = report.fee.as_u64(),
        change = report.change.map(|c| c.as_u64()),
        size = report.signed_size,
        "transfer complete"
    );
    Ok(report)
}

/// Error category for the log line.
fn error_kind(err: &anyhow::Error) -> &'static str {
    if let Some(aborted) = err.downcast_ref::<Aborted>() {
        return aborted.error.kind();
    }
    err.downcast_ref::<Error>().map(Error::kind).unwrap_or("internal")
}
