//! Token transfer flow.
//!
//! One `execute` call walks a single attempt through validation, the
//! advisory balance check, submission and the bounded confirmation wait.
//! Every failure is terminal for that attempt; nothing is retried.

use alloy::primitives::{Address, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::amount::{check_positive_decimal, format_units, TokenAmount};
use crate::error::{DashboardError, DashboardResult};
use crate::observability::metrics;
use crate::token::{Confirmation, TokenGateway};
use crate::transfer::state::{TransferReceipt, TransferState};

/// User input for one transfer attempt, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: String,
    pub amount: String,
}

impl TransferRequest {
    pub fn new(to: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            amount: amount.into(),
        }
    }
}

/// Drives transfers from the connected account.
pub struct TransferFlow {
    gateway: Arc<dyn TokenGateway>,
    owner: Address,
    confirmation_timeout: Duration,
    state_tx: watch::Sender<TransferState>,
}

impl TransferFlow {
    pub fn new(
        gateway: Arc<dyn TokenGateway>,
        owner: Address,
        confirmation_timeout: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(TransferState::Idle);
        Self {
            gateway,
            owner,
            confirmation_timeout,
            state_tx,
        }
    }

    /// Observe state transitions of this flow.
    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state_tx.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> TransferState {
        self.state_tx.borrow().clone()
    }

    /// Run one attempt to completion.
    ///
    /// Takes `&mut self` so a second attempt cannot start while one is in
    /// flight. The final state is `Settled` or `Failed` until the next call.
    pub async fn execute(&mut self, request: &TransferRequest) -> DashboardResult<TransferReceipt> {
        let result = self.run(request).await;
        match &result {
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = %receipt.tx_hash,
                    block = receipt.block_number,
                    amount = %receipt.amount,
                    "Transfer settled"
                );
                metrics::record_transfer("settled");
                self.publish(TransferState::Settled(receipt.clone()));
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Transfer failed");
                metrics::record_transfer(e.kind());
                self.publish(TransferState::Failed(e.clone()));
            }
        }
        result
    }

    async fn run(&self, request: &TransferRequest) -> DashboardResult<TransferReceipt> {
        self.publish(TransferState::Validating);

        let to = parse_recipient(&request.to)?;
        check_positive_decimal(&request.amount)?;

        let (balance, decimals) =
            tokio::try_join!(self.gateway.balance_of(self.owner), self.gateway.decimals())?;

        let amount = TokenAmount::parse(&request.amount, decimals)?;
        if amount.is_zero() {
            return Err(DashboardError::InvalidAmount(format!(
                "'{}' is below the smallest unit of a {}-decimal token",
                request.amount.trim(),
                decimals
            )));
        }
        if amount.raw > balance {
            return Err(DashboardError::InsufficientBalance {
                requested: amount.to_string(),
                available: format_units(balance, decimals),
            });
        }

        self.publish(TransferState::Submitting);
        tracing::debug!(
            to = %to,
            amount = %amount,
            symbol = self.gateway.symbol(),
            "Submitting transfer"
        );
        let tx_hash = self.gateway.transfer(to, amount.raw).await?;

        self.publish(TransferState::AwaitingConfirmation { tx_hash });
        let confirmation = self.await_inclusion(tx_hash).await?;

        let new_balance = match self.gateway.balance_of(self.owner).await {
            Ok(raw) => Some(TokenAmount::from_raw(raw, decimals)),
            Err(e) => {
                tracing::warn!(error = %e, "Balance refresh after transfer failed");
                None
            }
        };

        Ok(TransferReceipt {
            tx_hash,
            block_number: confirmation.block_number,
            amount,
            new_balance,
        })
    }

    async fn await_inclusion(&self, tx_hash: TxHash) -> DashboardResult<Confirmation> {
        let wait = self.gateway.wait_for_confirmation(tx_hash);
        match timeout(self.confirmation_timeout, wait).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    tx_hash = %tx_hash,
                    "Gave up waiting for confirmation; transaction not cancelled"
                );
                Err(DashboardError::Timeout(self.confirmation_timeout.as_secs()))
            }
        }
    }

    fn publish(&self, state: TransferState) {
        self.state_tx.send_replace(state);
    }
}

/// Parse a destination account.
///
/// Accepts `0x` followed by exactly 40 hex digits. Mixed-case input must
/// carry a valid checksum; all-lower and all-upper input is accepted as is.
pub fn parse_recipient(input: &str) -> DashboardResult<Address> {
    let trimmed = input.trim();
    let invalid =
        |reason: &str| DashboardError::InvalidRecipient(format!("'{}' {}", trimmed, reason));

    let hex = trimmed
        .strip_prefix("0x")
        .ok_or_else(|| invalid("must start with 0x"))?;
    if hex.len() != 40 {
        return Err(invalid("must have 40 hex digits"));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("contains non-hex characters"));
    }

    let address: Address = trimmed.parse().map_err(|_| invalid("is not an address"))?;

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != trimmed {
        return Err(invalid("has a bad checksum"));
    }

    Ok(address)
}
