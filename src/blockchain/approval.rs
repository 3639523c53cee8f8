//! User approval for account access and signing.
//!
//! A browser wallet pops up a prompt before revealing accounts or signing;
//! [`Approver`] is that prompt. Declining maps to `UserRejected`.

use alloy::primitives::Address;
use std::fmt;
use std::io::{self, BufRead, Write};

/// What the user is being asked to allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalRequest {
    /// Reveal the account to the dashboard.
    ConnectAccount { address: Address },
    /// Sign and broadcast a token transfer.
    SignTransfer {
        from: Address,
        to: Address,
        amount: String,
        symbol: String,
    },
    /// Sign an off-chain message.
    SignMessage { address: Address, preview: String },
}

impl fmt::Display for ApprovalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalRequest::ConnectAccount { address } => {
                write!(f, "Connect account {} to the dashboard?", address)
            }
            ApprovalRequest::SignTransfer { from, to, amount, symbol } => {
                write!(f, "Send {} {} from {} to {}?", amount, symbol, from, to)
            }
            ApprovalRequest::SignMessage { address, preview } => {
                write!(f, "Sign message with {}: \"{}\"?", address, preview)
            }
        }
    }
}

/// Decides whether a wallet request may proceed.
pub trait Approver: Send + Sync {
    fn approve(&self, request: &ApprovalRequest) -> bool;
}

/// Approves everything (`--yes`, `wallet.auto_approve`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Approver for AutoApprove {
    fn approve(&self, _request: &ApprovalRequest) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl Approver for RejectAll {
    fn approve(&self, _request: &ApprovalRequest) -> bool {
        false
    }
}

/// Asks on the terminal; anything but `y`/`yes` declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalApprover;

impl Approver for TerminalApprover {
    fn approve(&self, request: &ApprovalRequest) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{} [y/N] ", request).and_then(|_| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_affirmative(&answer)
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
