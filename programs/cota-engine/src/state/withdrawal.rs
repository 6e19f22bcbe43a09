use anchor_lang::prelude::*;

use crate::constants::{MAX_DESTINATION_LEN, MAX_EXTERNAL_REF_LEN, MAX_NOTE_LEN};
use crate::errors::ErrorCode;

/// External payout rail
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PayoutMethod {
    /// Instant transfer keyed by a PIX key
    Pix,
    /// Conventional bank transfer (bank/branch/account tuple)
    BankTransfer,
}

/// Withdrawal request status
///
/// Pending -> Approved -> Completed, with Rejected branching off Pending.
/// Completed is terminal and immutable.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// A request to convert available ledger balance into an external payout
///
/// The engine only debits/restores the internal balance; moving real money
/// is the external payout collaborator's job, recorded here by reference.
#[account]
pub struct WithdrawalRequest {
    /// Requesting user
    pub user: Pubkey,

    /// Requested amount (minor units)
    pub amount: u64,

    /// Payout rail
    pub method: PayoutMethod,

    /// Opaque destination descriptor (PIX key or bank tuple)
    pub destination: String,

    /// Current status
    pub status: WithdrawalStatus,

    /// Request timestamp
    pub requested_at: i64,

    /// Approve/reject timestamp (0 until decided)
    pub decided_at: i64,

    /// Completion timestamp (0 until completed)
    pub completed_at: i64,

    /// Admin actor who approved or rejected
    pub decided_by: Option<Pubkey>,

    /// External payout transaction reference, set at completion
    pub external_reference: String,

    /// Rejection/failure note
    pub note: String,

    /// Per-user request index (PDA seed component)
    pub index: u32,

    /// PDA bump
    pub bump: u8,
}

impl WithdrawalRequest {
    /// Account size calculation:
    /// - user: 32 bytes
    /// - amount + 3 timestamps: 32 bytes
    /// - decided_by: 33 bytes (Option<Pubkey>)
    /// - destination: 4 + 128 bytes
    /// - external_reference: 4 + 64 bytes
    /// - note: 4 + 128 bytes
    /// - index: 4 bytes
    /// - method + status + bump: 3 bytes
    /// Total: 436 bytes
    pub const LEN: usize = 32
        + 8 * 4
        + 33
        + (4 + MAX_DESTINATION_LEN)
        + (4 + MAX_EXTERNAL_REF_LEN)
        + (4 + MAX_NOTE_LEN)
        + 4
        + 3;

    /// Pending -> Approved
    pub fn approve(&mut self, admin: Pubkey, now: i64) -> Result<()> {
        require!(
            self.status == WithdrawalStatus::Pending,
            ErrorCode::InvalidState
        );
        self.status = WithdrawalStatus::Approved;
        self.decided_at = now;
        self.decided_by = Some(admin);
        Ok(())
    }

    /// Pending -> Rejected. The caller restores the debited balance in the
    /// same instruction.
    pub fn reject(&mut self, admin: Pubkey, note: &str, now: i64) -> Result<()> {
        require!(note.len() <= MAX_NOTE_LEN, ErrorCode::StringTooLong);
        require!(
            self.status == WithdrawalStatus::Pending,
            ErrorCode::InvalidState
        );
        self.status = WithdrawalStatus::Rejected;
        self.decided_at = now;
        self.decided_by = Some(admin);
        self.note = note.to_string();
        Ok(())
    }

    /// Approved -> Completed, recording the external payout reference
    pub fn complete(&mut self, external_reference: &str, now: i64) -> Result<()> {
        require!(!external_reference.is_empty(), ErrorCode::InvalidParameter);
        require!(
            external_reference.len() <= MAX_EXTERNAL_REF_LEN,
            ErrorCode::StringTooLong
        );
        require!(
            self.status == WithdrawalStatus::Approved,
            ErrorCode::InvalidState
        );
        self.status = WithdrawalStatus::Completed;
        self.completed_at = now;
        self.external_reference = external_reference.to_string();
        Ok(())
    }
}
