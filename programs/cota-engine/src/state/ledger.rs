use anchor_lang::prelude::*;

use crate::errors::ErrorCode;

/// Balance-affecting event type, mirrored on every LedgerEntry
///
/// WithdrawalRequest rows debit `available`; WithdrawalCompleted rows settle
/// `pending_out` and carry amount 0 so the available reconciliation sum is
/// unaffected. `Spent` is reserved for the external service-purchase
/// collaborator and is written by no engine instruction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryType {
    Earned,
    Spent,
    Refund,
    WithdrawalRequest,
    WithdrawalCompleted,
    ServicePayment,
    ReferralCommission,
    MarketplaceCommission,
    ProfessionalEarnings,
}

/// Per-user materialized balances
///
/// Aggregates are maintained in lockstep with the append-only entry log:
/// every credit/debit writes one LedgerEntry and adjusts these counters in
/// the same instruction. `available` is unsigned, so the "never negative"
/// invariant is structural.
#[account]
pub struct UserLedger {
    /// Owning user
    pub user: Pubkey,

    /// Withdrawable balance (minor units)
    pub available: u64,

    /// Amount locked in open withdrawal requests
    pub pending_out: u64,

    /// Lifetime credited amount
    pub total_earned: u64,

    /// Lifetime completed withdrawals
    pub total_withdrawn: u64,

    /// Entries written for this user
    pub entry_count: u32,

    /// Withdrawal requests opened by this user (also the next request index)
    pub withdrawal_count: u32,

    /// PDA bump
    pub bump: u8,
}

impl UserLedger {
    /// Account size calculation:
    /// - user: 32 bytes
    /// - 4 u64: 32 bytes (available, pending_out, total_earned, total_withdrawn)
    /// - 2 u32: 8 bytes (entry_count, withdrawal_count)
    /// - bump: 1 byte
    /// Total: 73 bytes
    pub const LEN: usize = 32 + 8 * 4 + 4 * 2 + 1;

    /// Credit the available balance
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.available = self
            .available
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.total_earned = self
            .total_earned
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.entry_count = self
            .entry_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    /// Move available balance into the pending-out bucket (withdrawal debit).
    /// The balance check and the debit are one step on one account; there is
    /// no read-then-write gap for a concurrent credit to slip into.
    pub fn debit_for_withdrawal(&mut self, amount: u64) -> Result<()> {
        require!(self.available >= amount, ErrorCode::InsufficientBalance);
        self.available -= amount;
        self.pending_out = self
            .pending_out
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.entry_count = self
            .entry_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    /// Reverse a withdrawal debit exactly (rejected request)
    pub fn restore_withdrawal(&mut self, amount: u64) -> Result<()> {
        require!(self.pending_out >= amount, ErrorCode::InvalidState);
        self.pending_out -= amount;
        self.available = self
            .available
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.entry_count = self
            .entry_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    /// Settle a completed withdrawal out of the pending bucket
    pub fn finish_withdrawal(&mut self, amount: u64) -> Result<()> {
        require!(self.pending_out >= amount, ErrorCode::InvalidState);
        self.pending_out -= amount;
        self.total_withdrawn = self
            .total_withdrawn
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.entry_count = self
            .entry_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }
}

/// One append-only row in a user's balance log
///
/// The PDA is derived from the credited/debited reference, so crediting the
/// same reference twice fails at init — the exactly-once guarantee is
/// structural, and `DuplicateCredit` only surfaces as a defensive check.
#[account]
pub struct LedgerEntry {
    /// User whose balance moved
    pub user: Pubkey,

    /// Signed amount: positive credit, negative debit (minor units)
    pub amount: i64,

    /// What kind of balance event this was
    pub entry_type: EntryType,

    /// Settlement, withdrawal or external reference
    pub reference: Pubkey,

    /// Timestamp
    pub created_at: i64,

    /// PDA bump
    pub bump: u8,
}

impl LedgerEntry {
    /// Account size calculation:
    /// - user + reference: 64 bytes
    /// - amount + created_at: 16 bytes
    /// - entry_type + bump: 2 bytes
    /// Total: 82 bytes
    pub const LEN: usize = 32 * 2 + 8 * 2 + 2;
}
