use anchor_lang::prelude::*;

use crate::constants::{MAX_NOTE_LEN, MAX_PROOF_REF_LEN};
use crate::errors::ErrorCode;

/// Commission line item kind
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommissionKind {
    MilestoneReward,
    ReferralCommission,
    ProfessionalPayout,
    InfluencerPayout,
    PlatformFee,
    Refund,
}

impl CommissionKind {
    /// Service-sale payouts wait for the underlying delivery to be marked;
    /// referral, milestone and refund items carry no delivery obligation.
    pub fn requires_delivery(&self) -> bool {
        matches!(
            self,
            CommissionKind::ProfessionalPayout
                | CommissionKind::InfluencerPayout
                | CommissionKind::PlatformFee
        )
    }
}

/// Settlement payout status
///
/// Pending -> AwaitingValidation -> Released -> Paid, strictly forward.
/// Records are append-only: a failed external call is annotated, never
/// deleted, and the same transition is simply re-attempted.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SettlementStatus {
    Pending,
    AwaitingValidation,
    Released,
    Paid,
}

/// A computed commission line item and its payout state machine
///
/// The account address is the dedup key (see constants.rs tags), so a second
/// accrual of the same line item fails at init and the calculator is safe to
/// re-run after a partial failure.
#[account]
pub struct Settlement {
    /// Line item kind
    pub kind: CommissionKind,

    /// Group this item originated from (default pubkey for sale splits)
    pub source_group: Pubkey,

    /// Originating participant, when the item is per-participant
    pub source_participant: Option<Pubkey>,

    /// User credited when the settlement is paid
    pub beneficiary: Pubkey,

    /// Line item amount (minor units), rounded once at emission
    pub amount: u64,

    /// Rate applied at emission, kept for audit
    pub rate_bps: Option<u16>,

    /// Current payout status
    pub status: SettlementStatus,

    /// Opaque uploaded-evidence pointer; required before Paid
    pub proof_reference: String,

    /// Last recorded external-failure note (retryable)
    pub error_note: String,

    /// Emission timestamp
    pub created_at: i64,

    /// Pending -> AwaitingValidation timestamp (0 until then)
    pub validated_at: i64,

    /// AwaitingValidation -> Released timestamp (0 until then)
    pub released_at: i64,

    /// Released -> Paid timestamp (0 until then)
    pub paid_at: i64,

    /// Admin actor who released
    pub released_by: Option<Pubkey>,

    /// Admin actor who marked paid
    pub paid_by: Option<Pubkey>,

    /// PDA bump
    pub bump: u8,
}

impl Settlement {
    /// Account size calculation:
    /// - source_group + beneficiary: 64 bytes
    /// - source_participant + released_by + paid_by: 99 bytes (Option<Pubkey>)
    /// - amount + 4 timestamps: 40 bytes
    /// - proof_reference: 4 + 64 bytes
    /// - error_note: 4 + 128 bytes
    /// - rate_bps: 3 bytes (Option<u16>)
    /// - kind + status + bump: 3 bytes
    /// Total: 409 bytes
    pub const LEN: usize =
        32 * 2 + 33 * 3 + 8 * 5 + (4 + MAX_PROOF_REF_LEN) + (4 + MAX_NOTE_LEN) + 3 + 3;

    /// Pending -> AwaitingValidation. Immediate for kinds that need no
    /// delivery proof; service-sale kinds require the delivery flag. Already
    /// AwaitingValidation is a no-op (returns false).
    pub fn begin_validation(&mut self, delivered: bool, now: i64) -> Result<bool> {
        match self.status {
            SettlementStatus::AwaitingValidation => return Ok(false),
            SettlementStatus::Pending => {}
            _ => return err!(ErrorCode::InvalidState),
        }
        if self.kind.requires_delivery() {
            require!(delivered, ErrorCode::DeliveryNotConfirmed);
        }
        self.status = SettlementStatus::AwaitingValidation;
        self.validated_at = now;
        Ok(true)
    }

    /// AwaitingValidation -> Released, by an explicit admin action. Fails
    /// NotReady while Pending; re-release of a Released record is a no-op.
    pub fn release(&mut self, admin: Pubkey, now: i64) -> Result<bool> {
        match self.status {
            SettlementStatus::Released => return Ok(false),
            SettlementStatus::Pending => return err!(ErrorCode::NotReady),
            SettlementStatus::AwaitingValidation => {}
            SettlementStatus::Paid => return err!(ErrorCode::InvalidState),
        }
        self.status = SettlementStatus::Released;
        self.released_at = now;
        self.released_by = Some(admin);
        Ok(true)
    }

    /// Released -> Paid. Requires a non-empty proof reference. A retry with
    /// the same proof on an already-paid record is a no-op (returns false);
    /// the caller credits the ledger only when this returns true.
    pub fn mark_paid(&mut self, proof_reference: &str, admin: Pubkey, now: i64) -> Result<bool> {
        require!(!proof_reference.is_empty(), ErrorCode::MissingProof);
        require!(
            proof_reference.len() <= MAX_PROOF_REF_LEN,
            ErrorCode::StringTooLong
        );

        match self.status {
            SettlementStatus::Paid => {
                // Idempotent retry: same proof is a no-op, a different proof
                // on a paid record is a caller error.
                require!(
                    self.proof_reference == proof_reference,
                    ErrorCode::InvalidState
                );
                return Ok(false);
            }
            SettlementStatus::Released => {}
            _ => return err!(ErrorCode::NotReady),
        }

        self.status = SettlementStatus::Paid;
        self.proof_reference = proof_reference.to_string();
        self.paid_at = now;
        self.paid_by = Some(admin);
        Ok(true)
    }

    /// Annotate a retryable external failure. Never valid on a paid record
    /// and never marks a transition as succeeded.
    pub fn record_failure(&mut self, note: &str) -> Result<()> {
        require!(note.len() <= MAX_NOTE_LEN, ErrorCode::StringTooLong);
        require!(
            self.status != SettlementStatus::Paid,
            ErrorCode::InvalidState
        );
        self.error_note = note.to_string();
        Ok(())
    }
}
