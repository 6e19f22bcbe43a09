use anchor_lang::prelude::*;

use crate::state::{CommissionKind, PayoutMethod};

// ══════════════════════════════════════════════════════════════════════════════
// PLATFORM EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Emitted when the platform state is initialized
#[event]
pub struct PlatformInitialized {
    pub admin: Pubkey,
    pub min_withdrawal: u64,
    pub timestamp: i64,
}

/// Emitted when the platform is paused or resumed
#[event]
pub struct StatusChanged {
    pub is_active: bool,
    pub admin: Pubkey,
    pub timestamp: i64,
}

/// Emitted when admin authority is transferred
#[event]
pub struct AdminTransferred {
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// PLAN EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Emitted when a plan configuration is created
#[event]
pub struct PlanCreated {
    pub plan: Pubkey,
    pub plan_id: u64,
    pub capacity: u8,
    pub referral_rate_bps: u16,
    pub timestamp: i64,
}

/// Emitted when a plan's rate configuration changes
#[event]
pub struct PlanRatesUpdated {
    pub plan: Pubkey,
    pub referral_rate_bps: u16,
    pub professional_share_bps: u16,
    pub platform_share_bps: u16,
    pub influencer_share_bps: u16,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// GROUP LIFECYCLE EVENTS
// ══════════════════════════════════════════════════════════════════════════════
// Consumed by the notification collaborator; fire-and-forget, no invariant
// depends on delivery.

/// Emitted when a group opens in Forming
#[event]
pub struct GroupCreated {
    pub group: Pubkey,
    pub plan: Pubkey,
    pub organizer: Pubkey,
    pub capacity: u8,
    pub target_amount: u64,
    pub timestamp: i64,
}

/// Emitted on every accepted join
#[event]
pub struct ParticipantJoined {
    pub group: Pubkey,
    pub user: Pubkey,
    pub position: u8,
    pub amount_paid: u64,
    pub referrer: Option<Pubkey>,
    pub timestamp: i64,
}

/// Emitted when administration confirms a participant's payment
#[event]
pub struct ParticipantValidated {
    pub group: Pubkey,
    pub participant: Pubkey,
    pub timestamp: i64,
}

/// Emitted exactly once, when the last slot fills
#[event]
pub struct GroupFilled {
    pub group: Pubkey,
    pub participant_count: u8,
    pub accumulated_amount: u64,
    pub timestamp: i64,
}

/// Emitted at contemplation
#[event]
pub struct GroupContemplated {
    pub group: Pubkey,
    pub winner: Option<Pubkey>,
    pub timestamp: i64,
}

/// Emitted at cancellation
#[event]
pub struct GroupCancelled {
    pub group: Pubkey,
    pub reason: String,
    pub participant_count: u8,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// COMMISSION EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Emitted when a referral commission line item is accrued
#[event]
pub struct ReferralCommissionAccrued {
    pub settlement: Pubkey,
    pub participant: Pubkey,
    pub beneficiary: Pubkey,
    pub amount: u64,
    pub rate_bps: u16,
    pub timestamp: i64,
}

/// Emitted when a milestone tier fires for a group
#[event]
pub struct MilestoneRewardAccrued {
    pub settlement: Pubkey,
    pub group: Pubkey,
    pub tier_index: u8,
    pub threshold: u8,
    pub beneficiary: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when a completed service sale is split into settlements
#[event]
pub struct ServiceSaleSettled {
    pub sale_ref: Pubkey,
    pub total_amount: u64,
    pub professional_amount: u64,
    pub platform_amount: u64,
    pub influencer_amount: u64,
    pub timestamp: i64,
}

/// Emitted when a refund line item is queued after cancellation
#[event]
pub struct RefundQueued {
    pub settlement: Pubkey,
    pub group: Pubkey,
    pub participant: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// SETTLEMENT EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Emitted on Pending -> AwaitingValidation
#[event]
pub struct SettlementSubmitted {
    pub settlement: Pubkey,
    pub kind: CommissionKind,
    pub timestamp: i64,
}

/// Emitted on AwaitingValidation -> Released
#[event]
pub struct SettlementReleased {
    pub settlement: Pubkey,
    pub beneficiary: Pubkey,
    pub amount: u64,
    pub released_by: Pubkey,
    pub timestamp: i64,
}

/// Emitted on Released -> Paid, after the ledger credit
#[event]
pub struct SettlementPaid {
    pub settlement: Pubkey,
    pub beneficiary: Pubkey,
    pub amount: u64,
    pub proof_reference: String,
    pub paid_by: Pubkey,
    pub timestamp: i64,
}

/// Emitted when an external collaborator failure is recorded
#[event]
pub struct SettlementFailureRecorded {
    pub settlement: Pubkey,
    pub note: String,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// LEDGER & WITHDRAWAL EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Emitted when a user's available balance is credited
#[event]
pub struct LedgerCredited {
    pub user: Pubkey,
    pub amount: u64,
    pub reference: Pubkey,
    pub available: u64,
    pub timestamp: i64,
}

/// Emitted when a withdrawal request is accepted and the balance debited
#[event]
pub struct WithdrawalRequested {
    pub withdrawal: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub method: PayoutMethod,
    pub timestamp: i64,
}

/// Emitted when an admin approves a withdrawal
#[event]
pub struct WithdrawalApproved {
    pub withdrawal: Pubkey,
    pub admin: Pubkey,
    pub timestamp: i64,
}

/// Emitted when an admin rejects a withdrawal; the debit is restored exactly
#[event]
pub struct WithdrawalRejected {
    pub withdrawal: Pubkey,
    pub admin: Pubkey,
    pub amount_restored: u64,
    pub timestamp: i64,
}

/// Emitted when the external payout completes
#[event]
pub struct WithdrawalCompleted {
    pub withdrawal: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub external_reference: String,
    pub timestamp: i64,
}
