use anchor_lang::prelude::*;

// ══════════════════════════════════════════════════════════════════════════════
// PDA SEEDS
// ══════════════════════════════════════════════════════════════════════════════

/// Platform State PDA seed
pub const PLATFORM_SEED: &[u8] = b"platform_v1";

/// Plan Config PDA seed (per-plan policy: capacity, rates, milestones)
pub const PLAN_SEED: &[u8] = b"plan_v1";

/// Group PDA seed
pub const GROUP_SEED: &[u8] = b"group_v1";

/// Participant PDA seed (one per group + user, blocks double joins)
pub const PARTICIPANT_SEED: &[u8] = b"participant_v1";

/// Settlement PDA seed (commission line item + payout state machine)
pub const SETTLEMENT_SEED: &[u8] = b"settlement_v1";

/// User Ledger PDA seed (materialized balances)
pub const LEDGER_SEED: &[u8] = b"ledger_v1";

/// Ledger Entry PDA seed (one per credited/debited reference)
pub const ENTRY_SEED: &[u8] = b"entry_v1";

/// Withdrawal Request PDA seed
pub const WITHDRAWAL_SEED: &[u8] = b"withdrawal_v1";

// ══════════════════════════════════════════════════════════════════════════════
// SETTLEMENT DEDUP TAGS
// ══════════════════════════════════════════════════════════════════════════════
// Each commission line item derives its settlement address from a stable
// dedup key; a second accrual for the same key fails at account init.

/// Referral commission tag: ["settlement_v1", participant, "referral"]
pub const REFERRAL_TAG: &[u8] = b"referral";

/// Milestone reward tag: ["settlement_v1", group, "milestone", tier_index]
pub const MILESTONE_TAG: &[u8] = b"milestone";

/// Professional payout tag: ["settlement_v1", sale_ref, "professional"]
pub const PROFESSIONAL_TAG: &[u8] = b"professional";

/// Platform fee tag: ["settlement_v1", sale_ref, "platform"]
pub const PLATFORM_FEE_TAG: &[u8] = b"platform";

/// Influencer payout tag: ["settlement_v1", sale_ref, "influencer"]
pub const INFLUENCER_TAG: &[u8] = b"influencer";

/// Refund tag: ["settlement_v1", participant, "refund"]
pub const REFUND_TAG: &[u8] = b"refund";

/// Withdrawal reversal entry tag: ["entry_v1", withdrawal, "reversal"]
pub const REVERSAL_TAG: &[u8] = b"reversal";

/// Withdrawal completion entry tag: ["entry_v1", withdrawal, "completed"]
pub const COMPLETED_TAG: &[u8] = b"completed";

// ══════════════════════════════════════════════════════════════════════════════
// OPERATIONAL THRESHOLDS
// ══════════════════════════════════════════════════════════════════════════════

/// Basis points divisor (10000 = 100%)
pub const BPS_DIVISOR: u64 = 10_000;

/// Default minimum withdrawal (R$ 50.00 in centavos)
pub const DEFAULT_MIN_WITHDRAWAL: u64 = 5_000;

/// Maximum participants per group
pub const MAX_CAPACITY: u8 = 20;

/// Maximum milestone tiers per plan (fits the u8 fired-bitmask with room)
pub const MAX_MILESTONE_TIERS: usize = 4;

// ══════════════════════════════════════════════════════════════════════════════
// STRING FIELD LIMITS (account space is fixed at init)
// ══════════════════════════════════════════════════════════════════════════════

/// Maximum length of an uploaded-evidence reference
pub const MAX_PROOF_REF_LEN: usize = 64;

/// Maximum length of an external payout reference
pub const MAX_EXTERNAL_REF_LEN: usize = 64;

/// Maximum length of a failure note / rejection note
pub const MAX_NOTE_LEN: usize = 128;

/// Maximum length of a payout destination (PIX key or bank tuple)
pub const MAX_DESTINATION_LEN: usize = 128;

/// Maximum length of a cancellation reason
pub const MAX_REASON_LEN: usize = 64;
