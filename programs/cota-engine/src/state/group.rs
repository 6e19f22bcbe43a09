use anchor_lang::prelude::*;

use crate::errors::ErrorCode;
use crate::state::ContemplationPolicy;

/// Group lifecycle phase
///
/// Transitions are monotonic: Forming -> Full -> Contemplated, with
/// Cancelled reachable from Forming or Full. Contemplated and Cancelled are
/// terminal. All transition checks live on `Group`; call sites never compare
/// phases ad hoc.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum GroupPhase {
    Forming,
    Full,
    Contemplated,
    Cancelled,
}

impl GroupPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GroupPhase::Contemplated | GroupPhase::Cancelled)
    }
}

/// A bounded cohort of participants pooling toward a shared purchase
#[account]
pub struct Group {
    /// Owning plan
    pub plan: Pubkey,

    /// Group identifier, unique under the plan
    pub group_id: u64,

    /// Originating referrer; beneficiary of milestone rewards
    pub organizer: Pubkey,

    /// Fixed capacity, copied from the plan at creation
    pub capacity: u8,

    /// Accepted participants so far; never exceeds capacity
    pub participant_count: u8,

    /// Sum of amount_paid across accepted participants
    pub accumulated_amount: u64,

    /// capacity * quota_amount, fixed at creation
    pub target_amount: u64,

    /// Current lifecycle phase
    pub phase: GroupPhase,

    /// Bitmask of milestone tiers already awarded (bit = tier index)
    pub milestones_fired: u8,

    /// Winner recorded at contemplation (SingleWinner policy only)
    pub winner: Option<Pubkey>,

    /// Creation timestamp
    pub created_at: i64,

    /// Timestamp of the Full -> Contemplated transition (0 until then)
    pub completed_at: i64,

    /// Timestamp of cancellation (0 unless cancelled)
    pub cancelled_at: i64,

    /// PDA bump
    pub bump: u8,
}

impl Group {
    /// Account size calculation:
    /// - plan + organizer: 64 bytes
    /// - group_id + accumulated_amount + target_amount: 24 bytes
    /// - created_at + completed_at + cancelled_at: 24 bytes
    /// - winner: 33 bytes (Option<Pubkey>)
    /// - capacity, participant_count, phase, milestones_fired, bump: 5 bytes
    /// Total: 150 bytes
    pub const LEN: usize = 32 * 2 + 8 * 3 + 8 * 3 + 33 + 5;

    /// Atomic slot claim: the capacity check, count increment and the
    /// Forming -> Full flip happen in one step, so there is no window where
    /// the count equals capacity while the phase is still stale.
    ///
    /// A join at capacity (the losing concurrent joiner) is rejected with
    /// CapacityExceeded; InvalidState is reserved for terminal phases.
    ///
    /// Returns the claimed position (1..=capacity).
    pub fn claim_slot(&mut self, amount_paid: u64) -> Result<u8> {
        require!(!self.phase.is_terminal(), ErrorCode::InvalidState);
        require!(
            self.participant_count < self.capacity,
            ErrorCode::CapacityExceeded
        );

        self.participant_count += 1;
        self.accumulated_amount = self
            .accumulated_amount
            .checked_add(amount_paid)
            .ok_or(ErrorCode::MathOverflow)?;

        if self.participant_count == self.capacity {
            self.phase = GroupPhase::Full;
        }

        Ok(self.participant_count)
    }

    /// Full -> Contemplated. The winner argument is validated against the
    /// plan's contemplation policy: SingleWinner requires one, AllParticipants
    /// forbids one. Membership of the winner is checked by the caller via the
    /// participant account.
    pub fn advance_to_contemplated(
        &mut self,
        policy: ContemplationPolicy,
        winner: Option<Pubkey>,
        now: i64,
    ) -> Result<()> {
        require!(self.phase == GroupPhase::Full, ErrorCode::InvalidState);
        match policy {
            ContemplationPolicy::SingleWinner => {
                require!(winner.is_some(), ErrorCode::WinnerRequired)
            }
            ContemplationPolicy::AllParticipants => {
                require!(winner.is_none(), ErrorCode::WinnerNotAllowed)
            }
        }

        self.phase = GroupPhase::Contemplated;
        self.winner = winner;
        self.completed_at = now;
        Ok(())
    }

    /// Forming | Full -> Cancelled. Valid only pre-contemplation; refund line
    /// items are queued afterwards per participant.
    pub fn cancel(&mut self, now: i64) -> Result<()> {
        require!(
            matches!(self.phase, GroupPhase::Forming | GroupPhase::Full),
            ErrorCode::InvalidState
        );
        self.phase = GroupPhase::Cancelled;
        self.cancelled_at = now;
        Ok(())
    }

    /// Mark a milestone tier as awarded. Rejects a re-fire and a fire below
    /// the threshold; together with the settlement PDA this makes milestone
    /// rewards exactly-once per (group, threshold).
    pub fn fire_milestone(&mut self, tier_index: u8, threshold: u8) -> Result<()> {
        require!(
            self.participant_count >= threshold,
            ErrorCode::MilestoneNotReached
        );
        let bit = 1u8
            .checked_shl(tier_index as u32)
            .ok_or(ErrorCode::InvalidParameter)?;
        require!(
            self.milestones_fired & bit == 0,
            ErrorCode::MilestoneAlreadyAwarded
        );
        self.milestones_fired |= bit;
        Ok(())
    }

    pub fn milestone_fired(&self, tier_index: u8) -> bool {
        1u8.checked_shl(tier_index as u32)
            .is_some_and(|bit| self.milestones_fired & bit != 0)
    }
}
