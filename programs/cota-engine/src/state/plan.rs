use anchor_lang::prelude::*;

use crate::constants::{BPS_DIVISOR, MAX_CAPACITY, MAX_MILESTONE_TIERS};
use crate::errors::ErrorCode;

/// Who receives the purchased benefit once a group fills
///
/// The source platform was inconsistent about this; it is a per-plan product
/// decision, configured here and enforced at contemplation time.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContemplationPolicy {
    /// A single participant is drawn as the winner
    SingleWinner,
    /// Every validated participant is granted the benefit
    AllParticipants,
}

/// One milestone tier: a fixed reward paid to the group's organizer when the
/// participant count crosses the threshold. Fires at most once per group.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MilestoneTier {
    /// Participant-count threshold (1..=capacity)
    pub threshold: u8,
    /// Fixed reward amount (minor units)
    pub reward: u64,
}

impl MilestoneTier {
    pub const LEN: usize = 1 + 8;
}

/// Per-plan policy: capacity, rates, milestone table and the sale split
///
/// Rate configuration lives here and nowhere else. Split percentages are
/// validated at configuration time, not at settlement time.
#[account]
pub struct PlanConfig {
    /// Plan identifier (external catalog id)
    pub plan_id: u64,

    /// Fixed group capacity
    pub capacity: u8,

    /// Expected payment per participant (minor units)
    pub quota_amount: u64,

    /// Referral commission rate applied to a participant's amount_paid
    pub referral_rate_bps: u16,

    /// Milestone table, first `milestone_count` entries are live
    pub milestones: [MilestoneTier; MAX_MILESTONE_TIERS],

    /// Number of live milestone tiers
    pub milestone_count: u8,

    /// Professional share of a completed service sale
    pub professional_share_bps: u16,

    /// Platform percentage share of a completed service sale
    pub platform_share_bps: u16,

    /// Influencer share, applied only when an influencer code was used
    pub influencer_share_bps: u16,

    /// Flat platform fee carved out of the professional share (minor units)
    pub fixed_platform_fee: u64,

    /// Contemplation policy for groups under this plan
    pub contemplation_policy: ContemplationPolicy,

    /// PDA bump
    pub bump: u8,
}

impl PlanConfig {
    /// Account size calculation:
    /// - plan_id + quota_amount + fixed_platform_fee: 24 bytes
    /// - milestones: 4 * 9 = 36 bytes
    /// - 4 u16: 8 bytes (referral_rate_bps, professional/platform/influencer shares)
    /// - capacity + milestone_count + contemplation_policy + bump: 4 bytes
    /// Total: 72 bytes
    pub const LEN: usize = 8 * 3 + MAX_MILESTONE_TIERS * MilestoneTier::LEN + 2 * 4 + 4;

    /// Validate the whole rate configuration. Called on create and on every
    /// rate update so an illegal split can never reach settlement time.
    pub fn validate(&self) -> Result<()> {
        require!(
            self.capacity >= 1 && self.capacity <= MAX_CAPACITY,
            ErrorCode::InvalidParameter
        );
        require!(self.quota_amount > 0, ErrorCode::InvalidParameter);
        require!(
            self.referral_rate_bps as u64 <= BPS_DIVISOR,
            ErrorCode::InvalidParameter
        );
        require!(
            self.milestone_count as usize <= MAX_MILESTONE_TIERS,
            ErrorCode::InvalidParameter
        );

        // Thresholds strictly increasing and within capacity
        let mut previous = 0u8;
        for tier in self.milestones.iter().take(self.milestone_count as usize) {
            require!(tier.threshold > previous, ErrorCode::InvalidParameter);
            require!(tier.threshold <= self.capacity, ErrorCode::InvalidParameter);
            require!(tier.reward > 0, ErrorCode::InvalidParameter);
            previous = tier.threshold;
        }

        // Percentage splits must sum to at most 100%; the remainder is
        // retained by the platform.
        let split_sum = self.professional_share_bps as u64
            + self.platform_share_bps as u64
            + self.influencer_share_bps as u64;
        require!(split_sum <= BPS_DIVISOR, ErrorCode::InvalidSplitConfiguration);

        Ok(())
    }

    /// Live milestone tier by index
    pub fn milestone(&self, tier_index: u8) -> Result<MilestoneTier> {
        require!(
            tier_index < self.milestone_count,
            ErrorCode::InvalidParameter
        );
        Ok(self.milestones[tier_index as usize])
    }

    /// Populate from creation parameters, then validate
    pub fn apply_params(&mut self, params: &PlanParams) -> Result<()> {
        require!(
            params.milestones.len() <= MAX_MILESTONE_TIERS,
            ErrorCode::InvalidParameter
        );

        self.capacity = params.capacity;
        self.quota_amount = params.quota_amount;
        self.referral_rate_bps = params.referral_rate_bps;
        self.milestones = [MilestoneTier::default(); MAX_MILESTONE_TIERS];
        for (slot, tier) in self.milestones.iter_mut().zip(params.milestones.iter()) {
            *slot = *tier;
        }
        self.milestone_count = params.milestones.len() as u8;
        self.professional_share_bps = params.professional_share_bps;
        self.platform_share_bps = params.platform_share_bps;
        self.influencer_share_bps = params.influencer_share_bps;
        self.fixed_platform_fee = params.fixed_platform_fee;
        self.contemplation_policy = params.contemplation_policy;

        self.validate()
    }
}

/// Plan creation parameters
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct PlanParams {
    pub capacity: u8,
    pub quota_amount: u64,
    pub referral_rate_bps: u16,
    pub milestones: Vec<MilestoneTier>,
    pub professional_share_bps: u16,
    pub platform_share_bps: u16,
    pub influencer_share_bps: u16,
    pub fixed_platform_fee: u64,
    pub contemplation_policy: ContemplationPolicy,
}
