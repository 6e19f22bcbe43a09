use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::ErrorCode;
use crate::state::*;

// ACCOUNTS - Instruction account validation structs

#[derive(Accounts)]
pub struct InitializePlatform<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + PlatformState::LEN,
        seeds = [PLATFORM_SEED],
        bump
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct AdminControl<'info> {
    #[account(
        mut,
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct TransferAdmin<'info> {
    #[account(
        mut,
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    pub admin: Signer<'info>,
    /// CHECK: New admin authority, recorded on the platform state
    pub new_admin: AccountInfo<'info>,
}

#[derive(Accounts)]
#[instruction(plan_id: u64)]
pub struct CreatePlan<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(
        init,
        payer = admin,
        space = 8 + PlanConfig::LEN,
        seeds = [PLAN_SEED, plan_id.to_le_bytes().as_ref()],
        bump
    )]
    pub plan: Account<'info, PlanConfig>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdatePlanRates<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(
        mut,
        seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()],
        bump = plan.bump
    )]
    pub plan: Account<'info, PlanConfig>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(group_id: u64)]
pub struct CreateGroup<'info> {
    #[account(mut, seeds = [PLATFORM_SEED], bump = platform.bump)]
    pub platform: Account<'info, PlatformState>,
    #[account(seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()], bump = plan.bump)]
    pub plan: Account<'info, PlanConfig>,
    #[account(
        init,
        payer = organizer,
        space = 8 + Group::LEN,
        seeds = [GROUP_SEED, plan.key().as_ref(), group_id.to_le_bytes().as_ref()],
        bump
    )]
    pub group: Account<'info, Group>,
    #[account(mut)]
    pub organizer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// JoinGroup - the atomic claim-slot operation
///
/// The group account is written under the runtime's exclusive lock: the
/// capacity check, position assignment and the Forming -> Full flip commit
/// together or not at all. A losing concurrent joiner fails here, before any
/// payment capture happens downstream.
#[derive(Accounts)]
pub struct JoinGroup<'info> {
    #[account(seeds = [PLATFORM_SEED], bump = platform.bump)]
    pub platform: Account<'info, PlatformState>,
    #[account(seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()], bump = plan.bump)]
    pub plan: Account<'info, PlanConfig>,
    #[account(
        mut,
        constraint = group.plan == plan.key() @ ErrorCode::InvalidParameter
    )]
    pub group: Account<'info, Group>,
    #[account(
        init,
        payer = user,
        space = 8 + Participant::LEN,
        seeds = [PARTICIPANT_SEED, group.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub participant: Account<'info, Participant>,
    #[account(mut)]
    pub user: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ValidateParticipant<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    pub group: Account<'info, Group>,
    #[account(
        mut,
        constraint = participant.group == group.key() @ ErrorCode::NotAParticipant
    )]
    pub participant: Account<'info, Participant>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct AdvanceToContemplated<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()], bump = plan.bump)]
    pub plan: Account<'info, PlanConfig>,
    #[account(
        mut,
        constraint = group.plan == plan.key() @ ErrorCode::InvalidParameter
    )]
    pub group: Account<'info, Group>,
    /// Winner's participant record; required under the SingleWinner policy
    /// to prove group membership
    #[account(constraint = winner_participant.group == group.key() @ ErrorCode::NotAParticipant)]
    pub winner_participant: Option<Account<'info, Participant>>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct CancelGroup<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub group: Account<'info, Group>,
    pub admin: Signer<'info>,
}

/// AccrueReferralCommission - permissionless calculator crank
///
/// The settlement PDA is the dedup key: a re-run for the same participant
/// fails at init, so the line item is emitted exactly once.
#[derive(Accounts)]
pub struct AccrueReferralCommission<'info> {
    #[account(mut, seeds = [PLATFORM_SEED], bump = platform.bump)]
    pub platform: Account<'info, PlatformState>,
    #[account(seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()], bump = plan.bump)]
    pub plan: Account<'info, PlanConfig>,
    #[account(constraint = group.plan == plan.key() @ ErrorCode::InvalidParameter)]
    pub group: Account<'info, Group>,
    #[account(constraint = participant.group == group.key() @ ErrorCode::NotAParticipant)]
    pub participant: Account<'info, Participant>,
    #[account(
        init,
        payer = payer,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, participant.key().as_ref(), REFERRAL_TAG],
        bump
    )]
    pub settlement: Account<'info, Settlement>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// AccrueMilestoneReward - permissionless calculator crank
///
/// Dual exactly-once guard: the group's fired bitmask plus the settlement
/// PDA keyed by (group, tier index).
#[derive(Accounts)]
#[instruction(tier_index: u8)]
pub struct AccrueMilestoneReward<'info> {
    #[account(mut, seeds = [PLATFORM_SEED], bump = platform.bump)]
    pub platform: Account<'info, PlatformState>,
    #[account(seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()], bump = plan.bump)]
    pub plan: Account<'info, PlanConfig>,
    #[account(
        mut,
        constraint = group.plan == plan.key() @ ErrorCode::InvalidParameter
    )]
    pub group: Account<'info, Group>,
    #[account(
        init,
        payer = payer,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, group.key().as_ref(), MILESTONE_TAG, &[tier_index]],
        bump
    )]
    pub settlement: Account<'info, Settlement>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// SettleServiceSale - split a completed sale (no influencer code)
#[derive(Accounts)]
pub struct SettleServiceSale<'info> {
    #[account(
        mut,
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()], bump = plan.bump)]
    pub plan: Account<'info, PlanConfig>,
    /// CHECK: External sale identifier, used only for PDA derivation
    pub sale_ref: UncheckedAccount<'info>,
    /// CHECK: Professional credited by the sale
    pub professional: AccountInfo<'info>,
    #[account(
        init,
        payer = admin,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, sale_ref.key().as_ref(), PROFESSIONAL_TAG],
        bump
    )]
    pub settlement_professional: Account<'info, Settlement>,
    #[account(
        init,
        payer = admin,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, sale_ref.key().as_ref(), PLATFORM_FEE_TAG],
        bump
    )]
    pub settlement_platform: Account<'info, Settlement>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// SettleServiceSaleWithInfluencer - same split with the influencer share
/// applied (separate context: Anchor cannot conditionally init an account)
#[derive(Accounts)]
pub struct SettleServiceSaleWithInfluencer<'info> {
    #[account(
        mut,
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(seeds = [PLAN_SEED, plan.plan_id.to_le_bytes().as_ref()], bump = plan.bump)]
    pub plan: Account<'info, PlanConfig>,
    /// CHECK: External sale identifier, used only for PDA derivation
    pub sale_ref: UncheckedAccount<'info>,
    /// CHECK: Professional credited by the sale
    pub professional: AccountInfo<'info>,
    /// CHECK: Influencer whose code was used on the sale
    pub influencer: AccountInfo<'info>,
    #[account(
        init,
        payer = admin,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, sale_ref.key().as_ref(), PROFESSIONAL_TAG],
        bump
    )]
    pub settlement_professional: Account<'info, Settlement>,
    #[account(
        init,
        payer = admin,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, sale_ref.key().as_ref(), PLATFORM_FEE_TAG],
        bump
    )]
    pub settlement_platform: Account<'info, Settlement>,
    #[account(
        init,
        payer = admin,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, sale_ref.key().as_ref(), INFLUENCER_TAG],
        bump
    )]
    pub settlement_influencer: Account<'info, Settlement>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// QueueParticipantRefund - post-cancellation crank, once per participant
#[derive(Accounts)]
pub struct QueueParticipantRefund<'info> {
    #[account(mut, seeds = [PLATFORM_SEED], bump = platform.bump)]
    pub platform: Account<'info, PlatformState>,
    pub group: Account<'info, Group>,
    #[account(
        mut,
        constraint = participant.group == group.key() @ ErrorCode::NotAParticipant
    )]
    pub participant: Account<'info, Participant>,
    #[account(
        init,
        payer = payer,
        space = 8 + Settlement::LEN,
        seeds = [SETTLEMENT_SEED, participant.key().as_ref(), REFUND_TAG],
        bump
    )]
    pub settlement: Account<'info, Settlement>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SubmitSettlement<'info> {
    #[account(seeds = [PLATFORM_SEED], bump = platform.bump)]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub settlement: Account<'info, Settlement>,
    pub payer: Signer<'info>,
}

#[derive(Accounts)]
pub struct ReleaseSettlement<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub settlement: Account<'info, Settlement>,
    pub admin: Signer<'info>,
}

/// PaySettlement - Released -> Paid plus the exactly-once ledger credit
///
/// The ledger entry PDA is keyed by the settlement address. init_if_needed
/// lets an idempotent retry (same proof) pass through as a no-op instead of
/// failing at init; the handler refuses to credit twice.
#[derive(Accounts)]
pub struct PaySettlement<'info> {
    #[account(
        mut,
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub settlement: Account<'info, Settlement>,
    #[account(
        mut,
        seeds = [LEDGER_SEED, settlement.beneficiary.as_ref()],
        bump = ledger.bump,
        constraint = ledger.user == settlement.beneficiary @ ErrorCode::InvalidParameter
    )]
    pub ledger: Account<'info, UserLedger>,
    #[account(
        init_if_needed,
        payer = admin,
        space = 8 + LedgerEntry::LEN,
        seeds = [ENTRY_SEED, settlement.key().as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RecordSettlementFailure<'info> {
    #[account(
        mut,
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub settlement: Account<'info, Settlement>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct InitUserLedger<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + UserLedger::LEN,
        seeds = [LEDGER_SEED, user.key().as_ref()],
        bump
    )]
    pub ledger: Account<'info, UserLedger>,
    /// CHECK: User the ledger belongs to
    pub user: AccountInfo<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// RequestWithdrawal - balance check, debit and request creation in one
/// instruction; the ledger account lock makes them atomic against
/// concurrent credits
#[derive(Accounts)]
pub struct RequestWithdrawal<'info> {
    #[account(seeds = [PLATFORM_SEED], bump = platform.bump)]
    pub platform: Account<'info, PlatformState>,
    #[account(
        mut,
        seeds = [LEDGER_SEED, user.key().as_ref()],
        bump = ledger.bump
    )]
    pub ledger: Account<'info, UserLedger>,
    #[account(
        init,
        payer = user,
        space = 8 + WithdrawalRequest::LEN,
        seeds = [
            WITHDRAWAL_SEED,
            user.key().as_ref(),
            ledger.withdrawal_count.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub withdrawal: Account<'info, WithdrawalRequest>,
    #[account(
        init,
        payer = user,
        space = 8 + LedgerEntry::LEN,
        seeds = [ENTRY_SEED, withdrawal.key().as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,
    #[account(mut)]
    pub user: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct DecideWithdrawal<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub withdrawal: Account<'info, WithdrawalRequest>,
    pub admin: Signer<'info>,
}

/// RejectWithdrawal - restores the debited amount exactly, with a reversal
/// entry keyed by (withdrawal, reversal) so the restore is also exactly-once
#[derive(Accounts)]
pub struct RejectWithdrawal<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub withdrawal: Account<'info, WithdrawalRequest>,
    #[account(
        mut,
        seeds = [LEDGER_SEED, withdrawal.user.as_ref()],
        bump = ledger.bump
    )]
    pub ledger: Account<'info, UserLedger>,
    #[account(
        init,
        payer = admin,
        space = 8 + LedgerEntry::LEN,
        seeds = [ENTRY_SEED, withdrawal.key().as_ref(), REVERSAL_TAG],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// CompleteWithdrawal - terminal; settles the pending bucket and writes the
/// completion entry keyed by (withdrawal, completed)
#[derive(Accounts)]
pub struct CompleteWithdrawal<'info> {
    #[account(
        seeds = [PLATFORM_SEED],
        bump = platform.bump,
        constraint = admin.key() == platform.admin @ ErrorCode::UnauthorizedAccess
    )]
    pub platform: Account<'info, PlatformState>,
    #[account(mut)]
    pub withdrawal: Account<'info, WithdrawalRequest>,
    #[account(
        mut,
        seeds = [LEDGER_SEED, withdrawal.user.as_ref()],
        bump = ledger.bump
    )]
    pub ledger: Account<'info, UserLedger>,
    #[account(
        init,
        payer = admin,
        space = 8 + LedgerEntry::LEN,
        seeds = [ENTRY_SEED, withdrawal.key().as_ref(), COMPLETED_TAG],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}
