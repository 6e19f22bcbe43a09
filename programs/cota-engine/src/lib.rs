use anchor_lang::prelude::*;

pub mod constants;
pub mod contexts;
pub mod errors;
pub mod events;
pub mod helpers;
pub mod state;

mod formal_verification;
mod tests;

pub use constants::*;
pub use contexts::*;
pub use errors::ErrorCode;
use events::*;
use helpers::math::{apply_rate_half_up, split_service_sale};
pub use state::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod cota_engine {
    use super::*;

    // ──────────────────────────────────────────────────────────────────────
    // Platform administration
    // ──────────────────────────────────────────────────────────────────────

    pub fn initialize_platform(
        ctx: Context<InitializePlatform>,
        min_withdrawal: u64,
    ) -> Result<()> {
        let platform = &mut ctx.accounts.platform;
        let clock = Clock::get()?;

        platform.admin = ctx.accounts.admin.key();
        platform.min_withdrawal = if min_withdrawal == 0 {
            DEFAULT_MIN_WITHDRAWAL
        } else {
            min_withdrawal
        };
        platform.is_active = true;
        platform.total_groups = 0;
        platform.total_settlements = 0;
        platform.total_settlements_paid = 0;
        platform.total_paid_out = 0;
        platform.failed_settlements = 0;
        platform.initialized_at = clock.unix_timestamp;
        platform.bump = ctx.bumps.platform;

        emit!(PlatformInitialized {
            admin: platform.admin,
            min_withdrawal: platform.min_withdrawal,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn update_platform_params(
        ctx: Context<AdminControl>,
        new_min_withdrawal: Option<u64>,
    ) -> Result<()> {
        let platform = &mut ctx.accounts.platform;
        if let Some(v) = new_min_withdrawal {
            require!(v > 0, ErrorCode::InvalidParameter);
            platform.min_withdrawal = v;
        }
        Ok(())
    }

    pub fn pause(ctx: Context<AdminControl>) -> Result<()> {
        let platform = &mut ctx.accounts.platform;
        platform.is_active = false;
        emit!(StatusChanged {
            is_active: false,
            admin: ctx.accounts.admin.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });
        Ok(())
    }

    pub fn resume(ctx: Context<AdminControl>) -> Result<()> {
        let platform = &mut ctx.accounts.platform;
        platform.is_active = true;
        emit!(StatusChanged {
            is_active: true,
            admin: ctx.accounts.admin.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });
        Ok(())
    }

    pub fn transfer_admin(ctx: Context<TransferAdmin>) -> Result<()> {
        let platform = &mut ctx.accounts.platform;
        let old_admin = platform.admin;
        platform.admin = ctx.accounts.new_admin.key();
        emit!(AdminTransferred {
            old_admin,
            new_admin: platform.admin,
            timestamp: Clock::get()?.unix_timestamp,
        });
        Ok(())
    }

    // ──────────────────────────────────────────────────────────────────────
    // Plan configuration
    // ──────────────────────────────────────────────────────────────────────

    pub fn create_plan(ctx: Context<CreatePlan>, plan_id: u64, params: PlanParams) -> Result<()> {
        let plan = &mut ctx.accounts.plan;
        let clock = Clock::get()?;

        plan.plan_id = plan_id;
        plan.bump = ctx.bumps.plan;
        plan.apply_params(&params)?;

        emit!(PlanCreated {
            plan: plan.key(),
            plan_id,
            capacity: plan.capacity,
            referral_rate_bps: plan.referral_rate_bps,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Rate configuration is the single source of truth; every change goes
    /// through the same validation as creation, so an illegal split can
    /// never reach settlement time.
    pub fn update_plan_rates(
        ctx: Context<UpdatePlanRates>,
        new_referral_rate_bps: Option<u16>,
        new_professional_share_bps: Option<u16>,
        new_platform_share_bps: Option<u16>,
        new_influencer_share_bps: Option<u16>,
        new_fixed_platform_fee: Option<u64>,
    ) -> Result<()> {
        let plan = &mut ctx.accounts.plan;
        if let Some(v) = new_referral_rate_bps {
            plan.referral_rate_bps = v;
        }
        if let Some(v) = new_professional_share_bps {
            plan.professional_share_bps = v;
        }
        if let Some(v) = new_platform_share_bps {
            plan.platform_share_bps = v;
        }
        if let Some(v) = new_influencer_share_bps {
            plan.influencer_share_bps = v;
        }
        if let Some(v) = new_fixed_platform_fee {
            plan.fixed_platform_fee = v;
        }
        plan.validate()?;

        emit!(PlanRatesUpdated {
            plan: plan.key(),
            referral_rate_bps: plan.referral_rate_bps,
            professional_share_bps: plan.professional_share_bps,
            platform_share_bps: plan.platform_share_bps,
            influencer_share_bps: plan.influencer_share_bps,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    // ──────────────────────────────────────────────────────────────────────
    // Group lifecycle
    // ──────────────────────────────────────────────────────────────────────

    pub fn create_group(ctx: Context<CreateGroup>, group_id: u64) -> Result<()> {
        let platform = &mut ctx.accounts.platform;
        require!(platform.is_active, ErrorCode::PlatformInactive);

        let plan = &ctx.accounts.plan;
        let group = &mut ctx.accounts.group;
        let clock = Clock::get()?;

        group.plan = plan.key();
        group.group_id = group_id;
        group.organizer = ctx.accounts.organizer.key();
        group.capacity = plan.capacity;
        group.participant_count = 0;
        group.accumulated_amount = 0;
        group.target_amount = plan
            .quota_amount
            .checked_mul(plan.capacity as u64)
            .ok_or(ErrorCode::MathOverflow)?;
        group.phase = GroupPhase::Forming;
        group.milestones_fired = 0;
        group.winner = None;
        group.created_at = clock.unix_timestamp;
        group.completed_at = 0;
        group.cancelled_at = 0;
        group.bump = ctx.bumps.group;

        platform.total_groups = platform.total_groups.saturating_add(1);

        emit!(GroupCreated {
            group: group.key(),
            plan: group.plan,
            organizer: group.organizer,
            capacity: group.capacity,
            target_amount: group.target_amount,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// The claim-slot operation. Slot confirmation happens here; payment
    /// capture is an external concern sequenced after this succeeds, so a
    /// losing concurrent joiner is never charged.
    pub fn join_group(
        ctx: Context<JoinGroup>,
        amount_paid: u64,
        referrer: Option<Pubkey>,
    ) -> Result<()> {
        require!(ctx.accounts.platform.is_active, ErrorCode::PlatformInactive);
        require!(amount_paid > 0, ErrorCode::InvalidParameter);
        if let Some(r) = referrer {
            require!(r != ctx.accounts.user.key(), ErrorCode::InvalidParameter);
        }

        let group = &mut ctx.accounts.group;
        let clock = Clock::get()?;

        let position = group.claim_slot(amount_paid)?;

        let participant = &mut ctx.accounts.participant;
        participant.group = group.key();
        participant.user = ctx.accounts.user.key();
        participant.position = position;
        participant.referrer = referrer;
        participant.amount_paid = amount_paid;
        participant.joined_at = clock.unix_timestamp;
        participant.validated = false;
        participant.refund_queued = false;
        participant.bump = ctx.bumps.participant;

        emit!(ParticipantJoined {
            group: group.key(),
            user: participant.user,
            position,
            amount_paid,
            referrer,
            timestamp: clock.unix_timestamp,
        });

        if group.phase == GroupPhase::Full {
            msg!(
                "Group {} full: {}/{} participants",
                group.group_id,
                group.participant_count,
                group.capacity
            );
            emit!(GroupFilled {
                group: group.key(),
                participant_count: group.participant_count,
                accumulated_amount: group.accumulated_amount,
                timestamp: clock.unix_timestamp,
            });
        }

        Ok(())
    }

    /// Mark a participant's payment as confirmed. Re-validating is a no-op.
    pub fn validate_participant(ctx: Context<ValidateParticipant>) -> Result<()> {
        let participant = &mut ctx.accounts.participant;
        if participant.validated {
            return Ok(());
        }
        participant.validated = true;

        emit!(ParticipantValidated {
            group: participant.group,
            participant: participant.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    pub fn advance_to_contemplated(
        ctx: Context<AdvanceToContemplated>,
        winner: Option<Pubkey>,
    ) -> Result<()> {
        let group = &mut ctx.accounts.group;
        let clock = Clock::get()?;

        // SingleWinner: the winner must be a recorded participant of this
        // group, proven by their participant account.
        if let Some(w) = winner {
            let record = ctx
                .accounts
                .winner_participant
                .as_ref()
                .ok_or(ErrorCode::NotAParticipant)?;
            require!(record.user == w, ErrorCode::NotAParticipant);
        }

        group.advance_to_contemplated(
            ctx.accounts.plan.contemplation_policy,
            winner,
            clock.unix_timestamp,
        )?;

        emit!(GroupContemplated {
            group: group.key(),
            winner,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn cancel_group(ctx: Context<CancelGroup>, reason: String) -> Result<()> {
        require!(reason.len() <= MAX_REASON_LEN, ErrorCode::StringTooLong);

        let group = &mut ctx.accounts.group;
        let clock = Clock::get()?;

        group.cancel(clock.unix_timestamp)?;

        msg!("Group {} cancelled: {}", group.group_id, reason);
        emit!(GroupCancelled {
            group: group.key(),
            reason,
            participant_count: group.participant_count,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    // ──────────────────────────────────────────────────────────────────────
    // Milestone & commission calculator (idempotent cranks)
    // ──────────────────────────────────────────────────────────────────────

    pub fn accrue_referral_commission(ctx: Context<AccrueReferralCommission>) -> Result<()> {
        require!(ctx.accounts.platform.is_active, ErrorCode::PlatformInactive);

        let participant = &ctx.accounts.participant;
        let plan = &ctx.accounts.plan;
        let clock = Clock::get()?;

        let beneficiary = participant.referrer.ok_or(ErrorCode::NoReferrer)?;
        let amount = apply_rate_half_up(participant.amount_paid, plan.referral_rate_bps)?;

        let settlement = &mut ctx.accounts.settlement;
        init_settlement(
            settlement,
            CommissionKind::ReferralCommission,
            ctx.accounts.group.key(),
            Some(participant.key()),
            beneficiary,
            amount,
            Some(plan.referral_rate_bps),
            clock.unix_timestamp,
            ctx.bumps.settlement,
        );
        // Referral rewards need no delivery proof; they enter validation
        // immediately.
        settlement.begin_validation(false, clock.unix_timestamp)?;

        bump_settlement_counter(&mut ctx.accounts.platform);

        emit!(ReferralCommissionAccrued {
            settlement: settlement.key(),
            participant: participant.key(),
            beneficiary,
            amount,
            rate_bps: plan.referral_rate_bps,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn accrue_milestone_reward(
        ctx: Context<AccrueMilestoneReward>,
        tier_index: u8,
    ) -> Result<()> {
        require!(ctx.accounts.platform.is_active, ErrorCode::PlatformInactive);

        let plan = &ctx.accounts.plan;
        let group = &mut ctx.accounts.group;
        let clock = Clock::get()?;

        let tier = plan.milestone(tier_index)?;
        group.fire_milestone(tier_index, tier.threshold)?;

        let beneficiary = group.organizer;
        let settlement = &mut ctx.accounts.settlement;
        init_settlement(
            settlement,
            CommissionKind::MilestoneReward,
            group.key(),
            None,
            beneficiary,
            tier.reward,
            None,
            clock.unix_timestamp,
            ctx.bumps.settlement,
        );
        settlement.begin_validation(false, clock.unix_timestamp)?;

        bump_settlement_counter(&mut ctx.accounts.platform);

        msg!(
            "Milestone {} fired for group {} at {} participants",
            tier.threshold,
            group.group_id,
            group.participant_count
        );
        emit!(MilestoneRewardAccrued {
            settlement: settlement.key(),
            group: group.key(),
            tier_index,
            threshold: tier.threshold,
            beneficiary,
            amount: tier.reward,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn settle_service_sale(ctx: Context<SettleServiceSale>, total_amount: u64) -> Result<()> {
        require!(ctx.accounts.platform.is_active, ErrorCode::PlatformInactive);

        let plan = &ctx.accounts.plan;
        let clock = Clock::get()?;
        let split = split_service_sale(total_amount, plan, false)?;

        let sale_ref = ctx.accounts.sale_ref.key();
        let platform_key = ctx.accounts.platform.key();

        init_settlement(
            &mut ctx.accounts.settlement_professional,
            CommissionKind::ProfessionalPayout,
            Pubkey::default(),
            None,
            ctx.accounts.professional.key(),
            split.professional,
            Some(plan.professional_share_bps),
            clock.unix_timestamp,
            ctx.bumps.settlement_professional,
        );
        init_settlement(
            &mut ctx.accounts.settlement_platform,
            CommissionKind::PlatformFee,
            Pubkey::default(),
            None,
            platform_key,
            split.platform,
            Some(plan.platform_share_bps),
            clock.unix_timestamp,
            ctx.bumps.settlement_platform,
        );

        let platform = &mut ctx.accounts.platform;
        platform.total_settlements = platform.total_settlements.saturating_add(2);

        emit!(ServiceSaleSettled {
            sale_ref,
            total_amount,
            professional_amount: split.professional,
            platform_amount: split.platform,
            influencer_amount: 0,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn settle_service_sale_with_influencer(
        ctx: Context<SettleServiceSaleWithInfluencer>,
        total_amount: u64,
    ) -> Result<()> {
        require!(ctx.accounts.platform.is_active, ErrorCode::PlatformInactive);

        let plan = &ctx.accounts.plan;
        let clock = Clock::get()?;
        let split = split_service_sale(total_amount, plan, true)?;

        let sale_ref = ctx.accounts.sale_ref.key();
        let platform_key = ctx.accounts.platform.key();

        init_settlement(
            &mut ctx.accounts.settlement_professional,
            CommissionKind::ProfessionalPayout,
            Pubkey::default(),
            None,
            ctx.accounts.professional.key(),
            split.professional,
            Some(plan.professional_share_bps),
            clock.unix_timestamp,
            ctx.bumps.settlement_professional,
        );
        init_settlement(
            &mut ctx.accounts.settlement_platform,
            CommissionKind::PlatformFee,
            Pubkey::default(),
            None,
            platform_key,
            split.platform,
            Some(plan.platform_share_bps),
            clock.unix_timestamp,
            ctx.bumps.settlement_platform,
        );
        init_settlement(
            &mut ctx.accounts.settlement_influencer,
            CommissionKind::InfluencerPayout,
            Pubkey::default(),
            None,
            ctx.accounts.influencer.key(),
            split.influencer,
            Some(plan.influencer_share_bps),
            clock.unix_timestamp,
            ctx.bumps.settlement_influencer,
        );

        let platform = &mut ctx.accounts.platform;
        platform.total_settlements = platform.total_settlements.saturating_add(3);

        emit!(ServiceSaleSettled {
            sale_ref,
            total_amount,
            professional_amount: split.professional,
            platform_amount: split.platform,
            influencer_amount: split.influencer,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn queue_participant_refund(ctx: Context<QueueParticipantRefund>) -> Result<()> {
        let group = &ctx.accounts.group;
        let participant = &mut ctx.accounts.participant;
        let clock = Clock::get()?;

        require!(
            group.phase == GroupPhase::Cancelled,
            ErrorCode::GroupNotCancelled
        );
        require!(!participant.refund_queued, ErrorCode::RefundAlreadyQueued);
        participant.refund_queued = true;

        let settlement = &mut ctx.accounts.settlement;
        init_settlement(
            settlement,
            CommissionKind::Refund,
            group.key(),
            Some(participant.key()),
            participant.user,
            participant.amount_paid,
            None,
            clock.unix_timestamp,
            ctx.bumps.settlement,
        );
        settlement.begin_validation(false, clock.unix_timestamp)?;

        bump_settlement_counter(&mut ctx.accounts.platform);

        emit!(RefundQueued {
            settlement: settlement.key(),
            group: group.key(),
            participant: participant.key(),
            amount: participant.amount_paid,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    // ──────────────────────────────────────────────────────────────────────
    // Settlement state machine
    // ──────────────────────────────────────────────────────────────────────

    pub fn submit_settlement(ctx: Context<SubmitSettlement>, delivered: bool) -> Result<()> {
        let settlement = &mut ctx.accounts.settlement;
        let clock = Clock::get()?;

        let applied = settlement.begin_validation(delivered, clock.unix_timestamp)?;
        if applied {
            emit!(SettlementSubmitted {
                settlement: settlement.key(),
                kind: settlement.kind,
                timestamp: clock.unix_timestamp,
            });
        }

        Ok(())
    }

    pub fn release_settlement(ctx: Context<ReleaseSettlement>) -> Result<()> {
        let settlement = &mut ctx.accounts.settlement;
        let clock = Clock::get()?;

        let applied = settlement.release(ctx.accounts.admin.key(), clock.unix_timestamp)?;
        if applied {
            emit!(SettlementReleased {
                settlement: settlement.key(),
                beneficiary: settlement.beneficiary,
                amount: settlement.amount,
                released_by: ctx.accounts.admin.key(),
                timestamp: clock.unix_timestamp,
            });
        }

        Ok(())
    }

    /// Released -> Paid plus the single ledger credit. A retry with the same
    /// proof reference is a no-op, not a double credit.
    pub fn pay_settlement(ctx: Context<PaySettlement>, proof_reference: String) -> Result<()> {
        let settlement = &mut ctx.accounts.settlement;
        let clock = Clock::get()?;
        let admin = ctx.accounts.admin.key();

        let applied = settlement.mark_paid(&proof_reference, admin, clock.unix_timestamp)?;
        if !applied {
            // Idempotent retry; the entry PDA already holds the credit.
            return Ok(());
        }

        // Defensive: a populated entry for a settlement that was not yet
        // paid means the log and the state machine disagree.
        let entry = &mut ctx.accounts.entry;
        require!(entry.created_at == 0, ErrorCode::DuplicateCredit);

        entry.user = settlement.beneficiary;
        entry.amount = i64::try_from(settlement.amount).map_err(|_| ErrorCode::MathOverflow)?;
        entry.entry_type = credit_entry_type(settlement.kind);
        entry.reference = settlement.key();
        entry.created_at = clock.unix_timestamp;
        entry.bump = ctx.bumps.entry;

        let ledger = &mut ctx.accounts.ledger;
        ledger.credit(settlement.amount)?;

        let platform = &mut ctx.accounts.platform;
        platform.total_settlements_paid = platform.total_settlements_paid.saturating_add(1);
        platform.total_paid_out = platform.total_paid_out.saturating_add(settlement.amount);

        emit!(LedgerCredited {
            user: settlement.beneficiary,
            amount: settlement.amount,
            reference: settlement.key(),
            available: ledger.available,
            timestamp: clock.unix_timestamp,
        });
        emit!(SettlementPaid {
            settlement: settlement.key(),
            beneficiary: settlement.beneficiary,
            amount: settlement.amount,
            proof_reference,
            paid_by: admin,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Record a retryable external-collaborator failure against a settlement.
    /// The record stays in its current status; re-attempting the same
    /// transition is the retry path.
    pub fn record_settlement_failure(
        ctx: Context<RecordSettlementFailure>,
        note: String,
    ) -> Result<()> {
        let settlement = &mut ctx.accounts.settlement;
        settlement.record_failure(&note)?;

        let platform = &mut ctx.accounts.platform;
        platform.failed_settlements = platform.failed_settlements.saturating_add(1);

        emit!(SettlementFailureRecorded {
            settlement: settlement.key(),
            note,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    // ──────────────────────────────────────────────────────────────────────
    // Ledger & withdrawals
    // ──────────────────────────────────────────────────────────────────────

    pub fn init_user_ledger(ctx: Context<InitUserLedger>) -> Result<()> {
        let ledger = &mut ctx.accounts.ledger;
        ledger.user = ctx.accounts.user.key();
        ledger.available = 0;
        ledger.pending_out = 0;
        ledger.total_earned = 0;
        ledger.total_withdrawn = 0;
        ledger.entry_count = 0;
        ledger.withdrawal_count = 0;
        ledger.bump = ctx.bumps.ledger;
        Ok(())
    }

    pub fn request_withdrawal(
        ctx: Context<RequestWithdrawal>,
        amount: u64,
        method: PayoutMethod,
        destination: String,
    ) -> Result<()> {
        require!(ctx.accounts.platform.is_active, ErrorCode::PlatformInactive);
        require!(
            destination.len() <= MAX_DESTINATION_LEN,
            ErrorCode::StringTooLong
        );
        require!(!destination.is_empty(), ErrorCode::InvalidParameter);
        require!(
            amount >= ctx.accounts.platform.min_withdrawal,
            ErrorCode::BelowMinimumWithdrawal
        );

        let clock = Clock::get()?;
        let ledger = &mut ctx.accounts.ledger;
        let index = ledger.withdrawal_count;

        // Balance check and debit are one step under the ledger account
        // lock; a concurrent credit either lands before or after, never
        // inside.
        ledger.debit_for_withdrawal(amount)?;
        ledger.withdrawal_count = ledger
            .withdrawal_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;

        let withdrawal = &mut ctx.accounts.withdrawal;
        withdrawal.user = ctx.accounts.user.key();
        withdrawal.amount = amount;
        withdrawal.method = method;
        withdrawal.destination = destination;
        withdrawal.status = WithdrawalStatus::Pending;
        withdrawal.requested_at = clock.unix_timestamp;
        withdrawal.decided_at = 0;
        withdrawal.completed_at = 0;
        withdrawal.decided_by = None;
        withdrawal.external_reference = String::new();
        withdrawal.note = String::new();
        withdrawal.index = index;
        withdrawal.bump = ctx.bumps.withdrawal;

        let entry = &mut ctx.accounts.entry;
        entry.user = withdrawal.user;
        entry.amount = -(i64::try_from(amount).map_err(|_| ErrorCode::MathOverflow)?);
        entry.entry_type = EntryType::WithdrawalRequest;
        entry.reference = withdrawal.key();
        entry.created_at = clock.unix_timestamp;
        entry.bump = ctx.bumps.entry;

        emit!(WithdrawalRequested {
            withdrawal: withdrawal.key(),
            user: withdrawal.user,
            amount,
            method,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn approve_withdrawal(ctx: Context<DecideWithdrawal>) -> Result<()> {
        let withdrawal = &mut ctx.accounts.withdrawal;
        let clock = Clock::get()?;

        withdrawal.approve(ctx.accounts.admin.key(), clock.unix_timestamp)?;

        emit!(WithdrawalApproved {
            withdrawal: withdrawal.key(),
            admin: ctx.accounts.admin.key(),
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn reject_withdrawal(ctx: Context<RejectWithdrawal>, note: String) -> Result<()> {
        let withdrawal = &mut ctx.accounts.withdrawal;
        let clock = Clock::get()?;

        withdrawal.reject(ctx.accounts.admin.key(), &note, clock.unix_timestamp)?;

        let ledger = &mut ctx.accounts.ledger;
        ledger.restore_withdrawal(withdrawal.amount)?;

        let entry = &mut ctx.accounts.entry;
        entry.user = withdrawal.user;
        entry.amount = i64::try_from(withdrawal.amount).map_err(|_| ErrorCode::MathOverflow)?;
        entry.entry_type = EntryType::Refund;
        entry.reference = withdrawal.key();
        entry.created_at = clock.unix_timestamp;
        entry.bump = ctx.bumps.entry;

        emit!(WithdrawalRejected {
            withdrawal: withdrawal.key(),
            admin: ctx.accounts.admin.key(),
            amount_restored: withdrawal.amount,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn complete_withdrawal(
        ctx: Context<CompleteWithdrawal>,
        external_reference: String,
    ) -> Result<()> {
        let withdrawal = &mut ctx.accounts.withdrawal;
        let clock = Clock::get()?;

        withdrawal.complete(&external_reference, clock.unix_timestamp)?;

        let ledger = &mut ctx.accounts.ledger;
        ledger.finish_withdrawal(withdrawal.amount)?;

        // Settles pending_out, not available; amount 0 keeps the available
        // reconciliation sum untouched while the completion stays on the log.
        let entry = &mut ctx.accounts.entry;
        entry.user = withdrawal.user;
        entry.amount = 0;
        entry.entry_type = EntryType::WithdrawalCompleted;
        entry.reference = withdrawal.key();
        entry.created_at = clock.unix_timestamp;
        entry.bump = ctx.bumps.entry;

        msg!(
            "Withdrawal {} completed, external ref {}",
            withdrawal.index,
            external_reference
        );
        emit!(WithdrawalCompleted {
            withdrawal: withdrawal.key(),
            user: withdrawal.user,
            amount: withdrawal.amount,
            external_reference,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }
}

// HELPERS

/// Populate a freshly initialized settlement account
#[allow(clippy::too_many_arguments)]
fn init_settlement(
    settlement: &mut Settlement,
    kind: CommissionKind,
    source_group: Pubkey,
    source_participant: Option<Pubkey>,
    beneficiary: Pubkey,
    amount: u64,
    rate_bps: Option<u16>,
    now: i64,
    bump: u8,
) {
    settlement.kind = kind;
    settlement.source_group = source_group;
    settlement.source_participant = source_participant;
    settlement.beneficiary = beneficiary;
    settlement.amount = amount;
    settlement.rate_bps = rate_bps;
    settlement.status = SettlementStatus::Pending;
    settlement.proof_reference = String::new();
    settlement.error_note = String::new();
    settlement.created_at = now;
    settlement.validated_at = 0;
    settlement.released_at = 0;
    settlement.paid_at = 0;
    settlement.released_by = None;
    settlement.paid_by = None;
    settlement.bump = bump;
}

fn bump_settlement_counter(platform: &mut PlatformState) {
    platform.total_settlements = platform.total_settlements.saturating_add(1);
}

/// Ledger entry type for a paid settlement of the given kind
pub fn credit_entry_type(kind: CommissionKind) -> EntryType {
    match kind {
        CommissionKind::MilestoneReward => EntryType::Earned,
        CommissionKind::ReferralCommission => EntryType::ReferralCommission,
        CommissionKind::ProfessionalPayout => EntryType::ProfessionalEarnings,
        CommissionKind::InfluencerPayout => EntryType::MarketplaceCommission,
        CommissionKind::PlatformFee => EntryType::ServicePayment,
        CommissionKind::Refund => EntryType::Refund,
    }
}
