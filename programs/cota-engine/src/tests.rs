// ============================================================================
// UNIT TESTS FOR COTA ENGINE PROGRAM
// ============================================================================
//
// This module contains unit tests for the core logic of the engine.
// Run with: cargo test --lib
//
// Test Categories:
// 1. Math Functions - apply_rate_half_up, split_service_sale
// 2. Plan Validation - rate configuration guards
// 3. Group Lifecycle - claim_slot, phase transitions, milestones
// 4. Settlement State Machine - status transitions, idempotent retries
// 5. Ledger - credit/debit aggregates
// 6. Withdrawals - request decision transitions
// 7. Scenarios - full group formation walkthroughs
// ============================================================================

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use crate::{
        // Constants
        BPS_DIVISOR, MAX_CAPACITY, MAX_MILESTONE_TIERS,
        // Functions
        credit_entry_type,
        helpers::math::{apply_rate_half_up, split_service_sale},
        // Types
        CommissionKind, ContemplationPolicy, EntryType, ErrorCode, Group, GroupPhase,
        MilestoneTier, PlanConfig, PlanParams, Settlement, SettlementStatus, UserLedger,
        WithdrawalRequest, WithdrawalStatus,
    };
    use anchor_lang::prelude::Pubkey;

    // ========================================================================
    // TEST FIXTURES
    // ========================================================================

    fn test_plan() -> PlanConfig {
        PlanConfig {
            plan_id: 1,
            capacity: 9,
            quota_amount: 10_000, // R$ 100.00 in centavos
            referral_rate_bps: 1_000,
            milestones: [
                MilestoneTier {
                    threshold: 3,
                    reward: 5_000,
                },
                MilestoneTier {
                    threshold: 6,
                    reward: 10_000,
                },
                MilestoneTier {
                    threshold: 9,
                    reward: 50_000,
                },
                MilestoneTier::default(),
            ],
            milestone_count: 3,
            professional_share_bps: 7_000,
            platform_share_bps: 2_000,
            influencer_share_bps: 1_000,
            fixed_platform_fee: 0,
            contemplation_policy: ContemplationPolicy::SingleWinner,
            bump: 255,
        }
    }

    fn test_group(capacity: u8) -> Group {
        Group {
            plan: Pubkey::new_unique(),
            group_id: 1,
            organizer: Pubkey::new_unique(),
            capacity,
            participant_count: 0,
            accumulated_amount: 0,
            target_amount: 10_000 * capacity as u64,
            phase: GroupPhase::Forming,
            milestones_fired: 0,
            winner: None,
            created_at: 1_700_000_000,
            completed_at: 0,
            cancelled_at: 0,
            bump: 255,
        }
    }

    fn test_settlement(kind: CommissionKind) -> Settlement {
        Settlement {
            kind,
            source_group: Pubkey::new_unique(),
            source_participant: None,
            beneficiary: Pubkey::new_unique(),
            amount: 1_000,
            rate_bps: None,
            status: SettlementStatus::Pending,
            proof_reference: String::new(),
            error_note: String::new(),
            created_at: 1_700_000_000,
            validated_at: 0,
            released_at: 0,
            paid_at: 0,
            released_by: None,
            paid_by: None,
            bump: 255,
        }
    }

    fn test_ledger() -> UserLedger {
        UserLedger {
            user: Pubkey::new_unique(),
            available: 0,
            pending_out: 0,
            total_earned: 0,
            total_withdrawn: 0,
            entry_count: 0,
            withdrawal_count: 0,
            bump: 255,
        }
    }

    fn test_withdrawal(amount: u64) -> WithdrawalRequest {
        WithdrawalRequest {
            user: Pubkey::new_unique(),
            amount,
            method: crate::PayoutMethod::Pix,
            destination: "pix:user@example.com".to_string(),
            status: WithdrawalStatus::Pending,
            requested_at: 1_700_000_000,
            decided_at: 0,
            completed_at: 0,
            decided_by: None,
            external_reference: String::new(),
            note: String::new(),
            index: 0,
            bump: 255,
        }
    }

    const NOW: i64 = 1_700_000_100;

    // ========================================================================
    // 1. MATH FUNCTION TESTS
    // ========================================================================

    mod math_tests {
        use super::*;

        #[test]
        fn test_rate_basic() {
            // 10% of 10_000 centavos = 1_000
            assert_eq!(apply_rate_half_up(10_000, 1_000).unwrap(), 1_000);
            // 70% of 10_000 = 7_000
            assert_eq!(apply_rate_half_up(10_000, 7_000).unwrap(), 7_000);
        }

        #[test]
        fn test_rate_rounds_half_up() {
            // 10% of 5 = 0.5, rounds up to 1
            assert_eq!(apply_rate_half_up(5, 1_000).unwrap(), 1);
            // 10% of 4 = 0.4, rounds down to 0
            assert_eq!(apply_rate_half_up(4, 1_000).unwrap(), 0);
            // 15% of 10 = 1.5, rounds up to 2
            assert_eq!(apply_rate_half_up(10, 1_500).unwrap(), 2);
            // 33.33% of 100 = 33.33, rounds down to 33
            assert_eq!(apply_rate_half_up(100, 3_333).unwrap(), 33);
        }

        #[test]
        fn test_rate_identity_and_zero() {
            assert_eq!(apply_rate_half_up(123_456, 10_000).unwrap(), 123_456);
            assert_eq!(apply_rate_half_up(123_456, 0).unwrap(), 0);
            assert_eq!(apply_rate_half_up(0, 5_000).unwrap(), 0);
        }

        #[test]
        fn test_rate_large_amounts_no_overflow() {
            // u64::MAX * 10_000 fits in u128; result fits back in u64
            assert_eq!(
                apply_rate_half_up(u64::MAX, 10_000).unwrap(),
                u64::MAX
            );
        }

        #[test]
        fn test_split_conservation() {
            let plan = test_plan();
            let cases: Vec<u64> = vec![1, 3, 99, 100, 10_000, 123_457, 1_000_000_001];
            for total in cases {
                for with_influencer in [false, true] {
                    let split = split_service_sale(total, &plan, with_influencer).unwrap();
                    assert_eq!(
                        split.professional + split.influencer + split.platform,
                        total,
                        "conservation must hold for total={} influencer={}",
                        total,
                        with_influencer
                    );
                }
            }
        }

        #[test]
        fn test_split_without_influencer_gives_share_to_platform() {
            let plan = test_plan();
            let split = split_service_sale(10_000, &plan, false).unwrap();
            assert_eq!(split.professional, 7_000);
            assert_eq!(split.influencer, 0);
            // Platform absorbs the unused influencer share
            assert_eq!(split.platform, 3_000);
        }

        #[test]
        fn test_split_with_influencer() {
            let plan = test_plan();
            let split = split_service_sale(10_000, &plan, true).unwrap();
            assert_eq!(split.professional, 7_000);
            assert_eq!(split.influencer, 1_000);
            assert_eq!(split.platform, 2_000);
        }

        #[test]
        fn test_split_fixed_fee_carved_from_professional() {
            let mut plan = test_plan();
            plan.fixed_platform_fee = 500;
            let split = split_service_sale(10_000, &plan, false).unwrap();
            assert_eq!(split.professional, 6_500);
            assert_eq!(split.platform, 3_500);
            assert_eq!(
                split.professional + split.influencer + split.platform,
                10_000
            );
        }

        #[test]
        fn test_split_fee_exceeding_share_rejected() {
            let mut plan = test_plan();
            plan.fixed_platform_fee = 100_000;
            let result = split_service_sale(10_000, &plan, false);
            assert_eq!(result.unwrap_err(), ErrorCode::FeeExceedsShare.into());
        }

        #[test]
        fn test_split_full_percentage_rounding_overshoot() {
            // 50/50 split of an odd total: both halves round up, which would
            // overshoot by one minor unit without the clamp.
            let mut plan = test_plan();
            plan.professional_share_bps = 5_000;
            plan.influencer_share_bps = 5_000;
            plan.platform_share_bps = 0;
            let split = split_service_sale(101, &plan, true).unwrap();
            assert_eq!(
                split.professional + split.influencer + split.platform,
                101
            );
            assert_eq!(split.professional, 51);
            assert_eq!(split.influencer, 50);
        }

        #[test]
        fn test_split_zero_total_rejected() {
            let plan = test_plan();
            assert!(split_service_sale(0, &plan, false).is_err());
        }
    }

    // ========================================================================
    // 2. PLAN VALIDATION TESTS
    // ========================================================================

    mod plan_tests {
        use super::*;

        #[test]
        fn test_valid_plan_passes() {
            assert!(test_plan().validate().is_ok());
        }

        #[test]
        fn test_capacity_bounds() {
            let mut plan = test_plan();
            plan.capacity = 0;
            assert!(plan.validate().is_err(), "Zero capacity must be rejected");

            plan.capacity = MAX_CAPACITY + 1;
            // Milestone thresholds still fit, so only the capacity check fires
            assert!(plan.validate().is_err(), "Capacity above cap must be rejected");
        }

        #[test]
        fn test_split_over_100_percent_rejected_at_config_time() {
            let mut plan = test_plan();
            plan.professional_share_bps = 8_000;
            plan.platform_share_bps = 2_000;
            plan.influencer_share_bps = 1_000;
            assert_eq!(
                plan.validate().unwrap_err(),
                ErrorCode::InvalidSplitConfiguration.into()
            );
        }

        #[test]
        fn test_split_exactly_100_percent_allowed() {
            let mut plan = test_plan();
            plan.professional_share_bps = 7_000;
            plan.platform_share_bps = 2_000;
            plan.influencer_share_bps = 1_000;
            assert!(plan.validate().is_ok());
        }

        #[test]
        fn test_milestone_thresholds_must_increase() {
            let mut plan = test_plan();
            plan.milestones[1].threshold = 3; // equal to tier 0
            assert!(plan.validate().is_err());
        }

        #[test]
        fn test_milestone_threshold_within_capacity() {
            let mut plan = test_plan();
            plan.milestones[2].threshold = 15; // capacity is 9
            assert!(plan.validate().is_err());
        }

        #[test]
        fn test_milestone_zero_reward_rejected() {
            let mut plan = test_plan();
            plan.milestones[0].reward = 0;
            assert!(plan.validate().is_err());
        }

        #[test]
        fn test_milestone_lookup() {
            let plan = test_plan();
            let tier = plan.milestone(1).unwrap();
            assert_eq!(tier.threshold, 6);
            assert_eq!(tier.reward, 10_000);
            assert!(plan.milestone(3).is_err(), "Index past live tiers");
        }

        #[test]
        fn test_apply_params_copies_and_validates() {
            let mut plan = PlanConfig {
                plan_id: 7,
                capacity: 0,
                quota_amount: 0,
                referral_rate_bps: 0,
                milestones: [MilestoneTier::default(); MAX_MILESTONE_TIERS],
                milestone_count: 0,
                professional_share_bps: 0,
                platform_share_bps: 0,
                influencer_share_bps: 0,
                fixed_platform_fee: 0,
                contemplation_policy: ContemplationPolicy::SingleWinner,
                bump: 255,
            };
            let params = PlanParams {
                capacity: 5,
                quota_amount: 2_000,
                referral_rate_bps: 500,
                milestones: vec![MilestoneTier {
                    threshold: 5,
                    reward: 1_000,
                }],
                professional_share_bps: 6_000,
                platform_share_bps: 3_000,
                influencer_share_bps: 1_000,
                fixed_platform_fee: 100,
                contemplation_policy: ContemplationPolicy::AllParticipants,
            };
            plan.apply_params(&params).unwrap();
            assert_eq!(plan.capacity, 5);
            assert_eq!(plan.milestone_count, 1);
            assert_eq!(plan.milestones[0].threshold, 5);
            assert_eq!(plan.milestones[1], MilestoneTier::default());

            let mut bad = params.clone();
            bad.professional_share_bps = 9_500;
            assert!(plan.apply_params(&bad).is_err());
        }
    }

    // ========================================================================
    // 3. GROUP LIFECYCLE TESTS
    // ========================================================================

    mod group_tests {
        use super::*;

        #[test]
        fn test_claim_slot_sequence() {
            let mut group = test_group(3);
            assert_eq!(group.claim_slot(10_000).unwrap(), 1);
            assert_eq!(group.claim_slot(10_000).unwrap(), 2);
            assert_eq!(group.phase, GroupPhase::Forming);
            assert_eq!(group.claim_slot(10_000).unwrap(), 3);
            // Phase flips in the same step as the final claim
            assert_eq!(group.phase, GroupPhase::Full);
            assert_eq!(group.accumulated_amount, 30_000);
        }

        #[test]
        fn test_claim_slot_after_full_rejected() {
            let mut group = test_group(2);
            group.claim_slot(10_000).unwrap();
            group.claim_slot(10_000).unwrap();
            // The losing joiner at the last slot gets the capacity rejection
            let result = group.claim_slot(10_000);
            assert_eq!(result.unwrap_err(), ErrorCode::CapacityExceeded.into());
            assert_eq!(group.participant_count, 2, "Count must not move on a failed claim");
        }

        #[test]
        fn test_claim_slot_on_terminal_group_rejected() {
            // Terminal phases report the state error, not a capacity one
            let mut cancelled = test_group(5);
            cancelled.claim_slot(10_000).unwrap();
            cancelled.cancel(NOW).unwrap();
            assert_eq!(
                cancelled.claim_slot(10_000).unwrap_err(),
                ErrorCode::InvalidState.into()
            );

            let mut done = test_group(1);
            done.claim_slot(10_000).unwrap();
            done.advance_to_contemplated(
                ContemplationPolicy::SingleWinner,
                Some(Pubkey::new_unique()),
                NOW,
            )
            .unwrap();
            assert_eq!(
                done.claim_slot(10_000).unwrap_err(),
                ErrorCode::InvalidState.into()
            );
        }

        #[test]
        fn test_contemplation_single_winner_policy() {
            let mut group = test_group(2);
            group.claim_slot(10_000).unwrap();
            group.claim_slot(10_000).unwrap();

            let result =
                group.advance_to_contemplated(ContemplationPolicy::SingleWinner, None, NOW);
            assert_eq!(result.unwrap_err(), ErrorCode::WinnerRequired.into());

            let winner = Pubkey::new_unique();
            group
                .advance_to_contemplated(ContemplationPolicy::SingleWinner, Some(winner), NOW)
                .unwrap();
            assert_eq!(group.phase, GroupPhase::Contemplated);
            assert_eq!(group.winner, Some(winner));
            assert_eq!(group.completed_at, NOW);
        }

        #[test]
        fn test_contemplation_all_participants_policy() {
            let mut group = test_group(1);
            group.claim_slot(10_000).unwrap();

            let result = group.advance_to_contemplated(
                ContemplationPolicy::AllParticipants,
                Some(Pubkey::new_unique()),
                NOW,
            );
            assert_eq!(result.unwrap_err(), ErrorCode::WinnerNotAllowed.into());

            group
                .advance_to_contemplated(ContemplationPolicy::AllParticipants, None, NOW)
                .unwrap();
            assert_eq!(group.winner, None);
        }

        #[test]
        fn test_contemplation_requires_full() {
            let mut group = test_group(3);
            group.claim_slot(10_000).unwrap();
            let result = group.advance_to_contemplated(
                ContemplationPolicy::SingleWinner,
                Some(Pubkey::new_unique()),
                NOW,
            );
            assert_eq!(result.unwrap_err(), ErrorCode::InvalidState.into());
        }

        #[test]
        fn test_cancel_transitions() {
            // Forming -> Cancelled
            let mut forming = test_group(3);
            forming.cancel(NOW).unwrap();
            assert_eq!(forming.phase, GroupPhase::Cancelled);
            assert_eq!(forming.cancelled_at, NOW);

            // Full -> Cancelled
            let mut full = test_group(1);
            full.claim_slot(10_000).unwrap();
            full.cancel(NOW).unwrap();
            assert_eq!(full.phase, GroupPhase::Cancelled);

            // Contemplated is terminal
            let mut done = test_group(1);
            done.claim_slot(10_000).unwrap();
            done.advance_to_contemplated(
                ContemplationPolicy::SingleWinner,
                Some(Pubkey::new_unique()),
                NOW,
            )
            .unwrap();
            assert!(done.cancel(NOW).is_err());

            // Cancelled is terminal too
            assert!(forming.cancel(NOW).is_err());
        }

        #[test]
        fn test_terminal_phases() {
            assert!(!GroupPhase::Forming.is_terminal());
            assert!(!GroupPhase::Full.is_terminal());
            assert!(GroupPhase::Contemplated.is_terminal());
            assert!(GroupPhase::Cancelled.is_terminal());
        }

        #[test]
        fn test_milestone_fires_once() {
            let mut group = test_group(9);
            for _ in 0..3 {
                group.claim_slot(10_000).unwrap();
            }
            group.fire_milestone(0, 3).unwrap();
            assert!(group.milestone_fired(0));

            let result = group.fire_milestone(0, 3);
            assert_eq!(
                result.unwrap_err(),
                ErrorCode::MilestoneAlreadyAwarded.into()
            );
        }

        #[test]
        fn test_milestone_below_threshold_rejected() {
            let mut group = test_group(9);
            group.claim_slot(10_000).unwrap();
            group.claim_slot(10_000).unwrap();
            let result = group.fire_milestone(0, 3);
            assert_eq!(result.unwrap_err(), ErrorCode::MilestoneNotReached.into());
            assert!(!group.milestone_fired(0));
        }

        #[test]
        fn test_milestone_bitmask_independent_tiers() {
            let mut group = test_group(9);
            for _ in 0..9 {
                group.claim_slot(10_000).unwrap();
            }
            group.fire_milestone(2, 9).unwrap();
            assert!(!group.milestone_fired(0));
            assert!(!group.milestone_fired(1));
            assert!(group.milestone_fired(2));
            // Lower tiers can still fire afterwards
            group.fire_milestone(0, 3).unwrap();
            group.fire_milestone(1, 6).unwrap();
            assert_eq!(group.milestones_fired, 0b111);
        }

        #[test]
        fn test_milestone_fired_out_of_range_index() {
            let mut group = test_group(9);
            group.milestones_fired = 0xFF;
            // Indexes past the bitmask width are simply not fired
            assert!(!group.milestone_fired(8));
            assert!(!group.milestone_fired(255));
        }
    }

    // ========================================================================
    // 4. SETTLEMENT STATE MACHINE TESTS
    // ========================================================================

    mod settlement_tests {
        use super::*;

        #[test]
        fn test_full_walkthrough() {
            let admin = Pubkey::new_unique();
            let mut s = test_settlement(CommissionKind::ReferralCommission);

            assert!(s.begin_validation(false, NOW).unwrap());
            assert_eq!(s.status, SettlementStatus::AwaitingValidation);
            assert_eq!(s.validated_at, NOW);

            assert!(s.release(admin, NOW + 1).unwrap());
            assert_eq!(s.status, SettlementStatus::Released);
            assert_eq!(s.released_by, Some(admin));

            assert!(s.mark_paid("receipt-001", admin, NOW + 2).unwrap());
            assert_eq!(s.status, SettlementStatus::Paid);
            assert_eq!(s.proof_reference, "receipt-001");
            assert_eq!(s.paid_at, NOW + 2);
        }

        #[test]
        fn test_sale_kinds_require_delivery() {
            for kind in [
                CommissionKind::ProfessionalPayout,
                CommissionKind::InfluencerPayout,
                CommissionKind::PlatformFee,
            ] {
                let mut s = test_settlement(kind);
                let result = s.begin_validation(false, NOW);
                assert_eq!(
                    result.unwrap_err(),
                    ErrorCode::DeliveryNotConfirmed.into()
                );
                assert!(s.begin_validation(true, NOW).unwrap());
            }

            // Refund and referral carry no delivery obligation
            let mut refund = test_settlement(CommissionKind::Refund);
            assert!(refund.begin_validation(false, NOW).unwrap());
        }

        #[test]
        fn test_submit_is_idempotent() {
            let mut s = test_settlement(CommissionKind::MilestoneReward);
            assert!(s.begin_validation(false, NOW).unwrap());
            // Second submission is a no-op, not an error
            assert!(!s.begin_validation(false, NOW + 5).unwrap());
            assert_eq!(s.validated_at, NOW, "Timestamp must not move on a retry");
        }

        #[test]
        fn test_release_while_pending_is_not_ready() {
            let mut s = test_settlement(CommissionKind::ReferralCommission);
            let result = s.release(Pubkey::new_unique(), NOW);
            assert_eq!(result.unwrap_err(), ErrorCode::NotReady.into());
            assert_eq!(s.status, SettlementStatus::Pending);
        }

        #[test]
        fn test_release_is_idempotent() {
            let admin = Pubkey::new_unique();
            let mut s = test_settlement(CommissionKind::ReferralCommission);
            s.begin_validation(false, NOW).unwrap();
            assert!(s.release(admin, NOW).unwrap());
            assert!(!s.release(admin, NOW + 5).unwrap());
            assert_eq!(s.released_at, NOW);
        }

        #[test]
        fn test_pay_requires_proof() {
            let admin = Pubkey::new_unique();
            let mut s = test_settlement(CommissionKind::ReferralCommission);
            s.begin_validation(false, NOW).unwrap();
            s.release(admin, NOW).unwrap();

            let result = s.mark_paid("", admin, NOW);
            assert_eq!(result.unwrap_err(), ErrorCode::MissingProof.into());
            assert_eq!(s.status, SettlementStatus::Released);
        }

        #[test]
        fn test_pay_before_release_is_not_ready() {
            let admin = Pubkey::new_unique();
            let mut s = test_settlement(CommissionKind::ReferralCommission);
            s.begin_validation(false, NOW).unwrap();
            let result = s.mark_paid("receipt-001", admin, NOW);
            assert_eq!(result.unwrap_err(), ErrorCode::NotReady.into());
        }

        #[test]
        fn test_pay_retry_same_proof_is_noop() {
            let admin = Pubkey::new_unique();
            let mut s = test_settlement(CommissionKind::ReferralCommission);
            s.begin_validation(false, NOW).unwrap();
            s.release(admin, NOW).unwrap();
            assert!(s.mark_paid("receipt-001", admin, NOW).unwrap());

            // Retry with the same proof: no-op, caller must not credit again
            assert!(!s.mark_paid("receipt-001", admin, NOW + 5).unwrap());
            assert_eq!(s.paid_at, NOW);

            // A different proof on a paid record is a caller error
            let result = s.mark_paid("receipt-999", admin, NOW + 5);
            assert_eq!(result.unwrap_err(), ErrorCode::InvalidState.into());
        }

        #[test]
        fn test_failure_annotation() {
            let mut s = test_settlement(CommissionKind::Refund);
            s.begin_validation(false, NOW).unwrap();
            s.record_failure("payout provider timeout").unwrap();
            assert_eq!(s.error_note, "payout provider timeout");
            // Status untouched; the same transition can be re-attempted
            assert_eq!(s.status, SettlementStatus::AwaitingValidation);
        }

        #[test]
        fn test_failure_on_paid_record_rejected() {
            let admin = Pubkey::new_unique();
            let mut s = test_settlement(CommissionKind::ReferralCommission);
            s.begin_validation(false, NOW).unwrap();
            s.release(admin, NOW).unwrap();
            s.mark_paid("receipt-001", admin, NOW).unwrap();
            assert!(s.record_failure("late failure").is_err());
        }

        #[test]
        fn test_credit_entry_type_mapping() {
            assert_eq!(
                credit_entry_type(CommissionKind::ReferralCommission),
                EntryType::ReferralCommission
            );
            assert_eq!(
                credit_entry_type(CommissionKind::MilestoneReward),
                EntryType::Earned
            );
            assert_eq!(
                credit_entry_type(CommissionKind::ProfessionalPayout),
                EntryType::ProfessionalEarnings
            );
            assert_eq!(credit_entry_type(CommissionKind::Refund), EntryType::Refund);
        }
    }

    // ========================================================================
    // 5. LEDGER TESTS
    // ========================================================================

    mod ledger_tests {
        use super::*;

        #[test]
        fn test_credit_updates_aggregates() {
            let mut ledger = test_ledger();
            ledger.credit(1_000).unwrap();
            ledger.credit(500).unwrap();
            assert_eq!(ledger.available, 1_500);
            assert_eq!(ledger.total_earned, 1_500);
            assert_eq!(ledger.entry_count, 2);
        }

        #[test]
        fn test_debit_moves_to_pending() {
            let mut ledger = test_ledger();
            ledger.credit(1_000).unwrap();
            ledger.debit_for_withdrawal(600).unwrap();
            assert_eq!(ledger.available, 400);
            assert_eq!(ledger.pending_out, 600);
            // total_earned is lifetime, unaffected by debits
            assert_eq!(ledger.total_earned, 1_000);
        }

        #[test]
        fn test_debit_beyond_available_rejected() {
            let mut ledger = test_ledger();
            ledger.credit(500).unwrap();
            let result = ledger.debit_for_withdrawal(501);
            assert_eq!(result.unwrap_err(), ErrorCode::InsufficientBalance.into());
            assert_eq!(ledger.available, 500, "Balance must not move on a failed debit");
            assert_eq!(ledger.pending_out, 0);
        }

        #[test]
        fn test_restore_reverses_debit_exactly() {
            let mut ledger = test_ledger();
            ledger.credit(1_000).unwrap();
            ledger.debit_for_withdrawal(600).unwrap();
            ledger.restore_withdrawal(600).unwrap();
            assert_eq!(ledger.available, 1_000);
            assert_eq!(ledger.pending_out, 0);
            assert_eq!(ledger.total_withdrawn, 0);
        }

        #[test]
        fn test_finish_withdrawal_settles_pending() {
            let mut ledger = test_ledger();
            ledger.credit(1_000).unwrap();
            ledger.debit_for_withdrawal(600).unwrap();
            ledger.finish_withdrawal(600).unwrap();
            assert_eq!(ledger.available, 400);
            assert_eq!(ledger.pending_out, 0);
            assert_eq!(ledger.total_withdrawn, 600);
            // Credit, debit and completion each leave one log row
            assert_eq!(ledger.entry_count, 3);
        }

        #[test]
        fn test_restore_without_pending_rejected() {
            let mut ledger = test_ledger();
            assert!(ledger.restore_withdrawal(100).is_err());
            assert!(ledger.finish_withdrawal(100).is_err());
        }
    }

    // ========================================================================
    // 6. WITHDRAWAL REQUEST TESTS
    // ========================================================================

    mod withdrawal_tests {
        use super::*;

        #[test]
        fn test_approve_then_complete() {
            let admin = Pubkey::new_unique();
            let mut w = test_withdrawal(10_000);
            w.approve(admin, NOW).unwrap();
            assert_eq!(w.status, WithdrawalStatus::Approved);
            assert_eq!(w.decided_by, Some(admin));

            w.complete("pix-e2e-abc123", NOW + 60).unwrap();
            assert_eq!(w.status, WithdrawalStatus::Completed);
            assert_eq!(w.external_reference, "pix-e2e-abc123");
            assert_eq!(w.completed_at, NOW + 60);
        }

        #[test]
        fn test_reject_records_note() {
            let admin = Pubkey::new_unique();
            let mut w = test_withdrawal(10_000);
            w.reject(admin, "destination mismatch", NOW).unwrap();
            assert_eq!(w.status, WithdrawalStatus::Rejected);
            assert_eq!(w.note, "destination mismatch");
        }

        #[test]
        fn test_decisions_only_from_pending() {
            let admin = Pubkey::new_unique();
            let mut w = test_withdrawal(10_000);
            w.approve(admin, NOW).unwrap();
            assert!(w.approve(admin, NOW).is_err());
            assert!(w.reject(admin, "too late", NOW).is_err());
        }

        #[test]
        fn test_complete_requires_approval_and_reference() {
            let admin = Pubkey::new_unique();
            let mut w = test_withdrawal(10_000);
            assert!(w.complete("ref", NOW).is_err(), "Pending cannot complete");

            w.approve(admin, NOW).unwrap();
            assert!(w.complete("", NOW).is_err(), "Empty reference rejected");
            w.complete("ref", NOW).unwrap();
            assert!(w.complete("ref", NOW).is_err(), "Completed is terminal");
        }
    }

    // ========================================================================
    // 7. SCENARIO TESTS
    // ========================================================================

    mod scenario_tests {
        use super::*;

        /// Nine participants fill a group at 10% referral with milestone
        /// tiers at 3/6/9. Walks the whole pipeline down to the ledger.
        #[test]
        fn test_nine_participant_group_formation() {
            let plan = test_plan();
            let mut group = test_group(plan.capacity);
            let admin = Pubkey::new_unique();

            let mut referral_total = 0u64;
            for i in 1..=9u8 {
                let position = group.claim_slot(plan.quota_amount).unwrap();
                assert_eq!(position, i);

                // Every participant was referred; accrue 10% of the quota
                referral_total +=
                    apply_rate_half_up(plan.quota_amount, plan.referral_rate_bps).unwrap();

                // Fire any milestone tier whose threshold was just crossed
                for t in 0..plan.milestone_count {
                    let tier = plan.milestone(t).unwrap();
                    if tier.threshold == group.participant_count {
                        group.fire_milestone(t, tier.threshold).unwrap();
                    }
                }
            }

            assert_eq!(group.phase, GroupPhase::Full);
            assert_eq!(group.accumulated_amount, 90_000);
            assert_eq!(group.accumulated_amount, group.target_amount);
            assert_eq!(group.milestones_fired, 0b111, "All three tiers fired");
            assert_eq!(referral_total, 9_000);

            group
                .advance_to_contemplated(
                    plan.contemplation_policy,
                    Some(Pubkey::new_unique()),
                    NOW,
                )
                .unwrap();

            // Organizer's milestone rewards flow through settlement to ledger
            let mut organizer_ledger = test_ledger();
            let mut organizer_rewards = 0u64;
            for t in 0..plan.milestone_count {
                let tier = plan.milestone(t).unwrap();
                let mut s = test_settlement(CommissionKind::MilestoneReward);
                s.amount = tier.reward;
                s.begin_validation(false, NOW).unwrap();
                s.release(admin, NOW).unwrap();
                if s.mark_paid("batch-receipt", admin, NOW).unwrap() {
                    organizer_ledger.credit(s.amount).unwrap();
                    organizer_rewards += s.amount;
                }
            }
            assert_eq!(organizer_rewards, 65_000);
            assert_eq!(organizer_ledger.available, 65_000);

            // Withdraw part of it
            organizer_ledger.debit_for_withdrawal(50_000).unwrap();
            let mut w = test_withdrawal(50_000);
            w.approve(admin, NOW).unwrap();
            w.complete("pix-payout-001", NOW).unwrap();
            organizer_ledger.finish_withdrawal(50_000).unwrap();

            assert_eq!(organizer_ledger.available, 15_000);
            assert_eq!(organizer_ledger.total_withdrawn, 50_000);
            assert_eq!(organizer_ledger.pending_out, 0);
        }

        /// Cancellation path: partial group, refunds queued once per
        /// participant, each for exactly what was paid.
        #[test]
        fn test_cancellation_and_refunds() {
            let plan = test_plan();
            let mut group = test_group(plan.capacity);
            let admin = Pubkey::new_unique();

            let payments = [10_000u64, 10_000, 9_500, 10_500];
            for amount in payments {
                group.claim_slot(amount).unwrap();
            }
            group.cancel(NOW).unwrap();
            assert_eq!(group.phase, GroupPhase::Cancelled);

            // Each refund settlement mirrors the participant's payment
            let mut refunded = 0u64;
            for amount in payments {
                let mut s = test_settlement(CommissionKind::Refund);
                s.amount = amount;
                s.begin_validation(false, NOW).unwrap();
                s.release(admin, NOW).unwrap();
                assert!(s.mark_paid("refund-receipt", admin, NOW).unwrap());
                refunded += s.amount;
            }
            assert_eq!(refunded, group.accumulated_amount);
        }

        /// A paid retry after a crash credits the ledger exactly once.
        #[test]
        fn test_retry_does_not_double_credit() {
            let admin = Pubkey::new_unique();
            let mut ledger = test_ledger();
            let mut s = test_settlement(CommissionKind::ReferralCommission);
            s.begin_validation(false, NOW).unwrap();
            s.release(admin, NOW).unwrap();

            for _ in 0..3 {
                if s.mark_paid("receipt-777", admin, NOW).unwrap() {
                    ledger.credit(s.amount).unwrap();
                }
            }
            assert_eq!(ledger.available, s.amount);
            assert_eq!(ledger.entry_count, 1);
        }
    }
}
