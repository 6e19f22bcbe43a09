use anchor_lang::prelude::*;

use crate::constants::BPS_DIVISOR;
use crate::errors::ErrorCode;
use crate::state::PlanConfig;

/// Apply a basis-point rate with round-half-up to the minor unit
///
/// This is the single rounding rule of the engine: every percentage-derived
/// amount is rounded here, once, at emission time, and never re-derived.
/// Formula: (amount * bps + 5000) / 10000, computed in u128.
pub fn apply_rate_half_up(amount: u64, bps: u16) -> Result<u64> {
    let product = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(ErrorCode::MathOverflow)?;
    let rounded = product
        .checked_add(BPS_DIVISOR as u128 / 2)
        .ok_or(ErrorCode::MathOverflow)?
        / BPS_DIVISOR as u128;
    u64::try_from(rounded).map_err(|_| ErrorCode::MathOverflow.into())
}

/// Result of splitting a completed service sale
///
/// Conservation holds by construction:
/// professional + influencer + platform == total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleSplit {
    pub professional: u64,
    pub influencer: u64,
    pub platform: u64,
}

/// Split a completed sale per the plan's split table
///
/// Percentage shares round half-up once; the platform retains whatever the
/// percentage shares leave behind, plus the fixed platform fee carved out of
/// the professional share. The influencer share applies only when an
/// influencer code was used on the sale.
pub fn split_service_sale(
    total: u64,
    plan: &PlanConfig,
    with_influencer: bool,
) -> Result<SaleSplit> {
    require!(total > 0, ErrorCode::InvalidParameter);

    let mut professional = apply_rate_half_up(total, plan.professional_share_bps)?;
    let mut influencer = if with_influencer {
        apply_rate_half_up(total, plan.influencer_share_bps)?
    } else {
        0
    };

    // Half-up rounding on two shares can overshoot the total by one minor
    // unit when the configured shares sum to exactly 100%; clamp the
    // influencer share so conservation holds.
    if professional > total {
        professional = total;
    }
    influencer = influencer.min(total - professional);

    require!(
        professional >= plan.fixed_platform_fee,
        ErrorCode::FeeExceedsShare
    );
    professional -= plan.fixed_platform_fee;

    let platform = total - professional - influencer;

    Ok(SaleSplit {
        professional,
        influencer,
        platform,
    })
}
