use anchor_lang::prelude::*;

/// Global platform configuration and counters
///
/// Only one PlatformState account exists per program instance. Admin-gated
/// instructions (pause, resume, parameter updates, admin transfer) operate
/// on this account.
#[account]
pub struct PlatformState {
    /// Current admin authority
    pub admin: Pubkey,

    /// Minimum accepted withdrawal amount (minor units)
    pub min_withdrawal: u64,

    /// Whether the engine accepts joins, accruals and withdrawals
    pub is_active: bool,

    /// Total groups ever created
    pub total_groups: u64,

    /// Total settlements ever created
    pub total_settlements: u64,

    /// Total settlements that reached paid
    pub total_settlements_paid: u64,

    /// Cumulative amount credited through paid settlements
    pub total_paid_out: u64,

    /// External-failure notes recorded against settlements
    pub failed_settlements: u32,

    /// Timestamp when the platform was initialized
    pub initialized_at: i64,

    /// PDA bump
    pub bump: u8,
}

impl PlatformState {
    /// Account size calculation:
    /// - admin: 32 bytes
    /// - 5 u64: 40 bytes (min_withdrawal, total_groups, total_settlements,
    ///   total_settlements_paid, total_paid_out)
    /// - failed_settlements: 4 bytes
    /// - initialized_at: 8 bytes
    /// - is_active + bump: 2 bytes
    /// Total: 86 bytes
    pub const LEN: usize = 32 + 8 * 5 + 4 + 8 + 2;
}
