use anchor_lang::prelude::*;

/// One accepted slot in a group
///
/// Immutable once created except for the `validated` and `refund_queued`
/// flags. The PDA is derived from (group, user), so the same user cannot
/// join the same group twice.
#[account]
pub struct Participant {
    /// Owning group (exactly one, immutable)
    pub group: Pubkey,

    /// Joining user
    pub user: Pubkey,

    /// Slot position, 1..=capacity, unique within the group
    pub position: u8,

    /// Referrer back-reference; never an ownership edge
    pub referrer: Option<Pubkey>,

    /// Amount paid at join (minor units)
    pub amount_paid: u64,

    /// Join timestamp
    pub joined_at: i64,

    /// Set by administration once the participant's payment is confirmed
    pub validated: bool,

    /// Set when a refund line item has been queued after cancellation
    pub refund_queued: bool,

    /// PDA bump
    pub bump: u8,
}

impl Participant {
    /// Account size calculation:
    /// - group + user: 64 bytes
    /// - referrer: 33 bytes (Option<Pubkey>)
    /// - amount_paid + joined_at: 16 bytes
    /// - position + validated + refund_queued + bump: 4 bytes
    /// Total: 117 bytes
    pub const LEN: usize = 32 * 2 + 33 + 8 * 2 + 4;
}
