use anchor_lang::prelude::*;

/// Engine error codes
///
/// Structural invariant violations (capacity, state machine, split sums) are
/// rejected synchronously and never partially applied. Each code maps to one
/// user-visible rejection reason.
#[error_code]
pub enum ErrorCode {
    #[msg("Group is at capacity")]
    CapacityExceeded,

    #[msg("Illegal state transition")]
    InvalidState,

    #[msg("Split percentages exceed 100%")]
    InvalidSplitConfiguration,

    #[msg("Payment proof reference required")]
    MissingProof,

    #[msg("Settlement not yet awaiting validation")]
    NotReady,

    #[msg("Insufficient available balance")]
    InsufficientBalance,

    #[msg("Reference already credited")]
    DuplicateCredit,

    #[msg("External collaborator failure recorded")]
    ExternalServiceFailure,

    #[msg("Unauthorized")]
    UnauthorizedAccess,

    #[msg("Platform is paused")]
    PlatformInactive,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Invalid parameter")]
    InvalidParameter,

    #[msg("Amount below minimum withdrawal")]
    BelowMinimumWithdrawal,

    #[msg("Account is not a participant of this group")]
    NotAParticipant,

    #[msg("Participant count below milestone threshold")]
    MilestoneNotReached,

    #[msg("Milestone already awarded for this group")]
    MilestoneAlreadyAwarded,

    #[msg("Participant has no referrer")]
    NoReferrer,

    #[msg("Group is not cancelled")]
    GroupNotCancelled,

    #[msg("Refund already queued for this participant")]
    RefundAlreadyQueued,

    #[msg("Contemplation policy requires a winner")]
    WinnerRequired,

    #[msg("Contemplation policy grants all participants; no winner allowed")]
    WinnerNotAllowed,

    #[msg("Delivery not confirmed for this settlement kind")]
    DeliveryNotConfirmed,

    #[msg("Fixed platform fee exceeds professional share")]
    FeeExceedsShare,

    #[msg("String field exceeds maximum length")]
    StringTooLong,
}
