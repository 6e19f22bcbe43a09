pub mod group;
pub mod ledger;
pub mod participant;
pub mod plan;
pub mod platform;
pub mod settlement;
pub mod withdrawal;

pub use group::*;
pub use ledger::*;
pub use participant::*;
pub use plan::*;
pub use platform::*;
pub use settlement::*;
pub use withdrawal::*;
