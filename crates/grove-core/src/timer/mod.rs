mod clock;
mod engine;
mod mode;
pub mod rehydrate;

pub use clock::{ManualClock, SystemClock, TimeSource};
pub use engine::{SessionEngine, SessionState, SubscriptionId};
pub use mode::{Mode, Species};
