//! Business logic services
//!
//! Poll lifecycle handling, history recovery, and the dispatcher that
//! routes client events to them.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event_loop;
pub mod poll;
pub mod recovery;
pub mod staleness;

pub use context::{BotSettings, ServiceContext, ServiceContextBuilder};
pub use dispatcher::{EventDispatcher, DECRYPTION_FAILURE_REACTION};
pub use error::{ServiceError, ServiceResult};
pub use event_loop::{EventLoop, InboundEvent, EVENT_BUFFER_SIZE};
pub use poll::{HandleOutcome, IgnoreReason, PollService};
pub use recovery::{history_pages, RecoveryOutcome, RecoveryService, RejectReason};
pub use staleness::StalenessFilter;
