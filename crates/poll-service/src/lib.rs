//! # poll-service
//!
//! Application layer: poll lifecycle handling, history recovery, and event
//! dispatch on top of the storage and messaging ports, plus the startup
//! entry point that wires them to a configured store.

pub mod services;
pub mod startup;


pub use services::{
    history_pages, BotSettings, EventDispatcher, EventLoop, HandleOutcome, IgnoreReason,
    InboundEvent, PollService, RecoveryOutcome, RecoveryService, RejectReason, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, StalenessFilter,
    DECRYPTION_FAILURE_REACTION, EVENT_BUFFER_SIZE,
};
pub use startup::{create_dispatcher, run};
