//! Ports - storage and messaging interfaces implemented outside the domain

mod client;
mod repositories;

pub use client::{ClientError, ClientResult, OutgoingMessage, RoomClient};
pub use repositories::{PollRepository, RepoResult};
