//! Invitation infrastructure - the issue/redeem orchestrator

mod service;

pub use service::InvitationService;
