//! Account infrastructure - identity-provider lifecycle hooks

mod service;

pub use service::AccountService;
