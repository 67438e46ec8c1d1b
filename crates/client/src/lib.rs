//! Client library for the Strato cluster manager API.
//!
//! The entry point is [`ApiSession`], a scoped HTTP session constructed from
//! an [`ApiConfig`]. Sub-resource clients (`group()`, `manager()`, `admin()`,
//! `resource()`) borrow the session and issue individual API calls.

pub mod config;
pub mod envelope;
pub mod session;

pub use config::ApiConfig;
pub use envelope::Mutation;
pub use session::{
    AdminClient, Announcement, ApiSession, GroupClient, ManagerClient, ManagerStatus,
    ResourceClient,
};
