pub mod access_log;
pub mod card;
pub mod category;
pub mod gps;
pub mod permission;
pub mod portal;
pub mod route;
pub mod session;
pub mod status;
pub mod user;
pub mod vehicle;

use crate::core::error::SyncError;

/// Local precondition check run before a request is sent
pub trait Validate {
    fn validate(&self) -> Result<(), SyncError>;
}
