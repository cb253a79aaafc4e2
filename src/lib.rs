pub mod api;
pub mod core;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod session;
pub mod stores;
pub mod sync;
pub mod tracking;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod test_support;
