pub mod dispatcher;
pub mod liveness;
pub mod portal;
pub mod resource;
pub mod stats;
