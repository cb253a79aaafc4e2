pub mod local_store;
pub mod resource_cache;
