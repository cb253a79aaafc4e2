pub mod map_binder;
pub mod memory_map;
pub mod reconciler;
pub mod view;
