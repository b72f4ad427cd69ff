/// Persisted per-file log read offsets
pub mod offset_store;

pub use offset_store::OffsetStore;
