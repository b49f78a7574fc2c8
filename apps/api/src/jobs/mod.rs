pub mod adapters;
pub mod sync;
pub mod types;
