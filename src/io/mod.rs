pub mod backend;
pub mod file;

pub use backend::{sample_snapshot, LocalBackend};
pub use file::{load_snapshot, save_snapshot};
