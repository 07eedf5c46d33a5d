/// Filesystem-backed text sources.
pub mod fs;

pub use fs::FileTextSource;
