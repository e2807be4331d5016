/// Filesystem reads and atomic writes.
pub mod fs;
