pub mod resolver;
pub mod sanitize;

pub use resolver::{FolderLayout, FolderPlanner, FolderResolver, ResolvedFolder};
pub use sanitize::{sanitize, sanitize_segment, NOT_APPLICABLE};
