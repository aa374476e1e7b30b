pub mod walk;

pub use walk::{list_files, list_relative_paths, list_root_files};
