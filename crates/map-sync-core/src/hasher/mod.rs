pub mod xxhash;

pub use xxhash::hash_file;
