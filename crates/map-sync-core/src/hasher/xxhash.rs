use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::XxHash64;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Content hash of a whole file, streamed in fixed-size chunks.
pub fn hash_file(file: &Path) -> io::Result<u64> {
    let mut f = File::open(file)?;
    let mut hasher = XxHash64::with_seed(0);
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = f.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.write(&buf[..read]);
    }
    Ok(hasher.finish())
}
