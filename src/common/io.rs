use std::fs::File;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

/// Holds raw file bytes — either a zero-copy mmap or an owned Vec.
/// Dereferences to `&[u8]` so callers don't care which.
pub enum FileData {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

/// Below this size read() wins: mmap setup/teardown (page tables, TLB
/// flush on munmap) costs more than the copy it saves.
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Read a whole regular file, mmap'd above `MMAP_THRESHOLD`.
/// The sort touches the payload exactly once, sequentially, so we hint
/// the kernel accordingly.
pub fn read_file(path: &Path) -> io::Result<FileData> {
    let mut file = File::open(path)?;
    let metadata = file.metadata()?;
    let len = metadata.len();

    if len == 0 || !metadata.file_type().is_file() {
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        return Ok(FileData::Owned(buf));
    }

    if len < MMAP_THRESHOLD {
        let mut buf = Vec::with_capacity(len as usize);
        file.read_to_end(&mut buf)?;
        return Ok(FileData::Owned(buf));
    }

    // SAFETY: read-only mapping of a regular file we just opened.
    match unsafe { Mmap::map(&file) } {
        Ok(mmap) => {
            #[cfg(target_os = "linux")]
            {
                let _ = mmap.advise(memmap2::Advice::Sequential);
                let _ = mmap.advise(memmap2::Advice::WillNeed);
            }
            Ok(FileData::Mmap(mmap))
        }
        Err(_) => {
            // mmap failed (e.g. special filesystem) — fall back to read
            let mut buf = Vec::with_capacity(len as usize);
            file.read_to_end(&mut buf)?;
            Ok(FileData::Owned(buf))
        }
    }
}
