//! Video frames as files.
//!
//! Each frame is written as `frame-NNNNNN.bin` in the configured directory and removed when the
//! next one arrives, so there is at most one file at any time.
//!

use std::fs;
use std::path::{Path, PathBuf};

use eyre::Result;
use tracing::{trace, warn};

use fleetwatch_engine::{FrameHandle, FrameSink};

#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    count: u64,
}

impl FileSink {
    /// Create `dir` if needed.
    ///
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(FileSink {
            dir: dir.to_path_buf(),
            count: 0,
        })
    }
}

impl FrameSink for FileSink {
    fn create(&mut self, data: &[u8]) -> Result<FrameHandle> {
        self.count += 1;
        let path = self.dir.join(format!("frame-{:06}.bin", self.count));
        fs::write(&path, data)?;
        trace!("wrote {} bytes into {path:?}", data.len());
        Ok(FrameHandle(path.to_string_lossy().to_string()))
    }

    fn release(&mut self, handle: FrameHandle) {
        if let Err(e) = fs::remove_file(&handle.0) {
            warn!("can not remove {handle}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use fleetwatch_engine::FrameSlot;

    use super::*;

    fn files(dir: &Path) -> Vec<String> {
        let mut v: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn test_one_file_at_a_time() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let frames = dir.path().join("frames");

        let mut slot = FrameSlot::new(Box::new(FileSink::new(&frames)?));
        slot.present(b"one")?;
        assert_eq!(vec!["frame-000001.bin"], files(&frames));

        let h = slot.present(b"second")?.clone();
        assert_eq!(vec!["frame-000002.bin"], files(&frames));
        assert_eq!(b"second".to_vec(), fs::read(&h.0)?);

        drop(slot);
        assert!(files(&frames).is_empty());
        Ok(())
    }
}
