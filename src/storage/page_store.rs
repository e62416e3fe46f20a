use std::{
    fs::{File, OpenOptions},
    io::{self, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use crate::types::{
    PAGE_SIZE, PageRank,
    error::{ReaderError, Result},
    page::PageBuffer,
};

/// Read-only, seekable handle on a file of fixed-size pages.
pub struct PageStore {
    path: PathBuf,
    file: File,
}

impl PageStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ReaderError::SourceNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ReaderError::Io(e)
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_offset(rank: PageRank) -> u64 {
        (rank.saturating_sub(1) * PAGE_SIZE) as u64
    }

    /// Fill `buffer` with up to one page from the current position.
    /// Zero bytes means the store is exhausted.
    pub fn fill(&mut self, buffer: &mut PageBuffer) -> Result<usize> {
        Ok(buffer.fill_from(&mut self.file)?)
    }

    /// Position the store at the first byte of page `rank`.
    pub fn seek_to_page(&mut self, rank: PageRank) -> Result<()> {
        self.seek_to(Self::page_offset(rank))
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.file.stream_position()?)
    }

    /// Release the handle. The descriptor is closed on drop; a read-only
    /// handle has no buffered state whose release could fail.
    pub fn close(self) -> Result<()> {
        drop(self.file);
        Ok(())
    }
}
