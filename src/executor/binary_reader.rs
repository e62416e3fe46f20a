use std::{
    mem,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    executor::tuple_reader::{TupleIterator, TupleReader},
    storage::{offsets::PageOffsets, page_store::PageStore},
    types::{
        PageRank, TupleIndex,
        error::{ReaderError, Result},
        page::{PageBuffer, PageHeader},
        tuple::Tuple,
    },
};

/// Reads tuples out of a file of fixed-size binary pages.
///
/// One page is buffered at a time. The cumulative tuple count of every page
/// fetched so far is kept so that [`TupleReader::reset_to`] can seek straight
/// to the page holding an earlier tuple instead of rescanning the file.
pub struct BinaryTupleReader {
    path: PathBuf,
    store: Option<PageStore>,
    buffer: PageBuffer,
    // Rewinds fetch into this buffer and swap it in only once the page checks out
    scratch: PageBuffer,
    offsets: PageOffsets,
    current_tuple_index: TupleIndex,
    needs_new_page: bool,
    end_of_file: bool,
}

impl BinaryTupleReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = PageStore::open(path)?;
        info!(path = %store.path().display(), "opened tuple file");
        Ok(Self {
            path: store.path().to_path_buf(),
            store: Some(store),
            buffer: PageBuffer::new(),
            scratch: PageBuffer::new(),
            offsets: PageOffsets::new(),
            current_tuple_index: 0,
            needs_new_page: true,
            end_of_file: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    pub fn is_end_of_file(&self) -> bool {
        self.end_of_file
    }

    pub fn pages_fetched(&self) -> usize {
        self.offsets.pages()
    }

    pub fn offsets(&self) -> &PageOffsets {
        &self.offsets
    }

    /// Attribute count of the buffered page, if one is buffered.
    pub fn attribute_count(&self) -> Option<usize> {
        self.buffer.header().map(|header| header.attribute_count)
    }

    pub fn into_tuples(self) -> TupleIterator<Self> {
        TupleIterator::new(self)
    }

    /// Load the page at the store's position. Returns false if the store is
    /// exhausted.
    fn fetch_page(&mut self) -> Result<bool> {
        let rank = self.offsets.pages() + 1;
        let store = self.store.as_mut().ok_or(ReaderError::Closed)?;
        if store.fill(&mut self.buffer)? == 0 {
            return Ok(false);
        }
        let header = match self.buffer.parse_header(rank) {
            Ok(header) => header,
            Err(e) => {
                // Stay on the bad page so ranks keep matching file offsets
                self.buffer.erase();
                store.seek_to_page(rank)?;
                return Err(e);
            }
        };
        self.offsets.push_page(header.tuple_count);
        self.needs_new_page = false;
        debug!(
            page = rank,
            attributes = header.attribute_count,
            tuples = header.tuple_count,
            cumulative = self.offsets.total(),
            "fetched page"
        );
        Ok(true)
    }

    /// Re-read page `rank` into `page` and place its cursor on `tuple_in_page`.
    fn refetch_page(
        store: &mut PageStore,
        page: &mut PageBuffer,
        rank: PageRank,
        expected_tuples: usize,
        tuple_in_page: usize,
    ) -> Result<PageHeader> {
        store.seek_to_page(rank)?;
        if store.fill(page)? == 0 {
            return Err(ReaderError::InconsistentOffsets {
                page: rank,
                reason: "end of file while re-reading a visited page".to_string(),
            });
        }
        let header = page.parse_header(rank)?;
        if header.tuple_count != expected_tuples {
            return Err(ReaderError::InconsistentOffsets {
                page: rank,
                reason: format!(
                    "page now holds {} tuples, {} were recorded",
                    header.tuple_count, expected_tuples
                ),
            });
        }
        if !page.seek_to_tuple(tuple_in_page) {
            return Err(ReaderError::InconsistentOffsets {
                page: rank,
                reason: format!("page has no tuple at offset {}", tuple_in_page),
            });
        }
        Ok(header)
    }
}

impl TupleReader for BinaryTupleReader {
    fn read(&mut self) -> Result<Option<Tuple>> {
        if self.store.is_none() {
            return Err(ReaderError::Closed);
        }
        while !self.end_of_file {
            if self.needs_new_page && !self.fetch_page()? {
                self.end_of_file = true;
                debug!(tuples = self.current_tuple_index, "reached end of tuple file");
                break;
            }
            if let Some(tuple) = self.buffer.read_tuple() {
                self.current_tuple_index += 1;
                return Ok(Some(tuple));
            }
            self.buffer.erase();
            self.needs_new_page = true;
        }
        Ok(None)
    }

    fn reset_to(&mut self, index: TupleIndex) -> Result<()> {
        if self.store.is_none() {
            return Err(ReaderError::Closed);
        }
        if index >= self.current_tuple_index {
            return Err(ReaderError::IndexOutOfRange {
                index,
                current: self.current_tuple_index,
            });
        }
        let rank = self.offsets.page_containing(index).ok_or_else(|| {
            ReaderError::InconsistentOffsets {
                page: self.offsets.pages(),
                reason: format!("no visited page holds tuple {}", index),
            }
        })?;
        let (Some(tuples_before), Some(expected_tuples)) =
            (self.offsets.get(rank - 1), self.offsets.tuples_in(rank))
        else {
            return Err(ReaderError::InconsistentOffsets {
                page: rank,
                reason: "missing recorded offsets".to_string(),
            });
        };
        let tuple_in_page = (index - tuples_before) as usize;

        let store = self.store.as_mut().ok_or(ReaderError::Closed)?;
        let saved_position = store.position()?;
        let header = match Self::refetch_page(
            store,
            &mut self.scratch,
            rank,
            expected_tuples,
            tuple_in_page,
        ) {
            Ok(header) => header,
            Err(e) => {
                if matches!(e, ReaderError::InconsistentOffsets { .. }) {
                    warn!(index, page = rank, error = %e, "rewind found inconsistent page offsets");
                }
                // Leave the store where the untouched reader state expects it
                if let Err(restore) = store.seek_to(saved_position) {
                    warn!(position = saved_position, error = %restore, "could not restore store position");
                }
                return Err(e);
            }
        };

        self.offsets.truncate(rank);
        self.offsets.push_page(header.tuple_count);
        mem::swap(&mut self.buffer, &mut self.scratch);
        self.scratch.erase();
        self.needs_new_page = false;
        self.end_of_file = false;
        self.current_tuple_index = index;
        debug!(index, page = rank, tuple_in_page, "rewound to tuple");
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        if let Some(store) = self.store.take() {
            store.close()?;
        }
        self.buffer.erase();
        self.scratch.erase();
        self.offsets.clear();
        self.current_tuple_index = 0;
        self.needs_new_page = true;
        self.end_of_file = false;
        self.store = Some(PageStore::open(&self.path)?);
        info!(path = %self.path.display(), "reopened tuple file");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(store) = self.store.take() {
            store.close()?;
            info!(path = %self.path.display(), "closed tuple file");
        }
        Ok(())
    }

    fn current_index(&self) -> TupleIndex {
        self.current_tuple_index
    }
}
