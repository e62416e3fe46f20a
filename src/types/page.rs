use std::io::{self, Read};

use crate::types::{
    INT_SIZE, PAGE_HEADER_INTS, PAGE_HEADER_SIZE, PAGE_SIZE, PageRank,
    error::{ReaderError, Result},
    tuple::Tuple,
};

/*
 * Page Layout on Disk (all integers big-endian i32)
 * ┌─────────────────────────────────────────────────────────────────┐
 * │  attribute_count(4) | tuple_count(4)                            │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  tuple 0: attr 0 | attr 1 | ... | attr (attribute_count - 1)    │
 * │  tuple 1: ...                                                   │
 * │  ...                                                            │
 * ├───────────────────────── limit ─────────────────────────────────┤
 * │  PADDING (never parsed)                                         │
 * └─────────────────────────────────────────────────────────────────┘
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub attribute_count: usize,
    pub tuple_count: usize,
}

impl PageHeader {
    pub fn new(attribute_count: usize, tuple_count: usize) -> Self {
        Self {
            attribute_count,
            tuple_count,
        }
    }

    /// Parse and structurally check the two header integers of page `page`.
    pub fn from_bytes(page: PageRank, bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PAGE_HEADER_SIZE {
            return Err(ReaderError::CorruptedPage {
                page,
                reason: format!("header needs {} bytes, got {}", PAGE_HEADER_SIZE, bytes.len()),
            });
        }
        let attribute_count = read_be_i32(&bytes[0..INT_SIZE]);
        let tuple_count = read_be_i32(&bytes[INT_SIZE..PAGE_HEADER_SIZE]);
        if attribute_count < 0 || tuple_count < 0 {
            return Err(ReaderError::CorruptedPage {
                page,
                reason: format!(
                    "negative header counts (attributes={}, tuples={})",
                    attribute_count, tuple_count
                ),
            });
        }
        let header = Self::new(attribute_count as usize, tuple_count as usize);
        if header.attribute_count == 0 && header.tuple_count > 0 {
            return Err(ReaderError::CorruptedPage {
                page,
                reason: format!("{} tuples declared with zero attributes", header.tuple_count),
            });
        }
        match header.data_limit() {
            Some(limit) if limit <= PAGE_SIZE => Ok(header),
            _ => Err(ReaderError::CorruptedPage {
                page,
                reason: format!(
                    "{} tuples x {} attributes do not fit in a {} byte page",
                    header.tuple_count, header.attribute_count, PAGE_SIZE
                ),
            }),
        }
    }

    pub fn to_bytes(&self) -> [u8; PAGE_HEADER_SIZE] {
        let mut buffer = [0u8; PAGE_HEADER_SIZE];
        buffer[0..INT_SIZE].copy_from_slice(&(self.attribute_count as i32).to_be_bytes());
        buffer[INT_SIZE..PAGE_HEADER_SIZE]
            .copy_from_slice(&(self.tuple_count as i32).to_be_bytes());
        buffer
    }

    /// Byte offset one past the last tuple value, `None` on overflow.
    pub fn data_limit(&self) -> Option<usize> {
        self.attribute_count
            .checked_mul(self.tuple_count)?
            .checked_add(PAGE_HEADER_INTS)?
            .checked_mul(INT_SIZE)
    }

    pub fn tuple_size(&self) -> usize {
        self.attribute_count * INT_SIZE
    }

    /// Largest tuple count a page of this width can hold.
    pub fn capacity(attribute_count: usize) -> usize {
        if attribute_count == 0 {
            return 0;
        }
        (PAGE_SIZE - PAGE_HEADER_SIZE) / (attribute_count * INT_SIZE)
    }
}

fn read_be_i32(bytes: &[u8]) -> i32 {
    i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Owned page-sized byte region with a read cursor and a logical limit.
///
/// `limit` is derived from the page header once one is parsed, never assumed
/// to be `PAGE_SIZE`, so padding after the last tuple is unreachable through
/// the cursor.
pub struct PageBuffer {
    data: Box<[u8; PAGE_SIZE]>,
    filled: usize,
    position: usize,
    limit: usize,
    header: Option<PageHeader>,
}

impl Default for PageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuffer {
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
            filled: 0,
            position: 0,
            limit: 0,
            header: None,
        }
    }

    /// Zero the whole region and forget the parsed header.
    pub fn erase(&mut self) {
        self.data.fill(0);
        self.filled = 0;
        self.position = 0;
        self.limit = 0;
        self.header = None;
    }

    /// Fill the region from `source`'s current position, returning the number
    /// of bytes read. Stops at `PAGE_SIZE` or when the source is exhausted.
    pub fn fill_from<R: Read>(&mut self, source: &mut R) -> io::Result<usize> {
        self.erase();
        let mut filled = 0;
        while filled < PAGE_SIZE {
            match source.read(&mut self.data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        self.filled = filled;
        Ok(filled)
    }

    /// Decode the header of the freshly filled page and position the cursor on
    /// its first tuple.
    pub fn parse_header(&mut self, page: PageRank) -> Result<PageHeader> {
        let header = PageHeader::from_bytes(page, &self.data[..self.filled])?;
        // Checked in from_bytes, the limit fits in the page
        let limit = header.data_limit().unwrap_or(PAGE_SIZE);
        if limit > self.filled {
            return Err(ReaderError::CorruptedPage {
                page,
                reason: format!(
                    "header declares {} bytes of data but only {} are present",
                    limit, self.filled
                ),
            });
        }
        self.limit = limit;
        self.position = PAGE_HEADER_SIZE;
        self.header = Some(header);
        Ok(header)
    }

    pub fn header(&self) -> Option<PageHeader> {
        self.header
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.position)
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Move the cursor onto the `tuple_in_page`-th tuple of the page.
    /// Returns false, leaving the cursor alone, if the page has no such tuple.
    pub fn seek_to_tuple(&mut self, tuple_in_page: usize) -> bool {
        let Some(header) = self.header else {
            return false;
        };
        if tuple_in_page >= header.tuple_count {
            return false;
        }
        self.position = (tuple_in_page * header.attribute_count + PAGE_HEADER_INTS) * INT_SIZE;
        true
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        if self.remaining() < INT_SIZE {
            return None;
        }
        let value = read_be_i32(&self.data[self.position..self.position + INT_SIZE]);
        self.position += INT_SIZE;
        Some(value)
    }

    /// Decode the tuple under the cursor and advance past it.
    pub fn read_tuple(&mut self) -> Option<Tuple> {
        let header = self.header?;
        if header.attribute_count == 0 || self.remaining() < header.tuple_size() {
            return None;
        }
        let mut values = Vec::with_capacity(header.attribute_count);
        for _ in 0..header.attribute_count {
            values.push(self.read_i32()?);
        }
        Some(Tuple::new(values))
    }
}
