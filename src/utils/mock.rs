use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use tempfile::env::temp_dir;

use crate::types::{INT_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE, page::PageHeader};

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn get_unix_timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis()
}

pub fn create_temp_path_with_prefix(prefix: &str) -> PathBuf {
    let mut temp_path = temp_dir();
    temp_path.push(format!(
        "{}_{}_{}_{}.bin",
        prefix,
        std::process::id(),
        get_unix_timestamp_millis(),
        TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    temp_path
}

/// Encode one page in the on-disk layout, zero padded to `PAGE_SIZE`.
/// Every tuple must have the same width.
pub fn encode_page(tuples: &[Vec<i32>]) -> Vec<u8> {
    let attribute_count = tuples.first().map(Vec::len).unwrap_or(0);
    let header = PageHeader::new(attribute_count, tuples.len());
    let mut page = vec![0u8; PAGE_SIZE];
    page[..PAGE_HEADER_SIZE].copy_from_slice(&header.to_bytes());
    let mut offset = PAGE_HEADER_SIZE;
    for tuple in tuples {
        assert_eq!(tuple.len(), attribute_count, "tuples in a page must share a width");
        for value in tuple {
            page[offset..offset + INT_SIZE].copy_from_slice(&value.to_be_bytes());
            offset += INT_SIZE;
        }
    }
    page
}

/// Split `tuples` into pages packed to capacity.
pub fn paginate(tuples: &[Vec<i32>]) -> Vec<Vec<Vec<i32>>> {
    let attribute_count = tuples.first().map(Vec::len).unwrap_or(0);
    let capacity = PageHeader::capacity(attribute_count).max(1);
    tuples.chunks(capacity).map(<[Vec<i32>]>::to_vec).collect()
}

pub fn write_pages<P: AsRef<Path>>(path: P, pages: &[Vec<Vec<i32>>]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    for page in pages {
        file.write_all(&encode_page(page))?;
    }
    file.flush()
}

/// `width`-attribute tuples whose values encode their own index: tuple `i`
/// holds `i * 1000 + attribute`.
pub fn sequential_tuples(count: usize, width: usize) -> Vec<Vec<i32>> {
    (0..count)
        .map(|i| (0..width).map(|a| (i * 1000 + a) as i32).collect())
        .collect()
}

/// A tuple file in the temp directory, deleted on drop.
pub struct TempTupleFile {
    pub path: PathBuf,
}

impl TempTupleFile {
    pub fn with_pages(prefix: &str, pages: &[Vec<Vec<i32>>]) -> Self {
        let path = create_temp_path_with_prefix(prefix);
        write_pages(&path, pages).expect("Failed to write tuple file");
        Self { path }
    }

    pub fn with_tuples(prefix: &str, tuples: &[Vec<i32>]) -> Self {
        Self::with_pages(prefix, &paginate(tuples))
    }

    pub fn with_bytes(prefix: &str, bytes: &[u8]) -> Self {
        let path = create_temp_path_with_prefix(prefix);
        fs::write(&path, bytes).expect("Failed to write tuple file");
        Self { path }
    }
}

impl Drop for TempTupleFile {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}
