use std::{io::Write, path::Path};

use tracing::debug;

use crate::{
    storage::page_store::PageStore,
    types::{
        error::Result,
        page::{PageBuffer, PageHeader},
    },
};

/// Write every page of the tuple file at `path` to `out`, one header line per
/// page followed by one comma separated line per tuple. Returns the headers in
/// page order.
pub fn dump_pages<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<Vec<PageHeader>> {
    let mut store = PageStore::open(path)?;
    let mut buffer = PageBuffer::new();
    let mut headers = Vec::new();

    while store.fill(&mut buffer)? > 0 {
        let rank = headers.len() + 1;
        let header = buffer.parse_header(rank)?;
        debug!(
            page = rank,
            attributes = header.attribute_count,
            tuples = header.tuple_count,
            "dumping page"
        );
        writeln!(
            out,
            "== page {}: {} tuples x {} attributes ==",
            rank, header.tuple_count, header.attribute_count
        )?;
        while let Some(tuple) = buffer.read_tuple() {
            writeln!(out, "{}", tuple)?;
        }
        headers.push(header);
    }

    store.close()?;
    Ok(headers)
}
