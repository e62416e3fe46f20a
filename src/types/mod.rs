pub mod error;
pub mod page;
pub mod tuple;

// Common type aliases
pub type TupleIndex = u64;
pub type PageRank = usize;

// On-disk format constants, shared with the writer side of the format
pub const PAGE_SIZE: usize = 4096;
pub const INT_SIZE: usize = 4; // every value is a big-endian i32
pub const PAGE_HEADER_INTS: usize = 2; // attribute_count + tuple_count
pub const PAGE_HEADER_SIZE: usize = PAGE_HEADER_INTS * INT_SIZE;
