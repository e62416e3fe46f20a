pub mod binary_reader;
pub mod tuple_reader;
