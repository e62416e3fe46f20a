use crate::types::{TupleIndex, error::ReaderError, tuple::Tuple};

/// A rewindable stream of tuples.
pub trait TupleReader {
    /// Next tuple, or `None` once the stream is exhausted.
    fn read(&mut self) -> Result<Option<Tuple>, ReaderError>;

    fn read_batch(&mut self, batch_size: usize) -> Result<Vec<Tuple>, ReaderError> {
        let mut tuples = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            match self.read()? {
                Some(tuple) => tuples.push(tuple),
                None => break,
            }
        }
        Ok(tuples)
    }

    /// Rewind so that the next `read` returns tuple `index` again.
    /// Only already-visited positions (`index < current_index()`) are accepted.
    fn reset_to(&mut self, index: TupleIndex) -> Result<(), ReaderError>;

    /// Rewind to the first tuple.
    fn reset(&mut self) -> Result<(), ReaderError>;

    fn close(&mut self) -> Result<(), ReaderError>;

    /// Index the next `read` will return, i.e. the number of tuples read so far.
    fn current_index(&self) -> TupleIndex;
}

pub struct TupleIterator<R: TupleReader> {
    reader: R,
}

impl<R: TupleReader> TupleIterator<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: TupleReader> Iterator for TupleIterator<R> {
    type Item = Result<Tuple, ReaderError>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read() {
            Ok(Some(tuple)) => Some(Ok(tuple)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
