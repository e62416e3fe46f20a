use std::fs::OpenOptions;

use pagetuple::{
    executor::{binary_reader::BinaryTupleReader, tuple_reader::TupleReader},
    types::{PAGE_SIZE, error::ReaderError, tuple::Tuple},
    utils::mock::{TempTupleFile, sequential_tuples, write_pages},
};

fn two_page_file(prefix: &str) -> TempTupleFile {
    TempTupleFile::with_pages(
        prefix,
        &[
            vec![vec![1, 10], vec![2, 20], vec![3, 30]],
            vec![vec![4, 40], vec![5, 50]],
        ],
    )
}

fn drain(reader: &mut BinaryTupleReader) -> Result<Vec<Tuple>, ReaderError> {
    let mut tuples = Vec::new();
    while let Some(tuple) = reader.read()? {
        tuples.push(tuple);
    }
    Ok(tuples)
}

#[test]
fn test_reset_to_first_tuple_of_second_page() -> Result<(), ReaderError> {
    let file = two_page_file("reset_second_page");
    let mut reader = BinaryTupleReader::open(&file.path)?;
    assert_eq!(drain(&mut reader)?.len(), 5);
    reader.reset_to(3)?;
    assert_eq!(reader.current_index(), 3);
    assert!(!reader.is_end_of_file());
    assert_eq!(reader.offsets().as_slice(), &[0, 3, 5]);
    assert_eq!(reader.read()?, Some(Tuple::from([4, 40])));
    assert_eq!(reader.read()?, Some(Tuple::from([5, 50])));
    assert_eq!(reader.read()?, None);
    Ok(())
}

#[test]
fn test_reset_back_into_earlier_page() -> Result<(), ReaderError> {
    let file = two_page_file("reset_earlier_page");
    let mut reader = BinaryTupleReader::open(&file.path)?;
    reader.read_batch(4)?;
    reader.reset_to(1)?;
    // Later pages are forgotten until visited again
    assert_eq!(reader.offsets().as_slice(), &[0, 3]);
    let tuples = drain(&mut reader)?;
    assert_eq!(
        tuples,
        vec![
            Tuple::from([2, 20]),
            Tuple::from([3, 30]),
            Tuple::from([4, 40]),
            Tuple::from([5, 50]),
        ]
    );
    assert_eq!(reader.current_index(), 5);
    assert_eq!(reader.offsets().as_slice(), &[0, 3, 5]);
    Ok(())
}

#[test]
fn test_reset_within_current_page() -> Result<(), ReaderError> {
    let file = two_page_file("reset_same_page");
    let mut reader = BinaryTupleReader::open(&file.path)?;
    reader.read_batch(3)?;
    // Page 2 has not been fetched yet
    assert_eq!(reader.pages_fetched(), 1);
    reader.reset_to(2)?;
    assert_eq!(reader.read()?, Some(Tuple::from([3, 30])));
    assert_eq!(reader.read()?, Some(Tuple::from([4, 40])));
    Ok(())
}

#[test]
fn test_reset_round_trip_across_many_pages() -> Result<(), ReaderError> {
    let tuples = sequential_tuples(3000, 3);
    let file = TempTupleFile::with_tuples("reset_many_pages", &tuples);
    let mut reader = BinaryTupleReader::open(&file.path)?;
    drain(&mut reader)?;
    // Each replay moves the index, so rewind targets only go down
    for index in [2999u64, 2000, 1500, 681, 341, 340, 0] {
        reader.reset_to(index)?;
        let replay = reader.read_batch(5)?;
        let expected: Vec<Tuple> = tuples[index as usize..]
            .iter()
            .take(5)
            .cloned()
            .map(Tuple::new)
            .collect();
        assert_eq!(replay, expected, "replay from {}", index);
    }
    Ok(())
}

#[test]
fn test_reset_skips_empty_pages() -> Result<(), ReaderError> {
    let file = TempTupleFile::with_pages(
        "reset_empty_pages",
        &[vec![vec![1], vec![2]], vec![], vec![vec![3]]],
    );
    let mut reader = BinaryTupleReader::open(&file.path)?;
    drain(&mut reader)?;
    reader.reset_to(2)?;
    assert_eq!(reader.offsets().as_slice(), &[0, 2, 2, 3]);
    assert_eq!(reader.read()?, Some(Tuple::from([3])));
    reader.reset_to(1)?;
    assert_eq!(reader.offsets().as_slice(), &[0, 2]);
    assert_eq!(drain(&mut reader)?, vec![Tuple::from([2]), Tuple::from([3])]);
    Ok(())
}

#[test]
fn test_reset_out_of_range_leaves_state() -> Result<(), ReaderError> {
    let file = two_page_file("reset_out_of_range");
    let mut reader = BinaryTupleReader::open(&file.path)?;
    assert!(matches!(
        reader.reset_to(0),
        Err(ReaderError::IndexOutOfRange { index: 0, current: 0 })
    ));
    reader.read_batch(2)?;
    for index in [2, 3, u64::MAX] {
        assert!(matches!(
            reader.reset_to(index),
            Err(ReaderError::IndexOutOfRange { current: 2, .. })
        ));
        assert_eq!(reader.current_index(), 2);
    }
    assert_eq!(reader.read()?, Some(Tuple::from([3, 30])));
    Ok(())
}

#[test]
fn test_reset_after_file_shrank() -> Result<(), ReaderError> {
    let file = two_page_file("reset_shrank");
    let mut reader = BinaryTupleReader::open(&file.path)?;
    reader.read_batch(5)?;
    let offsets_before = reader.offsets().clone();

    OpenOptions::new()
        .write(true)
        .open(&file.path)?
        .set_len(PAGE_SIZE as u64)?;

    assert!(matches!(
        reader.reset_to(4),
        Err(ReaderError::InconsistentOffsets { page: 2, .. })
    ));
    assert_eq!(reader.current_index(), 5);
    assert_eq!(reader.offsets(), &offsets_before);

    reader.reset_to(0)?;
    assert_eq!(reader.read()?, Some(Tuple::from([1, 10])));
    Ok(())
}

#[test]
fn test_reset_after_page_rewritten() -> Result<(), ReaderError> {
    let file = two_page_file("reset_rewritten");
    let mut reader = BinaryTupleReader::open(&file.path)?;
    reader.read_batch(2)?;

    write_pages(&file.path, &[vec![vec![9, 9]], vec![vec![8, 8]]])?;

    assert!(matches!(
        reader.reset_to(1),
        Err(ReaderError::InconsistentOffsets { page: 1, .. })
    ));
    assert_eq!(reader.current_index(), 2);
    Ok(())
}

#[test]
fn test_failed_rewind_keeps_reading_forward() -> Result<(), ReaderError> {
    let file = two_page_file("reset_failed_forward");
    let mut reader = BinaryTupleReader::open(&file.path)?;
    reader.read_batch(2)?;

    // Page 1 shrinks from 3 tuples to 1, page 2 changes content
    write_pages(&file.path, &[vec![vec![9, 9]], vec![vec![8, 8]]])?;

    assert!(matches!(
        reader.reset_to(1),
        Err(ReaderError::InconsistentOffsets { page: 1, .. })
    ));
    assert_eq!(reader.offsets().as_slice(), &[0, 3]);
    // The buffered page is untouched and the store is still positioned after it
    assert_eq!(reader.read()?, Some(Tuple::from([3, 30])));
    assert_eq!(reader.read()?, Some(Tuple::from([8, 8])));
    assert_eq!(reader.current_index(), 4);
    Ok(())
}

#[test]
fn test_full_reset_matches_fresh_reader() -> Result<(), ReaderError> {
    let tuples = sequential_tuples(900, 5);
    let file = TempTupleFile::with_tuples("reset_full", &tuples);
    let mut fresh = BinaryTupleReader::open(&file.path)?;
    let expected = drain(&mut fresh)?;

    let mut reader = BinaryTupleReader::open(&file.path)?;
    reader.read_batch(450)?;
    reader.reset_to(10)?;
    reader.reset()?;
    assert_eq!(reader.current_index(), 0);
    assert_eq!(reader.pages_fetched(), 0);
    assert_eq!(drain(&mut reader)?, expected);

    // Also from the end-of-file state
    reader.reset()?;
    assert_eq!(drain(&mut reader)?, expected);
    Ok(())
}
