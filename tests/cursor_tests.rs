//! Integration tests for `ArrayCursor`.

use rstest::rstest;
use xqarray::prelude::*;

fn array(size: usize) -> Array<usize> {
    (0..size).collect()
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(7)]
#[case(100)]
#[case(10_000)]
fn test_iterator_from_start_visits_everything(#[case] size: usize) {
    let array = array(size);
    let cursor = array.iterator(0).unwrap();
    assert_eq!(cursor.len(), size);
    assert!(cursor.copied().eq(0..size));
}

#[rstest]
fn test_list_iterator_protocol() {
    let array = array(3);
    let mut cursor = array.iter();

    assert!(cursor.has_next());
    assert!(!cursor.has_previous());
    assert_eq!(cursor.next_index(), 0);
    assert_eq!(cursor.previous_index(), None);

    assert_eq!(cursor.next(), Some(&0));
    assert_eq!(cursor.next(), Some(&1));
    assert_eq!(cursor.next(), Some(&2));
    assert!(!cursor.has_next());
    assert_eq!(cursor.next(), None);
    assert_eq!(cursor.next_index(), 3);
    assert_eq!(cursor.previous_index(), Some(2));

    assert_eq!(cursor.previous(), Some(&2));
    assert_eq!(cursor.next(), Some(&2));
    assert_eq!(cursor.previous(), Some(&2));
    assert_eq!(cursor.previous(), Some(&1));
    assert_eq!(cursor.previous(), Some(&0));
    assert_eq!(cursor.previous(), None);
    assert!(!cursor.has_previous());
}

#[rstest]
fn test_start_past_the_end_is_rejected() {
    let array = array(10);
    assert!(array.iterator(10).is_ok());
    assert_eq!(
        array.iterator(11).map(|cursor| cursor.len()),
        Err(ArrayError::OutOfRange { index: 11, size: 10 })
    );
}

#[rstest]
fn test_cursor_over_concatenated_and_sliced_arrays() {
    let joined = (0..50).fold(Array::new(), |array, chunk: usize| {
        array.concat(&(chunk * 37..chunk * 37 + 37).collect())
    });
    let slice = joined.sub_array(123, 1500).unwrap();
    let mut cursor = slice.iterator(750).unwrap();
    for expected in (123..873).rev() {
        assert_eq!(cursor.previous(), Some(&expected));
    }
    assert!(cursor.copied().eq(123..1623));
}

#[rstest]
fn test_cursors_run_concurrently_over_one_version() {
    let array = array(5000);
    let mut forward = array.iter();
    let mut backward = array.iterator(5000).unwrap();
    for step in 0..5000 {
        assert_eq!(forward.next(), Some(&step));
        assert_eq!(backward.previous(), Some(&(4999 - step)));
    }
}

#[rstest]
fn test_for_loop_over_reference() {
    let array = array(64);
    let mut total = 0;
    for member in &array {
        total += member;
    }
    assert_eq!(total, (0..64).sum::<usize>());
}
