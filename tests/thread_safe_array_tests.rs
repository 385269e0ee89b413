//! Integration tests for arrays shared across threads.
//!
//! With the `arc` feature enabled, arrays are `Send + Sync` and every
//! version can be read and extended from several threads at once.

#![cfg(feature = "arc")]

use rstest::rstest;
use static_assertions::assert_impl_all;
use std::sync::Arc;
use std::thread;
use xqarray::prelude::*;

assert_impl_all!(Array<i32>: Send, Sync);
assert_impl_all!(ArrayBuilder<String>: Send, Sync);

#[rstest]
fn test_array_cross_thread_structural_sharing() {
    let original: Arc<Array<usize>> = Arc::new((0..1000).collect());

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let array = Arc::clone(&original);
            thread::spawn(move || {
                let updated = array.put(index * 100, usize::MAX).unwrap().snoc(index);
                assert_eq!(updated.len(), 1001);
                assert_eq!(array.len(), 1000);
                updated
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .collect();

    for (index, array) in results.iter().enumerate() {
        array.check_invariants();
        assert_eq!(array.get(index * 100), Ok(&usize::MAX));
        assert_eq!(array.last(), Ok(&index));
    }
    assert!(original.iter().copied().eq(0..1000));
}

#[rstest]
fn test_array_moved_into_threads_and_concatenated() {
    let handles: Vec<_> = (0..8)
        .map(|chunk| {
            thread::spawn(move || {
                let start = chunk * 250;
                (start..start + 250).fold(Array::new(), |array, member| array.snoc(member))
            })
        })
        .collect();

    let joined = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .fold(Array::new(), |array, part| array.concat(&part));

    joined.check_invariants();
    assert!(joined.iter().copied().eq(0..2000));
}

#[rstest]
fn test_concurrent_readers_of_one_version() {
    let shared = Arc::new((0..5000_u64).collect::<Array<_>>());

    let handles: Vec<_> = (0..4)
        .map(|reader| {
            let array = Arc::clone(&shared);
            thread::spawn(move || {
                let slice = array.sub_array(reader * 1000, 1000).unwrap();
                slice.iter().sum::<u64>()
            })
        })
        .collect();

    for (reader, handle) in handles.into_iter().enumerate() {
        let start = u64::try_from(reader).unwrap() * 1000;
        assert_eq!(handle.join().expect("Thread panicked"), (start..start + 1000).sum());
    }
}
