//! A `Slice` views its source's storage without copying it.

mod common;

use std::cell::Cell;

use common::Sample;
use stratum::{Slice, Vec};

#[test]
fn test_slice_matches_vec() {
    let v: Vec<i64> = (0..20).map(|i| i * i).collect();
    let view = Slice::from_vec(&v);

    assert_eq!(view.len(), v.len());
    for i in 0..v.len() {
        assert_eq!(view[i], v[i]);
        assert!(std::ptr::eq(&view[i], &v[i]));
    }
}

#[test]
fn test_slice_observes_in_place_mutation() {
    let v: Vec<Cell<i32>> = Vec::from_array([Cell::new(1), Cell::new(2), Cell::new(3)]);
    let view = Slice::from_vec(&v);

    v[0].set(10);
    v[2].set(30);

    let seen: std::vec::Vec<i32> = view.iter().map(Cell::get).collect();
    assert_eq!(seen, [10, 2, 30]);
    assert_eq!(view.data(), v.data());
}

#[test]
fn test_slice_of_records_as_bytes_free_view() {
    let records = [
        Sample {
            first: 1,
            second: 1.0,
        },
        Sample {
            first: 2,
            second: 2.0,
        },
    ];
    let view = Slice::from_array(&records);
    assert_eq!(view.bytes(), size_of::<[Sample; 2]>());
    assert_eq!(view.back().first, 2);

    let copy = view;
    assert_eq!(copy, view);
}

#[test]
fn test_raw_parts_view() {
    let v: Vec<u16> = Vec::from_array([7, 8, 9, 10]);
    // SAFETY: the pointer and length describe live elements of `v`, which
    // outlives the view.
    let tail = unsafe { Slice::from_raw_parts(v.data().add(1), 3) };
    assert_eq!(tail.as_std(), &[8, 9, 10]);
    assert_eq!(tail.to_bytes().len(), 6);
}
