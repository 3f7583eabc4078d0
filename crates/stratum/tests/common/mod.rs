// Common test utilities for integration tests
//
// Shared fixtures: reflected sample types and a drop-counting element.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use stratum::{reflect_enum, reflect_record};

/// Two-field record used by the reflection tests.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sample {
    pub first: i32,
    pub second: f32,
}

reflect_record! {
    Sample { first: i32, second: f32 }
}

/// Record nesting another record, an array and an enum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub origin: Sample,
    pub color: Color,
    pub extent: [u16; 3],
}

reflect_record! {
    Shape { origin: Sample, color: Color, extent: [u16; 3] }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Red = 1,
    Green = 2,
    Blue = 4,
}

reflect_enum! {
    Color: u8, default Green { Red, Green, Blue }
}

/// Element that counts how many times it was dropped.
#[derive(Debug, Clone)]
pub struct Tracked {
    pub id: usize,
    drops: Rc<Cell<usize>>,
}

impl Tracked {
    pub fn new(id: usize, drops: &Rc<Cell<usize>>) -> Self {
        Tracked {
            id,
            drops: Rc::clone(drops),
        }
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// A fresh drop counter.
pub fn drop_counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}
