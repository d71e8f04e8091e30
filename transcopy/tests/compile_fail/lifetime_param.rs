//! Test: copies must own their data, so borrowed fields are rejected.

use transcopy::DeepCopy;

#[derive(DeepCopy)]
struct View<'a> {
    text: &'a str,
}

fn main() {}
