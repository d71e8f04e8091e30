//! Test: unions have no safe field-by-field copy.

use transcopy::DeepCopy;

#[derive(DeepCopy)]
union Bits {
    int: u32,
    float: f32,
}

fn main() {}
