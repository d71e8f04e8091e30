//! Test: misspelled field options are reported instead of ignored.

use transcopy::DeepCopy;

#[derive(DeepCopy)]
struct Login {
    #[deep_copy(hidden)]
    password: String,
}

fn main() {}
