//! Test: a skipped field is never copied, so it cannot also be read-only.

use transcopy::DeepCopy;

#[derive(DeepCopy)]
struct Job {
    #[deep_copy(skip, read_only)]
    name: String,
}

fn main() {}
