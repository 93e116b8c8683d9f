#![no_main]

use avl_tree::model::DrainInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: DrainInput| {
    avl_tree::model::run_drain(input.values, input.removals);
});
