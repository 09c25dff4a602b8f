#![no_main]
use libfuzzer_sys::fuzz_target;
use tinct::Level;

fuzz_target!(|data: &str| {
    // Must not panic on any input
    let _ = data.parse::<Level>();
});
