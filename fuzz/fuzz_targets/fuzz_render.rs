#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io;
use tinct::{Attr, ConsoleHandler, Level, Options, Record};

fuzz_target!(|data: &str| {
    // Must not panic on any message, key, or value, including control
    // characters and raw escape sequences
    let handler = ConsoleHandler::new(io::sink(), Options::new());
    let record = Record::now(Level::INFO, data)
        .with_attr(Attr::new(data, data))
        .with_attr(Attr::group(data, vec![Attr::new("k", data)]));
    let _ = handler.handle(&record);

    let plain = ConsoleHandler::new(io::sink(), Options::new().no_color(true));
    let _ = plain.handle(&Record::now(Level::ERROR, data).with_attr(Attr::new("k", data)));
});
