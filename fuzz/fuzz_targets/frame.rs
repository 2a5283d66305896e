#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use xfer_channel::frame::{read_handshake, read_record};

fuzz_target!(|data: &[u8]| {
    // Frame readers must never panic on arbitrary input.
    let _ = read_handshake(&mut Cursor::new(data));
    let _ = read_record(&mut Cursor::new(data));
});
