//! Fuzz target: config file parser
//!
//! Feeds arbitrary bytes as a config file and verifies:
//! - No panics, including on invalid UTF-8 and very long lines
//! - Paths never exceed `MAX_PATH_LEN` and never contain spaces
//! - Every warning points at a line that exists
//!
//! cargo fuzz run fuzz_config_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use plant_guardian::config::parser::parse;
use plant_guardian::config::{Configuration, MAX_PATH_LEN};

fuzz_target!(|data: &[u8]| {
    let Ok(report) = parse(data, Configuration::default()) else {
        return;
    };

    for path in [&report.config.log_file_path, &report.config.stat_file_path] {
        assert!(path.len() <= MAX_PATH_LEN);
        assert!(!path.contains(' '));
    }

    let lines = data.split(|&b| b == b'\n').count();
    for w in &report.warnings {
        assert!(w.line >= 1 && w.line <= lines);
    }
});
