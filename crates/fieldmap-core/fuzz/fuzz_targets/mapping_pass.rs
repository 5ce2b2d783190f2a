//! Fuzzing target for configuration compilation and mapping passes
//!
//! The first byte splits the input into a configuration and a document.
//! Compilation may fail, but a compiled configuration must run over any
//! document and keep the coverage counts consistent.

#![no_main]

use fieldmap_core::{compile, run, MapOptions};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let split = (data[0] as usize) % data.len();
    let (config_bytes, doc_bytes) = data[1..].split_at(split.min(data.len() - 1));

    let Ok(config) = serde_json::from_slice::<Value>(config_bytes) else {
        return;
    };
    let Ok(compiled) = compile(&config) else {
        return;
    };
    let doc = serde_json::from_slice::<Value>(doc_bytes).unwrap_or(Value::Null);

    for dry_run in [true, false] {
        let pass = run(&compiled, &doc, "fuzz", MapOptions::default().dry_run(dry_run));
        let coverage = &pass.report.coverage;
        assert_eq!(coverage.applied + coverage.skipped, coverage.total_mappings);
        assert_eq!(coverage.total_mappings, pass.report.mappings.len());
        if dry_run {
            assert!(pass.target.is_empty());
        }
    }
});
