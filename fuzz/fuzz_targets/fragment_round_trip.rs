#![no_main]

use libfuzzer_sys::fuzz_target;
use fragrs::{FragmentConfig, Fragmenter, StreamHasher, defragment};

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (chunk, data) = input;
    let chunk_size = u64::from(chunk.max(1));

    let dir = tempfile::tempdir().unwrap();
    let config = FragmentConfig::new(chunk_size).unwrap();
    let manifest = Fragmenter::new(dir.path(), config)
        .unwrap()
        .fragment(&data[..])
        .unwrap();

    // Verify: fragment count and whole-stream digest
    assert_eq!(manifest.len() as u64, (data.len() as u64).div_ceil(chunk_size));
    assert_eq!(manifest.hash, StreamHasher::digest(&data));

    // Verify: reassembly reproduces the input
    let mut out = Vec::new();
    defragment(&manifest, dir.path(), &mut out).unwrap();
    assert_eq!(out, data);
});
