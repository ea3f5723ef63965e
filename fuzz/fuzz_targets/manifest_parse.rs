#![no_main]

use libfuzzer_sys::fuzz_target;
use fragrs::Manifest;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Anything that parses must re-serialize to an equal, still-valid manifest
    if let Ok(manifest) = Manifest::from_json(text) {
        assert!(manifest.validate().is_ok());
        for desc in &manifest.fragments {
            assert!(!desc.filename.contains('/'));
            assert_ne!(desc.filename, "..");
        }

        let json = manifest.to_json().unwrap();
        let again = Manifest::from_json(&json).unwrap();
        assert_eq!(manifest, again);
    }
});
