fn main() {
    // Link directives for the build-time binding
    if std::env::var("CARGO_FEATURE_LINK").is_ok() {
        if let Ok(dir) = std::env::var("PWQUALITY_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
        }
        println!("cargo:rustc-link-lib=dylib=pwquality");
    }

    // Only generate C headers when ffi feature is enabled
    if std::env::var("CARGO_FEATURE_FFI").is_ok() {
        let crate_dir = match std::env::var("CARGO_MANIFEST_DIR") {
            Ok(dir) => dir,
            Err(_) => return,
        };
        let output_file = std::path::PathBuf::from(&crate_dir)
            .join("include")
            .join("pwquality_bridge.h");

        if let Some(parent) = output_file.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let mut config = match cbindgen::Config::from_file("cbindgen.toml") {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: cbindgen.toml unreadable: {}", e);
                cbindgen::Config::default()
            }
        };

        if config.sys_includes.is_empty() {
            config.sys_includes = vec!["stdint.h".to_string(), "stddef.h".to_string()];
        }

        let result = cbindgen::Builder::new()
            .with_crate(&crate_dir)
            .with_config(config)
            .generate();

        match result {
            Ok(bindings) => {
                let _ = bindings.write_to_file(&output_file);
            }
            Err(e) => {
                // Header generation must not fail the build
                eprintln!("Warning: cbindgen failed: {}", e);
            }
        }
    }

    println!("cargo:rerun-if-changed=src/ffi/");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=PWQUALITY_LIB_DIR");
}
