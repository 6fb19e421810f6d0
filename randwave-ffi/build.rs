// Build script that tries to regenerate the C header with `cbindgen`.
// If `cbindgen` is not installed or fails, the checked-in
// `include/randwave.h` is copied to $OUT_DIR instead.
//
// Consumers can include the header from either:
//   - <repo>/randwave-ffi/include/randwave.h (checked-in)
//   - $OUT_DIR/randwave.h

use std::{env, fs, io, path::PathBuf, process::Command};

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/randwave.h");

    let var = |key: &str| {
        env::var(key).map(PathBuf::from).map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("{key}: {e}")))
    };
    let crate_dir = var("CARGO_MANIFEST_DIR")?;
    let out_dir = var("OUT_DIR")?;
    let header_repo = crate_dir.join("include").join("randwave.h");
    let header_out = out_dir.join("randwave.h");

    let generated = Command::new("cbindgen")
        .args(["--crate", "randwave-ffi", "--lang", "C", "--output"])
        .arg(&header_out)
        .current_dir(&crate_dir)
        .status()
        .map(|s| s.success())
        .unwrap_or(false);

    if generated {
        println!("cargo:warning=randwave-ffi: generated header with cbindgen -> {}", header_out.display());
        return Ok(());
    }

    fs::copy(&header_repo, &header_out)?;
    Ok(())
}
