use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// `target/<profile>`, where the backend binary lands
fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR")?);
    let profile = env::var("PROFILE").ok()?;
    out_dir
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}

fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    // config.toml is read from next to the executable at startup
    let source_config = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.toml");
    if !source_config.exists() {
        return;
    }

    match profile_dir() {
        Some(dir) => {
            let dest_config = dir.join("config.toml");
            if let Err(e) = fs::copy(&source_config, &dest_config) {
                println!("cargo:warning=Failed to copy config.toml: {}", e);
            }
        }
        None => println!("cargo:warning=Target profile directory not found, config.toml not copied"),
    }
}
