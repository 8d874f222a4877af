use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Load .env (if present) into compile-time env so option_env! picks it up
    let env_file = Path::new(".env");

    if env_file.exists() {
        println!("cargo:rerun-if-changed=.env");

        if let Ok(contents) = fs::read_to_string(env_file) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"');

                    // Real environment wins over .env
                    if env::var(key).is_err() && !value.is_empty() {
                        println!("cargo:rustc-env={}={}", key, value);
                    }
                }
            }
        }
    } else {
        println!("cargo:warning=No .env file found. Firebase and Google Maps keys will be empty. Copy .env.example to .env to configure them.");
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.env.example");
}
