//! `dlc checksum` – SHA-256 of a file.

use anyhow::Result;
use dlc_core::checksum;
use std::path::Path;

/// Print the digest; with `expect`, also compare and return exit code 1 on mismatch.
pub fn run_checksum(path: &Path, expect: Option<&str>) -> Result<i32> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    match expect {
        Some(expected) if !checksum::digest_matches(&digest, expected) => {
            eprintln!("checksum mismatch: expected {}", expected.trim());
            Ok(1)
        }
        _ => Ok(0),
    }
}
