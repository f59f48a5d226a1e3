//! `dlc key` – show the transfer key a URL resolves to.

use anyhow::Result;
use dlc_core::{Destination, TransferKey};
use std::path::PathBuf;

pub fn run_key(url: &str, dir: PathBuf, name: Option<String>) -> Result<i32> {
    let mut dest = Destination::new(dir);
    dest.file_name = name;
    let key = TransferKey::derive(url, &dest)?;
    println!("{}", key);
    Ok(0)
}
