//! `dlc exists` – is a finished download already on disk?

use anyhow::Result;
use dlc_core::key;
use dlc_core::Destination;
use std::path::PathBuf;

pub fn run_exists(url: &str, dir: PathBuf, name: Option<String>) -> Result<i32> {
    let mut dest = Destination::new(dir);
    dest.file_name = name;
    if key::exists(url, &dest) {
        println!("yes");
        Ok(0)
    } else {
        println!("no");
        Ok(1)
    }
}
