use anyhow::Result;
use std::path::PathBuf;

use lanshelf::infrastructure::config::ConfigStore;

pub fn execute(config: Option<PathBuf>) -> Result<()> {
    let path = match config {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };

    let store = ConfigStore::new(path);
    if store.path().exists() {
        println!("{}", store.path().display());
    } else {
        println!("{} (not found, using defaults)", store.path().display());
    }
    Ok(())
}
