//! Persisting the trainable parameters of a forecaster as json

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use forecaster::StateDict;

use crate::Result;

/// Name of the checkpoint inside its directory
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Write `state` to `dir/checkpoint.json`, creating `dir` if needed
pub fn save<P: AsRef<Path>>(state: &StateDict, dir: P) -> Result<PathBuf> {
    fs::create_dir_all(&dir)?;
    let path = dir.as_ref().join(CHECKPOINT_FILE);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, state)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    debug!("saved {} layers to {}", state.len(), path.display());

    Ok(path)
}

/// Read the state written by [`save`] from `dir`
pub fn load<P: AsRef<Path>>(dir: P) -> Result<StateDict> {
    let file = File::open(dir.as_ref().join(CHECKPOINT_FILE))?;
    let state = serde_json::from_reader(BufReader::new(file))?;

    Ok(state)
}
