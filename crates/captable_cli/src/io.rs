//! JSON file plumbing shared by the commands.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reads and deserializes a JSON input file.
pub fn read_json<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let contents = fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading input file '{}'", path))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing JSON from '{}'", path))
}

/// Serializes a value as pretty JSON to a file, or stdout when no path
/// is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&str>) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serializing output")?;
    match output {
        Some(path) => fs::write(Path::new(path), rendered)
            .with_context(|| format!("writing output file '{}'", path))?,
        None => println!("{}", rendered),
    }
    Ok(())
}
