use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::Path,
};

use crate::{
    document::model::{SourceDeck, TemplateCatalog},
    document::output::OutputDocument,
    foundation::error::{DeckError, DeckResult},
};

/// Load and validate a source deck from a JSON file.
pub fn load_deck(path: impl AsRef<Path>) -> DeckResult<SourceDeck> {
    let path = path.as_ref();
    let deck: SourceDeck = read_json(path)?;
    deck.validate().map_err(|e| DeckError::load(path, e.to_string()))?;
    tracing::debug!(path = %path.display(), items = deck.items.len(), "loaded deck");
    Ok(deck)
}

/// Load and validate a template catalog from a JSON file.
pub fn load_template(path: impl AsRef<Path>) -> DeckResult<TemplateCatalog> {
    let path = path.as_ref();
    let catalog: TemplateCatalog = read_json(path)?;
    catalog
        .validate()
        .map_err(|e| DeckError::load(path, e.to_string()))?;
    tracing::debug!(path = %path.display(), layouts = catalog.len(), "loaded template");
    Ok(catalog)
}

/// Serialize the output document to `path`, creating parent directories as needed.
pub fn save_output(doc: &OutputDocument, path: impl AsRef<Path>) -> DeckResult<()> {
    write_json(doc, path.as_ref())
}

/// Pretty-print any serializable value to `path`.
pub fn write_json<T: serde::Serialize + ?Sized>(value: &T, path: &Path) -> DeckResult<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).map_err(|e| DeckError::io(path, e))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value)
        .map_err(|e| DeckError::io(path, std::io::Error::other(e)))?;
    w.write_all(b"\n").map_err(|e| DeckError::io(path, e))?;
    w.flush().map_err(|e| DeckError::io(path, e))
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> DeckResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| DeckError::io(parent, e))?;
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> DeckResult<T> {
    let f = File::open(path).map_err(|e| DeckError::load(path, format!("open: {e}")))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| DeckError::load(path, format!("parse JSON: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/document/store.rs"]
mod tests;
