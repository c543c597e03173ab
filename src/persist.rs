//! Atomic replacement of config files on disk.

use crate::error::PersistError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Write `text` to `final_path` by staging a temp file inside `dir` and
/// renaming it over the destination.
///
/// The temp file is created in `dir` so the rename never crosses a
/// filesystem boundary. Readers of `final_path` see either the complete old
/// content or the complete new content. When the rename still fails, a
/// plain copy over the destination keeps the replace semantics without the
/// atomicity guarantee, mirroring platforms that lack atomic rename.
pub fn persist(dir: &Path, final_path: &Path, text: &str) -> Result<(), PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let stem = final_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("config");
    let mut staged = tempfile::Builder::new()
        .prefix(&format!("{stem}_"))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|source| PersistError::Stage {
            dir: dir.to_path_buf(),
            source,
        })?;

    staged
        .write_all(text.as_bytes())
        .and_then(|_| staged.flush())
        .map_err(|source| PersistError::Stage {
            dir: dir.to_path_buf(),
            source,
        })?;

    match staged.persist(final_path) {
        Ok(_) => Ok(()),
        Err(error) => {
            debug!(
                path = %final_path.display(),
                error = %error.error,
                "atomic rename failed, copying instead"
            );
            let staged = error.file;
            fs::copy(staged.path(), final_path)
                .map(|_| ())
                .map_err(|source| PersistError::Replace {
                    path: final_path.to_path_buf(),
                    source,
                })
        }
    }
}
