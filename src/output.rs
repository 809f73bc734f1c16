//! Writing of the decoded documents as `<doc_id>.a2` files.
use crate::decode::DecodedDocument;
use crate::error::DecodeError;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const A2_EXTENSION: &str = "a2";

/// Writes one `.a2` file per document in `dir`, creating it if needed. Each file is written to
/// a temporary file first and then renamed, so a reader never sees a partial annotation.
pub fn write_a2_files<P: AsRef<Path>>(
    documents: &[DecodedDocument],
    dir: P,
) -> Result<Vec<PathBuf>, DecodeError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(DecodeError::write(dir))?;
    let mut written = Vec::with_capacity(documents.len());
    for document in documents {
        let path = dir.join(format!("{}.{}", document.id, A2_EXTENSION));
        let mut file = NamedTempFile::new_in(dir).map_err(DecodeError::write(&path))?;
        document
            .write_a2(BufWriter::new(file.as_file_mut()))
            .map_err(DecodeError::write(&path))?;
        file.persist(&path)
            .map_err(|e| DecodeError::write(&path)(e.error))?;
        debug!(path = %path.display(), events = document.events.len(), "Annotation written");
        written.push(path);
    }
    Ok(written)
}
