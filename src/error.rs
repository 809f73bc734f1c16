//! Fatal errors of the decoder. Every other problem found in the input is recovered from and
//! logged.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Could not read `{}`: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not write `{}`: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    pub(crate) fn read<P: Into<PathBuf>>(path: P) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| DecodeError::Read { path, source }
    }

    pub(crate) fn write<P: Into<PathBuf>>(path: P) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| DecodeError::Write { path, source }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let error = DecodeError::read("in.txt")(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(error.to_string(), "Could not read `in.txt`: gone");
        let error = DecodeError::write("out/PMID-1.a2")(io::Error::other("full"));
        assert!(error.to_string().starts_with("Could not write `out/PMID-1.a2`"));
    }
}
