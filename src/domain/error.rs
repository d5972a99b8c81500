// Engine error type. Structural gaps inside a tree are skipped, not raised;
// errors here are the host-facing failures an operation cannot work around.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported source file {path}")]
    UnsupportedGrammar { path: PathBuf },

    #[error("unknown logging framework {0:?}")]
    UnknownFramework(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offender() {
        let err = EngineError::UnsupportedGrammar {
            path: PathBuf::from("src/main.rs"),
        };
        assert_eq!(err.to_string(), "unsupported source file src/main.rs");
        let err = EngineError::UnknownFramework("log4j".to_string());
        assert_eq!(err.to_string(), "unknown logging framework \"log4j\"");
    }
}
