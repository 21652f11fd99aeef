use thiserror::Error;

/// Boxed error produced by user-supplied loaders, compilers and peer caches.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DeclarativeError {
    /// Misuse of the public API, e.g. clearing without an identifier.
    #[error("{0}")]
    Generic(String),

    /// Raised deliberately by custom loaders to signal a template problem.
    #[error("Template error: {0}")]
    Template(String),

    #[error(
        "An error occurred while compiling the template. {source}\n\nTemplate markup:\n{markup}"
    )]
    Compiler {
        markup: String,
        #[source]
        source: BoxError,
    },

    /// Invalid loader/compiler configuration or plugin registration.
    #[error("Customization error: {0}")]
    Customization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The error taxonomy, without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Generic,
    Template,
    Compiler,
    Customization,
    Io,
    Serialization,
}

impl DeclarativeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeclarativeError::Generic(_) => ErrorKind::Generic,
            DeclarativeError::Template(_) => ErrorKind::Template,
            DeclarativeError::Compiler { .. } => ErrorKind::Compiler,
            DeclarativeError::Customization(_) => ErrorKind::Customization,
            DeclarativeError::Io(_) => ErrorKind::Io,
            DeclarativeError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        DeclarativeError::Template(message.into())
    }

    pub fn customization(message: impl Into<String>) -> Self {
        DeclarativeError::Customization(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DeclarativeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn compiler_error_mentions_markup_and_cause() {
        let err = DeclarativeError::Compiler {
            markup: "<p>{{ x</p>".to_string(),
            source: "boom".into(),
        };
        let message = err.to_string();
        assert!(message.contains("An error occurred while compiling the template"));
        assert!(message.contains("boom"));
        assert!(message.contains("<p>{{ x</p>"));
        assert_eq!(err.source().unwrap().to_string(), "boom");
        assert_eq!(err.kind(), ErrorKind::Compiler);
    }

    #[test]
    fn kinds_match_variants() {
        assert_eq!(
            DeclarativeError::Generic("x".into()).kind(),
            ErrorKind::Generic
        );
        assert_eq!(DeclarativeError::template("x").kind(), ErrorKind::Template);
        assert_eq!(
            DeclarativeError::customization("x").kind(),
            ErrorKind::Customization
        );
    }
}
