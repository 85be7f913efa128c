use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid deploy tag '{0}': expected <prefix><delimiter><version>")]
    TagInvalid(String),

    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Install failed for {name}: {message}")]
    Install { name: String, message: String },

    #[error("Git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn install(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Install {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Validation { .. } => "VALIDATION_ERROR",
            Error::TagInvalid(_) => "TAG_INVALID",
            Error::Download { .. } => "DOWNLOAD_FAILED",
            Error::ChecksumMismatch { .. } => "CHECKSUM_MISMATCH",
            Error::Install { .. } => "INSTALL_FAILED",
            Error::Git(_) => "GIT_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Other(_) => "ERROR",
        }
    }

    /// Process exit code grouping: configuration and input validation
    /// problems exit 2, external tool and provisioning failures exit 20,
    /// everything internal exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Validation { .. } | Error::TagInvalid(_) => 2,

            Error::Download { .. }
            | Error::ChecksumMismatch { .. }
            | Error::Install { .. }
            | Error::Git(_) => 20,

            Error::Io(_) | Error::Json(_) | Error::Other(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::Config("x".into()).code(), "CONFIG_ERROR");
        assert_eq!(Error::TagInvalid("deploy".into()).code(), "TAG_INVALID");
        assert_eq!(
            Error::install("pkg", "no such package").code(),
            "INSTALL_FAILED"
        );
    }

    #[test]
    fn exit_codes_group_by_class() {
        assert_eq!(Error::validation("tag", "empty").exit_code(), 2);
        assert_eq!(
            Error::Download {
                url: "http://example.invalid/x".into(),
                message: "timeout".into(),
            }
            .exit_code(),
            20
        );
        assert_eq!(Error::Other("boom".into()).exit_code(), 1);
    }
}
