//! Bounded-timeout downloads for toolchain provisioning.

use std::fs;
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

fn download_error(url: &str, message: impl Into<String>) -> Error {
    Error::Download {
        url: url.to_string(),
        message: message.into(),
    }
}

/// Fetch a URL to a local file within the given timeout.
///
/// When `expected_sha256` is set, the downloaded bytes are verified
/// before the file is written; a mismatch leaves nothing on disk.
pub fn download(
    url: &str,
    dest: &Path,
    timeout_secs: u64,
    expected_sha256: Option<&str>,
) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| download_error(url, e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| download_error(url, e.to_string()))?;

    if !response.status().is_success() {
        return Err(download_error(
            url,
            format!("HTTP {}", response.status().as_u16()),
        ));
    }

    let bytes = response
        .bytes()
        .map_err(|e| download_error(url, e.to_string()))?;

    if let Some(expected) = expected_sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(Error::ChecksumMismatch {
                name: dest
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| url.to_string()),
                expected: expected.to_string(),
                actual,
            });
        }
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, &bytes)?;
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        // sha256("abc")
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_hex_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
