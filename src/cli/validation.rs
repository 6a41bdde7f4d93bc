//! Value parsers for CLI arguments
//!
//! Each parser returns a message clap prints verbatim.

use std::fs;
use std::path::PathBuf;

use crate::composer::{DateConstraint, FacetTag, MAX_PAGE_SIZE};

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

pub fn validate_page(page_str: &str) -> Result<u32, String> {
    let page: u32 = page_str
        .parse()
        .map_err(|_| format!("Page must be a positive number, got: '{}'", page_str))?;

    if page == 0 {
        return Err("Page numbers start at 1".to_string());
    }
    Ok(page)
}

pub fn validate_page_size(size_str: &str) -> Result<u32, String> {
    let size: u32 = size_str
        .parse()
        .map_err(|_| format!("Page size must be a positive number, got: '{}'", size_str))?;

    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(format!(
            "Page size must be between 1 and {}, got: {}",
            MAX_PAGE_SIZE, size
        ));
    }
    Ok(size)
}

/// Absolute http(s) URL with a host
pub fn validate_base_url(url_str: &str) -> Result<String, String> {
    let trimmed = url_str.trim();
    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| format!("Invalid base URL '{}': {}", url_str, e))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "Base URL must use http or https, got scheme '{}'",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err(format!("Base URL '{}' has no host", url_str));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

pub fn parse_facet(tag_str: &str) -> Result<FacetTag, String> {
    tag_str.parse().map_err(|e: crate::error::AppError| e.to_string())
}

pub fn parse_date(date_str: &str) -> Result<DateConstraint, String> {
    date_str.parse().map_err(|e: crate::error::AppError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[composer]").unwrap();
        let path = file.path().to_str().unwrap();
        assert!(validate_config_file_path(path).is_ok());

        assert!(validate_config_file_path("/definitely/not/here.toml").is_err());
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_page_validation() {
        for valid in ["1", "2", "999"] {
            assert!(validate_page(valid).is_ok(), "Page {} should be valid", valid);
        }
        for invalid in ["0", "-1", "abc", ""] {
            assert!(validate_page(invalid).is_err(), "Page '{}' should be invalid", invalid);
        }
    }

    #[test]
    fn test_page_size_validation() {
        for valid in ["1", "10", "100"] {
            assert!(validate_page_size(valid).is_ok(), "Size {} should be valid", valid);
        }
        for invalid in ["0", "101", "abc"] {
            assert!(validate_page_size(invalid).is_err(), "Size '{}' should be invalid", invalid);
        }
    }

    #[test]
    fn test_base_url_validation() {
        assert_eq!(
            validate_base_url("https://admin.example.org/").unwrap(),
            "https://admin.example.org"
        );
        assert!(validate_base_url("http://127.0.0.1:8000").is_ok());

        for invalid in ["", "admin.example.org", "ftp://example.org", "not a url"] {
            assert!(validate_base_url(invalid).is_err(), "URL '{}' should be invalid", invalid);
        }
    }

    #[test]
    fn test_facet_and_date_parsers() {
        assert_eq!(parse_facet("Verified").unwrap(), FacetTag::Verified);
        assert!(parse_facet("deleted").is_err());

        assert_eq!(parse_date("today").unwrap(), DateConstraint::Today);
        assert!(parse_date("15/06/2024").is_err());
    }
}
