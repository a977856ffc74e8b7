// src/utils.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Title-case a phrase: first letter of every word (and of every part after
/// `-`, `/` or `(`) upper, the rest lower. Short all-caps tokens such as
/// `NCR` or `PA` are kept as written.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() && letters.len() <= 3 && letters.iter().all(|c| c.is_uppercase()) {
        return word.to_string();
    }

    let mut out = String::with_capacity(word.len());
    let mut capitalize_next = true;
    for c in word.chars() {
        if capitalize_next && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.extend(c.to_lowercase());
        }
        if matches!(c, '-' | '/' | '(') {
            capitalize_next = true;
        }
    }
    out
}

/// A link is never a location or a company name.
pub fn looks_like_url(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return false;
    }
    if lowered.starts_with("http://")
        || lowered.starts_with("https://")
        || lowered.starts_with("www.")
        || lowered.contains("://")
    {
        return true;
    }

    // bare `forms.gle/abc` / `bit.ly/xyz` style links
    match lowered.split_once('/') {
        Some((host, _)) => {
            !host.contains(char::is_whitespace)
                && host.contains('.')
                && host.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

/// Collapse runs of whitespace (including newlines) to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase alphanumeric form used for loose name comparison.
pub fn compact_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// First `max_chars` characters of `text` on a single line.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Largest char boundary at or below `index`.
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary at or above `index`.
pub fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Resolve a relative path against the current working directory
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

/// Ensure directory exists
pub async fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read file content as string with proper error context
pub async fn read_file_content(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Write file content, creating the parent directory if needed
pub async fn write_file_content(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent).await?;
        }
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Check if file exists and is readable
pub async fn file_accessible(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("navi mumbai"), "Navi Mumbai");
        assert_eq!(title_case("on-site"), "On-Site");
        assert_eq!(title_case("WORK FROM HOME"), "Work From Home");
        assert_eq!(title_case("Erie, PA"), "Erie, PA");
        assert_eq!(title_case("noida sector-63"), "Noida Sector-63");
    }

    #[test]
    fn test_looks_like_url() {
        assert!(looks_like_url("https://forms.gle/abc123"));
        assert!(looks_like_url("www.example.com"));
        assert!(looks_like_url("forms.gle/abc123"));
        assert!(!looks_like_url("Remote/On-site"));
        assert!(!looks_like_url("Noida, Sector 62"));
        assert!(!looks_like_url(""));
    }

    #[test]
    fn test_compact_key() {
        assert_eq!(compact_key("Tech Mahindra"), "techmahindra");
        assert_eq!(compact_key("sonata-software"), "sonatasoftware");
    }

    #[test]
    fn test_snippet_flattens_lines() {
        assert_eq!(snippet("a\nb\r\nc", 4), "a b ");
        assert_eq!(snippet("📍 Noida", 2), "📍 ");
    }

    #[test]
    fn test_char_boundaries() {
        let text = "a📍b";
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(ceil_char_boundary(text, 2), 5);
        assert_eq!(floor_char_boundary(text, 100), text.len());
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(
            get_file_extension(Path::new("config.TOML")),
            Some("toml".to_string())
        );
        assert_eq!(get_file_extension(Path::new("noext")), None);
    }
}
