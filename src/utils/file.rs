use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Reads a whole file into a string
pub fn file_get(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Serializes a value as JSON with 4-space indentation.
///
/// Non-ASCII text (country names, remarks) is written as UTF-8, not escaped.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Overwrites `path` with `content`, creating the parent directory if needed.
///
/// This is a plain overwrite: a crash mid-write can leave a truncated file.
pub fn file_write(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)
}

/// Lists files in `dir` whose name starts with `prefix` and ends with `suffix`.
///
/// A missing directory yields an empty list.
pub fn list_files_with(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut matched = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(prefix) && name.ends_with(suffix) {
            matched.push(entry.path());
        }
    }
    matched.sort();
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_json_indent_and_utf8() {
        let out = to_pretty_json(&json!({"outbounds": [{"tag": "日本"}]})).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\n    \"outbounds\""));
        assert!(text.contains("日本"));
    }

    #[test]
    fn test_list_files_with() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("20_outbounds_jp.json"), "{}").unwrap();
        fs::write(dir.path().join("20_outbounds_us.json"), "{}").unwrap();
        fs::write(dir.path().join("30_outbounds_selectors.json"), "{}").unwrap();
        fs::write(dir.path().join("20_outbounds_hk.txt"), "").unwrap();

        let files = list_files_with(dir.path(), "20_outbounds_", ".json").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("20_outbounds_jp.json"));

        let missing = list_files_with(&dir.path().join("nope"), "20_", ".json").unwrap();
        assert!(missing.is_empty());
    }
}
