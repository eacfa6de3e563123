//! Whole-file TSV reading.

use crate::import::error::ImportError;
use std::fs;
use std::path::Path;

/// One data line of a TSV file with its 1-based line number in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvRow {
    pub line: usize,
    pub values: Vec<String>,
}

/// A header line plus at least one data row.
///
/// Lines that are empty or whitespace-only are dropped before the header is
/// chosen, so leading blank lines and a trailing newline are harmless.
#[derive(Debug, Clone)]
pub struct TsvDocument {
    header: Vec<String>,
    rows: Vec<TsvRow>,
}

impl TsvDocument {
    /// Read and split the file at `path`.
    pub fn read(path: &Path) -> Result<Self, ImportError> {
        let content = fs::read_to_string(path).map_err(|source| ImportError::FileNotReadable {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).ok_or_else(|| ImportError::EmptyOrHeaderOnlyFile {
            path: path.to_path_buf(),
        })
    }

    /// Split `content` into header and rows; `None` when fewer than two
    /// non-blank lines remain. A leading UTF-8 byte order mark is ignored.
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| TsvRow {
                line: index + 1,
                values: split_fields(line),
            });

        let header = lines.next()?.values;
        let rows: Vec<TsvRow> = lines.collect();
        if rows.is_empty() {
            return None;
        }

        Some(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[TsvRow] {
        &self.rows
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split('\t').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_skips_blank_lines_and_keeps_line_numbers() {
        let content = "title\tcity\n\nCozy\tParis\n   \nLoft\tHamburg\n";
        let document = TsvDocument::parse(content).expect("document");

        assert_eq!(document.header(), ["title", "city"]);
        assert_eq!(document.rows().len(), 2);
        assert_eq!(document.rows()[0].line, 3);
        assert_eq!(document.rows()[1].line, 5);
        assert_eq!(document.rows()[1].values, ["Loft", "Hamburg"]);
    }

    #[test]
    fn parse_accepts_crlf_line_endings() {
        let document = TsvDocument::parse("title\tcity\r\nCozy\tParis\r\n").expect("document");
        assert_eq!(document.header(), ["title", "city"]);
        assert_eq!(document.rows()[0].values, ["Cozy", "Paris"]);
    }

    #[test]
    fn parse_strips_byte_order_mark_from_header() {
        let document = TsvDocument::parse("\u{feff}title\tcity\nCozy\tParis\n").expect("document");
        assert_eq!(document.header(), ["title", "city"]);
        assert_eq!(document.rows()[0].line, 2);
    }

    #[test]
    fn parse_rejects_header_only_content() {
        assert!(TsvDocument::parse("title\tcity\n").is_none());
        assert!(TsvDocument::parse("\n\n").is_none());
        assert!(TsvDocument::parse("").is_none());
    }

    #[test]
    fn read_reports_header_only_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "title\tcity").expect("write header");

        let err = TsvDocument::read(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::EmptyOrHeaderOnlyFile { .. }));
    }

    #[test]
    fn read_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = TsvDocument::read(&dir.path().join("missing.tsv")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotReadable { .. }));
    }
}
