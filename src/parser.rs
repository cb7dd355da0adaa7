use crate::error::ParseError;
use crate::record::{NodeRecord, PathQuery, TreeInput};
use crate::traits::InputReader;
use anyhow::{Context, Result};
use brotli::Decompressor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::str::FromStr;

/// On-disk layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Pick from the file extension
    #[default]
    Auto,
    /// Whitespace separated counts, triples and pairs
    Text,
    /// One tagged JSON object per line
    Jsonl,
}

impl InputFormat {
    /// Resolves `Auto` against a path: `.jsonl` and `.jsonl.br` are JSON Lines,
    /// everything else is text.
    pub fn resolve(self, file_path: &str) -> InputFormat {
        match self {
            InputFormat::Auto => {
                let stem = file_path.strip_suffix(".br").unwrap_or(file_path);
                if stem.ends_with(".jsonl") {
                    InputFormat::Jsonl
                } else {
                    InputFormat::Text
                }
            }
            other => other,
        }
    }
}

impl FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(InputFormat::Auto),
            "text" | "txt" => Ok(InputFormat::Text),
            "jsonl" | "json" => Ok(InputFormat::Jsonl),
            _ => Err(anyhow::anyhow!("unknown input format '{}' (expected auto, text or jsonl)", s)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Auto => f.write_str("auto"),
            InputFormat::Text => f.write_str("text"),
            InputFormat::Jsonl => f.write_str("jsonl"),
        }
    }
}

/// Opens an input file for reading.
///
/// Automatically decompresses Brotli-compressed files based on the
/// extension (`.br`).
pub fn open_input(file_path: &str) -> Result<Box<dyn BufRead>> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path))?;

    let reader: Box<dyn BufRead> = if file_path.ends_with(".br") {
        let decompressor = Decompressor::new(file, 4096);
        Box::new(BufReader::new(decompressor))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader)
}

/// Returns the reader for a format, resolving `Auto` against `file_path`.
pub fn reader_for(format: InputFormat, file_path: &str) -> Box<dyn InputReader> {
    match format.resolve(file_path) {
        InputFormat::Jsonl => Box::new(JsonlInputReader::new()),
        _ => Box::new(TextInputReader::new()),
    }
}

/// Parses an input file in the given format.
///
/// # Examples
///
/// ```no_run
/// # use treepath::{parse_input, InputFormat};
/// # fn main() -> anyhow::Result<()> {
/// let input = parse_input("input2.txt", InputFormat::Auto)?;
///
/// // Compressed JSON Lines (automatic decompression)
/// let input = parse_input("tree.jsonl.br", InputFormat::Auto)?;
/// # Ok(())
/// # }
/// ```
pub fn parse_input(file_path: &str, format: InputFormat) -> Result<TreeInput> {
    reader_for(format, file_path).read(file_path)
}

// ============================================================================
// Text format
// ============================================================================

/// Reader for the whitespace format: `N`, `N` triples `id parent tag`,
/// `K`, `K` pairs `start end`.
///
/// A stream that stops right after the node triples has no queries.
pub struct TextInputReader;

impl TextInputReader {
    pub fn new() -> Self {
        TextInputReader
    }
}

impl Default for TextInputReader {
    fn default() -> Self {
        Self::new()
    }
}

impl InputReader for TextInputReader {
    fn name(&self) -> &'static str {
        "text"
    }

    fn parse(&self, reader: Box<dyn BufRead>) -> Result<TreeInput, ParseError> {
        parse_text(reader)
    }
}

/// Attaches the 1-based line number to decoding failures.
fn check_line(line_num: usize, line: io::Result<String>) -> Result<String, ParseError> {
    line.map_err(|err| match err.kind() {
        io::ErrorKind::InvalidData => ParseError::InvalidUtf8 { line: line_num + 1 },
        _ => ParseError::Io(err),
    })
}

/// Whitespace separated tokens, each with its 1-based line number.
struct Tokens {
    tokens: std::vec::IntoIter<(usize, String)>,
}

impl Tokens {
    fn read(reader: impl BufRead) -> Result<Self, ParseError> {
        let mut tokens = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = check_line(line_num, line)?;
            tokens.extend(line.split_whitespace().map(|t| (line_num + 1, t.to_string())));
        }
        Ok(Tokens { tokens: tokens.into_iter() })
    }

    fn remaining(&self) -> usize {
        self.tokens.len()
    }

    fn next_value<T: FromStr>(&mut self) -> Result<Option<T>, ParseError> {
        match self.tokens.next() {
            None => Ok(None),
            Some((line, token)) => token
                .parse()
                .map(Some)
                .map_err(|_| ParseError::InvalidToken { line, token }),
        }
    }

    /// Next value that must exist as item `found` of `expected`.
    fn expect_value<T: FromStr>(
        &mut self,
        expected: usize,
        found: usize,
        what: &'static str,
    ) -> Result<T, ParseError> {
        self.next_value()?
            .ok_or(ParseError::Truncated { expected, found, what })
    }
}

/// Parses the whitespace text format from any buffered reader.
pub fn parse_text(reader: impl BufRead) -> Result<TreeInput, ParseError> {
    let mut tokens = Tokens::read(reader)?;
    let mut input = TreeInput::default();

    let node_count: usize = tokens.next_value()?.unwrap_or(0);
    // Counts come from the input; never reserve more than the tokens can fill
    input.records.reserve(node_count.min(tokens.remaining() / 3));
    for i in 0..node_count {
        let id = tokens.expect_value(node_count, i, "node records")?;
        let parent_id = tokens.expect_value(node_count, i, "node records")?;
        let tag = tokens.expect_value(node_count, i, "node records")?;
        input.records.push(NodeRecord::with_tag(id, parent_id, tag));
    }

    let query_count: usize = tokens.next_value()?.unwrap_or(0);
    input.queries.reserve(query_count.min(tokens.remaining() / 2));
    for i in 0..query_count {
        let start = tokens.expect_value(query_count, i, "queries")?;
        let end = tokens.expect_value(query_count, i, "queries")?;
        input.queries.push(PathQuery::new(start, end));
    }

    if let Some((line, token)) = tokens.tokens.next() {
        log::warn!("ignoring trailing input starting with '{}' at line {}", token, line);
    }

    Ok(input)
}

// ============================================================================
// JSON Lines format
// ============================================================================

/// One line of a JSON Lines input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum InputLine {
    Node(NodeRecord),
    Query(PathQuery),
}

/// Reader for JSON Lines input:
///
/// ```text
/// {"type":"node","id":1,"parent_id":0,"tag":7}
/// {"type":"query","start":4,"end":3}
/// ```
///
/// Node lines are applied in file order; query lines may be interleaved.
pub struct JsonlInputReader;

impl JsonlInputReader {
    pub fn new() -> Self {
        JsonlInputReader
    }
}

impl Default for JsonlInputReader {
    fn default() -> Self {
        Self::new()
    }
}

impl InputReader for JsonlInputReader {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn parse(&self, reader: Box<dyn BufRead>) -> Result<TreeInput, ParseError> {
        parse_jsonl(reader)
    }
}

/// Parses JSON Lines input from any buffered reader.
pub fn parse_jsonl(reader: impl BufRead) -> Result<TreeInput, ParseError> {
    let mut input = TreeInput::default();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = check_line(line_num, line_result)?;

        if line.trim().is_empty() {
            continue;
        }

        let input_line: InputLine = serde_json::from_str(&line)
            .map_err(|source| ParseError::Json { line: line_num + 1, source })?;

        match input_line {
            InputLine::Node(record) => input.records.push(record),
            InputLine::Query(query) => input.queries.push(query),
        }
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_text_sample() {
        let text = "4\n1 0 0\n2 1 0\n3 1 5\n4 2 0\n3\n4 3\n1 1\n5 1\n";
        let input = parse_text(Cursor::new(text)).unwrap();
        assert_eq!(input.records.len(), 4);
        assert_eq!(input.records[2], NodeRecord::with_tag(3, 1, 5));
        assert_eq!(
            input.queries,
            vec![PathQuery::new(4, 3), PathQuery::new(1, 1), PathQuery::new(5, 1)]
        );
    }

    #[test]
    fn test_parse_text_ignores_layout() {
        let text = "2 1 0 0 2 1 0 1 1 2";
        let input = parse_text(Cursor::new(text)).unwrap();
        assert_eq!(input.records, vec![NodeRecord::with_tag(1, 0, 0), NodeRecord::with_tag(2, 1, 0)]);
        assert_eq!(input.queries, vec![PathQuery::new(1, 2)]);
    }

    #[test]
    fn test_parse_text_without_queries() {
        let input = parse_text(Cursor::new("1\n1 0 0\n")).unwrap();
        assert_eq!(input.records.len(), 1);
        assert!(input.queries.is_empty());
    }

    #[test]
    fn test_parse_text_empty() {
        let input = parse_text(Cursor::new("")).unwrap();
        assert_eq!(input, TreeInput::default());
    }

    #[test]
    fn test_parse_text_invalid_token() {
        let err = parse_text(Cursor::new("2\n1 0 0\n2 x 0\n")).unwrap_err();
        match err {
            ParseError::InvalidToken { line, token } => {
                assert_eq!(line, 3);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_text_truncated() {
        let err = parse_text(Cursor::new("3\n1 0 0\n2 1 0\n")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated { expected: 3, found: 2, what: "node records" }
        ));

        let err = parse_text(Cursor::new("1\n1 0 0\n2\n1 1\n")).unwrap_err();
        assert!(matches!(err, ParseError::Truncated { expected: 2, found: 1, what: "queries" }));
    }

    #[test]
    fn test_parse_text_huge_count_is_truncated() {
        let err = parse_text(Cursor::new("1000000000000000000\n1 0 0\n")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated { expected: 1_000_000_000_000_000_000, found: 1, .. }
        ));

        let err = parse_text(Cursor::new("1\n1 0 0\n18446744073709551615\n1 1\n")).unwrap_err();
        assert!(matches!(err, ParseError::Truncated { found: 1, what: "queries", .. }));
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let bytes: &[u8] = b"2\n1 0 0\n2 1 \xff\n";
        let err = parse_text(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ParseError::InvalidUtf8 { line: 3 }));

        let bytes: &[u8] = b"{\"type\":\"node\",\"id\":1,\"parent_id\":0}\n\xfe\n";
        let err = parse_jsonl(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ParseError::InvalidUtf8 { line: 2 }));
    }

    #[test]
    fn test_parse_jsonl() {
        let text = r#"{"type":"node","id":1,"parent_id":0,"tag":7}

{"type":"node","id":2,"parent_id":1}
{"type":"query","start":2,"end":1}
"#;
        let input = parse_jsonl(Cursor::new(text)).unwrap();
        assert_eq!(input.records, vec![NodeRecord::with_tag(1, 0, 7), NodeRecord::new(2, 1)]);
        assert_eq!(input.queries, vec![PathQuery::new(2, 1)]);
    }

    #[test]
    fn test_parse_jsonl_reports_line() {
        let text = "{\"type\":\"node\",\"id\":1,\"parent_id\":0}\n{\"type\":\"edge\"}\n";
        let err = parse_jsonl(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, ParseError::Json { line: 2, .. }));
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(InputFormat::Auto.resolve("tree.jsonl"), InputFormat::Jsonl);
        assert_eq!(InputFormat::Auto.resolve("tree.jsonl.br"), InputFormat::Jsonl);
        assert_eq!(InputFormat::Auto.resolve("input2.txt"), InputFormat::Text);
        assert_eq!(InputFormat::Auto.resolve("input2.txt.br"), InputFormat::Text);
        assert_eq!(InputFormat::Text.resolve("tree.jsonl"), InputFormat::Text);
        assert_eq!("jsonl".parse::<InputFormat>().unwrap(), InputFormat::Jsonl);
        assert!("xml".parse::<InputFormat>().is_err());
    }
}
