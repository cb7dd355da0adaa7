use crate::error::ParseError;
use crate::record::TreeInput;
use anyhow::Context;
use std::io::BufRead;

/// Trait for turning an input source into node records and path queries.
///
/// Implementors only parse a byte stream; opening files and Brotli
/// decompression are handled once by [`InputReader::read`].
pub trait InputReader {
    /// Short format name used in log and error messages
    fn name(&self) -> &'static str;

    /// Parses records and queries from an already opened stream
    fn parse(&self, reader: Box<dyn BufRead>) -> Result<TreeInput, ParseError>;

    /// Opens and parses an input file, decompressing `.br` files on the fly
    fn read(&self, file_path: &str) -> anyhow::Result<TreeInput> {
        let reader = crate::parser::open_input(file_path)?;
        let input = self
            .parse(reader)
            .with_context(|| format!("Failed to parse {} input: {}", self.name(), file_path))?;
        log::info!(
            "read {} node records and {} queries from {}",
            input.records.len(),
            input.queries.len(),
            file_path
        );
        Ok(input)
    }
}
