use crate::parser::{InputFormat, InputLine};
use crate::record::{NodeId, TreeInput};
use anyhow::{Context, Result};
use brotli::enc::BrotliEncoderParams;
use brotli::CompressorWriter;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Creates an output file, compressing with Brotli if the path ends with `.br`.
///
/// Brotli compression uses quality level 6 (balanced speed/ratio).
fn create_output(file_path: &str) -> Result<Box<dyn Write>> {
    let file = File::create(file_path)
        .with_context(|| format!("Failed to create file: {}", file_path))?;

    let writer: Box<dyn Write> = if file_path.ends_with(".br") {
        let buf_writer = BufWriter::new(file);
        let params = BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        };
        Box::new(CompressorWriter::with_params(buf_writer, 4096, &params))
    } else {
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// Formats a path given in end -> start order as `start ... end`.
pub fn format_path(path: &[NodeId]) -> String {
    path.iter()
        .rev()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints query results, one line per query.
///
/// Paths are handed over as produced by the path finder (end -> start) and
/// printed start -> end. An empty path prints an empty line. Output is
/// buffered; call [`PathWriter::flush`] once all paths are written.
pub struct PathWriter {
    writer: Box<dyn Write>,
    line_count: usize,
}

impl PathWriter {
    /// Writes to a file, Brotli-compressed if the path ends with `.br`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use treepath::PathWriter;
    /// # fn main() -> anyhow::Result<()> {
    /// let mut writer = PathWriter::new("paths.txt")?;
    /// writer.write_path(&[3, 1, 2, 4])?; // prints "4 2 1 3"
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(file_path: &str) -> Result<Self> {
        Ok(Self::from_writer(create_output(file_path)?))
    }

    pub fn stdout() -> Self {
        Self::from_writer(Box::new(io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write>) -> Self {
        PathWriter { writer, line_count: 0 }
    }

    pub fn write_path(&mut self, path: &[NodeId]) -> Result<()> {
        writeln!(self.writer, "{}", format_path(path))
            .context("Failed to write path")?;

        self.line_count += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
            .context("Failed to flush writer")
    }

    pub fn lines_written(&self) -> usize {
        self.line_count
    }
}

impl Drop for PathWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Writes input files in either supported format.
pub struct InputWriter {
    writer: Box<dyn Write>,
    format: InputFormat,
}

impl InputWriter {
    /// Creates a writer for `file_path`. `InputFormat::Auto` is resolved
    /// against the path the same way the readers resolve it.
    pub fn new(file_path: &str, format: InputFormat) -> Result<Self> {
        Ok(InputWriter {
            writer: create_output(file_path)?,
            format: format.resolve(file_path),
        })
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    /// Writes all records followed by all queries.
    ///
    /// Missing tags are written as `0` in the text format, which has no way
    /// to leave a column out.
    pub fn write_input(&mut self, input: &TreeInput) -> Result<()> {
        match self.format {
            InputFormat::Jsonl => {
                for record in &input.records {
                    self.write_json_line(&InputLine::Node(*record))?;
                }
                for query in &input.queries {
                    self.write_json_line(&InputLine::Query(*query))?;
                }
            }
            _ => {
                writeln!(self.writer, "{}", input.records.len())?;
                for record in &input.records {
                    writeln!(
                        self.writer,
                        "{} {} {}",
                        record.id,
                        record.parent_id,
                        record.tag.unwrap_or(0)
                    )?;
                }
                writeln!(self.writer, "{}", input.queries.len())?;
                for query in &input.queries {
                    writeln!(self.writer, "{} {}", query.start, query.end)?;
                }
            }
        }

        self.writer.flush()
            .context("Failed to flush writer")?;

        Ok(())
    }

    fn write_json_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .context("Failed to serialize to JSON")?;

        writeln!(self.writer, "{}", json)
            .context("Failed to write line")?;

        Ok(())
    }
}

impl Drop for InputWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
