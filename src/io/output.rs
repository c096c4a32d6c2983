//! DXF output serializer
//!
//! Writes (group code, value) pairs in the ASCII dialect: group codes
//! right-justified to 3 columns, integers to 6 columns, doubles in a
//! general format that keeps an explicit decimal point for integral
//! values. Binary output is not produced.

use crate::error::{DxfError, Result};
use crate::types::Vector3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes between progress callback invocations.
const PROGRESS_INTERVAL: usize = 256;

/// Progress callback: receives the fraction written in [0, 1];
/// returning `false` aborts the write.
pub type ProgressCallback<'a> = Box<dyn FnMut(f32) -> bool + 'a>;

/// DXF output stream (ASCII).
pub struct Output<'a> {
    writer: Box<dyn Write + 'a>,
    written_records: usize,
    expected_records: usize,
    callback: Option<ProgressCallback<'a>>,
    aborted: bool,
}

impl<'a> Output<'a> {
    /// Create an output over any writer.
    pub fn new<W: Write + 'a>(writer: W) -> Self {
        Output {
            writer: Box::new(writer),
            written_records: 0,
            expected_records: 0,
            callback: None,
            aborted: false,
        }
    }

    /// Create an output writing to a file.
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Output<'static>> {
        Ok(Output::new(BufWriter::new(File::create(path)?)))
    }

    /// Install a progress callback, invoked roughly every 256 record
    /// writes with written/expected. `expected_records` normally comes
    /// from [`Model::count_records`](crate::Model::count_records).
    pub fn set_progress_callback(
        &mut self,
        expected_records: usize,
        callback: impl FnMut(f32) -> bool + 'a,
    ) {
        self.expected_records = expected_records;
        self.callback = Some(Box::new(callback));
    }

    /// Whether a progress callback aborted the write.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Number of records (group code + value pairs) written so far.
    pub fn written_records(&self) -> usize {
        self.written_records
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Group code, right-justified to 3 columns.
    fn write_code(&mut self, code: i32) -> Result<()> {
        writeln!(self.writer, "{:>3}", code)?;
        self.written_records += 1;
        if self.written_records % PROGRESS_INTERVAL == 0 {
            if let Some(cb) = self.callback.as_mut() {
                let progress = if self.expected_records == 0 {
                    0.0
                } else {
                    (self.written_records as f64 / self.expected_records as f64).min(1.0) as f32
                };
                if !cb(progress) {
                    self.aborted = true;
                    return Err(DxfError::Aborted);
                }
            }
        }
        Ok(())
    }

    /// Write a string record.
    pub fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    /// Write an 8-bit integer record.
    pub fn write_i8(&mut self, code: i32, value: i8) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{:>6}", value)?;
        Ok(())
    }

    /// Write a 16-bit integer record.
    pub fn write_i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{:>6}", value)?;
        Ok(())
    }

    /// Write a 32-bit integer record.
    pub fn write_i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{:>6}", value)?;
        Ok(())
    }

    /// Write a single-precision float record.
    pub fn write_f32(&mut self, code: i32, value: f32) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", format_double(value as f64))?;
        Ok(())
    }

    /// Write a double-precision float record.
    pub fn write_f64(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", format_double(value))?;
        Ok(())
    }

    /// Write a 3D point as three double records on `code`, `code + 10`,
    /// `code + 20`.
    pub fn write_point(&mut self, code: i32, point: Vector3) -> Result<()> {
        self.write_f64(code, point.x)?;
        self.write_f64(code + 10, point.y)?;
        self.write_f64(code + 20, point.z)
    }
}

/// Integral values below 1e6 keep one explicit decimal place; everything
/// else uses the shortest representation that round-trips a double.
fn format_double(value: f64) -> String {
    if value.abs() < 1e6 && value.trunc() == value {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut Output<'_>)) -> String {
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            f(&mut out);
            out.flush().unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_code_formatting() {
        let s = written(|out| {
            out.write_string(0, "LINE").unwrap();
            out.write_i16(62, 7).unwrap();
            out.write_string(100, "AcDbEntity").unwrap();
        });
        assert_eq!(s, "  0\nLINE\n 62\n     7\n100\nAcDbEntity\n");
    }

    #[test]
    fn test_integer_column() {
        let s = written(|out| {
            out.write_i16(70, -12).unwrap();
        });
        assert_eq!(s, " 70\n   -12\n");
    }

    #[test]
    fn test_double_formatting() {
        assert_eq!(format_double(1.0), "1.0");
        assert_eq!(format_double(42.0), "42.0");
        assert_eq!(format_double(-0.0), "-0.0");
        assert_eq!(format_double(0.5), "0.5");
        assert_eq!(format_double(1.0e7), "10000000");
        assert_eq!(format_double(1.25e-3), "0.00125");
    }

    #[test]
    fn test_double_roundtrips() {
        let v = 0.1 + 0.2;
        assert_eq!(format_double(v).parse::<f64>().unwrap(), v);
    }

    #[test]
    fn test_write_point() {
        let s = written(|out| {
            out.write_point(10, Vector3::new(1.0, 2.5, 3.0)).unwrap();
        });
        assert_eq!(s, " 10\n1.0\n 20\n2.5\n 30\n3.0\n");
    }

    #[test]
    fn test_written_records() {
        let mut buf = Vec::new();
        let mut out = Output::new(&mut buf);
        out.write_string(0, "SECTION").unwrap();
        out.write_string(2, "ENTITIES").unwrap();
        out.write_string(0, "ENDSEC").unwrap();
        assert_eq!(out.written_records(), 3);
    }

    #[test]
    fn test_progress_abort() {
        let mut buf = Vec::new();
        let mut out = Output::new(&mut buf);
        out.set_progress_callback(1024, |_| false);
        let mut result = Ok(());
        for _ in 0..300 {
            result = out.write_string(0, "X");
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result.unwrap_err(), DxfError::Aborted));
        assert!(out.aborted());
    }
}
