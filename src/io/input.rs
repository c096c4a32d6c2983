//! DXF input lexer
//!
//! Reads (group code, value) pairs from a seekable byte stream. The
//! dialect is detected up front: a stream opening with the 18-byte
//! sentinel `AutoCAD Binary DXF` is binary (8-bit or 16-bit group
//! codes), anything else is ASCII.

use crate::error::{DxfError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Sentinel opening every binary DXF stream.
const BINARY_SENTINEL: &[u8] = b"AutoCAD Binary DXF";

/// Bytes between the sentinel text and the first group code
/// (CR, LF, SUB, NUL).
const BINARY_SENTINEL_TAIL: u64 = 4;

/// Group-code reads between progress callback invocations.
const PROGRESS_INTERVAL: u32 = 100;

/// Combined Read + Seek object bound.
trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Ascii,
    /// Binary with 1-byte group codes; 255 escapes to a 16-bit code.
    Binary8,
    /// Binary with 2-byte little-endian group codes.
    Binary16,
}

/// DXF input stream.
pub struct Input {
    reader: BufReader<Box<dyn ReadSeek>>,
    dialect: Dialect,
    file_size: u64,
    consumed: u64,
    line_number: usize,
    put_back: Option<i32>,
    largest_handle: u64,
    comments: Vec<String>,
    /// Non-UTF8 fallback encoding. `None` means Latin-1 (byte-to-char).
    encoding: Option<&'static Encoding>,
    callback: Option<Box<dyn FnMut(f32) -> bool>>,
    aborted: bool,
    reads: u32,
}

impl Input {
    /// Create an input over any seekable reader and run format
    /// detection.
    pub fn new<R: Read + Seek + 'static>(reader: R) -> Result<Self> {
        let mut input = Input {
            reader: BufReader::new(Box::new(reader) as Box<dyn ReadSeek>),
            dialect: Dialect::Ascii,
            file_size: 0,
            consumed: 0,
            line_number: 0,
            put_back: None,
            largest_handle: 0,
            comments: Vec::new(),
            encoding: None,
            callback: None,
            aborted: false,
            reads: 0,
        };
        input.init()?;
        Ok(input)
    }

    /// Open a file and create an input over it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(File::open(path)?)
    }

    /// Seek to the end for the stream size, rewind, and detect the
    /// dialect.
    fn init(&mut self) -> Result<()> {
        self.file_size = self.reader.seek(SeekFrom::End(0))?;
        self.reader.seek(SeekFrom::Start(0))?;

        let mut sentinel = [0u8; BINARY_SENTINEL.len()];
        let mut filled = 0;
        while filled < sentinel.len() {
            let n = self.reader.read(&mut sentinel[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == sentinel.len() && sentinel == BINARY_SENTINEL {
            // Skip the sentinel tail, then probe the first group code:
            // two zero bytes mean 16-bit codes (an 8-bit stream would
            // follow code 0 with the first byte of "SECTION").
            let probe_at = BINARY_SENTINEL.len() as u64 + BINARY_SENTINEL_TAIL;
            self.reader.seek(SeekFrom::Start(probe_at))?;
            let mut probe = [0u8; 2];
            let got = self.reader.read(&mut probe)?;
            self.dialect = if got == 2 && probe == [0, 0] {
                Dialect::Binary16
            } else {
                Dialect::Binary8
            };
            self.reader.seek(SeekFrom::Start(probe_at))?;
            self.consumed = probe_at;
        } else {
            self.reader.seek(SeekFrom::Start(0))?;
            self.dialect = Dialect::Ascii;
            self.consumed = 0;
        }
        Ok(())
    }

    /// Whether the stream is one of the binary sub-dialects.
    pub fn is_binary(&self) -> bool {
        self.dialect != Dialect::Ascii
    }

    /// Install a progress callback, invoked roughly every 100
    /// group-code reads with the relative position in [0, 1].
    /// Returning `false` aborts the read.
    pub fn set_progress_callback(&mut self, callback: impl FnMut(f32) -> bool + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Set the fallback encoding used for value lines that are not
    /// valid UTF-8.
    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = Some(encoding);
    }

    /// Whether a progress callback aborted the read.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Relative position in the stream, in [0, 1].
    pub fn relative_position(&self) -> f32 {
        if self.file_size == 0 {
            0.0
        } else {
            (self.consumed as f64 / self.file_size as f64) as f32
        }
    }

    /// Human-readable position for error reporting: the line number for
    /// ASCII streams, the byte offset for binary ones.
    pub fn position_string(&self) -> String {
        match self.dialect {
            Dialect::Ascii => format!("line {}", self.line_number),
            _ => format!("byte offset {}", self.consumed),
        }
    }

    /// Largest handle value seen on group code 5 so far.
    pub fn largest_handle(&self) -> u64 {
        self.largest_handle
    }

    /// Register a handle string (hex); raises the high-water mark.
    pub fn register_handle(&mut self, s: &str) {
        if let Ok(v) = u64::from_str_radix(s.trim(), 16) {
            if v > self.largest_handle {
                self.largest_handle = v;
            }
        }
    }

    /// Take the comment bodies (group code 999) skipped so far.
    pub fn take_comments(&mut self) -> Vec<String> {
        std::mem::take(&mut self.comments)
    }

    /// Read the next group code.
    ///
    /// Comments (group code 999) are consumed transparently: the
    /// comment body is stashed and the next group code is returned.
    pub fn read_group_code(&mut self) -> Result<i32> {
        if let Some(code) = self.put_back.take() {
            return Ok(code);
        }
        loop {
            self.reads += 1;
            if self.reads % PROGRESS_INTERVAL == 0 {
                if let Some(cb) = self.callback.as_mut() {
                    let progress = if self.file_size == 0 {
                        0.0
                    } else {
                        (self.consumed as f64 / self.file_size as f64) as f32
                    };
                    if !cb(progress) {
                        self.aborted = true;
                        return Err(DxfError::Aborted);
                    }
                }
            }
            let code = match self.dialect {
                Dialect::Ascii => self.read_group_code_ascii()?,
                Dialect::Binary8 => self.read_group_code_binary8()?,
                Dialect::Binary16 => i32::from(self.read_u16()?),
            };
            if code == 999 {
                let comment = self.read_string()?;
                self.comments.push(comment);
                continue;
            }
            return Ok(code);
        }
    }

    /// Push a group code back; at most one may be pending.
    pub fn put_back_group_code(&mut self, code: i32) {
        debug_assert!(self.put_back.is_none(), "group code already pending");
        self.put_back = Some(code);
    }

    fn read_group_code_ascii(&mut self) -> Result<i32> {
        // Blank lines before a group code are tolerated.
        loop {
            let line = self.require_line()?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return trimmed.parse::<i32>().map_err(|_| {
                DxfError::Parse(format!(
                    "invalid group code '{}' at {}",
                    trimmed,
                    self.position_string()
                ))
            });
        }
    }

    fn read_group_code_binary8(&mut self) -> Result<i32> {
        let b = self.read_u8()?;
        if b == 255 {
            // Extended group code follows as a signed 16-bit word.
            let mut buf = [0u8; 2];
            self.read_exact(&mut buf)?;
            Ok(i32::from(i16::from_le_bytes(buf)))
        } else {
            Ok(i32::from(b))
        }
    }

    /// Read an 8-bit integer value.
    pub fn read_int8(&mut self) -> Result<i8> {
        match self.dialect {
            Dialect::Ascii => Ok(self.read_ascii_int()? as i8),
            _ => {
                let v = self
                    .reader
                    .read_i8()
                    .map_err(|_| DxfError::Truncated(self.position_string()))?;
                self.consumed += 1;
                Ok(v)
            }
        }
    }

    /// Read a 16-bit integer value.
    pub fn read_int16(&mut self) -> Result<i16> {
        match self.dialect {
            Dialect::Ascii => Ok(self.read_ascii_int()? as i16),
            _ => {
                let v = self
                    .reader
                    .read_i16::<LittleEndian>()
                    .map_err(|_| DxfError::Truncated(self.position_string()))?;
                self.consumed += 2;
                Ok(v)
            }
        }
    }

    /// Read a 32-bit integer value.
    pub fn read_int32(&mut self) -> Result<i32> {
        match self.dialect {
            Dialect::Ascii => Ok(self.read_ascii_int()? as i32),
            _ => {
                let v = self
                    .reader
                    .read_i32::<LittleEndian>()
                    .map_err(|_| DxfError::Truncated(self.position_string()))?;
                self.consumed += 4;
                Ok(v)
            }
        }
    }

    /// Read a single-precision float value. Binary streams store floats
    /// as doubles.
    pub fn read_float(&mut self) -> Result<f32> {
        match self.dialect {
            Dialect::Ascii => {
                let v = self.read_ascii_float()? as f32;
                Ok(if v.is_finite() {
                    v
                } else {
                    f32::MAX.copysign(v)
                })
            }
            _ => Ok(self.read_binary_double()? as f32),
        }
    }

    /// Read a double-precision float value.
    pub fn read_double(&mut self) -> Result<f64> {
        match self.dialect {
            Dialect::Ascii => self.read_ascii_float(),
            _ => self.read_binary_double(),
        }
    }

    /// Read a string value; leading whitespace is skipped.
    pub fn read_string(&mut self) -> Result<String> {
        match self.dialect {
            Dialect::Ascii => Ok(self.require_line()?.trim_start().to_string()),
            _ => self.read_binary_string(),
        }
    }

    /// Read a string value preserving leading whitespace (used for the
    /// primary text value of TEXT).
    pub fn read_string_no_skip(&mut self) -> Result<String> {
        match self.dialect {
            Dialect::Ascii => self.require_line(),
            _ => self.read_binary_string(),
        }
    }

    // ---- ASCII primitives -------------------------------------------------

    /// Read one line as raw bytes and decode it; trailing CR is
    /// stripped. `None` at end of stream.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte)? {
                0 => {
                    if bytes.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                _ => {
                    self.consumed += 1;
                    if byte[0] == b'\n' {
                        break;
                    }
                    bytes.push(byte[0]);
                }
            }
        }
        self.line_number += 1;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        Ok(Some(self.decode_bytes(&bytes)))
    }

    fn require_line(&mut self) -> Result<String> {
        self.read_line()?
            .ok_or_else(|| DxfError::Truncated(self.position_string()))
    }

    /// Decode bytes as UTF-8, falling back to the configured encoding or
    /// Latin-1.
    fn decode_bytes(&self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                if let Some(enc) = self.encoding {
                    let (decoded, _, _) = enc.decode(bytes);
                    decoded.into_owned()
                } else {
                    // Latin-1 maps bytes 0-255 straight to code points.
                    bytes.iter().map(|&b| b as char).collect()
                }
            }
        }
    }

    /// Parse an integer value line: optional sign, optional 0x hex
    /// prefix.
    fn read_ascii_int(&mut self) -> Result<i64> {
        let line = self.require_line()?;
        let s = line.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let parsed = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            i64::from_str_radix(hex, 16)
        } else {
            digits.parse::<i64>()
        };
        let value = parsed.map_err(|_| {
            DxfError::Parse(format!(
                "invalid integer '{}' at {}",
                s,
                self.position_string()
            ))
        })?;
        Ok(if negative { -value } else { value })
    }

    /// Parse a float value line; non-finite results clamp to the type
    /// maximum and count as success.
    fn read_ascii_float(&mut self) -> Result<f64> {
        let line = self.require_line()?;
        let s = line.trim();
        let v = s.parse::<f64>().map_err(|_| {
            DxfError::Parse(format!(
                "invalid float '{}' at {}",
                s,
                self.position_string()
            ))
        })?;
        if v.is_nan() {
            return Err(DxfError::Parse(format!(
                "invalid float '{}' at {}",
                s,
                self.position_string()
            )));
        }
        Ok(if v.is_finite() {
            v
        } else {
            f64::MAX.copysign(v)
        })
    }

    // ---- binary primitives ------------------------------------------------

    fn read_u8(&mut self) -> Result<u8> {
        let v = self
            .reader
            .read_u8()
            .map_err(|_| DxfError::Truncated(self.position_string()))?;
        self.consumed += 1;
        Ok(v)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let v = self
            .reader
            .read_u16::<LittleEndian>()
            .map_err(|_| DxfError::Truncated(self.position_string()))?;
        self.consumed += 2;
        Ok(v)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader
            .read_exact(buf)
            .map_err(|_| DxfError::Truncated(self.position_string()))?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    fn read_binary_double(&mut self) -> Result<f64> {
        let v = self
            .reader
            .read_f64::<LittleEndian>()
            .map_err(|_| DxfError::Truncated(self.position_string()))?;
        self.consumed += 8;
        Ok(v)
    }

    /// NUL-terminated byte string.
    fn read_binary_string(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        Ok(self.decode_bytes(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ascii_input(data: &str) -> Input {
        Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_ascii_detection() {
        let input = ascii_input("  0\nSECTION\n");
        assert!(!input.is_binary());
    }

    #[test]
    fn test_read_group_code_and_string() {
        let mut input = ascii_input("  0\nSECTION\n  2\nENTITIES\n");
        assert_eq!(input.read_group_code().unwrap(), 0);
        assert_eq!(input.read_string().unwrap(), "SECTION");
        assert_eq!(input.read_group_code().unwrap(), 2);
        assert_eq!(input.read_string().unwrap(), "ENTITIES");
    }

    #[test]
    fn test_put_back() {
        let mut input = ascii_input("  0\nEOF\n");
        let code = input.read_group_code().unwrap();
        input.put_back_group_code(code);
        assert_eq!(input.read_group_code().unwrap(), 0);
    }

    #[test]
    fn test_read_integers() {
        let mut input = ascii_input("42\n-7\n0x1F\n+3\n");
        assert_eq!(input.read_int16().unwrap(), 42);
        assert_eq!(input.read_int16().unwrap(), -7);
        assert_eq!(input.read_int32().unwrap(), 31);
        assert_eq!(input.read_int8().unwrap(), 3);
    }

    #[test]
    fn test_read_doubles() {
        let mut input = ascii_input("1.5\n-2.25e2\n1e999\n");
        assert_eq!(input.read_double().unwrap(), 1.5);
        assert_eq!(input.read_double().unwrap(), -225.0);
        // Out-of-range literals clamp instead of failing
        assert_eq!(input.read_double().unwrap(), f64::MAX);
    }

    #[test]
    fn test_malformed_number_fails() {
        let mut input = ascii_input("zzz\n");
        assert!(input.read_int16().is_err());
    }

    #[test]
    fn test_crlf_tolerated() {
        let mut input = ascii_input("  0\r\nSECTION\r\n");
        assert_eq!(input.read_group_code().unwrap(), 0);
        assert_eq!(input.read_string().unwrap(), "SECTION");
    }

    #[test]
    fn test_string_skip_and_no_skip() {
        let mut input = ascii_input("  hello\n  world\n");
        assert_eq!(input.read_string().unwrap(), "hello");
        assert_eq!(input.read_string_no_skip().unwrap(), "  world");
    }

    #[test]
    fn test_comment_skipping() {
        let mut input = ascii_input("999\na comment\n  0\nEOF\n");
        assert_eq!(input.read_group_code().unwrap(), 0);
        assert_eq!(input.take_comments(), vec!["a comment".to_string()]);
    }

    #[test]
    fn test_handle_registration() {
        let mut input = ascii_input("");
        input.register_handle("FF");
        input.register_handle("5");
        assert_eq!(input.largest_handle(), 255);
    }

    #[test]
    fn test_truncated_stream() {
        let mut input = ascii_input("  0\n");
        assert_eq!(input.read_group_code().unwrap(), 0);
        assert!(matches!(
            input.read_string().unwrap_err(),
            DxfError::Truncated(_)
        ));
    }

    #[test]
    fn test_binary_detection_8bit() {
        let mut data = Vec::new();
        data.extend_from_slice(b"AutoCAD Binary DXF");
        data.extend_from_slice(&[b'\r', b'\n', 0x1a, 0x00]);
        data.push(0); // group code 0
        data.extend_from_slice(b"SECTION\0");
        let mut input = Input::new(Cursor::new(data)).unwrap();
        assert!(input.is_binary());
        assert_eq!(input.read_group_code().unwrap(), 0);
        assert_eq!(input.read_string().unwrap(), "SECTION");
    }

    #[test]
    fn test_binary_detection_16bit() {
        let mut data = Vec::new();
        data.extend_from_slice(b"AutoCAD Binary DXF");
        data.extend_from_slice(&[b'\r', b'\n', 0x1a, 0x00]);
        data.extend_from_slice(&[0, 0]); // group code 0 as 16-bit word
        data.extend_from_slice(b"SECTION\0");
        let mut input = Input::new(Cursor::new(data)).unwrap();
        assert!(input.is_binary());
        assert_eq!(input.read_group_code().unwrap(), 0);
        assert_eq!(input.read_string().unwrap(), "SECTION");
    }

    #[test]
    fn test_binary_extended_group_code() {
        let mut data = Vec::new();
        data.extend_from_slice(b"AutoCAD Binary DXF");
        data.extend_from_slice(&[b'\r', b'\n', 0x1a, 0x00]);
        data.push(255);
        data.extend_from_slice(&1071i16.to_le_bytes());
        data.extend_from_slice(&7i32.to_le_bytes());
        let mut input = Input::new(Cursor::new(data)).unwrap();
        assert_eq!(input.read_group_code().unwrap(), 1071);
        assert_eq!(input.read_int32().unwrap(), 7);
    }

    #[test]
    fn test_binary_integer_values() {
        let mut data = Vec::new();
        data.extend_from_slice(b"AutoCAD Binary DXF");
        data.extend_from_slice(&[b'\r', b'\n', 0x1a, 0x00]);
        data.push(70);
        data.extend_from_slice(&(-5i16).to_le_bytes());
        data.push(10);
        data.extend_from_slice(&1.5f64.to_le_bytes());
        let mut input = Input::new(Cursor::new(data)).unwrap();
        assert_eq!(input.read_group_code().unwrap(), 70);
        assert_eq!(input.read_int16().unwrap(), -5);
        assert_eq!(input.read_group_code().unwrap(), 10);
        assert_eq!(input.read_double().unwrap(), 1.5);
    }

    #[test]
    fn test_non_sentinel_prefix_is_ascii() {
        let input = ascii_input("AutoCAD Binary DX_ not quite\n");
        assert!(!input.is_binary());
    }

    #[test]
    fn test_progress_abort() {
        let mut body = String::new();
        for _ in 0..300 {
            body.push_str("  0\nX\n");
        }
        let mut input = ascii_input(&body);
        input.set_progress_callback(|_| false);
        let mut result = Ok(0);
        for _ in 0..300 {
            result = input.read_group_code();
            if result.is_err() {
                break;
            }
            input.read_string().unwrap();
        }
        assert!(matches!(result.unwrap_err(), DxfError::Aborted));
        assert!(input.aborted());
    }

    #[test]
    fn test_relative_position() {
        let mut input = ascii_input("  0\nEOF\n");
        assert_eq!(input.relative_position(), 0.0);
        input.read_group_code().unwrap();
        input.read_string().unwrap();
        assert!((input.relative_position() - 1.0).abs() < 1e-6);
    }
}
