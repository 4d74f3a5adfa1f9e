//! Incremental RESP reply decoder.
//!
//! The decoder is pull-based and IO-free: callers accumulate bytes from
//! their transport and ask [`decode`] whether the buffer starts with a
//! complete frame. `Ok(None)` means "not yet, read more"; a decoded
//! frame reports how many bytes it consumed so the caller can drain
//! exactly one reply and keep any pipelined trailing bytes intact.

use crate::error::{Error, Result};
use crate::value::Value;

/// Maximum nesting depth for array replies.
const MAX_DEPTH: usize = 32;

/// Maximum declared bulk string length (matches the conventional
/// 512 MiB proto limit of Redis-like servers).
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Maximum declared array element count.
const MAX_ARRAY_LEN: i64 = 1024 * 1024;

/// Attempts to decode one reply frame from the front of `buf`.
///
/// Returns the decoded value and the number of bytes consumed, or
/// `None` when the buffer holds only a prefix of a frame. Malformed
/// input fails with an [`Error`]; the buffer should then be discarded,
/// since the stream cannot be resynchronized.
///
/// # Examples
///
/// ```
/// use kvwire_core::{decode, Value};
///
/// let (value, used) = decode(b"+OK\r\n:1\r\n").unwrap().unwrap();
/// assert_eq!(value, Value::Simple("OK".into()));
/// assert_eq!(used, 5); // ":1\r\n" is left for the next call
///
/// assert!(decode(b"$5\r\nhel").unwrap().is_none()); // incomplete
/// ```
pub fn decode(buf: &[u8]) -> Result<Option<(Value, usize)>> {
    let mut cursor = Cursor { buf, pos: 0 };
    match parse_value(&mut cursor, 0)? {
        Some(value) => Ok(Some((value, cursor.pos))),
        None => Ok(None),
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Reads up to and including the next CRLF, returning the line body.
    /// `None` when no full line is buffered yet.
    fn read_line(&mut self) -> Result<Option<&'a [u8]>> {
        let rest = &self.buf[self.pos..];
        let Some(lf) = rest.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };
        if lf == 0 || rest[lf - 1] != b'\r' {
            return Err(Error::BadLineTerminator);
        }
        self.pos += lf + 1;
        Ok(Some(&rest[..lf - 1]))
    }

    /// Reads exactly `len` payload bytes followed by CRLF.
    fn read_exact(&mut self, len: usize) -> Result<Option<&'a [u8]>> {
        let rest = &self.buf[self.pos..];
        if rest.len() < len + 2 {
            return Ok(None);
        }
        if &rest[len..len + 2] != b"\r\n" {
            return Err(Error::BadLineTerminator);
        }
        self.pos += len + 2;
        Ok(Some(&rest[..len]))
    }
}

fn parse_int(line: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(line)
        .map_err(|_| Error::BadInteger(String::from_utf8_lossy(line).into_owned()))?;
    text.parse()
        .map_err(|_| Error::BadInteger(text.to_string()))
}

fn parse_value(cursor: &mut Cursor<'_>, depth: usize) -> Result<Option<Value>> {
    if depth > MAX_DEPTH {
        return Err(Error::DepthExceeded);
    }
    let Some(&prefix) = cursor.buf.get(cursor.pos) else {
        return Ok(None);
    };
    cursor.pos += 1;

    match prefix {
        b'+' => {
            let Some(line) = cursor.read_line()? else {
                return Ok(None);
            };
            let text = std::str::from_utf8(line).map_err(|_| Error::NotUtf8)?;
            Ok(Some(Value::Simple(text.to_string())))
        }
        b'-' => {
            let Some(line) = cursor.read_line()? else {
                return Ok(None);
            };
            // Error text is diagnostic; tolerate lossy UTF-8.
            Ok(Some(Value::Error(
                String::from_utf8_lossy(line).into_owned(),
            )))
        }
        b':' => {
            let Some(line) = cursor.read_line()? else {
                return Ok(None);
            };
            Ok(Some(Value::Integer(parse_int(line)?)))
        }
        b'$' => {
            let Some(line) = cursor.read_line()? else {
                return Ok(None);
            };
            let len = parse_int(line)?;
            if len == -1 {
                return Ok(Some(Value::Null));
            }
            if len < 0 || len > MAX_BULK_LEN {
                return Err(Error::BulkTooLarge(len));
            }
            let Some(payload) = cursor.read_exact(len as usize)? else {
                return Ok(None);
            };
            Ok(Some(Value::Bulk(payload.to_vec())))
        }
        b'*' => {
            let Some(line) = cursor.read_line()? else {
                return Ok(None);
            };
            let count = parse_int(line)?;
            if count == -1 {
                return Ok(Some(Value::Null));
            }
            if count < 0 || count > MAX_ARRAY_LEN {
                return Err(Error::ArrayTooLarge(count));
            }
            let mut items = Vec::with_capacity(count.min(4096) as usize);
            for _ in 0..count {
                let Some(item) = parse_value(cursor, depth + 1)? else {
                    return Ok(None);
                };
                items.push(item);
            }
            Ok(Some(Value::Array(items)))
        }
        other => Err(Error::InvalidPrefix(other)),
    }
}

// ============================================================================
// Tests
// ============================================================================
