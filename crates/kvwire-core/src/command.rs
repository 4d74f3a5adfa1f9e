//! Request builder and encoding.
//!
//! Every request is encoded as a RESP array of bulk strings, which is
//! binary-safe: argument bytes are never inspected, so keys and values
//! may contain spaces, newlines, or arbitrary binary data.

use crate::error::{Error, Result};

// ============================================================================
// IntoArg
// ============================================================================

/// Types accepted as command arguments.
pub trait IntoArg {
    /// Converts the argument into its wire bytes.
    fn into_arg(self) -> Vec<u8>;
}

impl IntoArg for Vec<u8> {
    fn into_arg(self) -> Vec<u8> {
        self
    }
}

impl IntoArg for &[u8] {
    fn into_arg(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl IntoArg for String {
    fn into_arg(self) -> Vec<u8> {
        self.into_bytes()
    }
}

impl IntoArg for &str {
    fn into_arg(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl IntoArg for &String {
    fn into_arg(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

macro_rules! impl_into_arg_for_int {
    ($($t:ty),*) => {
        $(impl IntoArg for $t {
            fn into_arg(self) -> Vec<u8> {
                self.to_string().into_bytes()
            }
        })*
    };
}

impl_into_arg_for_int!(i64, i32, u64, u32, usize);

// ============================================================================
// Command
// ============================================================================

/// A request frame under construction.
///
/// # Examples
///
/// ```
/// use kvwire_core::Command;
///
/// let cmd = Command::new("SET").arg("greeting").arg("hello world");
/// let wire = cmd.encode().unwrap();
/// assert_eq!(
///     wire,
///     b"*3\r\n$3\r\nSET\r\n$8\r\ngreeting\r\n$11\r\nhello world\r\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Command {
    parts: Vec<Vec<u8>>,
}

impl Command {
    /// Starts a command with the given name.
    pub fn new(name: impl IntoArg) -> Self {
        Self {
            parts: vec![name.into_arg()],
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl IntoArg) -> Self {
        self.parts.push(arg.into_arg());
        self
    }

    /// Appends every argument from an iterator.
    pub fn args<A: IntoArg>(mut self, args: impl IntoIterator<Item = A>) -> Self {
        self.parts.extend(args.into_iter().map(IntoArg::into_arg));
        self
    }

    /// Appends field/value pairs, flattened in order. Used for `MSET`
    /// and `HMSET` style commands.
    pub fn pairs<A: IntoArg, B: IntoArg>(
        mut self,
        pairs: impl IntoIterator<Item = (A, B)>,
    ) -> Self {
        for (a, b) in pairs {
            self.parts.push(a.into_arg());
            self.parts.push(b.into_arg());
        }
        self
    }

    /// Command name bytes.
    pub fn name(&self) -> &[u8] {
        &self.parts[0]
    }

    /// Number of parts including the name.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false: a command carries at least its name.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encodes the command as a RESP array of bulk strings.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.parts[0].is_empty() {
            return Err(Error::EmptyCommand);
        }
        let mut out = Vec::with_capacity(
            16 + self.parts.iter().map(|p| p.len() + 16).sum::<usize>(),
        );
        out.extend_from_slice(format!("*{}\r\n", self.parts.len()).as_bytes());
        for part in &self.parts {
            out.extend_from_slice(format!("${}\r\n", part.len()).as_bytes());
            out.extend_from_slice(part);
            out.extend_from_slice(b"\r\n");
        }
        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_single_word() {
        let wire = Command::new("PING").encode().unwrap();
        assert_eq!(wire, b"*1\r\n$4\r\nPING\r\n");
    }

    #[test]
    fn test_encode_integer_args() {
        let wire = Command::new("EXPIRE")
            .arg("session")
            .arg(30i64)
            .encode()
            .unwrap();
        assert_eq!(wire, b"*3\r\n$6\r\nEXPIRE\r\n$7\r\nsession\r\n$2\r\n30\r\n");
    }

    #[test]
    fn test_encode_is_binary_safe() {
        let wire = Command::new("SET")
            .arg("k")
            .arg(&b"a b\r\nc\x00"[..])
            .encode()
            .unwrap();
        assert_eq!(wire, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$8\r\na b\r\nc\x00\r\n");
    }

    #[test]
    fn test_pairs_flatten_in_order() {
        let cmd = Command::new("MSET").pairs([("a", "1"), ("b", "2")]);
        assert_eq!(cmd.len(), 5);
        let wire = cmd.encode().unwrap();
        assert_eq!(
            wire,
            b"*5\r\n$4\r\nMSET\r\n$1\r\na\r\n$1\r\n1\r\n$1\r\nb\r\n$1\r\n2\r\n"
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            Command::new("").encode(),
            Err(Error::EmptyCommand)
        ));
    }
}
