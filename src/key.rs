use std::{borrow::Borrow, fmt, sync::Arc};

/// An immutable line of input.
///
/// Ordering is byte-lexicographic. Cloning only bumps a reference count, so the
/// same bytes can live in many trees at once.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Arc<[u8]>);

impl Key {
    pub fn new(bytes: &[u8]) -> Self {
        Key(Arc::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split an already-loaded line-oriented buffer into keys.
    ///
    /// A trailing `\r` is stripped from each line and the empty piece after a
    /// final newline is dropped.
    pub fn lines(buf: &[u8]) -> Vec<Key> {
        let mut lines: Vec<&[u8]> = buf.split(|b| *b == b'\n').collect();

        if let Some(last) = lines.last() {
            if last.is_empty() {
                lines.pop();
            }
        }

        lines
            .into_iter()
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .map(Key::new)
            .collect()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Borrow<[u8]> for Key {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Key {
    fn from(bytes: &[u8]) -> Self {
        Key::new(bytes)
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Key(Arc::from(bytes))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s.as_bytes())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::from(s.into_bytes())
    }
}
