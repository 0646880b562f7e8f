//! Line-separator kinds and separator-aware text splitting.
//!
//! Unlike editors that normalize everything to LF on load, this engine keeps the
//! separator of every line as found in the source text, so `to_string()` reproduces the
//! input byte-for-byte. A CRLF pair is always treated as one separator, never as CR
//! followed by LF.

/// The separator terminating a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSeparator {
    /// No separator. Only valid on the final line of a document.
    #[default]
    None,
    /// Unix-style LF (`'\n'`).
    Lf,
    /// Old Mac-style CR (`'\r'`).
    Cr,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineSeparator {
    /// Length of this separator in characters.
    pub fn len(self) -> usize {
        match self {
            LineSeparator::None => 0,
            LineSeparator::Lf | LineSeparator::Cr => 1,
            LineSeparator::Crlf => 2,
        }
    }

    /// Returns `true` for [`LineSeparator::None`].
    pub fn is_none(self) -> bool {
        self == LineSeparator::None
    }

    /// The separator's text.
    pub fn as_str(self) -> &'static str {
        match self {
            LineSeparator::None => "",
            LineSeparator::Lf => "\n",
            LineSeparator::Cr => "\r",
            LineSeparator::Crlf => "\r\n",
        }
    }
}

/// Iterator splitting text into `(line_text, separator)` pairs.
///
/// Yields N+1 pairs for N separators (matching usual editor line semantics); the final
/// pair always carries [`LineSeparator::None`]. Mixed separators in one input are
/// handled per occurrence.
#[derive(Debug, Clone)]
pub struct SeparatedText<'a> {
    rest: &'a str,
    done: bool,
}

impl<'a> Iterator for SeparatedText<'a> {
    type Item = (&'a str, LineSeparator);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.rest.find(['\r', '\n']) {
            Some(idx) => {
                let line = &self.rest[..idx];
                let tail = &self.rest[idx..];
                let separator = if tail.starts_with("\r\n") {
                    LineSeparator::Crlf
                } else if tail.starts_with('\r') {
                    LineSeparator::Cr
                } else {
                    LineSeparator::Lf
                };
                self.rest = &tail[separator.len()..];
                Some((line, separator))
            }
            None => {
                self.done = true;
                Some((self.rest, LineSeparator::None))
            }
        }
    }
}

/// Split `text` at line separators, keeping each line's separator kind.
pub fn split_separated(text: &str) -> SeparatedText<'_> {
    SeparatedText {
        rest: text,
        done: false,
    }
}
