/// Number of edge slots per node: `a`..`z` plus one shared bucket.
pub const ALPHABET_SIZE: usize = 27;

/// One edge label of the trie.
///
/// Lowercase ASCII letters map to their own slot; every other character
/// (digits, punctuation, uppercase, stray whitespace) lands in
/// [`Symbol::CATCH_ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u8);

impl Symbol {
    pub const CATCH_ALL: Symbol = Symbol(26);

    pub fn from_char(ch: char) -> Self {
        if ch.is_ascii_lowercase() {
            Symbol(ch as u8 - b'a')
        } else {
            Self::CATCH_ALL
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_catch_all(self) -> bool {
        self == Self::CATCH_ALL
    }

    /// Printable form used in dumps; the shared bucket renders as `$`.
    pub fn to_char(self) -> char {
        if self.is_catch_all() {
            '$'
        } else {
            (b'a' + self.0) as char
        }
    }
}
