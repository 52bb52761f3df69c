//! Identifier quoting.
//!
//! Quoting is a pure function of a [`QuoteStyle`]; there is no process-wide
//! quoting state.
//!
//! Embedded quote characters are **not** escaped. Identifiers that contain the
//! style's own quote character are not supported.

use serde::Deserialize;

/// How identifiers are wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `"name"` (SQLite / ANSI)
    #[default]
    Double,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

impl QuoteStyle {
    /// Opening and closing characters.
    pub fn delimiters(self) -> (char, char) {
        match self {
            QuoteStyle::Double => ('"', '"'),
            QuoteStyle::Backtick => ('`', '`'),
            QuoteStyle::Bracket => ('[', ']'),
        }
    }

    /// Wrap `name` in this style's delimiters.
    pub fn quote(self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_quoted(&mut out, name);
        out
    }

    pub(crate) fn write_quoted(self, out: &mut String, name: &str) {
        let (open, close) = self.delimiters();
        out.push(open);
        out.push_str(name);
        out.push(close);
    }
}

/// Quote an identifier with the default (double-quote) style.
pub fn quote(name: &str) -> String {
    QuoteStyle::Double.quote(name)
}
