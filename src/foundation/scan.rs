//! Tolerant numeric scanning shared by the path, transform, point-list and color grammars.
//!
//! Numbers are an optional sign, an integer part and an optional fraction. Exponents are not
//! recognized. Whitespace, `,`, `(` and `)` separate values.

use smallvec::SmallVec;

#[derive(Clone, Debug)]
pub(crate) struct NumScanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> NumScanner<'a> {
    pub(crate) fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) {
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos.min(self.bytes.len())..]
    }

    pub(crate) fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if c <= b' ' || c == b',' || c == b'(' || c == b')' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// True when a number starts at the current position (separators are not skipped).
    pub(crate) fn at_number(&self) -> bool {
        let next_is_digit = |off: usize| {
            self.bytes
                .get(self.pos + off)
                .is_some_and(|c| c.is_ascii_digit())
        };
        match self.peek() {
            Some(b'-') | Some(b'+') => {
                next_is_digit(1)
                    || (self.bytes.get(self.pos + 1) == Some(&b'.') && next_is_digit(2))
            }
            Some(b'.') => next_is_digit(1),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    /// Read the next number after any separators. Nothing is consumed beyond the separators
    /// when no number starts there.
    pub(crate) fn number(&mut self) -> Option<f64> {
        self.skip_separators();
        if !self.at_number() {
            return None;
        }

        let mut sign = 1.0;
        match self.peek() {
            Some(b'-') => {
                sign = -1.0;
                self.pos += 1;
            }
            Some(b'+') => self.pos += 1,
            _ => {}
        }

        let mut value = 0.0f64;
        while let Some(c) = self.peek().filter(u8::is_ascii_digit) {
            value = value * 10.0 + f64::from(c - b'0');
            self.pos += 1;
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            let mut scale = 0.1f64;
            while let Some(c) = self.peek().filter(u8::is_ascii_digit) {
                value += f64::from(c - b'0') * scale;
                scale *= 0.1;
                self.pos += 1;
            }
        }

        Some(sign * value)
    }

    /// Read a run of numbers, stopping at the first character that is neither numeric nor a
    /// separator.
    pub(crate) fn run(&mut self) -> SmallVec<[f64; 8]> {
        let mut out = SmallVec::new();
        while let Some(v) = self.number() {
            out.push(v);
        }
        out
    }

    /// Read exactly `N` values; values that are absent read as zero. Returns how many were found.
    pub(crate) fn numbers<const N: usize>(&mut self) -> ([f64; N], usize) {
        let mut out = [0.0; N];
        let mut found = 0;
        for slot in out.iter_mut() {
            match self.number() {
                Some(v) => {
                    *slot = v;
                    found += 1;
                }
                None => break,
            }
        }
        (out, found)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/scan.rs"]
mod tests;
