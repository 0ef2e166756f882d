//! Immutable leaf values.
//!
//! Names and strings keep their bytes behind an `Arc`, so cloning a leaf
//! shares the buffer instead of copying it. Nothing can mutate a leaf once
//! built, which makes the sharing unobservable.

use std::borrow::Borrow;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::error::{ObjectError, ObjectResult};

// ---------------------------------------------------------------------------
// Name
// ---------------------------------------------------------------------------

/// A name object such as `/Type`. Stored without the leading slash.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    /// Create a name from its unescaped text.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(Arc::from(text.as_ref()))
    }

    /// The unescaped text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether two names share one buffer.
    pub fn shares_buffer(&self, other: &Name) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Write `/Text`, escaping delimiters, `#`, and bytes outside `!`..`~`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> ObjectResult<()> {
        out.write_all(b"/")?;
        for &byte in self.0.as_bytes() {
            if needs_name_escape(byte) {
                write!(out, "#{byte:02X}")?;
            } else {
                out.write_all(&[byte])?;
            }
        }
        Ok(())
    }
}

fn needs_name_escape(byte: u8) -> bool {
    !(b'!'..=b'~').contains(&byte) || b"()<>[]{}/%#".contains(&byte)
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Name {
    fn from(text: String) -> Self {
        Self(Arc::from(text))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

/// How a string is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StringForm {
    /// `(text)` with backslash escapes.
    #[default]
    Literal,
    /// `<48656C6C6F>`.
    Hex,
}

/// A byte string object.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PdfString {
    bytes: Arc<[u8]>,
    form: StringForm,
}

impl PdfString {
    /// A literal string.
    pub fn literal(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: Arc::from(bytes.as_ref()),
            form: StringForm::Literal,
        }
    }

    /// A hexadecimal string.
    pub fn hex(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: Arc::from(bytes.as_ref()),
            form: StringForm::Hex,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn form(&self) -> StringForm {
        self.form
    }

    /// Whether two strings share one buffer.
    pub fn shares_buffer(&self, other: &PdfString) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> ObjectResult<()> {
        match self.form {
            StringForm::Hex => {
                out.write_all(b"<")?;
                out.write_all(hex::encode_upper(&self.bytes).as_bytes())?;
                out.write_all(b">")?;
            }
            StringForm::Literal => {
                out.write_all(b"(")?;
                for &byte in self.bytes.iter() {
                    match byte {
                        b'(' | b')' | b'\\' => out.write_all(&[b'\\', byte])?,
                        b'\n' => out.write_all(b"\\n")?,
                        b'\r' => out.write_all(b"\\r")?,
                        b'\t' => out.write_all(b"\\t")?,
                        0x08 => out.write_all(b"\\b")?,
                        0x0C => out.write_all(b"\\f")?,
                        0x20..=0x7E => out.write_all(&[byte])?,
                        _ => write!(out, "\\{byte:03o}")?,
                    }
                }
                out.write_all(b")")?;
            }
        }
        Ok(())
    }
}

impl From<&str> for PdfString {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl fmt::Debug for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdfString({:?}, {:?})", String::from_utf8_lossy(&self.bytes), self.form)
    }
}

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

/// A numeric object. Integers and reals render differently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    /// The value as a float, widening integers.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Real(r) => r,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Integer(i) => Some(i),
            Number::Real(_) => None,
        }
    }

    /// Reals are written in plain decimal notation (no exponent) with at most
    /// six fractional digits and no trailing zeros.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> ObjectResult<()> {
        match *self {
            Number::Integer(i) => write!(out, "{i}")?,
            Number::Real(r) => {
                if !r.is_finite() {
                    return Err(ObjectError::NonFiniteReal(r));
                }
                let text = format!("{r:.6}");
                let text = text.trim_end_matches('0').trim_end_matches('.');
                let text = if text == "-0" || text.is_empty() { "0" } else { text };
                out.write_all(text.as_bytes())?;
            }
        }
        Ok(())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Real(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(write: impl FnOnce(&mut Vec<u8>) -> ObjectResult<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    #[test]
    fn plain_name() {
        assert_eq!(render(|o| Name::new("Type").write_to(o)), "/Type");
    }

    #[test]
    fn name_escapes_delimiters_and_spaces() {
        assert_eq!(render(|o| Name::new("A B").write_to(o)), "/A#20B");
        assert_eq!(render(|o| Name::new("a/b#c").write_to(o)), "/a#2Fb#23c");
        assert_eq!(render(|o| Name::new("(x)").write_to(o)), "/#28x#29");
    }

    #[test]
    fn name_clone_shares_buffer() {
        let a = Name::new("Catalog");
        let b = a.clone();
        assert!(a.shares_buffer(&b));
        assert!(!a.shares_buffer(&Name::new("Catalog")));
    }

    // -----------------------------------------------------------------------
    // Strings
    // -----------------------------------------------------------------------

    #[test]
    fn literal_string_escapes() {
        let s = PdfString::literal(b"a(b)c\\d\n\x01");
        assert_eq!(render(|o| s.write_to(o)), "(a\\(b\\)c\\\\d\\n\\001)");
    }

    #[test]
    fn hex_string() {
        let s = PdfString::hex(b"Hi\xff");
        assert_eq!(render(|o| s.write_to(o)), "<4869FF>");
        assert_eq!(s.form(), StringForm::Hex);
    }

    #[test]
    fn string_clone_shares_buffer() {
        let a = PdfString::from("shared");
        assert!(a.shares_buffer(&a.clone()));
    }

    // -----------------------------------------------------------------------
    // Numbers
    // -----------------------------------------------------------------------

    #[test]
    fn integers_render_plainly() {
        assert_eq!(render(|o| Number::Integer(-42).write_to(o)), "-42");
    }

    #[test]
    fn reals_trim_trailing_zeros() {
        assert_eq!(render(|o| Number::Real(1.5).write_to(o)), "1.5");
        assert_eq!(render(|o| Number::Real(2.0).write_to(o)), "2");
        assert_eq!(render(|o| Number::Real(-0.0).write_to(o)), "0");
        assert_eq!(render(|o| Number::Real(0.125).write_to(o)), "0.125");
        assert_eq!(render(|o| Number::Real(1e10).write_to(o)), "10000000000");
    }

    #[test]
    fn non_finite_real_is_rejected() {
        let mut out = Vec::new();
        assert!(matches!(
            Number::Real(f64::NAN).write_to(&mut out),
            Err(ObjectError::NonFiniteReal(_))
        ));
        assert!(Number::Real(f64::INFINITY).write_to(&mut out).is_err());
    }

    #[test]
    fn number_conversions() {
        assert_eq!(Number::Integer(3).as_f64(), 3.0);
        assert_eq!(Number::Integer(3).as_i64(), Some(3));
        assert_eq!(Number::Real(3.5).as_i64(), None);
    }
}
