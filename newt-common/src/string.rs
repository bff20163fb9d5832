use core::fmt::{Display, Write};
use core::ops::Deref;

use tinyvec::TinyVec;

/// Error yielded when bytes are not valid UTF-8
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash, Debug, Default)]
pub struct FromUtf8Error;

/// Owned UTF-8 string with a small-buffer optimization.
///
/// Contents up to `N` bytes live inline; longer strings spill to the heap.
/// Node names and paths in an LwM2M tree are nearly always a handful of
/// bytes, so the common case never allocates.
///
/// Has many of the same inherent functions as [`std::string::String`].
///
/// ```
/// use newt_common::String;
///
/// let mut s = String::<16>::from("3/0");
/// s.push('/');
/// s.push_str("9");
/// assert_eq!(s, "3/0/9");
/// ```
#[derive(Clone, Default)]
pub struct String<const N: usize>(TinyVec<[u8; N]>);

impl<const N: usize> String<N> {
  /// Creates a new empty string
  pub fn new() -> Self {
    Default::default()
  }

  /// Gets a string slice containing the entire [`String`]
  pub fn as_str(&self) -> &str {
    self.as_ref()
  }

  /// Alias for [`AsRef<[u8]>`]
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_ref()
  }

  /// Number of bytes in the string
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Whether the string is empty
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Truncates this [`String`], removing all contents.
  pub fn clear(&mut self) {
    self.0.clear()
  }

  /// Creates a [`String`] using the output of [`format_args`]
  pub fn fmt(args: core::fmt::Arguments) -> Self {
    let mut s = Self::new();
    s.write_fmt(args).ok();
    s
  }

  /// Copy a slice of bytes to a `String`, checking that
  /// they are valid UTF-8.
  ///
  /// ```
  /// use newt_common::String;
  ///
  /// assert_eq!(String::<16>::from_utf8(b"device").unwrap(), "device");
  /// assert!(String::<16>::from_utf8(&[0, 159, 146, 150]).is_err());
  /// ```
  pub fn from_utf8(bytes: &[u8]) -> Result<Self, FromUtf8Error> {
    match core::str::from_utf8(bytes) {
      | Ok(s) => Ok(Self::from(s)),
      | Err(_) => Err(FromUtf8Error),
    }
  }

  /// Appends the given [`char`] to the end of this `String`.
  pub fn push(&mut self, ch: char) {
    match ch.len_utf8() {
      | 1 => self.0.push(ch as u8),
      | _ => self.0
                 .extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes()),
    }
  }

  /// Appends a given string slice onto the end of this `String`.
  pub fn push_str(&mut self, string: &str) {
    self.0.extend_from_slice(string.as_bytes())
  }
}

/// [`String`]-returning copy of [`std::format`]
///
/// ```
/// use newt_common::{format, String};
/// assert_eq!(format!(32, "{}/{}", 3, 0), String::<32>::from("3/0"));
/// ```
#[macro_export]
macro_rules! format {
  ($cap:literal, $($arg:tt)*) => {
    $crate::String::<$cap>::fmt(format_args!($($arg)*))
  };
}

impl<const N: usize> core::fmt::Debug for String<N> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    write!(f, "{:?}", self.as_str())
  }
}

impl<const N: usize> Display for String<N> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl<const N: usize> core::fmt::Write for String<N> {
  fn write_str(&mut self, s: &str) -> core::fmt::Result {
    self.0.extend_from_slice(s.as_bytes());
    Ok(())
  }
}

impl<'a, const N: usize> From<&'a str> for String<N> {
  fn from(s: &'a str) -> Self {
    let mut bytes = TinyVec::default();
    bytes.extend_from_slice(s.as_bytes());
    Self(bytes)
  }
}

impl<const N: usize> Deref for String<N> {
  type Target = str;
  fn deref(&self) -> &str {
    self.as_str()
  }
}

impl<const N: usize> AsRef<str> for String<N> {
  fn as_ref(&self) -> &str {
    // constructors only admit valid UTF-8
    core::str::from_utf8(&self.0).unwrap()
  }
}

impl<const N: usize> AsRef<[u8]> for String<N> {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl<const N: usize> PartialEq for String<N> {
  fn eq(&self, other: &Self) -> bool {
    self.as_str() == other.as_str()
  }
}

impl<const N: usize> Eq for String<N> {}

impl<const N: usize> core::hash::Hash for String<N> {
  fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
    self.as_str().hash(state)
  }
}

impl<const N: usize> PartialEq<&str> for String<N> {
  fn eq(&self, other: &&str) -> bool {
    self.as_str() == *other
  }
}

impl<const N: usize> PartialEq<str> for String<N> {
  fn eq(&self, other: &str) -> bool {
    self.as_str() == other
  }
}

impl<const N: usize> PartialEq<String<N>> for &str {
  fn eq(&self, other: &String<N>) -> bool {
    *self == other.as_str()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn small_strings_stay_inline() {
    let s = String::<8>::from("3/0/9");
    assert_eq!(s, "3/0/9");
    assert!(matches!(s.0, TinyVec::Inline(_)));
  }

  #[test]
  fn long_strings_spill() {
    let long = "0123456789abcdef0123456789abcdef";
    let s = String::<8>::from(long);
    assert_eq!(s, long);
    assert!(matches!(s.0, TinyVec::Heap(_)));
  }

  #[test]
  fn format_macro() {
    assert_eq!(crate::format!(32, "{}/{}/{}", 3, 0, 9), "3/0/9");
  }
}
