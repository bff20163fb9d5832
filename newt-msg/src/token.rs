use tinyvec::ArrayVec;

/// # Message Token
///
/// 0-8 opaque bytes correlating a response (or notification) with the
/// request that caused it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// Copy up to 8 bytes into an owned token
  ///
  /// ```
  /// use newt_msg::Token;
  ///
  /// assert_eq!(Token::from_slice(&[0xAB, 0xCD]),
  ///            Token(tinyvec::array_vec!([u8; 8] => 0xAB, 0xCD)));
  /// ```
  pub fn from_slice(bytes: &[u8]) -> Self {
    let mut arr = ArrayVec::new();
    for b in bytes.iter().take(8) {
      arr.push(*b);
    }
    Token(arr)
  }

  /// Whether this token is zero-length
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
