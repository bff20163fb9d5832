/// Content-Format
///
/// The OMA LwM2M subset of the CoAP Content-Format registry, plus the
/// pre-registration TLV value (99) that older servers still send.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentFormat {
  /// `text/plain; charset=utf-8`
  Text,
  /// `application/octet-stream`
  Opaque,
  /// `application/vnd.oma.lwm2m+tlv`, legacy pre-registration value
  TlvOld,
  /// `application/vnd.oma.lwm2m+tlv`
  Tlv,
  /// `application/vnd.oma.lwm2m+json`
  Json,
  /// Another content format
  Other(u16),
}

impl ContentFormat {
  /// Whether this format is one of the two OMA TLV registrations
  pub fn is_tlv(&self) -> bool {
    matches!(self, ContentFormat::Tlv | ContentFormat::TlvOld)
  }
}

impl<'a> From<&'a ContentFormat> for u16 {
  fn from(f: &'a ContentFormat) -> Self {
    use ContentFormat::*;
    match *f {
      | Text => 0,
      | Opaque => 42,
      | TlvOld => 99,
      | Tlv => 11542,
      | Json => 11543,
      | Other(n) => n,
    }
  }
}

impl From<ContentFormat> for u16 {
  fn from(f: ContentFormat) -> Self {
    u16::from(&f)
  }
}

impl From<u16> for ContentFormat {
  fn from(n: u16) -> Self {
    use ContentFormat::*;
    match n {
      | 0 => Text,
      | 42 => Opaque,
      | 99 => TlvOld,
      | 11542 => Tlv,
      | 11543 => Json,
      | n => Other(n),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_registry_values() {
    for n in [0u16, 42, 99, 11542, 11543, 50] {
      assert_eq!(u16::from(ContentFormat::from(n)), n);
    }
  }

  #[test]
  fn tlv_check() {
    assert!(ContentFormat::Tlv.is_tlv());
    assert!(ContentFormat::TlvOld.is_tlv());
    assert!(!ContentFormat::Text.is_tlv());
  }
}
