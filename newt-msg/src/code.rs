/// # Message Code
///
/// The CoAP code registry packs a 3-bit class and 5-bit detail into one byte,
/// conventionally written `class.detail` (e.g. `2.05 Content`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Code {
  /// The "class" of message code (request, success response, client error, server error)
  pub class: u8,
  /// 5-bit detail
  pub detail: u8,
}

/// Whether a code is for a request, response, or empty message
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CodeKind {
  /// A request code (0.01-0.31)
  Request,
  /// A response code (1.00-5.31)
  Response,
  /// EMPTY (0.00)
  Empty,
}

impl Code {
  /// Create a new Code
  pub const fn new(class: u8, detail: u8) -> Self {
    Self { class, detail }
  }

  /// Whether this code is for a request, response, or empty message
  pub fn kind(&self) -> CodeKind {
    match (self.class, self.detail) {
      | (0, 0) => CodeKind::Empty,
      | (0, _) => CodeKind::Request,
      | _ => CodeKind::Response,
    }
  }

  /// Short human-readable reason for a response code, for trace output
  pub fn to_human(&self) -> &'static str {
    match (self.class, self.detail) {
      | (2, 01) => "created",
      | (2, 02) => "deleted",
      | (2, 03) => "valid",
      | (2, 04) => "changed",
      | (2, 05) => "content",
      | (4, 00) => "bad-request",
      | (4, 01) => "response-unauthorized",
      | (4, 02) => "bad-option",
      | (4, 03) => "response-forbidden",
      | (4, 04) => "not-found",
      | (4, 05) => "method-not-allowed",
      | (4, 06) => "not-acceptable",
      | (4, 08) => "request-entity-incomplete",
      | (4, 12) => "precondition-failed",
      | (4, 13) => "request-entity-too-large",
      | (4, 15) => "unsupported-content-format",
      | (5, 00) => "internal-server-error",
      | (5, 02) => "bad-gateway",
      | (5, 03) => "service-unavailable",
      | (5, 04) => "gateway-timeout",
      | (5, 05) => "proxying-not-supported",
      | _ => "no-error",
    }
  }
}

macro_rules! code {
  (rfc7252($section:literal) $name:ident = $c:literal.$d:literal) => {
    #[doc = concat!("[RFC7252 §", $section, "]")]
    #[doc = concat!("(https://datatracker.ietf.org/doc/html/rfc7252#section-", $section, ")")]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: Code = Code::new($c, $d);
  };
}

// requests
code!(rfc7252("5.8.1") GET    = 0 . 01);
code!(rfc7252("5.8.2") POST   = 0 . 02);
code!(rfc7252("5.8.3") PUT    = 0 . 03);
code!(rfc7252("5.8.4") DELETE = 0 . 04);

// 2.xx
code!(rfc7252("5.9.1.1") CREATED = 2 . 01);
code!(rfc7252("5.9.1.2") DELETED = 2 . 02);
code!(rfc7252("5.9.1.3") VALID   = 2 . 03);
code!(rfc7252("5.9.1.4") CHANGED = 2 . 04);
code!(rfc7252("5.9.1.5") CONTENT = 2 . 05);

// 4.xx
code!(rfc7252("5.9.2.1")  BAD_REQUEST                = 4 . 00);
code!(rfc7252("5.9.2.5")  NOT_FOUND                  = 4 . 04);
code!(rfc7252("5.9.2.6")  METHOD_NOT_ALLOWED         = 4 . 05);
code!(rfc7252("5.9.2.7")  NOT_ACCEPTABLE             = 4 . 06);
code!(rfc7252("5.9.2.9")  REQUEST_ENTITY_TOO_LARGE   = 4 . 13);
code!(rfc7252("5.9.2.10") UNSUPPORTED_CONTENT_FORMAT = 4 . 15);

// 5.xx
code!(rfc7252("5.9.3.1") INTERNAL_SERVER_ERROR = 5 . 00);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind() {
    assert_eq!(Code::new(0, 0).kind(), CodeKind::Empty);
    assert_eq!(GET.kind(), CodeKind::Request);
    assert_eq!(CONTENT.kind(), CodeKind::Response);
    assert_eq!(METHOD_NOT_ALLOWED.kind(), CodeKind::Response);
  }

  #[test]
  fn human_reasons() {
    assert_eq!(NOT_ACCEPTABLE.to_human(), "not-acceptable");
    assert_eq!(UNSUPPORTED_CONTENT_FORMAT.to_human(),
               "unsupported-content-format");
    assert_eq!(Code::new(0, 1).to_human(), "no-error");
  }
}
