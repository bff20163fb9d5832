use newt_common::String;
use std_alloc::vec::Vec;

use crate::{Code, ContentFormat, Token, Type};

/// Option string values (uri-path, uri-query, location-path) stay inline
/// up to this many bytes.
pub type OptString = String<64>;

/// A CoAP message header after option decoding.
///
/// The byte-level codec lives outside this crate; the object tree consumes
/// and produces `Header`s. Only the options the LwM2M data plane uses are
/// represented — anything else is the transport's business. Block1/Block2
/// are carried opaque so a blockwise-capable transport can round-trip them.
///
/// ```
/// use newt_msg::{code, ContentFormat, Header};
///
/// let mut req = Header::request(code::GET);
/// req.uri_path = Some("3/0/0".into());
/// req.accept = Some(ContentFormat::Text);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
  /// Con for requests, Ack/Non for responses
  pub ty: Type,
  /// Request method or response code
  pub code: Code,
  /// Token correlating response with request
  pub token: Token,
  /// Uri-Path, slash-joined without a leading slash
  pub uri_path: Option<OptString>,
  /// Uri-Query, `&`-joined `key=value` pairs
  pub uri_query: Option<OptString>,
  /// Content-Format of the payload
  pub content_format: Option<ContentFormat>,
  /// Accept: the content format the peer wants back
  pub accept: Option<ContentFormat>,
  /// Observe option value
  pub observe: Option<u32>,
  /// Max-Age response option, seconds
  pub max_age: Option<u32>,
  /// Block1 option, opaque pass-through
  pub block1: Option<u32>,
  /// Block2 option, opaque pass-through
  pub block2: Option<u32>,
  /// Location-Path response option
  pub location_path: Option<OptString>,
  /// Payload bytes
  pub payload: Vec<u8>,
}

impl Header {
  fn new(ty: Type, code: Code) -> Self {
    Self { ty,
           code,
           token: Token::default(),
           uri_path: None,
           uri_query: None,
           content_format: None,
           accept: None,
           observe: None,
           max_age: None,
           block1: None,
           block2: None,
           location_path: None,
           payload: Vec::new() }
  }

  /// Create a Confirmable request with the given method code
  pub fn request(code: Code) -> Self {
    Self::new(Type::Con, code)
  }

  /// Create a response to `req` with the given response code.
  ///
  /// A Con request gets an Ack (piggybacked response), a Non request gets
  /// a Non back; the token is copied from the request.
  ///
  /// ```
  /// use newt_msg::{code, Header, Token, Type};
  ///
  /// let mut req = Header::request(code::GET);
  /// req.token = Token::from_slice(&[1, 2]);
  ///
  /// let resp = Header::response_to(&req, code::CONTENT);
  /// assert_eq!(resp.ty, Type::Ack);
  /// assert_eq!(resp.token, req.token);
  /// ```
  pub fn response_to(req: &Header, code: Code) -> Self {
    let ty = match req.ty {
      | Type::Con => Type::Ack,
      | _ => Type::Non,
    };

    let mut resp = Self::new(ty, code);
    resp.token = req.token;
    resp
  }

  /// Create a standalone Confirmable message bearing a previously stored
  /// token (delayed responses, notifications).
  pub fn separate(token: Token, code: Code) -> Self {
    let mut msg = Self::new(Type::Con, code);
    msg.token = token;
    msg
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::code;

  #[test]
  fn non_request_gets_non_response() {
    let mut req = Header::request(code::GET);
    req.ty = Type::Non;
    assert_eq!(Header::response_to(&req, code::CONTENT).ty, Type::Non);
  }
}
