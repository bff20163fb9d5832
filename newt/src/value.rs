use core::fmt::Write;

use newt_common::String;
use std_alloc::vec::Vec;

use crate::constants::MAX_VALUE_LENGTH;
use crate::Error;

/// Declared type of a resource's leaf value
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceType {
  /// UTF-8 text, at most [`MAX_VALUE_LENGTH`] bytes outside blockwise
  String,
  /// Signed 64-bit integer
  Integer,
  /// IEEE-754 double
  Float,
  /// Boolean
  Boolean,
  /// Arbitrary bytes
  Opaque,
  /// Unsigned epoch seconds
  Time,
  /// `object-id:instance-id` link
  ObjLink,
}

/// A leaf value.
///
/// `String` and `Opaque` own their bytes; everything else is stored in its
/// native representation rather than a byte blob.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  /// No value set yet
  None,
  /// UTF-8 text bytes
  String(Vec<u8>),
  /// Signed integer
  Integer(i64),
  /// Double-precision float
  Float(f64),
  /// Boolean
  Boolean(bool),
  /// Arbitrary bytes
  Opaque(Vec<u8>),
  /// Epoch seconds
  Time(u64),
  /// Link to an object instance
  ObjLink {
    /// Target object id
    object_id: u16,
    /// Target instance id
    instance_id: u16,
  },
}

impl Default for Value {
  fn default() -> Self {
    Value::None
  }
}

impl Value {
  /// The declared type this value satisfies, `None` satisfying all
  pub fn matches(&self, kind: ResourceType) -> bool {
    match (self, kind) {
      | (Value::None, _) => true,
      | (Value::String(_), ResourceType::String) => true,
      | (Value::Integer(_), ResourceType::Integer) => true,
      | (Value::Float(_), ResourceType::Float) => true,
      | (Value::Boolean(_), ResourceType::Boolean) => true,
      | (Value::Opaque(_), ResourceType::Opaque) => true,
      | (Value::Time(_), ResourceType::Time) => true,
      | (Value::ObjLink { .. }, ResourceType::ObjLink) => true,
      | _ => false,
    }
  }

  /// Whether a value is set
  pub fn is_none(&self) -> bool {
    matches!(self, Value::None)
  }

  /// The integer if this is an `Integer` or `Time` value
  pub fn as_int(&self) -> Option<i64> {
    match self {
      | Value::Integer(i) => Some(*i),
      | Value::Time(t) => Some(*t as i64),
      | _ => None,
    }
  }

  /// The float if this is a `Float` value
  pub fn as_float(&self) -> Option<f64> {
    match self {
      | Value::Float(f) => Some(*f),
      | _ => None,
    }
  }

  /// The boolean if this is a `Boolean` value
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      | Value::Boolean(b) => Some(*b),
      | _ => None,
    }
  }

  /// The bytes if this is a `String` or `Opaque` value
  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      | Value::String(b) | Value::Opaque(b) => Some(b),
      | _ => None,
    }
  }

  /// Numeric view used by the report handler's band & step triggers
  pub(crate) fn as_numeric(&self) -> Option<f64> {
    match self {
      | Value::Integer(i) => Some(*i as f64),
      | Value::Float(f) => Some(*f),
      | Value::Time(t) => Some(*t as f64),
      | _ => None,
    }
  }

  /// Render as the `text/plain` representation: ASCII decimal for
  /// integers and times, `{}`-formatted float, `1`/`0` booleans,
  /// `obj:inst` links, raw bytes for text and opaque values.
  pub fn render_text(&self) -> Vec<u8> {
    let mut out = String::<32>::new();
    match self {
      | Value::None => Vec::new(),
      | Value::String(b) | Value::Opaque(b) => b.clone(),
      | Value::Integer(i) => {
        write!(out, "{}", i).ok();
        out.as_bytes().to_vec()
      },
      | Value::Float(f) => {
        write!(out, "{}", f).ok();
        out.as_bytes().to_vec()
      },
      | Value::Boolean(b) => {
        if *b { b"1".to_vec() } else { b"0".to_vec() }
      },
      | Value::Time(t) => {
        write!(out, "{}", t).ok();
        out.as_bytes().to_vec()
      },
      | Value::ObjLink { object_id,
                         instance_id, } => {
        write!(out, "{}:{}", object_id, instance_id).ok();
        out.as_bytes().to_vec()
      },
    }
  }

  /// Parse the `text/plain` representation of a value of declared type
  /// `kind`.
  ///
  /// ```
  /// use newt::{ResourceType, Value};
  ///
  /// assert_eq!(Value::parse_text(ResourceType::Integer, b"-42"),
  ///            Ok(Value::Integer(-42)));
  /// assert!(Value::parse_text(ResourceType::Integer, b"forty-two").is_err());
  /// ```
  pub fn parse_text(kind: ResourceType, bytes: &[u8]) -> Result<Value, Error> {
    let s = core::str::from_utf8(bytes).map_err(|_| Error::InvalidValue)?;

    match kind {
      | ResourceType::String => {
        if bytes.len() > MAX_VALUE_LENGTH {
          return Err(Error::InvalidLength);
        }
        Ok(Value::String(bytes.to_vec()))
      },
      | ResourceType::Integer => s.trim()
                                  .parse::<i64>()
                                  .map(Value::Integer)
                                  .map_err(|_| Error::InvalidValue),
      | ResourceType::Float => s.trim()
                                .parse::<f64>()
                                .map(Value::Float)
                                .map_err(|_| Error::InvalidValue),
      | ResourceType::Boolean => match s.trim() {
        | "0" => Ok(Value::Boolean(false)),
        | "1" => Ok(Value::Boolean(true)),
        | _ => Err(Error::InvalidValue),
      },
      | ResourceType::Time => s.trim()
                               .parse::<u64>()
                               .map(Value::Time)
                               .map_err(|_| Error::InvalidValue),
      | ResourceType::Opaque => Ok(Value::Opaque(bytes.to_vec())),
      | ResourceType::ObjLink => {
        let (obj, inst) = s.trim().split_once(':').ok_or(Error::InvalidValue)?;
        let object_id = obj.parse::<u16>().map_err(|_| Error::InvalidValue)?;
        let instance_id = inst.parse::<u16>().map_err(|_| Error::InvalidValue)?;
        Ok(Value::ObjLink { object_id,
                            instance_id })
      },
    }
  }

  /// Validate `value` against a declared type and length limits.
  pub(crate) fn check(value: &Value, kind: ResourceType) -> Result<(), Error> {
    if !value.matches(kind) {
      return Err(Error::InvalidType);
    }

    if let Value::String(b) = value {
      if b.len() > MAX_VALUE_LENGTH {
        return Err(Error::InvalidLength);
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn type_match() {
    assert!(Value::Integer(3).matches(ResourceType::Integer));
    assert!(Value::None.matches(ResourceType::Float));
    assert!(!Value::Integer(3).matches(ResourceType::Float));
  }

  #[test]
  fn text_round_trip() {
    assert_eq!(Value::Integer(-17).render_text(), b"-17");
    assert_eq!(Value::parse_text(ResourceType::Integer, b"-17").unwrap(),
               Value::Integer(-17));

    assert_eq!(Value::Boolean(true).render_text(), b"1");
    assert_eq!(Value::parse_text(ResourceType::Boolean, b"0").unwrap(),
               Value::Boolean(false));

    assert_eq!(Value::ObjLink { object_id: 3,
                                instance_id: 0 }.render_text(),
               b"3:0");
    assert_eq!(Value::parse_text(ResourceType::ObjLink, b"3:0").unwrap(),
               Value::ObjLink { object_id: 3,
                                instance_id: 0 });
  }

  #[test]
  fn oversized_string_rejected() {
    let big = std_alloc::vec![b'a'; MAX_VALUE_LENGTH + 1];
    assert_eq!(Value::parse_text(ResourceType::String, &big),
               Err(Error::InvalidLength));
    assert_eq!(Value::check(&Value::String(big), ResourceType::String),
               Err(Error::InvalidLength));
  }
}
