use std_alloc::vec::Vec;

use super::{ID16, LENGTH16, LENGTH24, LENGTH8, TYPE_MULTIPLE_RESOURCE, TYPE_OBJECT_INSTANCE,
            TYPE_RESOURCE, TYPE_RESOURCE_INSTANCE};
use crate::object::Object;
use crate::object_instance::ObjectInstance;
use crate::resource::Resource;
use crate::value::Value;
use crate::Error;

/// Serialize a whole object: one Object-Instance entry per instance, each
/// wrapping its resources.
pub fn serialize_object(object: &Object) -> Result<Vec<u8>, Error> {
  let mut out = Vec::new();

  for instance in object.instances() {
    let inner = serialize_object_instance(instance)?;
    write_entry(&mut out, TYPE_OBJECT_INSTANCE, instance.instance_id(), &inner)?;
  }

  Ok(out)
}

/// Serialize an object instance: its resources back to back, multi-instance
/// resources wrapped in a Multiple-Resource entry.
pub fn serialize_object_instance(instance: &ObjectInstance) -> Result<Vec<u8>, Error> {
  let mut out = Vec::new();

  for resource in instance.resources() {
    write_resource(&mut out, resource)?;
  }

  Ok(out)
}

/// Serialize a lone resource.
///
/// A single-instance resource becomes one Resource entry. A multi-instance
/// resource addressed directly serializes as its bare Resource-Instance
/// entries, without the Multiple-Resource wrapper the object-instance level
/// would add.
pub fn serialize_resource(resource: &Resource) -> Result<Vec<u8>, Error> {
  let mut out = Vec::new();

  if resource.supports_multiple_instances() {
    for ri in resource.instances() {
      let bytes = value_bytes(ri.value());
      write_entry(&mut out, TYPE_RESOURCE_INSTANCE, ri.instance_id(), &bytes)?;
    }
  } else {
    write_resource(&mut out, resource)?;
  }

  Ok(out)
}

/// One entry of the given entity type holding a single encoded value
pub(crate) fn serialize_value_entry(ty: u8, id: u16, value: &Value) -> Result<Vec<u8>, Error> {
  let mut out = Vec::new();
  let bytes = value_bytes(value);
  write_entry(&mut out, ty, id, &bytes)?;
  Ok(out)
}

fn write_resource(out: &mut Vec<u8>, resource: &Resource) -> Result<(), Error> {
  let id = resource.base().name_id().unwrap_or(0);

  if resource.supports_multiple_instances() {
    let mut inner = Vec::new();
    for ri in resource.instances() {
      let bytes = value_bytes(ri.value());
      write_entry(&mut inner, TYPE_RESOURCE_INSTANCE, ri.instance_id(), &bytes)?;
    }
    write_entry(out, TYPE_MULTIPLE_RESOURCE, id, &inner)
  } else {
    let bytes = value_bytes(resource.value());
    write_entry(out, TYPE_RESOURCE, id, &bytes)
  }
}

fn write_entry(out: &mut Vec<u8>, ty: u8, id: u16, value: &[u8]) -> Result<(), Error> {
  out.try_reserve(6 + value.len()).map_err(|_| Error::OutOfMemory)?;

  let mut t = ty;
  if id > 0xFF {
    t |= ID16;
  }

  match value.len() {
    | n @ 0..=7 => t |= n as u8,
    | n if n <= 0xFF => t |= LENGTH8,
    | n if n <= 0xFFFF => t |= LENGTH16,
    | n if n <= 0xFF_FFFF => t |= LENGTH24,
    | _ => return Err(Error::InvalidLength),
  }

  out.push(t);

  if id > 0xFF {
    out.extend_from_slice(&id.to_be_bytes());
  } else {
    out.push(id as u8);
  }

  match value.len() {
    | 0..=7 => (),
    | n if n <= 0xFF => out.push(n as u8),
    | n if n <= 0xFFFF => out.extend_from_slice(&(n as u16).to_be_bytes()),
    | n => out.extend_from_slice(&(n as u32).to_be_bytes()[1..]),
  }

  out.extend_from_slice(value);
  Ok(())
}

/// Integers and times take the narrowest of 1/2/4/8 two's-complement
/// bytes, floats 4 bytes when exactly representable in single precision,
/// booleans one byte, text and opaque values their raw bytes.
fn value_bytes(value: &Value) -> Vec<u8> {
  match value {
    | Value::None => Vec::new(),
    | Value::String(b) | Value::Opaque(b) => b.clone(),
    | Value::Integer(i) => int_bytes(*i),
    | Value::Time(t) => int_bytes(*t as i64),
    | Value::Boolean(b) => std_alloc::vec![*b as u8],
    | Value::Float(f) => {
      if (*f as f32) as f64 == *f {
        (*f as f32).to_be_bytes().to_vec()
      } else {
        f.to_be_bytes().to_vec()
      }
    },
    | Value::ObjLink { object_id,
                       instance_id, } => {
      let mut b = object_id.to_be_bytes().to_vec();
      b.extend_from_slice(&instance_id.to_be_bytes());
      b
    },
  }
}

fn int_bytes(v: i64) -> Vec<u8> {
  if v >= i8::MIN as i64 && v <= i8::MAX as i64 {
    std_alloc::vec![v as u8]
  } else if v >= i16::MIN as i64 && v <= i16::MAX as i64 {
    (v as i16).to_be_bytes().to_vec()
  } else if v >= i32::MIN as i64 && v <= i32::MAX as i64 {
    (v as i32).to_be_bytes().to_vec()
  } else {
    v.to_be_bytes().to_vec()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::device_tree;
  use crate::value::ResourceType;

  #[test]
  fn integer_width_ladder() {
    assert_eq!(int_bytes(0), [0x00]);
    assert_eq!(int_bytes(127), [0x7F]);
    assert_eq!(int_bytes(-1), [0xFF]);
    assert_eq!(int_bytes(128), [0x00, 0x80]);
    assert_eq!(int_bytes(-32_768), [0x80, 0x00]);
    assert_eq!(int_bytes(1_000_000), [0x00, 0x0F, 0x42, 0x40]);
    assert_eq!(int_bytes(1 << 40).len(), 8);
  }

  #[test]
  fn multi_resource_serializes_bare_at_resource_level() {
    // power sources {0 -> 1, 1 -> 5}
    let mut tree = device_tree();
    let r = tree.object_mut(3u16)
                .unwrap()
                .instance_mut(0)
                .unwrap()
                .resource_mut(6u16)
                .unwrap();

    assert_eq!(serialize_resource(r).unwrap(),
               [0x41, 0x00, 0x01, 0x41, 0x01, 0x05]);
  }

  #[test]
  fn multi_resource_wrapped_at_instance_level() {
    let mut tree = device_tree();
    let oi = tree.object_mut(3u16).unwrap().instance_mut(0).unwrap();

    let bytes = serialize_object_instance(oi).unwrap();
    let at = bytes.windows(2)
                  .position(|w| w == [0x86, 0x06])
                  .expect("multiple-resource header for id 6");
    assert_eq!(&bytes[at..at + 8],
               [0x86, 0x06, 0x41, 0x00, 0x01, 0x41, 0x01, 0x05]);
  }

  #[test]
  fn sixteen_bit_ids_flagged() {
    let mut out = Vec::new();
    write_entry(&mut out, TYPE_RESOURCE, 5850, b"x").unwrap();
    assert_eq!(out, [0xC0 | ID16 | 1, 0x16, 0xDA, b'x']);
  }

  #[test]
  fn long_values_use_explicit_length() {
    let mut out = Vec::new();
    let value = [0xAAu8; 300];
    write_entry(&mut out, TYPE_RESOURCE, 0, &value).unwrap();
    assert_eq!(out[0], 0xC0 | LENGTH16);
    assert_eq!(out[1], 0);
    assert_eq!(&out[2..4], (300u16).to_be_bytes());
    assert_eq!(out.len(), 4 + 300);
  }

  #[test]
  fn float_width_follows_precision() {
    let half = value_bytes(&Value::Float(0.5));
    assert_eq!(half.len(), 4);

    let third = value_bytes(&Value::Float(1.0 / 3.0));
    assert_eq!(third.len(), 8);
  }

  #[test]
  fn object_level_wraps_instances() {
    let mut tree = crate::Tree::new();
    let object = tree.create_object(3).unwrap();
    let oi = object.create_instance(0).unwrap();
    oi.create_static_resource(9u16, ResourceType::Integer, Value::Integer(64), false)
      .unwrap();

    let bytes = serialize_object(tree.object("3").unwrap()).unwrap();
    //           obj-inst id 0, len 3  resource 9, len 1, 64
    assert_eq!(bytes, [0x03, 0x00, 0xC1, 0x09, 0x40]);
  }
}
