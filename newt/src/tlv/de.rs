use newt_common::Cursor;

use super::{ID16, INLINE_LENGTH_MASK, LENGTH16, LENGTH24, LENGTH8, LENGTH_MASK,
            TYPE_MASK, TYPE_MULTIPLE_RESOURCE, TYPE_OBJECT_INSTANCE, TYPE_RESOURCE,
            TYPE_RESOURCE_INSTANCE};
use crate::base::Operation;
use crate::constants::MAX_VALUE_LENGTH;
use crate::object::Object;
use crate::object_instance::ObjectInstance;
use crate::resource::Resource;
use crate::value::{ResourceType, Value};

/// Deserialization verdicts, mapped by the dispatcher onto 4.04 / 4.05 /
/// 4.00 / 4.13 / 4.06 respectively
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Error {
  /// An id referred to a child that does not exist and the write
  /// semantics require existence
  NotFound,
  /// The payload asked for something the tree refuses: creating a node
  /// that cannot be created, or writing a non-writable resource
  NotAllowed,
  /// Malformed header, length overrun, or a value that does not fit the
  /// declared type
  NotValid,
  /// Buffer growth failed or a value exceeds its length cap
  OutOfMemory,
  /// A resource-specific rule rejected the value
  NotAccepted,
}

/// Write semantics applied while walking the payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
  /// Update existing nodes only
  Put,
  /// Creation of instances is permitted
  Post,
}

struct Entry<'a> {
  ty: u8,
  id: u16,
  value: &'a [u8],
}

/// Whether the payload leads with an Object-Instance entry
pub fn is_object_instance(bytes: &[u8]) -> bool {
  leads_with(bytes, TYPE_OBJECT_INSTANCE)
}

/// Whether the payload leads with a single-Resource entry
pub fn is_resource(bytes: &[u8]) -> bool {
  leads_with(bytes, TYPE_RESOURCE)
}

/// Whether the payload leads with a Multiple-Resource entry
pub fn is_multiple_resource(bytes: &[u8]) -> bool {
  leads_with(bytes, TYPE_MULTIPLE_RESOURCE)
}

/// Whether the payload leads with a Resource-Instance entry
pub fn is_resource_instance(bytes: &[u8]) -> bool {
  leads_with(bytes, TYPE_RESOURCE_INSTANCE)
}

fn leads_with(bytes: &[u8], ty: u8) -> bool {
  matches!(bytes.first(), Some(b) if b & TYPE_MASK == ty)
}

/// Walk a payload of Object-Instance entries into `object`.
///
/// `Put` writes into existing instances; `Post` creates missing ones
/// (creating *resources* is never permitted — their types are not on the
/// wire, the application defines them).
pub fn deserialize_object_instances(bytes: &[u8],
                                    object: &mut Object,
                                    mode: Mode)
                                    -> Result<(), Error> {
  let mut cursor = Cursor::new(bytes);

  while !cursor.is_exhausted() {
    let entry = next_entry(&mut cursor)?;

    if entry.ty != TYPE_OBJECT_INSTANCE {
      return Err(Error::NotValid);
    }

    match (object.instance_mut(entry.id).is_some(), mode) {
      | (true, Mode::Put) => {
        let instance = object.instance_mut(entry.id).unwrap();
        deserialize_resources(entry.value, instance, mode)?;
      },
      | (true, Mode::Post) => return Err(Error::NotAllowed),
      | (false, Mode::Put) => return Err(Error::NotFound),
      | (false, Mode::Post) => {
        let instance = object.create_instance(entry.id).map_err(map_tree_error)?;
        deserialize_resources(entry.value, instance, mode)?;
      },
    }
  }

  Ok(())
}

/// Walk a payload of Resource / Multiple-Resource entries into `instance`
pub fn deserialize_resources(bytes: &[u8],
                             instance: &mut ObjectInstance,
                             mode: Mode)
                             -> Result<(), Error> {
  let mut cursor = Cursor::new(bytes);

  while !cursor.is_exhausted() {
    let entry = next_entry(&mut cursor)?;

    let resource = match instance.resource_mut(entry.id) {
      | Some(r) => r,
      | None => return Err(Error::NotAllowed),
    };

    if !resource.base().operation().allows(Operation::PUT) {
      return Err(Error::NotAllowed);
    }

    match entry.ty {
      | TYPE_RESOURCE => {
        if resource.supports_multiple_instances() {
          return Err(Error::NotValid);
        }
        if let Some(v) = decode_value(resource.resource_type(), entry.value)? {
          resource.set_value(v).map_err(map_tree_error)?;
        }
      },
      | TYPE_MULTIPLE_RESOURCE => {
        if !resource.supports_multiple_instances() {
          return Err(Error::NotValid);
        }
        deserialize_instances_into(entry.value, resource, mode)?;
      },
      | _ => return Err(Error::NotValid),
    }
  }

  Ok(())
}

/// Write a payload carrying one Resource entry into a single-instance
/// resource. A multi-instance resource delegates to
/// [`deserialize_resource_instances`].
pub fn deserialize_resource(bytes: &[u8], resource: &mut Resource, mode: Mode) -> Result<(), Error> {
  if resource.supports_multiple_instances() {
    return deserialize_resource_instances(bytes, resource, mode);
  }

  match deserialize_single(bytes, resource.base().name_id(), resource.resource_type())? {
    | Some(v) => resource.set_value(v).map_err(map_tree_error),
    | None => Ok(()),
  }
}

/// Walk a payload of Resource-Instance entries (optionally wrapped in a
/// Multiple-Resource entry) into a multi-instance resource. `Put`
/// requires each instance to exist; `Post` creates missing ones.
pub fn deserialize_resource_instances(bytes: &[u8],
                                      resource: &mut Resource,
                                      mode: Mode)
                                      -> Result<(), Error> {
  if !resource.supports_multiple_instances() {
    return Err(Error::NotAllowed);
  }

  if is_multiple_resource(bytes) {
    let mut cursor = Cursor::new(bytes);
    let entry = next_entry(&mut cursor)?;

    if !cursor.is_exhausted() {
      return Err(Error::NotValid);
    }
    if Some(entry.id) != resource.base().name_id() {
      return Err(Error::NotFound);
    }

    return deserialize_instances_into(entry.value, resource, mode);
  }

  deserialize_instances_into(bytes, resource, mode)
}

fn deserialize_instances_into(bytes: &[u8], resource: &mut Resource, mode: Mode) -> Result<(), Error> {
  let mut cursor = Cursor::new(bytes);

  while !cursor.is_exhausted() {
    let entry = next_entry(&mut cursor)?;

    if entry.ty != TYPE_RESOURCE_INSTANCE {
      return Err(Error::NotValid);
    }

    let value = decode_value(resource.resource_type(), entry.value)?;

    if resource.instance(entry.id).is_none() {
      match mode {
        | Mode::Put => return Err(Error::NotFound),
        | Mode::Post => {
          resource.create_instance(entry.id).map_err(map_tree_error)?;
        },
      }
    }

    if let Some(v) = value {
      if let Some(instance) = resource.instance_mut(entry.id) {
        instance.set_value(v).map_err(map_tree_error)?;
      }
    }
  }

  Ok(())
}

/// Decode a payload holding exactly one Resource or Resource-Instance
/// entry. `Ok(None)` means the entry was present with an absent value
/// (zero-length numeric), which leaves the target untouched.
pub(crate) fn deserialize_single(bytes: &[u8],
                                 expected_id: Option<u16>,
                                 kind: ResourceType)
                                 -> Result<Option<Value>, Error> {
  let mut cursor = Cursor::new(bytes);
  let entry = next_entry(&mut cursor)?;

  if !cursor.is_exhausted() {
    return Err(Error::NotValid);
  }
  if entry.ty != TYPE_RESOURCE && entry.ty != TYPE_RESOURCE_INSTANCE {
    return Err(Error::NotValid);
  }
  if matches!(expected_id, Some(id) if id != entry.id) {
    return Err(Error::NotFound);
  }

  decode_value(kind, entry.value)
}

fn next_entry<'a>(cursor: &mut Cursor<&'a [u8]>) -> Result<Entry<'a>, Error> {
  let byte0 = cursor.next().ok_or(Error::NotValid)?;
  let ty = byte0 & TYPE_MASK;

  let id = if byte0 & ID16 != 0 {
    let bytes = cursor.take_exact(2).ok_or(Error::NotValid)?;
    u16::from_be_bytes([bytes[0], bytes[1]])
  } else {
    cursor.next().ok_or(Error::NotValid)? as u16
  };

  let len = match byte0 & LENGTH_MASK {
    | LENGTH8 => cursor.next().ok_or(Error::NotValid)? as usize,
    | LENGTH16 => {
      let bytes = cursor.take_exact(2).ok_or(Error::NotValid)?;
      u16::from_be_bytes([bytes[0], bytes[1]]) as usize
    },
    | LENGTH24 => {
      let bytes = cursor.take_exact(3).ok_or(Error::NotValid)?;
      u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]) as usize
    },
    | _ => (byte0 & INLINE_LENGTH_MASK) as usize,
  };

  let value = cursor.take_slice(len).ok_or(Error::NotValid)?;

  Ok(Entry { ty, id, value })
}

fn decode_value(kind: ResourceType, bytes: &[u8]) -> Result<Option<Value>, Error> {
  match kind {
    | ResourceType::Integer => decode_int(bytes).map(|v| v.map(Value::Integer)),
    | ResourceType::Time => decode_int(bytes).map(|v| v.map(|i| Value::Time(i as u64))),
    | ResourceType::Float => match bytes.len() {
      | 0 => Ok(None),
      | 4 => Ok(Some(Value::Float(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
                                  as f64))),
      | 8 => {
        let mut b = [0u8; 8];
        b.copy_from_slice(bytes);
        Ok(Some(Value::Float(f64::from_be_bytes(b))))
      },
      | _ => Err(Error::NotValid),
    },
    | ResourceType::Boolean => match bytes {
      | [0] => Ok(Some(Value::Boolean(false))),
      | [1] => Ok(Some(Value::Boolean(true))),
      | _ => Err(Error::NotValid),
    },
    | ResourceType::String => {
      if bytes.len() > MAX_VALUE_LENGTH {
        return Err(Error::OutOfMemory);
      }
      Ok(Some(Value::String(bytes.to_vec())))
    },
    | ResourceType::Opaque => Ok(Some(Value::Opaque(bytes.to_vec()))),
    | ResourceType::ObjLink => match bytes {
      | [a, b, c, d] => Ok(Some(Value::ObjLink { object_id: u16::from_be_bytes([*a, *b]),
                                                 instance_id: u16::from_be_bytes([*c, *d]) })),
      | _ => Err(Error::NotValid),
    },
  }
}

// a zero-length integer value is "absent", not zero
fn decode_int(bytes: &[u8]) -> Result<Option<i64>, Error> {
  match bytes.len() {
    | 0 => Ok(None),
    | 1 => Ok(Some(bytes[0] as i8 as i64)),
    | 2 => Ok(Some(i16::from_be_bytes([bytes[0], bytes[1]]) as i64)),
    | 4 => Ok(Some(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64)),
    | 8 => {
      let mut b = [0u8; 8];
      b.copy_from_slice(bytes);
      Ok(Some(i64::from_be_bytes(b)))
    },
    | _ => Err(Error::NotValid),
  }
}

fn map_tree_error(e: crate::Error) -> Error {
  match e {
    | crate::Error::InvalidLength | crate::Error::OutOfMemory => Error::OutOfMemory,
    | crate::Error::AlreadyExists => Error::NotAllowed,
    | _ => Error::NotValid,
  }
}
