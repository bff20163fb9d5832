//! Slot framing over the raw SOTP collaborator: each slot stores
//! `{length: u16, bytes}` big-endian; the integrity tag is the
//! collaborator's business.

use std_alloc::vec;

use crate::platform::{Slot, Sotp, SotpError};
use crate::Status;

// a slot payload plus its length prefix has to fit the flash row the
// collaborator manages; 1K covers every credential the factory writes
const MAX_SLOT_DATA: usize = 1024;

pub(crate) fn store<S: Sotp>(sotp: &mut S, data: &[u8], slot: Slot) -> Status {
  if data.is_empty() || data.len() > MAX_SLOT_DATA {
    return Status::InvalidParameter;
  }

  // probe before writing; a filled slot must not even be attempted
  match sotp.exists(slot) {
    | Ok(true) => return Status::ItemAlreadyExists,
    | Ok(false) => (),
    | Err(_) => return Status::StorageError,
  }

  let mut framed = vec![0u8; 2 + data.len()];
  framed[..2].copy_from_slice(&(data.len() as u16).to_be_bytes());
  framed[2..].copy_from_slice(data);

  match sotp.set(slot, &framed) {
    | Ok(()) => Status::Success,
    | Err(SotpError::AlreadyExists) => Status::ItemAlreadyExists,
    | Err(_) => Status::StorageError,
  }
}

pub(crate) fn retrieve<S: Sotp>(sotp: &S, buf: &mut [u8], slot: Slot) -> Result<usize, Status> {
  let mut framed = vec![0u8; 2 + MAX_SLOT_DATA];

  let read = match sotp.get(slot, &mut framed) {
    | Ok(n) => n,
    | Err(SotpError::NotFound) => return Err(Status::ItemNotExist),
    | Err(_) => return Err(Status::StorageError),
  };

  if read < 2 {
    return Err(Status::StorageError);
  }

  let len = u16::from_be_bytes([framed[0], framed[1]]) as usize;
  if len > read - 2 {
    return Err(Status::StorageError);
  }
  if len > buf.len() {
    return Err(Status::InvalidParameter);
  }

  buf[..len].copy_from_slice(&framed[2..2 + len]);
  Ok(len)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::MemSotp;

  #[test]
  fn frames_length_before_bytes() {
    let mut sotp = MemSotp::default();
    assert_eq!(store(&mut sotp, b"abc", Slot::Rot), Status::Success);

    let raw = sotp.raw(Slot::Rot).unwrap();
    assert_eq!(raw, [0x00, 0x03, b'a', b'b', b'c']);

    let mut buf = [0u8; 16];
    assert_eq!(retrieve(&sotp, &mut buf, Slot::Rot), Ok(3));
    assert_eq!(&buf[..3], b"abc");
  }

  #[test]
  fn empty_data_is_invalid() {
    let mut sotp = MemSotp::default();
    assert_eq!(store(&mut sotp, b"", Slot::Rot), Status::InvalidParameter);
  }

  #[test]
  fn empty_slot_does_not_exist() {
    let sotp = MemSotp::default();
    let mut buf = [0u8; 4];
    assert_eq!(retrieve(&sotp, &mut buf, Slot::RandomSeed),
               Err(Status::ItemNotExist));
  }

  #[test]
  fn too_small_buffer_is_invalid_parameter() {
    let mut sotp = MemSotp::default();
    store(&mut sotp, b"abcdef", Slot::Rot);

    let mut buf = [0u8; 2];
    assert_eq!(retrieve(&sotp, &mut buf, Slot::Rot),
               Err(Status::InvalidParameter));
  }

  #[test]
  fn second_write_already_exists() {
    let mut sotp = MemSotp::default();
    assert_eq!(store(&mut sotp, b"x", Slot::FactoryDone), Status::Success);
    assert_eq!(store(&mut sotp, b"x", Slot::FactoryDone),
               Status::ItemAlreadyExists);
  }
}
