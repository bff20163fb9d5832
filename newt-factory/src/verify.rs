//! The pre-operational "device configured" verification: a fixed walk
//! over entropy, time, identity, metadata, credentials and firmware
//! material, short-circuiting on the first failure and recording every
//! failure against the item that caused it.

use std_alloc::vec::Vec;

use crate::output_info::OutputInfo;
use crate::params;
use crate::platform::{Engine, Keystore, KeystoreError, Platform};
use crate::Status;

pub(crate) fn verify<K, E, P>(keystore: &K,
                              engine: &E,
                              platform: &P,
                              out: &mut OutputInfo)
                              -> Status
  where K: Keystore,
        E: Engine,
        P: Platform
{
  // stale session data must not leak into this run
  out.clear();

  let status = check_entropy(engine, out);
  if !status.is_success() {
    return status;
  }

  let status = check_time_synchronization(platform, out);
  if !status.is_success() {
    return status;
  }

  let use_bootstrap = match bootstrap_mode(keystore, out) {
    | Ok(b) => b,
    | Err(status) => return status,
  };

  let status = check_device_general_info(keystore, out);
  if !status.is_success() {
    return status;
  }

  let status = check_device_meta_data(keystore, out);
  if !status.is_success() {
    return status;
  }

  let status = check_device_security_objects(keystore, engine, use_bootstrap, out);
  if !status.is_success() {
    return status;
  }

  check_firmware_update_integrity(keystore, out)
}

pub(crate) fn bootstrap_mode<K: Keystore>(keystore: &K, out: &mut OutputInfo) -> Result<bool, Status> {
  let bytes = match keystore.config_param(params::USE_BOOTSTRAP) {
    | Ok(b) => b,
    | Err(KeystoreError::NotFound) => {
      out.error(params::USE_BOOTSTRAP, Status::ItemNotExist);
      return Err(Status::ItemNotExist);
    },
    | Err(_) => {
      out.error(params::USE_BOOTSTRAP, Status::StorageError);
      return Err(Status::StorageError);
    },
  };

  match parse_bool(&bytes) {
    | Some(b) => Ok(b),
    | None => {
      out.error(params::USE_BOOTSTRAP, Status::InvalidItem);
      Err(Status::InvalidItem)
    },
  }
}

// boolean items are a 4-byte word; a bare byte is tolerated
fn parse_bool(bytes: &[u8]) -> Option<bool> {
  let word = match bytes.len() {
    | 1 => bytes[0] as u32,
    | n if n == params::CONFIG_BOOLEAN_ITEM_SIZE => {
      u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    },
    | _ => return None,
  };

  match word {
    | 0 => Some(false),
    | 1 => Some(true),
    | _ => None,
  }
}

fn check_entropy<E: Engine>(engine: &E, out: &mut OutputInfo) -> Status {
  if engine.entropy_initialized() {
    Status::Success
  } else {
    out.error("entropy", Status::EntropyError);
    Status::EntropyError
  }
}

fn check_time_synchronization<P: Platform>(platform: &P, out: &mut OutputInfo) -> Status {
  let now = platform.current_time();

  if now < params::MINIMAL_EPOCH_TIME {
    out.error(params::CURRENT_TIME, Status::TimeError);
    return Status::TimeError;
  }

  // a saved strong time far ahead of the clock means the clock went
  // backwards since provisioning
  let strong = platform.strong_time();
  if strong != 0 && now + params::ALLOWED_TIME_SKEW < strong {
    out.error(params::CURRENT_TIME, Status::TimeError);
    return Status::TimeError;
  }

  Status::Success
}

fn check_device_general_info<K: Keystore>(keystore: &K, out: &mut OutputInfo) -> Status {
  if let Err(status) = required_string(keystore, out, params::ENDPOINT_NAME) {
    return status;
  }

  match required_param(keystore, out, params::ACCOUNT_ID) {
    | Ok(_) => Status::Success,
    | Err(status) => status,
  }
}

fn check_device_meta_data<K: Keystore>(keystore: &K, out: &mut OutputInfo) -> Status {
  for name in [params::MANUFACTURER,
               params::MODEL_NUMBER,
               params::DEVICE_TYPE,
               params::HARDWARE_VERSION,
               params::MEMORY_TOTAL_KB,
               params::SERIAL_NUMBER] {
    match keystore.config_param(name) {
      | Err(KeystoreError::NotFound) => (),
      | Err(_) => {
        out.error(name, Status::StorageError);
        return Status::StorageError;
      },
      | Ok(bytes) => {
        if let Err(status) = validate_string(&bytes, name, out) {
          return status;
        }
      },
    }
  }

  // absent locale items are worth flagging, not failing
  for name in [params::DEVICE_TIME_ZONE, params::UTC_OFFSET] {
    if keystore.config_param(name) == Err(KeystoreError::NotFound) {
      out.warning(name, Status::ItemNotExist);
    }
  }

  Status::Success
}

fn check_device_security_objects<K, E>(keystore: &K,
                                       engine: &E,
                                       use_bootstrap: bool,
                                       out: &mut OutputInfo)
                                       -> Status
  where K: Keystore,
        E: Engine
{
  let (uri_name, ca_name, cert_name, key_name) = if use_bootstrap {
    (params::BOOTSTRAP_SERVER_URI,
     params::BOOTSTRAP_SERVER_CA_CERT,
     params::BOOTSTRAP_DEVICE_CERT,
     params::BOOTSTRAP_DEVICE_PRIVATE_KEY)
  } else {
    (params::LWM2M_SERVER_URI,
     params::LWM2M_SERVER_CA_CERT,
     params::LWM2M_DEVICE_CERT,
     params::LWM2M_DEVICE_PRIVATE_KEY)
  };

  let uri = match required_param(keystore, out, uri_name) {
    | Ok(bytes) => bytes,
    | Err(status) => return status,
  };

  match core::str::from_utf8(&uri) {
    | Ok(uri) if uri.starts_with(params::COAP) || uri.starts_with(params::COAPS) => (),
    | _ => {
      out.error(uri_name, Status::UriWrongFormat);
      return Status::UriWrongFormat;
    },
  }

  if let Err(status) = required_certificate(keystore, engine, out, ca_name) {
    return status;
  }

  let cert = match required_certificate(keystore, engine, out, cert_name) {
    | Ok(bytes) => bytes,
    | Err(status) => return status,
  };

  let key = match keystore.private_key(key_name) {
    | Ok(bytes) => bytes,
    | Err(KeystoreError::NotFound) => {
      out.error(key_name, Status::ItemNotExist);
      return Status::ItemNotExist;
    },
    | Err(_) => {
      out.error(key_name, Status::StorageError);
      return Status::StorageError;
    },
  };

  if !engine.key_matches(&cert, &key) {
    out.error(key_name, Status::CryptoError);
    return Status::CryptoError;
  }

  Status::Success
}

fn check_firmware_update_integrity<K: Keystore>(keystore: &K, out: &mut OutputInfo) -> Status {
  match keystore.certificate(params::UPDATE_AUTH_CERT) {
    | Ok(_) => (),
    | Err(KeystoreError::NotFound) => {
      out.error(params::UPDATE_AUTH_CERT, Status::ItemNotExist);
      return Status::ItemNotExist;
    },
    | Err(_) => {
      out.error(params::UPDATE_AUTH_CERT, Status::StorageError);
      return Status::StorageError;
    },
  }

  for name in [params::CLASS_ID, params::VENDOR_ID] {
    if let Err(status) = required_param(keystore, out, name) {
      return status;
    }
  }

  Status::Success
}

fn required_param<K: Keystore>(keystore: &K,
                               out: &mut OutputInfo,
                               name: &str)
                               -> Result<Vec<u8>, Status> {
  match keystore.config_param(name) {
    | Ok(bytes) if bytes.is_empty() => {
      out.error(name, Status::EmptyItem);
      Err(Status::EmptyItem)
    },
    | Ok(bytes) => Ok(bytes),
    | Err(KeystoreError::NotFound) => {
      out.error(name, Status::ItemNotExist);
      Err(Status::ItemNotExist)
    },
    | Err(_) => {
      out.error(name, Status::StorageError);
      Err(Status::StorageError)
    },
  }
}

fn required_string<K: Keystore>(keystore: &K,
                                out: &mut OutputInfo,
                                name: &str)
                                -> Result<(), Status> {
  let bytes = required_param(keystore, out, name)?;
  validate_string(&bytes, name, out)
}

fn validate_string(bytes: &[u8], name: &str, out: &mut OutputInfo) -> Result<(), Status> {
  if bytes.len() > params::MAX_ALLOWED_STRING_LENGTH {
    out.error(name, Status::ItemTooLarge);
    return Err(Status::ItemTooLarge);
  }

  if core::str::from_utf8(bytes).is_err() {
    out.error(name, Status::InvalidItem);
    return Err(Status::InvalidItem);
  }

  Ok(())
}

fn required_certificate<K, E>(keystore: &K,
                              engine: &E,
                              out: &mut OutputInfo,
                              name: &str)
                              -> Result<Vec<u8>, Status>
  where K: Keystore,
        E: Engine
{
  let der = match keystore.certificate(name) {
    | Ok(bytes) => bytes,
    | Err(KeystoreError::NotFound) => {
      out.error(name, Status::ItemNotExist);
      return Err(Status::ItemNotExist);
    },
    | Err(_) => {
      out.error(name, Status::StorageError);
      return Err(Status::StorageError);
    },
  };

  if !engine.parse_certificate(&der) {
    out.error(name, Status::CryptoError);
    return Err(Status::CryptoError);
  }

  Ok(der)
}
