//! Test doubles for the collaborator traits and a fully-provisioned
//! factory fixture.

use std::collections::HashMap;
use std::string::String;
use std::vec::Vec;

use crate::platform::{Engine, Keystore, KeystoreError, Platform, Slot, Sotp, SotpError,
                      CERT_ID_SIZE};
use crate::{params, Factory};

#[derive(Debug, Default)]
pub(crate) struct MemSotp {
  slots: HashMap<Slot, Vec<u8>>,
}

impl MemSotp {
  pub(crate) fn raw(&self, slot: Slot) -> Option<&[u8]> {
    self.slots.get(&slot).map(|v| v.as_slice())
  }
}

impl Sotp for MemSotp {
  fn exists(&self, slot: Slot) -> Result<bool, SotpError> {
    Ok(self.slots.contains_key(&slot))
  }

  fn get(&self, slot: Slot, buf: &mut [u8]) -> Result<usize, SotpError> {
    match self.slots.get(&slot) {
      | None => Err(SotpError::NotFound),
      | Some(v) if v.len() > buf.len() => Err(SotpError::Storage),
      | Some(v) => {
        buf[..v.len()].copy_from_slice(v);
        Ok(v.len())
      },
    }
  }

  fn set(&mut self, slot: Slot, data: &[u8]) -> Result<(), SotpError> {
    if self.slots.contains_key(&slot) {
      return Err(SotpError::AlreadyExists);
    }
    self.slots.insert(slot, data.to_vec());
    Ok(())
  }

  fn reset(&mut self) -> Result<(), SotpError> {
    self.slots.clear();
    Ok(())
  }
}

#[derive(Debug, Default)]
pub(crate) struct MemKeystore {
  params: HashMap<String, Vec<u8>>,
  certs: HashMap<String, Vec<u8>>,
  keys: HashMap<String, Vec<u8>>,
  pub(crate) finalized: bool,
}

impl MemKeystore {
  pub(crate) fn param(&mut self, name: &str, value: &[u8]) -> &mut Self {
    self.params.insert(name.into(), value.to_vec());
    self
  }

  pub(crate) fn cert(&mut self, name: &str, value: &[u8]) -> &mut Self {
    self.certs.insert(name.into(), value.to_vec());
    self
  }

  pub(crate) fn key(&mut self, name: &str, value: &[u8]) -> &mut Self {
    self.keys.insert(name.into(), value.to_vec());
    self
  }

  pub(crate) fn remove_param(&mut self, name: &str) {
    self.params.remove(name);
  }
}

fn look(map: &HashMap<String, Vec<u8>>, name: &str) -> Result<Vec<u8>, KeystoreError> {
  map.get(name).cloned().ok_or(KeystoreError::NotFound)
}

impl Keystore for MemKeystore {
  fn config_param(&self, name: &str) -> Result<Vec<u8>, KeystoreError> {
    look(&self.params, name)
  }

  fn certificate(&self, name: &str) -> Result<Vec<u8>, KeystoreError> {
    look(&self.certs, name)
  }

  fn private_key(&self, name: &str) -> Result<Vec<u8>, KeystoreError> {
    look(&self.keys, name)
  }

  fn reset(&mut self) -> Result<(), KeystoreError> {
    self.params.clear();
    self.certs.clear();
    self.keys.clear();
    Ok(())
  }

  fn finalize(&mut self) {
    self.finalized = true;
  }
}

/// Certificates are anything starting `cert`; a key pairs with a cert
/// when it is `key:` followed by the cert bytes.
#[derive(Debug)]
pub(crate) struct TestEngine {
  pub(crate) entropy: bool,
}

impl Default for TestEngine {
  fn default() -> Self {
    TestEngine { entropy: true }
  }
}

impl Engine for TestEngine {
  fn entropy_initialized(&self) -> bool {
    self.entropy
  }

  fn parse_certificate(&self, der: &[u8]) -> bool {
    der.starts_with(b"cert")
  }

  fn key_matches(&self, cert_der: &[u8], key_der: &[u8]) -> bool {
    key_der.strip_prefix(b"key:") == Some(cert_der)
  }

  fn certificate_id(&self, der: &[u8]) -> Option<[u8; CERT_ID_SIZE]> {
    if self.parse_certificate(der) {
      Some([der.len() as u8; CERT_ID_SIZE])
    } else {
      None
    }
  }
}

#[derive(Debug)]
pub(crate) struct TestPlatform {
  pub(crate) now: u64,
  pub(crate) strong: u64,
  pub(crate) up: bool,
}

impl Default for TestPlatform {
  fn default() -> Self {
    TestPlatform { now: params::MINIMAL_EPOCH_TIME + 1,
                   strong: 0,
                   up: false }
  }
}

impl Platform for TestPlatform {
  fn init(&mut self) -> bool {
    self.up = true;
    true
  }

  fn destroy(&mut self) {
    self.up = false;
  }

  fn current_time(&self) -> u64 {
    self.now
  }

  fn strong_time(&self) -> u64 {
    self.strong
  }

  fn set_strong_time(&mut self, epoch: u64) {
    self.strong = epoch;
  }
}

pub(crate) type TestFactory = Factory<MemSotp, MemKeystore, TestEngine, TestPlatform>;

/// A keystore provisioned the way a healthy bootstrap-mode device leaves
/// the factory line
pub(crate) fn provisioned_keystore(bootstrap: bool) -> MemKeystore {
  let mut ks = MemKeystore::default();
  let flag: u32 = bootstrap as u32;

  ks.param(params::USE_BOOTSTRAP, &flag.to_le_bytes())
    .param(params::ENDPOINT_NAME, b"device-0017")
    .param(params::ACCOUNT_ID, b"0123456789")
    .param(params::MANUFACTURER, b"ACME")
    .param(params::CLASS_ID, &[7u8; 16])
    .param(params::VENDOR_ID, &[9u8; 16])
    .cert(params::UPDATE_AUTH_CERT, b"cert-update");

  if bootstrap {
    ks.param(params::BOOTSTRAP_SERVER_URI, b"coaps://bootstrap.example.com:5684")
      .cert(params::BOOTSTRAP_SERVER_CA_CERT, b"cert-bootstrap-ca")
      .cert(params::BOOTSTRAP_DEVICE_CERT, b"cert-device")
      .key(params::BOOTSTRAP_DEVICE_PRIVATE_KEY, b"key:cert-device");
  } else {
    ks.param(params::LWM2M_SERVER_URI, b"coaps://lwm2m.example.com:5684")
      .cert(params::LWM2M_SERVER_CA_CERT, b"cert-lwm2m-ca")
      .cert(params::LWM2M_DEVICE_CERT, b"cert-device")
      .key(params::LWM2M_DEVICE_PRIVATE_KEY, b"key:cert-device");
  }

  ks
}

pub(crate) fn provisioned_factory(bootstrap: bool) -> TestFactory {
  let mut factory = Factory::new(MemSotp::default(),
                                 provisioned_keystore(bootstrap),
                                 TestEngine::default(),
                                 TestPlatform::default());
  factory.init();
  factory
}
