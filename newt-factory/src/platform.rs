use std_alloc::vec::Vec;

/// Size of the SHA-256-based certificate identifier the crypto engine
/// derives
pub const CERT_ID_SIZE: usize = 32;

/// The four one-time slots in the SOTP area
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
  /// Entropy seed for the DRBG
  RandomSeed,
  /// Device-unique root of trust
  Rot,
  /// Identifier of the trusted CA certificate
  TrustedTimeSrvId,
  /// Factory-done flag, one byte 0/1
  FactoryDone,
}

/// Failures of the SOTP collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SotpError {
  /// The slot was never written
  NotFound,
  /// The slot was already written; SOTP slots are write-once
  AlreadyExists,
  /// Underlying flash/file I/O failed
  Storage,
}

/// Secure one-time-programmable storage: per-slot write-once key/value
/// with integrity guaranteed by the implementation.
pub trait Sotp {
  /// Whether a slot holds data
  fn exists(&self, slot: Slot) -> Result<bool, SotpError>;

  /// Read a slot into `buf`, returning the stored length
  fn get(&self, slot: Slot, buf: &mut [u8]) -> Result<usize, SotpError>;

  /// Write a slot; a second write fails [`SotpError::AlreadyExists`]
  fn set(&mut self, slot: Slot, data: &[u8]) -> Result<(), SotpError>;

  /// Wipe every slot (factory storage reset)
  fn reset(&mut self) -> Result<(), SotpError>;
}

/// Failures of the keystore collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeystoreError {
  /// No item stored under the given name
  NotFound,
  /// Underlying storage failed
  Storage,
}

/// Named credential store (config parameters, certificates, private
/// keys), persisted by an external backend.
pub trait Keystore {
  /// Read a configuration parameter by name
  fn config_param(&self, name: &str) -> Result<Vec<u8>, KeystoreError>;

  /// Read a certificate (or certificate chain) by name, DER bytes
  fn certificate(&self, name: &str) -> Result<Vec<u8>, KeystoreError>;

  /// Read a private key by name, DER bytes
  fn private_key(&self, name: &str) -> Result<Vec<u8>, KeystoreError>;

  /// Wipe the whole store (factory storage reset)
  fn reset(&mut self) -> Result<(), KeystoreError>;

  /// Release the backend; called once from `Factory::finalize`
  fn finalize(&mut self);
}

/// Verification predicates of the cryptographic engine
pub trait Engine {
  /// Whether the DRBG was seeded with real entropy
  fn entropy_initialized(&self) -> bool;

  /// Whether `der` parses as a certificate (structure only, no chain
  /// validation)
  fn parse_certificate(&self, der: &[u8]) -> bool;

  /// Whether `key_der` is the private half of `cert_der`'s public key
  fn key_matches(&self, cert_der: &[u8], key_der: &[u8]) -> bool;

  /// The SHA-256-based identifier of a certificate
  fn certificate_id(&self, der: &[u8]) -> Option<[u8; CERT_ID_SIZE]>;
}

/// The platform abstraction layer: process lifetime and time
pub trait Platform {
  /// Bring the platform layer up; false on failure
  fn init(&mut self) -> bool;

  /// Release the platform layer
  fn destroy(&mut self);

  /// Current wall time, epoch seconds
  fn current_time(&self) -> u64;

  /// The last trusted ("strong") time the device saved, 0 when unset
  fn strong_time(&self) -> u64;

  /// Save a new trusted time
  fn set_strong_time(&mut self, epoch: u64);
}
