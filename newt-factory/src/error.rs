use core::fmt::{self, Display};

/// Status of a factory-configuration operation.
///
/// `Success` is a status, not an error: most APIs return `Status`
/// directly, the way the verification flow threads one status through
/// every check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
  /// All good
  Success,
  /// Unspecified internal failure
  Error,
  /// An API was called before `init`
  NotInitialized,
  /// Empty or out-of-range argument
  InvalidParameter,
  /// The requested item is not stored
  ItemNotExist,
  /// The slot was already written once
  ItemAlreadyExists,
  /// The storage collaborator failed
  StorageError,
  /// The entropy slot was already written, or entropy is missing
  EntropyError,
  /// The root-of-trust slot was already written
  RotError,
  /// The trusted-CA slot was already written, or the CA is unusable
  CaError,
  /// The factory-done flag was already raised, or holds garbage
  FactoryDisabledError,
  /// The device clock fails the sanity checks
  TimeError,
  /// A required item is present but empty
  EmptyItem,
  /// An item holds a value that fails validation
  InvalidItem,
  /// An item exceeds its size limit
  ItemTooLarge,
  /// A server URI does not start with `coap://` or `coaps://`
  UriWrongFormat,
  /// A certificate or key failed parsing or pairing
  CryptoError,
  /// The error/warning accumulator itself failed to record
  OutputInfoError,
}

impl Status {
  /// Whether this status is `Success`
  pub fn is_success(&self) -> bool {
    *self == Status::Success
  }
}

impl Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      | Status::Success => "success",
      | Status::Error => "error",
      | Status::NotInitialized => "not initialized",
      | Status::InvalidParameter => "invalid parameter",
      | Status::ItemNotExist => "item does not exist",
      | Status::ItemAlreadyExists => "item already exists",
      | Status::StorageError => "storage error",
      | Status::EntropyError => "entropy error",
      | Status::RotError => "root-of-trust error",
      | Status::CaError => "trusted-CA error",
      | Status::FactoryDisabledError => "factory disabled",
      | Status::TimeError => "time not synchronized",
      | Status::EmptyItem => "item is empty",
      | Status::InvalidItem => "item is invalid",
      | Status::ItemTooLarge => "item too large",
      | Status::UriWrongFormat => "uri wrong format",
      | Status::CryptoError => "crypto error",
      | Status::OutputInfoError => "output info error",
    };
    write!(f, "{}", s)
  }
}
