use std_alloc::string::String;
use std_alloc::vec::Vec;

use crate::Status;

/// One recorded problem: the item it concerns and what went wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemInfo {
  name: String,
  status: Status,
}

impl ItemInfo {
  /// Name of the configuration item
  pub fn name(&self) -> &str {
    &self.name
  }

  /// What went wrong with it
  pub fn status(&self) -> Status {
    self.status
  }
}

/// Typed error and warning entries accumulated during the last
/// verification session, keyed by item name.
///
/// Cleared at the start of every verification run and on `finalize`;
/// the verifier's contract is that it returns `Success` exactly when
/// the error list is empty at return.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputInfo {
  errors: Vec<ItemInfo>,
  warnings: Vec<ItemInfo>,
}

impl OutputInfo {
  /// An empty accumulator
  pub fn new() -> Self {
    Default::default()
  }

  /// Recorded errors, oldest first
  pub fn errors(&self) -> &[ItemInfo] {
    &self.errors
  }

  /// Recorded warnings, oldest first
  pub fn warnings(&self) -> &[ItemInfo] {
    &self.warnings
  }

  /// Whether no error was recorded (warnings do not count)
  pub fn is_empty(&self) -> bool {
    self.errors.is_empty()
  }

  pub(crate) fn clear(&mut self) {
    self.errors.clear();
    self.warnings.clear();
  }

  pub(crate) fn error(&mut self, name: &str, status: Status) {
    log::error!("{} - {}", name, status);
    self.errors.push(ItemInfo { name: name.into(),
                                status });
  }

  pub(crate) fn warning(&mut self, name: &str, status: Status) {
    log::warn!("{} - {}", name, status);
    self.warnings.push(ItemInfo { name: name.into(),
                                  status });
  }
}
