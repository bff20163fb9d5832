use crate::output_info::OutputInfo;
use crate::params;
use crate::platform::{Engine, Keystore, Platform, Slot, Sotp};
use crate::{store, verify, Status};

/// The factory-configuration lifecycle object.
///
/// Owns the collaborators (SOTP area, keystore, crypto engine, platform
/// layer) and the error/warning bookkeeping of the last verification
/// session. [`init`](Self::init) is idempotent and must come first:
/// every other operation fails [`Status::NotInitialized`] before it.
/// [`finalize`](Self::finalize) is likewise idempotent and releases the
/// platform layer and the keystore backend.
///
/// ```
/// # use newt_factory::{Factory, Slot, Status};
/// # fn demo<S, K, E, P>(mut factory: Factory<S, K, E, P>)
/// #   where S: newt_factory::Sotp, K: newt_factory::Keystore,
/// #         E: newt_factory::Engine, P: newt_factory::Platform {
/// assert_eq!(factory.factory_disable(), Status::NotInitialized);
///
/// factory.init();
/// assert_eq!(factory.factory_disable(), Status::Success);
/// assert_eq!(factory.factory_disable(), Status::FactoryDisabledError);
/// # }
/// ```
#[derive(Debug)]
pub struct Factory<S, K, E, P> {
  sotp: S,
  keystore: K,
  engine: E,
  platform: P,
  initialized: bool,
  output: OutputInfo,
}

impl<S, K, E, P> Factory<S, K, E, P>
  where S: Sotp,
        K: Keystore,
        E: Engine,
        P: Platform
{
  /// Wrap the collaborators; nothing runs until [`init`](Self::init)
  pub fn new(sotp: S, keystore: K, engine: E, platform: P) -> Self {
    Factory { sotp,
              keystore,
              engine,
              platform,
              initialized: false,
              output: OutputInfo::new() }
  }

  /// Bring the module up: platform init and a fresh output-info session.
  /// Calling it again is a no-op.
  pub fn init(&mut self) -> Status {
    if self.initialized {
      return Status::Success;
    }

    if !self.platform.init() {
      log::error!("init - platform layer failed");
      return Status::Error;
    }

    self.output.clear();
    self.initialized = true;
    Status::Success
  }

  /// Release the keystore backend and the platform layer. Calling it
  /// again (or before `init`) is a no-op.
  pub fn finalize(&mut self) -> Status {
    if !self.initialized {
      return Status::Success;
    }

    self.keystore.finalize();
    self.platform.destroy();
    self.output.clear();
    self.initialized = false;
    Status::Success
  }

  /// Whether [`init`](Self::init) has run
  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  /// Write a one-time slot. A second write reports the slot's dedicated
  /// one-shot status (entropy, RoT, trusted CA, factory-done).
  pub fn store(&mut self, data: &[u8], slot: Slot) -> Status {
    if !self.initialized {
      return Status::NotInitialized;
    }

    match store::store(&mut self.sotp, data, slot) {
      | Status::ItemAlreadyExists => {
        let status = one_shot_status(slot);
        log::error!("store {:?} - {}", slot, status);
        status
      },
      | status => status,
    }
  }

  /// Read a one-time slot into `buf`, returning the stored length.
  /// An unwritten slot reports [`Status::ItemNotExist`].
  pub fn retrieve(&self, buf: &mut [u8], slot: Slot) -> Result<usize, Status> {
    if !self.initialized {
      return Err(Status::NotInitialized);
    }

    store::retrieve(&self.sotp, buf, slot)
  }

  /// Persist the entropy the DRBG will be seeded from, once ever
  pub fn entropy_set(&mut self, buf: &[u8]) -> Status {
    self.store(buf, Slot::RandomSeed)
  }

  /// Persist the device root of trust, once ever
  pub fn rot_set(&mut self, buf: &[u8]) -> Status {
    self.store(buf, Slot::Rot)
  }

  /// Save a factory-trusted wall clock time
  pub fn time_set(&mut self, epoch: u64) -> Status {
    if !self.initialized {
      return Status::NotInitialized;
    }

    self.platform.set_strong_time(epoch);
    Status::Success
  }

  /// Raise the factory-done flag, ending the provisioning session for
  /// good; a second call reports [`Status::FactoryDisabledError`]
  pub fn factory_disable(&mut self) -> Status {
    self.store(&[1], Slot::FactoryDone)
  }

  /// Whether the factory-done flag was raised. A slot holding anything
  /// but 0 or 1 reports [`Status::FactoryDisabledError`].
  pub fn is_factory_disabled(&self) -> Result<bool, Status> {
    let mut flag = [0u8; 1];

    match self.retrieve(&mut flag, Slot::FactoryDone) {
      | Ok(1) => match flag[0] {
        | 0 => Ok(false),
        | 1 => Ok(true),
        | _ => Err(Status::FactoryDisabledError),
      },
      | Ok(_) => Err(Status::FactoryDisabledError),
      | Err(Status::ItemNotExist) => Ok(false),
      | Err(status) => Err(status),
    }
  }

  /// Derive the trusted-CA identifier from the bootstrap CA certificate
  /// and persist it, once ever; a second call reports
  /// [`Status::CaError`]. Outside bootstrap mode this is a no-op.
  pub fn trust_ca_id_set(&mut self) -> Status {
    if !self.initialized {
      return Status::NotInitialized;
    }

    let use_bootstrap = match verify::bootstrap_mode(&self.keystore, &mut self.output) {
      | Ok(b) => b,
      | Err(status) => return status,
    };

    if !use_bootstrap {
      return Status::Success;
    }

    let status = self.derive_and_store_ca_id();
    if !status.is_success() {
      self.output.error(params::BOOTSTRAP_SERVER_CA_CERT, status);
    }
    status
  }

  fn derive_and_store_ca_id(&mut self) -> Status {
    let der = match self.keystore.certificate(params::BOOTSTRAP_SERVER_CA_CERT) {
      | Ok(der) => der,
      | Err(_) => return Status::ItemNotExist,
    };

    let id = match self.engine.certificate_id(&der) {
      | Some(id) => id,
      | None => return Status::CryptoError,
    };

    match store::store(&mut self.sotp, &id, Slot::TrustedTimeSrvId) {
      | Status::ItemAlreadyExists => Status::CaError,
      | status => status,
    }
  }

  /// Wipe the keystore and every SOTP slot
  pub fn storage_delete(&mut self) -> Status {
    if !self.initialized {
      return Status::NotInitialized;
    }

    if self.keystore.reset().is_err() {
      return Status::StorageError;
    }
    if self.sotp.reset().is_err() {
      return Status::StorageError;
    }

    Status::Success
  }

  /// Run the pre-operational device-configured verification: entropy,
  /// time, identity, metadata, credentials (bootstrap or LwM2M per the
  /// stored mode), firmware update material — in that order, stopping at
  /// the first failure.
  ///
  /// Returns `Success` exactly when the error accumulator is empty at
  /// return; every failed check leaves an entry naming the item.
  pub fn verify_device_configured(&mut self) -> Status {
    if !self.initialized {
      return Status::NotInitialized;
    }

    verify::verify(&self.keystore, &self.engine, &self.platform, &mut self.output)
  }

  /// Errors and warnings recorded by the last verification session;
  /// `None` before `init`
  pub fn error_and_warning_data(&self) -> Option<&OutputInfo> {
    if !self.initialized {
      return None;
    }

    Some(&self.output)
  }
}

// which one-shot status a rewritten slot reports
fn one_shot_status(slot: Slot) -> Status {
  match slot {
    | Slot::RandomSeed => Status::EntropyError,
    | Slot::Rot => Status::RotError,
    | Slot::TrustedTimeSrvId => Status::CaError,
    | Slot::FactoryDone => Status::FactoryDisabledError,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::CERT_ID_SIZE;
  use crate::test::{provisioned_factory, provisioned_keystore, MemKeystore, MemSotp, TestEngine,
                    TestFactory, TestPlatform};

  fn bare_factory() -> TestFactory {
    Factory::new(MemSotp::default(),
                 MemKeystore::default(),
                 TestEngine::default(),
                 TestPlatform::default())
  }

  #[test]
  fn everything_fails_before_init() {
    let mut factory = bare_factory();

    assert_eq!(factory.entropy_set(&[1, 2, 3]), Status::NotInitialized);
    assert_eq!(factory.rot_set(&[1, 2, 3]), Status::NotInitialized);
    assert_eq!(factory.factory_disable(), Status::NotInitialized);
    assert_eq!(factory.is_factory_disabled(), Err(Status::NotInitialized));
    assert_eq!(factory.trust_ca_id_set(), Status::NotInitialized);
    assert_eq!(factory.storage_delete(), Status::NotInitialized);
    assert_eq!(factory.verify_device_configured(), Status::NotInitialized);
    assert_eq!(factory.time_set(0), Status::NotInitialized);
    assert!(factory.error_and_warning_data().is_none());
  }

  #[test]
  fn init_and_finalize_are_idempotent() {
    let mut factory = bare_factory();

    assert_eq!(factory.init(), Status::Success);
    assert_eq!(factory.init(), Status::Success);
    assert!(factory.platform.up);

    assert_eq!(factory.finalize(), Status::Success);
    assert!(!factory.platform.up);
    assert!(factory.keystore.finalized);
    assert_eq!(factory.finalize(), Status::Success);
  }

  #[test]
  fn factory_done_is_write_once() {
    let mut factory = provisioned_factory(true);

    assert_eq!(factory.is_factory_disabled(), Ok(false));
    assert_eq!(factory.factory_disable(), Status::Success);
    assert_eq!(factory.factory_disable(), Status::FactoryDisabledError);

    let mut buf = [0u8; 4];
    assert_eq!(factory.retrieve(&mut buf, Slot::FactoryDone), Ok(1));
    assert_eq!(buf[0], 0x01);
    assert_eq!(factory.is_factory_disabled(), Ok(true));
  }

  #[test]
  fn entropy_and_rot_are_write_once() {
    let mut factory = provisioned_factory(true);

    assert_eq!(factory.entropy_set(&[0x55; 48]), Status::Success);
    assert_eq!(factory.entropy_set(&[0x55; 48]), Status::EntropyError);

    assert_eq!(factory.rot_set(&[0x42; 16]), Status::Success);
    assert_eq!(factory.rot_set(&[0x42; 16]), Status::RotError);
  }

  #[test]
  fn unwritten_slots_do_not_exist() {
    let factory = {
      let mut f = bare_factory();
      f.init();
      f
    };

    let mut buf = [0u8; 64];
    assert_eq!(factory.retrieve(&mut buf, Slot::Rot), Err(Status::ItemNotExist));
  }

  #[test]
  fn verify_succeeds_on_a_provisioned_device() {
    for bootstrap in [true, false] {
      let mut factory = provisioned_factory(bootstrap);
      assert_eq!(factory.verify_device_configured(), Status::Success);

      let info = factory.error_and_warning_data().unwrap();
      assert!(info.is_empty());
      // locale items were never provisioned
      assert_eq!(info.warnings().len(), 2);
    }
  }

  #[test]
  fn verify_status_matches_accumulator_emptiness() {
    let mut ok = provisioned_factory(true);
    assert_eq!(ok.verify_device_configured().is_success(),
               ok.error_and_warning_data().unwrap().is_empty());

    let mut broken = provisioned_factory(true);
    broken.engine.entropy = false;
    assert_eq!(broken.verify_device_configured().is_success(),
               broken.error_and_warning_data().unwrap().is_empty());
  }

  #[test]
  fn verify_stops_at_missing_endpoint_name() {
    let mut keystore = provisioned_keystore(true);
    keystore.remove_param(params::ENDPOINT_NAME);

    let mut factory = Factory::new(MemSotp::default(),
                                   keystore,
                                   TestEngine::default(),
                                   TestPlatform::default());
    factory.init();

    assert_eq!(factory.verify_device_configured(), Status::ItemNotExist);

    let info = factory.error_and_warning_data().unwrap();
    assert_eq!(info.errors().len(), 1);
    assert_eq!(info.errors()[0].name(), params::ENDPOINT_NAME);
    assert_eq!(info.errors()[0].status(), Status::ItemNotExist);
  }

  #[test]
  fn verify_rejects_a_malformed_server_uri() {
    let mut keystore = provisioned_keystore(false);
    keystore.param(params::LWM2M_SERVER_URI, b"https://lwm2m.example.com");

    let mut factory = Factory::new(MemSotp::default(),
                                   keystore,
                                   TestEngine::default(),
                                   TestPlatform::default());
    factory.init();

    assert_eq!(factory.verify_device_configured(), Status::UriWrongFormat);
  }

  #[test]
  fn verify_rejects_an_unpaired_private_key() {
    let mut keystore = provisioned_keystore(true);
    keystore.key(params::BOOTSTRAP_DEVICE_PRIVATE_KEY, b"key:cert-somebody-else");

    let mut factory = Factory::new(MemSotp::default(),
                                   keystore,
                                   TestEngine::default(),
                                   TestPlatform::default());
    factory.init();

    assert_eq!(factory.verify_device_configured(), Status::CryptoError);
  }

  #[test]
  fn verify_rejects_a_prehistoric_clock() {
    let mut factory = provisioned_factory(true);
    factory.platform.now = params::MINIMAL_EPOCH_TIME - 100;

    assert_eq!(factory.verify_device_configured(), Status::TimeError);
  }

  #[test]
  fn verify_rejects_a_clock_behind_the_strong_time() {
    let mut factory = provisioned_factory(true);
    factory.time_set(factory.platform.now + params::ALLOWED_TIME_SKEW + 100);

    assert_eq!(factory.verify_device_configured(), Status::TimeError);
  }

  #[test]
  fn verify_rejects_an_oversized_metadata_string() {
    let mut keystore = provisioned_keystore(true);
    keystore.param(params::MANUFACTURER, &[b'a'; 65]);

    let mut factory = Factory::new(MemSotp::default(),
                                   keystore,
                                   TestEngine::default(),
                                   TestPlatform::default());
    factory.init();

    assert_eq!(factory.verify_device_configured(), Status::ItemTooLarge);
  }

  #[test]
  fn trust_ca_id_is_write_once_and_bootstrap_only() {
    let mut factory = provisioned_factory(true);

    assert_eq!(factory.trust_ca_id_set(), Status::Success);
    let mut id = [0u8; CERT_ID_SIZE];
    assert_eq!(factory.retrieve(&mut id, Slot::TrustedTimeSrvId),
               Ok(CERT_ID_SIZE));
    assert_eq!(factory.trust_ca_id_set(), Status::CaError);

    let mut preprovisioned = provisioned_factory(false);
    assert_eq!(preprovisioned.trust_ca_id_set(), Status::Success);
    let mut buf = [0u8; CERT_ID_SIZE];
    assert_eq!(preprovisioned.retrieve(&mut buf, Slot::TrustedTimeSrvId),
               Err(Status::ItemNotExist));
  }

  #[test]
  fn storage_delete_reopens_the_slots() {
    let mut factory = provisioned_factory(true);

    assert_eq!(factory.factory_disable(), Status::Success);
    assert_eq!(factory.storage_delete(), Status::Success);
    assert_eq!(factory.is_factory_disabled(), Ok(false));
    assert_eq!(factory.factory_disable(), Status::Success);
  }
}
