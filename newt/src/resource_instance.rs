use newt_msg::{code, Header};

use crate::base::{Base, Key, Observation, Operation};
use crate::observe::ObservationHandler;
use crate::report::Millis;
use crate::resource_base;
use crate::tlv;
use crate::value::{ResourceType, Value};
use crate::Error;

/// One instance of a multi-instance resource, owning its typed value.
///
/// Created only through [`Resource::create_instance`](crate::Resource::create_instance);
/// the instance inherits the parent resource's type, operations and
/// observability.
#[derive(Debug)]
pub struct ResourceInstance {
  base: Base,
  kind: ResourceType,
  value: Value,
}

impl ResourceInstance {
  pub(crate) fn new(parent_path: &str,
                    instance_id: u16,
                    kind: ResourceType,
                    operation: Operation,
                    observable: bool)
                    -> Result<Self, Error> {
    let base = Base::new(parent_path,
                         Key::Id(instance_id),
                         operation,
                         observable,
                         newt_msg::ContentFormat::Text)?;

    Ok(ResourceInstance { base,
                          kind,
                          value: Value::None })
  }

  /// Shared node header
  pub fn base(&self) -> &Base {
    &self.base
  }

  /// Mutable access to the shared node header
  pub fn base_mut(&mut self) -> &mut Base {
    &mut self.base
  }

  /// Id of this instance among its siblings
  pub fn instance_id(&self) -> u16 {
    self.base.name_id().unwrap_or(0)
  }

  /// Declared value type, inherited from the parent resource
  pub fn resource_type(&self) -> ResourceType {
    self.kind
  }

  /// Current value
  pub fn value(&self) -> &Value {
    &self.value
  }

  /// Replace the value, validating it against the declared type.
  ///
  /// Fails `InvalidType` on a mismatch and `InvalidLength` when a string
  /// value exceeds [`MAX_VALUE_LENGTH`](crate::constants::MAX_VALUE_LENGTH).
  pub fn set_value(&mut self, value: Value) -> Result<(), Error> {
    resource_base::commit(&mut self.base, &mut self.value, self.kind, value)
  }

  /// GET against this instance
  pub fn handle_get<H: ObservationHandler>(&mut self, req: &Header, _handler: &mut H) -> Header {
    resource_base::handle_get(&mut self.base,
                              self.kind,
                              &self.value,
                              tlv::TYPE_RESOURCE_INSTANCE,
                              Observation::RESOURCE_INSTANCE,
                              req)
  }

  /// PUT against this instance
  pub fn handle_put<H: ObservationHandler>(&mut self, req: &Header, handler: &mut H) -> Header {
    resource_base::handle_put(&mut self.base, self.kind, &mut self.value, req, handler)
  }

  /// POST against this instance; execute lives on resources, so this is
  /// always refused
  pub fn handle_post<H: ObservationHandler>(&mut self, req: &Header, _handler: &mut H) -> Header {
    log::error!("handle_post {} - method not allowed", self.base.path());
    Header::response_to(req, code::METHOD_NOT_ALLOWED)
  }

  pub(crate) fn add_observation_level(&mut self, level: Observation) {
    self.base.add_observation_level(level);
  }

  pub(crate) fn remove_observation_level(&mut self, level: Observation) {
    self.base.remove_observation_level(level);
  }

  pub(crate) fn subtree_changed(&self) -> bool {
    self.base.is_changed()
  }

  pub(crate) fn clear_changed(&mut self) {
    self.base.clear_changed();
  }

  pub(crate) fn notify_deleted<H: ObservationHandler>(&self, handler: &mut H) {
    if self.base.is_under_observation() {
      handler.resource_to_be_deleted(self.base.path());
    }
  }

  pub(crate) fn report<H: ObservationHandler>(&mut self, now: Millis, handler: &mut H) {
    if !self.base.is_under_observation() {
      return;
    }

    let due = match self.base.report_handler_mut() {
      | Some(r) => r.tick(now),
      | None => false,
    };

    if due {
      self.base.next_observation_number();
      let token = self.base.observation_token().unwrap_or_default();
      handler.observation_to_be_sent(self.base.path(),
                                     token,
                                     self.base.observation_level(),
                                     false);
      if let Some(r) = self.base.report_handler_mut() {
        r.record_sent(&self.value);
      }
      self.base.clear_changed();
    }
  }
}
