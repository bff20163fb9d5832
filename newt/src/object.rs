use newt_msg::{code, observe::Action, ContentFormat, Header};
use std_alloc::vec::Vec;

use crate::base::{negotiate_tlv, Base, Key, Observation, Operation};
use crate::object_instance::ObjectInstance;
use crate::observe::ObservationHandler;
use crate::report::Millis;
use crate::resource_base;
use crate::tlv::{de, ser};
use crate::value::Value;
use crate::Error;

/// An LwM2M object, owning its instances. Created only through
/// [`Tree::create_object`](crate::Tree::create_object).
#[derive(Debug)]
pub struct Object {
  base: Base,
  instances: Vec<ObjectInstance>,
}

impl Object {
  pub(crate) fn new(key: Key) -> Result<Self, Error> {
    let base = Base::new("", key, Operation::GET, true, ContentFormat::Tlv)?;

    Ok(Object { base,
                instances: Vec::new() })
  }

  /// Shared node header
  pub fn base(&self) -> &Base {
    &self.base
  }

  /// Mutable access to the shared node header
  pub fn base_mut(&mut self) -> &mut Base {
    &mut self.base
  }

  /// Numeric object id; 0 for purely name-keyed custom objects
  pub fn object_id(&self) -> u16 {
    self.base.name_id().unwrap_or(0)
  }

  /// Create an instance under this object.
  ///
  /// Fails `AlreadyExists` on a duplicate instance id.
  pub fn create_instance(&mut self, instance_id: u16) -> Result<&mut ObjectInstance, Error> {
    if self.instances.iter().any(|i| i.instance_id() == instance_id) {
      return Err(Error::AlreadyExists);
    }

    let mut instance =
      ObjectInstance::new(self.base.path(), self.base.name_string(), instance_id)?;
    instance.add_observation_level(self.base.observation_level());

    self.instances.push(instance);
    self.structural_change();

    Ok(self.instances.last_mut().unwrap())
  }

  /// Look up an instance by id
  pub fn instance(&self, instance_id: u16) -> Option<&ObjectInstance> {
    self.instances.iter().find(|i| i.instance_id() == instance_id)
  }

  /// Mutable lookup of an instance by id
  pub fn instance_mut(&mut self, instance_id: u16) -> Option<&mut ObjectInstance> {
    self.instances.iter_mut().find(|i| i.instance_id() == instance_id)
  }

  /// All instances, in creation order
  pub fn instances(&self) -> &[ObjectInstance] {
    &self.instances
  }

  /// Number of instances
  pub fn instance_count(&self) -> usize {
    self.instances.len()
  }

  /// Remove an instance; children go first, recursively
  pub fn remove_instance<H: ObservationHandler>(&mut self, instance_id: u16, handler: &mut H) -> bool {
    match self.instances.iter().position(|i| i.instance_id() == instance_id) {
      | Some(ix) => {
        self.instances[ix].notify_deleted(handler);
        self.instances.remove(ix);
        self.structural_change();
        true
      },
      | None => false,
    }
  }

  /// GET against this object: a TLV aggregate of all instances, each
  /// wrapped in an Object-Instance entry
  pub fn handle_get<H: ObservationHandler>(&mut self, req: &Header, _handler: &mut H) -> Header {
    log::debug!("handle_get {}", self.base.path());

    if !self.base.operation().allows(Operation::GET) {
      log::error!("handle_get {} - method not allowed", self.base.path());
      return Header::response_to(req, code::METHOD_NOT_ALLOWED);
    }

    let format = match negotiate_tlv(req.accept) {
      | Some(f) => f,
      | None => {
        log::error!("handle_get {} - accept {:?} not supported", self.base.path(), req.accept);
        return Header::response_to(req, code::NOT_ACCEPTABLE);
      },
    };

    let payload = match ser::serialize_object(self) {
      | Ok(p) => p,
      | Err(e) => {
        log::error!("handle_get {} - serialization failed: {}", self.base.path(), e);
        return Header::response_to(req, code::INTERNAL_SERVER_ERROR);
      },
    };

    self.base.set_content_type(format);

    let mut resp = Header::response_to(req, code::CONTENT);
    resp.content_format = Some(format);
    resp.payload = payload;
    self.base.apply_max_age(&mut resp);

    match self.base.handle_observe(req, &mut resp) {
      | Some(Action::Register) => self.add_observation_level(Observation::OBJECT),
      | Some(Action::Deregister) => self.remove_observation_level(Observation::OBJECT),
      | None => (),
    }

    resp
  }

  /// PUT against this object: observation attributes when a uri-query is
  /// present, otherwise a TLV write across existing instances
  pub fn handle_put<H: ObservationHandler>(&mut self, req: &Header, handler: &mut H) -> Header {
    log::debug!("handle_put {}", self.base.path());

    if let Some(query) = &req.uri_query {
      let code = resource_base::handle_observation_attributes(&mut self.base, &Value::None, query);
      return Header::response_to(req, code);
    }

    if !self.base.operation().allows(Operation::PUT) {
      log::error!("handle_put {} - method not allowed", self.base.path());
      return Header::response_to(req, code::METHOD_NOT_ALLOWED);
    }

    match req.content_format {
      | Some(f) if f.is_tlv() => self.base.set_content_type(f),
      | None => (),
      | f => {
        log::error!("handle_put {} - content format {:?} not supported", self.base.path(), f);
        return Header::response_to(req, code::UNSUPPORTED_CONTENT_FORMAT);
      },
    }

    let code = match de::deserialize_object_instances(&req.payload, self, de::Mode::Put) {
      | Ok(()) => {
        handler.value_updated(self.base.path());
        code::CHANGED
      },
      | Err(e) => resource_base::de_error_code(e),
    };

    Header::response_to(req, code)
  }

  /// POST against this object: a TLV write that may create instances
  pub fn handle_post<H: ObservationHandler>(&mut self, req: &Header, handler: &mut H) -> Header {
    log::debug!("handle_post {}", self.base.path());

    if !self.base.operation().allows(Operation::POST) {
      log::error!("handle_post {} - method not allowed", self.base.path());
      return Header::response_to(req, code::METHOD_NOT_ALLOWED);
    }

    match req.content_format {
      | Some(f) if f.is_tlv() => (),
      | None => (),
      | f => {
        log::error!("handle_post {} - content format {:?} not supported", self.base.path(), f);
        return Header::response_to(req, code::UNSUPPORTED_CONTENT_FORMAT);
      },
    }

    let code = match de::deserialize_object_instances(&req.payload, self, de::Mode::Post) {
      | Ok(()) => {
        handler.value_updated(self.base.path());
        code::CHANGED
      },
      | Err(e) => resource_base::de_error_code(e),
    };

    Header::response_to(req, code)
  }

  pub(crate) fn add_observation_level(&mut self, level: Observation) {
    self.base.add_observation_level(level);
    for instance in self.instances.iter_mut() {
      instance.add_observation_level(level);
    }
  }

  pub(crate) fn remove_observation_level(&mut self, level: Observation) {
    self.base.remove_observation_level(level);
    for instance in self.instances.iter_mut() {
      instance.remove_observation_level(level);
    }
  }

  pub(crate) fn subtree_changed(&self) -> bool {
    self.base.is_changed() || self.instances.iter().any(|i| i.subtree_changed())
  }

  pub(crate) fn clear_changed(&mut self) {
    self.base.clear_changed();
    for instance in self.instances.iter_mut() {
      instance.clear_changed();
    }
  }

  pub(crate) fn notify_deleted<H: ObservationHandler>(&self, handler: &mut H) {
    if self.base.is_under_observation() {
      handler.resource_to_be_deleted(self.base.path());
    }
    for instance in self.instances.iter() {
      instance.notify_deleted(handler);
    }
  }

  pub(crate) fn report<H: ObservationHandler>(&mut self, now: Millis, handler: &mut H) {
    if self.base.is_under_observation() {
      if self.subtree_changed() {
        if let Some(r) = self.base.report_handler_mut() {
          r.set_pending();
        }
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
                                       true);
        self.clear_changed();
      }
    }

    for instance in self.instances.iter_mut() {
      instance.report(now, handler);
    }
  }

  fn structural_change(&mut self) {
    self.base.set_changed();
    if let Some(r) = self.base.report_handler_mut() {
      r.set_pending();
    }
  }
}
