use newt_msg::{code, observe::Action, ContentFormat, Header};
use std_alloc::vec::Vec;

use crate::base::{negotiate_tlv, Base, Key, Name, Observation, Operation};
use crate::observe::ObservationHandler;
use crate::report::Millis;
use crate::resource::Resource;
use crate::resource_base;
use crate::tlv::{de, ser};
use crate::value::{ResourceType, Value};
use crate::Error;

/// An LwM2M object instance, owning the resources beneath it.
///
/// Created only through [`Object::create_instance`](crate::Object::create_instance).
#[derive(Debug)]
pub struct ObjectInstance {
  base: Base,
  resources: Vec<Resource>,
  object_name: Name,
}

impl ObjectInstance {
  pub(crate) fn new(parent_path: &str, object_name: &Name, instance_id: u16) -> Result<Self, Error> {
    let base = Base::new(parent_path,
                         Key::Id(instance_id),
                         Operation::GET,
                         true,
                         ContentFormat::Tlv)?;

    Ok(ObjectInstance { base,
                        resources: Vec::new(),
                        object_name: object_name.clone() })
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

  /// Name of the enclosing object
  pub fn object_name(&self) -> &str {
    &self.object_name
  }

  /// Create a GET-only resource carrying a fixed value; a PUT from the
  /// server yields 4.05.
  ///
  /// With `multiple` set the value must be [`Value::None`] and instances
  /// are added through [`Resource::create_instance`].
  pub fn create_static_resource<'k>(&mut self,
                                    key: impl Into<Key<'k>>,
                                    kind: ResourceType,
                                    value: Value,
                                    multiple: bool)
                                    -> Result<&mut Resource, Error> {
    let resource = Resource::new_static(self.base.path(),
                                        key.into(),
                                        kind,
                                        value,
                                        multiple,
                                        &self.object_name,
                                        self.instance_id())?;
    self.adopt(resource)
  }

  /// Create a resource the server may read and write (operations default
  /// to GET + PUT) and, when `observable`, observe.
  pub fn create_dynamic_resource<'k>(&mut self,
                                     key: impl Into<Key<'k>>,
                                     kind: ResourceType,
                                     observable: bool,
                                     multiple: bool)
                                     -> Result<&mut Resource, Error> {
    let resource = Resource::new_dynamic(self.base.path(),
                                         key.into(),
                                         kind,
                                         observable,
                                         multiple,
                                         &self.object_name,
                                         self.instance_id())?;
    self.adopt(resource)
  }

  // all-or-nothing: uniqueness is checked before the child is attached
  fn adopt(&mut self, resource: Resource) -> Result<&mut Resource, Error> {
    if self.resources.iter().any(|r| r.base().conflicts_with(resource.base())) {
      return Err(Error::AlreadyExists);
    }

    self.resources.push(resource);
    self.structural_change();

    Ok(self.resources.last_mut().unwrap())
  }

  /// Look up a resource by id or name, linear over the (small) sibling
  /// sequence
  pub fn resource<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Resource> {
    let key = key.into();
    self.resources.iter().find(|r| r.base().matches(key))
  }

  /// Mutable lookup of a resource by id or name
  pub fn resource_mut<'k>(&mut self, key: impl Into<Key<'k>>) -> Option<&mut Resource> {
    let key = key.into();
    self.resources.iter_mut().find(|r| r.base().matches(key))
  }

  /// All resources, in creation order
  pub fn resources(&self) -> &[Resource] {
    &self.resources
  }

  /// Number of resources
  pub fn resource_count(&self) -> usize {
    self.resources.len()
  }

  /// Remove a resource by id or name
  pub fn remove_resource<'k, H: ObservationHandler>(&mut self,
                                                    key: impl Into<Key<'k>>,
                                                    handler: &mut H)
                                                    -> bool {
    let key = key.into();
    match self.resources.iter().position(|r| r.base().matches(key)) {
      | Some(ix) => {
        self.resources[ix].notify_deleted(handler);
        self.resources.remove(ix);
        self.structural_change();
        true
      },
      | None => false,
    }
  }

  /// GET against this instance: a TLV aggregate of all resources
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

    let payload = match ser::serialize_object_instance(self) {
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
      | Some(Action::Register) => self.add_observation_level(Observation::OBJECT_INSTANCE),
      | Some(Action::Deregister) => self.remove_observation_level(Observation::OBJECT_INSTANCE),
      | None => (),
    }

    resp
  }

  /// PUT against this instance: observation attributes when a uri-query
  /// is present, otherwise a TLV write across the existing resources
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
      | None if self.base.content_type().is_tlv() => (),
      | f => {
        log::error!("handle_put {} - content format {:?} not supported", self.base.path(), f);
        return Header::response_to(req, code::UNSUPPORTED_CONTENT_FORMAT);
      },
    }

    let code = match de::deserialize_resources(&req.payload, self, de::Mode::Put) {
      | Ok(()) => {
        handler.value_updated(self.base.path());
        code::CHANGED
      },
      | Err(e) => resource_base::de_error_code(e),
    };

    Header::response_to(req, code)
  }

  /// POST against this instance: a TLV write that may create resource
  /// instances under existing multi-instance resources
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

    let code = match de::deserialize_resources(&req.payload, self, de::Mode::Post) {
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
    for resource in self.resources.iter_mut() {
      resource.add_observation_level(level);
    }
  }

  pub(crate) fn remove_observation_level(&mut self, level: Observation) {
    self.base.remove_observation_level(level);
    for resource in self.resources.iter_mut() {
      resource.remove_observation_level(level);
    }
  }

  pub(crate) fn subtree_changed(&self) -> bool {
    self.base.is_changed() || self.resources.iter().any(|r| r.subtree_changed())
  }

  pub(crate) fn clear_changed(&mut self) {
    self.base.clear_changed();
    for resource in self.resources.iter_mut() {
      resource.clear_changed();
    }
  }

  pub(crate) fn notify_deleted<H: ObservationHandler>(&self, handler: &mut H) {
    if self.base.is_under_observation() {
      handler.resource_to_be_deleted(self.base.path());
    }
    for resource in self.resources.iter() {
      resource.notify_deleted(handler);
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
                                       false);
        self.clear_changed();
      }
    }

    for resource in self.resources.iter_mut() {
      resource.report(now, handler);
    }
  }

  fn structural_change(&mut self) {
    self.base.set_changed();
    if let Some(r) = self.base.report_handler_mut() {
      r.set_pending();
    }
  }
}
