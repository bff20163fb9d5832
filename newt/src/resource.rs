use newt_msg::{code, observe::Action, Code, ContentFormat, Header, Token};
use std_alloc::boxed::Box;
use std_alloc::vec::Vec;

use crate::base::{negotiate_tlv, Base, Key, Name, Observation, Operation};
use crate::observe::ObservationHandler;
use crate::report::Millis;
use crate::resource_base;
use crate::resource_instance::ResourceInstance;
use crate::tlv::{de, ser};
use crate::value::{ResourceType, Value};
use crate::Error;

/// Parameters handed to an execute callback when a POST fires a resource
#[derive(Debug)]
pub struct Execute<'a> {
  object_name: &'a str,
  resource_name: &'a str,
  object_instance_id: u16,
  args: &'a [u8],
}

impl<'a> Execute<'a> {
  /// Name of the enclosing object
  pub fn object_name(&self) -> &str {
    self.object_name
  }

  /// Name of the executed resource
  pub fn resource_name(&self) -> &str {
    self.resource_name
  }

  /// Id of the enclosing object instance
  pub fn object_instance_id(&self) -> u16 {
    self.object_instance_id
  }

  /// POST payload bytes passed as the execute argument
  pub fn args(&self) -> &[u8] {
    self.args
  }
}

type ExecuteFn = Box<dyn FnMut(&Execute) -> Vec<u8>>;

/// An LwM2M resource.
///
/// A single-instance resource carries its own typed value; a
/// multi-instance one owns [`ResourceInstance`] children instead and
/// aggregates them as TLV on the wire. Created only through the owning
/// [`ObjectInstance`](crate::ObjectInstance)'s factory methods.
pub struct Resource {
  base: Base,
  kind: ResourceType,
  value: Value,
  instances: Vec<ResourceInstance>,
  multiple: bool,
  delayed_response: bool,
  delayed_token: Option<Token>,
  execute: Option<ExecuteFn>,
  object_name: Name,
  object_instance_id: u16,
}

impl Resource {
  fn new(parent_path: &str,
         key: Key,
         kind: ResourceType,
         operation: Operation,
         observable: bool,
         multiple: bool,
         object_name: &Name,
         object_instance_id: u16)
         -> Result<Self, Error> {
    let content_type = if multiple { ContentFormat::Tlv } else { ContentFormat::Text };
    let base = Base::new(parent_path, key, operation, observable, content_type)?;

    Ok(Resource { base,
                  kind,
                  value: Value::None,
                  instances: Vec::new(),
                  multiple,
                  delayed_response: false,
                  delayed_token: None,
                  execute: None,
                  object_name: object_name.clone(),
                  object_instance_id })
  }

  pub(crate) fn new_static(parent_path: &str,
                           key: Key,
                           kind: ResourceType,
                           value: Value,
                           multiple: bool,
                           object_name: &Name,
                           object_instance_id: u16)
                           -> Result<Self, Error> {
    if multiple && !value.is_none() {
      return Err(Error::InvalidParameter);
    }
    Value::check(&value, kind)?;

    let mut r = Self::new(parent_path,
                          key,
                          kind,
                          Operation::GET,
                          false,
                          multiple,
                          object_name,
                          object_instance_id)?;
    r.value = value;
    Ok(r)
  }

  pub(crate) fn new_dynamic(parent_path: &str,
                            key: Key,
                            kind: ResourceType,
                            observable: bool,
                            multiple: bool,
                            object_name: &Name,
                            object_instance_id: u16)
                            -> Result<Self, Error> {
    Self::new(parent_path,
              key,
              kind,
              Operation::GET.with(Operation::PUT),
              observable,
              multiple,
              object_name,
              object_instance_id)
  }

  /// Shared node header
  pub fn base(&self) -> &Base {
    &self.base
  }

  /// Mutable access to the shared node header
  pub fn base_mut(&mut self) -> &mut Base {
    &mut self.base
  }

  /// Declared value type
  pub fn resource_type(&self) -> ResourceType {
    self.kind
  }

  /// Whether this resource aggregates [`ResourceInstance`]s
  pub fn supports_multiple_instances(&self) -> bool {
    self.multiple
  }

  /// Current value; always [`Value::None`] on a multi-instance resource
  pub fn value(&self) -> &Value {
    &self.value
  }

  /// Replace the value, validating against the declared type. The
  /// previous value is discarded. Multi-instance resources own no value
  /// of their own and refuse this.
  pub fn set_value(&mut self, value: Value) -> Result<(), Error> {
    if self.multiple {
      return Err(Error::InvalidParameter);
    }
    resource_base::commit(&mut self.base, &mut self.value, self.kind, value)
  }

  /// Set an integer (or time) value
  pub fn set_value_int(&mut self, v: i64) -> Result<(), Error> {
    match self.kind {
      | ResourceType::Time => self.set_value(Value::Time(v as u64)),
      | _ => self.set_value(Value::Integer(v)),
    }
  }

  /// Set a float value
  pub fn set_value_float(&mut self, v: f64) -> Result<(), Error> {
    self.set_value(Value::Float(v))
  }

  /// Set a boolean value
  pub fn set_value_bool(&mut self, v: bool) -> Result<(), Error> {
    self.set_value(Value::Boolean(v))
  }

  /// Set a string or opaque value from raw bytes, per the declared type
  pub fn set_value_bytes(&mut self, v: &[u8]) -> Result<(), Error> {
    match self.kind {
      | ResourceType::Opaque => self.set_value(Value::Opaque(v.to_vec())),
      | _ => self.set_value(Value::String(v.to_vec())),
    }
  }

  /// The integer value, if one is set
  pub fn value_int(&self) -> Option<i64> {
    self.value.as_int()
  }

  /// The float value, if one is set
  pub fn value_float(&self) -> Option<f64> {
    self.value.as_float()
  }

  /// The boolean value, if one is set
  pub fn value_bool(&self) -> Option<bool> {
    self.value.as_bool()
  }

  /// The string or opaque bytes, if set
  pub fn value_bytes(&self) -> Option<&[u8]> {
    self.value.as_bytes()
  }

  /// Create an instance under a multi-instance resource; type,
  /// operations and observability are inherited.
  ///
  /// Fails `InvalidParameter` on a single-instance resource and
  /// `AlreadyExists` on a duplicate id.
  pub fn create_instance(&mut self, instance_id: u16) -> Result<&mut ResourceInstance, Error> {
    if !self.multiple {
      return Err(Error::InvalidParameter);
    }
    if self.instances.iter().any(|i| i.instance_id() == instance_id) {
      return Err(Error::AlreadyExists);
    }

    let mut instance = ResourceInstance::new(self.base.path(),
                                             instance_id,
                                             self.kind,
                                             self.base.operation(),
                                             self.base.is_observable())?;
    instance.add_observation_level(self.base.observation_level());

    self.instances.push(instance);
    self.structural_change();

    Ok(self.instances.last_mut().unwrap())
  }

  /// Look up an instance by id
  pub fn instance(&self, instance_id: u16) -> Option<&ResourceInstance> {
    self.instances.iter().find(|i| i.instance_id() == instance_id)
  }

  /// Mutable lookup of an instance by id
  pub fn instance_mut(&mut self, instance_id: u16) -> Option<&mut ResourceInstance> {
    self.instances.iter_mut().find(|i| i.instance_id() == instance_id)
  }

  /// All instances, in creation order
  pub fn instances(&self) -> &[ResourceInstance] {
    &self.instances
  }

  /// Number of instances
  pub fn instance_count(&self) -> usize {
    self.instances.len()
  }

  /// Remove an instance. Removing the last one leaves the resource
  /// empty, not deleted.
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

  /// Defer POST responses until the application calls
  /// [`send_delayed_response`](Self::send_delayed_response)
  pub fn set_delayed_response(&mut self, delayed: bool) {
    self.delayed_response = delayed;
  }

  /// Whether POST responses are deferred
  pub fn delayed_response(&self) -> bool {
    self.delayed_response
  }

  /// Register the callback run when a POST executes this resource; its
  /// returned bytes become the (non-delayed) response payload
  pub fn set_execute_callback<F>(&mut self, f: F)
    where F: FnMut(&Execute) -> Vec<u8> + 'static
  {
    self.execute = Some(Box::new(f));
  }

  /// Emit the deferred response to an earlier POST through `handler`,
  /// consuming the stored token.
  ///
  /// Returns false when delayed responses are disabled or no POST is
  /// pending.
  pub fn send_delayed_response<H: ObservationHandler>(&mut self, code: Code, handler: &mut H) -> bool {
    if !self.delayed_response {
      return false;
    }

    match self.delayed_token.take() {
      | Some(token) => {
        handler.send_delayed_response(self.base.path(), token, code);
        true
      },
      | None => {
        log::error!("send_delayed_response {} - no pending request", self.base.path());
        false
      },
    }
  }

  /// GET against this resource. A multi-instance resource answers with a
  /// TLV aggregate of all its instances.
  pub fn handle_get<H: ObservationHandler>(&mut self, req: &Header, _handler: &mut H) -> Header {
    if !self.multiple {
      return resource_base::handle_get(&mut self.base,
                                       self.kind,
                                       &self.value,
                                       crate::tlv::TYPE_RESOURCE,
                                       Observation::RESOURCE,
                                       req);
    }

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

    let payload = match ser::serialize_resource(self) {
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
      | Some(Action::Register) => self.add_observation_level(Observation::RESOURCE),
      | Some(Action::Deregister) => self.remove_observation_level(Observation::RESOURCE),
      | None => (),
    }

    resp
  }

  /// PUT against this resource: observation attributes when a uri-query
  /// is present, otherwise a value write
  pub fn handle_put<H: ObservationHandler>(&mut self, req: &Header, handler: &mut H) -> Header {
    if !self.multiple {
      return resource_base::handle_put(&mut self.base, self.kind, &mut self.value, req, handler);
    }

    log::debug!("handle_put {}", self.base.path());

    if let Some(query) = &req.uri_query {
      let code = resource_base::handle_observation_attributes(&mut self.base, &self.value, query);

      if code == code::CHANGED && self.base.is_under_observation() {
        for instance in self.instances.iter_mut() {
          if let Some(r) = instance.base_mut().report_handler_mut() {
            r.set_pending();
          }
        }
      }

      return Header::response_to(req, code);
    }

    if !self.base.operation().allows(Operation::PUT) {
      log::error!("handle_put {} - method not allowed", self.base.path());
      return Header::response_to(req, code::METHOD_NOT_ALLOWED);
    }

    match req.content_format {
      | Some(f) if !f.is_tlv() => {
        log::error!("handle_put {} - content format {:?} not supported", self.base.path(), f);
        return Header::response_to(req, code::UNSUPPORTED_CONTENT_FORMAT);
      },
      | Some(f) => self.base.set_content_type(f),
      | None => (),
    }

    let code = match de::deserialize_resource_instances(&req.payload, self, de::Mode::Put) {
      | Ok(()) => {
        handler.value_updated(self.base.path());
        code::CHANGED
      },
      | Err(e) => resource_base::de_error_code(e),
    };

    Header::response_to(req, code)
  }

  /// POST (execute) against this resource.
  ///
  /// With `delayed_response` set, the request token is stored and a bare
  /// `2.04` goes out immediately; the registered execute callback still
  /// runs so the application can start the work and respond later.
  pub fn handle_post<H: ObservationHandler>(&mut self, req: &Header, _handler: &mut H) -> Header {
    log::debug!("handle_post {}", self.base.path());

    if !self.base.operation().allows(Operation::POST) {
      log::error!("handle_post {} - method not allowed", self.base.path());
      return Header::response_to(req, code::METHOD_NOT_ALLOWED);
    }

    match req.content_format {
      | None | Some(ContentFormat::Text) => (),
      | Some(f) => {
        log::error!("handle_post {} - content format {:?} not supported", self.base.path(), f);
        return Header::response_to(req, code::UNSUPPORTED_CONTENT_FORMAT);
      },
    }

    let mut resp = Header::response_to(req, code::CHANGED);

    if self.delayed_response {
      if !req.token.is_empty() {
        if self.delayed_token.is_some() {
          log::warn!("{} - replacing a delayed-response token that was never answered",
                     self.base.path());
        }
        self.delayed_token = Some(req.token);
      }
    }

    let object_name = self.object_name.clone();
    let resource_name = self.base.name_string().clone();
    let exec = Execute { object_name: object_name.as_str(),
                         resource_name: resource_name.as_str(),
                         object_instance_id: self.object_instance_id,
                         args: &req.payload };

    if let Some(f) = self.execute.as_mut() {
      let out = f(&exec);
      if !self.delayed_response {
        resp.payload = out;
      }
    }

    resp
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

impl core::fmt::Debug for Resource {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Resource")
     .field("base", &self.base)
     .field("kind", &self.kind)
     .field("value", &self.value)
     .field("instances", &self.instances)
     .field("multiple", &self.multiple)
     .field("delayed_response", &self.delayed_response)
     .field("delayed_token", &self.delayed_token)
     .finish_non_exhaustive()
  }
}

impl Drop for Resource {
  fn drop(&mut self) {
    if self.delayed_token.is_some() {
      log::warn!("{} - dropped while a delayed POST response was still pending",
                 self.base.path());
    }
  }
}
