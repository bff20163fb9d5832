use newt_msg::{code, Header};
use std_alloc::vec::Vec;

use crate::base::Key;
use crate::config::Config;
use crate::object::Object;
use crate::observe::ObservationHandler;
use crate::report::Millis;
use crate::Error;

/// The root of an LwM2M object tree and its request dispatcher.
///
/// The application owns the tree, builds it through the factory methods,
/// and feeds it inbound request headers one at a time; the tree routes
/// each request to the addressed node and returns the response header.
/// Periodically calling [`Tree::report`] with the current wall time
/// flushes due observation notifications through the supplied handler.
#[derive(Debug, Default)]
pub struct Tree {
  objects: Vec<Object>,
  config: Config,
}

impl Tree {
  /// An empty tree with default [`Config`]
  pub fn new() -> Self {
    Default::default()
  }

  /// An empty tree with the given [`Config`]
  pub fn with_config(config: Config) -> Self {
    Tree { objects: Vec::new(),
           config }
  }

  /// The tree's config
  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Create an object keyed by its OMA object id.
  ///
  /// Fails `AlreadyExists` when an object with that id (or its decimal
  /// rendering as a name) is already registered.
  pub fn create_object(&mut self, id: u16) -> Result<&mut Object, Error> {
    self.adopt(Object::new(Key::Id(id))?)
  }

  /// Create a custom object keyed by name; a decimal name doubles as the
  /// numeric id
  pub fn create_object_named(&mut self, name: &str) -> Result<&mut Object, Error> {
    self.adopt(Object::new(Key::Name(name))?)
  }

  fn adopt(&mut self, mut object: Object) -> Result<&mut Object, Error> {
    if self.objects.iter().any(|o| o.base().conflicts_with(object.base())) {
      return Err(Error::AlreadyExists);
    }

    object.base_mut().set_max_age(self.config.default_max_age);
    self.objects.push(object);

    Ok(self.objects.last_mut().unwrap())
  }

  /// Look up an object by id or name
  pub fn object<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Object> {
    let key = key.into();
    self.objects.iter().find(|o| o.base().matches(key))
  }

  /// Mutable lookup of an object by id or name
  pub fn object_mut<'k>(&mut self, key: impl Into<Key<'k>>) -> Option<&mut Object> {
    let key = key.into();
    self.objects.iter_mut().find(|o| o.base().matches(key))
  }

  /// All registered objects
  pub fn objects(&self) -> &[Object] {
    &self.objects
  }

  /// Remove an object and everything beneath it, children first
  pub fn remove_object<'k, H: ObservationHandler>(&mut self,
                                                  key: impl Into<Key<'k>>,
                                                  handler: &mut H)
                                                  -> bool {
    let key = key.into();
    match self.objects.iter().position(|o| o.base().matches(key)) {
      | Some(ix) => {
        self.objects[ix].notify_deleted(handler);
        self.objects.remove(ix);
        true
      },
      | None => false,
    }
  }

  /// Route an inbound request to the node its Uri-Path addresses and
  /// return the response.
  ///
  /// Unresolvable or malformed paths answer `4.04`; DELETE is the
  /// orchestrating layer's business and answers `4.05` here.
  pub fn handle<H: ObservationHandler>(&mut self, req: &Header, handler: &mut H) -> Header {
    macro_rules! route {
      ($node:expr) => {
        match req.code {
          | code::GET => $node.handle_get(req, handler),
          | code::PUT => $node.handle_put(req, handler),
          | code::POST => $node.handle_post(req, handler),
          | _ => Header::response_to(req, code::METHOD_NOT_ALLOWED),
        }
      };
    }

    macro_rules! not_found {
      () => {{
        log::debug!("handle - no node at {:?}", req.uri_path);
        return Header::response_to(req, code::NOT_FOUND);
      }};
    }

    let path = match &req.uri_path {
      | Some(p) => p.as_str(),
      | None => not_found!(),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() || segments.len() > 4 {
      not_found!();
    }

    let object = match self.objects
                           .iter_mut()
                           .find(|o| o.base().matches(Key::Name(segments[0])))
    {
      | Some(o) => o,
      | None => not_found!(),
    };

    if segments.len() == 1 {
      return route!(object);
    }

    let instance_id = match segments[1].parse::<u16>() {
      | Ok(id) => id,
      | Err(_) => not_found!(),
    };
    let instance = match object.instance_mut(instance_id) {
      | Some(i) => i,
      | None => not_found!(),
    };

    if segments.len() == 2 {
      return route!(instance);
    }

    let resource = match instance.resource_mut(Key::Name(segments[2])) {
      | Some(r) => r,
      | None => not_found!(),
    };

    if segments.len() == 3 {
      return route!(resource);
    }

    let resource_instance_id = match segments[3].parse::<u16>() {
      | Ok(id) => id,
      | Err(_) => not_found!(),
    };
    match resource.instance_mut(resource_instance_id) {
      | Some(ri) => route!(ri),
      | None => not_found!(),
    }
  }

  /// Advance wall time and flush due observation notifications, in
  /// trigger order, through `handler`. Changed flags across the tree are
  /// cleared once the flush completes.
  pub fn report<H: ObservationHandler>(&mut self, now: Millis, handler: &mut H) {
    for object in self.objects.iter_mut() {
      object.report(now, handler);
    }
    for object in self.objects.iter_mut() {
      object.clear_changed();
    }
  }
}

#[cfg(test)]
mod tests {
  use newt_msg::{code, ContentFormat, Header, Token};

  use super::*;
  use crate::base::Operation;
  use crate::test::{device_tree, RecordingHandler};
  use crate::value::{ResourceType, Value};

  fn get(path: &str) -> Header {
    let mut req = Header::request(code::GET);
    req.uri_path = Some(path.into());
    req
  }

  fn put(path: &str) -> Header {
    let mut req = Header::request(code::PUT);
    req.uri_path = Some(path.into());
    req
  }

  fn post(path: &str) -> Header {
    let mut req = Header::request(code::POST);
    req.uri_path = Some(path.into());
    req
  }

  fn secs(s: u64) -> Millis {
    Millis::new(s * 1000)
  }

  #[test]
  fn static_string_get_as_text() {
    let mut tree = device_tree();

    let mut req = get("3/0/0");
    req.accept = Some(ContentFormat::Text);

    let resp = tree.handle(&req, &mut ());
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.payload, b"ACME");
    assert_eq!(resp.content_format, Some(ContentFormat::Text));
  }

  #[test]
  fn multi_instance_get_as_tlv() {
    let mut tree = device_tree();

    let mut req = get("3/0/6");
    req.accept = Some(ContentFormat::Tlv);

    let resp = tree.handle(&req, &mut ());
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.content_format, Some(ContentFormat::Tlv));
    assert_eq!(resp.payload, [0x41, 0x00, 0x01, 0x41, 0x01, 0x05]);
  }

  #[test]
  fn put_on_static_resource_is_not_allowed() {
    let mut tree = device_tree();

    let mut req = put("3/0/0");
    req.payload = b"EMCA".to_vec();

    assert_eq!(tree.handle(&req, &mut ()).code, code::METHOD_NOT_ALLOWED);
    assert_eq!(tree.object(3u16)
                   .unwrap()
                   .instance(0)
                   .unwrap()
                   .resource(0u16)
                   .unwrap()
                   .value(),
               &Value::String(b"ACME".to_vec()));
  }

  #[test]
  fn observation_attributes_then_throttled_notification() {
    let mut tree = device_tree();
    let mut handler = RecordingHandler::default();

    tree.object_mut(3u16)
        .unwrap()
        .instance_mut(0)
        .unwrap()
        .resource_mut(9u16)
        .unwrap()
        .set_value(Value::Integer(30))
        .unwrap();

    // observe 3/0/9, then configure attributes
    let mut req = get("3/0/9");
    req.token = Token::from_slice(&[0x01]);
    req.observe = Some(0);
    assert_eq!(tree.handle(&req, &mut handler).code, code::CONTENT);

    let mut attrs = put("3/0/9");
    attrs.uri_query = Some("pmin=5&pmax=60&gt=20&lt=80&st=5".into());
    assert_eq!(tree.handle(&attrs, &mut handler).code, code::CHANGED);

    tree.report(secs(0), &mut handler);

    tree.object_mut(3u16)
        .unwrap()
        .instance_mut(0)
        .unwrap()
        .resource_mut(9u16)
        .unwrap()
        .set_value(Value::Integer(36))
        .unwrap();

    tree.report(secs(4), &mut handler);
    assert!(handler.notifications.is_empty(), "pmin not yet elapsed");

    tree.report(secs(5), &mut handler);
    assert_eq!(handler.notifications.len(), 1);

    let (path, token, _, send_object) = &handler.notifications[0];
    assert_eq!(path, "3/0/9");
    assert_eq!(token, &Token::from_slice(&[0x01]));
    assert!(!send_object);
  }

  #[test]
  fn invalid_observation_attributes_are_bad_request() {
    let mut tree = device_tree();

    let mut attrs = put("3/0/9");
    attrs.uri_query = Some("pmin=abc".into());
    assert_eq!(tree.handle(&attrs, &mut ()).code, code::BAD_REQUEST);
  }

  #[test]
  fn delayed_post_stores_token_and_answers_later() {
    let mut tree = device_tree();
    let mut handler = RecordingHandler::default();

    {
      let oi = tree.object_mut(3u16).unwrap().instance_mut(0).unwrap();
      let reboot = oi.create_dynamic_resource(4u16, ResourceType::String, false, false)
                     .unwrap();
      reboot.base_mut().set_operation(Operation::POST);
      reboot.set_delayed_response(true);
    }

    let mut req = post("3/0/4");
    req.token = Token::from_slice(&[0xAB, 0xCD]);

    let resp = tree.handle(&req, &mut handler);
    assert_eq!(resp.code, code::CHANGED);
    assert!(resp.payload.is_empty());

    let reboot = tree.object_mut(3u16)
                     .unwrap()
                     .instance_mut(0)
                     .unwrap()
                     .resource_mut(4u16)
                     .unwrap();
    assert!(reboot.send_delayed_response(code::CHANGED, &mut handler));

    assert_eq!(handler.delayed.len(), 1);
    let (path, token, code) = &handler.delayed[0];
    assert_eq!(path, "3/0/4");
    assert_eq!(token, &Token::from_slice(&[0xAB, 0xCD]));
    assert_eq!(code, &code::CHANGED);

    // the token is spent
    assert!(!reboot.send_delayed_response(code::CHANGED, &mut handler));
  }

  #[test]
  fn execute_output_becomes_post_payload() {
    let mut tree = device_tree();

    {
      let oi = tree.object_mut(3u16).unwrap().instance_mut(0).unwrap();
      let r = oi.create_dynamic_resource("factory", ResourceType::String, false, false)
                .unwrap();
      r.base_mut().set_operation(Operation::POST);
      r.set_execute_callback(|exec| {
        assert_eq!(exec.object_name(), "3");
        assert_eq!(exec.resource_name(), "factory");
        assert_eq!(exec.object_instance_id(), 0);
        let mut out = b"ran:".to_vec();
        out.extend_from_slice(exec.args());
        out
      });
    }

    let mut req = post("3/0/factory");
    req.content_format = Some(ContentFormat::Text);
    req.payload = b"5".to_vec();

    let resp = tree.handle(&req, &mut ());
    assert_eq!(resp.code, code::CHANGED);
    assert_eq!(resp.payload, b"ran:5");
  }

  #[test]
  fn post_rejects_binary_content() {
    let mut tree = device_tree();

    {
      let oi = tree.object_mut(3u16).unwrap().instance_mut(0).unwrap();
      let r = oi.create_dynamic_resource(4u16, ResourceType::String, false, false)
                .unwrap();
      r.base_mut().set_operation(Operation::POST);
    }

    let mut req = post("3/0/4");
    req.content_format = Some(ContentFormat::Opaque);
    assert_eq!(tree.handle(&req, &mut ()).code, code::UNSUPPORTED_CONTENT_FORMAT);
  }

  #[test]
  fn text_put_updates_value_and_reports() {
    let mut tree = device_tree();
    let mut handler = RecordingHandler::default();

    let mut req = put("3/0/9");
    req.content_format = Some(ContentFormat::Text);
    req.payload = b"64".to_vec();

    assert_eq!(tree.handle(&req, &mut handler).code, code::CHANGED);
    assert_eq!(handler.updated, ["3/0/9"]);
    assert_eq!(tree.object(3u16)
                   .unwrap()
                   .instance(0)
                   .unwrap()
                   .resource(9u16)
                   .unwrap()
                   .value_int(),
               Some(64));
  }

  #[test]
  fn unparsable_text_put_is_bad_request() {
    let mut tree = device_tree();

    let mut req = put("3/0/9");
    req.content_format = Some(ContentFormat::Text);
    req.payload = b"full".to_vec();

    assert_eq!(tree.handle(&req, &mut ()).code, code::BAD_REQUEST);
  }

  #[test]
  fn json_accept_is_not_acceptable() {
    let mut tree = device_tree();

    let mut req = get("3/0/0");
    req.accept = Some(ContentFormat::Json);
    assert_eq!(tree.handle(&req, &mut ()).code, code::NOT_ACCEPTABLE);

    let mut req = get("3/0/6");
    req.accept = Some(ContentFormat::Text);
    assert_eq!(tree.handle(&req, &mut ()).code, code::NOT_ACCEPTABLE);
  }

  #[test]
  fn unknown_paths_are_not_found() {
    let mut tree = device_tree();

    for path in ["4", "3/1", "3/0/99", "3/0/6/7", "3/0/0/0/0", "3/x"] {
      assert_eq!(tree.handle(&get(path), &mut ()).code, code::NOT_FOUND, "{}", path);
    }
  }

  #[test]
  fn delete_is_the_collaborators_business() {
    let mut tree = device_tree();

    let mut req = Header::request(code::DELETE);
    req.uri_path = Some("3/0".into());
    assert_eq!(tree.handle(&req, &mut ()).code, code::METHOD_NOT_ALLOWED);
  }

  #[test]
  fn firmware_package_uri_is_length_capped() {
    let mut tree = Tree::new();
    let fw = tree.create_object(5).unwrap();
    let oi = fw.create_instance(0).unwrap();
    oi.create_dynamic_resource(1u16, ResourceType::String, false, false)
      .unwrap();

    let mut req = put("5/0/1");
    req.content_format = Some(ContentFormat::Tlv);
    req.payload = std_alloc::vec![0u8; 300];

    assert_eq!(tree.handle(&req, &mut ()).code, code::NOT_ACCEPTABLE);
  }

  #[test]
  fn observation_stop_clears_token() {
    let mut tree = device_tree();
    let mut handler = RecordingHandler::default();

    let mut start = get("3/0/9");
    start.token = Token::from_slice(&[0x05]);
    start.observe = Some(0);

    let resp = tree.handle(&start, &mut handler);
    assert_eq!(resp.observe, Some(0));

    let mut stop = get("3/0/9");
    stop.token = Token::from_slice(&[0x05]);
    stop.observe = Some(1);

    let resp = tree.handle(&stop, &mut handler);
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.observe, None);

    let r = tree.object(3u16).unwrap().instance(0).unwrap().resource(9u16).unwrap();
    assert!(!r.base().is_under_observation());
    assert_eq!(r.base().observation_token(), None);
  }

  #[test]
  fn observe_with_unknown_value_is_plain_get() {
    let mut tree = device_tree();

    let mut req = get("3/0/0");
    req.observe = Some(7);

    let resp = tree.handle(&req, &mut ());
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.observe, None);
  }

  #[test]
  fn sibling_uniqueness() {
    let mut tree = device_tree();
    assert_eq!(tree.create_object(3).err(), Some(Error::AlreadyExists));

    let object = tree.object_mut(3u16).unwrap();
    assert_eq!(object.create_instance(0).err(), Some(Error::AlreadyExists));

    let oi = object.instance_mut(0).unwrap();
    assert_eq!(oi.create_dynamic_resource(9u16, ResourceType::Integer, false, false)
                 .err(),
               Some(Error::AlreadyExists));
    // a name that renders to an existing id collides too
    assert_eq!(oi.create_dynamic_resource("9", ResourceType::Integer, false, false)
                 .err(),
               Some(Error::AlreadyExists));
  }

  #[test]
  fn object_instance_get_aggregates_as_tlv() {
    let mut tree = device_tree();

    let resp = tree.handle(&get("3/0"), &mut ());
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.content_format, Some(ContentFormat::Tlv));
    assert!(crate::tlv::de::is_resource(&resp.payload));
  }

  #[test]
  fn object_level_observation_notifies_on_descendant_change() {
    let mut tree = device_tree();
    let mut handler = RecordingHandler::default();

    let mut req = get("3");
    req.token = Token::from_slice(&[0x09]);
    req.observe = Some(0);
    assert_eq!(tree.handle(&req, &mut handler).code, code::CONTENT);

    // level propagates to every descendant
    let r = tree.object(3u16).unwrap().instance(0).unwrap().resource(9u16).unwrap();
    assert!(r.base().observation_level().contains(crate::Observation::OBJECT));

    tree.report(secs(0), &mut handler);

    tree.object_mut(3u16)
        .unwrap()
        .instance_mut(0)
        .unwrap()
        .resource_mut(9u16)
        .unwrap()
        .set_value(Value::Integer(50))
        .unwrap();

    tree.report(secs(2), &mut handler);

    assert_eq!(handler.notifications.len(), 1);
    let (path, _, _, send_object) = &handler.notifications[0];
    assert_eq!(path, "3");
    assert!(send_object);
  }

  #[test]
  fn removal_notifies_observed_nodes() {
    let mut tree = device_tree();
    let mut handler = RecordingHandler::default();

    let mut req = get("3/0/9");
    req.observe = Some(0);
    tree.handle(&req, &mut handler);

    assert!(tree.object_mut(3u16)
                .unwrap()
                .instance_mut(0)
                .unwrap()
                .remove_resource(9u16, &mut handler));
    assert_eq!(handler.deleted, ["3/0/9"]);

    assert!(tree.remove_object(3u16, &mut handler));
    assert!(tree.object(3u16).is_none());
  }
}
