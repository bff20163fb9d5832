//! Test support: canned trees and a recording observation handler.

use newt_msg::{Code, Token};

use crate::base::Observation;
use crate::observe::ObservationHandler;
use crate::value::{ResourceType, Value};
use crate::Tree;

/// A Device-object tree: `3/0/0` manufacturer "ACME" (static), `3/0/6`
/// power sources (multi, instances `{0 -> 1, 1 -> 5}`), `3/0/9` battery
/// level (dynamic, observable).
pub(crate) fn device_tree() -> Tree {
  let mut tree = Tree::new();
  let object = tree.create_object(3).unwrap();
  let oi = object.create_instance(0).unwrap();

  oi.create_static_resource(0u16,
                            ResourceType::String,
                            Value::String(b"ACME".to_vec()),
                            false)
    .unwrap();

  let power = oi.create_dynamic_resource(6u16, ResourceType::Integer, true, true)
                .unwrap();
  power.create_instance(0).unwrap().set_value(Value::Integer(1)).unwrap();
  power.create_instance(1).unwrap().set_value(Value::Integer(5)).unwrap();

  oi.create_dynamic_resource(9u16, ResourceType::Integer, true, false)
    .unwrap();

  tree
}

/// The same shape as [`device_tree`] with every resource writable and no
/// values set
pub(crate) fn device_schema() -> Tree {
  let mut tree = Tree::new();
  let object = tree.create_object(3).unwrap();
  let oi = object.create_instance(0).unwrap();

  oi.create_dynamic_resource(0u16, ResourceType::String, false, false)
    .unwrap();
  oi.create_dynamic_resource(6u16, ResourceType::Integer, false, true)
    .unwrap();
  oi.create_dynamic_resource(9u16, ResourceType::Integer, false, false)
    .unwrap();

  tree
}

#[derive(Debug, Default)]
pub(crate) struct RecordingHandler {
  pub(crate) notifications: Vec<(String, Token, Observation, bool)>,
  pub(crate) delayed: Vec<(String, Token, Code)>,
  pub(crate) deleted: Vec<String>,
  pub(crate) updated: Vec<String>,
}

impl ObservationHandler for RecordingHandler {
  fn observation_to_be_sent(&mut self, path: &str, token: Token, level: Observation, send_object: bool) {
    self.notifications.push((path.into(), token, level, send_object));
  }

  fn send_delayed_response(&mut self, path: &str, token: Token, code: Code) {
    self.delayed.push((path.into(), token, code));
  }

  fn resource_to_be_deleted(&mut self, path: &str) {
    self.deleted.push(path.into());
  }

  fn value_updated(&mut self, path: &str) {
    self.updated.push(path.into());
  }
}
