use newt_msg::{Code, Token};

use crate::base::Observation;

/// Collaborator notified by the tree when messages need to leave the device.
///
/// The dispatcher itself only ever returns a response header for the request
/// it was handed; everything *unsolicited* — notifications for observed
/// nodes, the second half of a delayed POST exchange — goes through this
/// interface. Nodes identify themselves by canonical path.
///
/// An implementation for `()` is provided for callers that only exercise
/// the request/response surface.
pub trait ObservationHandler {
  /// A notification for the node at `path` should be sent, bearing
  /// `token`. `send_object` asks for the whole enclosing object when the
  /// observation was registered at object level.
  fn observation_to_be_sent(&mut self, path: &str, token: Token, level: Observation, send_object: bool);

  /// Emit the deferred response to a POST on the resource at `path`,
  /// using the token stored when the request was accepted.
  fn send_delayed_response(&mut self, path: &str, token: Token, code: Code);

  /// The node at `path` is about to be removed while observed.
  fn resource_to_be_deleted(&mut self, path: &str);

  /// A PUT updated the value of the node at `path`.
  fn value_updated(&mut self, path: &str);
}

impl ObservationHandler for () {
  fn observation_to_be_sent(&mut self, _: &str, _: Token, _: Observation, _: bool) {}

  fn send_delayed_response(&mut self, _: &str, _: Token, _: Code) {}

  fn resource_to_be_deleted(&mut self, _: &str) {}

  fn value_updated(&mut self, _: &str) {}
}
