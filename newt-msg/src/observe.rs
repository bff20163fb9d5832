/// When included in a GET request, the Observe Option extends the GET
/// method so it does not only retrieve a current representation of the
/// target resource, but also requests the server to add or remove an
/// entry in the list of observers of the resource depending on the
/// option value.  Possible values are:
///
///    `0` (register) adds the entry to the list, if not present;
///
///    `1` (deregister) removes the entry from the list, if present
#[derive(Hash, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Action {
  /// The sender would like to observe updates to the resource
  /// addressed by this GET request.
  Register,
  /// The sender would no longer like to observe updates to the
  /// resource addressed by this GET request.
  Deregister,
}

impl Action {
  /// Try to parse from an Observe option value.
  ///
  /// Values other than 0 and 1 yield `None`; the dispatcher treats
  /// them as a plain GET.
  pub fn from_value(n: u32) -> Option<Self> {
    match n {
      | 0 => Some(Action::Register),
      | 1 => Some(Action::Deregister),
      | _ => None,
    }
  }
}

impl From<Action> for u32 {
  fn from(a: Action) -> Self {
    match a {
      | Action::Register => 0,
      | Action::Deregister => 1,
    }
  }
}
