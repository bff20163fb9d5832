use core::fmt::Write as _;

use newt_common::String;
use newt_msg::observe::Action;
use newt_msg::{ContentFormat, Header, Token};
use std_alloc::boxed::Box;

use crate::constants::{MAX_ALLOWED_STRING_LENGTH, MAX_OBJECT_PATH_NAME};
use crate::report::ReportHandler;
use crate::value::ResourceType;
use crate::Error;

/// Short textual node identity; stays inline for the typical `"9"`-sized name
pub(crate) type Name = String<64>;

/// Allowed CoAP methods, as a bitset.
///
/// ```
/// use newt::Operation;
///
/// let ops = Operation::GET.with(Operation::PUT);
/// assert!(ops.allows(Operation::PUT));
/// assert!(!ops.allows(Operation::POST));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Operation(u8);

impl Operation {
  /// No method allowed
  pub const NONE: Operation = Operation(0);
  /// GET allowed
  pub const GET: Operation = Operation(0x01);
  /// PUT allowed
  pub const PUT: Operation = Operation(0x02);
  /// POST allowed
  pub const POST: Operation = Operation(0x04);
  /// DELETE allowed
  pub const DELETE: Operation = Operation(0x08);

  /// Union of two operation sets
  pub const fn with(self, other: Operation) -> Operation {
    Operation(self.0 | other.0)
  }

  /// Whether every bit of `op` is allowed
  pub fn allows(&self, op: Operation) -> bool {
    self.0 & op.0 == op.0
  }
}

/// Granularity at which a node is being observed, as a bitset.
///
/// Adding a level to a node adds it to every descendant, so a resource
/// knows whether a notification for it will be aggregated at the object
/// instance or object level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Observation(u8);

impl Observation {
  /// Not observed
  pub const NONE: Observation = Observation(0);
  /// Observed at resource granularity
  pub const RESOURCE: Observation = Observation(0x01);
  /// Observed at resource-instance granularity
  pub const RESOURCE_INSTANCE: Observation = Observation(0x02);
  /// Observed at object-instance granularity
  pub const OBJECT_INSTANCE: Observation = Observation(0x04);
  /// Observed at object granularity
  pub const OBJECT: Observation = Observation(0x08);

  /// Union of two levels
  pub const fn with(self, other: Observation) -> Observation {
    Observation(self.0 | other.0)
  }

  /// Difference of two levels
  pub const fn without(self, other: Observation) -> Observation {
    Observation(self.0 & !other.0)
  }

  /// Whether `level` is contained in this set
  pub fn contains(&self, level: Observation) -> bool {
    self.0 & level.0 == level.0 && level.0 != 0
  }

  /// Whether no level is set
  pub fn is_none(&self) -> bool {
    self.0 == 0
  }
}

/// Key addressing a child among its siblings: numeric id or short name.
///
/// Lookups prefer the numeric id when a node carries both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key<'a> {
  /// 16-bit numeric id
  Id(u16),
  /// Short textual name
  Name(&'a str),
}

impl From<u16> for Key<'static> {
  fn from(id: u16) -> Self {
    Key::Id(id)
  }
}

impl<'a> From<&'a str> for Key<'a> {
  fn from(name: &'a str) -> Self {
    Key::Name(name)
  }
}

/// Fields common to every node kind: identity, path, allowed operations,
/// observation state, response content type.
///
/// Constructed only by the owning parent's factory methods.
#[derive(Debug)]
pub struct Base {
  name: Name,
  name_id: Option<u16>,
  path: Name,
  operation: Operation,
  observable: bool,
  observation_level: Observation,
  observation_token: Option<Token>,
  observation_number: u32,
  under_observation: bool,
  content_type: ContentFormat,
  max_age: u32,
  changed: bool,
  report: Option<Box<ReportHandler>>,
}

impl Base {
  pub(crate) fn new(parent_path: &str,
                    key: Key,
                    operation: Operation,
                    observable: bool,
                    content_type: ContentFormat)
                    -> Result<Base, Error> {
    let (name, name_id) = match key {
      | Key::Id(id) => {
        let mut name = Name::new();
        write!(name, "{}", id).ok();
        (name, Some(id))
      },
      | Key::Name(s) => {
        if s.is_empty() || s.len() > MAX_ALLOWED_STRING_LENGTH {
          return Err(Error::InvalidParameter);
        }
        (Name::from(s), s.parse::<u16>().ok())
      },
    };

    let mut path = Name::new();
    if !parent_path.is_empty() {
      path.push_str(parent_path);
      path.push('/');
    }
    path.push_str(&name);

    if path.len() > MAX_OBJECT_PATH_NAME {
      return Err(Error::InvalidParameter);
    }

    Ok(Base { name,
              name_id,
              path,
              operation,
              observable,
              observation_level: Observation::NONE,
              observation_token: None,
              observation_number: 0,
              under_observation: false,
              content_type,
              max_age: 0,
              changed: false,
              report: None })
  }

  /// Textual identity; the decimal rendering of the id for nodes created
  /// by numeric id
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Numeric identity, canonical when present
  pub fn name_id(&self) -> Option<u16> {
    self.name_id
  }

  pub(crate) fn name_string(&self) -> &Name {
    &self.name
  }

  /// Canonical slash-joined address of this node
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Allowed CoAP methods
  pub fn operation(&self) -> Operation {
    self.operation
  }

  /// Replace the allowed CoAP methods
  pub fn set_operation(&mut self, operation: Operation) {
    self.operation = operation;
  }

  /// Whether observation requests are honored
  pub fn is_observable(&self) -> bool {
    self.observable
  }

  /// Allow or refuse observation requests
  pub fn set_observable(&mut self, observable: bool) {
    self.observable = observable;
  }

  /// Content type used when a request carries no Accept option
  pub fn content_type(&self) -> ContentFormat {
    self.content_type
  }

  /// Replace the stored content type
  pub fn set_content_type(&mut self, content_type: ContentFormat) {
    self.content_type = content_type;
  }

  /// Response cacheability hint, seconds
  pub fn max_age(&self) -> u32 {
    self.max_age
  }

  /// Replace the cacheability hint
  pub fn set_max_age(&mut self, max_age: u32) {
    self.max_age = max_age;
  }

  /// Whether this node mutated since the last notification flush
  pub fn is_changed(&self) -> bool {
    self.changed
  }

  pub(crate) fn set_changed(&mut self) {
    self.changed = true;
  }

  pub(crate) fn clear_changed(&mut self) {
    self.changed = false;
  }

  /// Levels at which this node is currently observed
  pub fn observation_level(&self) -> Observation {
    self.observation_level
  }

  pub(crate) fn add_observation_level(&mut self, level: Observation) {
    self.observation_level = self.observation_level.with(level);
  }

  pub(crate) fn remove_observation_level(&mut self, level: Observation) {
    self.observation_level = self.observation_level.without(level);
  }

  /// Whether an observer registered on this node
  pub fn is_under_observation(&self) -> bool {
    self.under_observation
  }

  /// Token the observer registered with
  pub fn observation_token(&self) -> Option<Token> {
    self.observation_token
  }

  /// Sequence number sent with the last notification
  pub fn observation_number(&self) -> u32 {
    self.observation_number
  }

  pub(crate) fn next_observation_number(&mut self) -> u32 {
    self.observation_number = self.observation_number.wrapping_add(1);
    self.observation_number
  }

  /// Observation attributes, present once an attribute write or an
  /// observation registration created them
  pub fn report_handler(&self) -> Option<&ReportHandler> {
    self.report.as_deref()
  }

  pub(crate) fn report_handler_mut(&mut self) -> Option<&mut ReportHandler> {
    self.report.as_deref_mut()
  }

  pub(crate) fn ensure_report_handler(&mut self) -> &mut ReportHandler {
    self.report.get_or_insert_with(|| Box::new(ReportHandler::new()))
  }

  /// Handle the Observe option of a GET, if any.
  ///
  /// Registration stores a copy of the request token, bumps nothing, and
  /// echoes the current sequence number in the response; deregistration
  /// drops the token. Values other than 0/1 are a no-op, as is any
  /// Observe option on a non-observable node. The caller propagates the
  /// level change to descendants.
  pub(crate) fn handle_observe(&mut self, req: &Header, resp: &mut Header) -> Option<Action> {
    let action = req.observe.and_then(Action::from_value)?;

    if !self.observable {
      return None;
    }

    match action {
      | Action::Register => {
        log::debug!("{} - observation registered", self.path);
        self.under_observation = true;
        self.observation_token = Some(req.token);
        self.ensure_report_handler();
        resp.observe = Some(self.observation_number);
        Some(Action::Register)
      },
      | Action::Deregister => {
        log::debug!("{} - observation cancelled", self.path);
        self.under_observation = false;
        self.observation_token = None;
        Some(Action::Deregister)
      },
    }
  }

  /// Max-Age is only worth a response option when it is neither disabled
  /// (0) nor the CoAP default (60).
  pub(crate) fn apply_max_age(&self, resp: &mut Header) {
    if self.max_age != 0 && self.max_age != 60 {
      resp.max_age = Some(self.max_age);
    }
  }

  pub(crate) fn conflicts_with(&self, other: &Base) -> bool {
    (self.name_id.is_some() && self.name_id == other.name_id) || self.name == other.name
  }

  /// Whether `key` addresses this node, numeric id winning over name
  pub fn matches(&self, key: Key) -> bool {
    match key {
      | Key::Id(id) => self.name_id == Some(id),
      | Key::Name(s) => {
        if self.name == s {
          true
        } else {
          matches!(s.parse::<u16>(), Ok(id) if self.name_id == Some(id))
        }
      },
    }
  }
}

/// Format a GET response can be rendered in after negotiation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GetFormat {
  Text,
  Opaque,
  Tlv(ContentFormat),
}

impl GetFormat {
  pub(crate) fn content_format(&self) -> ContentFormat {
    match self {
      | GetFormat::Text => ContentFormat::Text,
      | GetFormat::Opaque => ContentFormat::Opaque,
      | GetFormat::Tlv(f) => *f,
    }
  }
}

/// Response format for a single-value node. `None` means 4.06.
pub(crate) fn negotiate_single(accept: Option<ContentFormat>,
                               stored: ContentFormat,
                               kind: ResourceType)
                               -> Option<GetFormat> {
  match accept {
    | Some(ContentFormat::Text) => Some(GetFormat::Text),
    | Some(f) if f.is_tlv() => Some(GetFormat::Tlv(f)),
    | Some(ContentFormat::Opaque) if kind == ResourceType::Opaque => Some(GetFormat::Opaque),
    | Some(_) => None,
    | None if stored.is_tlv() => Some(GetFormat::Tlv(stored)),
    | None if kind == ResourceType::Opaque => Some(GetFormat::Opaque),
    | None => Some(GetFormat::Text),
  }
}

/// Response format for an aggregate node, which only speaks TLV.
/// `None` means 4.06.
pub(crate) fn negotiate_tlv(accept: Option<ContentFormat>) -> Option<ContentFormat> {
  match accept {
    | Some(f) if f.is_tlv() => Some(f),
    | Some(_) => None,
    | None => Some(ContentFormat::Tlv),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn base(key: Key) -> Base {
    Base::new("3/0", key, Operation::GET, false, ContentFormat::Text).unwrap()
  }

  #[test]
  fn numeric_key_renders_name_and_path() {
    let b = base(Key::Id(9));
    assert_eq!(b.name(), "9");
    assert_eq!(b.name_id(), Some(9));
    assert_eq!(b.path(), "3/0/9");
  }

  #[test]
  fn named_key_parses_numeric_identity() {
    assert_eq!(base(Key::Name("13")).name_id(), Some(13));
    assert_eq!(base(Key::Name("reboot")).name_id(), None);
  }

  #[test]
  fn key_match_prefers_id() {
    let b = base(Key::Id(9));
    assert!(b.matches(Key::Id(9)));
    assert!(b.matches(Key::Name("9")));
    assert!(!b.matches(Key::Id(10)));
  }

  #[test]
  fn empty_and_oversized_names_rejected() {
    assert_eq!(Base::new("", Key::Name(""), Operation::NONE, false, ContentFormat::Text).err(),
               Some(Error::InvalidParameter));

    let long = core::str::from_utf8(&[b'a'; 65]).unwrap();
    assert_eq!(Base::new("", Key::Name(long), Operation::NONE, false, ContentFormat::Text).err(),
               Some(Error::InvalidParameter));
  }

  #[test]
  fn sibling_conflicts() {
    assert!(base(Key::Id(9)).conflicts_with(&base(Key::Id(9))));
    assert!(base(Key::Id(9)).conflicts_with(&base(Key::Name("9"))));
    assert!(!base(Key::Id(9)).conflicts_with(&base(Key::Name("battery"))));
  }

  #[test]
  fn max_age_option_omitted_for_default_and_disabled() {
    use newt_msg::code;

    let req = Header::request(code::GET);
    let mut b = base(Key::Id(9));

    for (age, expected) in [(0, None), (60, None), (120, Some(120))] {
      let mut resp = Header::response_to(&req, code::CONTENT);
      b.set_max_age(age);
      b.apply_max_age(&mut resp);
      assert_eq!(resp.max_age, expected);
    }
  }
}
