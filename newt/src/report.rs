use crate::value::Value;

/// A duration in milliseconds; the single shared tick the report handler
/// runs on is expressed in these
pub type Millis = embedded_time::duration::Milliseconds<u64>;

// PUT attribute names checked from the server
const PMIN: &str = "pmin";
const PMAX: &str = "pmax";
const GT: &str = "gt";
const LT: &str = "lt";
const ST_SIZE: &str = "st";

#[derive(Clone, Copy, Debug, PartialEq)]
struct Attributes {
  pmin: f32,
  pmax: f32,
  gt: Option<f64>,
  lt: Option<f64>,
  st: Option<f64>,
}

impl Default for Attributes {
  fn default() -> Self {
    Attributes { pmin: 1.0,
                 pmax: 0.0,
                 gt: None,
                 lt: None,
                 st: None }
  }
}

/// Observation attributes and notification triggering for one observable
/// node.
///
/// Created lazily: the first attribute PUT or observation registration
/// allocates one. Wall time is supplied by the owner through
/// [`ReportHandler::tick`]; the handler itself never reads a clock, so
/// ticks may be coalesced or delivered late and the trigger rule still
/// holds: fire when at least `pmin` elapsed since the last send AND
/// (the value changed meaningfully OR `pmax` elapsed).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ReportHandler {
  attrs: Attributes,
  last_value: f64,
  window_start: Option<Millis>,
  pending: bool,
}

impl ReportHandler {
  /// Create a handler with default attributes (`pmin` 1 s, `pmax`
  /// disabled, no band, no step)
  pub fn new() -> Self {
    Default::default()
  }

  /// Minimum seconds between notifications
  pub fn pmin(&self) -> f32 {
    self.attrs.pmin
  }

  /// Maximum seconds between notifications, 0 when disabled
  pub fn pmax(&self) -> f32 {
    self.attrs.pmax
  }

  /// Lower boundary of the notification band
  pub fn gt(&self) -> Option<f64> {
    self.attrs.gt
  }

  /// Upper boundary of the notification band
  pub fn lt(&self) -> Option<f64> {
    self.attrs.lt
  }

  /// Minimum change between reported values
  pub fn st(&self) -> Option<f64> {
    self.attrs.st
  }

  /// Seed the running last-reported value from the node's current value,
  /// done before an attribute write on integer and float resources
  pub fn init_value(&mut self, value: &Value) {
    if let Some(v) = value.as_numeric() {
      self.last_value = v;
    }
  }

  /// Parse a `pmin=..&gt=..`-style uri-query into the stored attributes.
  ///
  /// All-or-nothing: any unparsable number or inconsistent combination
  /// (`pmax` below `pmin`, non-positive `st`, `gt` not below `lt`) leaves
  /// the previous attributes in place and returns false.
  ///
  /// ```
  /// use newt::ReportHandler;
  ///
  /// let mut r = ReportHandler::new();
  /// assert!(r.parse_notification_attributes("pmin=5&pmax=60&st=5"));
  /// assert_eq!(r.pmin(), 5.0);
  ///
  /// assert!(!r.parse_notification_attributes("pmin=banana"));
  /// assert_eq!(r.pmin(), 5.0);
  /// ```
  pub fn parse_notification_attributes(&mut self, query: &str) -> bool {
    let mut candidate = self.attrs;

    for pair in query.split('&') {
      let (key, value) = match pair.split_once('=') {
        | Some(kv) => kv,
        | None => return false,
      };

      match key {
        | PMIN => match value.parse::<f32>() {
          | Ok(v) => candidate.pmin = if v < 1.0 { 1.0 } else { v },
          | Err(_) => return false,
        },
        | PMAX => match value.parse::<f32>() {
          | Ok(v) => candidate.pmax = v,
          | Err(_) => return false,
        },
        | GT => match value.parse::<f64>() {
          | Ok(v) => candidate.gt = Some(v),
          | Err(_) => return false,
        },
        | LT => match value.parse::<f64>() {
          | Ok(v) => candidate.lt = Some(v),
          | Err(_) => return false,
        },
        | ST_SIZE => match value.parse::<f64>() {
          | Ok(v) => candidate.st = Some(v),
          | Err(_) => return false,
        },
        // servers may append query params that are not attributes
        | _ => (),
      }
    }

    if candidate.pmax != 0.0 && candidate.pmax < candidate.pmin {
      return false;
    }
    if matches!(candidate.st, Some(st) if st <= 0.0) {
      return false;
    }
    if let (Some(gt), Some(lt)) = (candidate.gt, candidate.lt) {
      if gt >= lt {
        return false;
      }
    }

    self.attrs = candidate;
    true
  }

  /// Record a new numeric value, latching a pending notification when the
  /// change is meaningful: a `gt`/`lt` boundary was crossed, the change
  /// is at least `st`, or no numeric attribute is set at all and the
  /// value differs from the last one reported.
  pub fn value_changed(&mut self, v: f64) {
    let crossed = |boundary: Option<f64>| match boundary {
      | Some(b) => (self.last_value <= b) != (v <= b),
      | None => false,
    };

    let stepped = matches!(self.attrs.st, Some(st) if (v - self.last_value).abs() >= st);

    let no_numeric_attrs =
      self.attrs.gt.is_none() && self.attrs.lt.is_none() && self.attrs.st.is_none();

    if crossed(self.attrs.gt) || crossed(self.attrs.lt) || stepped || (no_numeric_attrs && v != self.last_value) {
      self.pending = true;
    }
  }

  /// Latch a pending notification unconditionally (non-numeric value
  /// mutations, structural changes)
  pub fn set_pending(&mut self) {
    self.pending = true;
  }

  /// Whether a meaningful change is waiting for `pmin` to expire
  pub fn is_pending(&self) -> bool {
    self.pending
  }

  /// Advance wall time; returns true when a notification should fire now.
  ///
  /// The first tick only opens the reporting window.
  pub fn tick(&mut self, now: Millis) -> bool {
    let start = match self.window_start {
      | Some(start) => start,
      | None => {
        self.window_start = Some(now);
        return false;
      },
    };

    let elapsed = now.0.saturating_sub(start.0) as f32 / 1000.0;

    let fire = elapsed >= self.attrs.pmin
               && (self.pending || (self.attrs.pmax != 0.0 && elapsed >= self.attrs.pmax));

    if fire {
      self.window_start = Some(now);
      self.pending = false;
    }

    fire
  }

  /// Record the value that went out with a fired notification so band and
  /// step triggers compare against what the observer last saw
  pub fn record_sent(&mut self, value: &Value) {
    if let Some(v) = value.as_numeric() {
      self.last_value = v;
    }
  }
}
