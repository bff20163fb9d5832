/// Runtime config for a [`Tree`](crate::Tree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// Max-Age seeded into objects created through the tree, in seconds.
  ///
  /// The Max-Age response option is only emitted for nodes whose max-age
  /// is neither 0 (disabled) nor 60 (the CoAP default, which a missing
  /// option already implies).
  ///
  /// ```
  /// use newt::Config;
  ///
  /// assert_eq!(Config::default().default_max_age, 0);
  /// ```
  pub default_max_age: u32,
}

impl Default for Config {
  fn default() -> Self {
    Config { default_max_age: 0 }
  }
}
