//! Names of the configuration and credential items the factory flow
//! reads and writes, plus the validation limits applied to them.

// device general info
/// Bootstrap-mode flag, 0/1 boolean word
pub const USE_BOOTSTRAP: &str = "mbed.UseBootstrap";
/// LwM2M endpoint name, required, at most 64 bytes
pub const ENDPOINT_NAME: &str = "mbed.EndpointName";
/// Cloud account id, required
pub const ACCOUNT_ID: &str = "mbed.AccountID";
/// First-to-claim enrollment flag, optional
pub const FIRST_TO_CLAIM: &str = "mbed.FirstToClaim";

// device meta data, all optional
/// Manufacturer string
pub const MANUFACTURER: &str = "mbed.Manufacturer";
/// Model number string
pub const MODEL_NUMBER: &str = "mbed.ModelNumber";
/// Device type string
pub const DEVICE_TYPE: &str = "mbed.DeviceType";
/// Hardware version string
pub const HARDWARE_VERSION: &str = "mbed.HardwareVersion";
/// Total memory in KB, rendered as text
pub const MEMORY_TOTAL_KB: &str = "mbed.MemoryTotalKB";
/// Serial number string
pub const SERIAL_NUMBER: &str = "mbed.SerialNumber";

// time synchronization
/// Factory-set current time
pub const CURRENT_TIME: &str = "mbed.CurrentTime";
/// Device time zone, optional (missing is only a warning)
pub const DEVICE_TIME_ZONE: &str = "mbed.Timezone";
/// Offset from UTC, optional (missing is only a warning)
pub const UTC_OFFSET: &str = "mbed.UTCOffset";

// bootstrap configuration
/// CA certificate the bootstrap server presents
pub const BOOTSTRAP_SERVER_CA_CERT: &str = "mbed.BootstrapServerCACert";
/// Bootstrap server certificate revocation list
pub const BOOTSTRAP_SERVER_CRL: &str = "mbed.BootstrapServerCRL";
/// Bootstrap server URI
pub const BOOTSTRAP_SERVER_URI: &str = "mbed.BootstrapServerURI";
/// Device certificate (chain) for bootstrap
pub const BOOTSTRAP_DEVICE_CERT: &str = "mbed.BootstrapDeviceCert";
/// Device private key for bootstrap
pub const BOOTSTRAP_DEVICE_PRIVATE_KEY: &str = "mbed.BootstrapDevicePrivateKey";

// LwM2M configuration
/// CA certificate the LwM2M server presents
pub const LWM2M_SERVER_CA_CERT: &str = "mbed.LwM2MServerCACert";
/// LwM2M server certificate revocation list
pub const LWM2M_SERVER_CRL: &str = "mbed.LwM2MServerCRL";
/// LwM2M server URI
pub const LWM2M_SERVER_URI: &str = "mbed.LwM2MServerURI";
/// Device certificate (chain) for LwM2M
pub const LWM2M_DEVICE_CERT: &str = "mbed.LwM2MDeviceCert";
/// Device private key for LwM2M
pub const LWM2M_DEVICE_PRIVATE_KEY: &str = "mbed.LwM2MDevicePrivateKey";

// firmware update
/// Certificate authorizing update manifests
pub const UPDATE_AUTH_CERT: &str = "mbed.UpdateAuthCert";
/// Manifest class id
pub const CLASS_ID: &str = "mbed.ClassId";
/// Manifest vendor id
pub const VENDOR_ID: &str = "mbed.VendorId";

/// Server URIs must carry one of these schemes
pub const COAP: &str = "coap://";
/// Secure variant
pub const COAPS: &str = "coaps://";

/// Longest endpoint-name or metadata string
pub const MAX_ALLOWED_STRING_LENGTH: usize = 64;

/// Boolean config items are stored as a 4-byte word
pub const CONFIG_BOOLEAN_ITEM_SIZE: usize = 4;

/// No believable wall clock reads earlier than this (2017-01-01T00:00:00Z)
pub const MINIMAL_EPOCH_TIME: u64 = 1_483_228_800;

/// Largest tolerated gap between the saved strong time and the current
/// clock before the clock is considered broken, seconds
pub const ALLOWED_TIME_SKEW: u64 = 86_400;
