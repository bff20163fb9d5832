//! Numeric ids, limits and well-known paths used across the client.

/// Longest value (in bytes) a String resource accepts outside of a
/// blockwise transfer
pub const MAX_VALUE_LENGTH: usize = 256;

/// Longest node name, endpoint name, or metadata string
pub const MAX_ALLOWED_STRING_LENGTH: usize = 64;

/// Longest canonical slash-joined node path
pub const MAX_OBJECT_PATH_NAME: usize = 268;

/// The Firmware Package URI resource caps its value well below
/// [`MAX_VALUE_LENGTH`]
pub const MAX_FIRMWARE_PACKAGE_URI_LEN: usize = 255;

/// Path of the Firmware object's Package URI resource
pub const FIRMWARE_PACKAGE_URI_PATH: &str = "5/0/1";

/// OMA object id: Security
pub const M2M_SECURITY_ID: u16 = 0;
/// OMA object id: Server
pub const M2M_SERVER_ID: u16 = 1;
/// OMA object id: Access Control
pub const M2M_ACCESS_CONTROL_ID: u16 = 2;
/// OMA object id: Device
pub const M2M_DEVICE_ID: u16 = 3;
/// OMA object id: Connectivity Monitoring
pub const M2M_CONNECTIVITY_MONITOR_ID: u16 = 4;
/// OMA object id: Firmware Update
pub const M2M_FIRMWARE_ID: u16 = 5;
/// OMA object id: Location
pub const M2M_LOCATION_ID: u16 = 6;
/// OMA object id: Connectivity Statistics
pub const M2M_CONNECTIVITY_STATISTICS_ID: u16 = 7;

/// Device object resource id: Manufacturer
pub const DEVICE_MANUFACTURER: u16 = 0;
/// Device object resource id: Model Number
pub const DEVICE_MODEL_NUMBER: u16 = 1;
/// Device object resource id: Serial Number
pub const DEVICE_SERIAL_NUMBER: u16 = 2;
/// Device object resource id: Reboot (executable)
pub const DEVICE_REBOOT: u16 = 4;
/// Device object resource id: Available Power Sources (multiple)
pub const DEVICE_AVAILABLE_POWER_SOURCES: u16 = 6;
/// Device object resource id: Battery Level
pub const DEVICE_BATTERY_LEVEL: u16 = 9;
/// Device object resource id: Current Time
pub const DEVICE_CURRENT_TIME: u16 = 13;

/// Firmware object resource id: Package
pub const FIRMWARE_PACKAGE: u16 = 0;
/// Firmware object resource id: Package URI
pub const FIRMWARE_PACKAGE_URI: u16 = 1;
/// Firmware object resource id: Update (executable)
pub const FIRMWARE_UPDATE: u16 = 2;
/// Firmware object resource id: State
pub const FIRMWARE_STATE: u16 = 3;

// values per draft-ietf-core-observe-16 / OMA LwM2M CR
/// Observe option value registering an observation
pub const START_OBSERVATION: u32 = 0;
/// Observe option value cancelling an observation
pub const STOP_OBSERVATION: u32 = 1;

/// Smallest token value minted for server-initiated auto observations
pub const AUTO_OBS_TOKEN_MIN: u16 = 1;
/// Largest token value minted for server-initiated auto observations
pub const AUTO_OBS_TOKEN_MAX: u16 = 1023;
