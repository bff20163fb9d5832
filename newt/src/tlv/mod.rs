//! OMA LwM2M TLV, the binary container aggregate reads and writes travel
//! in (content formats 11542 and legacy 99).
//!
//! Wire layout, big-endian throughout:
//!
//! ```text
//! byte 0
//! bits 7-6  entity type: 11 resource, 10 multiple resource,
//!           01 resource instance, 00 object instance
//! bit  5    id width: 0 = 8-bit id follows, 1 = 16-bit
//! bits 4-3  length form: 00 inline (bits 2-0), 01/10/11 explicit
//!           8/16/24-bit length follows the id
//! bits 2-0  inline length 0-7 when the length form is 00
//! then      id (1-2 bytes), explicit length (0-3 bytes), value
//! ```

/// The deserializer
pub mod de;

/// The serializer
pub mod ser;

pub(crate) const TYPE_RESOURCE: u8 = 0xC0;
pub(crate) const TYPE_MULTIPLE_RESOURCE: u8 = 0x80;
pub(crate) const TYPE_RESOURCE_INSTANCE: u8 = 0x40;
pub(crate) const TYPE_OBJECT_INSTANCE: u8 = 0x00;

pub(crate) const TYPE_MASK: u8 = 0xC0;

pub(crate) const ID16: u8 = 0x20;

pub(crate) const LENGTH_MASK: u8 = 0x18;
pub(crate) const LENGTH8: u8 = 0x08;
pub(crate) const LENGTH16: u8 = 0x10;
pub(crate) const LENGTH24: u8 = 0x18;
pub(crate) const INLINE_LENGTH_MASK: u8 = 0x07;
