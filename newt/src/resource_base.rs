//! Request handling shared by single-value nodes (a single-instance
//! resource and a resource instance differ only in their TLV entity type
//! and observation level).

use newt_msg::{code, observe::Action, Code, ContentFormat, Header};

use crate::base::{negotiate_single, Base, GetFormat, Observation};
use crate::constants::{FIRMWARE_PACKAGE_URI_PATH, MAX_FIRMWARE_PACKAGE_URI_LEN};
use crate::observe::ObservationHandler;
use crate::tlv::{de, ser};
use crate::value::{ResourceType, Value};
use crate::Error;

/// Map a deserializer verdict onto the response code the server sends back
pub(crate) fn de_error_code(e: de::Error) -> Code {
  match e {
    | de::Error::NotFound => code::NOT_FOUND,
    | de::Error::NotAllowed => code::METHOD_NOT_ALLOWED,
    | de::Error::NotValid => code::BAD_REQUEST,
    | de::Error::OutOfMemory => code::REQUEST_ENTITY_TOO_LARGE,
    | de::Error::NotAccepted => code::NOT_ACCEPTABLE,
  }
}

fn set_error_code(e: Error) -> Code {
  match e {
    | Error::InvalidLength | Error::OutOfMemory => code::REQUEST_ENTITY_TOO_LARGE,
    | _ => code::BAD_REQUEST,
  }
}

/// Commit a deserialized or parsed value into a node's value slot,
/// latching the node's report trigger.
pub(crate) fn commit(base: &mut Base, slot: &mut Value, kind: ResourceType, v: Value) -> Result<(), Error> {
  Value::check(&v, kind)?;

  if let Some(report) = base.report_handler_mut() {
    match v.as_numeric() {
      | Some(n) => report.value_changed(n),
      | None => report.set_pending(),
    }
  }

  *slot = v;
  base.set_changed();
  Ok(())
}

/// The `?pmin=..&pmax=..` PUT path: attributes only, the value is never
/// touched. Numeric resources seed the report handler's running value
/// first so band and step triggers compare against the pre-write state.
pub(crate) fn handle_observation_attributes(base: &mut Base, current: &Value, query: &str) -> Code {
  let report = base.ensure_report_handler();
  report.init_value(current);

  if report.parse_notification_attributes(query) {
    code::CHANGED
  } else {
    log::debug!("{} - invalid notification attributes {:?}", base.path(), query);
    code::BAD_REQUEST
  }
}

/// GET on a single-value node
pub(crate) fn handle_get(base: &mut Base,
                         kind: ResourceType,
                         value: &Value,
                         tlv_type: u8,
                         level: Observation,
                         req: &Header)
                         -> Header {
  log::debug!("handle_get {}", base.path());

  if !base.operation().allows(crate::base::Operation::GET) {
    log::error!("handle_get {} - method not allowed", base.path());
    return Header::response_to(req, code::METHOD_NOT_ALLOWED);
  }

  let format = match negotiate_single(req.accept, base.content_type(), kind) {
    | Some(f) => f,
    | None => {
      log::error!("handle_get {} - accept {:?} not supported", base.path(), req.accept);
      return Header::response_to(req, code::NOT_ACCEPTABLE);
    },
  };

  let payload = match format {
    | GetFormat::Text => Ok(value.render_text()),
    | GetFormat::Opaque => Ok(value.as_bytes().unwrap_or_default().to_vec()),
    | GetFormat::Tlv(f) => {
      base.set_content_type(f);
      ser::serialize_value_entry(tlv_type, base.name_id().unwrap_or(0), value)
    },
  };

  let payload = match payload {
    | Ok(p) => p,
    | Err(e) => {
      log::error!("handle_get {} - serialization failed: {}", base.path(), e);
      return Header::response_to(req, code::INTERNAL_SERVER_ERROR);
    },
  };

  let mut resp = Header::response_to(req, code::CONTENT);
  resp.content_format = Some(format.content_format());
  resp.payload = payload;
  base.apply_max_age(&mut resp);

  match base.handle_observe(req, &mut resp) {
    | Some(Action::Register) => base.add_observation_level(level),
    | Some(Action::Deregister) => base.remove_observation_level(level),
    | None => (),
  }

  resp
}

/// PUT on a single-value node
pub(crate) fn handle_put<H: ObservationHandler>(base: &mut Base,
                                                kind: ResourceType,
                                                value: &mut Value,
                                                req: &Header,
                                                handler: &mut H)
                                                -> Header {
  log::debug!("handle_put {}", base.path());

  // the uri-query form addresses observation attributes, not the value,
  // and is served regardless of the PUT operation bit
  if let Some(query) = &req.uri_query {
    let code = handle_observation_attributes(base, value, query);
    return Header::response_to(req, code);
  }

  if !base.operation().allows(crate::base::Operation::PUT) {
    log::error!("handle_put {} - method not allowed", base.path());
    return Header::response_to(req, code::METHOD_NOT_ALLOWED);
  }

  let format = match req.content_format {
    | Some(f) => f,
    | None if base.content_type().is_tlv() => ContentFormat::Tlv,
    | None => ContentFormat::Text,
  };

  let code = if format.is_tlv() {
    if base.path() == FIRMWARE_PACKAGE_URI_PATH && req.payload.len() > MAX_FIRMWARE_PACKAGE_URI_LEN {
      de_error_code(de::Error::NotAccepted)
    } else {
      base.set_content_type(format);
      match de::deserialize_single(&req.payload, base.name_id(), kind) {
        | Ok(Some(v)) => match commit(base, value, kind, v) {
          | Ok(()) => {
            handler.value_updated(base.path());
            code::CHANGED
          },
          | Err(e) => set_error_code(e),
        },
        | Ok(None) => code::CHANGED,
        | Err(e) => de_error_code(e),
      }
    }
  } else {
    let parsed = match format {
      | ContentFormat::Text => Value::parse_text(kind, &req.payload),
      | ContentFormat::Opaque if kind == ResourceType::Opaque => {
        Ok(Value::Opaque(req.payload.clone()))
      },
      | _ => {
        log::error!("handle_put {} - content format {:?} not supported", base.path(), format);
        return Header::response_to(req, code::UNSUPPORTED_CONTENT_FORMAT);
      },
    };

    let committed = match parsed {
      | Ok(v) => commit(base, value, kind, v),
      | Err(e) => Err(e),
    };

    match committed {
      | Ok(()) => {
        handler.value_updated(base.path());
        code::CHANGED
      },
      | Err(e) => set_error_code(e),
    }
  };

  Header::response_to(req, code)
}
