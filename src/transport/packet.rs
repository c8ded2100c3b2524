//! Engine.IO v4 / Socket.IO v5 text packets.
//!
//! Only the subset a chat client needs is understood. Binary attachments are
//! rejected instead of half-decoded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::events::IncomingEvent;
use crate::error::TransportError;

pub const ROOT_NAMESPACE: &str = "/";

/// Body of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    Connect { namespace: String, data: Option<Value> },
    Disconnect { namespace: String },
    Event { namespace: String, ack_id: Option<u64>, event: IncomingEvent },
    Ack { namespace: String, ack_id: u64, data: Value },
    ConnectError { namespace: String, data: Value },
}

impl Packet {
    pub fn event(namespace: &str, name: &str, data: Value) -> Self {
        Packet::Event {
            namespace: namespace.to_string(),
            ack_id: None,
            event: IncomingEvent { event_type: name.to_string(), data },
        }
    }

    pub fn connect(namespace: &str) -> Self {
        Packet::Connect { namespace: namespace.to_string(), data: None }
    }
}

fn namespace_prefix(namespace: &str) -> String {
    if namespace == ROOT_NAMESPACE || namespace.is_empty() {
        String::new()
    } else {
        format!("{},", namespace)
    }
}

pub fn encode(packet: &Packet) -> Result<String, TransportError> {
    let text = match packet {
        Packet::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
        Packet::Close => "1".to_string(),
        Packet::Ping => "2".to_string(),
        Packet::Pong => "3".to_string(),
        Packet::Noop => "6".to_string(),
        Packet::Connect { namespace, data } => {
            let body = match data {
                Some(d) => serde_json::to_string(d)?,
                None => String::new(),
            };
            format!("40{}{}", namespace_prefix(namespace), body)
        }
        Packet::Disconnect { namespace } => format!("41{}", namespace_prefix(namespace)),
        Packet::Event { namespace, ack_id, event } => {
            let args = serde_json::to_string(&[Value::String(event.event_type.clone()), event.data.clone()])?;
            let ack = ack_id.map(|id| id.to_string()).unwrap_or_default();
            format!("42{}{}{}", namespace_prefix(namespace), ack, args)
        }
        Packet::Ack { namespace, ack_id, data } => {
            format!("43{}{}{}", namespace_prefix(namespace), ack_id, serde_json::to_string(data)?)
        }
        Packet::ConnectError { namespace, data } => {
            format!("44{}{}", namespace_prefix(namespace), serde_json::to_string(data)?)
        }
    };
    Ok(text)
}

pub fn decode(text: &str) -> Result<Packet, TransportError> {
    let Some(kind) = text.chars().next() else {
        return Err(TransportError::Protocol("empty packet".into()));
    };
    let body = &text[kind.len_utf8()..];
    match kind {
        '0' => Ok(Packet::Open(serde_json::from_str(body)?)),
        '1' => Ok(Packet::Close),
        // ping/pong may carry a probe payload, it is irrelevant here
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket(body),
        '5' | '6' => Ok(Packet::Noop),
        other => Err(TransportError::Protocol(format!("unknown packet type {other:?}"))),
    }
}

fn decode_socket(body: &str) -> Result<Packet, TransportError> {
    let Some(kind) = body.chars().next() else {
        return Err(TransportError::Protocol("empty socket.io packet".into()));
    };
    let mut rest = &body[kind.len_utf8()..];

    if kind == '5' || kind == '6' {
        return Err(TransportError::Protocol("binary packets are not supported".into()));
    }

    let namespace = if rest.starts_with('/') {
        let (ns, tail) = match rest.find(',') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        rest = tail;
        ns.to_string()
    } else {
        ROOT_NAMESPACE.to_string()
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack_id = if digits > 0 {
        let id = rest[..digits]
            .parse::<u64>()
            .map_err(|e| TransportError::Protocol(format!("bad ack id: {e}")))?;
        Some(id)
    } else {
        None
    };
    rest = &rest[digits..];

    let data: Option<Value> = if rest.is_empty() { None } else { Some(serde_json::from_str(rest)?) };

    match kind {
        '0' => Ok(Packet::Connect { namespace, data }),
        '1' => Ok(Packet::Disconnect { namespace }),
        '2' => {
            let Some(Value::Array(args)) = data else {
                return Err(TransportError::Protocol("event without arguments".into()));
            };
            let mut args = args.into_iter();
            let name = args
                .next()
                .and_then(|v| v.as_str().map(str::to_string))
                .ok_or_else(|| TransportError::Protocol("event without a name".into()))?;
            let data = args.next().unwrap_or(Value::Null);
            if args.next().is_some() {
                log::debug!("event {name} carried extra arguments, keeping the first");
            }
            Ok(Packet::Event { namespace, ack_id, event: IncomingEvent { event_type: name, data } })
        }
        '3' => {
            let ack_id = ack_id.ok_or_else(|| TransportError::Protocol("ack without id".into()))?;
            Ok(Packet::Ack { namespace, ack_id, data: data.unwrap_or_else(|| Value::Array(Vec::new())) })
        }
        '4' => Ok(Packet::ConnectError { namespace, data: data.unwrap_or(Value::Null) }),
        other => Err(TransportError::Protocol(format!("unknown socket.io packet type {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_open_handshake() {
        let packet = decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#).unwrap();
        let Packet::Open(hs) = packet else { panic!("expected an open packet") };
        assert_eq!(hs.sid, "abc");
        assert_eq!(hs.ping_interval, 25000);
        assert_eq!(hs.max_payload, Some(1_000_000));
    }

    #[test]
    fn encodes_event_in_namespace() {
        let packet = Packet::event("/api", "sendMsg", json!({"message": "hello"}));
        assert_eq!(encode(&packet).unwrap(), r#"42/api,["sendMsg",{"message":"hello"}]"#);
    }

    #[test]
    fn root_namespace_has_no_prefix() {
        assert_eq!(encode(&Packet::connect("/")).unwrap(), "40");
        assert_eq!(encode(&Packet::connect("/api")).unwrap(), "40/api,");
        let packet = Packet::event("/", "userOnline", json!("u1"));
        assert_eq!(encode(&packet).unwrap(), r#"42["userOnline","u1"]"#);
    }

    #[test]
    fn decodes_event_with_namespace_and_ack_id() {
        let packet = decode(r#"42/api,17["sendMsg",{"message":"hi"},"extra"]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                namespace: "/api".into(),
                ack_id: Some(17),
                event: IncomingEvent { event_type: "sendMsg".into(), data: json!({"message": "hi"}) },
            }
        );
    }

    #[test]
    fn event_without_payload_yields_null() {
        let packet = decode(r#"42["ping-me"]"#).unwrap();
        let Packet::Event { event, namespace, .. } = packet else { panic!() };
        assert_eq!(namespace, "/");
        assert_eq!(event.data, Value::Null);
    }

    #[test]
    fn connect_ack_and_error() {
        assert_eq!(
            decode(r#"40/api,{"sid":"xyz"}"#).unwrap(),
            Packet::Connect { namespace: "/api".into(), data: Some(json!({"sid": "xyz"})) }
        );
        assert_eq!(
            decode(r#"44/api,{"message":"Invalid namespace"}"#).unwrap(),
            Packet::ConnectError { namespace: "/api".into(), data: json!({"message": "Invalid namespace"}) }
        );
    }

    #[test]
    fn engine_control_packets() {
        assert_eq!(decode("2").unwrap(), Packet::Ping);
        assert_eq!(decode("2probe").unwrap(), Packet::Ping);
        assert_eq!(decode("3").unwrap(), Packet::Pong);
        assert_eq!(decode("1").unwrap(), Packet::Close);
        assert_eq!(decode("6").unwrap(), Packet::Noop);
        assert_eq!(encode(&Packet::Pong).unwrap(), "3");
    }

    #[test]
    fn rejects_binary_and_garbage() {
        assert!(matches!(decode(r#"451-["file",{"_placeholder":true,"num":0}]"#), Err(TransportError::Protocol(_))));
        assert!(matches!(decode("9"), Err(TransportError::Protocol(_))));
        assert!(matches!(decode(""), Err(TransportError::Protocol(_))));
        assert!(decode("42[not json").is_err());
    }
}
