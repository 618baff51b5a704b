use serde_json::{json, Value};

use crate::models::{CanonicalNode, Credential, OutboundEntry, Transport};

/// Convert a decoded node to a sing-box outbound
///
/// # Arguments
///
/// * `node` - Decoded node
/// * `tag` - Tag the outbound is written under
/// * `routing_mark` - `SO_MARK` for the outbound socket; `None` or `0` leaves
///   it out
pub fn node_to_outbound(
    node: &CanonicalNode,
    tag: &str,
    routing_mark: Option<u32>,
) -> OutboundEntry {
    let protocol = node.proxy_type().outbound_type();

    let mut outbound = json!({
        "type": protocol,
        "tag": tag,
        "server": node.server,
        "server_port": node.port,
    });

    match &node.credential {
        Credential::Shadowsocks { method, password } => {
            outbound["method"] = json!(method);
            outbound["password"] = json!(password);
        }
        Credential::ShadowsocksR {
            method,
            password,
            protocol,
            protocol_param,
            obfs,
            obfs_param,
        } => {
            outbound["method"] = json!(method);
            outbound["password"] = json!(password);
            outbound["protocol"] = json!(protocol);
            outbound["protocol_param"] = json!(protocol_param);
            outbound["obfs"] = json!(obfs);
            outbound["obfs_param"] = json!(obfs_param);
        }
        Credential::VMess { uuid, alter_id } => {
            outbound["uuid"] = json!(uuid);
            outbound["alter_id"] = json!(alter_id);
            outbound["security"] = json!("auto");
        }
    }

    if let Some(transport) = &node.transport {
        apply_transport(&mut outbound, &node.server, transport);
    }

    if let Some(mark) = routing_mark.filter(|m| *m != 0) {
        outbound["routing_mark"] = json!(mark);
    }

    OutboundEntry {
        tag: tag.to_string(),
        protocol: protocol.to_string(),
        body: outbound,
    }
}

/// Take over an outbound from a router-native subscription under a new tag
///
/// Everything but `tag` is kept as the provider wrote it.
pub fn native_to_outbound(native: &Value, tag: &str) -> OutboundEntry {
    let mut outbound = native.clone();
    if let Some(obj) = outbound.as_object_mut() {
        obj.insert("tag".to_string(), json!(tag));
    }
    let protocol = native
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    OutboundEntry {
        tag: tag.to_string(),
        protocol,
        body: outbound,
    }
}

fn apply_transport(outbound: &mut Value, server: &str, transport: &Transport) {
    if transport.tls {
        let server_name = if transport.host.is_empty() {
            server
        } else {
            transport.host.as_str()
        };
        outbound["tls"] = json!({
            "enabled": true,
            "server_name": server_name,
            "insecure": transport.allow_insecure
        });
    }

    // Plain TCP needs no transport block
    match transport.network.as_str() {
        "ws" => {
            let mut ws = json!({ "type": "ws" });
            if !transport.path.is_empty() {
                ws["path"] = json!(transport.path);
            }
            if !transport.host.is_empty() {
                ws["headers"] = json!({ "Host": transport.host });
            }
            outbound["transport"] = ws;
        }
        "h2" | "http" => {
            let mut http = json!({ "type": "http" });
            if !transport.path.is_empty() {
                http["path"] = json!(transport.path);
            }
            if !transport.host.is_empty() {
                http["host"] = json!([transport.host]);
            }
            outbound["transport"] = http;
        }
        "grpc" => {
            let mut grpc = json!({ "type": "grpc" });
            if !transport.path.is_empty() {
                grpc["service_name"] = json!(transport.path);
            }
            outbound["transport"] = grpc;
        }
        _ => {}
    }
}
