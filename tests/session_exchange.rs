//! End-to-end NETCONF sessions over an in-memory transport.

use std::collections::HashMap;
use std::sync::Arc;

use netconf_bridge::codec::chunked_frame;
use netconf_bridge::providers::{AuthCall, MemoryBackend, MemorySchemaSource, StaticAuthenticator};
use netconf_bridge::schema::KeyMap;
use netconf_bridge::types::{ConformanceType, ModuleInfo, ModuleSet};
use netconf_bridge::{NetconfServer, ServerConfig, ServerContext};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

const CLIENT_HELLO: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
    <hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"><capabilities>\
    <capability>urn:ietf:params:netconf:base:1.1</capability></capabilities></hello>]]>]]>";

const PORT_PATH: &str = "/sonic-port:sonic-port/PORT/PORT_LIST[ifname=Ethernet0]";

fn server(backend: MemoryBackend) -> NetconfServer {
    let modules = ModuleSet {
        module_set_id: "42".to_string(),
        modules: vec![ModuleInfo {
            name: "sonic-port".to_string(),
            namespace: "http://github.com/Azure/sonic-port".to_string(),
            revision: "2019-07-17".to_string(),
            conformance: ConformanceType::Implement,
            schema: None,
        }],
    };
    let schemas = MemorySchemaSource::new(modules)
        .with_schema("/usr/models/yang/sonic-port.yang", "module sonic-port { prefix port; }");
    let key_map = KeyMap::new(
        HashMap::from([(
            "/sonic-port:sonic-port/PORT/PORT_LIST".to_string(),
            vec!["ifname".to_string()],
        )]),
        HashMap::new(),
    );
    let config = ServerConfig { close_delay_ms: 0, ..ServerConfig::default() };

    NetconfServer::new(ServerContext::new(Arc::new(backend), Arc::new(schemas), key_map, config))
}

/// Split a session transcript into the hello and the chunk-framed replies.
fn split_transcript(output: &str) -> (String, Vec<String>) {
    let (hello, mut rest) = output.split_once("]]>]]>").expect("hello terminator");
    let mut replies = Vec::new();
    while let Some(frame) = rest.strip_prefix("\n#") {
        let (length, body) = frame.split_once('\n').expect("chunk header");
        let length: usize = length.parse().expect("chunk length");
        replies.push(body[..length].to_string());
        rest = body[length..].strip_prefix("\n##\n").expect("end of chunks");
    }
    assert!(rest.is_empty(), "trailing bytes: {rest:?}");
    (hello.to_string(), replies)
}

async fn run_session(
    server: &NetconfServer,
    authenticator: Arc<StaticAuthenticator>,
    requests: &[&str],
) -> (String, Vec<String>) {
    let (mut client, transport): (DuplexStream, DuplexStream) = duplex(256 * 1024);
    let session = server.spawn(transport, authenticator);

    client.write_all(CLIENT_HELLO.as_bytes()).await.unwrap();
    for request in requests {
        client.write_all(chunked_frame(request).as_bytes()).await.unwrap();
    }

    session.await.unwrap().unwrap();
    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    split_transcript(&output)
}

#[tokio::test]
async fn get_then_close_session() {
    let backend = MemoryBackend::new().with_entry(
        PORT_PATH,
        r#"{"sonic-port:PORT_LIST":[{"admin_status":"up","ifname":"Ethernet0","mtu":9100}]}"#,
    );
    let server = server(backend);
    let auth = Arc::new(StaticAuthenticator::allow_all());

    let (hello, replies) = run_session(&server, Arc::clone(&auth), &[
        r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="101"><get><filter type="subtree">
             <sonic-port><PORT><PORT_LIST><ifname>Ethernet0</ifname></PORT_LIST></PORT></sonic-port>
           </filter></get></rpc>"#,
        r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="102"><close-session/></rpc>"#,
    ])
    .await;

    assert!(hello.contains("<capability>urn:ietf:params:netconf:capability:yang-library:1.0?module-set-id=42</capability>"));
    assert!(hello.contains("<session-id>1</session-id>"));

    assert_eq!(replies.len(), 2);
    assert_eq!(
        replies[0],
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <rpc-reply xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\" message-id=\"101\">\
         <data><sonic-port xmlns=\"http://github.com/Azure/sonic-port\"><PORT><PORT_LIST>\
         <ifname>Ethernet0</ifname><admin_status>up</admin_status><mtu>9100</mtu>\
         </PORT_LIST></PORT></sonic-port></data></rpc-reply>"
    );
    assert!(replies[1].ends_with("message-id=\"102\"><ok/></rpc-reply>"));

    assert_eq!(auth.calls(), vec![
        AuthCall::Authorize { operation: "get".into(), path: PORT_PATH.into() },
        AuthCall::Account { operation: "get".into(), args: format!("{PORT_PATH}, ") },
    ]);
}

#[tokio::test]
async fn failed_requests_do_not_end_the_session() {
    let server = server(MemoryBackend::new());
    let (_, replies) = run_session(&server, Arc::new(StaticAuthenticator::allow_all()), &[
        r#"<rpc message-id="1"><get>"#,
        r#"<rpc message-id="2"><edit-config/></rpc>"#,
        r#"<rpc message-id="3"><get-schema xmlns="urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring"><identifier>sonic-port</identifier></get-schema></rpc>"#,
        r#"<rpc message-id="4"><close-session/></rpc>"#,
    ])
    .await;

    assert_eq!(replies.len(), 4);
    assert!(replies[0].contains("[Malformed XML] Unable to parse request string"));
    assert!(replies[1].contains("message-id=\"2\""));
    assert!(replies[1].contains("Unsupported command"));
    assert!(replies[2].contains(
        "<data xmlns=\"urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring\">module sonic-port { prefix port; }</data>"
    ));
    assert!(replies[3].ends_with("<ok/></rpc-reply>"));
}

#[tokio::test]
async fn unauthorized_path_is_reported_in_band() {
    let server = server(MemoryBackend::new());
    let auth = Arc::new(StaticAuthenticator::allow_all().deny_path(PORT_PATH));

    let (_, replies) = run_session(&server, auth, &[
        r#"<rpc message-id="7"><get><filter><sonic-port><PORT><PORT_LIST><ifname>Ethernet0</ifname></PORT_LIST></PORT></sonic-port></filter></get></rpc>"#,
        r#"<rpc message-id="8"><close-session/></rpc>"#,
    ])
    .await;

    assert!(replies[0].contains(&format!("[AUTH] Unauthorized access {PORT_PATH}")));
    assert!(replies[1].ends_with("<ok/></rpc-reply>"));
}

#[tokio::test]
async fn end_of_message_requests_are_accepted_after_hello() {
    let server = server(MemoryBackend::new());
    let (mut client, transport) = duplex(64 * 1024);
    let session = server.spawn(transport, Arc::new(StaticAuthenticator::allow_all()));

    client.write_all(CLIENT_HELLO.as_bytes()).await.unwrap();
    client
        .write_all(b"<rpc message-id=\"5\"><get><filter><modules-state/></filter></get></rpc>]]>]]>")
        .await
        .unwrap();
    client.shutdown().await.unwrap();

    session.await.unwrap().unwrap();
    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();

    let (_, replies) = split_transcript(&output);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("<module-set-id>42</module-set-id>"));
    assert!(replies[0].contains("<name>sonic-port</name>"));
}
