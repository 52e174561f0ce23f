//! Plaintext TLS 1.2 hello exchange
//!
//! rustls only implements ECDHE AEAD suites for TLS 1.2. A server that
//! accepts TLS 1.2 solely with static RSA, DHE or CBC suites therefore
//! refuses every rustls handshake. This module sends a hand-built
//! ClientHello offering exactly those suites and reads the server's
//! plaintext reply up to its Certificate message. No keys are exchanged:
//! the connection is dropped once the chosen suite and the certificate
//! chain are known.

use crate::utils::SslError;
use tokio::io::{AsyncRead, AsyncReadExt};

const CONTENT_TYPE_ALERT: u8 = 0x15;
const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;

const HANDSHAKE_CLIENT_HELLO: u8 = 0x01;
const HANDSHAKE_SERVER_HELLO: u8 = 0x02;
const HANDSHAKE_CERTIFICATE: u8 = 0x0b;

pub const TLS12_VERSION: u16 = 0x0303;
const RECORD_VERSION: u16 = 0x0301;

const EXT_SERVER_NAME: u16 = 0x0000;
const EXT_SUPPORTED_GROUPS: u16 = 0x000a;
const EXT_EC_POINT_FORMATS: u16 = 0x000b;
const EXT_SIGNATURE_ALGORITHMS: u16 = 0x000d;
const EXT_RENEGOTIATION_INFO: u16 = 0xff01;

/// x25519, secp256r1, secp384r1
const SUPPORTED_GROUPS: &[u16] = &[0x001d, 0x0017, 0x0018];

const SIGNATURE_ALGORITHMS: &[u16] = &[
    0x0401, 0x0501, 0x0601, 0x0403, 0x0503, 0x0804, 0x0805, 0x0806, 0x0201, 0x0203,
];

/// Plaintext record limit plus the allowed expansion
const MAX_RECORD_LEN: usize = 16384 + 2048;
const MAX_HANDSHAKE_MESSAGE_LEN: usize = 1 << 18;

/// TLS 1.2 suites rustls cannot negotiate, strongest first
pub const LEGACY_TLS12_SUITES: &[(u16, &str)] = &[
    (0xc028, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384"),
    (0xc027, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256"),
    (0xc024, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384"),
    (0xc023, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256"),
    (0xc014, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA"),
    (0xc013, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA"),
    (0xc00a, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA"),
    (0xc009, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA"),
    (0x009f, "TLS_DHE_RSA_WITH_AES_256_GCM_SHA384"),
    (0x009e, "TLS_DHE_RSA_WITH_AES_128_GCM_SHA256"),
    (0xccaa, "TLS_DHE_RSA_WITH_CHACHA20_POLY1305_SHA256"),
    (0x006b, "TLS_DHE_RSA_WITH_AES_256_CBC_SHA256"),
    (0x0067, "TLS_DHE_RSA_WITH_AES_128_CBC_SHA256"),
    (0x0039, "TLS_DHE_RSA_WITH_AES_256_CBC_SHA"),
    (0x0033, "TLS_DHE_RSA_WITH_AES_128_CBC_SHA"),
    (0x009d, "TLS_RSA_WITH_AES_256_GCM_SHA384"),
    (0x009c, "TLS_RSA_WITH_AES_128_GCM_SHA256"),
    (0x003d, "TLS_RSA_WITH_AES_256_CBC_SHA256"),
    (0x003c, "TLS_RSA_WITH_AES_128_CBC_SHA256"),
    (0x0035, "TLS_RSA_WITH_AES_256_CBC_SHA"),
    (0x002f, "TLS_RSA_WITH_AES_128_CBC_SHA"),
    (0x000a, "TLS_RSA_WITH_3DES_EDE_CBC_SHA"),
];

/// IANA name of a suite offered in the legacy hello
pub fn cipher_suite_name(code: u16) -> Option<&'static str> {
    LEGACY_TLS12_SUITES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Fields of the ServerHello that matter for capability reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerHello {
    pub version: u16,
    pub cipher_suite: u16,
}

/// Everything the server sent in plaintext before key exchange
#[derive(Debug, Clone)]
pub struct HelloReply {
    pub server_hello: ServerHello,
    /// DER certificates in presentation order; empty if none was sent
    pub certificate_chain: Vec<Vec<u8>>,
}

/// Build a complete ClientHello record.
///
/// SNI is omitted when `server_name` is absent or an IP literal.
pub fn build_client_hello(server_name: Option<&str>, random: &[u8; 32]) -> Vec<u8> {
    let mut body = Vec::with_capacity(256);
    body.extend_from_slice(&TLS12_VERSION.to_be_bytes());
    body.extend_from_slice(random);
    // Empty session id
    body.push(0);

    put_u16(&mut body, (LEGACY_TLS12_SUITES.len() * 2) as u16);
    for (code, _) in LEGACY_TLS12_SUITES {
        body.extend_from_slice(&code.to_be_bytes());
    }

    // Null compression only
    body.extend_from_slice(&[1, 0]);

    let mut extensions = Vec::new();
    if let Some(name) = server_name.filter(|n| n.parse::<std::net::IpAddr>().is_err()) {
        let host = name.as_bytes();
        let mut list = Vec::with_capacity(host.len() + 3);
        list.push(0); // host_name
        put_u16(&mut list, host.len() as u16);
        list.extend_from_slice(host);

        let mut data = Vec::with_capacity(list.len() + 2);
        put_u16(&mut data, list.len() as u16);
        data.extend_from_slice(&list);
        put_extension(&mut extensions, EXT_SERVER_NAME, &data);
    }

    let mut groups = Vec::new();
    put_u16(&mut groups, (SUPPORTED_GROUPS.len() * 2) as u16);
    for group in SUPPORTED_GROUPS {
        put_u16(&mut groups, *group);
    }
    put_extension(&mut extensions, EXT_SUPPORTED_GROUPS, &groups);

    // Uncompressed points only
    put_extension(&mut extensions, EXT_EC_POINT_FORMATS, &[1, 0]);

    let mut algorithms = Vec::new();
    put_u16(&mut algorithms, (SIGNATURE_ALGORITHMS.len() * 2) as u16);
    for algorithm in SIGNATURE_ALGORITHMS {
        put_u16(&mut algorithms, *algorithm);
    }
    put_extension(&mut extensions, EXT_SIGNATURE_ALGORITHMS, &algorithms);

    put_extension(&mut extensions, EXT_RENEGOTIATION_INFO, &[0]);

    put_u16(&mut body, extensions.len() as u16);
    body.extend_from_slice(&extensions);

    let mut handshake = Vec::with_capacity(body.len() + 4);
    handshake.push(HANDSHAKE_CLIENT_HELLO);
    put_u24(&mut handshake, body.len());
    handshake.extend_from_slice(&body);

    let mut record = Vec::with_capacity(handshake.len() + 5);
    record.push(CONTENT_TYPE_HANDSHAKE);
    put_u16(&mut record, RECORD_VERSION);
    put_u16(&mut record, handshake.len() as u16);
    record.extend_from_slice(&handshake);
    record
}

/// Read records until the ServerHello and, if sent, the Certificate
/// message have arrived.
///
/// The reply ends early with an empty chain when the server sends another
/// handshake message after ServerHello or closes the connection.
pub async fn read_hello_reply<R>(reader: &mut R) -> Result<HelloReply, SslError>
where
    R: AsyncRead + Unpin,
{
    let mut pending = Vec::new();
    let mut server_hello: Option<ServerHello> = None;

    loop {
        while let Some((msg_type, body)) = take_message(&mut pending)? {
            match (server_hello, msg_type) {
                (None, HANDSHAKE_SERVER_HELLO) => server_hello = Some(parse_server_hello(&body)?),
                (None, other) => {
                    return Err(failed(format!(
                        "expected ServerHello, received handshake message type {}",
                        other
                    )))
                }
                (Some(hello), HANDSHAKE_CERTIFICATE) => {
                    return Ok(HelloReply {
                        server_hello: hello,
                        certificate_chain: parse_certificate(&body)?,
                    })
                }
                (Some(hello), _) => {
                    return Ok(HelloReply {
                        server_hello: hello,
                        certificate_chain: Vec::new(),
                    })
                }
            }
        }

        match read_record(reader).await? {
            Some((CONTENT_TYPE_HANDSHAKE, payload)) => pending.extend_from_slice(&payload),
            Some((CONTENT_TYPE_ALERT, payload)) => return Err(alert_error(&payload)),
            Some((other, _)) => {
                return Err(failed(format!(
                    "unexpected record content type {} during hello",
                    other
                )))
            }
            None => {
                return match server_hello {
                    Some(hello) => Ok(HelloReply {
                        server_hello: hello,
                        certificate_chain: Vec::new(),
                    }),
                    None => Err(failed("connection closed before ServerHello".to_string())),
                }
            }
        }
    }
}

/// One record, or `None` on a clean close at a record boundary
async fn read_record<R>(reader: &mut R) -> Result<Option<(u8, Vec<u8>)>, SslError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 5];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(failed(format!("read failed: {}", e))),
    }

    let length = u16::from_be_bytes([header[3], header[4]]) as usize;
    if length > MAX_RECORD_LEN {
        return Err(failed(format!("record of {} bytes exceeds limit", length)));
    }

    let mut payload = vec![0u8; length];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| failed(format!("record truncated: {}", e)))?;

    Ok(Some((header[0], payload)))
}

/// Split one complete handshake message off the front of `pending`
fn take_message(pending: &mut Vec<u8>) -> Result<Option<(u8, Vec<u8>)>, SslError> {
    if pending.len() < 4 {
        return Ok(None);
    }
    let length = read_u24(&pending[1..4]);
    if length > MAX_HANDSHAKE_MESSAGE_LEN {
        return Err(failed(format!(
            "handshake message of {} bytes exceeds limit",
            length
        )));
    }
    if pending.len() < 4 + length {
        return Ok(None);
    }

    let message: Vec<u8> = pending.drain(..4 + length).collect();
    Ok(Some((message[0], message[4..].to_vec())))
}

fn parse_server_hello(body: &[u8]) -> Result<ServerHello, SslError> {
    // version(2) random(32) session_id_len(1)
    if body.len() < 35 {
        return Err(failed("ServerHello too short".to_string()));
    }
    let version = u16::from_be_bytes([body[0], body[1]]);
    let offset = 35 + body[34] as usize;

    // cipher_suite(2) compression(1)
    if body.len() < offset + 3 {
        return Err(failed("ServerHello truncated".to_string()));
    }
    let cipher_suite = u16::from_be_bytes([body[offset], body[offset + 1]]);

    Ok(ServerHello {
        version,
        cipher_suite,
    })
}

fn parse_certificate(body: &[u8]) -> Result<Vec<Vec<u8>>, SslError> {
    if body.len() < 3 {
        return Err(failed("Certificate message too short".to_string()));
    }
    let list_len = read_u24(&body[..3]);
    let list = body
        .get(3..3 + list_len)
        .ok_or_else(|| failed("Certificate list truncated".to_string()))?;

    let mut certificates = Vec::new();
    let mut offset = 0;
    while offset < list.len() {
        let header = list
            .get(offset..offset + 3)
            .ok_or_else(|| failed("Certificate entry truncated".to_string()))?;
        let cert_len = read_u24(header);
        offset += 3;
        let der = list
            .get(offset..offset + cert_len)
            .ok_or_else(|| failed("Certificate entry exceeds list".to_string()))?;
        certificates.push(der.to_vec());
        offset += cert_len;
    }

    Ok(certificates)
}

fn alert_error(payload: &[u8]) -> SslError {
    let description = match payload.get(1) {
        Some(40) => "handshake_failure".to_string(),
        Some(47) => "illegal_parameter".to_string(),
        Some(70) => "protocol_version".to_string(),
        Some(71) => "insufficient_security".to_string(),
        Some(80) => "internal_error".to_string(),
        Some(112) => "unrecognized_name".to_string(),
        Some(code) => format!("alert {}", code),
        None => "malformed alert".to_string(),
    };
    failed(format!("received fatal alert: {}", description))
}

fn failed(message: String) -> SslError {
    SslError::HandshakeFailed { message }
}

fn read_u24(bytes: &[u8]) -> usize {
    ((bytes[0] as usize) << 16) | ((bytes[1] as usize) << 8) | bytes[2] as usize
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn put_u24(buf: &mut Vec<u8>, value: usize) {
    buf.extend_from_slice(&(value as u32).to_be_bytes()[1..]);
}

fn put_extension(buf: &mut Vec<u8>, ext_type: u16, data: &[u8]) {
    put_u16(buf, ext_type);
    put_u16(buf, data.len() as u16);
    buf.extend_from_slice(data);
}
