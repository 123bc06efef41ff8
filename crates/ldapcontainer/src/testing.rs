//! Minimal in-process LDAP server for unit tests
//!
//! Answers simple BindRequests for a single DN/password pair and closes the
//! connection on UnbindRequest. Anything else ends the connection.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SEQUENCE: u8 = 0x30;
const INTEGER: u8 = 0x02;
const ENUMERATED: u8 = 0x0a;
const OCTET_STRING: u8 = 0x04;
const SIMPLE_AUTH: u8 = 0x80;
const BIND_REQUEST: u8 = 0x60;
const BIND_RESPONSE: u8 = 0x61;

pub(crate) const INVALID_CREDENTIALS: u8 = 49;

/// Start a server accepting binds as `dn`/`password`; returns its `ldap://` URL
pub(crate) async fn spawn_bind_server(dn: &str, password: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ldap://{}", listener.local_addr().unwrap());
    let dn = dn.as_bytes().to_vec();
    let password = password.as_bytes().to_vec();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, dn.clone(), password.clone()));
        }
    });
    url
}

async fn serve(mut stream: TcpStream, dn: Vec<u8>, password: Vec<u8>) {
    while let Some(message) = read_message(&mut stream).await {
        let Some((msgid, op, body)) = split_message(&message) else {
            break;
        };
        if op != BIND_REQUEST {
            break;
        }

        let accepted = parse_simple_bind(body).is_some_and(|(d, p)| d == dn && p == password);
        let response = if accepted {
            bind_response(msgid, 0, "")
        } else {
            bind_response(msgid, INVALID_CREDENTIALS, "invalid credentials")
        };
        if stream.write_all(&response).await.is_err() {
            break;
        }
    }
}

/// Read one LDAPMessage and return the contents of its outer SEQUENCE
async fn read_message(stream: &mut TcpStream) -> Option<Vec<u8>> {
    if stream.read_u8().await.ok()? != SEQUENCE {
        return None;
    }
    let first = stream.read_u8().await.ok()?;
    let len = if first < 0x80 {
        first as usize
    } else {
        let mut len = 0usize;
        for _ in 0..(first & 0x7f) {
            len = (len << 8) | stream.read_u8().await.ok()? as usize;
        }
        len
    };
    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).await.ok()?;
    Some(body)
}

/// Split a TLV into (tag, value, rest)
fn tlv(buf: &[u8]) -> Option<(u8, &[u8], &[u8])> {
    let (&tag, rest) = buf.split_first()?;
    let (&first, rest) = rest.split_first()?;
    let (len, rest) = if first < 0x80 {
        (first as usize, rest)
    } else {
        let n = (first & 0x7f) as usize;
        let len = rest
            .get(..n)?
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize);
        (len, &rest[n..])
    };
    Some((tag, rest.get(..len)?, &rest[len..]))
}

/// (message id bytes, protocol op tag, protocol op value)
fn split_message(message: &[u8]) -> Option<(&[u8], u8, &[u8])> {
    let (tag, msgid, rest) = tlv(message)?;
    if tag != INTEGER {
        return None;
    }
    let (op, body, _) = tlv(rest)?;
    Some((msgid, op, body))
}

/// (dn, password) of a simple BindRequest
fn parse_simple_bind(body: &[u8]) -> Option<(&[u8], &[u8])> {
    let (_, _version, rest) = tlv(body)?;
    let (tag, dn, rest) = tlv(rest)?;
    if tag != OCTET_STRING {
        return None;
    }
    let (tag, password, _) = tlv(rest)?;
    if tag != SIMPLE_AUTH {
        return None;
    }
    Some((dn, password))
}

fn bind_response(msgid: &[u8], rc: u8, text: &str) -> Vec<u8> {
    let mut result = vec![ENUMERATED, 1, rc, OCTET_STRING, 0, OCTET_STRING, text.len() as u8];
    result.extend_from_slice(text.as_bytes());

    let mut message = vec![INTEGER, msgid.len() as u8];
    message.extend_from_slice(msgid);
    message.extend_from_slice(&[BIND_RESPONSE, result.len() as u8]);
    message.extend_from_slice(&result);

    let mut frame = vec![SEQUENCE, message.len() as u8];
    frame.extend_from_slice(&message);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_bind() {
        // version 3, dn "cn=a", password "pw"
        let body = [
            INTEGER, 1, 3, OCTET_STRING, 4, b'c', b'n', b'=', b'a', SIMPLE_AUTH, 2, b'p', b'w',
        ];
        let (dn, password) = parse_simple_bind(&body).unwrap();
        assert_eq!(dn, b"cn=a");
        assert_eq!(password, b"pw");
    }

    #[test]
    fn test_bind_response_layout() {
        let frame = bind_response(&[7], 0, "");
        assert_eq!(
            frame,
            vec![
                SEQUENCE, 12, INTEGER, 1, 7, BIND_RESPONSE, 7, ENUMERATED, 1, 0, OCTET_STRING, 0,
                OCTET_STRING, 0
            ]
        );
    }
}
