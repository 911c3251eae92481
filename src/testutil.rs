//! Loopback HTTP server serving canned responses, for transport tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};

/// One captured request: head (request line + headers) and body.
pub(crate) struct CapturedRequest {
    pub head: String,
    pub body: String,
}

/// Serve one response per `(status, content_type, body)` entry, one
/// connection each. Returns the `http://127.0.0.1:port` base URL and a
/// receiver yielding each request as it arrives.
pub(crate) fn serve(
    responses: Vec<(u16, &'static str, Vec<u8>)>,
) -> (String, Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for (status, content_type, body) in responses {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
                head.push_str(&line);
            }
            let mut request_body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut request_body);
            let _ = tx.send(CapturedRequest {
                head,
                body: String::from_utf8_lossy(&request_body).into_owned(),
            });

            let mut stream = reader.into_inner();
            let response_head = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            let _ = stream.write_all(response_head.as_bytes());
            let _ = stream.write_all(&body);
        }
    });
    (format!("http://{}", addr), rx)
}
