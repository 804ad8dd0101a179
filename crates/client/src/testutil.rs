//! Scripted MirrorAce stand-in for tests.
//!
//! A raw `TcpListener` HTTP server that understands just enough of the
//! protocol to negotiate sessions, accept uploads, and answer info queries.
//! Upload keys are single-use: issuing happens on negotiation, consumption
//! on the request that completes a transfer (the final range of a chunked
//! upload, or any rangeless upload), and reuse of a consumed key is
//! rejected the way the live service rejects it.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::Client;

/// One recorded upload POST.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub content_range: Option<String>,
    pub upload_key: Option<String>,
    pub has_password: bool,
    pub file_name: Option<String>,
}

/// Mutable mock behavior and observations.
pub struct MockState {
    pub negotiations: u32,
    pub uploads: Vec<UploadRecord>,
    pub key_reuse_rejections: u32,
    pub last_info_files: Option<String>,
    pub reject_negotiations: bool,
    pub reject_uploads: bool,
    /// Reject the nth upload POST (1-based) with an error envelope.
    pub fail_nth_upload: Option<usize>,
    pub chunk_threshold: u64,
    pub file_threshold: u64,
    next_key: u32,
    consumed_keys: HashSet<String>,
    issued_keys: HashSet<String>,
}

/// Scripted mock service bound to a local port.
pub struct MockService {
    pub url: String,
    state: Arc<Mutex<MockState>>,
    handle: JoinHandle<()>,
}

impl MockService {
    /// Starts a mock with a 1000-byte chunk threshold and a 5000-byte file
    /// threshold.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");

        let state = Arc::new(Mutex::new(MockState {
            negotiations: 0,
            uploads: Vec::new(),
            key_reuse_rejections: 0,
            last_info_files: None,
            reject_negotiations: false,
            reject_uploads: false,
            fail_nth_upload: None,
            chunk_threshold: 1_000,
            file_threshold: 5_000,
            next_key: 0,
            consumed_keys: HashSet::new(),
            issued_keys: HashSet::new(),
        }));

        let serve_state = Arc::clone(&state);
        let serve_url = url.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let state = Arc::clone(&serve_state);
                let base_url = serve_url.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, state, base_url).await;
                });
            }
        });

        Self { url, state, handle }
    }

    /// Builds a client pointed at the mock with `work_dir` for archives, and
    /// negotiates its first session.
    pub async fn client_in(&self, work_dir: &Path) -> Client {
        let mut client = Client::new("test-key", "test-token", work_dir)
            .unwrap()
            .with_base_url(self.url.clone());
        client.negotiate().await.unwrap();
        client
    }

    /// Builds a client that never archives (plain temp dir).
    pub async fn client(&self) -> Client {
        self.client_in(&std::env::temp_dir()).await
    }

    /// Reads the mock state.
    pub fn state<R>(&self, f: impl FnOnce(&MockState) -> R) -> R {
        f(&self.state.lock().unwrap())
    }

    /// Mutates the mock state.
    pub fn state_mut<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    state: Arc<Mutex<MockState>>,
    base_url: String,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    loop {
        // Read until the header terminator.
        let header_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            let mut chunk = [0u8; 8192];
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(()); // connection closed between requests
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let path = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("/")
            .to_string();
        let content_length = header_value(&head, "content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let content_type = header_value(&head, "content-type").unwrap_or_default();
        let content_range = header_value(&head, "content-range");

        // Read the body.
        while buf.len() < header_end + content_length {
            let mut chunk = [0u8; 8192];
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).into_owned();
        buf.drain(..header_end + content_length);

        let response_body = respond(&state, &base_url, &path, &content_type, content_range, &body);
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            response_body.len(),
            response_body
        );
        stream.write_all(response.as_bytes()).await?;
    }
}

fn respond(
    state: &Mutex<MockState>,
    base_url: &str,
    path: &str,
    content_type: &str,
    content_range: Option<String>,
    body: &str,
) -> String {
    if path.starts_with("/file/info") {
        return info_response(state, body);
    }

    let is_multipart = content_type.starts_with("multipart/");
    if is_multipart || path.starts_with("/remote") {
        return upload_response(state, is_multipart, content_range, body);
    }

    negotiation_response(state, base_url)
}

fn negotiation_response(state: &Mutex<MockState>, base_url: &str) -> String {
    let mut s = state.lock().unwrap();
    if s.reject_negotiations {
        return r#"{"status":"error","result":"invalid credentials"}"#.to_string();
    }
    s.negotiations += 1;
    s.next_key += 1;
    let key = format!("key-{}", s.next_key);
    s.issued_keys.insert(key.clone());

    format!(
        concat!(
            r#"{{"status":"success","result":{{"#,
            r#""server":"{base}","#,
            r#""server_file":"{base}/file/upload","#,
            r#""server_remote":"{base}/remote","#,
            r#""cTracker":"trk-1","#,
            r#""upload_key":"{key}","#,
            r#""upload_key_expiry":"1700000000","#,
            r#""max_chunk_size":"{chunk}","#,
            r#""max_file_size":"{file}","#,
            r#""max_mirrors":"5","#,
            r#""mirrors":{{"m1":{{"name":"Mirror One"}},"m2":{{"name":"Mirror Two"}}}},"#,
            r#""default_mirrors":["m1","m2"]"#,
            r#"}}}}"#
        ),
        base = base_url,
        key = key,
        chunk = s.chunk_threshold,
        file = s.file_threshold,
    )
}

fn upload_response(
    state: &Mutex<MockState>,
    is_multipart: bool,
    content_range: Option<String>,
    body: &str,
) -> String {
    let upload_key = if is_multipart {
        multipart_field(body, "upload_key")
    } else {
        urlencoded_field(body, "upload_key")
    };
    let has_password = if is_multipart {
        body.contains("name=\"file_password\"")
    } else {
        body.contains("file_password=")
    };
    let file_name = multipart_file_name(body);

    let mut s = state.lock().unwrap();
    s.uploads.push(UploadRecord {
        content_range: content_range.clone(),
        upload_key: upload_key.clone(),
        has_password,
        file_name: file_name.clone(),
    });

    if s.reject_uploads {
        return r#"{"status":"error","result":"uploads disabled"}"#.to_string();
    }
    if s.fail_nth_upload == Some(s.uploads.len()) {
        return r#"{"status":"error","result":"chunk rejected"}"#.to_string();
    }

    let Some(key) = upload_key else {
        return r#"{"status":"error","result":"missing upload key"}"#.to_string();
    };
    if s.consumed_keys.contains(&key) {
        s.key_reuse_rejections += 1;
        return r#"{"status":"error","result":"upload key already used"}"#.to_string();
    }
    if !s.issued_keys.contains(&key) {
        return r#"{"status":"error","result":"unknown upload key"}"#.to_string();
    }

    // The key is spent when the transfer completes: on the final range of a
    // chunked upload, or immediately for rangeless requests.
    let completes_transfer = match content_range.as_deref() {
        Some(range) => is_final_range(range),
        None => true,
    };
    if completes_transfer {
        s.issued_keys.remove(&key);
        s.consumed_keys.insert(key);
    }

    let ordinal = s.uploads.len();
    let name = file_name.unwrap_or_else(|| "remote".to_string());
    format!(
        r#"{{"status":"success","result":{{"name":"{name}","slug":"slug-{ordinal}","size":"0","url":"https://mirrorace.example/m/slug-{ordinal}"}}}}"#
    )
}

fn info_response(state: &Mutex<MockState>, body: &str) -> String {
    let files = urlencoded_field(body, "files");
    let mut s = state.lock().unwrap();
    s.last_info_files = files.clone();

    let mut entries = Vec::new();
    for slug in files.unwrap_or_default().split(',').filter(|s| !s.is_empty()) {
        // All-numeric slugs play the part of syntactically invalid ones:
        // the service answers with an empty record, not an error.
        if slug.chars().all(|c| c.is_ascii_digit()) {
            entries.push(format!(r#""{slug}":{{}}"#));
        } else {
            entries.push(format!(
                concat!(
                    r#""{slug}":{{"id":"7","name":"{slug}.bin","slug":"{slug}","#,
                    r#""size":"1024","url":"https://mirrorace.example/m/{slug}","status":"online"}}"#
                ),
                slug = slug
            ));
        }
    }
    format!(r#"{{"status":"success","result":{{{}}}}}"#, entries.join(","))
}

fn is_final_range(range: &str) -> bool {
    // "bytes {start}-{end}/{total}"
    let Some(rest) = range.strip_prefix("bytes ") else {
        return true;
    };
    let Some((span, total)) = rest.split_once('/') else {
        return true;
    };
    let Some((_, end)) = span.split_once('-') else {
        return true;
    };
    match (end.parse::<u64>(), total.parse::<u64>()) {
        (Ok(end), Ok(total)) => end + 1 == total,
        _ => true,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim().eq_ignore_ascii_case(name) {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

fn urlencoded_field(body: &str, name: &str) -> Option<String> {
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == name {
            Some(percent_decode(value))
        } else {
            None
        }
    })
}

fn multipart_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"");
    let start = body.find(&marker)?;
    let rest = &body[start..];
    let value_start = rest.find("\r\n\r\n")? + 4;
    let value = &rest[value_start..];
    let value_end = value.find("\r\n")?;
    Some(value[..value_end].to_string())
}

fn multipart_file_name(body: &str) -> Option<String> {
    let start = body.find("filename=\"")? + "filename=\"".len();
    let rest = &body[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Decodes the handful of escapes reqwest's form encoding produces in tests.
fn percent_decode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '+' => out.push(' '),
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => out.push(byte as char),
                    Err(_) => {
                        out.push('%');
                        out.push_str(&hex);
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}
