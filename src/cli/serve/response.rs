//! HTTP response handlers.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

const HTML: &str = "text/html; charset=utf-8";
const PLAIN: &str = "text/plain; charset=utf-8";

/// Content type by extension. Banner projects only ship a handful of
/// asset kinds; everything else is served as octet-stream.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => HTML,
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("zip") => "application/zip",
        Some("txt") => PLAIN,
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Respond with a static file, injecting the reload script into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = content_type_for(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type, ws_port);

    send_body(request, 200, content_type, body)
}

/// Inject the live-reload client before `</body>` of HTML responses.
fn maybe_inject_reload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    let Some(port) = ws_port else {
        return body;
    };
    if content_type != HTML {
        return body;
    }
    let text = match String::from_utf8(body) {
        Ok(text) => text,
        Err(e) => return e.into_bytes(),
    };

    let script = crate::reload::client_script(port);
    if let Some(pos) = text.rfind("</body>") {
        let mut out = String::with_capacity(text.len() + script.len());
        out.push_str(&text[..pos]);
        out.push_str(&script);
        out.push_str(&text[pos..]);
        out.into_bytes()
    } else {
        let mut out = text.into_bytes();
        out.extend_from_slice(script.as_bytes());
        out
    }
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with the loading page (initial build not finished).
///
/// Polls until the server reports ready, then reloads.
pub fn respond_loading(request: Request) -> Result<()> {
    let body = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>building...</title></head>
<body>
  <p>Building banners, hold on...</p>
  <script>
    setInterval(function () {
      fetch(location.href, { method: 'HEAD' })
        .then(function (r) {
          if (r.headers.get('X-Bannerkit-Ready') === 'true') location.reload();
        })
        .catch(function () {});
    }, 500);
  </script>
</body>
</html>
"#;
    // No ready header here: the poll must keep waiting
    let response =
        Response::from_string(body).with_header(make_header("Content-Type", HTML));
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("X-Bannerkit-Ready", "true"));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("X-Bannerkit-Ready", "true"));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
