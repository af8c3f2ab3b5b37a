//! Send one request through the engine.

use anyhow::{Context, Result};
use sync_types::header::HeaderName;
use sync_types::{HeaderValue, Method, Request, RequestMode, Response};

use crate::host::Host;

/// Options for the fetch command.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Raw `Name: value` headers.
    pub headers: Vec<String>,
    /// Request body.
    pub data: Option<String>,
    /// Mark the request as a top-level navigation.
    pub navigate: bool,
    /// Print response headers.
    pub include_headers: bool,
}

/// Run the fetch command.
pub async fn run(host: &mut Host, options: FetchOptions) -> Result<()> {
    let request = build_request(host, &options)?;
    let response = host.engine.on_fetch(request).await;

    print_response(&response, options.include_headers);
    host.print_client_events();
    Ok(())
}

fn build_request(host: &Host, options: &FetchOptions) -> Result<Request> {
    let method = Method::from_bytes(options.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid method {:?}", options.method))?;
    let url = host
        .engine
        .config()
        .origin
        .join(&options.url)
        .with_context(|| format!("Invalid URL {:?}", options.url))?;

    let mut request = Request::new(method, url);
    for raw in &options.headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }
    if let Some(data) = &options.data {
        request = request.with_body(data.clone().into_bytes());
    }
    if options.navigate {
        request = request.with_mode(RequestMode::Navigate);
    }
    Ok(request)
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header must be 'Name: value', got {:?}", raw))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("Invalid header name in {:?}", raw))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("Invalid header value in {:?}", raw))?;
    Ok((name, value))
}

fn print_response(response: &Response, include_headers: bool) {
    println!("HTTP {}", response.status());
    if include_headers {
        for (name, value) in response.headers() {
            println!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        }
    }
    println!();
    println!("{}", String::from_utf8_lossy(response.body()));
}
