//! On-demand rendering over HTTP.  One endpoint, `GET /fractals`,
//! with the viewport, zoom, grid size, and function name taken from
//! the query string; parameters that are absent or unparsable fall
//! back to the defaults the caller handed in, one parameter at a
//! time.  Each connection gets its own thread and its own render;
//! nothing mutable is shared between requests.
//!
//! The protocol handling is the bare minimum of HTTP/1.1: read the
//! request line, drain the headers, answer with a complete body and
//! close.  Transport is glue, not core; the renderer only ever sees a
//! writable sink.

use fractalplane::{ColorFunction, RenderOptions, Renderer};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::str::FromStr;
use std::thread;

/// Binds the listener and serves forever, one thread per connection.
pub fn serve(port: u16, defaults: RenderOptions, threads: usize) -> io::Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    println!("Serving fractals at http://127.0.0.1:{}/fractals", port);
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                thread::spawn(move || {
                    if let Err(e) = handle(stream, defaults, threads) {
                        warn!("request failed: {}", e);
                    }
                });
            }
            Err(e) => warn!("could not accept connection: {}", e),
        }
    }
    Ok(())
}

fn handle(stream: TcpStream, defaults: RenderOptions, threads: usize) -> io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }
    let mut stream = reader.into_inner();

    let target = match request_target(&request_line) {
        Some(target) => target,
        None => return respond(&mut stream, "400 Bad Request", "text/plain", b"bad request\n"),
    };
    let (path, query) = split_target(target);
    if path != "/fractals" {
        return respond(&mut stream, "404 Not Found", "text/plain", b"not found\n");
    }

    let params = parse_query(query);
    let options = options_from_query(&params, defaults);
    let name = lookup(&params, "fractal").unwrap_or("mandelbrot");
    debug!("rendering {} for {:?}", name, options);

    let renderer = match Renderer::new(ColorFunction::resolve(name), options) {
        Ok(renderer) => renderer.threads(threads),
        Err(e) => {
            let message = format!("{}\n", e);
            return respond(&mut stream, "400 Bad Request", "text/plain", message.as_bytes());
        }
    };
    let mut body = Vec::new();
    match renderer.render(&mut body) {
        Ok(()) => respond(&mut stream, "200 OK", "image/png", &body),
        Err(e) => {
            let message = format!("{}\n", e);
            respond(
                &mut stream,
                "500 Internal Server Error",
                "text/plain",
                message.as_bytes(),
            )
        }
    }
}

fn respond(
    stream: &mut TcpStream,
    status: &str,
    content_type: &str,
    body: &[u8],
) -> io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    )?;
    stream.write_all(body)?;
    stream.flush()
}

/// The target of a request line such as `GET /fractals?zoom=2 HTTP/1.1`.
fn request_target(request_line: &str) -> Option<&str> {
    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    parts.next()
}

fn split_target(target: &str) -> (&str, &str) {
    match target.find('?') {
        Some(at) => (&target[..at], &target[at + 1..]),
        None => (target, ""),
    }
}

fn parse_query(query: &str) -> Vec<(&str, &str)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.find('=') {
            Some(at) => (&pair[..at], &pair[at + 1..]),
            None => (pair, ""),
        })
        .collect()
}

fn lookup<'a>(params: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|&&(name, _)| name == key)
        .map(|&(_, value)| value)
}

/// Builds options from the query, falling back to the defaults one
/// parameter at a time, the same way the parameters are optional one
/// at a time in the URL.
fn options_from_query(params: &[(&str, &str)], defaults: RenderOptions) -> RenderOptions {
    let float = |key: &str, fallback: f64| {
        lookup(params, key)
            .and_then(|value| f64::from_str(value).ok())
            .unwrap_or(fallback)
    };
    let int = |key: &str, fallback: usize| {
        lookup(params, key)
            .and_then(|value| usize::from_str(value).ok())
            .unwrap_or(fallback)
    };
    RenderOptions {
        xmin: float("xmin", defaults.xmin),
        xmax: float("xmax", defaults.xmax),
        ymin: float("ymin", defaults.ymin),
        ymax: float("ymax", defaults.ymax),
        zoom: float("zoom", defaults.zoom),
        width: int("width", defaults.width),
        height: int("height", defaults.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_targets_parse() {
        assert_eq!(
            request_target("GET /fractals?zoom=2 HTTP/1.1\r\n"),
            Some("/fractals?zoom=2")
        );
        assert_eq!(request_target("GET\r\n"), None);
        assert_eq!(split_target("/fractals?a=1"), ("/fractals", "a=1"));
        assert_eq!(split_target("/fractals"), ("/fractals", ""));
    }

    #[test]
    fn query_parameters_override_defaults_one_at_a_time() {
        let params = parse_query("zoom=2.5&width=64&fractal=newton");
        let options = options_from_query(&params, RenderOptions::default());
        assert_eq!(options.zoom, 2.5);
        assert_eq!(options.width, 64);
        assert_eq!(options.height, 1024);
        assert_eq!(options.xmin, -2.0);
        assert_eq!(lookup(&params, "fractal"), Some("newton"));
    }

    #[test]
    fn unparsable_parameters_fall_back() {
        let params = parse_query("zoom=very-fast&height=");
        let options = options_from_query(&params, RenderOptions::default());
        assert_eq!(options.zoom, 1.0);
        assert_eq!(options.height, 1024);
    }
}
