//! Docs API server.
//!
//! Built on `tiny_http`, one request at a time on the main thread:
//!
//! | Route                 | Source                                  |
//! |-----------------------|-----------------------------------------|
//! | `GET /api/docs-index` | [`IndexStore`], TTL cached              |
//! | `GET /api/docs/:topic`| [`TopicStore`], TTL cached per topic    |
//! | `GET /sitemap.xml`    | rendered from the data directory        |
//! | `GET /*`              | static file under `[serve].public`      |
//!
//! API responses carry `Cache-Control` and `X-Cache: HIT|MISS`. Failures
//! are `{"statusCode": .., "message": ..}` bodies. Ctrl+C shuts down.

use crate::{
    config::SiteConfig,
    docs::{ApiError, Clock, DataRoot, IndexStore, Lookup, SystemClock, TopicStore},
    generator::render_sitemap,
    log,
};
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Component, Path},
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const JSON: &str = "application/json; charset=utf-8";

/// Start the server and block until Ctrl+C.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;
    let data = DataRoot::resolve(config.get_root(), &config.data);
    log!("serve"; "data: {}", data.dir.display());
    let app = App::new(config, data, Arc::new(SystemClock));

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &app) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (from port {}): {}",
        max_retries,
        base_port,
        last_error.map_or_else(|| "no attempt made".to_owned(), |e| e.to_string())
    ))
}

// ============================================================================
// Application State
// ============================================================================

/// Stores and settings shared by every request.
struct App<'a> {
    config: &'a SiteConfig,
    data: DataRoot,
    topics: TopicStore,
    index: IndexStore,
}

impl<'a> App<'a> {
    fn new(config: &'a SiteConfig, data: DataRoot, clock: Arc<dyn Clock>) -> Self {
        let ttl = config.serve.ttl();
        Self {
            topics: TopicStore::new(data.dir.clone(), ttl, Arc::clone(&clock)),
            index: IndexStore::new(data.index.clone(), ttl, clock),
            config,
            data,
        }
    }
}

// ============================================================================
// Routing
// ============================================================================

/// A response not yet bound to a `tiny_http` request.
#[derive(Debug)]
struct Reply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: Vec<u8>,
}

impl Reply {
    fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_owned())],
            body: body.into(),
        }
    }

    fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    fn not_found() -> Self {
        Self::new(404, "text/plain; charset=utf-8", "404 Not Found")
    }
}

fn handle_request(request: Request, app: &App) -> Result<()> {
    let reply = route(app, request.method(), request.url());
    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    for (name, value) in reply.headers {
        let header = Header::from_bytes(name.as_bytes(), value.as_bytes())
            .map_err(|()| anyhow!("invalid `{name}` header value"))?;
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn route(app: &App, method: &Method, url: &str) -> Reply {
    // Strip query string before resolving path
    let raw_path = url.split(['?', '#']).next().unwrap_or_default();
    let is_api = raw_path.starts_with("/api/");

    if *method != Method::Get {
        let reply = if is_api {
            api_error_reply(405, "Method not allowed")
        } else {
            Reply::new(405, "text/plain; charset=utf-8", "405 Method Not Allowed")
        };
        return reply.with_header("Allow", "GET");
    }

    match raw_path {
        "/api/docs-index" => api_reply(app, app.index.get()),
        "/api/docs" => api_reply(app, app.topics.get("")),
        "/sitemap.xml" => match render_sitemap(app.config, &app.data.dir) {
            Ok(xml) => Reply::new(200, "application/xml; charset=utf-8", xml),
            Err(err) => {
                log!("error"; "sitemap: {err:#}");
                Reply::new(500, "text/plain; charset=utf-8", "500 Internal Server Error")
            }
        },
        _ => {
            if let Some(segment) = raw_path.strip_prefix("/api/docs/") {
                let topic = match urlencoding::decode(segment) {
                    Ok(topic) => topic,
                    Err(_) => {
                        return api_reply(app, Err(ApiError::Validation("topic is not valid UTF-8".into())));
                    }
                };
                api_reply(app, app.topics.get(&topic))
            } else if is_api {
                api_error_reply(404, "Not found")
            } else {
                static_file(&app.config.serve.public, raw_path)
            }
        }
    }
}

fn api_reply(app: &App, result: Result<Lookup, ApiError>) -> Reply {
    match result {
        Ok(lookup) => Reply::new(200, JSON, lookup.value.to_string())
            .with_header("Cache-Control", app.config.serve.cache_control.clone())
            .with_header("X-Cache", lookup.cache.header()),
        Err(err) => {
            if err.status() >= 500 {
                log!("error"; "{err}");
            }
            Reply::new(err.status(), JSON, err.to_json())
        }
    }
}

fn api_error_reply(status: u16, message: &str) -> Reply {
    let body = serde_json::json!({ "statusCode": status, "message": message });
    Reply::new(status, JSON, body.to_string())
}

// ============================================================================
// Static Files
// ============================================================================

/// Serve `{public}/{path}`, or `index.html` for a directory.
fn static_file(public: &Path, raw_path: &str) -> Reply {
    let Ok(decoded) = urlencoding::decode(raw_path) else {
        return Reply::not_found();
    };
    let relative = Path::new(decoded.trim_matches('/'));
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return Reply::not_found();
    }

    let mut path = public.join(relative);
    if path.is_dir() {
        path = path.join("index.html");
    }
    match fs::read(&path) {
        Ok(content) => Reply::new(200, guess_content_type(&path), content),
        Err(_) => Reply::not_found(),
    }
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => JSON,
        Some("xml") => "application/xml; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff2") => "font/woff2",

        // Generated artifacts
        Some("ipynb") => "application/x-ipynb+json",
        Some("tex") => "application/x-tex",
        Some("md") => "text/markdown; charset=utf-8",
        Some("vue" | "txt") => "text/plain; charset=utf-8",
        Some("pdf") => "application/pdf",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::ttl::tests::ManualClock;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Site {
        dir: TempDir,
        config: SiteConfig,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let mut config = SiteConfig::default();
            config.base.url = "https://mathhook.org".into();
            config.serve.public = dir.path().join("public");
            fs::create_dir_all(dir.path().join("data")).unwrap();
            fs::create_dir_all(&config.serve.public).unwrap();
            Self { dir, config }
        }

        fn data(&self) -> DataRoot {
            let dir = self.dir.path().join("data");
            DataRoot {
                index: dir.join("_index.json"),
                dir,
            }
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn app(&self, clock: Arc<ManualClock>) -> App<'_> {
            App::new(&self.config, self.data(), clock)
        }
    }

    fn header<'r>(reply: &'r Reply, name: &str) -> Option<&'r str> {
        reply
            .headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    fn body_json(reply: &Reply) -> serde_json::Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn test_topic_miss_then_hit() {
        let site = Site::new();
        site.write("data/limits.json", r#"{"title": "Limits"}"#);
        let app = site.app(ManualClock::new());

        let first = route(&app, &Method::Get, "/api/docs/limits");
        assert_eq!(first.status, 200);
        assert_eq!(header(&first, "X-Cache"), Some("MISS"));
        assert_eq!(header(&first, "Cache-Control"), Some("public, max-age=300"));
        assert_eq!(body_json(&first)["title"], "Limits");

        let second = route(&app, &Method::Get, "/api/docs/limits?x=1");
        assert_eq!(header(&second, "X-Cache"), Some("HIT"));
    }

    #[test]
    fn test_topic_expires_with_clock() {
        let site = Site::new();
        site.write("data/limits.json", "{}");
        let clock = ManualClock::new();
        let app = site.app(Arc::clone(&clock));

        route(&app, &Method::Get, "/api/docs/limits");
        clock.advance(site.config.serve.ttl() + Duration::from_millis(1));
        let reply = route(&app, &Method::Get, "/api/docs/limits");
        assert_eq!(header(&reply, "X-Cache"), Some("MISS"));
    }

    #[test]
    fn test_topic_errors() {
        let site = Site::new();
        site.write("data/broken.json", "{");
        let app = site.app(ManualClock::new());

        for (url, status) in [
            ("/api/docs/", 400),
            ("/api/docs", 400),
            ("/api/docs/..%2Fsecret", 400),
            ("/api/docs/a%2Fb", 400),
            ("/api/docs/missing", 404),
            ("/api/docs/broken", 500),
        ] {
            let reply = route(&app, &Method::Get, url);
            assert_eq!(reply.status, status, "{url}");
            assert_eq!(body_json(&reply)["statusCode"], status);
            assert!(header(&reply, "X-Cache").is_none());
        }
    }

    #[test]
    fn test_index_routes() {
        let site = Site::new();
        let app = site.app(ManualClock::new());
        assert_eq!(route(&app, &Method::Get, "/api/docs-index").status, 503);

        site.write("data/_index.json", r#"{"topics": []}"#);
        let reply = route(&app, &Method::Get, "/api/docs-index");
        assert_eq!(reply.status, 200);
        assert_eq!(header(&reply, "X-Cache"), Some("MISS"));
    }

    #[test]
    fn test_non_get_rejected() {
        let site = Site::new();
        let app = site.app(ManualClock::new());

        let reply = route(&app, &Method::Post, "/api/docs-index");
        assert_eq!(reply.status, 405);
        assert_eq!(header(&reply, "Allow"), Some("GET"));
        assert_eq!(body_json(&reply)["statusCode"], 405);
    }

    #[test]
    fn test_static_files() {
        let site = Site::new();
        site.write("public/outputs/summary.json", r#"{"outputs": {}}"#);
        site.write("public/index.html", "<h1>docs</h1>");
        site.write("secret.txt", "nope");
        let app = site.app(ManualClock::new());

        let summary = route(&app, &Method::Get, "/outputs/summary.json");
        assert_eq!(summary.status, 200);
        assert_eq!(header(&summary, "Content-Type"), Some(JSON));

        assert_eq!(route(&app, &Method::Get, "/").body, b"<h1>docs</h1>");
        assert_eq!(route(&app, &Method::Get, "/../secret.txt").status, 404);
        assert_eq!(route(&app, &Method::Get, "/%2E%2E/secret.txt").status, 404);
        assert_eq!(route(&app, &Method::Get, "/nope.css").status, 404);
    }

    #[test]
    fn test_sitemap_route() {
        let site = Site::new();
        site.write("data/limits.json", "{}");
        let app = site.app(ManualClock::new());

        let reply = route(&app, &Method::Get, "/sitemap.xml");
        assert_eq!(reply.status, 200);
        let xml = String::from_utf8(reply.body).unwrap();
        assert!(xml.contains("<loc>https://mathhook.org/docs/limits</loc>"));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a/deriv.ipynb")), "application/x-ipynb+json");
        assert_eq!(guess_content_type(Path::new("manifest.json")), JSON);
        assert_eq!(guess_content_type(Path::new("blob")), "application/octet-stream");
    }
}
