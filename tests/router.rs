use std::collections::BTreeMap;

use http::{header, HeaderValue, Method};
use pathway::{
    http::{HeaderMapExt, Incoming, Reply, Request, Response},
    Error, Handlers, Param, Pattern, Result, RouteSpec, Router,
};
use pretty_assertions::assert_eq;

struct Controller;

impl Controller {
    fn get_page(&self, request: &Request, mut response: Response) -> Result<Reply> {
        for (token, value) in &request.params {
            response.add(format!("{token}={value:?}\n"));
        }
        response.send(301)
    }
}

fn year(raw: &str) -> Option<Param> {
    (raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()))
        .then(|| Param::Map(BTreeMap::from([("year".to_string(), raw.to_string())])))
}

fn sample() -> Router {
    let mut handlers = Handlers::new();
    handlers.load("controllers/mycontroller", |module| {
        module
            .target("MyController", || Controller)
            .method("getPage", Controller::get_page);
    });
    Router::builder()
        .handlers(handlers)
        .add_route(
            RouteSpec::new("/pages/{id}/{categories}/{name}/{year}")
                .pattern("id", Pattern::Digit)
                .pattern("categories", Pattern::Args)
                .pattern("name", Pattern::Any)
                .pattern("year", Pattern::transform(year))
                .get("MyController::getPage")
                .file("controllers/mycontroller"),
        )
        .build()
        .unwrap()
}

#[test]
fn sample_route_captures_every_token() {
    let reply = sample()
        .route(
            &Incoming::new(Method::GET, "/pages/12/books/fiction/dune/1965"),
            None,
        )
        .unwrap();
    assert_eq!(reply.status.as_u16(), 301);
    assert_eq!(reply.reason, "Moved Permanently");
    assert_eq!(
        reply.body(),
        concat!(
            "categories=Segments([\"books\", \"fiction\"])\n",
            "id=Text(\"12\")\n",
            "name=Text(\"dune\")\n",
            "year=Map({\"year\": \"1965\"})\n",
        )
    );
}

#[test]
fn sample_route_rejects_bad_tokens() {
    let router = sample();
    for path in [
        "/pages/x/books/dune/1965",
        "/pages/12/books/dune/65",
        "/pages/12/books/dune",
    ] {
        assert_eq!(
            router.route(&Incoming::new(Method::GET, path), None).unwrap_err(),
            Error::InvalidPath,
            "{path}"
        );
    }
    assert_eq!(
        router
            .route(&Incoming::new(Method::POST, "/pages/12/books/dune/1965"), None)
            .unwrap_err(),
        Error::InvalidPath
    );
}

#[test]
fn handlers_see_negotiated_request() {
    let mut handlers = Handlers::new();
    handlers.function("describe", |request, mut response| {
        response
            .add(request.client_ip.clone())
            .add("|")
            .add(request.languages.join(","))
            .add("|")
            .add(request.data.get("q").cloned().unwrap_or_default());
        response.send(200)
    });
    let router = Router::builder()
        .handlers(handlers)
        .add_route(RouteSpec::new("/about/").get("describe"))
        .build()
        .unwrap();
    let incoming = Incoming::new(Method::GET, "/about?q=rust&format=json")
        .with_header("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"))
        .with_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("de,en;q=0.5"));
    let reply = router.route(&incoming, None).unwrap();
    assert_eq!(reply.body(), "10.0.0.1|de,en|rust");
    assert_eq!(reply.header_str(header::CONTENT_TYPE), Some("application/json"));
}

#[test]
fn invalid_status_code_surfaces_from_handler() {
    let mut handlers = Handlers::new();
    handlers.function("teapot", |_, response| response.send(999));
    let router = Router::builder()
        .handlers(handlers)
        .add_route(RouteSpec::new("/tea").get("teapot"))
        .build()
        .unwrap();
    assert_eq!(
        router
            .route(&Incoming::new(Method::GET, "/tea"), None)
            .unwrap_err(),
        Error::InvalidResponseCode(999)
    );
}

#[test]
fn malformed_custom_pattern_fails_the_build() {
    let error = Router::builder()
        .add_route(
            RouteSpec::new("/{id}")
                .pattern("id", Pattern::regex("[0-9"))
                .get("x"),
        )
        .build()
        .unwrap_err();
    assert!(matches!(error, Error::InvalidTemplate { template, .. } if template == "/{id}"));
}
