//! Shared fixtures for dispatcher and server tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde::Serialize;

use page_dispatch::error::{DispatchError, WriterError};
use page_dispatch::handler::{Handler, HandlerContext, HandlerDeclaration, HandlerMap, RegistryResolver};
use page_dispatch::http::{BufferedResponse, DispatchRequest, ResponseSink};
use page_dispatch::outcome::{Failure, FailureHierarchy, Outcome, ResponseDescriptor};
use page_dispatch::routing::RuleTableBuilder;
use page_dispatch::template::MemoryTemplates;
use page_dispatch::writer::{ContentWriter, WriterSet};
use page_dispatch::Dispatcher;

/// Answers the REST rule with a raw 401.
pub struct RestHandler;

impl Handler for RestHandler {
    fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
        Ok(Outcome::value(401))
    }
}

#[derive(Serialize)]
struct Query {
    value: u32,
}

pub struct JsonQuery;

impl Handler for JsonQuery {
    fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
        Outcome::json(&Query { value: 123 })
    }
}

pub struct ThrowNullPointer;

impl Handler for ThrowNullPointer {
    fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
        Err(Failure::new("null-pointer", "no value bound"))
    }
}

/// Raises a kind with no forward of its own; only an ancestor is mapped.
pub struct ThrowIllegalState;

impl Handler for ThrowIllegalState {
    fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
        Err(Failure::new("illegal-state", "not ready").with_source(std::io::Error::other("disk gone")))
    }
}

/// Echoes the `{id}` path variable and the `q` query parameter.
pub struct UserQuery;

impl Handler for UserQuery {
    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
        Ok(Outcome::value(serde_json::json!({
            "id": ctx.path_var("id"),
            "q": ctx.param("q"),
        })))
    }
}

pub fn hierarchy() -> FailureHierarchy {
    FailureHierarchy::new()
        .with("throwable", None)
        .with("exception", Some("throwable"))
        .with("runtime", Some("exception"))
        .with("null-pointer", Some("runtime"))
        .with("illegal-state", Some("runtime"))
        .with("fatal", Some("throwable"))
}

pub fn registry() -> HandlerMap {
    let map = HandlerMap::new();
    map.register(RestHandler);
    map.register(JsonQuery);
    map.register(UserQuery);
    map.register_named("throw-npe", ThrowNullPointer);
    map.register_named("throw-exception", ThrowIllegalState);
    map.register_named("fatal", |_ctx: &HandlerContext<'_>| -> Result<Outcome, Failure> {
        Err(Failure::new("fatal", "out of memory"))
    });
    map
}

/// The rule set the fixtures serve; the catch-all is declared first on purpose.
pub fn rules() -> RuleTableBuilder {
    let mut builder = RuleTableBuilder::new();
    builder.with_hierarchy(hierarchy());
    builder.add_global_forward("null-pointer", "/NullPointerException", 501);
    builder.add_global_forward("exception", "/Exception", 500);

    builder.add("/**/*").forward_with_status("/notfound", 404);
    builder
        .add("/index")
        .forward("/index.html")
        .forward_on("throwable", "/error.html", 500);
    builder.add("/go-redirect").redirect("/go-redirect/ok");
    builder
        .add_with_method(Method::DELETE, "/restapi")
        .handler(HandlerDeclaration::of::<RestHandler>())
        .rest();
    builder.add("/getjson").json(HandlerDeclaration::of::<JsonQuery>());
    builder.add("/users/{id}").json(HandlerDeclaration::of::<UserQuery>());
    builder
        .add("/thrownep")
        .handler(HandlerDeclaration::named("throw-npe"))
        .forward("/thrownep.html");
    builder
        .add("/throwexception")
        .handler(HandlerDeclaration::named("throw-exception"))
        .forward("/throwexception.html");
    builder
        .add("/fatal")
        .handler(HandlerDeclaration::named("fatal"))
        .forward("/fatal.html");
    builder
}

pub fn templates() -> MemoryTemplates {
    MemoryTemplates::new()
        .with_page("/index.html", "<h1>index</h1>")
        .with_page("/error.html", "<h1>error</h1>")
        .with_page("/notfound", "<h1>not found</h1>")
        .with_page("/NullPointerException", "<h1>npe</h1>")
        .with_page("/Exception", "<h1>exception</h1>")
}

pub fn dispatcher_with(writers: WriterSet) -> Dispatcher {
    let resolver = RegistryResolver::new(Arc::new(registry()));
    Dispatcher::new(rules().build().unwrap(), Arc::new(resolver), writers)
}

pub fn dispatcher() -> Dispatcher {
    dispatcher_with(WriterSet::new(Arc::new(templates())))
}

/// Dispatch `method path` and return what was written.
pub fn send(dispatcher: &Dispatcher, method: Method, path: &str) -> Result<BufferedResponse, DispatchError> {
    let mut response = BufferedResponse::new();
    dispatcher.dispatch_and_process(&DispatchRequest::new(method, path), &mut response)?;
    Ok(response)
}

pub fn body_text(response: &BufferedResponse) -> String {
    String::from_utf8_lossy(response.body()).into_owned()
}

pub fn status(response: &BufferedResponse) -> StatusCode {
    response.status().unwrap_or(StatusCode::OK)
}

/// Writer that counts calls and writes nothing.
#[derive(Default)]
pub struct CountingWriter(AtomicUsize);

impl CountingWriter {
    pub fn calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl ContentWriter for CountingWriter {
    fn write(&self, _descriptor: &ResponseDescriptor, _response: &mut dyn ResponseSink) -> Result<(), WriterError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
