//! Dispatcher façade.
//!
//! # Responsibilities
//! - Derive method and path from the request capability
//! - Match a rule, run its handler pipeline, resolve the outcome
//! - Hand the descriptor to the writer chosen by its kind
//! - Publish rebuilt rule tables atomically
//!
//! # Design Decisions
//! - Each request reads one table snapshot from start to finish
//! - A table is replaced wholesale, never mutated in place
//! - Unmatched routes and unmapped failures surface to the caller unchanged

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;

use crate::error::DispatchError;
use crate::handler::invoker::HandlerInvoker;
use crate::handler::resolver::HandlerResolver;
use crate::http::request::RequestContext;
use crate::http::response::ResponseSink;
use crate::observability::metrics;
use crate::outcome::descriptor::ResponseDescriptor;
use crate::routing::table::RuleTable;
use crate::writer::WriterSet;

/// Owns the current rule table and drives requests through it.
pub struct Dispatcher {
    table: ArcSwap<RuleTable>,
    resolver: Arc<dyn HandlerResolver>,
    writers: WriterSet,
    versions: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher serving `table` as version 1.
    pub fn new(mut table: RuleTable, resolver: Arc<dyn HandlerResolver>, writers: WriterSet) -> Self {
        table.set_version(1);
        metrics::record_table_version(1);
        Self {
            table: ArcSwap::from_pointee(table),
            resolver,
            writers,
            versions: AtomicU64::new(1),
        }
    }

    /// Replace the rule table. In-flight requests finish on the table they started with.
    pub fn publish(&self, mut table: RuleTable) -> u64 {
        let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
        table.set_version(version);
        let rules = table.rules().len();
        self.table.store(Arc::new(table));

        metrics::record_table_version(version);
        tracing::info!(version, rules, "Rule table published");
        version
    }

    /// The table currently served.
    pub fn snapshot(&self) -> Arc<RuleTable> {
        self.table.load_full()
    }

    /// Match, invoke and resolve without writing anything.
    pub fn handle_request(&self, request: &dyn RequestContext) -> Result<ResponseDescriptor, DispatchError> {
        let table = self.table.load();
        resolve_request(&table, self.resolver.as_ref(), request)
    }

    /// Dispatch a request and write the response.
    pub fn dispatch_and_process(
        &self,
        request: &dyn RequestContext,
        response: &mut dyn ResponseSink,
    ) -> Result<(), DispatchError> {
        let start = Instant::now();

        let descriptor = match self.handle_request(request) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                metrics::record_dispatch("error", e.status_code().as_u16(), start);
                return Err(e);
            }
        };

        let kind = descriptor.kind();
        tracing::debug!(kind = %kind, status = descriptor.response_status().as_u16(), "Writer selected");

        if let Err(e) = self.writers.write(&descriptor, response) {
            let e = DispatchError::from(e);
            metrics::record_dispatch("error", e.status_code().as_u16(), start);
            return Err(e);
        }

        metrics::record_dispatch(kind.as_str(), descriptor.response_status().as_u16(), start);
        Ok(())
    }

    pub fn writers(&self) -> &WriterSet {
        &self.writers
    }
}

fn resolve_request(
    table: &RuleTable,
    resolver: &dyn HandlerResolver,
    request: &dyn RequestContext,
) -> Result<ResponseDescriptor, DispatchError> {
    let method = request.method();
    let path = request.path();

    let Some(route) = table.find(method, path) else {
        tracing::warn!(method = %method, path = %path, "No rule matched");
        return Err(DispatchError::UnmatchedRoute {
            method: method.to_string(),
            path: path.to_string(),
        });
    };

    tracing::debug!(
        method = %method,
        path = %path,
        rule = %route.rule,
        version = table.version(),
        "Rule matched"
    );

    let outcome = HandlerInvoker::new(resolver).invoke(&route.rule, request, &route.path_vars)?;
    table.outcomes().resolve(outcome, &route.rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::registry::HandlerMap;
    use crate::handler::resolver::RegistryResolver;
    use crate::http::request::DispatchRequest;
    use crate::http::response::BufferedResponse;
    use crate::outcome::descriptor::Payload;
    use crate::routing::table::RuleTableBuilder;
    use crate::template::MemoryTemplates;
    use axum::http::{Method, StatusCode};

    fn dispatcher(builder: &RuleTableBuilder) -> Dispatcher {
        let templates = MemoryTemplates::new().with_page("/a.html", "A").with_page("/b.html", "B");
        Dispatcher::new(
            builder.build().unwrap(),
            Arc::new(RegistryResolver::new(Arc::new(HandlerMap::new()))),
            WriterSet::new(Arc::new(templates)),
        )
    }

    #[test]
    fn test_publish_swaps_table_and_bumps_version() {
        let mut first = RuleTableBuilder::new();
        first.add("/page").forward("/a.html");
        let dispatcher = dispatcher(&first);
        let held = dispatcher.snapshot();
        assert_eq!(held.version(), 1);

        let mut second = RuleTableBuilder::new();
        second.add("/page").forward("/b.html");
        assert_eq!(dispatcher.publish(second.build().unwrap()), 2);

        let mut response = BufferedResponse::new();
        dispatcher
            .dispatch_and_process(&DispatchRequest::new(Method::GET, "/page"), &mut response)
            .unwrap();
        assert_eq!(response.body(), b"B");

        // A snapshot taken earlier still sees the old table.
        assert_eq!(held.version(), 1);
        assert_eq!(dispatcher.snapshot().version(), 2);
    }

    #[test]
    fn test_unmatched_route_writes_nothing() {
        let mut builder = RuleTableBuilder::new();
        builder.add("/page").forward("/a.html");
        let dispatcher = dispatcher(&builder);

        let mut response = BufferedResponse::new();
        let err = dispatcher
            .dispatch_and_process(&DispatchRequest::new(Method::GET, "/other"), &mut response)
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnmatchedRoute { ref path, .. } if path == "/other"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response, BufferedResponse::new());
    }

    #[test]
    fn test_reported_status_matches_written_status() {
        let mut builder = RuleTableBuilder::new();
        builder.add("/go").redirect("/elsewhere");
        builder.add("/orphan").forward("/missing.html");
        let dispatcher = dispatcher(&builder);

        let descriptor = dispatcher.handle_request(&DispatchRequest::new(Method::GET, "/go")).unwrap();
        let mut response = BufferedResponse::new();
        dispatcher
            .dispatch_and_process(&DispatchRequest::new(Method::GET, "/go"), &mut response)
            .unwrap();
        assert_eq!(response.status(), Some(descriptor.response_status()));
        assert_eq!(descriptor.response_status(), StatusCode::FOUND);

        let err = dispatcher
            .dispatch_and_process(&DispatchRequest::new(Method::GET, "/orphan"), &mut BufferedResponse::new())
            .unwrap_err();
        assert!(matches!(err, DispatchError::Writer(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_handle_request_resolves_without_writing() {
        let mut builder = RuleTableBuilder::new();
        builder.add("/gone").forward_with_status("/a.html", 410);
        let dispatcher = dispatcher(&builder);

        let descriptor = dispatcher
            .handle_request(&DispatchRequest::new(Method::GET, "/gone"))
            .unwrap();
        assert_eq!(descriptor.payload, Payload::Page { path: "/a.html".into() });
        assert_eq!(descriptor.status, StatusCode::GONE);
    }
}
