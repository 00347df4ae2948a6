//! The composition root.
//!
//! [`assemble`] wires every collaborator and filter into one [`Pipeline`]:
//!
//! ```text
//! request ──► audit ──► catch_all ──► catch_validation ──► catch_upstream ──► routing table
//!
//! routing table, first match wins:
//!   /api/*            business API
//!   /internal/*       diagnostics
//!   /users|/inhabitants|/entries  web view
//!   /*                static assets
//! ```
//!
//! Assembly does no I/O. Everything the system touches outside its own
//! process (time, the audit trail, both downstream services) arrives in
//! [`Dependencies`], so tests can swap any of it for an in-memory double.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::api::Api;
use crate::assets::{assets, DEFAULT_ROOT};
use crate::client::{EntryLogger, Transport, UserDirectory};
use crate::clock::Clock;
use crate::diagnostic::diagnostic;
use crate::events::EventSink;
use crate::filter::FilterChain;
use crate::handler::BoxedHandler;
use crate::inhabitants::Inhabitants;
use crate::middleware::catch_all::server_error;
use crate::middleware::{Auditor, CatchAll, CatchUpstream, CatchValidation};
use crate::request::Request;
use crate::response::Response;
use crate::routing::RoutingTable;
use crate::web::{self, web};

/// Everything the pipeline needs from the outside world.
#[derive(Clone)]
pub struct Dependencies {
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn EventSink>,
    pub user_directory: Arc<dyn Transport>,
    pub entry_logger: Arc<dyn Transport>,
}

/// The assembled request pipeline.
///
/// Cheap to clone and safe to call from any number of tasks at once.
#[derive(Clone, Debug)]
pub struct Pipeline(BoxedHandler);

impl Pipeline {
    /// Produces exactly one response for `req`. Never fails.
    pub async fn handle(&self, req: Request) -> Response {
        match self.0.call(req).await {
            Ok(resp) => resp,
            // The catch-all never yields `Err`; this only guards against a
            // filter added outside it.
            Err(_) => server_error(),
        }
    }
}

/// Assembles the pipeline with the bundled asset root.
pub fn assemble(deps: Dependencies) -> Pipeline {
    assemble_with_assets(deps, DEFAULT_ROOT)
}

/// Assembles the pipeline serving static assets from `root`.
pub fn assemble_with_assets(deps: Dependencies, root: impl Into<PathBuf>) -> Pipeline {
    let Dependencies { clock, events, user_directory, entry_logger } = deps;

    let directory = UserDirectory::new(user_directory);
    let entry_logger = EntryLogger::new(entry_logger, Arc::clone(&clock));
    let inhabitants = Arc::new(Inhabitants::new());

    let routes = RoutingTable::new()
        .bind("/api", Api::new(directory.clone(), entry_logger.clone(), Arc::clone(&inhabitants)).into_handler())
        .bind("/internal", diagnostic(Arc::clone(&clock)))
        .mount(web::PATHS, web(directory, entry_logger, inhabitants))
        .fallback(assets(root));

    let filters = filters(clock, events);
    debug!(filters = ?filters.names(), "pipeline assembled");
    Pipeline(filters.then(routes.into_handler()))
}

/// The fixed filter order, outermost first.
fn filters(clock: Arc<dyn Clock>, events: Arc<dyn EventSink>) -> FilterChain {
    FilterChain::new()
        .with(Auditor::new(clock, events))
        .with(CatchAll)
        .with(CatchValidation)
        .with(CatchUpstream)
}
