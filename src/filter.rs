//! Filters and the ordered filter chain.
//!
//! A [`Filter`] turns one handler into another. A [`FilterChain`] is an
//! explicit, ordered list of filters applied once at construction time:
//! the first filter added is the outermost, the handler given to
//! [`FilterChain::then`] is the innermost.
//!
//! ```text
//! FilterChain::new().with(A).with(B).then(app)
//!
//!   request ──► A ──► B ──► app
//!   response ◄── A ◄── B ◄──┘
//! ```

use crate::handler::{BoxedHandler, Handler};

/// A wrapping transformation from one handler to another.
///
/// Any `Fn(BoxedHandler) -> BoxedHandler` closure is a filter, which keeps
/// one-off filters in tests cheap to write.
pub trait Filter: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;

    /// Short name for logs and ordering assertions.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Filter for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// Ordered list of filters, outermost first.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Appends `filter` inside every filter already in the chain.
    pub fn with(mut self, filter: impl Filter) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters, outermost first.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Wraps `handler` in every filter and returns the composed handler.
    pub fn then(&self, handler: impl Handler) -> BoxedHandler {
        self.filters
            .iter()
            .rev()
            .fold(handler.into_boxed_handler(), |next, filter| filter.wrap(next))
    }
}
