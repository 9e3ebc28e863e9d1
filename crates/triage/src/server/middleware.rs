//! Request context and middleware
//!
//! Every request gets a `RequestContext` carrying its correlation id and
//! the shared journal, injected as an axum extension.

use axum::{
  extract::Request,
  http::{Method, Uri},
  middleware::Next,
  response::Response,
};
use foghorn::journal::Journal;
use std::sync::Arc;
use uuid::Uuid;

/// Request-scoped metadata plus the shared journal
#[derive(Clone)]
pub struct RequestContext {
  /// Unique ID for this request, reused as the response transaction id
  pub request_id: Uuid,
  /// HTTP method
  pub method: Method,
  /// Request URI
  pub uri: Uri,
  /// Shared journal instance
  pub journal: Arc<Journal>,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, journal: Arc<Journal>) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, journal }
  }

  /// Log an info message with request context
  pub fn log_info(&self, message: &str, component: &str) {
    self.journal.info(&self.contextualize(message), component);
  }

  /// Log a success message with request context
  pub fn log_success(&self, message: &str, component: &str) {
    self.journal.success(&self.contextualize(message), component);
  }

  /// Log a warning with request context
  pub fn log_warn(&self, message: &str, component: &str) {
    self.journal.warn(&self.contextualize(message), component);
  }

  /// Log an error with request context
  pub fn log_error(&self, message: &str, component: &str) {
    self.journal.error(&self.contextualize(message), component);
  }

  fn contextualize(&self, message: &str) -> String {
    format!("[{}] {} {} - {}", self.request_id, self.method, self.uri.path(), message)
  }
}

/// Global journal instance
static GLOBAL_JOURNAL: once_cell::sync::OnceCell<Arc<Journal>> = once_cell::sync::OnceCell::new();

/// Initialize the global journal
pub fn init_global_journal(journal: Arc<Journal>) -> Result<(), Arc<Journal>> {
  GLOBAL_JOURNAL.set(journal)
}

/// Get the global journal instance
pub fn global_journal() -> &'static Arc<Journal> {
  GLOBAL_JOURNAL
    .get()
    .expect("Journal should be initialized before the server starts")
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
  let journal = global_journal().clone();
  let context = RequestContext::new(request.method().clone(), request.uri().clone(), journal);

  let started = std::time::Instant::now();
  context.log_info("Request started", "http");

  let mut request = request;
  request.extensions_mut().insert(context.clone());

  let response = next.run(request).await;

  let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
  context.log_info(
    &format!(
      "Request completed (status: {}, duration: {:.2}ms)",
      response.status().as_u16(),
      duration_ms
    ),
    "http",
  );

  response
}
