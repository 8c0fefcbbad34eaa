//! Browser handler -- the universal catch-all.
//!
//! Every command that no earlier handler claimed ends up here.  URL-looking
//! input is opened directly (with an `http://` scheme supplied when
//! missing); everything else becomes a web search.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use url::form_urlencoded;

use herald_kernel::text;
use herald_kernel::{FieldMap, Handler, Invocation, Outcome, Result};

use crate::backend::{self, ScriptBackend};

/// Classifies input as URL-like: either an explicit `http(s)://` target, or
/// a bare domain (label 2-256 chars, alphabetic TLD 2-6 chars) with an
/// optional path/query tail.  Anything with whitespace fails both arms.
const URL_PATTERN: &str = r"(?i)^(?:https?://[-a-zA-Z0-9@:%._+~#=/?&]+|[-a-zA-Z0-9@:%._+~#=]{2,256}\.[a-zA-Z]{2,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*)$";

/// Query template that non-URL input is appended to, percent-encoded.
const SEARCH_TEMPLATE: &str = "https://www.google.com/search?q=";

/// Always recognizes; captures the whole command as the target.
struct AnyInvocation;

#[async_trait]
impl Invocation for AnyInvocation {
    fn recognize(&self, _command: &str) -> bool {
        true
    }

    async fn parse(&self, command: &str) -> Result<FieldMap> {
        let mut fields = FieldMap::new();
        fields.set("target", command.trim());
        Ok(fields)
    }
}

/// Catch-all handler: open a URL or run a web search.
pub struct BrowserHandler {
    invocations: Vec<Box<dyn Invocation>>,
    backend: Arc<dyn ScriptBackend>,
    url_pattern: Regex,
}

impl BrowserHandler {
    pub fn new(backend: Arc<dyn ScriptBackend>) -> Self {
        Self {
            invocations: vec![Box::new(AnyInvocation)],
            backend,
            url_pattern: Regex::new(URL_PATTERN).expect("static URL pattern must compile"),
        }
    }

    /// Turn the raw command into the URL that should be opened.
    fn resolve_url(&self, target: &str) -> String {
        if self.url_pattern.is_match(target) {
            let has_scheme = text::strip_prefix_ignore_case(target, "http://").is_some()
                || text::strip_prefix_ignore_case(target, "https://").is_some();
            if has_scheme {
                target.to_string()
            } else {
                format!("http://{target}")
            }
        } else {
            let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
            format!("{SEARCH_TEMPLATE}{encoded}")
        }
    }
}

#[async_trait]
impl Handler for BrowserHandler {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn recognize(&self, command: &str) -> Option<usize> {
        self.invocations.iter().position(|inv| inv.recognize(command))
    }

    async fn handle(&self, command: &str, invocation: usize) -> Outcome {
        let Some(inv) = self.invocations.get(invocation) else {
            return Outcome::error(format!("browser has no invocation {invocation}"));
        };

        let fields = match inv.parse(command).await {
            Ok(fields) => fields,
            Err(e) => return Outcome::error(e.to_string()),
        };
        let target = fields.value("target").unwrap_or_default();

        let url = self.resolve_url(target);
        debug!(url = %url, "opening in browser");

        let script = format!("open location \"{}\"", backend::escape(&url));
        self.backend.execute(&script).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
