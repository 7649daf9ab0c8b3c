//! Pipeline orchestration: sources -> merge -> placeholders -> references -> view.
//!
//! All process-scoped state is held explicitly by the builder and
//! passed by reference through the stages; nothing is ambient. The
//! pipeline is synchronous; independent pipelines may run concurrently
//! since every tree produced is immutable after construction.

use crate::error::{OnError, Result};
use crate::merge::{self, MergePolicy};
use crate::placeholder::{self, ResolutionContext};
use crate::reference;
use crate::source::SourceDescriptor;
use crate::tree::Tree;
use crate::view::ConfigView;
use serde_json::Value;
use tracing::{debug, warn};

/// Builder for one resolution pipeline invocation.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    sources: Vec<SourceDescriptor>,
    merge_policy: MergePolicy,
    on_error: OnError,
    default_section: Option<String>,
    context: Option<ResolutionContext>,
    max_ref_depth: Option<usize>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source. Repeatable; order is ascending precedence
    /// (the last source wins conflicts).
    pub fn source(mut self, descriptor: impl Into<SourceDescriptor>) -> Self {
        self.sources.push(descriptor.into());
        self
    }

    pub fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Downgrade policy for loading and placeholder failures.
    pub fn on_error(mut self, on_error: OnError) -> Self {
        self.on_error = on_error;
        self
    }

    /// Section served when `ConfigView::section(None)` is called.
    pub fn default_section(mut self, name: impl Into<String>) -> Self {
        self.default_section = Some(name.into());
        self
    }

    /// Supply the full resolution context, replacing the environment
    /// snapshot taken by default at load time.
    pub fn context(mut self, context: ResolutionContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a single context override on top of the environment snapshot.
    pub fn env_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let context = self
            .context
            .take()
            .unwrap_or_else(ResolutionContext::from_env);
        self.context = Some(context.with_var(name, value));
        self
    }

    /// Maximum transitive hops per reference chain.
    pub fn max_ref_depth(mut self, max_depth: usize) -> Self {
        self.max_ref_depth = Some(max_depth);
        self
    }

    /// Run the pipeline: load all sources, merge, resolve placeholders
    /// and references, and wrap the result in a [`ConfigView`].
    pub fn load(self) -> Result<ConfigView> {
        let mut trees: Vec<Tree> = Vec::with_capacity(self.sources.len());
        for descriptor in &self.sources {
            match descriptor.load() {
                Ok(tree) => trees.push(tree),
                Err(e) => match self.on_error {
                    OnError::Raise => return Err(e),
                    OnError::Ignore => {
                        trees.push(Value::Object(serde_json::Map::new()));
                    }
                    OnError::Warn => {
                        warn!(
                            location = %descriptor.location(),
                            error = %e,
                            "Skipping source, substituting empty mapping"
                        );
                        trees.push(Value::Object(serde_json::Map::new()));
                    }
                },
            }
        }
        debug!(sources = trees.len(), "Loaded sources");

        let merged = merge::merge_all(trees, &self.merge_policy);

        let context = self.context.unwrap_or_else(ResolutionContext::from_env);
        let expanded = placeholder::resolve(&merged, &context, self.on_error)?;

        let max_depth = self.max_ref_depth.unwrap_or(reference::DEFAULT_MAX_DEPTH);
        let resolved = reference::resolve(&expanded, max_depth)?;
        debug!("Resolution pipeline complete");

        Ok(ConfigView::new(resolved, self.default_section))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_inline_sources_merge_last_wins() {
        let view = Pipeline::new()
            .source(SourceDescriptor::inline(
                json!({"image": {"size": 100, "save": {"copy": false}}}),
            ))
            .source(SourceDescriptor::inline(
                json!({"image": {"save": {"copy": true}}}),
            ))
            .context(ResolutionContext::empty())
            .load()
            .unwrap();
        assert_eq!(
            view.tree(),
            &json!({"image": {"size": 100, "save": {"copy": true}}})
        );
    }

    #[test]
    fn test_failed_source_raises_by_default() {
        let err = Pipeline::new()
            .source(SourceDescriptor::file("/nonexistent/config.yaml"))
            .context(ResolutionContext::empty())
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }

    #[test]
    fn test_failed_source_ignored_substitutes_empty_mapping() {
        let view = Pipeline::new()
            .source(SourceDescriptor::inline(json!({"a": 1})))
            .source(SourceDescriptor::file("/nonexistent/config.yaml"))
            .on_error(OnError::Ignore)
            .context(ResolutionContext::empty())
            .load()
            .unwrap();
        assert_eq!(view.tree(), &json!({"a": 1}));
    }

    #[test]
    fn test_full_resolution_order() {
        // Placeholders resolve before references, so a reference target
        // may come from an environment variable.
        let view = Pipeline::new()
            .source(SourceDescriptor::inline(json!({
                "host": "${HOST:localhost}",
                "url": "http://${ref:host}/api"
            })))
            .context(ResolutionContext::empty())
            .load()
            .unwrap();
        assert_eq!(view.get_str("url").unwrap(), "http://localhost/api");
    }

    #[test]
    fn test_reference_failures_never_downgraded() {
        let err = Pipeline::new()
            .source(SourceDescriptor::inline(json!({"a": "${ref:missing}"})))
            .on_error(OnError::Ignore)
            .context(ResolutionContext::empty())
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    }

    #[test]
    fn test_env_override_feeds_placeholders() {
        let view = Pipeline::new()
            .source(SourceDescriptor::inline(json!({"url": "${SERVICE_HOST}"})))
            .env_override("SERVICE_HOST", "svc.local")
            .load()
            .unwrap();
        assert_eq!(view.get_str("url").unwrap(), "svc.local");
    }

    #[test]
    fn test_default_section_flows_to_view() {
        let view = Pipeline::new()
            .source(SourceDescriptor::inline(json!({"image": {"size": 1}})))
            .default_section("image")
            .context(ResolutionContext::empty())
            .load()
            .unwrap();
        assert_eq!(view.section(None).unwrap()["size"], json!(1));
    }
}
