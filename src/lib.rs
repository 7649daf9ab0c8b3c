//! Layered configuration resolution engine.
//!
//! Loads structured configuration from one or more sources, merges them
//! under a deterministic policy, resolves environment placeholders and
//! cross-key references, and exposes a typed, section-addressable view.
//!
//! Pipeline: sources -> merge -> placeholders -> references -> view.
//!
//! ```
//! use layerconf::pipeline::Pipeline;
//! use layerconf::placeholder::ResolutionContext;
//! use layerconf::source::SourceDescriptor;
//! use serde_json::json;
//!
//! let view = Pipeline::new()
//!     .source(SourceDescriptor::inline(json!({
//!         "image": {"size": 100, "name": "${ref:project}-thumb"},
//!         "project": "demo"
//!     })))
//!     .default_section("image")
//!     .context(ResolutionContext::empty())
//!     .load()
//!     .unwrap();
//!
//! assert_eq!(view.get_str("image.name").unwrap(), "demo-thumb");
//! ```

pub mod cli;
pub mod error;
pub mod keypath;
pub mod merge;
pub mod pipeline;
pub mod placeholder;
pub mod reference;
pub mod source;
pub mod tree;
pub mod view;

pub use error::{Error, ErrorKind, OnError, Result};
pub use keypath::Keypath;
pub use merge::{ListStrategy, MergePolicy};
pub use pipeline::Pipeline;
pub use placeholder::ResolutionContext;
pub use source::SourceDescriptor;
pub use tree::Tree;
pub use view::ConfigView;
