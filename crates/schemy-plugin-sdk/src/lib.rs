pub mod extension;
pub mod host;
pub mod manifest;
pub mod plugin;
pub mod version;

pub use extension::PluginSet;
pub use host::{ExtensionHost, HostContext, HostMethod};
pub use manifest::PluginManifest;
pub use plugin::{hooks, ParseOutcome, SchemaPlugin, ValidationOutcome};
pub use version::{check_host_version, VersionIncompatibleError};

/// Returns the crate version baked in at compile time.
pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
