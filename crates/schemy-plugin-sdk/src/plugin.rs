use anyhow::Result;
use serde_json::Value;

use crate::{
    host::HostContext,
    manifest::PluginManifest,
    version::{check_host_version, VersionIncompatibleError},
};

/// Hook names a plugin declares through `capabilities()`. The host consults
/// the declared set per hook and never invokes an undeclared one.
pub mod hooks {
    pub const PLUGINS_INITIALIZED: &str = "plugins_initialized";
    pub const BEFORE_PARSE: &str = "before_parse";
    pub const AFTER_PARSE: &str = "after_parse";
    pub const BEFORE_VALIDATE: &str = "before_validate";
    pub const AFTER_VALIDATE: &str = "after_validate";
    pub const VALIDATION_ERRORS_RETRIEVED: &str = "validation_errors_retrieved";

    pub const ALL: &[&str] = &[
        PLUGINS_INITIALIZED,
        BEFORE_PARSE,
        AFTER_PARSE,
        BEFORE_VALIDATE,
        AFTER_VALIDATE,
        VALIDATION_ERRORS_RETRIEVED,
    ];
}

/// Outcome of `before_parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Let the host parse the schema as usual.
    Continue,
    /// The plugin parsed the schema itself; the host must skip its own parser.
    AlreadyParsed,
}

/// Outcome of `before_validate`: proceed, or force failure with messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Continue,
    Fail(Vec<String>),
}

impl ValidationOutcome {
    pub fn is_fail(&self) -> bool {
        matches!(self, ValidationOutcome::Fail(_))
    }
}

/// Canonical plugin contract for the Schemy validation host.
///
/// Every hook is optional: the defaults are no-ops, and a hook is only
/// invoked when its name appears in `capabilities()`. Hooks receive an
/// explicit [`HostContext`] handle to the live host state they share within
/// one validation run. Only `version_check` has a typed failure contract;
/// any error returned from the other hooks propagates unchanged to the
/// host's hook-invocation caller.
pub trait SchemaPlugin: Send + Sync {
    /// Plugin identity; use the repository name.
    fn plugin_name(&self) -> &'static str;

    fn plugin_version(&self) -> semver::Version;

    /// Minimum host version ("MAJOR.MINOR" or longer) this plugin needs.
    fn required_version(&self) -> &'static str;

    /// Hook names this plugin implements, from [`hooks`].
    fn capabilities(&self) -> &'static [&'static str] {
        &[]
    }

    fn manifest(&self) -> PluginManifest {
        PluginManifest {
            plugin_name: self.plugin_name().to_string(),
            version: self.plugin_version().to_string(),
            required_version: self.required_version().to_string(),
            description: None,
            capabilities: self
                .capabilities()
                .iter()
                .map(|hook| hook.to_string())
                .collect(),
        }
    }

    /// Fails when the host is absent or older than `required_version`.
    /// Compares major and minor components only.
    fn version_check(&self, host: &dyn HostContext) -> Result<(), VersionIncompatibleError> {
        check_host_version(host.version(), self.required_version())
    }

    /// One-time setup, invoked on every registered plugin whenever the host's
    /// extension call runs. `plugins` holds the manifests of the batch passed
    /// to that call; implementations must return early when their own name is
    /// absent, or setup may run more than once.
    fn plugins_initialized(
        &self,
        _host: &mut dyn HostContext,
        _plugins: &[PluginManifest],
    ) -> Result<()> {
        Ok(())
    }

    /// Invoked with the raw schema before the host parses it. May mutate the
    /// schema in place.
    fn before_parse(
        &self,
        _host: &mut dyn HostContext,
        _schema: &mut Value,
    ) -> Result<ParseOutcome> {
        Ok(ParseOutcome::Continue)
    }

    /// Invoked after the host finishes analyzing the schema.
    fn after_parse(&self, _host: &mut dyn HostContext, _schema: &Value) -> Result<()> {
        Ok(())
    }

    /// Invoked before the host validates data. May mutate the data; the host
    /// picks up any changes. Return `ValidationOutcome::Fail` to force the
    /// run to fail with the given messages.
    fn before_validate(
        &self,
        _host: &mut dyn HostContext,
        _data: &mut Value,
    ) -> Result<ValidationOutcome> {
        Ok(ValidationOutcome::Continue)
    }

    /// Invoked once validation finished, success or not. The data is no
    /// longer used by the host; the validation errors are still readable.
    fn after_validate(&self, _host: &mut dyn HostContext, _data: &Value) -> Result<()> {
        Ok(())
    }

    /// Invoked when the host's error-retrieval accessor is called. Rewrite
    /// the list through the context to update or translate the messages the
    /// user receives.
    fn validation_errors_retrieved(&self, _host: &mut dyn HostContext) -> Result<()> {
        Ok(())
    }
}
