//! Starting point for writing a Schemy plugin.
//!
//! A plugin is any type implementing [`SchemaPlugin`]. Every hook is
//! optional: implement the ones you need, declare them in `capabilities()`,
//! and the host invokes each at its fixed lifecycle point with an explicit
//! [`HostContext`] handle to the live host state. Copy this crate, rename
//! the plugin and keep only the hooks you use.

use anyhow::Result;
use schemy_plugin_sdk::{
    hooks, HostContext, ParseOutcome, PluginManifest, SchemaPlugin, ValidationOutcome,
};
use serde_json::Value;

/// Use the repository name here.
pub const PLUGIN_NAME: &str = "schemy-plugin-boilerplate";

/// Reference plugin wiring up every available hook with a template body.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoilerplatePlugin;

impl SchemaPlugin for BoilerplatePlugin {
    fn plugin_name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn plugin_version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    /// The minimum host version this plugin works against. The host stays
    /// deliberately lightweight and does not verify this for you beyond the
    /// extension call, so call `version_check` whenever you need to be sure
    /// the features you rely on are available.
    fn required_version(&self) -> &'static str {
        "3.2.0"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        hooks::ALL
    }

    /// Invoked whenever the host's extension call runs, with the manifests
    /// of the plugins passed to that call.
    fn plugins_initialized(
        &self,
        host: &mut dyn HostContext,
        plugins: &[PluginManifest],
    ) -> Result<()> {
        // Keep this check if your setup must run once: the host re-runs the
        // hook on every extension call, and without it your setup would run
        // again for batches that do not even contain this plugin.
        if !plugins.iter().any(|p| p.plugin_name == self.plugin_name()) {
            return Ok(());
        }

        // If your plugin adds a method to the host, this is where to do it.
        // Users can then call `host.call_method("hello", args)`.
        host.install_method(
            "hello",
            Box::new(|_args| {
                tracing::info!("hello world");
                Value::String("hello world".to_string())
            }),
        );
        Ok(())
    }

    /// Invoked when a new schema instance is created, before the host parses
    /// the definition.
    fn before_parse(&self, _host: &mut dyn HostContext, _schema: &mut Value) -> Result<ParseOutcome> {
        // Update the schema here and the host will use your version. Return
        // `ParseOutcome::AlreadyParsed` to suppress the host's own parser,
        // in which case the parsing is entirely up to you.
        Ok(ParseOutcome::Continue)
    }

    /// Invoked after the host finishes analyzing the schema.
    fn after_parse(&self, _host: &mut dyn HostContext, _schema: &Value) -> Result<()> {
        // `_schema` is the parsed definition at this point.
        Ok(())
    }

    /// Invoked before the host validates data.
    fn before_validate(
        &self,
        _host: &mut dyn HostContext,
        _data: &mut Value,
    ) -> Result<ValidationOutcome> {
        // This is a good place to transform the input; the host picks up any
        // changes you make. Return `ValidationOutcome::Fail` with messages
        // to fail the run, and they land on the shared error list.
        Ok(ValidationOutcome::Continue)
    }

    /// Invoked when validation finished, success or error.
    fn after_validate(&self, host: &mut dyn HostContext, _data: &Value) -> Result<()> {
        // The host no longer uses the data, but the validation errors are
        // still readable here.
        if let Some(errors) = host.validation_errors() {
            tracing::debug!(count = errors.len(), "validation finished");
        }
        Ok(())
    }

    /// Invoked when the user retrieves the validation errors.
    fn validation_errors_retrieved(&self, _host: &mut dyn HostContext) -> Result<()> {
        // Rewrite the error list through `_host` here, e.g. to translate the
        // messages, and the user receives the updated version.
        Ok(())
    }
}
