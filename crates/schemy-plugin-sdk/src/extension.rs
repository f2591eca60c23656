use anyhow::Result;
use serde_json::Value;

use crate::{
    host::HostContext,
    manifest::PluginManifest,
    plugin::{hooks, ParseOutcome, SchemaPlugin, ValidationOutcome},
};

/// Ordered registration table of plugins plus the hook dispatch a host runs
/// at each lifecycle point.
///
/// Hooks execute sequentially in registration order within one validation
/// pass; a hook fires only on plugins that declare it in `capabilities()`.
/// Any error a hook returns aborts the dispatch and surfaces to the caller.
#[derive(Default)]
pub struct PluginSet {
    plugins: Vec<Box<dyn SchemaPlugin>>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Manifests of every registered plugin, in registration order.
    pub fn manifests(&self) -> Vec<PluginManifest> {
        self.plugins.iter().map(|plugin| plugin.manifest()).collect()
    }

    /// Registers a batch of plugins, the host's extension call.
    ///
    /// Each new plugin's `version_check` runs first; an incompatible plugin
    /// rejects the whole batch. On success the batch is appended and
    /// `plugins_initialized` fires on every registered plugin with the
    /// manifests of exactly this batch, so a plugin can tell whether it was
    /// part of the call.
    pub fn extend(
        &mut self,
        host: &mut dyn HostContext,
        plugins: Vec<Box<dyn SchemaPlugin>>,
    ) -> Result<()> {
        for plugin in &plugins {
            plugin.version_check(host)?;
        }
        let batch: Vec<PluginManifest> = plugins.iter().map(|plugin| plugin.manifest()).collect();
        self.plugins.extend(plugins);
        for plugin in self.declaring(hooks::PLUGINS_INITIALIZED) {
            tracing::debug!(plugin = plugin.plugin_name(), "initializing plugin");
            plugin.plugins_initialized(host, &batch)?;
        }
        Ok(())
    }

    /// Runs every `before_parse` hook against the raw schema. The host must
    /// skip its own parser when any plugin reports `AlreadyParsed`; later
    /// plugins still observe the schema either way.
    pub fn before_parse(
        &self,
        host: &mut dyn HostContext,
        schema: &mut Value,
    ) -> Result<ParseOutcome> {
        let mut outcome = ParseOutcome::Continue;
        for plugin in self.declaring(hooks::BEFORE_PARSE) {
            if plugin.before_parse(host, schema)? == ParseOutcome::AlreadyParsed {
                tracing::debug!(plugin = plugin.plugin_name(), "plugin took over parsing");
                outcome = ParseOutcome::AlreadyParsed;
            }
        }
        Ok(outcome)
    }

    pub fn after_parse(&self, host: &mut dyn HostContext, schema: &Value) -> Result<()> {
        for plugin in self.declaring(hooks::AFTER_PARSE) {
            plugin.after_parse(host, schema)?;
        }
        Ok(())
    }

    /// Runs every `before_validate` hook. The shared error list is created
    /// up front so all hooks and the host observe the same sequence; `Fail`
    /// messages are appended to it and collected into the overall outcome.
    pub fn begin_validation(
        &self,
        host: &mut dyn HostContext,
        data: &mut Value,
    ) -> Result<ValidationOutcome> {
        host.validation_errors_mut();
        let mut failures = Vec::new();
        for plugin in self.declaring(hooks::BEFORE_VALIDATE) {
            match plugin.before_validate(host, data)? {
                ValidationOutcome::Continue => {}
                ValidationOutcome::Fail(messages) => {
                    tracing::debug!(
                        plugin = plugin.plugin_name(),
                        count = messages.len(),
                        "plugin forced validation failure"
                    );
                    host.validation_errors_mut().extend(messages.iter().cloned());
                    failures.extend(messages);
                }
            }
        }
        if failures.is_empty() {
            Ok(ValidationOutcome::Continue)
        } else {
            Ok(ValidationOutcome::Fail(failures))
        }
    }

    pub fn finish_validation(&self, host: &mut dyn HostContext, data: &Value) -> Result<()> {
        for plugin in self.declaring(hooks::AFTER_VALIDATE) {
            plugin.after_validate(host, data)?;
        }
        Ok(())
    }

    /// The host's error-retrieval accessor. Every plugin declaring the hook
    /// gets a chance to rewrite the shared list, in registration order, so a
    /// later plugin sees (and may overwrite) an earlier plugin's rewrite.
    /// Returns the resulting list, empty when still undefined.
    pub fn validation_errors(&self, host: &mut dyn HostContext) -> Result<Vec<String>> {
        for plugin in self.declaring(hooks::VALIDATION_ERRORS_RETRIEVED) {
            plugin.validation_errors_retrieved(host)?;
        }
        Ok(host
            .validation_errors()
            .map(<[String]>::to_vec)
            .unwrap_or_default())
    }

    fn declaring<'a>(&'a self, hook: &'a str) -> impl Iterator<Item = &'a dyn SchemaPlugin> {
        self.plugins
            .iter()
            .map(|plugin| plugin.as_ref())
            .filter(move |plugin| plugin.capabilities().iter().any(|c| *c == hook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ExtensionHost;
    use crate::version::VersionIncompatibleError;

    struct Greeter;

    impl SchemaPlugin for Greeter {
        fn plugin_name(&self) -> &'static str {
            "greeter"
        }

        fn plugin_version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn required_version(&self) -> &'static str {
            "3.2"
        }

        fn capabilities(&self) -> &'static [&'static str] {
            &[hooks::PLUGINS_INITIALIZED]
        }

        fn plugins_initialized(
            &self,
            host: &mut dyn HostContext,
            plugins: &[PluginManifest],
        ) -> Result<()> {
            if !plugins.iter().any(|p| p.plugin_name == self.plugin_name()) {
                return Ok(());
            }
            host.install_method("greet", Box::new(|_| Value::String("hi".into())));
            Ok(())
        }
    }

    struct Strict;

    impl SchemaPlugin for Strict {
        fn plugin_name(&self) -> &'static str {
            "strict"
        }

        fn plugin_version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn required_version(&self) -> &'static str {
            "9.9"
        }
    }

    struct RequiredField;

    impl SchemaPlugin for RequiredField {
        fn plugin_name(&self) -> &'static str {
            "required-field"
        }

        fn plugin_version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn required_version(&self) -> &'static str {
            "3.2"
        }

        fn capabilities(&self) -> &'static [&'static str] {
            &[hooks::BEFORE_VALIDATE]
        }

        fn before_validate(
            &self,
            _host: &mut dyn HostContext,
            data: &mut Value,
        ) -> Result<ValidationOutcome> {
            if data.get("id").is_none() {
                return Ok(ValidationOutcome::Fail(vec!["missing id".to_string()]));
            }
            Ok(ValidationOutcome::Continue)
        }
    }

    struct Undeclared;

    impl SchemaPlugin for Undeclared {
        fn plugin_name(&self) -> &'static str {
            "undeclared"
        }

        fn plugin_version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn required_version(&self) -> &'static str {
            "3.2"
        }

        // No capabilities, so this body must never run.
        fn before_validate(
            &self,
            _host: &mut dyn HostContext,
            _data: &mut Value,
        ) -> Result<ValidationOutcome> {
            Ok(ValidationOutcome::Fail(vec!["never".to_string()]))
        }
    }

    struct Shouter;

    impl SchemaPlugin for Shouter {
        fn plugin_name(&self) -> &'static str {
            "shouter"
        }

        fn plugin_version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn required_version(&self) -> &'static str {
            "3.2"
        }

        fn capabilities(&self) -> &'static [&'static str] {
            &[hooks::VALIDATION_ERRORS_RETRIEVED]
        }

        fn validation_errors_retrieved(&self, host: &mut dyn HostContext) -> Result<()> {
            let shouted = host
                .validation_errors()
                .unwrap_or_default()
                .iter()
                .map(|msg| msg.to_uppercase())
                .collect();
            host.replace_validation_errors(shouted);
            Ok(())
        }
    }

    struct Tagger;

    impl SchemaPlugin for Tagger {
        fn plugin_name(&self) -> &'static str {
            "tagger"
        }

        fn plugin_version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn required_version(&self) -> &'static str {
            "3.2"
        }

        fn capabilities(&self) -> &'static [&'static str] {
            &[hooks::VALIDATION_ERRORS_RETRIEVED]
        }

        fn validation_errors_retrieved(&self, host: &mut dyn HostContext) -> Result<()> {
            for msg in host.validation_errors_mut() {
                msg.push_str(" [tagged]");
            }
            Ok(())
        }
    }

    struct SelfParser;

    impl SchemaPlugin for SelfParser {
        fn plugin_name(&self) -> &'static str {
            "self-parser"
        }

        fn plugin_version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn required_version(&self) -> &'static str {
            "3.2"
        }

        fn capabilities(&self) -> &'static [&'static str] {
            &[hooks::BEFORE_PARSE]
        }

        fn before_parse(
            &self,
            _host: &mut dyn HostContext,
            schema: &mut Value,
        ) -> Result<ParseOutcome> {
            schema["parsed_by"] = Value::String(self.plugin_name().to_string());
            Ok(ParseOutcome::AlreadyParsed)
        }
    }

    #[test]
    fn extend_initializes_plugins_in_the_batch() {
        let mut host = ExtensionHost::new("3.2.0");
        let mut set = PluginSet::new();
        set.extend(&mut host, vec![Box::new(Greeter)]).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.manifests()[0].plugin_name, "greeter");
        assert!(host.has_method("greet"));
    }

    #[test]
    fn extend_rejects_incompatible_plugins() {
        let mut host = ExtensionHost::new("3.2.0");
        let mut set = PluginSet::new();
        let err = set
            .extend(&mut host, vec![Box::new(Strict)])
            .unwrap_err();
        assert!(err.downcast_ref::<VersionIncompatibleError>().is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn initialization_guard_skips_plugins_outside_the_batch() {
        let mut host = ExtensionHost::new("3.2.0");
        let mut set = PluginSet::new();
        set.extend(&mut host, vec![Box::new(Greeter)]).unwrap();

        // A second extension call with a different batch re-runs the hook on
        // every plugin, but the greeter's own-name guard keeps it idempotent.
        host.install_method("greet", Box::new(|_| Value::Null));
        set.extend(&mut host, vec![Box::new(Undeclared)]).unwrap();
        assert_eq!(host.call_method("greet", Value::Null), Some(Value::Null));
    }

    #[test]
    fn begin_validation_initializes_the_error_list() {
        let mut host = ExtensionHost::new("3.2.0");
        let set = PluginSet::new();
        assert_eq!(host.validation_errors(), None);
        let outcome = set
            .begin_validation(&mut host, &mut Value::Null)
            .unwrap();
        assert_eq!(outcome, ValidationOutcome::Continue);
        assert_eq!(host.validation_errors(), Some(&[][..]));
    }

    #[test]
    fn failing_plugin_appends_to_the_shared_list() {
        let mut host = ExtensionHost::new("3.2.0");
        let mut set = PluginSet::new();
        set.extend(&mut host, vec![Box::new(RequiredField)]).unwrap();

        let mut data = serde_json::json!({ "name": "no id" });
        let outcome = set.begin_validation(&mut host, &mut data).unwrap();
        assert!(outcome.is_fail());
        assert_eq!(
            outcome,
            ValidationOutcome::Fail(vec!["missing id".to_string()])
        );
        assert_eq!(
            host.validation_errors(),
            Some(&["missing id".to_string()][..])
        );

        host.reset_validation();
        let mut data = serde_json::json!({ "id": 7 });
        let outcome = set.begin_validation(&mut host, &mut data).unwrap();
        assert_eq!(outcome, ValidationOutcome::Continue);
    }

    #[test]
    fn undeclared_hooks_are_never_invoked() {
        let mut host = ExtensionHost::new("3.2.0");
        let mut set = PluginSet::new();
        set.extend(&mut host, vec![Box::new(Undeclared)]).unwrap();
        let outcome = set
            .begin_validation(&mut host, &mut Value::Null)
            .unwrap();
        assert_eq!(outcome, ValidationOutcome::Continue);
        assert_eq!(host.validation_errors(), Some(&[][..]));
    }

    #[test]
    fn error_retrieval_hooks_compose_in_registration_order() {
        let mut host = ExtensionHost::new("3.2.0");
        let mut set = PluginSet::new();
        set.extend(&mut host, vec![Box::new(Shouter), Box::new(Tagger)])
            .unwrap();

        host.validation_errors_mut().push("missing id".to_string());
        let errors = set.validation_errors(&mut host).unwrap();
        assert_eq!(errors, vec!["MISSING ID [tagged]".to_string()]);
    }

    #[test]
    fn retrieval_on_an_untouched_run_yields_an_empty_list() {
        let mut host = ExtensionHost::new("3.2.0");
        let set = PluginSet::new();
        assert!(set.validation_errors(&mut host).unwrap().is_empty());
    }

    #[test]
    fn a_plugin_can_suppress_the_host_parser() {
        let mut host = ExtensionHost::new("3.2.0");
        let mut set = PluginSet::new();
        set.extend(&mut host, vec![Box::new(SelfParser)]).unwrap();

        let mut schema = serde_json::json!({ "title": "string" });
        let outcome = set.before_parse(&mut host, &mut schema).unwrap();
        assert_eq!(outcome, ParseOutcome::AlreadyParsed);
        assert_eq!(schema["parsed_by"], "self-parser");
    }
}
