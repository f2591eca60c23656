use std::collections::HashMap;

use serde_json::Value;

/// A method a plugin attaches onto the host during initialization.
pub type HostMethod = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// Explicit handle to live host state, passed to every hook.
///
/// Hooks read the host version, share one validation-error list per run, and
/// may extend the host with new named methods.
pub trait HostContext {
    /// The host's own semantic version, when the accessor is available.
    fn version(&self) -> Option<&str>;

    /// The per-run validation errors; `None` while nothing has touched them.
    fn validation_errors(&self) -> Option<&[String]>;

    /// Mutable access to the validation errors, creating the empty list on
    /// first use. An existing list is returned untouched.
    fn validation_errors_mut(&mut self) -> &mut Vec<String>;

    /// Replaces the whole error list, e.g. to translate messages.
    fn replace_validation_errors(&mut self, errors: Vec<String>);

    fn install_method(&mut self, name: &str, method: HostMethod);

    fn has_method(&self, name: &str) -> bool;

    /// Invokes a plugin-installed method by name.
    fn call_method(&self, name: &str, args: Value) -> Option<Value>;
}

/// In-memory host state used by `PluginSet` dispatch and by hosts embedding
/// the SDK. One instance is shared across all hooks of a validation run.
#[derive(Default)]
pub struct ExtensionHost {
    version: String,
    validation_errors: Option<Vec<String>>,
    methods: HashMap<String, HostMethod>,
}

impl ExtensionHost {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            validation_errors: None,
            methods: HashMap::new(),
        }
    }

    /// Clears per-run validation state while keeping installed methods.
    pub fn reset_validation(&mut self) {
        self.validation_errors = None;
    }
}

impl HostContext for ExtensionHost {
    fn version(&self) -> Option<&str> {
        Some(&self.version)
    }

    fn validation_errors(&self) -> Option<&[String]> {
        self.validation_errors.as_deref()
    }

    fn validation_errors_mut(&mut self) -> &mut Vec<String> {
        self.validation_errors.get_or_insert_with(Vec::new)
    }

    fn replace_validation_errors(&mut self, errors: Vec<String>) {
        self.validation_errors = Some(errors);
    }

    fn install_method(&mut self, name: &str, method: HostMethod) {
        self.methods.insert(name.to_string(), method);
    }

    fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    fn call_method(&self, name: &str, args: Value) -> Option<Value> {
        self.methods.get(name).map(|method| method(args))
    }
}
