use thiserror::Error;

/// Raised by `version_check` when plugin/host compatibility cannot be
/// established: either the host (or its version accessor) is unavailable, or
/// the host is strictly older than what the plugin requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionIncompatibleError {
    #[error(
        "host is not available within the plugin; check you are running host version {required} or above"
    )]
    HostUnavailable { required: String },
    #[error("plugin requires host version {required} or above, host reports {found}")]
    HostTooOld { required: String, found: String },
}

/// Splits a dot-separated version string into its leading `(major, minor)`
/// pair. A missing minor component counts as `0`; anything past minor (patch,
/// pre-release, build) is ignored.
pub fn split_major_minor(version: &str) -> Option<(u64, u64)> {
    let mut parts = version.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts
        .next()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0);
    Some((major, minor))
}

/// Compatibility rule for plugins against a host version.
///
/// Fails when the host version is absent or unreadable, or when the host is
/// behind `required` on the major component, or matches it on major but is
/// behind on minor. Patch components never affect the outcome. An unparsable
/// `required` imposes no constraint; plugin authors are expected to supply a
/// well-formed "MAJOR.MINOR" (or longer) string.
pub fn check_host_version(
    host_version: Option<&str>,
    required: &str,
) -> Result<(), VersionIncompatibleError> {
    let unavailable = || VersionIncompatibleError::HostUnavailable {
        required: required.to_string(),
    };
    let found = host_version.ok_or_else(unavailable)?;
    let (major, minor) = split_major_minor(found).ok_or_else(unavailable)?;
    let Some((req_major, req_minor)) = split_major_minor(required) else {
        tracing::warn!(required, "unparsable version requirement, skipping check");
        return Ok(());
    };
    if major < req_major || (major == req_major && minor < req_minor) {
        return Err(VersionIncompatibleError::HostTooOld {
            required: required.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}
