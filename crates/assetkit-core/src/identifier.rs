//! Asset identifier classification
//!
//! An asset field stores one of several historical formats: nothing at all, a
//! path relative to the legacy media root, a versioned public id in the remote
//! asset store (`v{version}/{public_id}`), or an absolute URL. Everything in this
//! module is pure and total: any input string classifies to exactly one
//! [`AssetKind`] and no function here panics.

use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Kind of value held by an asset field. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Unset,
    LegacyLocalPath,
    RemoteVersionedId,
    AbsoluteUrl,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Unset => "unset",
            AssetKind::LegacyLocalPath => "legacy_local_path",
            AssetKind::RemoteVersionedId => "remote_versioned_id",
            AssetKind::AbsoluteUrl => "absolute_url",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of a `v{version}/{public_id}` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedId<'a> {
    /// Digits between the leading `v` and the first `/`.
    pub version: &'a str,
    /// Everything after the first `/`, folders included.
    pub public_id: &'a str,
}

impl VersionedId<'_> {
    /// Numeric version, if the token fits in a `u64`.
    pub fn version_number(&self) -> Option<u64> {
        self.version.parse().ok()
    }
}

impl Display for VersionedId<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "v{}/{}", self.version, self.public_id)
    }
}

/// Classify a stored asset value.
///
/// - empty or whitespace-only: [`AssetKind::Unset`]
/// - `http://` or `https://` prefix (any case): [`AssetKind::AbsoluteUrl`]
/// - `v<digits>/<public id>`: [`AssetKind::RemoteVersionedId`]
/// - anything else: [`AssetKind::LegacyLocalPath`]
///
/// The bare `{version}/{public_id}` form written by some historical code paths
/// has no `v` prefix and classifies as a legacy path.
pub fn classify(raw: &str) -> AssetKind {
    if raw.trim().is_empty() {
        AssetKind::Unset
    } else if is_absolute_url(raw) {
        AssetKind::AbsoluteUrl
    } else if parse_versioned(raw).is_some() {
        AssetKind::RemoteVersionedId
    } else {
        AssetKind::LegacyLocalPath
    }
}

/// Classify an optional (nullable) stored value.
pub fn classify_opt(raw: Option<&str>) -> AssetKind {
    raw.map_or(AssetKind::Unset, classify)
}

/// Split a `v{version}/{public_id}` identifier into its parts.
///
/// Returns `None` unless the version token is non-empty ASCII digits and the
/// public id is non-empty.
pub fn parse_versioned(raw: &str) -> Option<VersionedId<'_>> {
    let rest = raw.strip_prefix('v')?;
    let (version, public_id) = rest.split_once('/')?;

    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if public_id.is_empty() {
        return None;
    }

    Some(VersionedId { version, public_id })
}

/// Canonical stored form of an uploaded asset: `v{version}/{public_id}`.
pub fn format_versioned(version: impl Display, public_id: &str) -> String {
    format!("v{}/{}", version, public_id.trim_start_matches('/'))
}

/// Path to look up in the remote store for a legacy value.
///
/// Folder conventions drifted over time, so two shapes are accepted: a value
/// that already starts with `folder_hint` is used as-is, otherwise its last
/// path segment is placed under `folder_hint`. When neither rule yields a
/// usable path the raw value is returned verbatim.
pub fn derive_remote_path(raw: &str, folder_hint: &str) -> String {
    let hint = folder_hint.trim_matches('/');
    if hint.is_empty() {
        return raw.to_string();
    }

    let value = raw.trim_start_matches('/');
    if value
        .strip_prefix(hint)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    {
        return value.to_string();
    }

    match value.rsplit('/').find(|segment| !segment.trim().is_empty()) {
        Some(filename) => format!("{}/{}", hint, filename),
        None => raw.to_string(),
    }
}

fn is_absolute_url(raw: &str) -> bool {
    let has_prefix = |prefix: &str| {
        raw.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    has_prefix("http://") || has_prefix("https://")
}

/// Transient view of an asset field: its raw value, derived kind, and the
/// folder convention of the owning entity+field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    raw_value: Option<String>,
    kind: AssetKind,
    folder_hint: String,
}

impl AssetReference {
    pub fn new(raw_value: Option<String>, folder_hint: impl Into<String>) -> Self {
        let kind = classify_opt(raw_value.as_deref());
        Self {
            raw_value,
            kind,
            folder_hint: folder_hint.into(),
        }
    }

    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn folder_hint(&self) -> &str {
        &self.folder_hint
    }

    pub fn versioned(&self) -> Option<VersionedId<'_>> {
        self.raw_value.as_deref().and_then(parse_versioned)
    }

    /// Remote lookup path; only legacy values have one.
    pub fn remote_path(&self) -> Option<String> {
        match (self.kind, self.raw_value.as_deref()) {
            (AssetKind::LegacyLocalPath, Some(raw)) => {
                Some(derive_remote_path(raw, &self.folder_hint))
            }
            _ => None,
        }
    }
}
