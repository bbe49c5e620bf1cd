//! Full identifiers with an optional axis action.
//!
//! `/k1/.../kN/name:PX` addresses the x projection of a 2-D histogram.
//! Recognized actions are `PX`, `PY`, `PFX` and `PFY`, case-insensitive.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use accum_store::Store;
use accum_types::{Artifact, Histogram, PathKey};
use tracing::{debug, error};

use crate::error::QueryResult;

/// A derived view of a 2-D histogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    ProjectX,
    ProjectY,
    ProfileX,
    ProfileY,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ProjectX => "PX",
            Action::ProjectY => "PY",
            Action::ProfileX => "PFX",
            Action::ProfileY => "PFY",
        }
    }

    /// Apply the action to a 2-D histogram. `None` if it is not 2-D.
    pub fn apply(&self, histogram: &Histogram, name: &str) -> Option<Artifact> {
        match self {
            Action::ProjectX => histogram.project_x(name).map(Artifact::from),
            Action::ProjectY => histogram.project_y(name).map(Artifact::from),
            Action::ProfileX => histogram.profile_x(name).map(Artifact::from),
            Action::ProfileY => histogram.profile_y(name).map(Artifact::from),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for action names other than the four recognized ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PX" => Ok(Action::ProjectX),
            "PY" => Ok(Action::ProjectY),
            "PFX" => Ok(Action::ProfileX),
            "PFY" => Ok(Action::ProfileY),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// Split `/k/name:action` into the full key and the raw action text.
pub fn split_action(identifier: &str) -> (&str, Option<&str>) {
    let name_start = identifier.rfind('/').map_or(0, |i| i + 1);
    match identifier[name_start..].split_once(':') {
        Some((name, action)) => (&identifier[..name_start + name.len()], Some(action)),
        None => (identifier, None),
    }
}

/// Name given to an artifact derived by `action` from `name` under `key`.
/// Separators and dashes become underscores.
pub fn derived_name(store_name: &str, key: &PathKey, name: &str, action: Action) -> String {
    format!("{store_name}_{}_{action}", key.full_identifier(name)).replace(['/', '-'], "_")
}

/// Look up a histogram-like artifact by full identifier and apply its
/// action, if any.
///
/// - Missing or not histogram-like: `None`.
/// - No action, an unrecognized action, or an artifact that is not a 2-D
///   histogram: the stored artifact, borrowed.
/// - A 2-D histogram with a recognized action: the derived artifact, owned.
pub fn resolve<'a>(store: &'a Store, identifier: &str) -> QueryResult<Option<Cow<'a, Artifact>>> {
    let (full_key, action) = split_action(identifier);
    let (key, name) = PathKey::split_full(full_key)?;
    let Some(artifact) = store.lookup(&key, &name) else {
        return Ok(None);
    };
    if !artifact.is_histogram_like() {
        error!(name = %name, class = %artifact.class_tag(), "is not a histogram");
        return Ok(None);
    }

    let action = match action.map(str::parse::<Action>) {
        None => return Ok(Some(Cow::Borrowed(artifact))),
        Some(Err(UnknownAction(raw))) => {
            debug!(action = %raw, "unsupported action, returning object unchanged");
            return Ok(Some(Cow::Borrowed(artifact)));
        }
        Some(Ok(action)) => action,
    };

    let derived = artifact.as_histogram().and_then(|h| {
        let label = derived_name(store.name(), &key, &name, action);
        action.apply(h, &label)
    });
    Ok(Some(match derived {
        Some(derived) => Cow::Owned(derived),
        None => Cow::Borrowed(artifact),
    }))
}
