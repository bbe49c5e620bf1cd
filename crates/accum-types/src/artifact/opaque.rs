use serde::{Deserialize, Serialize};

/// A named value of a class that has no combination rule.
///
/// Opaque artifacts can be carried around and inspected but never merged;
/// the store refuses to adopt them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Opaque {
    pub name: String,
    pub class: String,
    pub payload: String,
}

impl Opaque {
    pub fn new(
        name: impl Into<String>,
        class: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            payload: payload.into(),
        }
    }
}
