use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

pub mod line;
pub mod stop;
pub mod stop_by_line;

/// A text available in both languages of the network, French and Dutch.
///
/// Sources encode it as a two-key JSON object, e.g. `{"fr":"Gare","nl":"Station"}`,
/// and the store keeps that very encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub fr: String,
    pub nl: String,
}

impl Localized {
    pub fn new<F: Into<String>, N: Into<String>>(fr: F, nl: N) -> Self {
        Self {
            fr: fr.into(),
            nl: nl.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}
