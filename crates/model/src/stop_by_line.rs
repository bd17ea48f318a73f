use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::{line::Line, stop::Stop};

/// Position of a stop in the ordered stop sequence of one line direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopByLine {
    pub stop_id: Id<Stop>,
    pub line_id: Id<Line>,
    pub order: i64,
}
