use std::fmt;

use serde::{Deserialize, Serialize};

/// Experimental manipulation run once per session.
#[derive(Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionLabel {
    HighAttention,
    LowAttention,
    Fatigue,
}

impl ConditionLabel {
    pub const ALL: [ConditionLabel; 3] = [
        ConditionLabel::HighAttention,
        ConditionLabel::LowAttention,
        ConditionLabel::Fatigue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionLabel::HighAttention => "HighAttention",
            ConditionLabel::LowAttention => "LowAttention",
            ConditionLabel::Fatigue => "Fatigue",
        }
    }
}

impl fmt::Display for ConditionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
