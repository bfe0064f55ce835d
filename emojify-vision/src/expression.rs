use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::face::FaceSignal;

/// Smiling if the smile probability is strictly above this.
pub const SMILE_THRESHOLD: f64 = 0.15;
/// Frowning if the smile probability is strictly below this.
pub const FROWN_THRESHOLD: f64 = 0.01;
/// An eye is open above and closed below; exactly 0.5 is neither.
pub const EYE_OPEN_THRESHOLD: f64 = 0.5;

/// Expression a face is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionCategory {
    Smile,
    Sad,
    Neutral,
    LeftWink,
    RightWink,
    ClosedEyesSmiling,
    ClosedEyesFrowning,
}

impl ExpressionCategory {
    pub const ALL: [ExpressionCategory; 7] = [
        ExpressionCategory::Smile,
        ExpressionCategory::Sad,
        ExpressionCategory::Neutral,
        ExpressionCategory::LeftWink,
        ExpressionCategory::RightWink,
        ExpressionCategory::ClosedEyesSmiling,
        ExpressionCategory::ClosedEyesFrowning,
    ];

    /// File stem of the overlay graphic drawn for this expression.
    pub fn asset_name(self) -> &'static str {
        match self {
            ExpressionCategory::Smile => "smile",
            ExpressionCategory::Sad => "frown",
            ExpressionCategory::Neutral => "neutral",
            ExpressionCategory::LeftWink => "leftwink",
            ExpressionCategory::RightWink => "rightwink",
            ExpressionCategory::ClosedEyesSmiling => "closed_smile",
            ExpressionCategory::ClosedEyesFrowning => "closed_frown",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ExpressionCategory::Smile => "smile",
            ExpressionCategory::Sad => "sad",
            ExpressionCategory::Neutral => "neutral",
            ExpressionCategory::LeftWink => "left_wink",
            ExpressionCategory::RightWink => "right_wink",
            ExpressionCategory::ClosedEyesSmiling => "closed_eyes_smiling",
            ExpressionCategory::ClosedEyesFrowning => "closed_eyes_frowning",
        }
    }
}

impl fmt::Display for ExpressionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a face's probabilities to the closest expression.
///
/// Eye state wins over mouth state: a winking face is a wink whether or not
/// it smiles. Total over all inputs, including NaN.
pub fn classify(face: &FaceSignal) -> ExpressionCategory {
    debug!("smiling prob: {}", face.smiling_probability);
    debug!("left eye open prob: {}", face.left_eye_open_probability);
    debug!("right eye open prob: {}", face.right_eye_open_probability);

    // compared at double precision, so 0.15f32 (just above 0.15) smiles
    let smile = f64::from(face.smiling_probability);
    let left = f64::from(face.left_eye_open_probability);
    let right = f64::from(face.right_eye_open_probability);

    let smiling = smile > SMILE_THRESHOLD;
    let frowning = smile < FROWN_THRESHOLD;

    let left_open = left > EYE_OPEN_THRESHOLD;
    let left_closed = left < EYE_OPEN_THRESHOLD;
    let right_open = right > EYE_OPEN_THRESHOLD;
    let right_closed = right < EYE_OPEN_THRESHOLD;

    let category = if left_closed && right_open {
        ExpressionCategory::LeftWink
    } else if right_closed && left_open {
        ExpressionCategory::RightWink
    } else if left_closed && right_closed {
        if smiling {
            ExpressionCategory::ClosedEyesSmiling
        } else {
            ExpressionCategory::ClosedEyesFrowning
        }
    } else if smiling {
        ExpressionCategory::Smile
    } else if frowning {
        ExpressionCategory::Sad
    } else {
        ExpressionCategory::Neutral
    };

    debug!("expression: {}", category);
    category
}
