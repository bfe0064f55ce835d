use thiserror::Error;

use crate::expression::ExpressionCategory;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("no overlay available for expression {0}")]
    MissingOverlay(ExpressionCategory),

    #[error("face detection failed: {0}")]
    Detection(#[source] anyhow::Error),
}
