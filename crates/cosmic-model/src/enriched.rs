use serde::Serialize;

use crate::analysis::AnomalyOutcome;
use crate::envelope::DatasetEnvelope;
use crate::imputation::ImputationReport;
use crate::mapping::StandardizationResult;
use crate::quality::QualityReport;

/// Final pipeline artifact: the envelope plus every stage result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEnvelope {
    #[serde(flatten)]
    pub envelope: DatasetEnvelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standardization: Option<StandardizationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AnomalyOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<ImputationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_report: Option<QualityReport>,
}

impl EnrichedEnvelope {
    pub fn new(envelope: DatasetEnvelope) -> Self {
        Self {
            envelope,
            standardization: None,
            ai_analysis: None,
            predictions: None,
            quality_report: None,
        }
    }
}
