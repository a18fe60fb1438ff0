use crate::models::enums::SymptomKind;

/// Message template builder for the risk panel.
pub struct MessageTemplates;

impl MessageTemplates {
    /// Tier 1: warning signs logged recently.
    pub fn critical(symptoms: &[SymptomKind]) -> String {
        let labels: Vec<&str> = symptoms.iter().map(|s| s.label()).collect();
        format!(
            "You have logged warning signs in the last 24 hours: {}. \
             Please seek in-person medical care immediately.",
            labels.join(", "),
        )
    }

    /// Tier 2: many mild symptoms logged recently.
    pub fn symptom_burden(count: usize) -> String {
        format!(
            "You have logged {} symptoms in the last 24 hours. \
             Please monitor your condition closely and consider consulting a doctor.",
            count,
        )
    }

    pub fn model_high() -> String {
        "Your recent symptoms indicate a high risk of complications. \
         Please seek medical attention as soon as possible."
            .to_string()
    }

    pub fn model_medium() -> String {
        "Your recent symptoms indicate a moderate risk. \
         Keep monitoring them and consider consulting a doctor."
            .to_string()
    }

    pub fn model_low() -> String {
        "Your recent symptoms indicate a low risk. \
         Keep logging how you feel and rest well."
            .to_string()
    }

    /// Tier 3 without a classifier. Must not read like a clinical finding.
    pub fn model_unavailable() -> String {
        "Risk assessment is temporarily unavailable. \
         This is not a statement about your health; if you feel unwell, contact a doctor."
            .to_string()
    }

    pub fn no_patient_data() -> String {
        "No patient profile was found for this account, so no risk assessment can be made."
            .to_string()
    }

    pub fn evaluation_failed() -> String {
        "Your risk assessment could not be computed right now. Please try again later."
            .to_string()
    }
}
