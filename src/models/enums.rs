use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(SymptomKind {
    Fever => "fever",
    Headache => "headache",
    Nausea => "nausea",
    Fatigue => "fatigue",
    JointPain => "joint pain",
    Rashes => "rashes",
    BackPain => "back pain",
    EyePain => "eye pain",
    Vomiting => "vomiting",
    AbdominalPain => "abdominal pain",
    BleedingGums => "bleeding gums",
    VomitingBlood => "vomiting blood",
    BloodInStool => "blood in stool",
    RapidPulse => "rapid pulse",
    LowBloodPressure => "low blood pressure",
    ColdExtremities => "cold extremities",
    BreathingDifficulty => "breathing difficulty",
    SevereAbdominalPain => "severe abdominal pain",
    PersistentVomiting => "persistent vomiting",
    Drowsiness => "drowsiness",
});

impl SymptomKind {
    /// Full catalog in display order.
    pub const ALL: [SymptomKind; 20] = [
        Self::Fever,
        Self::Headache,
        Self::Nausea,
        Self::Fatigue,
        Self::JointPain,
        Self::Rashes,
        Self::BackPain,
        Self::EyePain,
        Self::Vomiting,
        Self::AbdominalPain,
        Self::BleedingGums,
        Self::VomitingBlood,
        Self::BloodInStool,
        Self::RapidPulse,
        Self::LowBloodPressure,
        Self::ColdExtremities,
        Self::BreathingDifficulty,
        Self::SevereAbdominalPain,
        Self::PersistentVomiting,
        Self::Drowsiness,
    ];

    /// Warning signs that trigger the critical override on their own.
    pub const HIGH_RISK: [SymptomKind; 10] = [
        Self::BleedingGums,
        Self::VomitingBlood,
        Self::BloodInStool,
        Self::RapidPulse,
        Self::LowBloodPressure,
        Self::ColdExtremities,
        Self::BreathingDifficulty,
        Self::SevereAbdominalPain,
        Self::PersistentVomiting,
        Self::Drowsiness,
    ];

    pub fn is_high_risk(&self) -> bool {
        Self::HIGH_RISK.contains(self)
    }

    /// Patient-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fever => "Fever",
            Self::Headache => "Headache",
            Self::Nausea => "Nausea",
            Self::Fatigue => "Fatigue",
            Self::JointPain => "Joint Pain",
            Self::Rashes => "Rashes",
            Self::BackPain => "Back Pain",
            Self::EyePain => "Eye Pain",
            Self::Vomiting => "Vomiting",
            Self::AbdominalPain => "Abdominal Pain",
            Self::BleedingGums => "Bleeding (Gums/Nose)",
            Self::VomitingBlood => "Vomiting Blood",
            Self::BloodInStool => "Blood in Stool",
            Self::RapidPulse => "Rapid or Falling Pulse",
            Self::LowBloodPressure => "Low Blood Pressure",
            Self::ColdExtremities => "Cold Hands & Feet",
            Self::BreathingDifficulty => "Difficulty Breathing",
            Self::SevereAbdominalPain => "Severe Abdominal Pain",
            Self::PersistentVomiting => "Persistent Vomiting",
            Self::Drowsiness => "Drowsiness or Confusion",
        }
    }

    /// Indicator column name, e.g. `has_bleeding_gums`.
    pub fn feature_name(&self) -> String {
        format!("has_{}", self.as_str().replace(' ', "_"))
    }
}

str_enum!(RiskLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Rejected => "rejected",
    Done => "done",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn symptom_kind_round_trip() {
        for kind in SymptomKind::ALL {
            assert_eq!(SymptomKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn catalog_splits_evenly() {
        let high = SymptomKind::ALL.iter().filter(|k| k.is_high_risk()).count();
        assert_eq!(high, 10);
        assert_eq!(SymptomKind::ALL.len() - high, 10);
    }

    #[test]
    fn fever_is_not_high_risk() {
        assert!(!SymptomKind::Fever.is_high_risk());
        assert!(SymptomKind::Drowsiness.is_high_risk());
    }

    #[test]
    fn feature_name_replaces_spaces() {
        assert_eq!(SymptomKind::BleedingGums.feature_name(), "has_bleeding_gums");
        assert_eq!(
            SymptomKind::SevereAbdominalPain.feature_name(),
            "has_severe_abdominal_pain"
        );
        assert_eq!(SymptomKind::Fever.feature_name(), "has_fever");
    }

    #[test]
    fn unknown_symptom_is_invalid_enum() {
        let err = SymptomKind::from_str("sneezing").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn risk_level_serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn symptom_kind_serializes_as_key() {
        let json = serde_json::to_string(&SymptomKind::LowBloodPressure).unwrap();
        assert_eq!(json, "\"low blood pressure\"");
    }

    #[test]
    fn booking_status_round_trip() {
        for (variant, s) in [
            (BookingStatus::Pending, "pending"),
            (BookingStatus::Confirmed, "confirmed"),
            (BookingStatus::Rejected, "rejected"),
            (BookingStatus::Done, "done"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(BookingStatus::from_str(s).unwrap(), variant);
        }
    }
}
