//! Patient indicators collected by the assessment form.
//!
//! Nine indicators from the CHARLS cohort feed the CKD/CVD classifier: four
//! categorical answers and five laboratory or anthropometric measurements.

use serde::{Deserialize, Serialize};

use super::encoding::{AdlDifficulties, SelfRatedHealth, YesNo};
use super::features::FeatureId;

/// One submitted form, before validation or encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    /// Doctor-diagnosed hypertension (`hibpe`)
    pub hypertension: YesNo,

    /// Doctor-diagnosed dyslipidemia (`dyslipe`)
    pub dyslipidemia: YesNo,

    /// Self-rated health (`srh`)
    pub self_rated_health: SelfRatedHealth,

    /// Count of ADL difficulties (`adlab_cADL`)
    pub adl_difficulties: AdlDifficulties,

    /// TyG-BMI composite metabolic index, unitless (`tyg_bmi`)
    pub tyg_bmi: f64,

    /// Waist circumference in cm (`mwaist`)
    pub waist_circumference: f64,

    /// White blood cell count in 10^3/uL (`bl_wbc`)
    pub white_cell_count: f64,

    /// Platelet count in 10^9/L (`bl_pltPlatelets`)
    pub platelet_count: f64,

    /// Serum creatinine / cystatin C ratio, unitless (`Cr_CysC_Ratio`)
    pub creatinine_cystatin_ratio: f64,
}

impl RawInput {
    /// Value of a numeric measurement.
    #[must_use]
    pub fn measurement(&self, m: Measurement) -> f64 {
        match m {
            Measurement::TygBmi => self.tyg_bmi,
            Measurement::WaistCircumference => self.waist_circumference,
            Measurement::WhiteCellCount => self.white_cell_count,
            Measurement::PlateletCount => self.platelet_count,
            Measurement::CreatinineCystatinRatio => self.creatinine_cystatin_ratio,
        }
    }
}

/// The five numeric measurements on the form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurement {
    TygBmi,
    WaistCircumference,
    WhiteCellCount,
    PlateletCount,
    CreatinineCystatinRatio,
}

impl Measurement {
    pub const ALL: [Self; 5] = [
        Self::TygBmi,
        Self::WaistCircumference,
        Self::WhiteCellCount,
        Self::PlateletCount,
        Self::CreatinineCystatinRatio,
    ];

    /// Feature identifier the model export uses for this measurement.
    #[must_use]
    pub fn feature(self) -> FeatureId {
        match self {
            Self::TygBmi => FeatureId::TygBmi,
            Self::WaistCircumference => FeatureId::Mwaist,
            Self::WhiteCellCount => FeatureId::BlWbc,
            Self::PlateletCount => FeatureId::BlPlatelets,
            Self::CreatinineCystatinRatio => FeatureId::CrCysCRatio,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TygBmi => "TyG-BMI Index",
            Self::WaistCircumference => "Waist Circumference",
            Self::WhiteCellCount => "White Blood Cell Count",
            Self::PlateletCount => "Platelet Count",
            Self::CreatinineCystatinRatio => "Serum Creatinine/Cystatin C Ratio",
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::TygBmi | Self::CreatinineCystatinRatio => "unitless",
            Self::WaistCircumference => "cm",
            Self::WhiteCellCount => "x10^3/uL",
            Self::PlateletCount => "x10^9/L",
        }
    }

    /// Input step offered by the form.
    #[must_use]
    pub fn step(self) -> f64 {
        match self {
            Self::CreatinineCystatinRatio => 0.01,
            _ => 0.1,
        }
    }
}

impl std::fmt::Display for Measurement {
    /// Displays the model feature identifier, which is what operators and
    /// error messages refer to.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.feature().as_str())
    }
}

#[cfg(test)]
pub(crate) fn sample_input() -> RawInput {
    RawInput {
        hypertension: YesNo::No,
        dyslipidemia: YesNo::No,
        self_rated_health: SelfRatedHealth::Excellent,
        adl_difficulties: AdlDifficulties::ALL[0],
        tyg_bmi: 8.5,
        waist_circumference: 80.0,
        white_cell_count: 6.0,
        platelet_count: 250.0,
        creatinine_cystatin_ratio: 1.1,
    }
}
