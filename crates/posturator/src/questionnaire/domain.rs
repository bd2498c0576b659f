use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Question presented to the user, in the order the standard path visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Age,
    Height,
    Weight,
    Waist,
    SpineHistory,
    Diagnosis,
    Documentation,
    UploadDocuments,
    ProceedWithoutDocs,
    BackPain,
}

impl StepId {
    pub const ENTRY: Self = Self::Age;

    pub const fn ordered() -> [Self; 10] {
        [
            Self::Age,
            Self::Height,
            Self::Weight,
            Self::Waist,
            Self::SpineHistory,
            Self::Diagnosis,
            Self::Documentation,
            Self::UploadDocuments,
            Self::ProceedWithoutDocs,
            Self::BackPain,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::Waist => "Waist",
            Self::SpineHistory => "Spine History",
            Self::Diagnosis => "Clinical Diagnosis",
            Self::Documentation => "Medical Documentation",
            Self::UploadDocuments => "Upload Documents",
            Self::ProceedWithoutDocs => "Proceed Without Documentation",
            Self::BackPain => "Back Pain",
        }
    }

    /// Steps answered with a plain Yes/No selection.
    pub const fn is_choice(self) -> bool {
        matches!(
            self,
            Self::SpineHistory | Self::Diagnosis | Self::Documentation | Self::ProceedWithoutDocs
        )
    }
}

/// Node with no outgoing transition. The flow ends when it reaches one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    AgeExit,
    HeightExit,
    WeightExit,
    WaistExit,
    NotSuitable,
    Complete,
}

impl Terminal {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::AgeExit,
            Self::HeightExit,
            Self::WeightExit,
            Self::WaistExit,
            Self::NotSuitable,
            Self::Complete,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AgeExit => "Age Exit",
            Self::HeightExit => "Height Exit",
            Self::WeightExit => "Weight Exit",
            Self::WaistExit => "Waist Exit",
            Self::NotSuitable => "Not Suitable",
            Self::Complete => "Assessment Complete",
        }
    }

    /// Exit reached because a measurement failed its eligibility range.
    pub const fn is_rejection(self) -> bool {
        matches!(
            self,
            Self::AgeExit | Self::HeightExit | Self::WeightExit | Self::WaistExit
        )
    }
}

/// Position in the questionnaire graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Node {
    Step(StepId),
    Terminal(Terminal),
}

impl Node {
    pub const fn step(self) -> Option<StepId> {
        match self {
            Self::Step(step) => Some(step),
            Self::Terminal(_) => None,
        }
    }

    pub const fn terminal(self) -> Option<Terminal> {
        match self {
            Self::Step(_) => None,
            Self::Terminal(terminal) => Some(terminal),
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Step(step) => step.label(),
            Self::Terminal(terminal) => terminal.label(),
        }
    }
}

impl From<StepId> for Node {
    fn from(value: StepId) -> Self {
        Self::Step(value)
    }
}

impl From<Terminal> for Node {
    fn from(value: Terminal) -> Self {
        Self::Terminal(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "yes", alias = "Yes")]
    Yes,
    #[serde(rename = "no", alias = "No")]
    No,
}

impl YesNo {
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => f.write_str("Yes"),
            Self::No => f.write_str("No"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected yes or no, found '{0}'")]
pub struct ParseChoiceError(pub String);

impl FromStr for YesNo {
    type Err = ParseChoiceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            _ => Err(ParseChoiceError(raw.trim().to_string())),
        }
    }
}

/// User-typed value exactly as it was entered; either free text or an already numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum LengthInput {
    Centimetres {
        value: RawValue,
    },
    FeetInches {
        feet: RawValue,
        #[serde(default)]
        inches: Option<RawValue>,
    },
}

impl LengthInput {
    pub const fn unit(&self) -> UnitSystem {
        match self {
            Self::Centimetres { .. } => UnitSystem::Metric,
            Self::FeetInches { .. } => UnitSystem::Imperial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum MassInput {
    Kilograms { value: RawValue },
    Pounds { value: RawValue },
}

impl MassInput {
    pub const fn unit(&self) -> UnitSystem {
        match self {
            Self::Kilograms { .. } => UnitSystem::Metric,
            Self::Pounds { .. } => UnitSystem::Imperial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum GirthInput {
    Centimetres { value: RawValue },
    Inches { value: RawValue },
}

impl GirthInput {
    pub const fn unit(&self) -> UnitSystem {
        match self {
            Self::Centimetres { .. } => UnitSystem::Metric,
            Self::Inches { .. } => UnitSystem::Imperial,
        }
    }
}

/// Metadata for a medical report attached during the upload step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub name: String,
    pub size_bytes: u64,
    pub uploaded_on: NaiveDate,
}

/// One submission for one step. The variant names the step it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Answer {
    Age {
        value: RawValue,
    },
    Height {
        input: LengthInput,
    },
    Weight {
        input: MassInput,
    },
    Waist {
        input: GirthInput,
    },
    SpineHistory {
        #[serde(default)]
        choice: Option<YesNo>,
    },
    Diagnosis {
        #[serde(default)]
        choice: Option<YesNo>,
    },
    Documentation {
        #[serde(default)]
        choice: Option<YesNo>,
    },
    UploadDocuments {
        #[serde(default)]
        documents: Vec<DocumentDescriptor>,
    },
    ProceedWithoutDocs {
        #[serde(default)]
        choice: Option<YesNo>,
    },
    BackPain {
        #[serde(default)]
        has_pain: Option<YesNo>,
        #[serde(default)]
        level: Option<u8>,
    },
}

impl Answer {
    pub fn age(value: impl Into<RawValue>) -> Self {
        Self::Age {
            value: value.into(),
        }
    }

    pub fn height_cm(value: impl Into<RawValue>) -> Self {
        Self::Height {
            input: LengthInput::Centimetres {
                value: value.into(),
            },
        }
    }

    pub fn height_ft_in(feet: impl Into<RawValue>, inches: impl Into<RawValue>) -> Self {
        Self::Height {
            input: LengthInput::FeetInches {
                feet: feet.into(),
                inches: Some(inches.into()),
            },
        }
    }

    pub fn weight_kg(value: impl Into<RawValue>) -> Self {
        Self::Weight {
            input: MassInput::Kilograms {
                value: value.into(),
            },
        }
    }

    pub fn weight_lb(value: impl Into<RawValue>) -> Self {
        Self::Weight {
            input: MassInput::Pounds {
                value: value.into(),
            },
        }
    }

    pub fn waist_cm(value: impl Into<RawValue>) -> Self {
        Self::Waist {
            input: GirthInput::Centimetres {
                value: value.into(),
            },
        }
    }

    pub fn waist_in(value: impl Into<RawValue>) -> Self {
        Self::Waist {
            input: GirthInput::Inches {
                value: value.into(),
            },
        }
    }

    /// Builds the Yes/No answer for a choice step. Returns `None` for steps that take other input.
    pub fn choice(step: StepId, choice: Option<YesNo>) -> Option<Self> {
        match step {
            StepId::SpineHistory => Some(Self::SpineHistory { choice }),
            StepId::Diagnosis => Some(Self::Diagnosis { choice }),
            StepId::Documentation => Some(Self::Documentation { choice }),
            StepId::ProceedWithoutDocs => Some(Self::ProceedWithoutDocs { choice }),
            _ => None,
        }
    }

    pub fn documents(documents: Vec<DocumentDescriptor>) -> Self {
        Self::UploadDocuments { documents }
    }

    pub fn no_back_pain() -> Self {
        Self::BackPain {
            has_pain: Some(YesNo::No),
            level: None,
        }
    }

    pub fn back_pain(level: u8) -> Self {
        Self::BackPain {
            has_pain: Some(YesNo::Yes),
            level: Some(level),
        }
    }

    pub const fn step(&self) -> StepId {
        match self {
            Self::Age { .. } => StepId::Age,
            Self::Height { .. } => StepId::Height,
            Self::Weight { .. } => StepId::Weight,
            Self::Waist { .. } => StepId::Waist,
            Self::SpineHistory { .. } => StepId::SpineHistory,
            Self::Diagnosis { .. } => StepId::Diagnosis,
            Self::Documentation { .. } => StepId::Documentation,
            Self::UploadDocuments { .. } => StepId::UploadDocuments,
            Self::ProceedWithoutDocs { .. } => StepId::ProceedWithoutDocs,
            Self::BackPain { .. } => StepId::BackPain,
        }
    }

    pub const fn unit(&self) -> Option<UnitSystem> {
        match self {
            Self::Height { input } => Some(input.unit()),
            Self::Weight { input } => Some(input.unit()),
            Self::Waist { input } => Some(input.unit()),
            _ => None,
        }
    }
}

/// Pain rating on the 1 to 10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PainLevel(u8);

impl PainLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn severity(self) -> PainSeverity {
        if self.0 <= 3 {
            PainSeverity::Mild
        } else if self.0 <= 7 {
            PainSeverity::Moderate
        } else {
            PainSeverity::Severe
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pain level {0} outside 1-10")]
pub struct PainLevelError(pub u8);

impl TryFrom<u8> for PainLevel {
    type Error = PainLevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PainLevelError(value))
        }
    }
}

impl From<PainLevel> for u8 {
    fn from(value: PainLevel) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainSeverity {
    Mild,
    Moderate,
    Severe,
}

impl PainSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mild => "Mild Pain",
            Self::Moderate => "Moderate Pain",
            Self::Severe => "Severe Pain",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Mild => "Noticeable but does not significantly interfere with daily activities.",
            Self::Moderate => {
                "Interferes with some daily activities and may require occasional medication."
            }
            Self::Severe => {
                "Significantly interferes with daily activities and may require regular medication."
            }
        }
    }
}

/// Back pain answer once validated: a level is only present when pain was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pain", content = "level", rename_all = "snake_case")]
pub enum PainAnswer {
    None,
    Rated(PainLevel),
}

/// Normalized form of an answer that passed input validation.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptedAnswer {
    Age(i64),
    HeightCm(f64),
    WeightKg(f64),
    WaistCm(f64),
    Choice { step: StepId, choice: YesNo },
    Documents(Vec<DocumentDescriptor>),
    Pain(PainAnswer),
}

/// Accepted answers in canonical units, accumulated as the flow advances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningProfile {
    pub age_years: Option<i64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub waist_cm: Option<f64>,
    pub spine_history: Option<YesNo>,
    pub clinical_diagnosis: Option<YesNo>,
    pub has_documentation: Option<YesNo>,
    pub documents: Vec<DocumentDescriptor>,
    pub proceed_without_docs: Option<YesNo>,
    pub pain: Option<PainAnswer>,
}

impl ScreeningProfile {
    pub fn record(&mut self, accepted: &AcceptedAnswer) {
        match accepted {
            AcceptedAnswer::Age(age) => self.age_years = Some(*age),
            AcceptedAnswer::HeightCm(cm) => self.height_cm = Some(*cm),
            AcceptedAnswer::WeightKg(kg) => self.weight_kg = Some(*kg),
            AcceptedAnswer::WaistCm(cm) => self.waist_cm = Some(*cm),
            AcceptedAnswer::Choice { step, choice } => match step {
                StepId::SpineHistory => self.spine_history = Some(*choice),
                StepId::Diagnosis => self.clinical_diagnosis = Some(*choice),
                StepId::Documentation => self.has_documentation = Some(*choice),
                StepId::ProceedWithoutDocs => self.proceed_without_docs = Some(*choice),
                _ => {}
            },
            AcceptedAnswer::Documents(documents) => self.documents = documents.clone(),
            AcceptedAnswer::Pain(pain) => self.pain = Some(*pain),
        }
    }
}
