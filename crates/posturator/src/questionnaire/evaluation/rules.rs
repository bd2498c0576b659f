use super::super::domain::{
    AcceptedAnswer, Answer, GirthInput, LengthInput, MassInput, Node, PainAnswer, PainLevel,
    StepId, Terminal, YesNo,
};
use super::super::units::{
    self, read_decimal, read_optional_decimal, read_whole, NumericError,
};
use super::config::EligibilityConfig;
use super::policy::{InvalidInput, RejectReason, Verdict};

/// Where a step leads once its answer is accepted. `choice` only matters for Yes/No steps.
pub(crate) const fn next_after(step: StepId, choice: YesNo) -> Node {
    match (step, choice) {
        (StepId::Age, _) => Node::Step(StepId::Height),
        (StepId::Height, _) => Node::Step(StepId::Weight),
        (StepId::Weight, _) => Node::Step(StepId::Waist),
        (StepId::Waist, _) => Node::Step(StepId::SpineHistory),
        (StepId::SpineHistory, YesNo::Yes) => Node::Step(StepId::Diagnosis),
        (StepId::SpineHistory, YesNo::No) => Node::Step(StepId::BackPain),
        (StepId::Diagnosis, YesNo::Yes) => Node::Step(StepId::Documentation),
        (StepId::Diagnosis, YesNo::No) => Node::Step(StepId::BackPain),
        (StepId::Documentation, YesNo::Yes) => Node::Step(StepId::UploadDocuments),
        (StepId::Documentation, YesNo::No) => Node::Step(StepId::ProceedWithoutDocs),
        (StepId::UploadDocuments, _) => Node::Step(StepId::BackPain),
        (StepId::ProceedWithoutDocs, YesNo::Yes) => Node::Step(StepId::BackPain),
        (StepId::ProceedWithoutDocs, YesNo::No) => Node::Terminal(Terminal::NotSuitable),
        (StepId::BackPain, _) => Node::Terminal(Terminal::Complete),
    }
}

/// Exit used when the step's measurement is out of range, if the step has one.
pub(crate) const fn rejection_exit(step: StepId) -> Option<Terminal> {
    match step {
        StepId::Age => Some(Terminal::AgeExit),
        StepId::Height => Some(Terminal::HeightExit),
        StepId::Weight => Some(Terminal::WeightExit),
        StepId::Waist => Some(Terminal::WaistExit),
        _ => None,
    }
}

fn numeric(error: NumericError, missing: InvalidInput) -> InvalidInput {
    match error {
        NumericError::Blank => missing,
        NumericError::NotANumber => InvalidInput::NotANumber,
    }
}

/// Validates the raw input and brings it into canonical units.
pub(crate) fn normalize(answer: &Answer) -> Result<AcceptedAnswer, InvalidInput> {
    match answer {
        Answer::Age { value } => read_whole(value)
            .map(AcceptedAnswer::Age)
            .map_err(|err| numeric(err, InvalidInput::MissingAge)),
        Answer::Height { input } => match input {
            LengthInput::Centimetres { value } => read_decimal(value)
                .map(AcceptedAnswer::HeightCm)
                .map_err(|err| numeric(err, InvalidInput::MissingHeight)),
            LengthInput::FeetInches { feet, inches } => {
                let feet = match read_decimal(feet) {
                    Ok(feet) => feet,
                    Err(NumericError::Blank) => return Err(InvalidInput::MissingFeet),
                    Err(NumericError::NotANumber) => return Err(InvalidInput::NotNumbers),
                };
                let inches = read_optional_decimal(inches.as_ref())
                    .map_err(|_| InvalidInput::NotNumbers)?;
                Ok(AcceptedAnswer::HeightCm(units::feet_inches_to_cm(
                    feet, inches,
                )))
            }
        },
        Answer::Weight { input } => match input {
            MassInput::Kilograms { value } => read_decimal(value)
                .map(AcceptedAnswer::WeightKg)
                .map_err(|err| numeric(err, InvalidInput::MissingWeight)),
            MassInput::Pounds { value } => read_decimal(value)
                .map(|pounds| AcceptedAnswer::WeightKg(units::pounds_to_kg(pounds)))
                .map_err(|err| numeric(err, InvalidInput::MissingWeight)),
        },
        Answer::Waist { input } => match input {
            GirthInput::Centimetres { value } => read_decimal(value)
                .map(AcceptedAnswer::WaistCm)
                .map_err(|err| numeric(err, InvalidInput::MissingWaist)),
            GirthInput::Inches { value } => read_decimal(value)
                .map(|inches| AcceptedAnswer::WaistCm(units::inches_to_cm(inches)))
                .map_err(|err| numeric(err, InvalidInput::MissingWaist)),
        },
        Answer::SpineHistory { choice }
        | Answer::Diagnosis { choice }
        | Answer::Documentation { choice }
        | Answer::ProceedWithoutDocs { choice } => {
            let choice = choice.ok_or(InvalidInput::ChoiceRequired)?;
            Ok(AcceptedAnswer::Choice {
                step: answer.step(),
                choice,
            })
        }
        Answer::UploadDocuments { documents } => {
            if documents.is_empty() {
                Err(InvalidInput::DocumentsRequired)
            } else {
                Ok(AcceptedAnswer::Documents(documents.clone()))
            }
        }
        Answer::BackPain { has_pain, level } => match has_pain {
            None => Err(InvalidInput::ChoiceRequired),
            Some(YesNo::No) => Ok(AcceptedAnswer::Pain(PainAnswer::None)),
            Some(YesNo::Yes) => {
                let level = level.ok_or(InvalidInput::PainLevelRequired)?;
                let level = PainLevel::try_from(level)
                    .map_err(|err| InvalidInput::PainLevelOutOfRange { level: err.0 })?;
                Ok(AcceptedAnswer::Pain(PainAnswer::Rated(level)))
            }
        },
    }
}

/// Applies the eligibility range for `step` and picks the next node.
pub(crate) fn route(
    step: StepId,
    accepted: &AcceptedAnswer,
    config: &EligibilityConfig,
) -> Verdict {
    let rejection = match accepted {
        AcceptedAnswer::Age(age) if *age < config.minimum_age => {
            Some(RejectReason::AgeBelowMinimum {
                age: *age,
                minimum: config.minimum_age,
            })
        }
        AcceptedAnswer::HeightCm(cm) if !config.height_cm.contains(*cm) => {
            Some(RejectReason::HeightOutOfRange {
                height_cm: *cm,
                range: config.height_cm,
            })
        }
        AcceptedAnswer::WeightKg(kg) if !config.weight_kg.contains(*kg) => {
            Some(RejectReason::WeightOutOfRange {
                weight_kg: *kg,
                range: config.weight_kg,
            })
        }
        AcceptedAnswer::WaistCm(cm) if !config.waist_cm.contains(*cm) => {
            Some(RejectReason::WaistOutOfRange {
                waist_cm: *cm,
                range: config.waist_cm,
            })
        }
        _ => None,
    };

    if let Some(reason) = rejection {
        return Verdict::Reject { reason };
    }

    let choice = match accepted {
        AcceptedAnswer::Choice { choice, .. } => *choice,
        _ => YesNo::Yes,
    };

    Verdict::Continue {
        next: next_after(step, choice),
    }
}
