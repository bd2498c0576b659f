//! Line-oriented questionnaire driver for the terminal.

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::Local;
use posturator::catalog;
use posturator::questionnaire::{
    Answer, DocumentDescriptor, FlowController, FlowError, LengthInput, Node, PainAnswer,
    PainSummary, QuestionnaireBlueprint, RawValue, StepId, Terminal, UnitSystem, Verdict, YesNo,
};
use tracing::debug;

/// What the user typed at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reply {
    Text(String),
    Back,
    Quit,
}

enum Step {
    Answer(Answer),
    Back,
    Quit,
}

/// Run the questionnaire until an end screen, `quit`, or end of input.
/// Returns the end screen reached, if any.
pub fn run_questionnaire<R, W>(
    input: &mut R,
    output: &mut W,
    controller: &FlowController,
    blueprint: &QuestionnaireBlueprint,
) -> io::Result<Option<Terminal>>
where
    R: BufRead,
    W: Write,
{
    let mut state = controller.start();
    writeln!(
        output,
        "Type `back` to revisit the previous question or `quit` to stop."
    )?;

    loop {
        let step = match state.current() {
            Node::Terminal(terminal) => {
                render_terminal(output, blueprint, terminal, state.profile().pain)?;
                return Ok(Some(terminal));
            }
            Node::Step(step) => step,
        };

        let template = blueprint.step(step);
        writeln!(output, "\n[{:>3}%] {}", template.progress_percent, template.title)?;
        writeln!(output, "{}", template.prompt)?;

        let answer = match read_step(input, output, step)? {
            Step::Answer(answer) => answer,
            Step::Quit => {
                writeln!(output, "Questionnaire abandoned.")?;
                return Ok(None);
            }
            Step::Back => {
                match controller.back(&mut state) {
                    Ok(previous) => debug!(step = previous.label(), "stepped back"),
                    Err(FlowError::AtEntry) => writeln!(output, "This is the first question.")?,
                    Err(other) => writeln!(output, "{other}")?,
                }
                continue;
            }
        };

        match controller.submit(&mut state, answer) {
            Ok(transition) => {
                if let Verdict::Invalid { error } = &transition.verdict {
                    writeln!(output, "{error}")?;
                }
            }
            Err(error) => writeln!(output, "{error}")?,
        }
    }
}

fn read_step<R: BufRead, W: Write>(input: &mut R, output: &mut W, step: StepId) -> io::Result<Step> {
    macro_rules! reply {
        ($label:expr) => {
            match ask(input, output, $label)? {
                Reply::Text(text) => text,
                Reply::Back => return Ok(Step::Back),
                Reply::Quit => return Ok(Step::Quit),
            }
        };
    }

    macro_rules! units {
        ($label:expr, $metric:expr, $imperial:expr) => {
            loop {
                let raw = reply!($label);
                match unit_choice(&raw, $metric, $imperial) {
                    Some(unit) => break unit,
                    None => writeln!(output, "Please type {} or {}", $metric, $imperial)?,
                }
            }
        };
    }

    macro_rules! yes_no {
        () => {
            reply!("yes / no").parse::<YesNo>().ok()
        };
    }

    let answer = match step {
        StepId::Age => Answer::age(reply!("Age")),
        StepId::Height => match units!("Units (cm / ft)", "cm", "ft") {
            UnitSystem::Metric => Answer::height_cm(reply!("Height in cm")),
            UnitSystem::Imperial => {
                let feet = reply!("Feet");
                let inches = reply!("Inches");
                Answer::Height {
                    input: LengthInput::FeetInches {
                        feet: RawValue::from(feet),
                        inches: Some(RawValue::from(inches)),
                    },
                }
            }
        },
        StepId::Weight => match units!("Units (kg / lb)", "kg", "lb") {
            UnitSystem::Metric => Answer::weight_kg(reply!("Weight in kg")),
            UnitSystem::Imperial => Answer::weight_lb(reply!("Weight in lb")),
        },
        StepId::Waist => match units!("Units (cm / in)", "cm", "in") {
            UnitSystem::Metric => Answer::waist_cm(reply!("Waist in cm")),
            UnitSystem::Imperial => Answer::waist_in(reply!("Waist in inches")),
        },
        StepId::SpineHistory => Answer::SpineHistory { choice: yes_no!() },
        StepId::Diagnosis => Answer::Diagnosis { choice: yes_no!() },
        StepId::Documentation => Answer::Documentation { choice: yes_no!() },
        StepId::ProceedWithoutDocs => Answer::ProceedWithoutDocs { choice: yes_no!() },
        StepId::UploadDocuments => {
            let mut documents = Vec::new();
            loop {
                let name = reply!("Report file (blank when done)");
                if name.is_empty() {
                    break;
                }
                match describe_document(&name) {
                    Ok(document) => documents.push(document),
                    Err(error) => writeln!(output, "Cannot use {name}: {error}")?,
                }
            }
            Answer::documents(documents)
        }
        StepId::BackPain => {
            let has_pain = yes_no!();
            let level = match has_pain {
                Some(YesNo::Yes) => reply!("Pain level (1-10)").parse::<u8>().ok(),
                _ => None,
            };
            Answer::BackPain { has_pain, level }
        }
    };

    Ok(Step::Answer(answer))
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<Reply> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Reply::Quit);
    }

    let text = line.trim();
    Ok(match text.to_ascii_lowercase().as_str() {
        "back" => Reply::Back,
        "quit" | "exit" => Reply::Quit,
        _ => Reply::Text(text.to_string()),
    })
}

/// Accepts the unit abbreviation offered at the prompt, or `metric` / `imperial`.
fn unit_choice(raw: &str, metric: &str, imperial: &str) -> Option<UnitSystem> {
    let word = raw.to_ascii_lowercase();
    if word == metric || word == "metric" {
        Some(UnitSystem::Metric)
    } else if word == imperial || word == "imperial" {
        Some(UnitSystem::Imperial)
    } else {
        None
    }
}

fn describe_document(name: &str) -> io::Result<DocumentDescriptor> {
    let path = Path::new(name);
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a file"));
    }

    let display = path
        .file_name()
        .map(|file| file.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());

    Ok(DocumentDescriptor {
        name: display,
        size_bytes: metadata.len(),
        uploaded_on: Local::now().date_naive(),
    })
}

fn render_terminal<W: Write>(
    output: &mut W,
    blueprint: &QuestionnaireBlueprint,
    terminal: Terminal,
    pain: Option<PainAnswer>,
) -> io::Result<()> {
    let template = blueprint.terminal(terminal);
    writeln!(output, "\n{}", template.title)?;
    writeln!(output, "{}", template.message)?;

    if terminal == Terminal::Complete {
        if let Some(summary) = pain.and_then(PainSummary::from_answer) {
            writeln!(
                output,
                "Reported pain {}/10: {}. {}",
                summary.level, summary.label, summary.description
            )?;
        }
        writeln!(output, "\nRecommended for you:")?;
        for product in catalog::products() {
            writeln!(output, "  {} {}", product.name, product.price_label())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(script: &str) -> (Option<Terminal>, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        let reached = run_questionnaire(
            &mut input,
            &mut output,
            &FlowController::default(),
            &QuestionnaireBlueprint::standard(),
        )
        .expect("in-memory io");
        (reached, String::from_utf8(output).expect("utf8 output"))
    }

    #[test]
    fn under_age_applicant_sees_age_exit() {
        let (reached, output) = run("10\n");
        assert_eq!(reached, Some(Terminal::AgeExit));
        assert!(output.contains("Age Requirement Not Met"));
    }

    #[test]
    fn metric_path_lists_products() {
        let (reached, output) = run("25\ncm\n175\nkg\n70\ncm\n80\nno\nyes\n5\n");
        assert_eq!(reached, Some(Terminal::Complete));
        assert!(output.contains("Assessment Successful!"));
        assert!(output.contains("Moderate Pain"));
        assert!(output.contains("Posturator Sofa $120.00"));
    }

    #[test]
    fn invalid_input_is_reported_and_retried() {
        let (reached, output) = run("abc\n10\n");
        assert!(output.contains("Please enter a valid number"));
        assert_eq!(reached, Some(Terminal::AgeExit));
    }

    #[test]
    fn imperial_height_is_accepted() {
        let (reached, output) = run("30\nft\n4\n7\n");
        assert_eq!(reached, Some(Terminal::HeightExit));
        assert!(output.contains("Height Outside Range"));
    }

    #[test]
    fn back_returns_to_previous_question() {
        let (reached, output) = run("30\nback\n9\n");
        assert_eq!(reached, Some(Terminal::AgeExit));
        assert_eq!(output.matches("Age Verification").count(), 2);
    }

    #[test]
    fn back_at_first_question_is_explained() {
        let (_, output) = run("back\nquit\n");
        assert!(output.contains("This is the first question."));
    }

    #[test]
    fn quitting_or_running_out_of_input_abandons() {
        let (reached, output) = run("25\nquit\n");
        assert_eq!(reached, None);
        assert!(output.contains("Questionnaire abandoned."));

        let (reached, _) = run("25\n");
        assert_eq!(reached, None);
    }

    const TO_DOCUMENTATION: &str = "40\ncm\n170\nkg\n80\ncm\n90\nyes\nyes\n";

    #[test]
    fn documentation_branch_requires_a_report() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = dir.path().join("mri.pdf");
        std::fs::write(&report, b"%PDF-1.7 scan").expect("report written");

        let script = format!("{TO_DOCUMENTATION}yes\n\n{}\n\nno\n", report.display());
        let (reached, output) = run(&script);
        assert!(output.contains("Please upload at least one document"));
        assert_eq!(reached, Some(Terminal::Complete));
    }

    #[test]
    fn missing_report_file_is_not_uploaded() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("typo.pdf");

        let script = format!("{TO_DOCUMENTATION}yes\n{}\n\nquit\n", missing.display());
        let (reached, output) = run(&script);
        assert!(output.contains("Cannot use"));
        assert!(output.contains("Please upload at least one document"));
        assert_eq!(reached, None);
    }

    #[test]
    fn directory_is_not_a_report() {
        let dir = tempfile::tempdir().expect("temp dir");
        let document = describe_document(&dir.path().display().to_string());
        assert_eq!(
            document.expect_err("directories are refused").kind(),
            io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn report_size_comes_from_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = dir.path().join("xray.png");
        std::fs::write(&report, [0u8; 2048]).expect("report written");

        let document = describe_document(&report.display().to_string()).expect("readable");
        assert_eq!(document.name, "xray.png");
        assert_eq!(document.size_bytes, 2048);
    }

    #[test]
    fn unrecognised_unit_asks_again() {
        let (reached, output) = run("30
175
cm
175
kg
30
");
        assert!(output.contains("Please type cm or ft"));
        assert_eq!(reached, Some(Terminal::WeightExit));
    }

    #[test]
    fn unit_words_are_step_specific() {
        assert_eq!(unit_choice("CM", "cm", "ft"), Some(UnitSystem::Metric));
        assert_eq!(unit_choice("imperial", "kg", "lb"), Some(UnitSystem::Imperial));
        assert_eq!(unit_choice("lb", "cm", "in"), None);
        assert_eq!(unit_choice("", "cm", "in"), None);
    }

    #[test]
    fn unreadable_choice_stays_on_the_question() {
        let (reached, output) = run("40
cm
170
kg
80
cm
90
maybe
no
no
");
        assert!(output.contains("Please select an option"));
        assert_eq!(reached, Some(Terminal::Complete));
    }

    #[test]
    fn declining_without_documents_is_not_suitable() {
        let script = format!("{TO_DOCUMENTATION}no\nno\n");
        let (reached, output) = run(&script);
        assert_eq!(reached, Some(Terminal::NotSuitable));
        assert!(output.contains("Documentation Needed"));
    }
}
