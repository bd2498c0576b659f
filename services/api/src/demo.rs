use crate::infra::{default_eligibility_config, InMemorySessionRepository};
use chrono::Local;
use clap::{Args, ValueEnum};
use posturator::error::AppError;
use posturator::questionnaire::{
    Answer, DocumentDescriptor, QuestionnaireService, StepId, TransitionView, YesNo,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Run a single scenario instead of all of them.
    #[arg(long, value_enum)]
    pub(crate) scenario: Option<Scenario>,
    /// Print the normalized screening profile after each scenario.
    #[arg(long)]
    pub(crate) show_profile: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// Ten-year-old applicant turned away at the age check
    UnderAge,
    /// Adult whose weight falls below the supported range
    Underweight,
    /// Shortest path to the product recommendation
    Complete,
    /// Imperial measurements with uploaded medical reports
    Documented,
    /// Declines to continue without documentation
    NotSuitable,
}

impl Scenario {
    fn all() -> [Scenario; 5] {
        [
            Scenario::UnderAge,
            Scenario::Underweight,
            Scenario::Complete,
            Scenario::Documented,
            Scenario::NotSuitable,
        ]
    }

    fn title(self) -> &'static str {
        match self {
            Scenario::UnderAge => "Under-age applicant",
            Scenario::Underweight => "Weight below range",
            Scenario::Complete => "Metric applicant, no spine history",
            Scenario::Documented => "Imperial applicant with medical reports",
            Scenario::NotSuitable => "Diagnosed applicant without documentation",
        }
    }

    fn answers(self) -> Vec<Answer> {
        let choice = |step: StepId, value: YesNo| Answer::choice(step, Some(value));
        let mut answers = match self {
            Scenario::UnderAge => return vec![Answer::age("10")],
            Scenario::Underweight => {
                return vec![
                    Answer::age("25"),
                    Answer::height_cm("175"),
                    Answer::weight_kg("30"),
                ]
            }
            Scenario::Complete => vec![
                Answer::age("25"),
                Answer::height_cm("175"),
                Answer::weight_kg("70"),
                Answer::waist_cm("80"),
            ],
            Scenario::Documented | Scenario::NotSuitable => vec![
                Answer::age("47"),
                Answer::height_ft_in("5", "8"),
                Answer::weight_lb("172"),
                Answer::waist_in("36"),
            ],
        };

        let tail: Vec<Option<Answer>> = match self {
            Scenario::Complete => vec![
                choice(StepId::SpineHistory, YesNo::No),
                Some(Answer::back_pain(5)),
            ],
            Scenario::Documented => vec![
                choice(StepId::SpineHistory, YesNo::Yes),
                choice(StepId::Diagnosis, YesNo::Yes),
                choice(StepId::Documentation, YesNo::Yes),
                Some(Answer::documents(vec![DocumentDescriptor {
                    name: "lumbar-mri.pdf".to_string(),
                    size_bytes: 1_482_113,
                    uploaded_on: Local::now().date_naive(),
                }])),
                Some(Answer::back_pain(8)),
            ],
            Scenario::NotSuitable => vec![
                choice(StepId::SpineHistory, YesNo::Yes),
                choice(StepId::Diagnosis, YesNo::Yes),
                choice(StepId::Documentation, YesNo::No),
                choice(StepId::ProceedWithoutDocs, YesNo::No),
            ],
            Scenario::UnderAge | Scenario::Underweight => Vec::new(),
        };
        answers.extend(tail.into_iter().flatten());
        answers
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        scenario,
        show_profile,
    } = args;

    let repository = Arc::new(InMemorySessionRepository::default());
    let service = QuestionnaireService::new(repository, default_eligibility_config());

    println!("Posturator eligibility demo");
    let scenarios = match scenario {
        Some(single) => vec![single],
        None => Scenario::all().to_vec(),
    };

    for scenario in scenarios {
        println!("\n{}", scenario.title());
        let transitions = play(&service, scenario)?;
        for transition in &transitions {
            render_transition(transition);
        }
        if let Some(last) = transitions.last() {
            render_outcome(last, show_profile);
        }
    }

    Ok(())
}

/// Drive one scenario through a hosted session and collect every transition.
pub(crate) fn play(
    service: &QuestionnaireService<InMemorySessionRepository>,
    scenario: Scenario,
) -> Result<Vec<TransitionView>, AppError> {
    let started = service.start()?;
    let Some(id) = started.session_id else {
        return Ok(Vec::new());
    };

    let mut transitions = Vec::new();
    for answer in scenario.answers() {
        let transition = service.submit(&id, answer)?;
        let finished = transition.finished;
        transitions.push(transition);
        if finished {
            break;
        }
    }
    Ok(transitions)
}

fn render_transition(transition: &TransitionView) {
    let progress = transition
        .session
        .step
        .as_ref()
        .map(|step| format!(" ({}%)", step.progress_percent))
        .unwrap_or_default();
    println!(
        "  {:<30} -> {}{}",
        transition.from.label(),
        transition.session.node.label(),
        progress
    );
    if let Some(message) = &transition.message {
        println!("    {message}");
    }
}

fn render_outcome(last: &TransitionView, show_profile: bool) {
    let Some(terminal) = &last.session.terminal else {
        println!("  Scenario stopped before reaching an end screen");
        return;
    };

    println!("  {}: {}", terminal.title, terminal.message);
    if let Some(pain) = &terminal.pain {
        println!("  Pain {} / 10: {} ({})", pain.level, pain.label, pain.description);
    }
    for product in &terminal.products {
        println!("  - {} {}", product.name, product.price_label());
    }
    if show_profile {
        match serde_json::to_string_pretty(&last.session.profile) {
            Ok(json) => println!("  Screening profile:\n{json}"),
            Err(err) => println!("  Screening profile unavailable: {err}"),
        }
    }
}
