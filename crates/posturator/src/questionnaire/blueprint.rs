use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use super::domain::{Node, StepId, Terminal, YesNo};
use super::evaluation::rules::{next_after, rejection_exit};

/// Display metadata for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTemplate {
    pub step: StepId,
    pub title: &'static str,
    pub prompt: &'static str,
    pub progress_percent: u8,
    pub accepts_units: bool,
}

/// Display metadata for an end screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalTemplate {
    pub terminal: Terminal,
    pub title: &'static str,
    pub message: &'static str,
}

/// Static description of the questionnaire graph and its screens.
#[derive(Debug, Clone)]
pub struct QuestionnaireBlueprint {
    steps: Vec<StepTemplate>,
    terminals: Vec<TerminalTemplate>,
}

impl Default for QuestionnaireBlueprint {
    fn default() -> Self {
        Self::standard()
    }
}

impl QuestionnaireBlueprint {
    pub fn standard() -> Self {
        let steps = StepId::ordered().into_iter().map(step_template).collect();
        let terminals = Terminal::ordered()
            .into_iter()
            .map(terminal_template)
            .collect();
        Self { steps, terminals }
    }

    pub fn step(&self, step: StepId) -> &StepTemplate {
        // `steps` is built from `StepId::ordered()`, so the index always matches.
        &self.steps[step_index(step)]
    }

    pub fn terminal(&self, terminal: Terminal) -> &TerminalTemplate {
        &self.terminals[terminal_index(terminal)]
    }

    pub fn step_templates(&self) -> &[StepTemplate] {
        &self.steps
    }

    pub fn terminal_templates(&self) -> &[TerminalTemplate] {
        &self.terminals
    }

    /// Every node a step can lead to, including its rejection exit.
    pub fn successors(&self, step: StepId) -> Vec<Node> {
        let mut nodes = BTreeSet::new();
        nodes.insert(next_after(step, YesNo::Yes));
        nodes.insert(next_after(step, YesNo::No));
        if let Some(exit) = rejection_exit(step) {
            nodes.insert(Node::Terminal(exit));
        }
        nodes.into_iter().collect()
    }

    /// Breadth-first walk from the entry step.
    pub fn reachable_from_entry(&self) -> BTreeSet<Node> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([Node::Step(StepId::ENTRY)]);

        while let Some(node) = queue.pop_front() {
            if !seen.insert(node) {
                continue;
            }
            if let Node::Step(step) = node {
                queue.extend(self.successors(step));
            }
        }

        seen
    }

    /// True when no step can lead back to itself through forward transitions.
    pub fn is_acyclic(&self) -> bool {
        fn visit(
            blueprint: &QuestionnaireBlueprint,
            step: StepId,
            stack: &mut Vec<StepId>,
            done: &mut BTreeSet<StepId>,
        ) -> bool {
            if stack.contains(&step) {
                return false;
            }
            if done.contains(&step) {
                return true;
            }
            stack.push(step);
            let ok = blueprint
                .successors(step)
                .into_iter()
                .filter_map(Node::step)
                .all(|next| visit(blueprint, next, stack, done));
            stack.pop();
            done.insert(step);
            ok
        }

        let mut done = BTreeSet::new();
        StepId::ordered()
            .into_iter()
            .all(|step| visit(self, step, &mut Vec::new(), &mut done))
    }
}

fn step_index(step: StepId) -> usize {
    StepId::ordered()
        .iter()
        .position(|candidate| *candidate == step)
        .unwrap_or_default()
}

fn terminal_index(terminal: Terminal) -> usize {
    Terminal::ordered()
        .iter()
        .position(|candidate| *candidate == terminal)
        .unwrap_or_default()
}

fn step_template(step: StepId) -> StepTemplate {
    let (title, prompt, progress_percent) = match step {
        StepId::Age => ("Age Verification", "How old are you?", 10),
        StepId::Height => ("Height Measurement", "What is your height?", 20),
        StepId::Weight => ("Weight Measurement", "What is your weight?", 30),
        StepId::Waist => ("Waist Measurement", "What is your waist size?", 40),
        StepId::SpineHistory => (
            "Spine Assessment",
            "Do you have any existing spine issues?",
            50,
        ),
        StepId::Diagnosis => (
            "Clinical Diagnosis",
            "Do you have a clinical diagnosis for your spine issue?",
            60,
        ),
        StepId::Documentation => (
            "Medical Documentation",
            "Can you provide medical reports?",
            70,
        ),
        StepId::UploadDocuments => (
            "Upload Documents",
            "Please upload your medical reports.",
            80,
        ),
        StepId::ProceedWithoutDocs => (
            "Missing Documentation",
            "Would you like to proceed without documentation?",
            80,
        ),
        StepId::BackPain => ("Posture Assessment", "Do you have back pain?", 100),
    };

    StepTemplate {
        step,
        title,
        prompt,
        progress_percent,
        accepts_units: matches!(step, StepId::Height | StepId::Weight | StepId::Waist),
    }
}

fn terminal_template(terminal: Terminal) -> TerminalTemplate {
    let (title, message) = match terminal {
        Terminal::AgeExit => (
            "Age Requirement Not Met",
            "Our posture support products are designed for individuals 12 years of age and older.",
        ),
        Terminal::HeightExit => (
            "Height Outside Range",
            "Our products are designed for heights between 140cm-210cm (4'7\"-6'11\").",
        ),
        Terminal::WeightExit => (
            "Weight Outside Range",
            "Our products are designed for weights between 45kg-120kg (100-265lbs).",
        ),
        Terminal::WaistExit => (
            "Size Outside Range",
            "Our products are designed for waist sizes between 60-120 cm (24-47 inches).",
        ),
        Terminal::NotSuitable => (
            "Documentation Needed",
            "Based on your responses, we recommend obtaining a clinical assessment and proper documentation before proceeding.",
        ),
        Terminal::Complete => (
            "Assessment Successful!",
            "Based on your responses, we've analyzed your posture needs and identified the most suitable solutions for you.",
        ),
    };

    TerminalTemplate {
        terminal,
        title,
        message,
    }
}
