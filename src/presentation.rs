// src/presentation.rs
//! Turns results and errors into the strings the pages show. Loosely typed backend
//! fields are normalised here and nowhere else.

use crate::errors::{SubmissionError, ValidationError};
use crate::models::*;

pub trait DisplayText {
    fn display_text(&self) -> String;
}

impl<T: DisplayText> DisplayText for StringOrStructured<T> {
    fn display_text(&self) -> String {
        match self {
            StringOrStructured::Text(text) => text.trim().to_string(),
            StringOrStructured::Structured(value) => value.display_text(),
        }
    }
}

fn join(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl DisplayText for FoundationSpec {
    fn display_text(&self) -> String {
        join(&[&self.tone, &self.undertone, &self.coverage])
    }
}

impl DisplayText for ConcealerSpec {
    fn display_text(&self) -> String {
        join(&[&self.shade, &self.coverage])
    }
}

impl DisplayText for PowderSpec {
    fn display_text(&self) -> String {
        join(&[&self.kind, &self.finish])
    }
}

impl DisplayText for PlacementSpec {
    fn display_text(&self) -> String {
        let shade = join(&[&self.shade]);
        match self.placement.as_deref().map(str::trim) {
            Some(placement) if !placement.is_empty() => {
                format!("{} ({})", shade, placement).trim().to_string()
            }
            _ => shade,
        }
    }
}

impl DisplayText for EyeshadowSpec {
    fn display_text(&self) -> String {
        join(&[&self.colors, &self.style])
    }
}

impl DisplayText for EyelinerSpec {
    fn display_text(&self) -> String {
        join(&[&self.kind, &self.style])
    }
}

impl DisplayText for MascaraSpec {
    fn display_text(&self) -> String {
        join(&[&self.kind, &self.effect])
    }
}

impl DisplayText for LipstickSpec {
    fn display_text(&self) -> String {
        join(&[&self.shade, &self.finish])
    }
}

impl DisplayText for LipLinerSpec {
    fn display_text(&self) -> String {
        join(&[&self.shade])
    }
}

impl DisplayText for EyebrowSpec {
    fn display_text(&self) -> String {
        join(&[&self.product, &self.style])
    }
}

fn push<T: DisplayText>(
    lines: &mut Vec<(&'static str, String)>,
    label: &'static str,
    field: &Option<StringOrStructured<T>>,
) {
    if let Some(field) = field {
        let text = field.display_text();
        if !text.is_empty() {
            lines.push((label, text));
        }
    }
}

/// Labelled product lines in the order the result card lists them. Empty fields are skipped.
pub fn spec_lines(spec: &MakeupSpec) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    push(&mut lines, "Foundation", &spec.foundation);
    push(&mut lines, "Concealer", &spec.concealer);
    push(&mut lines, "Powder", &spec.powder);
    push(&mut lines, "Blush", &spec.blush);
    push(&mut lines, "Bronzer", &spec.bronzer);
    push(&mut lines, "Highlighter", &spec.highlighter);
    push(&mut lines, "Eyeshadow", &spec.eyeshadow);
    push(&mut lines, "Eyeliner", &spec.eyeliner);
    push(&mut lines, "Mascara", &spec.mascara);
    push(&mut lines, "Lipstick", &spec.lipstick);
    push(&mut lines, "Lip liner", &spec.lip_liner);
    push(&mut lines, "Eyebrow", &spec.eyebrow);
    lines
}

pub fn level_label(note: &IngredientNote) -> Option<String> {
    note.level.map(|level| format!("Level: {}/5", level))
}

/// The in-place message shown next to a failed operation's retry control.
pub fn error_banner(kind: OperationKind, error: &SubmissionError) -> String {
    match (kind, error) {
        (OperationKind::Chat, SubmissionError::ServerRejected { .. }) => {
            "Sorry, I encountered an error. Please try again.".to_string()
        }
        (OperationKind::Chat, SubmissionError::ConnectivityFailure { .. }) => {
            "Sorry, I cannot connect to the server. Please try again later.".to_string()
        }
        (OperationKind::TryOn, SubmissionError::ServerRejected { message, .. }) => {
            format!("Try-on failed: {}", message)
        }
        (OperationKind::TryOn, SubmissionError::ConnectivityFailure { .. }) => {
            "Failed to connect to the try-on service. Please try again.".to_string()
        }
        (_, SubmissionError::ServerRejected { message, .. }) => {
            format!("Analysis failed: {}", message)
        }
        (_, SubmissionError::ConnectivityFailure { .. }) => {
            "Failed to connect to the analysis service. Please try again.".to_string()
        }
    }
}

/// `subject` names the slot on pages that collect more than one photo, e.g. "user photo".
pub fn validation_banner(subject: Option<&str>, error: &ValidationError) -> String {
    let Some(subject) = subject else {
        return error.to_string();
    };

    match error {
        ValidationError::TooLarge { .. } => {
            let mut chars = subject.chars();
            let capitalised = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            };
            format!(
                "{} file size too large. Please choose a file under 10MB.",
                capitalised
            )
        }
        ValidationError::WrongType { .. } => {
            format!("Please upload a valid image file for {}.", subject)
        }
        ValidationError::Unreadable(_) => error.to_string(),
    }
}
