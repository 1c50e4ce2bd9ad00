//! UI surface seam
//!
//! The controller never renders directly. It reports status, progress,
//! answers and failures to a `UiSurface`; the terminal implementation prints
//! them and the recording implementation keeps them for assertions.

use crate::input::ChatInput;
use owo_colors::OwoColorize;
use std::sync::{Arc, Mutex, PoisonError};
use vizask_shared::Mode;

/// Result region a cycle writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Report,
    Chat,
}

impl Pane {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::AnalyzeReport => Pane::Report,
            Mode::AiAssistant => Pane::Chat,
        }
    }
}

pub trait UiSurface: Send {
    fn set_status(&mut self, text: &str);

    /// Mark the pane as busy while data is collected and analysed
    fn show_progress(&mut self, pane: Pane);

    fn show_answer(&mut self, pane: Pane, answer: &str);

    fn show_failure(&mut self, pane: Pane, message: &str);

    /// Clear the chat input and its counter after a successful send
    fn reset_chat_input(&mut self);
}

// ============================================================================
// Terminal surface
// ============================================================================

/// Prints answers to stdout and status lines to stderr
#[derive(Debug, Default)]
pub struct TerminalSurface {
    input: ChatInput,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_mut(&mut self) -> &mut ChatInput {
        &mut self.input
    }
}

impl UiSurface for TerminalSurface {
    fn set_status(&mut self, text: &str) {
        eprintln!("{} {}", "›".dimmed(), text.dimmed());
    }

    fn show_progress(&mut self, pane: Pane) {
        let what = match pane {
            Pane::Report => "report",
            Pane::Chat => "answer",
        };
        eprintln!(
            "{} {}",
            "›".dimmed(),
            format!("Collecting data & running analysis for {}...", what).dimmed()
        );
    }

    fn show_answer(&mut self, _pane: Pane, answer: &str) {
        println!();
        println!("{}", answer);
        println!();
    }

    fn show_failure(&mut self, _pane: Pane, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    fn reset_chat_input(&mut self) {
        self.input.clear();
    }
}

// ============================================================================
// Recording surface (testing)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Status(String),
    Progress(Pane),
    Answer(Pane, String),
    Failure(Pane, String),
    ChatInputReset,
}

/// Surface that records every call. Clones share the same log and input.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    events: Arc<Mutex<Vec<SurfaceEvent>>>,
    input: Arc<Mutex<ChatInput>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Last answer or failure written to `pane`
    pub fn pane_text(&self, pane: Pane) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            SurfaceEvent::Answer(p, text) | SurfaceEvent::Failure(p, text) if p == pane => {
                Some(text)
            }
            _ => None,
        })
    }

    pub fn set_input(&self, text: &str) {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(text);
    }

    pub fn input(&self) -> ChatInput {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, event: SurfaceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl UiSurface for RecordingSurface {
    fn set_status(&mut self, text: &str) {
        self.record(SurfaceEvent::Status(text.to_string()));
    }

    fn show_progress(&mut self, pane: Pane) {
        self.record(SurfaceEvent::Progress(pane));
    }

    fn show_answer(&mut self, pane: Pane, answer: &str) {
        self.record(SurfaceEvent::Answer(pane, answer.to_string()));
    }

    fn show_failure(&mut self, pane: Pane, message: &str) {
        self.record(SurfaceEvent::Failure(pane, message.to_string()));
    }

    fn reset_chat_input(&mut self) {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.record(SurfaceEvent::ChatInputReset);
    }
}
