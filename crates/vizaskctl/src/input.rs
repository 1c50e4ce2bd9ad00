//! Chat input state
//!
//! Tracks the draft question for assistant mode along with its character
//! counter. The 500-character limit is guidance only and never blocks a send.

/// Soft guidance length for a question
pub const GUIDANCE_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatInput {
    text: String,
}

impl ChatInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Characters in the trimmed question
    pub fn len(&self) -> usize {
        self.text.trim().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counter shown next to the input, e.g. "42 / 500"
    pub fn counter_label(&self) -> String {
        format!("{} / {}", self.len(), GUIDANCE_LIMIT)
    }

    /// Send is enabled once there is non-whitespace text
    pub fn can_send(&self) -> bool {
        !self.is_empty()
    }

    pub fn over_guidance(&self) -> bool {
        self.len() > GUIDANCE_LIMIT
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_counts_trimmed_chars() {
        let mut input = ChatInput::new();
        assert_eq!(input.counter_label(), "0 / 500");
        assert!(!input.can_send());

        input.set("  top regions?  ");
        assert_eq!(input.counter_label(), "12 / 500");
        assert!(input.can_send());
    }

    #[test]
    fn test_whitespace_only_cannot_send() {
        let mut input = ChatInput::new();
        input.set(" \n\t ");
        assert!(!input.can_send());
    }

    #[test]
    fn test_over_guidance_is_soft() {
        let mut input = ChatInput::new();
        input.set("x".repeat(GUIDANCE_LIMIT + 1));
        assert!(input.over_guidance());
        assert!(input.can_send());
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut input = ChatInput::new();
        input.set("top regions");
        input.clear();
        assert_eq!(input.text(), "");
        assert_eq!(input.counter_label(), "0 / 500");
    }
}
