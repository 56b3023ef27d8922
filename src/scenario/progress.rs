//! Progress through a scripted scenario

use serde::Serialize;

use super::{Prompt, ScenarioScript};

/// Points awarded for each completed exchange
pub const SCORE_PER_EXCHANGE: u32 = 10;

/// Extra points for finishing the script
pub const COMPLETION_BONUS: u32 = 20;

/// Agent line emitted when the script is finished
pub const COMPLETION_MESSAGE: &str =
    "Great job! You've completed this roleplay scenario. Well done!";

/// Whether the script still has prompts to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    InProgress,
    Completed,
}

/// Snapshot of a learner's position in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioProgress {
    pub script_id: String,
    pub current_index: usize,
    pub score: u32,
    pub status: ScenarioStatus,
}

/// Result of [`ScenarioTracker::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next prompt; its agent message should be emitted
    Next(Prompt),
    /// The script just finished; the completion message should be emitted
    Completed(&'static str),
    /// The script was already finished, nothing changed
    AlreadyCompleted,
}

/// Walks a script one exchange at a time
#[derive(Debug, Clone)]
pub struct ScenarioTracker {
    script: ScenarioScript,
    progress: ScenarioProgress,
}

impl ScenarioTracker {
    /// Start a script at its first prompt with a zero score
    ///
    /// Returns the tracker and the prompt to emit as the first agent
    /// utterance (`None` for an empty script, which starts completed).
    #[must_use]
    pub fn start(script: ScenarioScript) -> (Self, Option<Prompt>) {
        let first = script.prompts.first().cloned();
        let status = if first.is_some() {
            ScenarioStatus::InProgress
        } else {
            ScenarioStatus::Completed
        };

        let progress = ScenarioProgress {
            script_id: script.id.clone(),
            current_index: 0,
            score: 0,
            status,
        };

        tracing::debug!(scenario = %script.id, prompts = script.len(), "scenario started");
        (Self { script, progress }, first)
    }

    /// Record one completed user exchange
    pub fn advance(&mut self) -> Advance {
        if self.is_completed() {
            return Advance::AlreadyCompleted;
        }

        self.progress.score += SCORE_PER_EXCHANGE;

        let next_index = self.progress.current_index + 1;
        if let Some(prompt) = self.script.prompts.get(next_index) {
            self.progress.current_index = next_index;
            tracing::debug!(
                scenario = %self.progress.script_id,
                index = next_index,
                score = self.progress.score,
                "scenario advanced"
            );
            return Advance::Next(prompt.clone());
        }

        self.progress.status = ScenarioStatus::Completed;
        self.progress.score += COMPLETION_BONUS;
        tracing::info!(
            scenario = %self.progress.script_id,
            score = self.progress.score,
            "scenario completed"
        );
        Advance::Completed(COMPLETION_MESSAGE)
    }

    #[must_use]
    pub const fn progress(&self) -> &ScenarioProgress {
        &self.progress
    }

    #[must_use]
    pub const fn script(&self) -> &ScenarioScript {
        &self.script
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.progress.status == ScenarioStatus::Completed
    }

    /// Prompt the learner is currently answering
    #[must_use]
    pub fn current_prompt(&self) -> Option<&Prompt> {
        if self.is_completed() {
            return None;
        }
        self.script.prompts.get(self.progress.current_index)
    }

    /// Hints for the current prompt
    #[must_use]
    pub fn hints(&self) -> &[String] {
        self.current_prompt()
            .map(|p| p.hints.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Difficulty;

    fn script(len: usize) -> ScenarioScript {
        ScenarioScript {
            id: "test".to_string(),
            title: "Test".to_string(),
            description: String::new(),
            emoji: String::new(),
            difficulty: Difficulty::Beginner,
            prompts: (0..len)
                .map(|i| Prompt {
                    id: i.to_string(),
                    agent_message: format!("prompt {i}"),
                    expected_response: None,
                    hints: vec![format!("hint {i}")],
                })
                .collect(),
        }
    }

    #[test]
    fn start_emits_first_prompt() {
        let (tracker, first) = ScenarioTracker::start(script(3));
        assert_eq!(first.unwrap().agent_message, "prompt 0");
        assert_eq!(tracker.progress().current_index, 0);
        assert_eq!(tracker.progress().score, 0);
        assert_eq!(tracker.hints(), ["hint 0"]);
    }

    #[test]
    fn three_prompts_complete_with_fifty_points() {
        let (mut tracker, _) = ScenarioTracker::start(script(3));

        assert_eq!(tracker.advance(), Advance::Next(script(3).prompts[1].clone()));
        assert_eq!(tracker.advance(), Advance::Next(script(3).prompts[2].clone()));
        assert_eq!(tracker.advance(), Advance::Completed(COMPLETION_MESSAGE));

        let progress = tracker.progress();
        assert_eq!(progress.current_index, 2);
        assert_eq!(progress.status, ScenarioStatus::Completed);
        assert_eq!(progress.score, 50);
        assert!(tracker.current_prompt().is_none());
    }

    #[test]
    fn score_formula_holds_for_any_length() {
        for len in 1..=6 {
            let (mut tracker, _) = ScenarioTracker::start(script(len));
            for _ in 0..len {
                tracker.advance();
            }
            let expected = SCORE_PER_EXCHANGE * u32::try_from(len).unwrap() + COMPLETION_BONUS;
            assert_eq!(tracker.progress().score, expected);
            assert!(tracker.is_completed());
        }
    }

    #[test]
    fn advance_after_completion_is_a_no_op() {
        let (mut tracker, _) = ScenarioTracker::start(script(2));
        tracker.advance();
        tracker.advance();
        let before = tracker.progress().clone();

        assert_eq!(tracker.advance(), Advance::AlreadyCompleted);
        assert_eq!(tracker.progress(), &before);
    }

    #[test]
    fn empty_script_starts_completed() {
        let (mut tracker, first) = ScenarioTracker::start(script(0));
        assert!(first.is_none());
        assert!(tracker.is_completed());
        assert_eq!(tracker.advance(), Advance::AlreadyCompleted);
        assert_eq!(tracker.progress().score, 0);
    }
}
