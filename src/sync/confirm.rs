//! Confirmation gate for candidate operations.
//!
//! The gate turns a list of candidate changes into the approved subset:
//! either wholesale with the bulk-confirm flag, or one yes/no decision per
//! function. Rendering the question is delegated to a [`Prompter`].

use tracing::debug;

use crate::error::Result;

use super::changeset::{ChangeSet, ConfirmedOperation};

/// Presentation collaborator that asks the user a yes/no question.
pub trait Prompter {
    /// Asks for confirmation, returning the user's decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Confirmation gate over a prompter.
pub struct ConfirmationGate<'a> {
    /// Prompter used for per-item decisions.
    prompter: &'a dyn Prompter,
}

impl<'a> ConfirmationGate<'a> {
    /// Creates a new gate.
    #[must_use]
    pub const fn new(prompter: &'a dyn Prompter) -> Self {
        Self { prompter }
    }

    /// Filters the candidate changes down to the approved subset.
    ///
    /// `Unchanged` entries are never surfaced for confirmation and never
    /// appear in the output. An empty result means there is nothing to do
    /// and the orchestrator must not be invoked.
    ///
    /// # Errors
    ///
    /// Returns an error if a confirmation prompt fails.
    pub fn confirm(
        &self,
        candidates: Vec<(String, ChangeSet)>,
        auto_approve: bool,
    ) -> Result<Vec<ConfirmedOperation>> {
        let mut approved = Vec::new();

        for (name, change) in candidates {
            if change.is_unchanged() {
                continue;
            }

            if auto_approve {
                approved.push(ConfirmedOperation { name, change });
                continue;
            }

            let message = format!("Push '{name}' ({})?", change.summary());
            if self.prompter.confirm(&message)? {
                approved.push(ConfirmedOperation { name, change });
            } else {
                debug!("User declined push for '{name}'");
            }
        }

        Ok(approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{FunctionCreateBody, FunctionManifest, FunctionState};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Prompter that replays scripted answers and records the questions.
    struct ScriptedPrompter {
        answers: RefCell<VecDeque<bool>>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().copied().collect()),
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&self, message: &str) -> Result<bool> {
            self.asked.borrow_mut().push(message.to_string());
            Ok(self
                .answers
                .borrow_mut()
                .pop_front()
                .expect("unexpected prompt"))
        }
    }

    fn new_change(name: &str) -> (String, ChangeSet) {
        (
            name.to_string(),
            ChangeSet::NewFunction(FunctionCreateBody {
                name: name.to_string(),
                description: String::new(),
                event_id: None,
                state: FunctionState::Draft,
                manifest: FunctionManifest {
                    code: String::from("code"),
                    environment: std::collections::BTreeMap::new(),
                    version: -1,
                },
            }),
        )
    }

    #[test]
    fn auto_approve_passes_everything_without_prompting() {
        let prompter = ScriptedPrompter::new(&[]);
        let gate = ConfirmationGate::new(&prompter);

        let approved = gate
            .confirm(vec![new_change("a"), new_change("b")], true)
            .expect("confirm should succeed");

        assert_eq!(approved.len(), 2);
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn unchanged_entries_are_never_surfaced() {
        let prompter = ScriptedPrompter::new(&[]);
        let gate = ConfirmationGate::new(&prompter);

        let approved = gate
            .confirm(vec![(String::from("a"), ChangeSet::Unchanged)], false)
            .expect("confirm should succeed");

        assert!(approved.is_empty());
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn declined_entries_are_filtered_out() {
        let prompter = ScriptedPrompter::new(&[true, false, true]);
        let gate = ConfirmationGate::new(&prompter);

        let approved = gate
            .confirm(
                vec![new_change("a"), new_change("b"), new_change("c")],
                false,
            )
            .expect("confirm should succeed");

        let names: Vec<&str> = approved.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(prompter.asked.borrow().len(), 3);
    }
}
