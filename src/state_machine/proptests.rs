//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> DialogueContext {
    DialogueContext::new("test-session")
}

/// What the simulated model says when asked for a clarification
#[derive(Debug, Clone)]
enum ModelReply {
    Question(String),
    Ready(Option<String>),
    Fails,
}

/// Drive the machine the way the runtime does, scripted model and user.
/// Returns the final state and the number of clarification requests issued.
fn drive(
    max_turns: u32,
    opening: &str,
    model: &[ModelReply],
    answers: &[String],
) -> (DialogueState, usize) {
    let ctx = test_context();
    let mut state = DialogueState::new(max_turns);
    let mut pending = vec![Event::utterance(opening)];
    let mut model_replies = model.iter().cycle();
    let mut user_answers = answers.iter().cycle();
    let mut requests = 0;

    while let Some(event) = pending.pop() {
        let result = transition(&state, &ctx, event).expect("scripted transitions are valid");
        state = result.new_state;
        for effect in result.effects {
            match effect {
                Effect::RequestClarification => {
                    requests += 1;
                    pending.push(match model_replies.next().expect("non-empty script") {
                        ModelReply::Question(q) => Event::clarification(q.clone()),
                        ModelReply::Ready(q) => Event::clarification(format!(
                            "{READINESS_MARKER} {}",
                            q.clone().unwrap_or_default()
                        )),
                        ModelReply::Fails => Event::ClarificationFailed {
                            message: "down".to_string(),
                        },
                    });
                }
                Effect::AskUser { .. } => {
                    let answer = user_answers.next().expect("non-empty answers");
                    pending.push(Event::utterance(answer.clone()));
                }
                Effect::NotifyReady
                | Effect::NotifyTerminated { .. }
                | Effect::RequestAssessment
                | Effect::DeliverAssessment { .. } => {}
            }
        }
    }

    (state, requests)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_question() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ,]{0,40}\\?"
}

fn arb_answer() -> impl Strategy<Value = String> {
    "[a-z][a-z ]{0,30}".prop_filter("not the exit sentinel", |s| !is_exit(s))
}

fn arb_model_reply() -> impl Strategy<Value = ModelReply> {
    prop_oneof![
        6 => arb_question().prop_map(ModelReply::Question),
        2 => prop::option::of(arb_question()).prop_map(ModelReply::Ready),
        1 => Just(ModelReply::Fails),
    ]
}

fn arb_exit() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("exit".to_string()),
        Just("EXIT".to_string()),
        Just("Exit".to_string()),
        Just(" eXiT ".to_string()),
    ]
}

proptest! {
    /// A model that never signals readiness is cut off after exactly max_turns questions
    #[test]
    fn turn_budget_is_exact(
        max_turns in 1u32..15,
        questions in prop::collection::vec(arb_question(), 1..5),
        answers in prop::collection::vec(arb_answer(), 1..5),
    ) {
        let script: Vec<_> = questions.into_iter().map(ModelReply::Question).collect();
        let (state, requests) = drive(max_turns, "sore throat", &script, &answers);

        prop_assert_eq!(state.phase, DialoguePhase::ReadyForAssessment);
        prop_assert_eq!(state.turns_asked, max_turns);
        prop_assert_eq!(requests, max_turns as usize);
        // opening + one question and one answer per turn
        prop_assert_eq!(state.history.len(), 1 + 2 * max_turns as usize);
    }

    /// Whatever the model does, the dialogue always ends and never overruns its budget
    #[test]
    fn dialogue_always_settles(
        max_turns in 0u32..12,
        script in prop::collection::vec(arb_model_reply(), 1..8),
        answers in prop::collection::vec(arb_answer(), 1..5),
    ) {
        let (state, requests) = drive(max_turns, "back pain", &script, &answers);

        prop_assert!(state.turns_asked <= max_turns);
        prop_assert!(requests <= max_turns as usize);
        let settled = matches!(
            state.phase,
            DialoguePhase::ReadyForAssessment
                | DialoguePhase::Terminated { reason: TerminationReason::CollaboratorUnavailable }
        );
        prop_assert!(settled, "unsettled phase: {:?}", state.phase);
        prop_assert_eq!(state.history.turns()[0].text(), "back pain");
        for turn in state.history.turns() {
            prop_assert!(!turn.text().contains(READINESS_MARKER));
        }
    }

    /// Exit from any awaiting phase terminates and never requests the model again
    #[test]
    fn exit_is_absorbing(
        questions_before in 0usize..5,
        exit in arb_exit(),
        later in prop::collection::vec(arb_answer(), 0..5),
    ) {
        let ctx = test_context();
        let mut state = transition(&DialogueState::new(10), &ctx, Event::utterance("dizzy"))
            .unwrap()
            .new_state;
        for i in 0..questions_before {
            state = transition(&state, &ctx, Event::clarification(format!("Q{i}?"))).unwrap().new_state;
            state = transition(&state, &ctx, Event::utterance(format!("a{i}"))).unwrap().new_state;
        }
        state = transition(&state, &ctx, Event::clarification("Last?")).unwrap().new_state;
        let history_len = state.history.len();

        let result = transition(&state, &ctx, Event::utterance(exit)).unwrap();
        prop_assert!(!result.effects.iter().any(Effect::is_collaborator_call));
        let exited = result.new_state;
        prop_assert_eq!(
            &exited.phase,
            &DialoguePhase::Terminated { reason: TerminationReason::UserExit }
        );
        prop_assert_eq!(exited.history.len(), history_len);

        for text in later {
            let err = transition(&exited, &ctx, Event::utterance(text)).unwrap_err();
            prop_assert_eq!(err, TransitionError::DialogueClosed(TerminationReason::UserExit));
        }
        prop_assert!(transition(&exited, &ctx, Event::AssessmentRequested).is_err());
    }

    /// History only grows, and every earlier turn is preserved verbatim
    #[test]
    fn history_is_append_only(
        script in prop::collection::vec(arb_model_reply(), 1..8),
        answers in prop::collection::vec(arb_answer(), 1..5),
    ) {
        let ctx = test_context();
        let mut state = DialogueState::new(6);
        let mut pending = vec![Event::utterance("nausea")];
        let mut replies = script.iter().cycle();
        let mut user = answers.iter().cycle();

        while let Some(event) = pending.pop() {
            let before = state.history.clone();
            let result = transition(&state, &ctx, event).unwrap();
            prop_assert!(result.new_state.history.len() >= before.len());
            prop_assert_eq!(&result.new_state.history.turns()[..before.len()], before.turns());
            state = result.new_state;

            for effect in result.effects {
                match effect {
                    Effect::RequestClarification => pending.push(match replies.next().unwrap() {
                        ModelReply::Question(q) => Event::clarification(q.clone()),
                        ModelReply::Ready(q) => Event::clarification(
                            format!("{READINESS_MARKER}{}", q.clone().unwrap_or_default()),
                        ),
                        ModelReply::Fails => Event::ClarificationFailed { message: String::new() },
                    }),
                    Effect::AskUser { .. } => pending.push(Event::utterance(user.next().unwrap().clone())),
                    _ => {}
                }
            }
        }
    }
}
