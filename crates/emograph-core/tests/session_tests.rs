use emograph_blueprint::Blueprint;
use emograph_core::{
    BatchId, GenerationCandidate, Message, RenderError, RenderedImage, Renderer, Role,
    SelectionError, SelectionState, Session,
};
use emograph_test_utils::two_emoji_blueprint;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn candidates(n: usize) -> Vec<GenerationCandidate> {
    let blueprint = emograph_blueprint::validate(&two_emoji_blueprint())
        .unwrap()
        .into_blueprint();
    let batch = BatchId::new();
    (0..n)
        .map(|index| GenerationCandidate {
            batch,
            index,
            response: format!("candidate {index}"),
            blueprint: blueprint.clone(),
            warnings: Vec::new(),
            attempts: 1,
        })
        .collect()
}

struct FixedRenderer;

impl Renderer for FixedRenderer {
    fn render(&self, _blueprint: &Blueprint) -> Result<RenderedImage, RenderError> {
        Ok(RenderedImage {
            media_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        })
    }
}

struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn render(&self, _blueprint: &Blueprint) -> Result<RenderedImage, RenderError> {
        Err(RenderError("font missing".into()))
    }
}

#[test]
fn test_select_one_of_three() {
    let mut session = Session::new();
    let (token, _) = session.begin_turn("happy and sad");
    session.offer(token, candidates(3)).unwrap();
    assert!(session.state().is_awaiting());

    let turn = session.select(1).unwrap();
    assert_eq!(turn.role, Role::Assistant);
    assert_eq!(turn.content, "candidate 1");

    assert_eq!(session.state(), &SelectionState::Idle);
    assert_eq!(session.history().len(), 2);
    assert_eq!(
        session.select(0).unwrap_err(),
        SelectionError::NotAwaitingSelection
    );
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_out_of_range_keeps_pending() {
    let mut session = Session::new();
    let (token, _) = session.begin_turn("x");
    session.offer(token, candidates(2)).unwrap();

    assert_eq!(
        session.select(2).unwrap_err(),
        SelectionError::IndexOutOfRange { index: 2, len: 2 }
    );
    assert_eq!(session.pending().len(), 2);
    assert!(session.select(1).is_ok());
}

#[test]
fn test_stale_offer_rejected() {
    let mut session = Session::new();
    let (stale, _) = session.begin_turn("first");
    let (current, _) = session.begin_turn("second");

    assert_eq!(
        session.offer(stale, candidates(3)).unwrap_err(),
        SelectionError::StaleTurn {
            offered: stale.value(),
            current: current.value()
        }
    );
    assert_eq!(session.state(), &SelectionState::Idle);
    assert!(session.offer(current, candidates(3)).is_ok());
}

#[test]
fn test_double_offer_rejected() {
    let mut session = Session::new();
    let (token, _) = session.begin_turn("x");
    session.offer(token, candidates(1)).unwrap();

    assert_eq!(
        session.offer(token, candidates(1)).unwrap_err(),
        SelectionError::AlreadyAwaiting
    );
}

#[test]
fn test_turn_accepts_one_selection() {
    let mut session = Session::new();
    let (token, _) = session.begin_turn("one input");
    session.offer(token, candidates(3)).unwrap();
    session.select(1).unwrap();

    assert_eq!(
        session.offer(token, candidates(3)).unwrap_err(),
        SelectionError::TurnResolved {
            turn: token.value()
        }
    );
    assert_eq!(
        session.select(0).unwrap_err(),
        SelectionError::NotAwaitingSelection
    );
    let roles: Vec<_> = session.history().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);

    // The next input opens a new turn
    let (next, _) = session.begin_turn("another input");
    assert!(session.offer(next, candidates(2)).is_ok());
}

#[test]
fn test_new_input_discards_pending() {
    let mut session = Session::new();
    let (token, _) = session.begin_turn("first");
    session.offer(token, candidates(3)).unwrap();

    session.begin_turn("never mind");

    assert_eq!(session.state(), &SelectionState::Idle);
    let roles: Vec<_> = session.history().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::User]);
}

#[test]
fn test_selected_blueprint_reaches_transcript() {
    let mut session = Session::new().with_system_prompt(Message::system("draw"));
    let (token, _) = session.begin_turn("faces");
    session.offer(token, candidates(3)).unwrap();
    let yaml = session.select(2).unwrap().attachment.as_ref().unwrap().yaml.clone();

    let (_, transcript) = session.begin_turn("make it bigger");
    let messages = transcript.messages();

    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(
        messages[2].content,
        format!("candidate 2\n\n```yaml\n{yaml}```")
    );
    assert_eq!(Blueprint::from_yaml(&yaml).unwrap().blueprint, candidates(1)[0].blueprint);
}

#[test]
fn test_select_with_renderer_attaches_image() {
    let mut session = Session::new();
    let (token, _) = session.begin_turn("x");
    session.offer(token, candidates(2)).unwrap();

    let turn = session.select_with(0, &FixedRenderer).unwrap();

    let image = turn.attachment.as_ref().and_then(|a| a.image.as_ref()).unwrap();
    assert_eq!(image.media_type, "image/png");
}

#[test]
fn test_render_failure_keeps_candidates() {
    let mut session = Session::new();
    let (token, _) = session.begin_turn("x");
    session.offer(token, candidates(2)).unwrap();

    let err = session.select_with(0, &BrokenRenderer).unwrap_err();

    assert_eq!(err, SelectionError::Render(RenderError("font missing".into())));
    assert_eq!(session.pending().len(), 2);
    assert_eq!(session.history().len(), 1);
}

#[derive(Debug, Clone)]
enum Action {
    Input,
    Offer(usize),
    Select(usize),
    Abandon,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Input),
        (0usize..4).prop_map(Action::Offer),
        (0usize..4).prop_map(Action::Select),
        Just(Action::Abandon),
    ]
}

proptest! {
    #[test]
    fn prop_one_selection_per_turn(
        actions in prop::collection::vec(action(), 0..40)
    ) {
        let mut session = Session::new();
        let mut token = None;
        let mut expected_history = 0usize;
        let mut expected_pending = 0usize;
        let mut resolved = false;

        for action in actions {
            match action {
                Action::Input => {
                    token = Some(session.begin_turn("input").0);
                    expected_history += 1;
                    expected_pending = 0;
                    resolved = false;
                }
                Action::Offer(n) => {
                    let Some(t) = token else { continue };
                    let accepted = n > 0 && expected_pending == 0 && !resolved;
                    match session.offer(t, candidates(n)) {
                        Ok(pending) => {
                            prop_assert!(accepted);
                            prop_assert_eq!(pending.len(), n);
                            expected_pending = n;
                        }
                        Err(_) => prop_assert!(!accepted),
                    }
                }
                Action::Select(i) => match session.select(i) {
                    Ok(_) => {
                        prop_assert!(i < expected_pending);
                        expected_history += 1;
                        expected_pending = 0;
                        resolved = true;
                    }
                    Err(_) => prop_assert!(i >= expected_pending),
                },
                Action::Abandon => {
                    prop_assert_eq!(session.abandon(), expected_pending);
                    expected_pending = 0;
                }
            }

            prop_assert_eq!(session.history().len(), expected_history);
            prop_assert_eq!(session.pending().len(), expected_pending);
            prop_assert_eq!(session.state().is_awaiting(), expected_pending > 0);
            // At most one assistant turn follows each user turn
            let roles: Vec<_> = session.history().iter().map(|t| t.role).collect();
            prop_assert!(!roles
                .windows(2)
                .any(|w| w[0] == Role::Assistant && w[1] == Role::Assistant));
        }
    }
}
