use proptest::prelude::*;
use sketch_core::{CanvasState, History, Operation, Point, StrokeAccumulator, ToolKind, ToolSet};

fn draw(history: &mut History, acc: &mut StrokeAccumulator, points: &[(f32, f32)]) {
    let (first, rest) = points.split_first().expect("at least one point");
    let base = history.current().clone();
    assert!(acc.begin_stroke(ToolKind::Pen, Point::from(*first), "#000000", 5.0, &base));
    for p in rest {
        acc.extend_stroke(Point::from(*p));
    }
    let state = acc.end_stroke().expect("active stroke");
    history.commit(state);
}

fn stroke_points(op: &Operation) -> Vec<(f32, f32)> {
    op.as_stroke()
        .expect("stroke")
        .points
        .iter()
        .map(|p| (p.x, p.y))
        .collect()
}

#[test]
fn stroke_accumulation_is_deterministic() {
    let mut history = History::new();
    let mut acc = StrokeAccumulator::new(ToolSet::full());

    draw(&mut history, &mut acc, &[(10.0, 10.0), (12.0, 10.0), (15.0, 11.0)]);

    assert_eq!(history.len(), 2);
    assert_eq!(history.step(), 1);
    assert_eq!(
        stroke_points(&history.current().ops()[0]),
        vec![(10.0, 10.0), (12.0, 10.0), (15.0, 11.0)]
    );
}

#[test]
fn image_insert_replaces_strokes() {
    let mut history = History::new();
    let mut acc = StrokeAccumulator::default();
    draw(&mut history, &mut acc, &[(0.0, 0.0), (1.0, 1.0)]);
    draw(&mut history, &mut acc, &[(5.0, 5.0)]);
    assert_eq!(history.current().len(), 2);

    history.insert_image("data:image/png;base64,iVBORw0KGgo=");

    assert_eq!(history.current().len(), 1);
    assert!(matches!(history.current().ops()[0], Operation::ImageInsert { .. }));
}

#[test]
fn branch_cutting_discards_redo_states() {
    let mut history = History::new();
    let s1 = CanvasState::from_ops(vec![Operation::image("one")]);
    let s2 = s1.with_op(Operation::image("two"));
    history.commit(s1.clone());
    history.commit(s2);
    assert_eq!(history.step(), 2);

    history.undo();
    history.undo();
    let s1_prime = CanvasState::from_ops(vec![Operation::image("one-prime")]);
    history.commit(s1_prime.clone());

    assert_eq!(history.states(), &[CanvasState::empty(), s1_prime][..]);
    assert_eq!(history.step(), 1);
}

#[test]
fn end_to_end_scenario() {
    let mut history = History::new();
    let mut acc = StrokeAccumulator::default();
    assert_eq!(history.states(), &[CanvasState::empty()][..]);
    assert_eq!(history.step(), 0);

    draw(&mut history, &mut acc, &[(1.0, 1.0)]); // A
    assert_eq!(history.len(), 2);
    assert_eq!(history.step(), 1);
    let a = history.current().ops()[0].clone();

    draw(&mut history, &mut acc, &[(2.0, 2.0)]); // B
    assert_eq!(history.len(), 3);
    assert_eq!(history.step(), 2);

    history.undo();
    assert_eq!(history.step(), 1);
    assert_eq!(history.current().ops(), &[a.clone()][..]);

    draw(&mut history, &mut acc, &[(3.0, 3.0)]); // C
    assert_eq!(history.len(), 3);
    assert_eq!(history.step(), 2);
    let visible = history.current().ops();
    assert_eq!(visible[0], a);
    assert_eq!(stroke_points(&visible[1]), vec![(3.0, 3.0)]);

    history.undo();
    history.undo();
    assert_eq!(history.step(), 0);
    assert!(history.current().is_empty());

    history.redo();
    assert_eq!(history.step(), 1);
    assert_eq!(history.current().ops(), &[a][..]);
}

#[derive(Debug, Clone)]
enum Action {
    Commit(u8),
    Undo,
    Redo,
    Clear,
    Image(u8),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => any::<u8>().prop_map(Action::Commit),
        2 => Just(Action::Undo),
        2 => Just(Action::Redo),
        1 => Just(Action::Clear),
        1 => any::<u8>().prop_map(Action::Image),
    ]
}

fn apply(history: &mut History, action: &Action) {
    match action {
        Action::Commit(tag) => {
            let next = history.current().with_op(Operation::image(format!("op-{tag}")));
            history.commit(next);
        }
        Action::Undo => {
            history.undo();
        }
        Action::Redo => {
            history.redo();
        }
        Action::Clear => {
            history.clear();
        }
        Action::Image(tag) => {
            history.insert_image(format!("img-{tag}"));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn cursor_stays_in_bounds(actions in prop::collection::vec(action_strategy(), 0..64)) {
        let mut history = History::new();
        for action in &actions {
            apply(&mut history, action);
            prop_assert!(history.step() < history.len());
            prop_assert!(history.states()[0].is_empty());
        }
    }

    #[test]
    fn undo_then_redo_restores_visible_state(
        actions in prop::collection::vec(action_strategy(), 0..48),
        n in 0usize..16,
    ) {
        let mut history = History::new();
        for action in &actions {
            apply(&mut history, action);
        }
        let before = history.current().clone();
        let step = history.step();

        let undone = (0..n).filter(|_| history.undo()).count();
        for _ in 0..undone {
            history.redo();
        }

        prop_assert_eq!(history.step(), step);
        prop_assert_eq!(history.current(), &before);
    }

    #[test]
    fn boundary_moves_never_change_state(actions in prop::collection::vec(action_strategy(), 0..32)) {
        let mut history = History::new();
        for action in &actions {
            apply(&mut history, action);
        }
        while history.undo() {}
        let len = history.len();
        prop_assert!(!history.undo());
        prop_assert_eq!(history.step(), 0);
        prop_assert_eq!(history.len(), len);

        while history.redo() {}
        let end = history.current().clone();
        prop_assert!(!history.redo());
        prop_assert_eq!(history.step(), len - 1);
        prop_assert_eq!(history.current(), &end);
    }

    #[test]
    fn clear_on_empty_adds_nothing(actions in prop::collection::vec(action_strategy(), 0..32)) {
        let mut history = History::new();
        for action in &actions {
            apply(&mut history, action);
        }
        if history.current().is_empty() {
            let (len, step) = (history.len(), history.step());
            prop_assert!(!history.clear());
            prop_assert_eq!((history.len(), history.step()), (len, step));
        }
    }
}
