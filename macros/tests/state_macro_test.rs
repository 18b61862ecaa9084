//! Tests for #[derive(State)] macro

use shopfront_macros::State;

#[derive(State, Clone, Debug, Default)]
struct NoteDraft {
    pub title: String,
    pub body: String,
    #[revision]
    pub revision: u64,
}

#[derive(State, Clone, Debug, Default)]
struct PlainDraft {
    pub title: String,
}

#[test]
fn test_revision_starts_at_field_value() {
    let draft = NoteDraft {
        title: "Restock".to_string(),
        body: String::new(),
        revision: 3,
    };

    assert_eq!(draft.revision(), 3);
}

#[test]
fn test_bump_revision() {
    let mut draft = NoteDraft::default();
    assert_eq!(draft.revision(), 0);

    draft.title = "Restock".to_string();
    draft.bump_revision();
    draft.body = "Order more mugs".to_string();
    draft.bump_revision();

    assert_eq!(draft.revision(), 2);
}

#[test]
fn test_bump_revision_wraps() {
    let mut draft = NoteDraft {
        revision: u64::MAX,
        ..NoteDraft::default()
    };
    draft.bump_revision();
    assert_eq!(draft.revision(), 0);
}

#[test]
fn test_state_without_revision_field() {
    // Derive without #[revision] is a no-op and still compiles
    let draft = PlainDraft {
        title: "Untracked".to_string(),
    };
    assert_eq!(draft.title, "Untracked");
}
