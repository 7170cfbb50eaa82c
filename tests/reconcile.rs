//! A full drag/drop lifecycle against the mocked host
#![cfg(feature = "integration_tests")]

mod scenarii;

use std::sync::Arc;

use corkboard::clock::{FixedClock, RecordingDelay};
use corkboard::mock_host::{HostCall, MockHost, RecordingSink};
use corkboard::traits::ListCapabilities;
use corkboard::{ListStore, Placement, Reconciler, TodoStatus, UpdateIntent};

use scenarii::{local, monday_noon, owned, todo};

const BOARD: &str = "todo.board";
const TEMPLATES: &str = "todo.templates";

#[tokio::test]
async fn clone_schedule_complete_delete() {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = Arc::new(ListStore::new());
    let host = Arc::new(MockHost::new(store.clone()));
    let sink = Arc::new(RecordingSink::new());
    host.add_list(&BOARD.to_string(), ListCapabilities::all(), Vec::new());
    host.add_list(
        &TEMPLATES.to_string(),
        ListCapabilities::all(),
        vec![todo("tpl-1", "Make challah", TodoStatus::NeedsAction, None)],
    );

    let mut reconciler = Reconciler::new(
        host.clone(),
        sink.clone(),
        Arc::new(FixedClock::at(monday_noon())),
        Arc::new(RecordingDelay::new()),
        store.clone(),
    )
    .with_template_list(TEMPLATES.to_string());

    // 1. Clone the template onto Wednesday
    let template = owned(TEMPLATES, todo("tpl-1", "Make challah", TodoStatus::NeedsAction, None));
    assert!(
        reconciler
            .save_todo(UpdateIntent {
                item: template,
                due: Some(local(2024, 4, 24, 8, 0)),
                status: TodoStatus::NeedsAction,
                target_entity: BOARD.to_string(),
                placement: Placement::First,
            })
            .await
    );
    assert_eq!(host.items(&TEMPLATES.to_string()).len(), 1);
    let board = host.items(&BOARD.to_string());
    assert_eq!(board.len(), 1);
    let uid = board[0].uid.clone();
    assert!(uid.is_empty() == false);

    // 2. Complete it in place
    let scheduled = store
        .snapshot(&BOARD.to_string())
        .into_iter()
        .find(|item| item.uid() == uid)
        .unwrap();
    assert!(
        reconciler
            .save_todo(UpdateIntent {
                item: scheduled,
                due: None,
                status: TodoStatus::Completed,
                target_entity: BOARD.to_string(),
                placement: Placement::Keep,
            })
            .await
    );
    assert_eq!(host.items(&BOARD.to_string())[0].status, TodoStatus::Completed);
    let events = host
        .calls()
        .iter()
        .filter(|call| matches!(call, HostCall::CompletionEvent { .. }))
        .count();
    assert_eq!(events, 1);

    // 3. Drag it into the delete target
    let completed = store
        .snapshot(&BOARD.to_string())
        .into_iter()
        .find(|item| item.uid() == uid)
        .unwrap();
    assert!(reconciler.delete_todo(&completed).await);
    assert!(host.items(&BOARD.to_string()).is_empty());

    // Nothing ever went wrong, so the drag surface was never reset
    assert!(sink.messages().is_empty());
    assert_eq!(reconciler.render_generation(), 0);
}
