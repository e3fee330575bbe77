//! Drives a real server over TCP with `BoardClient`.

use std::sync::Arc;

use taskboard::client::{BoardClient, ClientError};
use taskboard::web::api::{AppState, MoveTaskRequest};
use taskboard::web::server::build_router;
use taskboard_common::{Board, NewTask, SyncMessage, TaskPatch};

async fn spawn_server(board: Board) -> (BoardClient, Arc<AppState>) {
    let state = Arc::new(AppState::new(board, 16));
    let app = build_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (BoardClient::new(format!("http://{}", addr)), state)
}

#[tokio::test]
async fn test_fetch_seeded_board() {
    let (client, _state) = spawn_server(Board::seeded()).await;
    let board = client.fetch_board().await.unwrap();
    assert_eq!(board.task_count(), 3);
    assert_eq!(board.column("todo").unwrap().task_ids, vec!["task-1"]);
}

#[tokio::test]
async fn test_create_update_move_delete() {
    let (client, state) = spawn_server(Board::empty()).await;
    let mut watcher = state.hub.connect().unwrap();

    let task = client
        .create_task(&NewTask {
            title: "Plan sprint".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(task.column_id, "todo");

    let pushed = SyncMessage::from_json(&watcher.recv().await.unwrap()).unwrap();
    assert!(pushed.board().tasks.contains_key(&task.id));

    let updated = client
        .update_task(
            &task.id,
            &TaskPatch {
                title: Some("Plan next sprint".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Plan next sprint");
    assert_eq!(updated.created_at, task.created_at);

    let moved = client
        .move_task(
            &task.id,
            &MoveTaskRequest {
                from_column_id: "todo".into(),
                from_index: 0,
                to_column_id: "done".into(),
                to_index: 0,
            },
        )
        .await
        .unwrap();
    assert!(moved.moved);
    assert_eq!(moved.board.column("done").unwrap().task_ids, vec![task.id.clone()]);
    assert_eq!(moved.board.tasks[&task.id].column_id, "done");

    client.delete_task(&task.id).await.unwrap();
    let board = client.fetch_board().await.unwrap();
    assert_eq!(board.task_count(), 0);
    assert!(board.check_invariants().is_ok());
}

#[tokio::test]
async fn test_missing_task_is_not_found() {
    let (client, _state) = spawn_server(Board::seeded()).await;

    let err = client
        .update_task("ghost", &TaskPatch::default())
        .await
        .unwrap_err();
    match err {
        ClientError::NotFound(message) => assert_eq!(message, "Task ghost not found"),
        other => panic!("Expected NotFound, got {:?}", other),
    }

    let err = client.delete_task("ghost").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_blank_title_is_bad_request() {
    let (client, _state) = spawn_server(Board::empty()).await;
    let err = client
        .create_task(&NewTask {
            title: "  ".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
}
