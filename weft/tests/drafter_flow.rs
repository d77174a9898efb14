//! Integration test: drafter conversation from greeting to saved file.

mod init_logging;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use weft::{
    drafter_tools, AgentError, AgentOptions, CompletionSignal, DrafterRunner, LlmResponse,
    Message, MockLlm, ScriptedInput, ToolCall, DRAFTER_GREETING,
};

fn call(name: &str, arguments: &str, id: &str) -> ToolCall {
    ToolCall {
        name: name.into(),
        arguments: arguments.into(),
        id: Some(id.into()),
    }
}

/// **Scenario**: greeting, one edit round with the user, then save; the file holds the
/// final document and the run ends right after the save.
#[tokio::test]
async fn draft_edit_save_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::text("What would you like to write?"),
        LlmResponse::tools(vec![call(
            "update_document",
            r#"{"content":"Roses are red"}"#,
            "u1",
        )]),
        LlmResponse::tools(vec![call(
            "save_document",
            r#"{"filename":"poem"}"#,
            "s1",
        )]),
    ]));
    let input = Arc::new(ScriptedInput::new(["write a poem", "save it as poem"]));
    let runner = DrafterRunner::new(
        llm.clone(),
        Arc::new(drafter_tools(dir.path()).unwrap()),
        input.clone(),
        AgentOptions::default(),
    )
    .unwrap();

    let out = runner.run(CancellationToken::new()).await.unwrap();

    assert_eq!(out.document, "Roses are red");
    let saved = std::fs::read_to_string(dir.path().join("poem.txt")).unwrap();
    assert_eq!(saved, "Roses are red");
    assert_eq!(out.messages[0], Message::user(DRAFTER_GREETING));
    assert_eq!(llm.call_count(), 3);
    assert_eq!(input.remaining(), 0);

    // The save turn's prompt carries the updated document.
    let last_request = &llm.requests()[2];
    assert!(last_request[0].content().contains("Roses are red"));
}

/// **Scenario**: a failed save (bad filename) is not terminal; the conversation goes on
/// and the user ends it by closing input.
#[tokio::test]
async fn failed_save_keeps_conversation_going() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::tools(vec![call(
            "save_document",
            r#"{"filename":"../escape"}"#,
            "s1",
        )]),
        LlmResponse::text("That name did not work."),
    ]));
    let runner = DrafterRunner::new(
        llm,
        Arc::new(drafter_tools(dir.path()).unwrap()),
        Arc::new(ScriptedInput::new(Vec::<String>::new())),
        AgentOptions::default(),
    )
    .unwrap();

    let err = runner.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, AgentError::InputClosed), "{:?}", err);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// **Scenario**: with the text signal, a save reply mentioning the saved document ends the run.
#[tokio::test]
async fn text_signal_ends_on_saved_message() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockLlm::scripted(vec![LlmResponse::tools(vec![
        call("update_document", r#"{"content":"hi"}"#, "u1"),
        call("save_document", r#"{"filename":"note.txt"}"#, "s1"),
    ])]));
    let runner = DrafterRunner::new(
        llm,
        Arc::new(drafter_tools(dir.path()).unwrap()),
        Arc::new(ScriptedInput::new(Vec::<String>::new())),
        AgentOptions::default().with_completion_signal(CompletionSignal::Text),
    )
    .unwrap();

    let out = runner.run(CancellationToken::new()).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("note.txt")).unwrap(),
        "hi"
    );
    assert_eq!(out.document, "hi");
}

/// **Scenario**: a cancelled token stops the run before the model is called.
#[tokio::test]
async fn cancelled_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockLlm::with_no_tool_calls("hello"));
    let runner = DrafterRunner::new(
        llm.clone(),
        Arc::new(drafter_tools(dir.path()).unwrap()),
        Arc::new(ScriptedInput::new(["x"])),
        AgentOptions::default(),
    )
    .unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = runner.run(cancel).await.unwrap_err();
    assert!(matches!(err, AgentError::Cancelled));
    assert_eq!(llm.call_count(), 0);
}
