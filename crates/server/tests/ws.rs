mod common;

use floorwise_server::error::GENERIC_FAILURE;
use floorwise_server::ws::handler::respond;
use floorwise_server::ws::protocol::WsOutgoingMessage;
use serde_json::json;

#[tokio::test]
async fn test_frame_gets_answer() {
    let fixture = common::fixture();
    let frame = json!({"message": "Which Element styles have CushionBac?", "index_name": "soft-surface"});

    let reply = respond(&fixture.state, &frame.to_string()).await;

    assert_eq!(
        reply,
        WsOutgoingMessage::Answer {
            reply: common::REPLY.to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_fields_skip_the_pipeline() {
    let fixture = common::fixture();

    for frame in [
        json!({"message": "hello"}),
        json!({"index_name": "all"}),
        json!({}),
        json!({"message": "", "index_name": "all"}),
        json!({"message": "hello", "index_name": "   "}),
        json!({"message": null, "index_name": "all"}),
    ] {
        let reply = respond(&fixture.state, &frame.to_string()).await;
        assert!(matches!(reply, WsOutgoingMessage::Error { .. }), "{frame}");
    }
    assert_eq!(fixture.llm.calls(), 0);
}

#[tokio::test]
async fn test_unreadable_frame_is_error() {
    let fixture = common::fixture();
    let reply = respond(&fixture.state, "not json").await;
    assert!(matches!(reply, WsOutgoingMessage::Error { .. }));
}

#[tokio::test]
async fn test_invalid_partition_message_reaches_client() {
    let fixture = common::fixture();
    let frame = json!({"message": "hello", "index_name": "rugs"});

    let WsOutgoingMessage::Error { message } = respond(&fixture.state, &frame.to_string()).await
    else {
        panic!("expected an error frame");
    };
    assert!(message.contains("rugs"));
}

#[tokio::test]
async fn test_upstream_failure_is_generic() {
    let fixture = common::failing_fixture();
    let frame = json!({"message": "hello", "index_name": "all"});
    assert_eq!(
        respond(&fixture.state, &frame.to_string()).await,
        WsOutgoingMessage::error(GENERIC_FAILURE)
    );
}

#[tokio::test]
async fn test_error_frame_does_not_block_next_question() {
    let fixture = common::fixture();
    assert_eq!(
        respond(&fixture.state, "{}").await,
        WsOutgoingMessage::error("Both message and index_name are required")
    );

    let frame = json!({"message": "hello", "index_name": "all"});
    assert!(matches!(
        respond(&fixture.state, &frame.to_string()).await,
        WsOutgoingMessage::Answer { .. }
    ));
}

#[test]
fn test_frame_wire_shape() {
    let answer = serde_json::to_value(WsOutgoingMessage::Answer {
        reply: "hi".to_string(),
    })
    .unwrap();
    assert_eq!(answer, json!({"type": "answer", "reply": "hi"}));

    let error = serde_json::to_value(WsOutgoingMessage::error("nope")).unwrap();
    assert_eq!(error, json!({"type": "error", "message": "nope"}));
}
