//! Integration tests for the chat API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_utils::{
        ScriptedProvider, TestApp, create_session, logged_in_session, send, sse_events,
        test_app, test_app_with_provider,
    };

    async fn chat(app: &TestApp, session_id: &str, message: &str) -> (StatusCode, String) {
        send(
            app,
            "POST",
            "/api/chat",
            Some(json!({"session_id": session_id, "message": message})),
        )
        .await
    }

    /// Tests that an anonymous session can't chat
    #[tokio::test]
    async fn it_requires_login_to_chat() {
        let app = test_app().await;
        let session_id = create_session(&app).await;

        let (status, _) = chat(&app, &session_id, "How do I harden sshd?").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Nothing was added to the conversation
        let state = app.state.read().unwrap();
        assert!(state.session(&session_id).unwrap().transcript().history().is_empty());
    }

    /// Tests chatting with a session that doesn't exist
    #[tokio::test]
    async fn it_returns_404_for_unknown_session() {
        let app = test_app().await;
        let (status, _) = chat(&app, "missing", "hello").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// Tests a blank message never becomes a turn
    #[tokio::test]
    async fn it_rejects_blank_messages() {
        let app = test_app().await;
        let session_id = logged_in_session(&app, "blue@team.io").await;

        for message in ["", "   ", "\n\t"] {
            let (status, body) = chat(&app, &session_id, message).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(body.contains("\"error\""));
        }

        let state = app.state.read().unwrap();
        let transcript = state.session(&session_id).unwrap().transcript();
        assert_eq!(transcript.len(), 1);
        assert!(transcript.history().is_empty());
    }

    /// Tests the response streams as deltas followed by a done event
    #[tokio::test]
    async fn it_streams_the_response() {
        let app = test_app().await;
        let session_id = logged_in_session(&app, "blue@team.io").await;

        let (status, body) = chat(&app, &session_id, "What is a SYN scan?").await;
        assert_eq!(status, StatusCode::OK);

        let events = sse_events(&body);
        assert_eq!(
            events,
            vec![
                json!({"type": "delta", "content": "re: "}),
                json!({"type": "delta", "content": "What is a SYN scan?"}),
                json!({"type": "done", "content": "re: What is a SYN scan?"}),
            ]
        );
    }

    /// Tests every round adds a user and assistant message in order
    #[tokio::test]
    async fn it_keeps_the_conversation_in_order() {
        let app = test_app().await;
        let session_id = logged_in_session(&app, "blue@team.io").await;

        let prompts = ["List common C2 ports", "Which are TLS?", "Thanks"];
        for prompt in prompts {
            let (status, _) = chat(&app, &session_id, prompt).await;
            assert_eq!(status, StatusCode::OK);
        }

        {
            let state = app.state.read().unwrap();
            let transcript = state.session(&session_id).unwrap().transcript();
            assert_eq!(transcript.len(), 1 + 2 * prompts.len());
        }

        let (status, body) = send(&app, "GET", &format!("/api/chat/{}", session_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        let transcript = json["transcript"].as_array().unwrap();

        // The system message is never displayed
        assert_eq!(transcript.len(), 2 * prompts.len());
        for (i, prompt) in prompts.iter().enumerate() {
            assert_eq!(transcript[2 * i]["role"], "user");
            assert_eq!(transcript[2 * i]["content"], *prompt);
            assert_eq!(transcript[2 * i + 1]["role"], "assistant");
            assert_eq!(
                transcript[2 * i + 1]["content"],
                format!("re: {}", prompt)
            );
        }
    }

    /// Tests a provider failure mid-stream reports an error and drops
    /// the partial response
    #[tokio::test]
    async fn it_reports_provider_errors() {
        let provider = ScriptedProvider {
            deltas: vec!["Hel".to_string(), "lo".to_string()],
            error: Some("connection reset".to_string()),
        };
        let app = test_app_with_provider(Arc::new(provider)).await;
        let session_id = logged_in_session(&app, "red@team.io").await;

        let (status, body) = chat(&app, &session_id, "hi").await;
        assert_eq!(status, StatusCode::OK);

        let events = sse_events(&body);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], json!({"type": "delta", "content": "Hel"}));
        assert_eq!(events[1], json!({"type": "delta", "content": "lo"}));
        assert_eq!(events[2]["type"], "error");
        assert!(
            events[2]["message"]
                .as_str()
                .unwrap()
                .contains("connection reset")
        );

        let state = app.state.read().unwrap();
        let history = state.session(&session_id).unwrap().transcript().history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "hi");
    }

    /// Tests a logged out session keeps its conversation but can't chat
    #[tokio::test]
    async fn it_locks_chat_after_logout() {
        let app = test_app().await;
        let session_id = logged_in_session(&app, "blue@team.io").await;

        let (status, _) = chat(&app, &session_id, "first").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/logout",
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = chat(&app, &session_id, "second").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let state = app.state.read().unwrap();
        assert_eq!(
            state.session(&session_id).unwrap().transcript().history().len(),
            2
        );
    }

    /// Tests the transcript of an unknown session
    #[tokio::test]
    async fn it_returns_404_for_unknown_transcript() {
        let app = test_app().await;
        let (status, _) = send(&app, "GET", "/api/chat/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
