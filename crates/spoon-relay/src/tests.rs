/// Both clients driven against local mockito servers.
#[cfg(test)]
mod chat {
    use crate::chat::{clean_command, ChatClient, Provider, OPENAI_FALLBACK_MODEL};
    use crate::RelayError;
    use mockito::Matcher;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn client(server: &mockito::Server) -> ChatClient {
        ChatClient::new(
            Provider::OpenRouter,
            "sk-test",
            "anthropic/claude-3.5-sonnet",
            Duration::from_secs(5),
        )
        .unwrap()
        .with_endpoint(format!("{}/chat", server.url()))
    }

    fn reply(content: &str) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
            .to_string()
    }

    #[test]
    fn translate_sends_bearer_and_strips_fences() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "anthropic/claude-3.5-sonnet",
                "max_tokens": 150,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply("```bash\nls -la\n```"))
            .create();

        let cmd = client(&server)
            .translate_to_shell_command("list everything here")
            .unwrap();
        assert_eq!(cmd, "ls -la");
        mock.assert();
    }

    #[test]
    fn complete_uses_given_budget() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat")
            .match_body(Matcher::PartialJson(json!({ "max_tokens": 500 })))
            .with_status(200)
            .with_body(reply("  Follow the white rabbit.  "))
            .create();

        let text = client(&server).complete("sys", "hello", 500).unwrap();
        assert_eq!(text, "Follow the white rabbit.");
        mock.assert();
    }

    #[test]
    fn unauthorized_is_invalid_credential() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/chat").with_status(401).create();
        let err = client(&server).complete("s", "u", 10).unwrap_err();
        assert!(matches!(err, RelayError::InvalidCredential));
        assert!(err.is_auth());
    }

    #[test]
    fn server_error_keeps_status_and_body() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat")
            .with_status(503)
            .with_body("overloaded")
            .create();
        let err = client(&server).complete("s", "u", 10).unwrap_err();
        match err {
            RelayError::Http { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn missing_choices_is_invalid_response() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create();
        let err = client(&server).complete("s", "u", 10).unwrap_err();
        assert!(matches!(err, RelayError::InvalidResponse(_)));
    }

    #[test]
    fn provider_selection_prefers_openrouter() {
        let mut keys = BTreeMap::new();
        keys.insert("openai".to_string(), "sk-oa".to_string());
        assert_eq!(Provider::select(&keys), Some((Provider::OpenAi, "sk-oa")));
        keys.insert("openrouter".to_string(), "sk-or".to_string());
        assert_eq!(
            Provider::select(&keys),
            Some((Provider::OpenRouter, "sk-or"))
        );
    }

    #[test]
    fn no_keys_is_missing_credential() {
        let err = ChatClient::from_keys(&BTreeMap::new(), "m", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, RelayError::MissingCredential(_)));
    }

    #[test]
    fn openai_swaps_vendor_model_ids() {
        let c = ChatClient::new(
            Provider::OpenAi,
            "sk",
            "anthropic/claude-3.5-sonnet",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(c.model(), OPENAI_FALLBACK_MODEL);
    }

    #[test]
    fn clean_command_variants() {
        assert_eq!(clean_command("`pwd`"), "pwd");
        assert_eq!(clean_command("```\ndf -h\n```"), "df -h");
        assert_eq!(clean_command("  git status \n"), "git status");
    }
}

#[cfg(test)]
mod gist {
    use crate::gist::{GistClient, STATE_FILE_NAME};
    use crate::RelayError;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn client(server: &mockito::Server) -> GistClient {
        GistClient::new(&server.url(), "neo", "ghp_test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn push_creates_when_absent() {
        let mut server = mockito::Server::new();
        let list = server
            .mock("GET", "/gists")
            .match_header("authorization", "Bearer ghp_test")
            .with_status(200)
            .with_body("[]")
            .create();
        let create = server
            .mock("POST", "/gists")
            .match_body(Matcher::PartialJson(json!({
                "description": "[SPOON-AUTO-SYNC] neo",
                "public": false,
                "files": { STATE_FILE_NAME: { "content": "{}" } }
            })))
            .with_status(201)
            .with_body(r#"{"id": "new1"}"#)
            .create();

        let id = client(&server).push("{}").unwrap();
        assert_eq!(id, "new1");
        list.assert();
        create.assert();
    }

    #[test]
    fn push_updates_existing() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/gists")
            .with_status(200)
            .with_body(
                json!([
                    { "id": "other", "description": "notes", "files": {} },
                    { "id": "g1", "description": "[SPOON-AUTO-SYNC] neo", "files": {} }
                ])
                .to_string(),
            )
            .create();
        let patch = server
            .mock("PATCH", "/gists/g1")
            .with_status(200)
            .with_body(r#"{"id": "g1"}"#)
            .create();

        assert_eq!(client(&server).push("{}").unwrap(), "g1");
        patch.assert();
    }

    #[test]
    fn pull_reads_state_file() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/gists")
            .with_status(200)
            .with_body(r#"[{"id": "g1", "description": "[SPOON-AUTO-SYNC] neo"}]"#)
            .create();
        server
            .mock("GET", "/gists/g1")
            .with_status(200)
            .with_body(
                json!({
                    "id": "g1",
                    "files": { STATE_FILE_NAME: { "content": "{\"tokenBalance\": 7}" } }
                })
                .to_string(),
            )
            .create();

        let blob = client(&server).pull().unwrap();
        assert_eq!(blob.as_deref(), Some("{\"tokenBalance\": 7}"));
    }

    #[test]
    fn pull_without_gist_is_none() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/gists")
            .with_status(200)
            .with_body("[]")
            .create();
        assert_eq!(client(&server).pull().unwrap(), None);
    }

    #[test]
    fn verify_user_ignores_case() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/user")
            .with_status(200)
            .with_body(r#"{"login": "Neo"}"#)
            .create();
        assert!(client(&server).verify_user().unwrap());
    }

    #[test]
    fn bad_token_is_invalid_credential() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/user").with_status(401).create();
        let err = client(&server).verify_user().unwrap_err();
        assert!(matches!(err, RelayError::InvalidCredential));
    }

    #[test]
    fn empty_token_is_rejected_up_front() {
        let err = GistClient::new("http://localhost", "neo", "", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, RelayError::MissingCredential(_)));
    }
}
