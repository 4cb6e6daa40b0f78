// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `gitsource.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{Connection, GitSource, GitSourceState, GitSourceStatus};
    use crate::reconcilers::api_mock::{
        expect_status_patch, mock_context, mount_missing, mount_object, object_path,
        received_bodies, CORE_API, DEVCONSOLE_API, TEST_NAMESPACE,
    };
    use crate::reconcilers::gitsource::{needs_validation, reconcile_gitsource};
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SOURCE_NAME: &str = "nodejs-ex";

    fn source_path() -> String {
        object_path(DEVCONSOLE_API, TEST_NAMESPACE, "gitsources", SOURCE_NAME)
    }

    fn source_json(spec: Value, status: Option<Value>) -> Value {
        let mut source = json!({
            "apiVersion": "devconsole.openshift.io/v1alpha1",
            "kind": "GitSource",
            "metadata": {"name": SOURCE_NAME, "namespace": TEST_NAMESPACE, "uid": "gs-uid"},
            "spec": spec,
        });
        if let Some(status) = status {
            source["status"] = status;
        }
        source
    }

    fn source(spec: Value) -> GitSource {
        serde_json::from_value(source_json(spec, None)).unwrap()
    }

    async fn patched_status(server: &MockServer) -> Value {
        let bodies = received_bodies(server, "PATCH", &format!("{}/status", source_path())).await;
        assert_eq!(bodies.len(), 1);
        bodies[0]["status"].clone()
    }

    #[test]
    fn test_needs_validation() {
        assert!(needs_validation(None));
        assert!(needs_validation(Some(&GitSourceStatus::default())));

        let validated = GitSourceStatus {
            state: Some(GitSourceState::Initializing),
            connection: Connection::ok(),
        };
        assert!(!needs_validation(Some(&validated)));
    }

    #[tokio::test]
    async fn test_skips_source_with_connection_state() {
        let server = MockServer::start().await;
        let spec = json!({"url": "https://github.com/sclorg/nodejs-ex"});
        mount_object(
            &server,
            &source_path(),
            source_json(
                spec.clone(),
                Some(json!({"state": "Ready", "connection": {"state": "OK"}})),
            ),
        )
        .await;
        expect_status_patch(&server, &source_path(), json!({}), 0).await;

        reconcile_gitsource(&mock_context(&server), source(spec))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deleted_source_is_ignored() {
        let server = MockServer::start().await;
        mount_missing(&server, &source_path()).await;
        expect_status_patch(&server, &source_path(), json!({}), 0).await;

        let spec = json!({"url": "https://github.com/sclorg/nodejs-ex"});
        reconcile_gitsource(&mock_context(&server), source(spec))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_secret_is_internal_failure() {
        let server = MockServer::start().await;
        let spec = json!({
            "url": "https://github.com/sclorg/nodejs-ex",
            "secretRef": {"name": "github-token"}
        });
        mount_object(&server, &source_path(), source_json(spec.clone(), None)).await;
        mount_missing(
            &server,
            &object_path(CORE_API, TEST_NAMESPACE, "secrets", "github-token"),
        )
        .await;
        expect_status_patch(&server, &source_path(), source_json(spec.clone(), None), 1).await;

        reconcile_gitsource(&mock_context(&server), source(spec))
            .await
            .unwrap();

        let status = patched_status(&server).await;
        assert_eq!(status["state"], "Initializing");
        assert_eq!(status["connection"]["state"], "Failed");
        assert_eq!(status["connection"]["reason"], "ConnectionInternalFailure");
        assert_eq!(
            status["connection"]["error"],
            "failed to fetch the secret object"
        );
    }

    #[tokio::test]
    async fn test_token_secret_validates_against_github_api() {
        let server = MockServer::start().await;
        let spec = json!({
            "url": "https://github.com/sclorg/nodejs-ex",
            "ref": "main",
            "secretRef": {"name": "github-token"}
        });
        mount_object(&server, &source_path(), source_json(spec.clone(), None)).await;
        mount_object(
            &server,
            &object_path(CORE_API, TEST_NAMESPACE, "secrets", "github-token"),
            json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": {"name": "github-token", "namespace": TEST_NAMESPACE},
                "data": {"password": "c29tZS10b2tlbg=="}
            }),
        )
        .await;
        for url_path in [
            "/user",
            "/repos/sclorg/nodejs-ex",
            "/repos/sclorg/nodejs-ex/branches/main",
        ] {
            Mock::given(method("GET"))
                .and(path(url_path))
                .and(header("Authorization", "Bearer some-token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;
        }
        expect_status_patch(&server, &source_path(), source_json(spec.clone(), None), 1).await;

        reconcile_gitsource(&mock_context(&server), source(spec))
            .await
            .unwrap();

        let status = patched_status(&server).await;
        assert_eq!(status["state"], "Initializing");
        assert_eq!(status["connection"], json!({"state": "OK"}));
    }

    #[tokio::test]
    async fn test_missing_branch_is_reported_on_status() {
        let server = MockServer::start().await;
        let spec = json!({
            "url": "https://github.com/sclorg/nodejs-ex",
            "ref": "nope",
            "secretRef": {"name": "github-token"}
        });
        mount_object(&server, &source_path(), source_json(spec.clone(), None)).await;
        mount_object(
            &server,
            &object_path(CORE_API, TEST_NAMESPACE, "secrets", "github-token"),
            json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": {"name": "github-token"},
                "stringData": {"password": "some-token"}
            }),
        )
        .await;
        for url_path in ["/user", "/repos/sclorg/nodejs-ex"] {
            Mock::given(method("GET"))
                .and(path(url_path))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/repos/sclorg/nodejs-ex/branches/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        expect_status_patch(&server, &source_path(), source_json(spec.clone(), None), 1).await;

        reconcile_gitsource(&mock_context(&server), source(spec))
            .await
            .unwrap();

        let status = patched_status(&server).await;
        assert_eq!(status["connection"]["state"], "Failed");
        assert_eq!(status["connection"]["reason"], "BranchNotFound");
    }

    #[tokio::test]
    async fn test_existing_state_is_kept() {
        let server = MockServer::start().await;
        let spec = json!({"url": "not a url"});
        mount_object(
            &server,
            &source_path(),
            source_json(spec.clone(), Some(json!({"state": "Ready"}))),
        )
        .await;
        expect_status_patch(&server, &source_path(), source_json(spec.clone(), None), 1).await;

        reconcile_gitsource(&mock_context(&server), source(spec))
            .await
            .unwrap();

        let status = patched_status(&server).await;
        assert_eq!(status["state"], "Ready");
        assert_eq!(status["connection"]["reason"], "RepoNotReachable");
    }
}
