// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the GitHub backend against a mock server.

#[cfg(test)]
mod tests {
    use crate::crd::ConnectionFailureReason;
    use crate::git::credentials::GitCredentials;
    use crate::git::detector::detect_build_environments;
    use crate::git::providers::github::GitHubService;
    use crate::git::providers::RepositoryService;
    use crate::git::url::GitEndpoint;
    use crate::git::{check_connection, HostingEndpoints};
    use crate::git_errors::GitError;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ANONYMOUS_HEADER: &str = "Basic YW5vbnltb3VzOg==";

    fn service(server: &MockServer, credentials: GitCredentials) -> GitHubService {
        let endpoints = HostingEndpoints {
            github_api_url: server.uri(),
            github_url: server.uri(),
            ..Default::default()
        };
        GitHubService::new(
            reqwest::Client::new(),
            &endpoints,
            GitEndpoint::parse("https://github.com/owner/repo").unwrap(),
            credentials,
        )
    }

    fn token() -> GitCredentials {
        GitCredentials::Token {
            token: "some-token".to_string(),
        }
    }

    async fn mock_get(server: &MockServer, url_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_unauthorized_user_is_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("Authorization", "Bearer some-token"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server, token());
        let err = check_connection(&svc, "master").await.unwrap_err();

        assert_eq!(err.reason(), ConnectionFailureReason::BadCredentials);
    }

    #[tokio::test]
    async fn test_missing_branch_is_branch_not_found() {
        let server = MockServer::start().await;
        mock_get(&server, "/user", 200).await;
        mock_get(&server, "/repos/owner/repo", 200).await;
        mock_get(&server, "/repos/owner/repo/branches/any", 404).await;

        let svc = service(&server, token());
        let err = check_connection(&svc, "any").await.unwrap_err();

        assert_eq!(
            err,
            GitError::BranchNotFound {
                repository: "owner/repo".to_string(),
                branch: "any".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_all_probes_succeed() {
        let server = MockServer::start().await;
        mock_get(&server, "/user", 200).await;
        mock_get(&server, "/repos/owner/repo", 200).await;
        mock_get(&server, "/repos/owner/repo/branches/master", 200).await;

        let svc = service(&server, token());
        assert!(check_connection(&svc, "master").await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticated_listing_and_languages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/contents"))
            .and(query_param("ref", "master"))
            .and(header("Authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "pom.xml", "type": "file"},
                {"name": "src", "type": "dir"},
                {"name": "README.md", "type": "file"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/languages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"HTML": 1200, "Java": 98000})),
            )
            .mount(&server)
            .await;

        let svc = service(
            &server,
            GitCredentials::Basic {
                username: "user".to_string(),
                password: "pass".to_string(),
            },
        );
        let stats = detect_build_environments(&svc, "master").await.unwrap();

        assert_eq!(stats.detected_build_types.len(), 1);
        assert_eq!(stats.detected_build_types[0].name, "Maven");
        assert_eq!(stats.sorted_languages, vec!["Java", "HTML"]);
    }

    #[tokio::test]
    async fn test_anonymous_probes_manifest_files() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/owner/repo"))
            .and(header("Authorization", ANONYMOUS_HEADER))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/owner/repo/blob/master/pom.xml"))
            .and(header("Authorization", ANONYMOUS_HEADER))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server, GitCredentials::Anonymous);
        let stats = detect_build_environments(&svc, "master").await.unwrap();

        assert_eq!(stats.detected_build_types.len(), 1);
        assert_eq!(stats.detected_build_types[0].name, "Maven");
        assert_eq!(stats.detected_build_types[0].detected_files, vec!["pom.xml"]);
        assert!(stats.sorted_languages.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_missing_repository_yields_empty_stats() {
        let server = MockServer::start().await;

        let svc = service(&server, GitCredentials::Anonymous);
        let stats = detect_build_environments(&svc, "master").await.unwrap();

        assert!(stats.detected_build_types.is_empty());
        assert!(stats.sorted_languages.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_credentials_check_is_skipped() {
        let server = MockServer::start().await;

        let svc = service(&server, GitCredentials::Anonymous);
        assert!(svc.check_credentials().await.is_ok());
    }
}
