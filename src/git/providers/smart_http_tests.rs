// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the smart-HTTP backend against a mock server.

#[cfg(test)]
mod tests {
    use crate::crd::ConnectionFailureReason;
    use crate::git::check_connection;
    use crate::git::credentials::GitCredentials;
    use crate::git::providers::smart_http::SmartHttpService;
    use crate::git::url::GitEndpoint;
    use crate::git::ProxySettings;
    use crate::git_errors::GitError;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OID: &str = "8a1c0d5e2b4f6a7c9d0e1f2a3b4c5d6e7f8a9b0c";

    fn pkt(line: &str) -> String {
        format!("{:04x}{line}", line.len() + 4)
    }

    fn advertisement(branches: &[&str]) -> String {
        let mut body = pkt("# service=git-upload-pack\n");
        body.push_str("0000");
        body.push_str(&pkt(&format!("{OID} HEAD\0multi_ack thin-pack side-band\n")));
        for branch in branches {
            body.push_str(&pkt(&format!("{OID} refs/heads/{branch}\n")));
        }
        body.push_str("0000");
        body
    }

    fn service(server: &MockServer, credentials: GitCredentials) -> SmartHttpService {
        let endpoint = GitEndpoint::parse(&format!("{}/owner/repo", server.uri())).unwrap();
        SmartHttpService::new(
            reqwest::Client::new(),
            endpoint,
            credentials,
            ProxySettings::default(),
            None,
        )
    }

    async fn mount_info_refs(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/owner/repo.git/info/refs"))
            .and(query_param("service", "git-upload-pack"))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_branch_in_advertisement_is_ok() {
        let server = MockServer::start().await;
        mount_info_refs(
            &server,
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/x-git-upload-pack-advertisement")
                .set_body_string(advertisement(&["master", "develop"])),
        )
        .await;

        let svc = service(&server, GitCredentials::Anonymous);
        // one request answers all three checks
        assert!(check_connection(&svc, "develop").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_branch() {
        let server = MockServer::start().await;
        mount_info_refs(
            &server,
            ResponseTemplate::new(200).set_body_string(advertisement(&["master"])),
        )
        .await;

        let svc = service(&server, GitCredentials::Anonymous);
        let err = check_connection(&svc, "feature").await.unwrap_err();

        assert!(matches!(err, GitError::BranchNotFound { ref branch, .. } if branch == "feature"));
    }

    #[tokio::test]
    async fn test_token_is_sent_and_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/owner/repo.git/info/refs"))
            .and(header("Authorization", "Bearer some-token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let svc = service(
            &server,
            GitCredentials::Token {
                token: "some-token".to_string(),
            },
        );
        let err = check_connection(&svc, "master").await.unwrap_err();

        assert_eq!(err.reason(), ConnectionFailureReason::BadCredentials);
    }

    #[tokio::test]
    async fn test_not_found_repository() {
        let server = MockServer::start().await;
        mount_info_refs(&server, ResponseTemplate::new(404)).await;

        let svc = service(&server, GitCredentials::Anonymous);
        let err = check_connection(&svc, "master").await.unwrap_err();

        assert_eq!(err.reason(), ConnectionFailureReason::RepoNotReachable);
    }

    #[tokio::test]
    async fn test_html_page_is_not_a_git_endpoint() {
        let server = MockServer::start().await;
        mount_info_refs(
            &server,
            ResponseTemplate::new(200).set_body_string("<html><body>Sign in</body></html>"),
        )
        .await;

        let svc = service(&server, GitCredentials::Anonymous);
        let err = check_connection(&svc, "master").await.unwrap_err();

        assert_eq!(err.reason(), ConnectionFailureReason::RepoNotReachable);
        assert!(err.to_string().contains("not a git smart-HTTP endpoint"));
    }
}
