// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `resources.rs`

#[cfg(test)]
mod tests {
    use crate::crd::GitSource;
    use crate::reconcilers::api_mock::{
        already_exists, collection_path, expect_create, expect_status_patch, mock_client,
        mount_missing, mount_object, object_path, received_bodies, CORE_API, DEVCONSOLE_API,
        TEST_NAMESPACE,
    };
    use crate::reconcilers::resources::{create_if_missing, get_optional, patch_status};
    use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer};

    const TEST_NAME: &str = "myapp";

    fn test_service() -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(TEST_NAME.to_string()),
                namespace: Some(TEST_NAMESPACE.to_string()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                ports: Some(vec![ServicePort {
                    port: 8080,
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn service_path() -> String {
        object_path(CORE_API, TEST_NAMESPACE, "services", TEST_NAME)
    }

    #[tokio::test]
    async fn test_get_optional_returns_none_on_not_found() {
        let server = MockServer::start().await;
        mount_missing(&server, &service_path()).await;

        let found: Option<Service> = get_optional(&mock_client(&server), TEST_NAMESPACE, TEST_NAME)
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_optional_returns_object() {
        let server = MockServer::start().await;
        mount_object(
            &server,
            &service_path(),
            serde_json::to_value(test_service()).unwrap(),
        )
        .await;

        let found: Option<Service> = get_optional(&mock_client(&server), TEST_NAMESPACE, TEST_NAME)
            .await
            .unwrap();

        assert_eq!(found.unwrap().metadata.name.as_deref(), Some(TEST_NAME));
    }

    #[tokio::test]
    async fn test_create_if_missing_creates_when_absent() {
        let server = MockServer::start().await;
        mount_missing(&server, &service_path()).await;
        let services = collection_path(CORE_API, TEST_NAMESPACE, "services");
        expect_create(&server, &services, 1).await;

        let created = create_if_missing(&mock_client(&server), TEST_NAMESPACE, &test_service())
            .await
            .unwrap();

        assert_eq!(created.metadata.name.as_deref(), Some(TEST_NAME));
        let bodies = received_bodies(&server, "POST", &services).await;
        assert_eq!(bodies[0]["spec"]["ports"][0]["port"], 8080);
    }

    #[tokio::test]
    async fn test_create_if_missing_skips_existing() {
        let server = MockServer::start().await;
        let mut existing = test_service();
        existing.metadata.resource_version = Some("42".to_string());
        mount_object(&server, &service_path(), serde_json::to_value(existing).unwrap()).await;
        expect_create(
            &server,
            &collection_path(CORE_API, TEST_NAMESPACE, "services"),
            0,
        )
        .await;

        let found = create_if_missing(&mock_client(&server), TEST_NAMESPACE, &test_service())
            .await
            .unwrap();

        assert_eq!(found.metadata.resource_version.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_create_if_missing_tolerates_already_exists() {
        let server = MockServer::start().await;
        mount_missing(&server, &service_path()).await;
        Mock::given(method("POST"))
            .and(path(collection_path(CORE_API, TEST_NAMESPACE, "services")))
            .respond_with(already_exists(TEST_NAME))
            .expect(1)
            .mount(&server)
            .await;

        let result = create_if_missing(&mock_client(&server), TEST_NAMESPACE, &test_service()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_if_missing_requires_name() {
        let server = MockServer::start().await;
        let unnamed = Service::default();

        let result = create_if_missing(&mock_client(&server), TEST_NAMESPACE, &unnamed).await;

        assert!(result.unwrap_err().to_string().contains("must have a name"));
    }

    #[tokio::test]
    async fn test_patch_status_wraps_status_in_merge_patch() {
        let server = MockServer::start().await;
        let source_path = object_path(DEVCONSOLE_API, TEST_NAMESPACE, "gitsources", "nodejs-ex");
        expect_status_patch(
            &server,
            &source_path,
            json!({
                "apiVersion": "devconsole.openshift.io/v1alpha1",
                "kind": "GitSource",
                "metadata": {"name": "nodejs-ex", "namespace": TEST_NAMESPACE},
                "spec": {"url": "https://github.com/sclorg/nodejs-ex"}
            }),
            1,
        )
        .await;

        patch_status::<GitSource>(
            &mock_client(&server),
            TEST_NAMESPACE,
            "nodejs-ex",
            json!({"state": "Initializing"}),
        )
        .await
        .unwrap();

        let bodies = received_bodies(&server, "PATCH", &format!("{source_path}/status")).await;
        assert_eq!(bodies, vec![json!({"status": {"state": "Initializing"}})]);
    }
}
