// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `envdeployment.rs`

#[cfg(test)]
mod tests {
    use crate::crd::EnvDeployment;
    use crate::reconcilers::api_mock::{
        expect_status_patch, mock_context, mount_missing, mount_object, object_path,
        received_bodies, APPS_API, DEVCONSOLE_API, OPENSHIFT_APPS_API, TEST_NAMESPACE,
    };
    use crate::reconcilers::envdeployment::{reconcile_envdeployment, Resolution};
    use serde_json::{json, Value};
    use wiremock::MockServer;

    const NAME: &str = "myapp-stage";

    fn env_deployment_json(deployment_kind: &str, status: Option<Value>) -> Value {
        let mut env_deployment = json!({
            "apiVersion": "devconsole.openshift.io/v1alpha1",
            "kind": "EnvDeployment",
            "metadata": {"name": NAME, "namespace": TEST_NAMESPACE, "generation": 2},
            "spec": {
                "environmentRef": {"kind": "Environment", "name": "stage"},
                "deploymentRef": {"kind": deployment_kind, "name": "myapp"}
            }
        });
        if let Some(status) = status {
            env_deployment["status"] = status;
        }
        env_deployment
    }

    fn env_deployment(deployment_kind: &str) -> EnvDeployment {
        serde_json::from_value(env_deployment_json(deployment_kind, None)).unwrap()
    }

    fn env_deployment_path() -> String {
        object_path(DEVCONSOLE_API, TEST_NAMESPACE, "envdeployments", NAME)
    }

    fn environment_path() -> String {
        object_path(DEVCONSOLE_API, TEST_NAMESPACE, "environments", "stage")
    }

    async fn mount_environment(server: &MockServer) {
        mount_object(
            server,
            &environment_path(),
            json!({
                "apiVersion": "devconsole.openshift.io/v1alpha1",
                "kind": "Environment",
                "metadata": {"name": "stage", "namespace": TEST_NAMESPACE},
                "spec": {"name": "stage"}
            }),
        )
        .await;
    }

    async fn expect_patch(server: &MockServer) {
        expect_status_patch(
            server,
            &env_deployment_path(),
            env_deployment_json("Deployment", None),
            1,
        )
        .await;
    }

    async fn ready_condition(server: &MockServer) -> Value {
        let patches = received_bodies(
            server,
            "PATCH",
            &format!("{}/status", env_deployment_path()),
        )
        .await;
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0]["status"]["observedGeneration"], 2);
        let conditions = patches[0]["status"]["conditions"].as_array().unwrap().clone();
        assert_eq!(conditions.len(), 1);
        conditions[0].clone()
    }

    #[test]
    fn test_resolution_reasons() {
        let resolved = Resolution::Resolved {
            environment: "stage".to_string(),
            deployment: "Deployment myapp".to_string(),
        };
        assert_eq!(resolved.status(), "True");
        assert_eq!(resolved.reason(), "Resolved");
        assert_eq!(
            resolved.message(),
            "Deployment myapp is bound to environment stage"
        );

        let missing = Resolution::DeploymentNotFound {
            kind: "DeploymentConfig".to_string(),
            name: "myapp".to_string(),
        };
        assert_eq!(missing.status(), "False");
        assert_eq!(missing.reason(), "DeploymentNotFound");
        assert_eq!(missing.message(), "DeploymentConfig myapp not found");

        let unsupported = Resolution::UnsupportedKind {
            kind: "StatefulSet".to_string(),
        };
        assert_eq!(unsupported.reason(), "UnsupportedKind");
        assert!(unsupported.message().starts_with("unsupported kind StatefulSet"));
    }

    #[tokio::test]
    async fn test_resolved_deployment() {
        let server = MockServer::start().await;
        mount_object(
            &server,
            &env_deployment_path(),
            env_deployment_json("Deployment", None),
        )
        .await;
        mount_environment(&server).await;
        mount_object(
            &server,
            &object_path(APPS_API, TEST_NAMESPACE, "deployments", "myapp"),
            json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": {"name": "myapp", "namespace": TEST_NAMESPACE}
            }),
        )
        .await;
        expect_patch(&server).await;

        reconcile_envdeployment(&mock_context(&server), env_deployment("Deployment"))
            .await
            .unwrap();

        let condition = ready_condition(&server).await;
        assert_eq!(condition["type"], "Ready");
        assert_eq!(condition["status"], "True");
        assert_eq!(condition["reason"], "Resolved");
        assert!(condition["lastTransitionTime"].is_string());
    }

    #[tokio::test]
    async fn test_missing_environment() {
        let server = MockServer::start().await;
        mount_object(
            &server,
            &env_deployment_path(),
            env_deployment_json("Deployment", None),
        )
        .await;
        mount_missing(&server, &environment_path()).await;
        expect_patch(&server).await;

        reconcile_envdeployment(&mock_context(&server), env_deployment("Deployment"))
            .await
            .unwrap();

        let condition = ready_condition(&server).await;
        assert_eq!(condition["status"], "False");
        assert_eq!(condition["reason"], "EnvironmentNotFound");
        assert_eq!(condition["message"], "Environment stage not found");
    }

    #[tokio::test]
    async fn test_missing_deployment_config() {
        let server = MockServer::start().await;
        mount_object(
            &server,
            &env_deployment_path(),
            env_deployment_json("DeploymentConfig", None),
        )
        .await;
        mount_environment(&server).await;
        mount_missing(
            &server,
            &object_path(OPENSHIFT_APPS_API, TEST_NAMESPACE, "deploymentconfigs", "myapp"),
        )
        .await;
        expect_patch(&server).await;

        reconcile_envdeployment(
            &mock_context(&server),
            env_deployment("DeploymentConfig"),
        )
        .await
        .unwrap();

        let condition = ready_condition(&server).await;
        assert_eq!(condition["reason"], "DeploymentNotFound");
        assert_eq!(condition["message"], "DeploymentConfig myapp not found");
    }

    #[tokio::test]
    async fn test_unsupported_workload_kind() {
        let server = MockServer::start().await;
        mount_object(
            &server,
            &env_deployment_path(),
            env_deployment_json("StatefulSet", None),
        )
        .await;
        mount_environment(&server).await;
        expect_patch(&server).await;

        reconcile_envdeployment(&mock_context(&server), env_deployment("StatefulSet"))
            .await
            .unwrap();

        let condition = ready_condition(&server).await;
        assert_eq!(condition["reason"], "UnsupportedKind");
    }

    #[tokio::test]
    async fn test_unchanged_status_is_not_patched() {
        let server = MockServer::start().await;
        let status = json!({
            "conditions": [{
                "type": "Ready",
                "status": "False",
                "reason": "EnvironmentNotFound",
                "message": "Environment stage not found",
                "lastTransitionTime": "2025-01-01T00:00:00+00:00"
            }],
            "observedGeneration": 2
        });
        mount_object(
            &server,
            &env_deployment_path(),
            env_deployment_json("Deployment", Some(status)),
        )
        .await;
        mount_missing(&server, &environment_path()).await;
        expect_status_patch(&server, &env_deployment_path(), json!({}), 0).await;

        reconcile_envdeployment(&mock_context(&server), env_deployment("Deployment"))
            .await
            .unwrap();
    }
}
