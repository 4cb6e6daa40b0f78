// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::constants::{API_GROUP, API_GROUP_VERSION, API_VERSION};
    use crate::crd::*;
    use kube::{CustomResourceExt, Resource};
    use serde_json::json;

    #[test]
    fn test_crd_names_and_scope() {
        let crds = [
            (GitSource::crd(), "gitsources.devconsole.openshift.io", "GitSource"),
            (
                GitSourceAnalysis::crd(),
                "gitsourceanalyses.devconsole.openshift.io",
                "GitSourceAnalysis",
            ),
            (Component::crd(), "components.devconsole.openshift.io", "Component"),
            (
                DevopsConsole::crd(),
                "devopsconsoles.devconsole.openshift.io",
                "DevopsConsole",
            ),
            (Installer::crd(), "installers.devconsole.openshift.io", "Installer"),
            (
                Environment::crd(),
                "environments.devconsole.openshift.io",
                "Environment",
            ),
            (
                EnvDeployment::crd(),
                "envdeployments.devconsole.openshift.io",
                "EnvDeployment",
            ),
        ];

        for (crd, name, kind) in crds {
            assert_eq!(crd.metadata.name.as_deref(), Some(name));
            assert_eq!(crd.spec.group, API_GROUP);
            assert_eq!(crd.spec.names.kind, kind);
            assert_eq!(crd.spec.scope, "Namespaced");
            assert_eq!(crd.spec.versions[0].name, API_VERSION);
        }
    }

    #[test]
    fn test_api_version() {
        assert_eq!(GitSource::api_version(&()), API_GROUP_VERSION);
        assert_eq!(EnvDeployment::api_version(&()), API_GROUP_VERSION);
    }

    #[test]
    fn test_status_subresources() {
        let with_status = |crd: k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition| {
            crd.spec.versions[0]
                .subresources
                .as_ref()
                .and_then(|s| s.status.as_ref())
                .is_some()
        };

        assert!(with_status(GitSource::crd()));
        assert!(with_status(GitSourceAnalysis::crd()));
        assert!(with_status(Component::crd()));
        assert!(with_status(Installer::crd()));
        assert!(with_status(EnvDeployment::crd()));
        assert!(!with_status(Environment::crd()));
    }

    #[test]
    fn test_git_source_spec_field_names() {
        let spec: GitSourceSpec = serde_json::from_value(json!({
            "url": "git@github.com:sclorg/nodejs-ex.git",
            "ref": "v1.0",
            "contextDir": "app",
            "httpsProxy": "http://proxy:3128",
            "secretRef": {"name": "ssh-key"}
        }))
        .unwrap();

        assert_eq!(spec.git_ref.as_deref(), Some("v1.0"));
        assert_eq!(spec.context_dir.as_deref(), Some("app"));
        assert_eq!(spec.https_proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(spec.secret_ref.unwrap().name, "ssh-key");

        let value = serde_json::to_value(GitSourceSpec {
            url: "https://github.com/o/r".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(value, json!({"url": "https://github.com/o/r"}));
    }

    #[test]
    fn test_git_ref_or_default() {
        let mut spec = GitSourceSpec::default();
        assert_eq!(spec.git_ref_or_default(), "master");

        spec.git_ref = Some(String::new());
        assert_eq!(spec.git_ref_or_default(), "master");

        spec.git_ref = Some("develop".to_string());
        assert_eq!(spec.git_ref_or_default(), "develop");
    }

    #[test]
    fn test_connection_serialization() {
        assert_eq!(
            serde_json::to_value(Connection::ok()).unwrap(),
            json!({"state": "OK"})
        );
        assert_eq!(
            serde_json::to_value(Connection::failed(
                ConnectionFailureReason::BadCredentials,
                "bad token"
            ))
            .unwrap(),
            json!({"state": "Failed", "reason": "BadCredentials", "error": "bad token"})
        );
        assert_eq!(
            serde_json::to_value(Connection::default()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_connection_helpers() {
        assert!(Connection::ok().is_ok());
        assert!(!Connection::default().is_ok());

        let failed = Connection::failed(ConnectionFailureReason::RepoNotReachable, "gone");
        assert!(!failed.is_ok());
        assert_eq!(failed.reason.unwrap().to_string(), "RepoNotReachable");
    }

    #[test]
    fn test_git_source_status_deserialization() {
        let status: GitSourceStatus = serde_json::from_value(json!({
            "state": "Ready",
            "connection": {"state": "Failed", "reason": "BranchNotFound", "error": "no ref"}
        }))
        .unwrap();

        assert_eq!(status.state, Some(GitSourceState::Ready));
        assert_eq!(
            status.connection.reason,
            Some(ConnectionFailureReason::BranchNotFound)
        );

        let empty: GitSourceStatus = serde_json::from_value(json!({})).unwrap();
        assert!(empty.state.is_none());
        assert!(empty.connection.state.is_none());
    }

    #[test]
    fn test_analysis_status_serialization() {
        let status = GitSourceAnalysisStatus {
            analyzed: true,
            error: None,
            build_env_statistics: BuildEnvStats {
                detected_build_types: vec![DetectedBuildType {
                    name: "Maven".to_string(),
                    language: "Java".to_string(),
                    detected_files: vec!["pom.xml".to_string()],
                }],
                sorted_languages: vec!["Java".to_string()],
            },
        };

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["analyzed"], true);
        assert!(value.get("error").is_none());
        assert_eq!(
            value["buildEnvStatistics"]["detectedBuildTypes"][0]["detectedFiles"],
            json!(["pom.xml"])
        );
    }

    #[test]
    fn test_component_spec() {
        let spec: ComponentSpec = serde_json::from_value(json!({
            "buildType": "java",
            "gitSourceRef": "spring-petclinic",
            "port": 8080
        }))
        .unwrap();

        assert_eq!(spec.build_type, "java");
        assert_eq!(spec.git_source_ref, "spring-petclinic");
        assert_eq!(spec.port, Some(8080));

        let empty: ComponentSpec = serde_json::from_value(json!({})).unwrap();
        assert!(empty.build_type.is_empty());
        assert!(empty.port.is_none());
    }

    #[test]
    fn test_environment_type_is_serialized_as_name() {
        let spec: EnvironmentSpec = serde_json::from_value(json!({
            "name": "stage",
            "cluster": {"name": "east", "serverAddress": "https://api.east:6443"},
            "namespace": "myapp-stage"
        }))
        .unwrap();

        assert_eq!(spec.r#type.as_deref(), Some("stage"));
        assert_eq!(
            spec.cluster.unwrap().server_address.as_deref(),
            Some("https://api.east:6443")
        );
    }

    #[test]
    fn test_env_deployment_spec() {
        let spec: EnvDeploymentSpec = serde_json::from_value(json!({
            "environmentRef": {"apiGroup": "devconsole.openshift.io", "kind": "Environment", "name": "stage"},
            "deploymentRef": {"kind": "DeploymentConfig", "name": "myapp"}
        }))
        .unwrap();

        assert_eq!(
            spec.environment_ref.api_group.as_deref(),
            Some("devconsole.openshift.io")
        );
        assert_eq!(spec.deployment_ref.kind, "DeploymentConfig");
        assert!(spec.deployment_ref.api_group.is_none());
    }
}
