// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes API server stand-in for reconciler tests.
//!
//! A `wiremock` server answers the REST paths the reconcilers call, so the
//! real `kube::Client` can be used without a cluster.

use crate::config::OperatorConfig;
use crate::context::Context;
use kube::Client;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TEST_NAMESPACE: &str = "myproject";
pub const TEST_APP_SERVICE_IMAGE: &str = "quay.io/example/app-service:test";

pub const DEVCONSOLE_API: &str = "/apis/devconsole.openshift.io/v1alpha1";
pub const CORE_API: &str = "/api/v1";
pub const APPS_API: &str = "/apis/apps/v1";
pub const IMAGE_API: &str = "/apis/image.openshift.io/v1";
pub const BUILD_API: &str = "/apis/build.openshift.io/v1";
pub const OPENSHIFT_APPS_API: &str = "/apis/apps.openshift.io/v1";
pub const ROUTE_API: &str = "/apis/route.openshift.io/v1";

/// Client talking to the mock server over plain HTTP.
pub fn mock_client(server: &MockServer) -> Client {
    let config = kube::Config::new(server.uri().parse().unwrap());
    Client::try_from(config).unwrap()
}

/// Context whose client and git hosting endpoints all point at the mock server.
pub fn mock_context(server: &MockServer) -> Context {
    let config = OperatorConfig {
        app_service_image: Some(TEST_APP_SERVICE_IMAGE.to_string()),
        github_api_url: server.uri(),
        github_url: server.uri(),
        gitlab_api_url: server.uri(),
        bitbucket_api_url: server.uri(),
        ..Default::default()
    };
    Context::new(mock_client(server), config).unwrap()
}

/// Collection path, e.g. `/api/v1/namespaces/myproject/services`.
pub fn collection_path(api: &str, namespace: &str, plural: &str) -> String {
    format!("{api}/namespaces/{namespace}/{plural}")
}

/// Object path, e.g. `/api/v1/namespaces/myproject/services/myapp`.
pub fn object_path(api: &str, namespace: &str, plural: &str, name: &str) -> String {
    format!("{}/{name}", collection_path(api, namespace, plural))
}

fn status_response(code: u16, reason: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    }))
}

pub fn not_found(name: &str) -> ResponseTemplate {
    status_response(404, "NotFound", &format!("\"{name}\" not found"))
}

pub fn already_exists(name: &str) -> ResponseTemplate {
    status_response(409, "AlreadyExists", &format!("\"{name}\" already exists"))
}

/// Answer a create with the submitted object.
pub fn echo_created(request: &Request) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_raw(request.body.clone(), "application/json")
}

/// `GET` of an object answers with `body`.
pub async fn mount_object(server: &MockServer, object_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(object_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// `GET` of an object answers `404 NotFound`.
pub async fn mount_missing(server: &MockServer, object_path: &str) {
    let name = object_path.rsplit('/').next().unwrap_or_default().to_string();
    Mock::given(method("GET"))
        .and(path(object_path.to_string()))
        .respond_with(not_found(&name))
        .mount(server)
        .await;
}

/// `POST` to a collection echoes the object back, exactly `times` times.
pub async fn expect_create(server: &MockServer, collection_path: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(collection_path.to_string()))
        .respond_with(echo_created)
        .expect(times)
        .mount(server)
        .await;
}

/// `PATCH` of a status subresource answers with `body`, exactly `times` times.
pub async fn expect_status_patch(server: &MockServer, object_path: &str, body: Value, times: u64) {
    Mock::given(method("PATCH"))
        .and(path(format!("{object_path}/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Requests received on `path` with `verb`, decoded as JSON.
pub async fn received_bodies(server: &MockServer, verb: &str, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == request_path)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
