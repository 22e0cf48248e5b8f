// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use kube::Client;
use mongo_labeler::kube_client::install_crypto_provider;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const NAMESPACE: &str = "default";
pub const SELECTOR: &str = "role=mongo";

/// Path of the pod collection in the test namespace
pub fn pods_path() -> String {
    format!("/api/v1/namespaces/{NAMESPACE}/pods")
}

/// Path of a single pod in the test namespace
pub fn pod_path(name: &str) -> String {
    format!("{}/{name}", pods_path())
}

/// Kubernetes client talking plain HTTP to a mock API server
pub fn mock_client(server: &MockServer) -> Client {
    install_crypto_provider();
    let config = kube::Config::new(server.uri().parse().expect("mock server uri"));
    Client::try_from(config).expect("client from mock config")
}

/// Pod manifest as the API server returns it
pub fn pod_json(name: &str, primary: Option<&str>) -> Value {
    let mut labels = json!({ "role": "mongo" });
    if let Some(value) = primary {
        labels["primary"] = json!(value);
    }

    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "labels": labels,
        },
    })
}

/// One page of a pod listing; `continue_token` links to the next page
pub fn pod_list_json(pods: &[Value], continue_token: Option<&str>) -> Value {
    let mut metadata = json!({ "resourceVersion": "1000" });
    if let Some(token) = continue_token {
        metadata["continue"] = json!(token);
    }

    json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": metadata,
        "items": pods,
    })
}

/// `Status` body for a failed API call
pub fn status_json(code: u16, reason: &str, message: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Status",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    })
}
