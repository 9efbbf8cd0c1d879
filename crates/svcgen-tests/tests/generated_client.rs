//! Runs the rendered `KeysImpl` against recording pipelines.

use std::sync::{Arc, Mutex};

use svcgen_runtime::{HttpMethod, HttpPipeline, HttpRequest, HttpResponse, PipelineError, ServiceError};
use svcgen_tests::models::HttpRequest as Context;
use svcgen_tests::service::Keys;
use svcgen_tests::KeysImpl;

/// Pipeline answering every request with `status` and recording what it saw
fn recording(status: u16, body: &'static str) -> (Arc<dyn HttpPipeline>, Arc<Mutex<Vec<HttpRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let pipeline = move |request: HttpRequest| -> Result<HttpResponse, PipelineError> {
        log.lock().unwrap().push(request);
        Ok(HttpResponse::new(status).with_body(body))
    };
    (Arc::new(pipeline), seen)
}

#[test]
fn get_keys_sends_query_and_decodes_lines() {
    let (pipeline, seen) = recording(200, "a\nb\n");
    let client = KeysImpl::get_instance(pipeline);

    let keys = client.get_keys("/ignored".into(), "pre fix".into()).unwrap();
    assert_eq!(keys, vec!["a", "b"]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method(), HttpMethod::Get);
    assert_eq!(seen[0].url(), "/keys?q=pre%20fix");
    assert!(seen[0].headers().is_empty());
    assert!(seen[0].body().is_none());
}

#[test]
fn unexpected_status_carries_the_code() {
    let (pipeline, _) = recording(201, "");
    let err = KeysImpl::get_instance(pipeline)
        .get_keys(String::new(), "x".into())
        .unwrap_err();
    assert_eq!(err.status(), Some(201));
    assert_eq!(err.to_string(), "Unexpected response code: 201 (expected one of [200])");
}

#[test]
fn put_key_fills_host_headers_query_and_body() {
    let (pipeline, seen) = recording(201, "");
    let client = KeysImpl::get_instance(pipeline);
    client
        .put_key(
            "https://vault.example".into(),
            "my key",
            7,
            vec!["1".into(), "a b".into()],
            b"secret",
        )
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method(), HttpMethod::Put);
    assert_eq!(
        seen[0].url(),
        "https://vault.example/keys/my%20key?tag=1&tag=a%20b"
    );
    assert_eq!(seen[0].headers().get("accept"), Some("application/json"));
    assert_eq!(seen[0].headers().get("X-Request-Id"), Some("7"));
    assert_eq!(seen[0].body(), Some(&b"secret"[..]));
    assert_eq!(seen[0].content_type(), Some("application/octet-stream"));
}

#[test]
fn status_set_rejects_non_members() {
    let (pipeline, _) = recording(400, "");
    let err = KeysImpl::get_instance(pipeline)
        .put_key("v".into(), "n", 1, Vec::new(), b"k")
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnexpectedStatus { status: 400, .. }));
}

#[test]
fn head_key_maps_empty_body_to_none() {
    let (pipeline, seen) = recording(404, "");
    let found = KeysImpl::get_instance(pipeline)
        .head_key("a b".into(), Context::default())
        .unwrap();
    assert_eq!(found, None);
    assert_eq!(seen.lock().unwrap()[0].url(), "/keys/a%20b");

    let (pipeline, _) = recording(200, "present");
    let found = KeysImpl::get_instance(pipeline)
        .head_key("k".into(), Context::default())
        .unwrap();
    assert_eq!(found.as_deref(), Some("present"));
}

#[test]
fn methods_without_requests_keep_trait_defaults() {
    let (pipeline, seen) = recording(200, "");
    assert_eq!(KeysImpl::get_instance(pipeline).describe().unwrap(), "keys");
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn pipeline_errors_propagate_unchanged() {
    let pipeline: Arc<dyn HttpPipeline> = Arc::new(|_: HttpRequest| -> Result<HttpResponse, PipelineError> {
        Err("connection reset".into())
    });
    let err = KeysImpl::get_instance(pipeline)
        .get_keys(String::new(), String::new())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Pipeline(_)));
    assert_eq!(err.to_string(), "connection reset");
}

#[test]
fn explicit_pipeline_overrides_default() {
    let (default, default_seen) = recording(200, "");
    let (other, other_seen) = recording(200, "z");
    let client = KeysImpl::get_instance(default);

    let keys = client
        .get_keys_with_pipeline(&other, String::new(), "f".into())
        .unwrap();
    assert_eq!(keys, vec!["z"]);
    assert!(default_seen.lock().unwrap().is_empty());
    assert_eq!(other_seen.lock().unwrap().len(), 1);
}

#[test]
fn one_instance_per_pipeline() {
    let (first, _) = recording(200, "");
    let (second, _) = recording(200, "");

    let a = KeysImpl::get_instance(Arc::clone(&first));
    let b = KeysImpl::get_instance(Arc::clone(&first));
    let c = KeysImpl::get_instance(second);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
}
