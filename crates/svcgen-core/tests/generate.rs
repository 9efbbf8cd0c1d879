//! End-to-end generation tests for svcgen-core

use std::path::Path;

use svcgen_core::{Config, generate};
use tempfile::tempdir;

const INTERFACES: &str = r#"
interfaces:
  - name: crate::service::Keys
    methods:
      - name: get_keys
        request:
          method: GET
          path: /keys
          expected_status_codes: 200
        return_type: Vec<String>
        parameters:
          - { name: path, type: String }
          - { name: filter, type: String, query_param: { name: q } }
      - name: delete_key
        request:
          method: DELETE
          path: "/keys/{name}"
          expected_status_codes: [200, 204]
        parameters:
          - { name: name, type: String, host_param: { name: name, encoded: false } }
  - name: crate::service::Secrets
    methods:
      - name: set_secret
        request: { method: PUT, path: /secrets }
        parameters:
          - { name: a, type: String, body_param: { content_type: text/plain } }
          - { name: b, type: String, body_param: { content_type: text/plain } }
"#;

async fn write_interfaces(dir: &Path) -> String {
    let path = dir.join("interfaces.yaml");
    tokio::fs::write(&path, INTERFACES).await.unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn generates_files_and_reports_failures() -> svcgen_core::Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("generated");
    let mut config = Config::new(write_interfaces(dir.path()).await, output.to_string_lossy());
    config.emit_mod_file = true;

    let report = generate(&config).await?;
    assert_eq!(report.generated.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].interface, "crate::service::Secrets");
    assert!(report.failed[0].message.contains("set_secret"));

    let source = tokio::fs::read_to_string(output.join("keys_impl.rs")).await?;
    assert!(source.contains("pub struct KeysImpl"));
    assert!(source.contains("impl Keys for KeysImpl"));
    assert!(source.contains("pub fn delete_key_with_pipeline("));
    assert!(source.contains(".with(\"name\", &name, false)"));
    assert!(source.contains("![200, 204].contains(&status)"));
    assert!(!output.join("secrets_impl.rs").exists());

    let module = tokio::fs::read_to_string(output.join("mod.rs")).await?;
    assert!(module.contains("pub mod keys_impl;"));
    assert!(module.contains("pub use keys_impl::KeysImpl;"));
    assert!(!module.contains("secrets"));
    Ok(())
}

#[tokio::test]
async fn output_is_stable_across_runs() -> svcgen_core::Result<()> {
    let dir = tempdir()?;
    let interfaces = write_interfaces(dir.path()).await;

    let first = dir.path().join("first");
    let second = dir.path().join("second");
    generate(&Config::new(&interfaces, first.to_string_lossy())).await?;
    generate(&Config::new(&interfaces, second.to_string_lossy())).await?;

    let a = tokio::fs::read_to_string(first.join("keys_impl.rs")).await?;
    let b = tokio::fs::read_to_string(second.join("keys_impl.rs")).await?;
    assert_eq!(a, b);
    assert!(!first.join("mod.rs").exists());
    Ok(())
}

#[tokio::test]
async fn custom_template_directory_is_used() -> svcgen_core::Result<()> {
    let dir = tempdir()?;
    let templates = dir.path().join("templates");
    tokio::fs::create_dir_all(&templates).await?;
    tokio::fs::write(
        templates.join("service_impl.rs.tera"),
        "// {{ impl_name }}{% for m in methods %} {{ m.name }}{% endfor %}\n",
    )
    .await?;

    let output = dir.path().join("out");
    let mut config = Config::new(write_interfaces(dir.path()).await, output.to_string_lossy());
    config.template_dir = Some(templates.to_string_lossy().into_owned());
    generate(&config).await?;

    let source = tokio::fs::read_to_string(output.join("keys_impl.rs")).await?;
    assert_eq!(source, "// KeysImpl get_keys delete_key\n");
    Ok(())
}

#[tokio::test]
async fn missing_document_is_an_error() {
    let dir = tempdir().unwrap();
    let config = Config::new(
        dir.path().join("missing.yaml").to_string_lossy(),
        dir.path().join("out").to_string_lossy(),
    );
    assert!(generate(&config).await.is_err());
}
