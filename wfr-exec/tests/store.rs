use std::sync::Arc;

use serde_json::json;
use wfr_exec::{
    CatalogConfig, CatalogStore, OperationCatalog, OperationTable, RegistryClient, RegistryConfig,
    ReqwestHttpClient, ServiceTable, TableRefresh,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_healthy(server: &MockServer) {
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/registry/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{
                "servers": [{"url": format!("{uri}/ara"), "x-maturity": "production"}],
                "info": {
                    "title": "ARA",
                    "x-translator": {"infores": "infores:ara"},
                    "x-trapi": {"version": "1.4.0", "operations": ["lookup"]}
                }
            }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ara/query"))
        .respond_with(ResponseTemplate::new(405))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "$defs": {"OperationLookup": {"properties": {"id": {"const": "lookup"}}}}
        })))
        .mount(server)
        .await;
}

fn store(server: &MockServer) -> CatalogStore {
    let http = Arc::new(ReqwestHttpClient::default());
    let registry = RegistryClient::new(
        http.clone(),
        RegistryConfig {
            url: format!("{}/registry", server.uri()),
            ..RegistryConfig::default()
        },
    );
    let catalog = OperationCatalog::new(
        http,
        CatalogConfig {
            schema_url: format!("{}/schema", server.uri()),
            ..CatalogConfig::default()
        },
    );
    CatalogStore::new(registry, catalog)
}

#[tokio::test]
async fn refresh_replaces_both_tables() {
    let server = MockServer::start().await;
    serve_healthy(&server).await;
    let store = store(&server);
    assert!(store.services().is_empty());

    let report = store.refresh().await;
    assert_eq!(report.services, TableRefresh::Replaced { entries: 1 });
    assert_eq!(report.operations, TableRefresh::Replaced { entries: 1 });
    assert_eq!(store.services().providers_for(&"lookup".into()).len(), 1);
    assert!(store.operations().contains(&"lookup".into()));
}

#[tokio::test]
async fn failed_refresh_keeps_previous_tables() {
    let server = MockServer::start().await;
    serve_healthy(&server).await;
    let store = store(&server);
    store.refresh().await;
    let before = store.snapshot();

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = store.refresh().await;
    assert!(matches!(report.services, TableRefresh::Kept { .. }));
    assert!(matches!(report.operations, TableRefresh::Kept { .. }));

    let after = store.snapshot();
    assert!(Arc::ptr_eq(&before.services, &after.services));
    assert!(Arc::ptr_eq(&before.operations, &after.operations));
    assert_eq!(after.services.provider_count(), 1);
}

#[tokio::test]
async fn snapshots_are_unaffected_by_later_swaps() {
    let store = CatalogStore::with_tables(ServiceTable::default(), OperationTable::default());
    let held = store.snapshot();

    store.replace_operations(OperationTable::from_kinds([wfr_exec::OperationKind {
        id: "lookup".into(),
        title: "lookup".to_string(),
        description: None,
        properties: json!({}),
        additional_properties: true,
        unique: true,
    }]));

    assert!(held.operations.is_empty());
    assert!(store.operations().is_unique(&"lookup".into()));
}

#[tokio::test]
async fn static_store_ignores_refresh() {
    let store = CatalogStore::with_tables(ServiceTable::default(), OperationTable::default());
    let report = store.refresh().await;
    assert_eq!(report.services, TableRefresh::Static);
    assert!(store.spawn_refresh_loop(std::time::Duration::from_secs(60)).is_none());
}
