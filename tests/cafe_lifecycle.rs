use ::cafe_provider::testing::{
    assert_plan_changes_attribute, assert_plan_creates, assert_plan_does_not_change_attribute,
    assert_plan_no_changes, assert_plan_updates_in_place, MockCafeClient, ProviderTester,
};
use ::cafe_provider::{
    CafeClient, CafeProvider, CafeResource, Operation, ProviderData, ProviderError, Resource,
};
use ::serde_json::{json, Value};
use ::std::sync::Arc;
use ::tokio_test::{assert_err, assert_ok};

const CAFE: &str = "hashicups_cafe";

fn sample_config() -> Value {
    json!({
        "name": "Sample Cafe",
        "address": "123 Coffee St",
        "description": "A cozy place",
        "image": "http://example.com/image.jpg"
    })
}

fn tester() -> (Arc<MockCafeClient>, ProviderTester<CafeProvider>) {
    let mock = Arc::new(MockCafeClient::starting_at(42));
    let tester = ProviderTester::new(CafeProvider::with_client(mock.clone()));
    (mock, tester)
}

#[tokio::test]
async fn create_sample_cafe() {
    let (_, tester) = tester();
    assert_ok!(tester.configure(json!({})).await);

    let state = tester.lifecycle_create(CAFE, sample_config()).await.unwrap();

    assert_eq!(
        state,
        json!({
            "id": 42,
            "name": "Sample Cafe",
            "address": "123 Coffee St",
            "description": "A cozy place",
            "image": "http://example.com/image.jpg"
        })
    );
}

#[tokio::test]
async fn create_failure_persists_nothing() {
    let (mock, tester) = tester();
    mock.fail_on(Operation::Create, "quota exceeded");

    let err = tester.create(CAFE, sample_config()).await.unwrap_err();
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.summary, "Error creating cafe");
    assert_eq!(
        diagnostic.detail.as_deref(),
        Some("Could not create cafe, unexpected error: quota exceeded")
    );

    let listed = tester.read_data_source("hashicups_cafes", json!({})).await.unwrap();
    assert_eq!(listed, json!({"cafes": []}));
}

#[tokio::test]
async fn read_is_idempotent() {
    let (_, tester) = tester();
    let state = tester.create(CAFE, sample_config()).await.unwrap();

    let first = tester.read(CAFE, state.clone()).await.unwrap();
    let second = tester.read(CAFE, first.clone()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, state);
}

#[tokio::test]
async fn read_unknown_id_is_not_found() {
    let (_, tester) = tester();
    let err = tester.read(CAFE, json!({"id": 999})).await.unwrap_err();
    assert!(err.is_not_found(), "{:?}", err);
}

#[tokio::test]
async fn read_after_out_of_band_delete_is_not_found() {
    let (mock, tester) = tester();
    let state = tester.create(CAFE, sample_config()).await.unwrap();
    assert!(mock.remove(42));

    let err = tester.read(CAFE, state).await.unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)));
}

#[tokio::test]
async fn update_round_trips_through_read() {
    let (_, tester) = tester();
    let created = tester.lifecycle_create(CAFE, sample_config()).await.unwrap();

    let mut proposed = sample_config();
    proposed["name"] = json!("Renamed Cafe");
    proposed["description"] = json!("Now with pastries");

    let plan = tester.plan_update(CAFE, created.clone(), proposed.clone()).await.unwrap();
    assert_plan_updates_in_place(&plan);
    assert_plan_changes_attribute(&plan, "name");
    assert_plan_changes_attribute(&plan, "description");
    assert_plan_does_not_change_attribute(&plan, "id");
    assert_eq!(plan.planned_state["id"], 42);

    let updated = tester.lifecycle_update(CAFE, created, proposed).await.unwrap();
    assert_eq!(updated["id"], 42);
    assert_eq!(updated["name"], "Renamed Cafe");
    assert_eq!(updated["description"], "Now with pastries");
    assert_eq!(updated["address"], "123 Coffee St");
}

#[tokio::test]
async fn update_with_partial_response_reads_back() {
    let mock = Arc::new(MockCafeClient::starting_at(42).with_partial_updates());
    let tester = ProviderTester::new(CafeProvider::with_client(mock.clone()));
    let created = tester.create(CAFE, sample_config()).await.unwrap();

    let mut planned = created.clone();
    planned["address"] = json!("9 New Rd");
    let updated = tester.update(CAFE, created, planned).await.unwrap();

    assert_eq!(updated["address"], "9 New Rd");
    assert_eq!(updated["name"], "Sample Cafe");
    assert_eq!(mock.calls(), vec!["create", "update", "get_by_id"]);
}

#[tokio::test]
async fn delete_then_read_is_not_found() {
    let (_, tester) = tester();
    let created = tester.create(CAFE, sample_config()).await.unwrap();

    let plan = tester.plan_delete(CAFE, created.clone()).await.unwrap();
    assert!(plan.planned_state.is_null());

    assert_ok!(tester.delete(CAFE, created.clone()).await);
    let err = tester.read(CAFE, created).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn full_crud_lifecycle() {
    let (mock, tester) = tester();
    let final_state = tester
        .lifecycle_crud(CAFE, sample_config(), json!({"name": "Second Name"}))
        .await
        .unwrap();

    assert_eq!(final_state["name"], "Second Name");
    assert_eq!(final_state["id"], 42);
    assert!(mock.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn plan_create_and_no_op() {
    let (_, tester) = tester();
    let plan = tester.plan_create(CAFE, sample_config()).await.unwrap();
    assert_plan_creates(&plan);
    assert!(plan.planned_state["id"].is_null());

    let state = tester.create(CAFE, plan.planned_state).await.unwrap();
    let plan = tester.plan_update(CAFE, state.clone(), state).await.unwrap();
    assert_plan_no_changes(&plan);
}

#[tokio::test]
async fn missing_id_is_conversion_error() {
    let (_, tester) = tester();
    let err = tester.delete(CAFE, json!({"name": "No id"})).await.unwrap_err();
    assert!(matches!(err, ProviderError::Conversion { .. }));

    let err = tester.read(CAFE, json!({"id": "abc"})).await.unwrap_err();
    assert_eq!(err.to_diagnostic().attribute.as_deref(), Some("id"));
}

#[tokio::test]
async fn import_existing_cafe() {
    let (_, tester) = tester();
    let created = tester.create(CAFE, sample_config()).await.unwrap();

    let imported = tester.import_resource(CAFE, "42").await.unwrap();
    assert_eq!(imported[0].state, created);

    let err = tester.import_resource(CAFE, "43").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn configure_without_provider_data_is_noop() {
    let resource = CafeResource::new();
    assert_ok!(resource.configure(None));
    assert!(!resource.is_configured());

    let err = resource.create(sample_config()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Configuration(_)));
}

#[tokio::test]
async fn configure_with_wrong_type_reports_one_diagnostic() {
    let resource = CafeResource::new();
    let data = ProviderData::new(String::from("not a client"));

    let err = assert_err!(resource.configure(Some(&data)));
    assert!(matches!(err, ProviderError::UnexpectedProviderData { .. }));

    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.summary, "Unexpected Resource Configure Type");
    assert!(diagnostic.detail.unwrap().contains("String"));
    assert!(!resource.is_configured());
}

#[tokio::test]
async fn validate_resource_config_rejects_computed_id() {
    let (_, tester) = tester();
    assert_ok!(tester.validate_resource_config(CAFE, sample_config()).await);
    assert_err!(
        tester
            .validate_resource_config(CAFE, json!({"id": 7, "name": "x"}))
            .await
    );
}
