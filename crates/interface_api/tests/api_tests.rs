//! HTTP API tests against in-memory adapters

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use proptest::prelude::*;
use serde_json::{json, Value};

use core_kernel::{OrganizationId, UserId};
use domain_customer::{
    CapabilityProbe, CreationOutcome, MockCapabilityInstaller, MockCustomerProjection,
    MockOrganizationStore, MockUserDirectory, OrganizationLifecycle, OrganizationStore, ProbeStep,
    RemoteCustomerId,
};
use interface_api::{auth::create_token, config::ApiConfig, create_router, AppState};
use test_utils::{
    assert_linked, failing_probe_step_strategy, organization_name_strategy,
    owner_email_strategy, remote_behavior_strategy, TemporalFixtures, TestRemoteCustomerBuilder,
    UserFixtures,
};

const SECRET: &str = "test-secret";

struct Harness {
    server: TestServer,
    projection: Arc<MockCustomerProjection>,
    store: Arc<MockOrganizationStore>,
    owner: UserId,
    available: bool,
}

async fn harness_with(projection: MockCustomerProjection, failing: Option<ProbeStep>) -> Harness {
    harness_for(projection, failing, Some(UserFixtures::owner_email())).await
}

async fn harness_for(
    projection: MockCustomerProjection,
    failing: Option<ProbeStep>,
    owner_email: Option<&str>,
) -> Harness {
    let owner = UserId::new();
    let projection = Arc::new(projection);
    let mut installer = MockCapabilityInstaller::new(projection.clone());
    if let Some(step) = failing {
        installer = installer.failing_step(step);
    }
    let capability = Arc::new(CapabilityProbe::run(&installer).await);

    let store = Arc::new(MockOrganizationStore::new());
    let users = match owner_email {
        Some(email) => MockUserDirectory::new().with_user(owner, email).await,
        None => MockUserDirectory::new().with_user_without_email(owner).await,
    };
    let available = capability.is_available();
    let lifecycle = OrganizationLifecycle::new(store.clone(), &capability, Arc::new(users));

    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        ..ApiConfig::default()
    };
    let state = AppState {
        lifecycle,
        capability,
        readiness: store.clone(),
        config,
    };

    Harness {
        server: TestServer::new(create_router(state)).unwrap(),
        projection,
        store,
        owner,
        available,
    }
}

async fn harness() -> Harness {
    harness_with(MockCustomerProjection::new(), None).await
}

fn bearer(user_id: UserId) -> HeaderValue {
    let token = create_token(user_id, vec![], SECRET, 3600).unwrap();
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

fn authorization() -> HeaderName {
    HeaderName::from_static("authorization")
}

impl Harness {
    async fn create(&self, name: &str) -> Value {
        let response = self
            .server
            .post("/api/v1/organizations")
            .add_header(authorization(), bearer(self.owner))
            .json(&json!({ "name": name }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    async fn delete(&self, id: &str) -> StatusCode {
        self.server
            .delete(&format!("/api/v1/organizations/{id}"))
            .add_header(authorization(), bearer(self.owner))
            .await
            .status_code()
    }
}

fn organization_id(body: &Value) -> OrganizationId {
    body["organization"]["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let h = harness().await;

    h.server.get("/health").await.assert_status_ok();
    let ready = h.server.get("/health/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["status"], "ready");
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/v1/organizations")
        .json(&json!({ "name": "Acme" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(h.store.len().await, 0);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let h = harness().await;

    let response = h
        .server
        .get(&format!("/api/v1/organizations/{}", OrganizationId::new().as_uuid()))
        .add_header(authorization(), HeaderValue::from_static("Bearer not-a-token"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_links_customer_when_available() {
    let h = harness().await;

    let body = h.create("Acme").await;

    assert_eq!(body["sync"]["status"], "linked");
    assert_eq!(body["sync"]["customer_id"], "cus_1");
    assert_eq!(body["organization"]["stripe_customer_id"], "cus_1");
    assert_eq!(body["organization"]["user_id"], h.owner.as_uuid().to_string());

    let stored = h.store.get(organization_id(&body)).await.unwrap();
    let expected = RemoteCustomerId::new("cus_1");
    assert_linked(&stored, &CreationOutcome::Linked(expected.clone()), &expected);
}

#[tokio::test]
async fn test_create_links_newest_customer_for_owner_email() {
    let older = TestRemoteCustomerBuilder::new()
        .with_id("cus_old")
        .created(TemporalFixtures::earlier())
        .build();
    let projection = MockCustomerProjection::without_created_id()
        .with_customers(vec![older])
        .await;
    let h = harness_with(projection, None).await;

    let body = h.create("Acme").await;

    assert_eq!(body["sync"]["status"], "linked");
    assert_eq!(body["organization"]["stripe_customer_id"], "cus_1");
    assert_eq!(h.projection.customers().await.len(), 2);
}

#[tokio::test]
async fn test_create_defers_when_owner_has_no_email_to_look_up() {
    let h = harness_for(MockCustomerProjection::without_created_id(), None, None).await;

    let body = h.create("Acme").await;

    assert_eq!(body["sync"]["status"], "deferred");
    assert!(body["sync"]["reason"].as_str().unwrap().contains("email"));
    assert!(body["organization"]["stripe_customer_id"].is_null());
}

#[tokio::test]
async fn test_create_defers_when_capability_unavailable() {
    let h = harness_with(MockCustomerProjection::new(), Some(ProbeStep::RegisterServer)).await;

    let body = h.create("Acme").await;

    assert_eq!(body["sync"]["status"], "deferred");
    assert!(body["organization"]["stripe_customer_id"].is_null());
    assert!(h.projection.calls().await.is_empty());
}

#[tokio::test]
async fn test_create_defers_when_remote_create_fails() {
    let h = harness_with(
        MockCustomerProjection::new().failing_create("card_declined"),
        None,
    )
    .await;

    let body = h.create("Acme").await;

    assert_eq!(body["sync"]["status"], "deferred");
    assert!(body["sync"]["reason"].as_str().unwrap().contains("card_declined"));
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_create_validates_name() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/v1/organizations")
        .add_header(authorization(), bearer(h.owner))
        .json(&json!({ "name": "" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"], "validation_error");
    assert!(h.projection.calls().await.is_empty());
}

#[tokio::test]
async fn test_owner_reads_organization() {
    let h = harness().await;
    let created = h.create("Acme").await;
    let id = created["organization"]["id"].as_str().unwrap().to_string();

    let response = h
        .server
        .get(&format!("/api/v1/organizations/{id}"))
        .add_header(authorization(), bearer(h.owner))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["stripe_customer_id"], "cus_1");
}

#[tokio::test]
async fn test_other_user_cannot_read_organization() {
    let h = harness().await;
    let created = h.create("Acme").await;
    let id = created["organization"]["id"].as_str().unwrap().to_string();

    let response = h
        .server
        .get(&format!("/api/v1/organizations/{id}"))
        .add_header(authorization(), bearer(UserId::new()))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_organization_is_not_found() {
    let h = harness().await;

    let response = h
        .server
        .get(&format!("/api/v1/organizations/{}", OrganizationId::new().as_uuid()))
        .add_header(authorization(), bearer(h.owner))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "not_found");
}

#[tokio::test]
async fn test_delete_removes_customer_and_organization() {
    let h = harness().await;
    let created = h.create("Acme").await;
    let id = created["organization"]["id"].as_str().unwrap().to_string();

    let response = h
        .server
        .delete(&format!("/api/v1/organizations/{id}"))
        .add_header(authorization(), bearer(h.owner))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(h.store.len().await, 0);
    assert!(h.projection.customers().await.is_empty());
}

#[tokio::test]
async fn test_delete_succeeds_when_remote_delete_fails() {
    let h = harness_with(
        MockCustomerProjection::new().failing_delete("rate limited"),
        None,
    )
    .await;
    let created = h.create("Acme").await;
    let id = created["organization"]["id"].as_str().unwrap().to_string();

    let response = h
        .server
        .delete(&format!("/api/v1/organizations/{id}"))
        .add_header(authorization(), bearer(h.owner))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(h.projection.delete_attempted().await);
    assert_eq!(h.store.len().await, 0);
}

#[tokio::test]
async fn test_other_user_cannot_delete_organization() {
    let h = harness().await;
    let created = h.create("Acme").await;
    let id = created["organization"]["id"].as_str().unwrap().to_string();

    let response = h
        .server
        .delete(&format!("/api/v1/organizations/{id}"))
        .add_header(authorization(), bearer(UserId::new()))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(h.store.len().await, 1);
    assert!(!h.projection.delete_attempted().await);
}

#[tokio::test]
async fn test_billing_health_reports_available() {
    let h = harness().await;

    let response = h.server.get("/health/billing").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["capability"], "available");
    assert_eq!(body["steps"].as_array().unwrap().len(), 5);
    assert_eq!(body["steps"][0]["status"], "succeeded");
}

#[tokio::test]
async fn test_billing_health_reports_failed_step() {
    let h = harness_with(MockCustomerProjection::new(), Some(ProbeStep::EnableExtension)).await;

    let response = h.server.get("/health/billing").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["capability"], "unavailable");
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["steps"][0]["status"], "failed");
    assert!(body["message"].as_str().unwrap().contains("enable extension"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let h = harness().await;

    let response = h
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-42"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "req-42");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Create answers 201 and delete 204 whatever the billing side does
    #[test]
    fn prop_lifecycle_requests_never_fail_on_billing(
        behavior in remote_behavior_strategy(),
        failing in failing_probe_step_strategy(),
        name in organization_name_strategy(),
        email in owner_email_strategy(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let h = harness_for(behavior.projection(), failing, email.as_deref()).await;

            let body = h.create(&name).await;
            let linked = h.available
                && behavior.can_link()
                && (behavior.returns_created_id || email.is_some());
            let expected_status = if linked { "linked" } else { "deferred" };
            assert_eq!(body["sync"]["status"], expected_status);
            assert_eq!(body["organization"]["stripe_customer_id"].is_string(), linked);

            let id = body["organization"]["id"].as_str().unwrap().to_string();
            assert_eq!(h.delete(&id).await, StatusCode::NO_CONTENT);
            assert_eq!(h.store.len().await, 0);
        });
    }
}
