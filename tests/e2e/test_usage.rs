use crate::e2e::helpers;

use helpers::fixtures::{images, messages, StoredUsage};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;
use uuid::Uuid;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_track_one_use_and_report_the_limit(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post("/api/usage/track", &json!({ "userId": user, "type": "image" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body.clone().unwrap(),
        json!({ "success": true, "used": 1, "limit": 5 })
    );
    assert_eq!(ctx.fixtures.usage_of(user).await.unwrap().images_used, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_deny_tracking_past_the_limit(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("pro").await.unwrap();
    ctx.fixtures.set_usage(user, images(50)).await.unwrap();

    let response = ctx
        .client
        .post("/api/usage/track", &json!({ "userId": user, "type": "image" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::FORBIDDEN)
        .assert_error_message("Image generation limit exceeded");
    assert_eq!(response.i64_field("limit"), 50);
    assert_eq!(response.i64_field("used"), 50);
    assert_eq!(ctx.fixtures.usage_of(user).await.unwrap().images_used, 50);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_never_limit_the_ultra_plan(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("ultra").await.unwrap();
    ctx.fixtures.set_usage(user, messages(10_000)).await.unwrap();

    let response = ctx
        .client
        .post("/api/usage/track", &json!({ "userId": user, "type": "message" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.i64_field("used"), 10_001);
    assert_eq!(response.i64_field("limit"), -1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_apply_free_limits_to_unknown_plans(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("enterprise").await.unwrap();

    let response = ctx
        .client
        .get(&format!("/api/usage/limits?userId={}", user))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("plan"), "free");
    assert_eq!(response.field("limits")["messages"], json!(50));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_validate_track_requests(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post("/api/usage/track", &json!({ "userId": user, "type": "video" }))
        .await
        .unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Invalid usage type. Use message, image or code.");

    let response = ctx
        .client
        .post("/api/usage/track", &json!({ "type": "message" }))
        .await
        .unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("userId is required");

    let response = ctx
        .client
        .post(
            "/api/usage/track",
            &json!({ "userId": Uuid::new_v4(), "type": "message" }),
        )
        .await
        .unwrap();
    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("User not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_plan_limits_and_counters(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("pro").await.unwrap();
    ctx.fixtures
        .set_usage(
            user,
            StoredUsage {
                messages_used: 12,
                images_used: 3,
                code_generations_used: 1,
            },
        )
        .await
        .unwrap();

    let response = ctx
        .client
        .get(&format!("/api/usage/limits?userId={}", user))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body.clone().unwrap(),
        json!({
            "plan": "pro",
            "limits": { "messages": 500, "images": 50, "codeGenerations": 50 },
            "usage": { "messagesUsed": 12, "imagesUsed": 3, "codeGenerationsUsed": 1 }
        })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_zero_usage_for_a_new_user(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .get(&format!("/api/usage/limits?userId={}", user))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.field("usage").clone(),
        json!({ "messagesUsed": 0, "imagesUsed": 0, "codeGenerationsUsed": 0 })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_counting_over_in_a_new_period(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free").await.unwrap();
    ctx.fixtures.set_stale_usage(user, messages(50)).await.unwrap();

    // A full counter from last period does not count against this one
    let response = ctx
        .client
        .get(&format!("/api/usage/limits?userId={}", user))
        .await
        .unwrap();
    assert_eq!(response.field("usage")["messagesUsed"], json!(0));

    let response = ctx
        .client
        .post("/api/usage/track", &json!({ "userId": user, "type": "message" }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.i64_field("used"), 1);

    let usage = ctx.fixtures.usage_of(user).await.unwrap();
    assert_eq!(usage, messages(1));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_admit_exactly_one_of_many_concurrent_reservations_at_the_edge(
    ctx: &TestContext,
) {
    let user = ctx.fixtures.create_user("free").await.unwrap();
    ctx.fixtures.set_usage(user, messages(49)).await.unwrap();

    let mut requests = Vec::new();
    for _ in 0..10 {
        let client = ctx.client.clone();
        requests.push(async move {
            client
                .post("/api/usage/track", &json!({ "userId": user, "type": "message" }))
                .await
        });
    }

    let results = futures::future::join_all(requests).await;

    let statuses: Vec<StatusCode> = results.into_iter().map(|r| r.unwrap().status).collect();
    let admitted = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let denied = statuses
        .iter()
        .filter(|s| **s == StatusCode::FORBIDDEN)
        .count();

    assert_eq!(admitted, 1, "statuses: {:?}", statuses);
    assert_eq!(denied, 9, "statuses: {:?}", statuses);
    assert_eq!(ctx.fixtures.usage_of(user).await.unwrap().messages_used, 50);
}
