use crate::e2e::helpers;

use assistant_gateway::infrastructure::providers::ProviderErrorKind;
use helpers::fakes::FakeProvider;
use helpers::fixtures::images;
use helpers::{Chains, TestContext, VENDOR_IMAGE_URL};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_the_vendor_image(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post(
            "/api/image",
            &json!({ "prompt": "a cat on a sunny beach", "userId": user }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("imageUrl"), VENDOR_IMAGE_URL);
    assert_eq!(response.str_field("provider"), "vendor");
    assert_eq!(ctx.fixtures.usage_of(user).await.unwrap().images_used, 1);
}

#[tokio::test]
async fn it_should_try_the_next_vendor_on_any_failure() {
    let first = FakeProvider::failing("first", 10, ProviderErrorKind::InvalidRequest);
    let second = FakeProvider::answering("second", 20, "https://images.test/second.png");
    let ctx = TestContext::with_chains(Chains {
        image: vec![first.clone(), second.clone()],
        ..Chains::default()
    })
    .await
    .unwrap();
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post("/api/image", &json!({ "prompt": "a red bicycle", "userId": user }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("provider"), "second");
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[tokio::test]
async fn it_should_fall_back_to_emoji_art_when_vendors_fail() {
    let vendor = FakeProvider::failing("vendor", 10, ProviderErrorKind::ServiceUnavailable);
    let ctx = TestContext::with_chains(Chains {
        image: vec![vendor.clone()],
        ..Chains::default()
    })
    .await
    .unwrap();
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post("/api/image", &json!({ "prompt": "a cat and a dog", "userId": user }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("provider"), "emoji");
    assert!(response
        .str_field("imageUrl")
        .starts_with("data:image/svg+xml;utf8,"));
    // Images are single-attempt
    assert_eq!(vendor.calls(), 1);
}

#[tokio::test]
async fn it_should_return_a_placeholder_when_nothing_can_draw() {
    let ctx = TestContext::with_chains(Chains {
        image: vec![FakeProvider::failing(
            "vendor",
            10,
            ProviderErrorKind::QuotaExceeded,
        )],
        emoji_fallback: false,
        ..Chains::default()
    })
    .await
    .unwrap();
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post("/api/image", &json!({ "prompt": "mountain lake", "userId": user }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("provider"), "placeholder");
    assert_eq!(
        response.str_field("imageUrl"),
        "https://via.placeholder.com/512/667eea/ffffff?text=mountain%20lake"
    );
}

#[tokio::test]
async fn it_should_draw_emoji_mode_locally() {
    let vendor = FakeProvider::answering("vendor", 10, VENDOR_IMAGE_URL);
    let ctx = TestContext::with_chains(Chains {
        image: vec![vendor.clone()],
        ..Chains::default()
    })
    .await
    .unwrap();
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post(
            "/api/image",
            &json!({ "prompt": "happy sun", "mode": "emoji", "userId": user }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.str_field("provider"), "emoji");
    assert_eq!(vendor.calls(), 0);
    // Emoji mode still counts as an image
    assert_eq!(ctx.fixtures.usage_of(user).await.unwrap().images_used, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stop_at_the_image_limit(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free").await.unwrap();
    ctx.fixtures.set_usage(user, images(5)).await.unwrap();

    let response = ctx
        .client
        .post("/api/image", &json!({ "prompt": "a lighthouse", "userId": user }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::FORBIDDEN)
        .assert_error_message("Image generation limit exceeded. Please upgrade your plan.");
    assert_eq!(response.i64_field("limit"), 5);
    assert_eq!(response.i64_field("used"), 5);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_a_prompt(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free").await.unwrap();

    let response = ctx
        .client
        .post("/api/image", &json!({ "prompt": "", "userId": user }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Prompt is required");
    assert_eq!(ctx.fixtures.usage_of(user).await.unwrap().images_used, 0);
}
