//! Router-level tests against in-memory storage.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use course_core::model::{SegmentDraft, SegmentId, UserId};
use course_core::time::fixed_clock;
use serde_json::{Value, json};
use server::{AppState, build_router};
use services::AppServices;
use tower::util::ServiceExt; // for `oneshot`

struct Fixture {
    app: Router,
    services: AppServices,
    admin: UserId,
    member: UserId,
    free_segment: SegmentId,
    premium_segment: SegmentId,
}

async fn fixture() -> Fixture {
    let services = AppServices::in_memory(fixed_clock());
    let admin = services.bootstrap_admin("Owner").await.unwrap().unwrap();
    let member = services.users().register("Learner".into()).await.unwrap();

    let course = services.course();
    let module = course.create_module("Basics".into()).await.unwrap();
    let free_segment = course
        .create_segment(SegmentDraft {
            module_id: module,
            title: "Welcome".into(),
            is_premium: false,
            video_key: Some("intro.mp4".into()),
        })
        .await
        .unwrap();
    let premium_segment = course
        .create_segment(SegmentDraft {
            module_id: module,
            title: "Deep dive".into(),
            is_premium: true,
            video_key: None,
        })
        .await
        .unwrap();

    Fixture {
        app: build_router(AppState::new(services.clone())),
        services,
        admin,
        member,
        free_segment,
        premium_segment,
    }
}

fn request(method: &str, uri: &str, user: Option<UserId>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_is_public() {
    let fx = fixture().await;
    let response = fx.app.oneshot(request("GET", "/health", None, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "course-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn marking_twice_returns_no_content_and_keeps_one_entry() {
    let fx = fixture().await;
    let uri = format!("/api/progress/{}", fx.free_segment);

    for _ in 0..2 {
        let response = fx
            .app
            .clone()
            .oneshot(request("POST", &uri, Some(fx.member), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = fx
        .app
        .oneshot(request("GET", "/api/progress", Some(fx.member), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!([{ "segmentId": fx.free_segment.value() }]));
}

#[tokio::test]
async fn progress_requires_identity() {
    let fx = fixture().await;

    let missing = fx
        .app
        .clone()
        .oneshot(request("GET", "/api/progress", None, None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let unknown = fx
        .app
        .clone()
        .oneshot(request("GET", "/api/progress", Some(UserId::new(999)), None))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let malformed = Request::builder()
        .uri("/api/progress")
        .header("x-user-id", "not-a-number")
        .body(Body::empty())
        .unwrap();
    let response = fx.app.oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn premium_segment_is_forbidden_for_free_members() {
    let fx = fixture().await;
    let uri = format!("/api/progress/{}", fx.premium_segment);

    let response = fx
        .app
        .clone()
        .oneshot(request("POST", &uri, Some(fx.member), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    fx.services.users().set_premium(fx.member, true).await.unwrap();
    let response = fx
        .app
        .oneshot(request("POST", &uri, Some(fx.member), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unknown_segment_is_not_found() {
    let fx = fixture().await;

    let response = fx
        .app
        .clone()
        .oneshot(request("POST", "/api/progress/404", Some(fx.member), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = fx
        .app
        .oneshot(request("GET", "/api/segments/404/completion", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn segment_completion_reports_share_of_all_users() {
    let fx = fixture().await;
    fx.services
        .progress()
        .mark_as_watched(
            &fx.services.users().get_user(fx.member).await.unwrap().unwrap(),
            fx.free_segment,
        )
        .await
        .unwrap();

    let uri = format!("/api/segments/{}/completion", fx.free_segment);
    let response = fx.app.oneshot(request("GET", &uri, None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["segmentId"], fx.free_segment.value());
    assert_eq!(body["completed"], 1);
    assert_eq!(body["eligible"], 2);
    assert_eq!(body["percentage"], 50.0);
}

#[tokio::test]
async fn summary_counts_watched_segments() {
    let fx = fixture().await;
    let uri = format!("/api/progress/{}", fx.free_segment);
    fx.app
        .clone()
        .oneshot(request("POST", &uri, Some(fx.member), None))
        .await
        .unwrap();

    let response = fx
        .app
        .oneshot(request("GET", "/api/progress/summary", Some(fx.member), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["watched"], 1);
    assert_eq!(body["total"], 2);
    assert_eq!(body["percentage"], 50.0);
}

#[tokio::test]
async fn admin_routes_reject_members() {
    let fx = fixture().await;
    let response = fx
        .app
        .oneshot(request(
            "POST",
            "/api/admin/modules",
            Some(fx.member),
            Some(json!({ "title": "Advanced" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_authors_and_reorders_a_module() {
    let fx = fixture().await;

    let response = fx
        .app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/modules",
            Some(fx.admin),
            Some(json!({ "title": "Advanced" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let module_id = extract_json(response.into_body()).await["id"].clone();

    let mut segment_ids = Vec::new();
    for title in ["One", "Two"] {
        let response = fx
            .app
            .clone()
            .oneshot(request(
                "POST",
                "/api/admin/segments",
                Some(fx.admin),
                Some(json!({ "moduleId": module_id, "title": title, "isPremium": false })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        segment_ids.push(extract_json(response.into_body()).await["id"].clone());
    }
    segment_ids.reverse();

    let order_uri = format!("/api/admin/modules/{module_id}/order");
    let response = fx
        .app
        .clone()
        .oneshot(request(
            "PUT",
            &order_uri,
            Some(fx.admin),
            Some(json!({ "segmentIds": segment_ids })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list_uri = format!("/api/segments?moduleId={module_id}");
    let response = fx.app.clone().oneshot(request("GET", &list_uri, None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(titles, vec!["Two", "One"]);

    let response = fx
        .app
        .oneshot(request(
            "PUT",
            &order_uri,
            Some(fx.admin),
            Some(json!({ "segmentIds": [segment_ids[0]] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_grants_premium() {
    let fx = fixture().await;
    let uri = format!("/api/admin/users/{}/premium", fx.member);

    let response = fx
        .app
        .clone()
        .oneshot(request("PUT", &uri, Some(fx.admin), Some(json!({ "isPremium": true }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = fx
        .app
        .clone()
        .oneshot(request("GET", "/api/me", Some(fx.member), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["isPremium"], true);
    assert_eq!(body["role"], "member");

    let response = fx
        .app
        .oneshot(request(
            "PUT",
            "/api/admin/users/777/premium",
            Some(fx.admin),
            Some(json!({ "isPremium": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_and_comments_flow() {
    let fx = fixture().await;

    let response = fx
        .app
        .clone()
        .oneshot(request("POST", "/api/users", None, Some(json!({ "displayName": "Grace" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = extract_json(response.into_body()).await["id"].as_u64().unwrap();
    let grace = UserId::new(id);

    let uri = format!("/api/segments/{}/comments", fx.free_segment);
    let response = fx
        .app
        .clone()
        .oneshot(request("POST", &uri, Some(grace), Some(json!({ "body": "Great intro" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = fx
        .app
        .clone()
        .oneshot(request("POST", &uri, Some(grace), Some(json!({ "body": "  " }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = fx.app.oneshot(request("GET", &uri, None, None)).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["body"], "Great intro");
    assert_eq!(body[0]["userId"], id);
}

#[tokio::test]
async fn blank_signup_is_rejected() {
    let fx = fixture().await;
    let response = fx
        .app
        .oneshot(request("POST", "/api/users", None, Some(json!({ "displayName": "" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
