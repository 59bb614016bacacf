//! HTTP surface exercised against the real services.

mod support;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use consult_backend::inbound::http::configure_api;
use consult_backend::inbound::http::state::HttpState;
use serde_json::{Value, json};
use support::*;

async fn call(state: &HttpState, request: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await;
    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, json)
}

fn as_user(request: test::TestRequest, user_id: i64) -> test::TestRequest {
    request.insert_header(("User-Id", user_id.to_string()))
}

fn as_manager(request: test::TestRequest, manager_id: i64) -> test::TestRequest {
    request.insert_header(("Manager-Id", manager_id.to_string()))
}

#[actix_web::test]
async fn full_negotiation_over_http() {
    let world = World::new();
    let state = world.http_state();

    let (status, created) = call(
        &state,
        as_user(test::TestRequest::post().uri("/api/v1/user/consultations"), DANA).set_json(
            json!({ "brandId": BLUE_BOTTLE, "preferredDate": "2025-01-10", "preferredTime": "10:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["brandName"], "Blue Bottle");
    let id = created["id"].as_i64().expect("numeric id");

    let (status, duplicate) = call(
        &state,
        as_user(test::TestRequest::post().uri("/api/v1/user/consultations"), DANA).set_json(
            json!({ "brandId": BLUE_BOTTLE, "preferredDate": "2025-01-11", "preferredTime": "11:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(duplicate["code"], "duplicate_active_consultation");
    assert_eq!(duplicate["details"]["currentStatus"], "PENDING");

    let (status, proposed) = call(
        &state,
        as_manager(
            test::TestRequest::put().uri(&format!("/api/v1/manager/consultations/{id}/reschedule")),
            BLUE_BOTTLE_MANAGER,
        )
        .set_json(json!({
            "adjustedDate": "2025-01-12",
            "adjustedTime": "14:00",
            "adjustmentReason": "conflict"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proposed["status"], "RESCHEDULE_REQUEST");
    assert_eq!(proposed["adjustedDate"], "2025-01-12");
    assert_eq!(proposed["adjustmentReason"], "conflict");

    let (status, pending_answers) = call(
        &state,
        as_user(
            test::TestRequest::get().uri("/api/v1/user/consultations/reschedule-requests"),
            DANA,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending_answers.as_array().map(Vec::len), Some(1));

    let (status, accepted) = call(
        &state,
        as_user(
            test::TestRequest::put().uri(&format!("/api/v1/user/consultations/{id}/respond")),
            DANA,
        )
        .set_json(json!({ "userResponse": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "CONFIRMED");
    assert_eq!(accepted["preferredDate"], "2025-01-12");
    assert_eq!(accepted["preferredTime"], "14:00:00");

    let (status, _) = call(
        &state,
        as_user(
            test::TestRequest::delete().uri(&format!("/api/v1/user/consultations/{id}")),
            DANA,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, again) = call(
        &state,
        as_user(
            test::TestRequest::delete().uri(&format!("/api/v1/user/consultations/{id}")),
            DANA,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["code"], "invalid_transition");
}

#[actix_web::test]
async fn other_managers_get_forbidden() {
    let world = World::new();
    let state = world.http_state();
    let (_, created) = call(
        &state,
        as_user(test::TestRequest::post().uri("/api/v1/user/consultations"), DANA).set_json(
            json!({ "brandId": BLUE_BOTTLE, "preferredDate": "2025-01-10", "preferredTime": "10:00" }),
        ),
    )
    .await;
    let id = created["id"].as_i64().expect("numeric id");

    let (status, body) = call(
        &state,
        as_manager(
            test::TestRequest::put().uri(&format!("/api/v1/manager/consultations/{id}/confirm")),
            RIVAL_MANAGER,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[actix_web::test]
async fn past_dates_are_rejected_before_reaching_the_domain() {
    let world = World::new();
    let state = world.http_state();

    let (status, body) = call(
        &state,
        as_user(test::TestRequest::post().uri("/api/v1/user/consultations"), DANA).set_json(
            json!({ "brandId": BLUE_BOTTLE, "preferredDate": "2025-01-02", "preferredTime": "10:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert!(world.consultations.all().is_empty());
}

#[actix_web::test]
async fn inbox_endpoints_follow_the_caller() {
    let world = World::new();
    let state = world.http_state();
    call(
        &state,
        as_user(test::TestRequest::post().uri("/api/v1/user/consultations"), DANA).set_json(
            json!({ "brandId": BLUE_BOTTLE, "preferredDate": "2025-01-10", "preferredTime": "10:00" }),
        ),
    )
    .await;

    let (status, inbox) = call(
        &state,
        as_manager(
            test::TestRequest::get().uri("/api/v1/manager/notifications"),
            BLUE_BOTTLE_MANAGER,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox["totalElements"], 1);
    assert_eq!(inbox["content"][0]["recipientRole"], "MANAGER");
    assert_eq!(inbox["content"][0]["status"], "PENDING");

    let (_, count) = call(
        &state,
        as_user(
            test::TestRequest::get().uri("/api/v1/user/notifications/unread-count"),
            DANA,
        ),
    )
    .await;
    assert_eq!(count["unreadCount"], 1);

    let (status, updated) = call(
        &state,
        as_user(
            test::TestRequest::put().uri("/api/v1/user/notifications/read-all"),
            DANA,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated"], 1);

    let (status, _) = call(
        &state,
        test::TestRequest::get().uri("/api/v1/user/notifications"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn status_catalogue_is_public() {
    let world = World::new();
    let (status, body) = call(
        &world.http_state(),
        test::TestRequest::get().uri("/api/v1/consultation-statuses"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(5));
    assert_eq!(body[0], json!({ "code": 1, "name": "PENDING" }));
}
