/// Integration tests for the ChargeBook API
///
/// These tests drive the full router end-to-end:
/// - Registration and login
/// - Station and slot administration
/// - Booking lifecycle (reserve, conflict, cancel, rebook)
/// - Cascading deletes with reported counts
/// - Authorization boundaries (401/403)

mod common;

use axum::http::StatusCode;
use common::{future_date, TestContext, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_and_login() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("newuser-{}@example.com", uuid::Uuid::new_v4());

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "New User",
                "email": email,
                "password": "Chargeb00k"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    assert_eq!(body["is_admin"], false);
    assert_eq!(body["email"], email.as_str());
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({
                "email": email,
                "password": "Chargeb00k"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email.as_str());
    let token = body["access_token"].as_str().unwrap().to_string();

    // The fresh token must work on an authenticated route
    let (status, _) = ctx.send("GET", "/api/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Wrong password is rejected
    let (status, _) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({
                "email": email,
                "password": "WrongPass1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The seeded harness user can log in with the shared test password
    let (status, _) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({
                "email": ctx.user.email,
                "password": TEST_PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email.as_str())
        .execute(&ctx.db)
        .await
        .unwrap();

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_email_registration_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("dup-{}@example.com", uuid::Uuid::new_v4());
    let req = json!({
        "name": "Dup",
        "email": email,
        "password": "Chargeb00k"
    });

    let (status, _) = ctx
        .send("POST", "/api/auth/register", None, Some(req.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx.send("POST", "/api/auth/register", None, Some(req)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email.as_str())
        .execute(&ctx.db)
        .await
        .unwrap();

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_booking_lifecycle() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Volt Street", "Springfield").await;
    let slot_id = ctx.create_test_slot(station_id, "09:00:00", "10:00:00").await;

    // Reserve the slot
    let (status, body) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": future_date(),
                "vehicle_number": "KA-01-AB-1234"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "booking failed: {}", body);
    assert_eq!(body["booking"]["status"], "upcoming");
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    // Slot flips to booked
    let (status, body) = ctx
        .send("GET", &format!("/api/slots/{}", slot_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "booked");

    // The booking shows up in the caller's list with station details
    let (status, body) = ctx
        .send("GET", "/api/bookings", Some(&ctx.user_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], booking_id.as_str());
    assert_eq!(list[0]["station_name"], "Volt Street");
    assert_eq!(list[0]["vehicle_number"], "KA-01-AB-1234");

    // Admin sees it in the global listing too
    let (status, body) = ctx
        .send("GET", "/api/bookings/all", Some(&ctx.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"] == booking_id.as_str()));

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_double_booking_is_conflict() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Amp Alley", "Shelbyville").await;
    let slot_id = ctx.create_test_slot(station_id, "10:00:00", "11:00:00").await;
    let date = future_date();

    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": date,
                "vehicle_number": "AA-11-BB-2222"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same slot again, even from an admin, is a conflict
    let (status, body) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.admin_token),
            Some(json!({
                "slot_id": slot_id,
                "date": date,
                "vehicle_number": "CC-33-DD-4444"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_cancel_releases_slot_for_rebooking() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Ohm Corner", "Capital City").await;
    let slot_id = ctx.create_test_slot(station_id, "11:00:00", "12:00:00").await;
    let date = future_date();

    let (_, body) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": date,
                "vehicle_number": "EV-99"
            })),
        )
        .await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(
            "DELETE",
            &format!("/api/bookings/{}", booking_id),
            Some(&ctx.user_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "cancelled");

    // Slot is available again
    let (_, body) = ctx
        .send("GET", &format!("/api/slots/{}", slot_id), None, None)
        .await;
    assert_eq!(body["status"], "available");

    // Cancelling twice reports not found (booking is no longer upcoming)
    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/api/bookings/{}", booking_id),
            Some(&ctx.user_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // And the slot can be rebooked for the same date
    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": date,
                "vehicle_number": "EV-99"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_cancel_requires_owner_or_admin() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Watt Plaza", "North Haverbrook").await;
    let slot_id = ctx.create_test_slot(station_id, "12:00:00", "13:00:00").await;

    let (_, body) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": future_date(),
                "vehicle_number": "ZZ-00"
            })),
        )
        .await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    // A different non-admin user may not cancel it
    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Other",
                "email": format!("other-{}@example.com", uuid::Uuid::new_v4()),
                "password": "Chargeb00k"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let other_token = body["access_token"].as_str().unwrap().to_string();
    let other_id = body["user_id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/api/bookings/{}", booking_id),
            Some(&other_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin may
    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/api/bookings/{}", booking_id),
            Some(&ctx.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.send(
        "DELETE",
        &format!("/api/users/{}", other_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_booking_requires_auth() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            None,
            Some(json!({
                "slot_id": uuid::Uuid::new_v4(),
                "date": future_date(),
                "vehicle_number": "NOPE"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_past_date_booking_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Joule Junction", "Ogdenville").await;
    let slot_id = ctx.create_test_slot(station_id, "13:00:00", "14:00:00").await;

    let (status, body) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": "2020-01-01",
                "vehicle_number": "OLD-1"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_regular_user() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/stations",
            Some(&ctx.user_token),
            Some(json!({
                "name": "Rogue Station",
                "location": "Nowhere",
                "total_slots": 2,
                "price_per_hour": 5.0
            })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Nothing was created
    let (_, body) = ctx.send("GET", "/api/stations", None, None).await;
    assert!(!body
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["name"] == "Rogue Station"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_station_validation() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send(
            "POST",
            "/api/stations",
            Some(&ctx.admin_token),
            Some(json!({
                "name": "Bad Station",
                "location": "Springfield",
                "total_slots": 0,
                "price_per_hour": 5.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(
            "POST",
            "/api/stations",
            Some(&ctx.admin_token),
            Some(json!({
                "name": "Bad Station",
                "location": "Springfield",
                "total_slots": 2,
                "price_per_hour": -1.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Partial updates may not blank out display fields
    let station_id = ctx.create_test_station("Editable", "Springfield").await;

    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/api/stations/{}", station_id),
            Some(&ctx.admin_token),
            Some(json!({ "name": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/api/stations/{}", station_id),
            Some(&ctx.admin_token),
            Some(json!({ "location": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The station kept its original fields
    let (_, body) = ctx
        .send("GET", &format!("/api/stations/{}", station_id), None, None)
        .await;
    assert_eq!(body["name"], "Editable");

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_station_delete_cascades_with_counts() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Tesla Row", "Brockway").await;
    let slot_a = ctx.create_test_slot(station_id, "08:00:00", "09:00:00").await;
    let _slot_b = ctx.create_test_slot(station_id, "09:00:00", "10:00:00").await;

    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_a,
                "date": future_date(),
                "vehicle_number": "DEL-1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .send(
            "DELETE",
            &format!("/api/stations/{}", station_id),
            Some(&ctx.admin_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK, "delete failed: {}", body);
    assert_eq!(body["slots_removed"], 2);
    assert_eq!(body["bookings_removed"], 1);

    // Station and slot are gone
    let (status, _) = ctx
        .send("GET", &format!("/api/stations/{}", station_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send("GET", &format!("/api/slots/{}", slot_a), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // And so is the booking
    let (_, body) = ctx
        .send("GET", "/api/bookings", Some(&ctx.user_token), None)
        .await;
    assert!(body.as_array().unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_slot_delete_removes_bookings() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Edison Yard", "Cypress Creek").await;
    let slot_id = ctx.create_test_slot(station_id, "14:00:00", "15:00:00").await;

    ctx.send(
        "POST",
        "/api/bookings",
        Some(&ctx.user_token),
        Some(json!({
            "slot_id": slot_id,
            "date": future_date(),
            "vehicle_number": "SL-DEL"
        })),
    )
    .await;

    let (status, body) = ctx
        .send(
            "DELETE",
            &format!("/api/slots/{}", slot_id),
            Some(&ctx.admin_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings_removed"], 1);

    let (status, _) = ctx
        .send("GET", &format!("/api/slots/{}", slot_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_station_catalogue_and_search() {
    let ctx = TestContext::new().await.unwrap();

    let marker = uuid::Uuid::new_v4().simple().to_string();
    let location = format!("Searchville-{}", &marker[..8]);
    let station_id = ctx.create_test_station("Findable", &location).await;
    ctx.create_test_slot(station_id, "15:00:00", "16:00:00").await;

    // Listing carries the availability count
    let (status, body) = ctx.send("GET", "/api/stations", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let station = body
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == station_id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(station["available_slots"], 1);

    // Search matches a lowercase substring
    let (status, body) = ctx
        .send(
            "GET",
            &format!("/api/stations/search?location={}", location.to_lowercase()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Locations endpoint includes it
    let (_, body) = ctx.send("GET", "/api/locations", None, None).await;
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l == location.as_str()));

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_user_administration() {
    let ctx = TestContext::new().await.unwrap();

    // Register a user to manage
    let (_, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Managed",
                "email": format!("managed-{}@example.com", uuid::Uuid::new_v4()),
                "password": "Chargeb00k"
            })),
        )
        .await;
    let managed_id = body["user_id"].as_str().unwrap().to_string();
    let managed_token = body["access_token"].as_str().unwrap().to_string();

    // Listing users requires admin
    let (status, _) = ctx
        .send("GET", "/api/users", Some(&ctx.user_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send("GET", "/api/users", Some(&ctx.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["id"] == managed_id.as_str()));

    // Promote, then verify the grant took
    let (status, body) = ctx
        .send(
            "PUT",
            &format!("/api/users/{}/make-admin", managed_id),
            Some(&ctx.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_admin"], true);

    // Give the managed user a booking, then delete them; the slot reverts
    let station_id = ctx.create_test_station("Admin Test", "Userland").await;
    let slot_id = ctx.create_test_slot(station_id, "16:00:00", "17:00:00").await;

    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&managed_token),
            Some(json!({
                "slot_id": slot_id,
                "date": future_date(),
                "vehicle_number": "MG-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .send(
            "DELETE",
            &format!("/api/users/{}", managed_id),
            Some(&ctx.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "user delete failed: {}", body);
    assert_eq!(body["bookings_removed"], 1);

    let (_, body) = ctx
        .send("GET", &format!("/api/slots/{}", slot_id), None, None)
        .await;
    assert_eq!(body["status"], "available");

    // Admins cannot delete themselves
    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/api/users/{}", ctx.admin.id),
            Some(&ctx.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_slot_update() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Farad Field", "Little Pwagmattasquarmsettport").await;
    let slot_id = ctx.create_test_slot(station_id, "17:00:00", "18:00:00").await;

    // Non-admin cannot touch it
    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/api/slots/{}", slot_id),
            Some(&ctx.user_token),
            Some(json!({ "status": "maintenance" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin flags the slot for maintenance
    let (status, body) = ctx
        .send(
            "PUT",
            &format!("/api/slots/{}", slot_id),
            Some(&ctx.admin_token),
            Some(json!({ "status": "maintenance" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slot"]["status"], "maintenance");

    // A slot under maintenance cannot be booked
    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": future_date(),
                "vehicle_number": "MX-77"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A merged window that would invert is rejected
    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/api/slots/{}", slot_id),
            Some(&ctx.admin_token),
            Some(json!({ "start_time": "19:00:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_overlapping_booking_same_user_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    // Two stations with overlapping windows and one clear of both
    let station_a = ctx.create_test_station("Coulomb East", "Overlapton").await;
    let station_b = ctx.create_test_station("Coulomb West", "Overlapton").await;
    let slot_a = ctx.create_test_slot(station_a, "09:00:00", "10:00:00").await;
    let slot_b = ctx.create_test_slot(station_b, "09:30:00", "10:30:00").await;
    let slot_c = ctx.create_test_slot(station_b, "11:00:00", "12:00:00").await;
    let date = future_date();

    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_a,
                "date": date,
                "vehicle_number": "OV-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // A second slot elsewhere whose window overlaps the first is rejected
    let (status, body) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_b,
                "date": date,
                "vehicle_number": "OV-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "overlap allowed: {}", body);
    assert_eq!(body["error"], "conflict");

    // The rejected slot stays available for everyone else
    let (_, body) = ctx
        .send("GET", &format!("/api/slots/{}", slot_b), None, None)
        .await;
    assert_eq!(body["status"], "available");

    // A non-overlapping window on the same date is fine
    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_c,
                "date": date,
                "vehicle_number": "OV-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // A different user may take the overlapping slot
    let (status, _) = ctx
        .send(
            "POST",
            "/api/bookings",
            Some(&ctx.admin_token),
            Some(json!({
                "slot_id": slot_b,
                "date": date,
                "vehicle_number": "OV-02"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    for station_id in [station_a, station_b] {
        ctx.send(
            "DELETE",
            &format!("/api/stations/{}", station_id),
            Some(&ctx.admin_token),
            None,
        )
        .await;
    }
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_booking_single_winner() {
    let ctx = TestContext::new().await.unwrap();

    let station_id = ctx.create_test_station("Race Point", "Contention").await;
    let slot_id = ctx.create_test_slot(station_id, "18:00:00", "19:00:00").await;
    let date = future_date();

    // Two users race for the same slot and date; the row lock (or the
    // unique index, if both get past it) must let exactly one through
    let ((status_a, _), (status_b, _)) = tokio::join!(
        ctx.send(
            "POST",
            "/api/bookings",
            Some(&ctx.user_token),
            Some(json!({
                "slot_id": slot_id,
                "date": date,
                "vehicle_number": "RC-01"
            })),
        ),
        ctx.send(
            "POST",
            "/api/bookings",
            Some(&ctx.admin_token),
            Some(json!({
                "slot_id": slot_id,
                "date": date,
                "vehicle_number": "RC-02"
            })),
        ),
    );

    let mut statuses = [status_a, status_b];
    statuses.sort();
    assert_eq!(
        statuses,
        [StatusCode::CREATED, StatusCode::CONFLICT],
        "expected one winner and one conflict, got {:?}",
        statuses
    );

    // Exactly one upcoming booking holds the slot
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM bookings WHERE slot_id = $1 AND status = 'upcoming'",
    )
    .bind(slot_id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(count, 1);

    let (_, body) = ctx
        .send("GET", &format!("/api/slots/{}", slot_id), None, None)
        .await;
    assert_eq!(body["status"], "booked");

    ctx.send(
        "DELETE",
        &format!("/api/stations/{}", station_id),
        Some(&ctx.admin_token),
        None,
    )
    .await;
    ctx.cleanup().await.unwrap();
}
