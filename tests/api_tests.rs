//! API integration tests.
//!
//! These run against a live server started with a fresh database seeded
//! with three identity users: id 1 is staff (admin role, no member
//! profile), ids 2 and 3 are plain users with member profiles. Tokens are
//! minted locally with the server's development JWT secret.
//!
//! Run with: cargo test -- --ignored

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use bookheaven_server::models::user::{Role, UserClaims};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const JWT_SECRET: &str = "change-this-secret-in-production";

fn token(user_id: i32, role: Role) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: format!("user-{}", user_id),
        user_id,
        role,
        iat: now,
        exp: now + 3600,
    }
    .create_token(JWT_SECRET)
    .expect("Failed to mint token")
}

fn admin_token() -> String {
    token(1, Role::Admin)
}

async fn create_book(client: &Client, title: &str, isbn: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "title": title, "isbn": isbn }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_book_list_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_book_create_requires_admin() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token(2, Role::Member))
        .json(&json!({ "title": "Forbidden", "isbn": "0000000001" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_author_name_is_rejected_case_insensitively() {
    let client = Client::new();

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "name": "Tolkien", "biography": "" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "name": "tolkien", "biography": "" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Author with this name already exists.");
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_round_trip() {
    let client = Client::new();
    let book = create_book(&client, "Dune", "9780441013593").await;
    let book_id = book["id"].as_i64().expect("No book id");
    assert_eq!(book["availability_status"], true);

    let member_m = token(2, Role::Member);
    let member_n = token(3, Role::Member);

    // M borrows the book
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&member_m)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let record: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(record["status"], "BORROWED");
    assert!(record["return_date"].is_null());
    assert_eq!(record["book"]["availability_status"], false);

    // The book is now unavailable
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["availability_status"], false);

    // M cannot borrow it twice
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&member_m)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["message"],
        "You have already borrowed this book and not returned it yet."
    );

    // Neither can anyone else while it is out
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&member_n)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["message"],
        "This book is currently not available for borrowing."
    );

    // M returns it
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(&member_m)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let record: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(record["status"], "RETURNED");
    assert!(!record["return_date"].is_null());

    // Availability is restored
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["availability_status"], true);
}

#[tokio::test]
#[ignore]
async fn test_borrow_with_planned_return_date_round_trip() {
    let client = Client::new();
    let book = create_book(&client, "Foundation", "9780553293357").await;
    let book_id = book["id"].as_i64().expect("No book id");

    let member_m = token(2, Role::Member);
    let planned = Utc::now() + chrono::Duration::days(14);

    // Borrow with a planned return date: the loan is active even though
    // return_date is already populated
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&member_m)
        .json(&json!({ "return_date": planned }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let record: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(record["status"], "BORROWED");
    assert!(!record["return_date"].is_null());
    assert_eq!(record["book"]["availability_status"], false);

    // The planned date must not block a second borrow attempt's conflict
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&member_m)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "AlreadyBorrowed");

    // Returning still works; the actual date overwrites the planned one
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(&member_m)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let record: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(record["status"], "RETURNED");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["availability_status"], true);
}

#[tokio::test]
#[ignore]
async fn test_deleting_member_releases_their_books() {
    let client = Client::new();
    let book = create_book(&client, "Neuromancer", "9780441569595").await;
    let book_id = book["id"].as_i64().expect("No book id");

    // User 1 has no seeded member profile; give it one for this test
    let response = client
        .post(format!("{}/member", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "user_id": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let member: Value = response.json().await.expect("Failed to parse response");
    let member_id = member["id"].as_i64().expect("No member id");

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Deleting the member cascades their records and releases the book
    let response = client
        .delete(format!("{}/member/{}", BASE_URL, member_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["availability_status"], true);
}

#[tokio::test]
#[ignore]
async fn test_member_retrieval_scoped_to_caller() {
    let client = Client::new();

    // Resolve the seeded member ids through the admin-only listing
    let response = client
        .get(format!("{}/member", BASE_URL))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let members: Value = response.json().await.expect("Failed to parse response");
    let members = members.as_array().expect("Expected an array");

    let find = |user_id: i64| {
        members
            .iter()
            .find(|m| m["user_id"] == user_id)
            .unwrap_or_else(|| panic!("No seeded member for user {}", user_id))["id"]
            .as_i64()
            .expect("No member id")
    };
    let own_id = find(2);
    let other_id = find(3);

    let caller = token(2, Role::Member);

    let response = client
        .get(format!("{}/member/{}", BASE_URL, own_id))
        .bearer_auth(&caller)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    // Someone else's profile is indistinguishable from a missing one
    let response = client
        .get(format!("{}/member/{}", BASE_URL, other_id))
        .bearer_auth(&caller)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_book_update_clears_category_with_explicit_null() {
    let client = Client::new();

    let response = client
        .post(format!("{}/categories", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "name": format!("Clearable-{}", Utc::now().timestamp_millis()) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Value = response.json().await.expect("Failed to parse response");

    let book = create_book(
        &client,
        &format!("Clearable-{}", Utc::now().timestamp_millis()),
        &format!("{}", 2_000_000_000_000i64 + Utc::now().timestamp_millis() % 1_000_000_000),
    )
    .await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book["id"]))
        .bearer_auth(admin_token())
        .json(&json!({ "category_id": category["id"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["category"]["id"], category["id"]);

    // Explicit null detaches the category; an absent field would keep it
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book["id"]))
        .bearer_auth(admin_token())
        .json(&json!({ "category_id": null }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert!(updated["category"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_return_without_active_borrow_is_not_found() {
    let client = Client::new();
    let book = create_book(&client, "Hyperion", "9780553283686").await;
    let book_id = book["id"].as_i64().expect("No book id");

    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(token(2, Role::Member))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoActiveBorrow");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_book_title_is_rejected() {
    let client = Client::new();
    create_book(&client, "Solaris", "9780156027601").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "title": "Solaris", "isbn": "9999999999999" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book already exists.");
}

#[tokio::test]
#[ignore]
async fn test_category_book_count_is_live() {
    let client = Client::new();

    let response = client
        .post(format!("{}/categories", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "name": format!("SF-{}", Utc::now().timestamp_millis()) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Value = response.json().await.expect("Failed to parse response");
    let category_id = category["id"].as_i64().expect("No category id");

    let response = client
        .get(format!("{}/categories/{}", BASE_URL, category_id))
        .send()
        .await
        .expect("Failed to send request");
    let details: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(details["book_count"], 0);

    // Assign a fresh book to the category and read the count again
    let book = create_book(
        &client,
        &format!("Counted-{}", Utc::now().timestamp_millis()),
        &format!("{}", 1_000_000_000_000 + Utc::now().timestamp_millis() % 1_000_000_000),
    )
    .await;
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book["id"]))
        .bearer_auth(admin_token())
        .json(&json!({ "category_id": category_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/categories/{}", BASE_URL, category_id))
        .send()
        .await
        .expect("Failed to send request");
    let details: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(details["book_count"], 1);
}

#[tokio::test]
#[ignore]
async fn test_borrow_record_update_closes_loan() {
    let client = Client::new();
    let book = create_book(&client, "Ubik", "9780547572291").await;
    let book_id = book["id"].as_i64().expect("No book id");

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(token(2, Role::Member))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let record: Value = response.json().await.expect("Failed to parse response");
    let record_id = record["id"].as_i64().expect("No record id");

    // Staff corrects the record directly with a return date
    let response = client
        .put(format!("{}/borrowrecords/{}", BASE_URL, record_id))
        .bearer_auth(admin_token())
        .json(&json!({ "return_date": Utc::now() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["status"], "RETURNED");

    // The book came back with it
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["availability_status"], true);
}

#[tokio::test]
#[ignore]
async fn test_borrow_records_are_scoped_to_caller() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrowrecords", BASE_URL))
        .bearer_auth(token(2, Role::Member))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let records: Value = response.json().await.expect("Failed to parse response");
    for record in records.as_array().expect("Expected an array") {
        assert_eq!(record["member"]["user_id"], 2);
    }
}
