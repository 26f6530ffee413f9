use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

mod utils;

use utils::*;

#[tokio::test]
async fn health_check_is_public() {
    let setup = TestSetupBuilder::new().build().await;

    let (status, body) = setup.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn dashboard_defaults_to_newest_event() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;

    let (status, body) = setup.get_json("/stats/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eventIds"], json!(["Kvk-SoC-2", "Kvk-SoC-1"]));
    assert_eq!(body["selected"], "Kvk-SoC-2");
    assert_eq!(body["top"][0]["name"], "Bob");
    assert_eq!(body["records"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn dashboard_honours_remembered_selection_and_metric() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;

    let (_, body) = setup
        .get_json("/stats/dashboard?selected=Kvk-SoC-1&top=2&by=power")
        .await;
    assert_eq!(body["selected"], "Kvk-SoC-1");
    assert_eq!(body["metric"], "power");
    let names: Vec<&str> = body["top"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bob", "Alice"]);

    let (_, body) = setup.get_json("/stats/dashboard?selected=Kvk-Gone").await;
    assert_eq!(body["selected"], "Kvk-SoC-2");
}

#[tokio::test]
async fn empty_store_has_no_selection() {
    let setup = TestSetupBuilder::new().build().await;

    let (status, body) = setup.get_json("/stats/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["selected"].is_null());
    assert_eq!(body["records"], json!([]));
}

#[tokio::test]
async fn unknown_event_reads_as_empty_list() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;

    let (status, body) = setup.get_json("/stats/events/Kvk-Unknown").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn top_players_by_metric() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;

    let (status, body) = setup
        .get_json("/stats/events/Kvk-SoC-1/top?n=1&by=t5Kills")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"], "t5Kills");
    assert_eq!(body["players"].as_array().unwrap().len(), 1);
    assert_eq!(body["players"][0]["governorId"], "2222");

    let (status, _) = setup
        .get_json("/stats/events/Kvk-SoC-1/top?by=charisma")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn player_profile_lists_history_newest_first() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;

    let (status, body) = setup.get_json("/stats/players/3333").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latestEvent"], "Kvk-SoC-2");
    assert!(body["latestDkp"].is_null());
    assert_eq!(body["history"][0]["eventId"], "Kvk-SoC-2");
    assert!(body["history"][0]["stat"].is_null());
    assert_eq!(body["history"][1]["stat"]["name"], "Charlie");
    assert_eq!(body["player"]["primaryName"], "Charlie");
    assert_eq!(body["player"]["knownGovernorIds"], json!(["3333"]));
}

#[tokio::test]
async fn profile_follows_player_to_new_governor_id() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;
    let token = setup.login("12345", "password").await;
    let file = CsvBuilder::new()
        .row("9111,Alice,200000000,17000000,990000,12000000,25000")
        .row("2222,Bob,260000000,31000000,1600000,19000000,41000")
        .build();

    let (status, _) = setup
        .upload(Some(&token), "Kvk-SoC-3.csv", &file, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = setup.get_json("/stats/players/9111").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latestEvent"], "Kvk-SoC-3");
    assert_eq!(body["latestDkp"], 25000);
    assert_eq!(body["player"]["knownGovernorIds"], json!(["1111", "9111"]));
    assert_eq!(body["player"]["currentGovernorId"], "9111");
    assert_eq!(body["history"][1]["stat"]["governorId"], "1111");
    assert_eq!(body["history"][2]["stat"]["kills"], 12500000);

    let (_, old_id) = setup.get_json("/stats/players/1111").await;
    assert_eq!(old_id["history"], body["history"]);

    let (status, players) = setup.get_json("/players").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = players
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["primaryName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Charlie", "David"]);
}

#[tokio::test]
async fn upload_requires_a_session() {
    let setup = TestSetupBuilder::new().build().await;
    let file = CsvBuilder::new().row("1,A,1,1,1,1,1").build();

    let (status, body) = setup.upload(None, "Kvk-1.csv", &file, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");

    let (status, _) = setup
        .upload(Some("not-a-token"), "Kvk-1.csv", &file, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(setup.state.stats_store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_upload_then_export() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;
    let token = setup.login("12345", "password").await;

    let file = CsvBuilder::new()
        .row("1111,Alice,190000000,16000000,950000,11000000,23000")
        .row("5555,\"Smith, John\",90000000,7000000,400000,3000000,9000")
        .row("broken,row")
        .build();
    let (status, body) = setup
        .upload(Some(&token), "Kvk-SoC-3.csv", &file, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"eventId": "Kvk-SoC-3", "playerCount": 2}));

    let (_, ids) = setup.get_json("/stats").await;
    assert_eq!(ids["eventIds"][0], "Kvk-SoC-3");

    let request = Request::builder()
        .uri("/stats/events/Kvk-SoC-3/export")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = setup.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Kvk-SoC-3-export.csv\""
    );
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "governorId,name,power,kills,deaths,t5Kills,dkp\n\
         1111,Alice,190000000,16000000,950000,11000000,23000\n\
         5555,\"Smith, John\",90000000,7000000,400000,3000000,9000"
    );
}

#[tokio::test]
async fn explicit_event_id_overrides_filename() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;
    let token = setup.login("12345", "password").await;
    let file = CsvBuilder::new().row("9,Zed,1,2,3,4,5").build();

    let (status, body) = setup
        .upload(Some(&token), "export (1).csv", &file, Some("Kvk-SoC-1"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eventId"], "Kvk-SoC-1");

    let (_, records) = setup.get_json("/stats/events/Kvk-SoC-1").await;
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["name"], "Zed");
}

#[tokio::test]
async fn upload_without_valid_rows_is_unprocessable() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;
    let token = setup.login("12345", "password").await;

    let (status, body) = setup
        .upload(Some(&token), "Kvk-SoC-1.csv", &CsvBuilder::new().build(), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Kvk-SoC-1"));

    let (_, records) = setup.get_json("/stats/events/Kvk-SoC-1").await;
    assert_eq!(records.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn upload_of_binary_file_is_bad_request() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;
    let token = setup.login("12345", "password").await;

    let (status, _) = setup
        .upload(Some(&token), "Kvk-5.csv", &[0xff, 0xfe, 0xfd], None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_of_empty_event_is_not_found() {
    let setup = TestSetupBuilder::new().build().await;

    let request = Request::builder()
        .uri("/stats/events/Kvk-None/export")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = setup.send(request).await;
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No data available to export.");
}

#[tokio::test]
async fn uploads_show_up_in_activity_log() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;
    let token = setup.login("12345", "password").await;
    let file = CsvBuilder::new().row("1,A,1,1,1,1,1").build();

    setup
        .upload(Some(&token), "Kvk-7.csv", &file, None)
        .await;

    let mut uploads = serde_json::Value::Null;
    for _ in 0..50 {
        let (_, body) = setup.get_json("/stats/uploads").await;
        if body.as_array().map(|a| !a.is_empty()).unwrap_or(false) {
            uploads = body;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(uploads[0]["eventId"], "Kvk-7");
    assert_eq!(uploads[0]["playerCount"], 1);
}

#[tokio::test]
async fn register_session_and_logout() {
    let setup = TestSetupBuilder::new().build().await;

    let (status, body) = setup
        .post_json(
            "/auth/register",
            None,
            json!({"governorId": "7777", "password": "pw", "role": "Garrison", "aooTeam": "Team 2"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/auth/session")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = setup.send(request).await;
    let user: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "Garrison");
    assert_eq!(user["aooTeam"], "Team 2");

    let (status, _) = setup.post_json("/auth/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let request = Request::builder()
        .uri("/auth/session")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = setup.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;

    let (status, body) = setup
        .post_json(
            "/auth/register",
            None,
            json!({"governorId": "12345", "password": "other"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Governor ID already exists.");
}

#[tokio::test]
async fn scheduled_events_flow() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;

    let (status, events) = setup.get_json("/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["title"], "Ark of Osiris");
    assert_eq!(events[1]["title"], "Kingdom vs Kingdom");

    let new_event = json!({
        "title": "Sunset Canyon",
        "date": "2000-01-01T00:00:00Z",
        "description": "Defend the canyon."
    });
    let (status, _) = setup.post_json("/events", None, new_event.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = setup.login("12345", "password").await;
    let (status, created) = setup.post_json("/events", Some(&token), new_event).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!created["id"].as_str().unwrap().is_empty());

    let (_, events) = setup.get_json("/events").await;
    assert_eq!(events.as_array().unwrap().len(), 3);
    assert_eq!(events[0]["title"], "Sunset Canyon");
}

#[tokio::test]
async fn description_falls_back_without_api_key() {
    let setup = TestSetupBuilder::new().with_demo_data().build().await;
    let token = setup.login("12345", "password").await;

    let (status, body) = setup
        .post_json(
            "/events/description",
            Some(&token),
            json!({"title": "Ark of Osiris"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["description"],
        "AI service is unavailable. Please set the API_KEY environment variable."
    );
}
