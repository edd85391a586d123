//! Integration tests for the events API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::{date_key, days_from_today, test_app};

    /// Tests creating an event seeds a response per participant and date
    #[tokio::test]
    async fn it_creates_an_event() {
        let app = test_app().await;
        let (d1, d2) = (date_key(days_from_today(1)), date_key(days_from_today(2)));

        let (status, event) = app
            .request(
                "POST",
                "/api/events",
                Some(json!({
                    "title": "Team dinner",
                    "description": "Somewhere central",
                    "dates": [d1, d2],
                    "participants": ["A", "B", "C"]
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(event["title"], "Team dinner");
        assert_eq!(event["participants"], json!(["A", "B", "C"]));
        assert_eq!(event["dates"], json!([d1, d2]));

        let id = event["id"].as_str().unwrap();
        let (status, responses) = app
            .request("GET", &format!("/api/responses/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let responses = responses.as_object().unwrap();
        assert_eq!(responses.len(), 3);
        for dates in responses.values() {
            assert_eq!(dates.as_object().unwrap().len(), 2);
            assert_eq!(dates[&d1], "未回答");
            assert_eq!(dates[&d2], "未回答");
        }
    }

    /// Tests a missing title falls back to the default
    #[tokio::test]
    async fn it_defaults_the_title() {
        let app = test_app().await;
        let (status, event) = app
            .request(
                "POST",
                "/api/events",
                Some(json!({
                    "dates": [date_key(days_from_today(3))],
                    "participants": ["A"]
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(event["title"], "Schedule Adjustment");
        assert_eq!(event["description"], json!(null));
    }

    /// Tests sanitizing participant names on create
    #[tokio::test]
    async fn it_sanitizes_participant_names() {
        let app = test_app().await;
        let (status, event) = app
            .request(
                "POST",
                "/api/events",
                Some(json!({
                    "dates": [date_key(days_from_today(1))],
                    "participants": ["[\"Alice\"]", " Bob "]
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(event["participants"], json!(["Alice", "Bob"]));
    }

    /// Tests invalid input is rejected with a validation error
    #[tokio::test]
    async fn it_rejects_an_invalid_event() {
        let app = test_app().await;

        let (status, body) = app
            .request(
                "POST",
                "/api/events",
                Some(json!({
                    "dates": [date_key(days_from_today(1))],
                    "participants": []
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        // Outside of the three month window
        let (status, body) = app
            .request(
                "POST",
                "/api/events",
                Some(json!({
                    "dates": [date_key(days_from_today(200))],
                    "participants": ["A"]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        // Name longer than 20 characters
        let (status, _) = app
            .request(
                "POST",
                "/api/events",
                Some(json!({
                    "dates": [date_key(days_from_today(1))],
                    "participants": ["ABCDEFGHIJKLMNOPQRSTU"]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    /// Tests reading an event and the errors for unknown ids
    #[tokio::test]
    async fn it_gets_an_event() {
        let app = test_app().await;
        let id = app
            .create_event(json!({
                "title": "Lunch",
                "dates": [date_key(days_from_today(1))],
                "participants": ["A"]
            }))
            .await;

        let (status, event) = app.request("GET", &format!("/api/events/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["id"], id.as_str());
        assert_eq!(event["title"], "Lunch");

        let missing = uuid::Uuid::new_v4();
        let (status, body) = app
            .request("GET", &format!("/api/events/{}", missing), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");

        let (status, body) = app.request("GET", "/api/events/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
    }

    /// Tests the existence check
    #[tokio::test]
    async fn it_checks_an_event_exists() {
        let app = test_app().await;
        let id = app
            .create_event(json!({
                "dates": [date_key(days_from_today(1))],
                "participants": ["A"]
            }))
            .await;

        let (status, body) = app
            .request("GET", &format!("/api/events/{}/check", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"exists": true}));

        let missing = uuid::Uuid::new_v4();
        let (_, body) = app
            .request("GET", &format!("/api/events/{}/check", missing), None)
            .await;
        assert_eq!(body, json!({"exists": false}));
    }

    /// Tests editing the roster keeps surviving answers and prunes the rest
    #[tokio::test]
    async fn it_reconciles_a_roster_edit() {
        let app = test_app().await;
        let d1 = date_key(days_from_today(1));
        let id = app
            .create_event(json!({
                "dates": [d1],
                "participants": ["A", "B"]
            }))
            .await;

        let (status, _) = app
            .request(
                "PATCH",
                &format!("/api/responses/{}", id),
                Some(json!({"participant_name": "A", "date": d1, "status": "◯"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, event) = app
            .request(
                "PATCH",
                &format!("/api/events/{}", id),
                Some(json!({"participants": ["A", "C"]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["participants"], json!(["A", "C"]));

        let (_, responses) = app
            .request("GET", &format!("/api/responses/{}", id), None)
            .await;
        assert_eq!(
            responses,
            json!({
                "A": {d1.clone(): "◯"},
                "C": {d1.clone(): "未回答"}
            })
        );
    }

    /// Tests removing a date deletes its responses
    #[tokio::test]
    async fn it_reconciles_a_date_edit() {
        let app = test_app().await;
        let (d1, d2, d3) = (
            date_key(days_from_today(1)),
            date_key(days_from_today(2)),
            date_key(days_from_today(3)),
        );
        let id = app
            .create_event(json!({
                "dates": [d1, d2],
                "participants": ["A"]
            }))
            .await;

        let (status, _) = app
            .request(
                "PATCH",
                &format!("/api/events/{}", id),
                Some(json!({"dates": [d2, d3]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, responses) = app
            .request("GET", &format!("/api/responses/{}", id), None)
            .await;
        assert_eq!(
            responses,
            json!({"A": {d2.clone(): "未回答", d3.clone(): "未回答"}})
        );
    }

    /// Tests editing the title and clearing the description
    #[tokio::test]
    async fn it_updates_event_details() {
        let app = test_app().await;
        let id = app
            .create_event(json!({
                "title": "Lunch",
                "description": "Near the office",
                "dates": [date_key(days_from_today(1))],
                "participants": ["A"]
            }))
            .await;

        let (status, event) = app
            .request(
                "PATCH",
                &format!("/api/events/{}", id),
                Some(json!({"title": "Brunch", "description": null})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["title"], "Brunch");
        assert_eq!(event["description"], json!(null));
        assert_eq!(event["participants"], json!(["A"]));
    }

    /// Tests an edit with no fields is rejected
    #[tokio::test]
    async fn it_rejects_an_empty_edit() {
        let app = test_app().await;
        let id = app
            .create_event(json!({
                "dates": [date_key(days_from_today(1))],
                "participants": ["A"]
            }))
            .await;

        let (status, body) = app
            .request("PATCH", &format!("/api/events/{}", id), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
    }

    /// Tests deleting an event removes it and its responses
    #[tokio::test]
    async fn it_deletes_an_event() {
        let app = test_app().await;
        let id = app
            .create_event(json!({
                "dates": [date_key(days_from_today(1))],
                "participants": ["A"]
            }))
            .await;

        let (status, body) = app
            .request("DELETE", &format!("/api/events/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, _) = app.request("GET", &format!("/api/events/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .request("GET", &format!("/api/responses/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .request("DELETE", &format!("/api/events/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// Tests the combined event and response payload used by pollers
    #[tokio::test]
    async fn it_gets_an_event_with_responses() {
        let app = test_app().await;
        let d1 = date_key(days_from_today(1));
        let id = app
            .create_event(json!({
                "dates": [d1],
                "participants": ["A", "B"]
            }))
            .await;

        let (status, body) = app
            .request("GET", &format!("/api/events/{}/with-responses", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["event"]["id"], id.as_str());
        assert_eq!(body["eventData"]["dates"], json!([d1]));
        assert_eq!(body["eventData"]["participants"], json!(["A", "B"]));
        assert_eq!(body["eventData"]["responses"]["B"][&d1], "未回答");
    }

    /// Tests the summary reports tallies and the best date
    #[tokio::test]
    async fn it_summarizes_an_event() {
        let app = test_app().await;
        let (d1, d2) = (date_key(days_from_today(1)), date_key(days_from_today(2)));
        let id = app
            .create_event(json!({
                "dates": [d1, d2],
                "participants": ["A", "B"]
            }))
            .await;

        let (status, _) = app
            .request(
                "POST",
                &format!("/api/responses/{}", id),
                Some(json!([
                    {"participant_name": "A", "date": d2, "status": "◯"},
                    {"participant_name": "B", "date": d2, "status": "△"},
                    {"participant_name": "B", "date": d1, "status": "×"}
                ])),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, summary) = app
            .request("GET", &format!("/api/events/{}/summary", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["recommendation"]["best_dates"], json!([d2]));
        assert_eq!(summary["dates"][0]["date"], d1.as_str());
        assert_eq!(summary["dates"][0]["unavailable"], 1);
        assert_eq!(summary["dates"][0]["response_rate_percent"], 50.0);
        assert_eq!(summary["dates"][1]["available"], 1);
        assert_eq!(summary["dates"][1]["maybe"], 1);
        assert_eq!(summary["dates"][1]["response_rate_percent"], 100.0);
    }

    /// Tests malformed JSON is rejected by the extractor
    #[tokio::test]
    async fn it_rejects_malformed_json() {
        let app = test_app().await;
        let (status, _) = app
            .request(
                "POST",
                "/api/events",
                Some(json!({"dates": "tomorrow", "participants": ["A"]})),
            )
            .await;
        assert!(status.is_client_error());
    }
}
