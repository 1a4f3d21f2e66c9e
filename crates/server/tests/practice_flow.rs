use axum::http::StatusCode;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::json;

mod support;
use support::{build_app, login_token, send};

#[tokio::test]
async fn test_sale_booking_completion_and_review() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_token(&app).await?;
    let t = Some(token.as_str());

    let (status, technique) = send(&app, "POST", "/techniques", t, Some(json!({"name": "Reiki"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let technique_id = technique["id"].as_str().unwrap_or_default().to_string();

    let (status, therapist) = send(&app, "POST", "/therapists", t, Some(json!({"email": "tom@clinic.test", "name": "Tom"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let therapist_id = therapist["id"].as_str().unwrap_or_default().to_string();

    let (status, links) = send(&app, "PUT", &format!("/therapists/{therapist_id}/techniques"), t, Some(json!({"technique_ids": [technique_id]}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(links.as_array().map(Vec::len), Some(1));
    let (_, practitioners) = send(&app, "GET", &format!("/techniques/{technique_id}/therapists"), t, None).await?;
    assert_eq!(practitioners[0]["id"], therapist_id.as_str());

    let (status, service) = send(&app, "POST", "/services", t, Some(json!({
        "name": "Reiki session", "description": "Energy balancing session", "price": 50.0, "duration": 60, "technique_ids": [technique_id]
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let service_id = service["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(service["technique_ids"][0], technique_id.as_str());

    let (status, patient) = send(&app, "POST", "/patients", t, Some(json!({"first_name": "Lucia", "last_name": "Perez"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let patient_id = patient["id"].as_str().unwrap_or_default().to_string();

    let (status, appt) = send(&app, "POST", "/appointments", t, Some(json!({
        "service_id": service_id, "patient_ids": [patient_id], "date": "2024-03-01T10:00:00Z",
        "mode": "SINGLE", "therapist_id": therapist_id
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appt["status"], "PROGRAMMED");
    let appt_id = appt["id"].as_str().unwrap_or_default().to_string();
    let complete_uri = format!("/appointments/{appt_id}/complete");

    // nothing sold yet
    let (status, err) = send(&app, "POST", &complete_uri, t, Some(json!({"patient_id": patient_id}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["detail"], "no available balance for this patient and service");

    let (status, sale) = send(&app, "POST", "/sales", t, Some(json!({
        "patient_id": patient_id, "sale_type": "SERVICE", "service_id": service_id, "sessions": 2, "amount": 100.0
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["balances"][0]["total"], 2);

    let (status, done) = send(&app, "POST", &complete_uri, t, Some(json!({"patient_id": patient_id}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["appointment"]["status"], "DONE");
    assert_eq!(done["appointment"]["evaluation"], "UNDER_EVALUATION");
    assert_eq!(done["balance"]["used"], 1);

    let (again, _) = send(&app, "POST", &complete_uri, t, Some(json!({"patient_id": patient_id}))).await?;
    assert_eq!(again, StatusCode::CONFLICT);

    let (status, reviewed) = send(&app, "PUT", &format!("/appointments/{appt_id}/evaluation"), t, Some(json!({"evaluation": "APPROVED"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["evaluation"], "APPROVED");

    let (_, balances) = send(&app, "GET", &format!("/patients/{patient_id}/balances"), t, None).await?;
    assert_eq!(balances[0]["remaining"], 1);
    assert_eq!(balances[0]["service_name"], "Reiki session");

    let (_, perf) = send(&app, "GET", &format!("/therapists/{therapist_id}/performance?from=2024-01-01T00:00:00Z&to=2025-01-01T00:00:00Z"), t, None).await?;
    assert_eq!(perf["done"], 1);
    assert_eq!(perf["approved"], 1);

    let now = Utc::now();
    let from = (now - Duration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let to = (now + Duration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let (status, chart) = send(&app, "GET", &format!("/charts/sales?from={from}&to={to}&unit=day"), t, None).await?;
    assert_eq!(status, StatusCode::OK);
    let total: f64 = chart.as_array().map(|points| points.iter().filter_map(|p| p["total"].as_f64()).sum()).unwrap_or_default();
    assert!((total - 100.0).abs() < 1e-9, "chart: {chart}");

    // referenced by an appointment, a balance and a sale
    let (status, _) = send(&app, "DELETE", &format!("/services/{service_id}"), t, None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_validation_and_lookup_errors() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_token(&app).await?;
    let t = Some(token.as_str());

    let (status, body) = send(&app, "POST", "/patients", t, Some(json!({"first_name": "L", "last_name": "Perez"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _) = send(&app, "GET", "/patients/00000000-0000-0000-0000-000000000000", t, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/services", t, Some(json!({"name": "Massage", "description": "Deep tissue massage", "price": 10.005, "duration": 30, "technique_ids": []}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for name in ["Lucia", "Luis", "Marta"] {
        send(&app, "POST", "/patients", t, Some(json!({"first_name": name, "last_name": "Gomez"}))).await?;
    }
    let (status, page) = send(&app, "GET", "/patients?search=lu&per_page=1", t, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_malformed_input_gets_json_errors() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_token(&app).await?;
    let t = Some(token.as_str());

    let (status, body) = send(&app, "POST", "/appointments", t, Some(json!({
        "service_id": "00000000-0000-0000-0000-000000000000", "patient_ids": [], "date": "2024-03-01T10:00:00Z", "mode": "TRIPLE"
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    assert!(body["detail"].as_str().unwrap_or_default().contains("TRIPLE"));

    let (status, body) = send(&app, "GET", "/patients?per_page=lots", t, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, body) = send(&app, "GET", "/patients/not-a-uuid", t, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    Ok(())
}
