// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `ticketflow` binary and drive
//! it over HTTP.

use std::time::Duration;

use ticketflow_specs::TicketflowProcess;

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn http_health() -> anyhow::Result<()> {
    let proc = TicketflowProcess::start()?;
    proc.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value = reqwest::get(format!("{}/health", proc.base_url())).await?.json().await?;
    assert_eq!(resp["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn ingest_then_consume_round_trip() -> anyhow::Result<()> {
    let proc = TicketflowProcess::start()?;
    proc.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let submit: serde_json::Value = client
        .post(format!("{}/tickets", proc.base_url()))
        .json(&serde_json::json!({ "description": "Cannot login, 500 error" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(submit["status"], "accepted");
    let ticket_id = submit["ticket_id"].as_str().expect("ticket_id present").to_owned();

    let deadline = tokio::time::Instant::now() + TIMEOUT;
    let status = loop {
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("ticket never reached a terminal status");
        }
        let status: serde_json::Value = client
            .get(format!("{}/tickets/{ticket_id}/status", proc.base_url()))
            .send()
            .await?
            .json()
            .await?;
        if matches!(status["status"].as_str(), Some("completed") | Some("master_incident")) {
            break status;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    };
    assert_eq!(status["status"], "completed");
    assert_eq!(status["category"], "technical");

    let next: serde_json::Value =
        client.get(format!("{}/tickets/next", proc.base_url())).send().await?.json().await?;
    assert_eq!(next["ticket_id"], ticket_id);

    Ok(())
}

#[tokio::test]
async fn empty_payload_is_rejected() -> anyhow::Result<()> {
    let proc = TicketflowProcess::start()?;
    proc.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let resp = client.post(format!("{}/tickets", proc.base_url())).json(&serde_json::json!({})).send().await?;
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}
