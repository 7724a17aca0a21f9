//! Health endpoint tests against a running server.

#[cfg(test)]
mod tests {
    use crate::{endpoint_url, http_client};

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_report_running_status() {
        let client = http_client();

        let response = client
            .get(format!("{}/health", endpoint_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "running");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_tag_responses_with_request_id() {
        let client = http_client();

        let response = client
            .get(format!("{}/health", endpoint_url()))
            .send()
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("RingStack"),
        );
    }
}
