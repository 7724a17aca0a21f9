//! Callback authentication tests against a running server.

#[cfg(test)]
mod tests {
    use ringstack_auth::{FormParams, SIGNATURE_HEADER, sign_request};

    use crate::{auth_token, call_status_form, endpoint_url, http_client, post_signed};

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_accept_signed_status_callback() {
        let client = http_client();
        let form = call_status_form("completed");

        let response = post_signed(&client, "/voice/status", &form, &auth_token())
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/xml"),
        );
        let body = response.text().await.unwrap();
        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(body.contains("<Response"));
    }

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_accept_repeated_form_fields() {
        let client = http_client();
        let mut form = call_status_form("in-progress");
        form.insert("MediaUrl", "https://example.com/b.png");
        form.insert("MediaUrl", "https://example.com/a.png");

        let response = post_signed(&client, "/sms", &form, &auth_token())
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_reject_callback_signed_with_wrong_token() {
        let client = http_client();
        let form = call_status_form("completed");

        let response = post_signed(&client, "/voice/status", &form, "not-the-token")
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_reject_tampered_body() {
        let client = http_client();
        let form = call_status_form("completed");
        let url = format!("{}/voice/status", endpoint_url());
        let signature = sign_request("POST", &url, Some(&form), auth_token().as_bytes());

        let mut tampered = form.clone();
        tampered.insert("CallDuration", "9999");

        let response = client
            .post(&url)
            .header(SIGNATURE_HEADER, signature)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(tampered.to_urlencoded())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_reject_missing_signature() {
        let client = http_client();
        let form = call_status_form("completed");

        let response = client
            .post(format!("{}/voice/status", endpoint_url()))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(form.to_urlencoded())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_reject_malformed_form_body() {
        let client = http_client();

        let response = client
            .post(format!("{}/voice/status", endpoint_url()))
            .header(SIGNATURE_HEADER, "irrelevant")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("CallSid=%ZZ")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[ignore = "requires a running RingStack server"]
    async fn test_should_sign_get_callbacks_over_url_only() {
        let client = http_client();
        let url = format!("{}/voice/fallback?CallSid=CA1&ErrorCode=11200", endpoint_url());
        let signature = sign_request("GET", &url, None::<&FormParams>, auth_token().as_bytes());

        let response = client
            .get(&url)
            .header(SIGNATURE_HEADER, signature)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }
}
