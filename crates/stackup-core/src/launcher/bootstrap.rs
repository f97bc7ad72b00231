//! One-time account registration against a freshly started control plane.
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use stackup_model::AccountConfig;
use tracing::debug;

use crate::error::CoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterAccount<'a> {
    user_name: &'a str,
    password: &'a str,
}

/// `POST <base_url>/api/accounts`; anything but `200 OK` is a failure
/// carrying the status and the response body.
pub async fn register_account(
    base_url: &str,
    account: &AccountConfig,
    timeout: Duration,
) -> Result<(), CoreError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let url = format!("{base_url}/api/accounts");

    debug!(%url, user = %account.username, "registering account");
    let resp = client
        .post(&url)
        .json(&RegisterAccount {
            user_name: &account.username,
            password: &account.password,
        })
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if status != StatusCode::OK {
        return Err(CoreError::Bootstrap {
            status: status.as_u16(),
            body,
        });
    }

    debug!(%url, "account registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode as AxumStatus, routing::post};
    use serde_json::Value;
    use tokio::{net::TcpListener, sync::mpsc};

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_credentials_as_camel_case_json() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/api/accounts",
            post(move |Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    tx.send(body).unwrap();
                    AxumStatus::OK
                }
            }),
        );
        let base = serve(app).await;

        register_account(&base, &AccountConfig::default(), Duration::from_secs(5))
            .await
            .unwrap();

        let body = rx.recv().await.unwrap();
        assert_eq!(body["userName"], "e2e");
        assert_eq!(body["password"], "password");
    }

    #[tokio::test]
    async fn non_ok_status_reports_status_and_body() {
        let app = Router::new().route(
            "/api/accounts",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "db unavailable") }),
        );
        let base = serve(app).await;

        let err = register_account(&base, &AccountConfig::default(), Duration::from_secs(5))
            .await
            .unwrap_err();

        match &err {
            CoreError::Bootstrap { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "db unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("500") && msg.contains("db unavailable"), "{msg}");
    }

    #[tokio::test]
    async fn created_is_not_accepted() {
        let app = Router::new().route("/api/accounts", post(|| async { AxumStatus::CREATED }));
        let base = serve(app).await;

        let err = register_account(&base, &AccountConfig::default(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Bootstrap { status: 201, .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = register_account(
            &format!("http://{addr}"),
            &AccountConfig::default(),
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Http(_)));
    }
}
