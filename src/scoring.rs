//! Client for the remote scoring service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::{error::AppError, model::evaluation::EvaluationRequest};

#[async_trait]
pub trait Scorer: Send + Sync {
    /// Sends one packaged submission. Any non-success answer is an error; the body is
    /// returned as-is (null when it is not JSON).
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Value, AppError>;
}

pub struct HttpScorer {
    client: Client,
    endpoint: Url,
}

impl HttpScorer {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::Network(format!("Invalid scoring endpoint {endpoint}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Value, AppError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Scoring service answered {status}"
            )));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::model::evaluation::EvaluationItem;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/evaluate/")
    }

    fn request() -> EvaluationRequest {
        EvaluationRequest {
            question_set: vec![EvaluationItem {
                qid: 1,
                question: "2+2?".into(),
                teacher_answer: "4".into(),
                student_answer: "".into(),
            }],
        }
    }

    #[tokio::test]
    async fn posts_the_question_set_and_returns_the_body() {
        let app = Router::new().route(
            "/evaluate/",
            post(|Json(body): Json<EvaluationRequest>| async move {
                Json(json!({
                    "evaluation": [{"qid": body.question_set[0].qid, "score": 0}]
                }))
            }),
        );
        let endpoint = serve(app).await;

        let scorer = HttpScorer::new(&endpoint, Duration::from_secs(5)).unwrap();
        let body = scorer.evaluate(&request()).await.unwrap();

        assert_eq!(body["evaluation"][0]["qid"], 1);
    }

    #[tokio::test]
    async fn error_status_is_a_network_error() {
        let app = Router::new().route(
            "/evaluate/",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let endpoint = serve(app).await;

        let scorer = HttpScorer::new(&endpoint, Duration::from_secs(5)).unwrap();
        let err = scorer.evaluate(&request()).await.unwrap_err();

        assert!(matches!(err, AppError::Network(_)));
    }

    #[test]
    fn rejects_an_unparseable_endpoint() {
        assert!(HttpScorer::new("not a url", Duration::from_secs(1)).is_err());
    }
}
