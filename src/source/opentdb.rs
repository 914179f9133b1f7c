//! Open Trivia DB client.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::models::Question;

use super::{FetchError, QuestionSource, ResponseCode, TokenError};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    response_code: u8,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(alias = "text")]
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

/// Parse the body of a token request.
pub fn parse_token(body: &str) -> Result<String, TokenError> {
    let response: TokenResponse =
        serde_json::from_str(body).map_err(|e| TokenError::Malformed(e.to_string()))?;

    let code = ResponseCode(response.response_code);
    if !code.is_success() {
        return Err(TokenError::Provider(code));
    }

    response
        .token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| TokenError::Malformed("missing token".to_string()))
}

/// Parse the body of a question request into shuffled questions.
pub fn parse_batch<R: Rng + ?Sized>(body: &str, rng: &mut R) -> Result<Vec<Question>, FetchError> {
    let response: BatchResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let code = ResponseCode(response.response_code);
    if !code.is_success() {
        return Err(FetchError::Provider(code));
    }

    response
        .results
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            Question::from_answers(raw.question, raw.correct_answer, raw.incorrect_answers, rng)
                .map_err(|count| {
                    FetchError::Malformed(format!(
                        "question {} has {} incorrect answers, expected 3",
                        index, count
                    ))
                })
        })
        .collect()
}

/// HTTP-backed [`QuestionSource`] for `opentdb.com`.
pub struct OpenTdbSource {
    client: reqwest::Client,
    question_url: String,
    token_url: String,
    batch_size: u32,
    category: u32,
    question_type: String,
}

impl OpenTdbSource {
    pub fn new(api: &ApiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(concat!("trivia-quiz/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            question_url: api.question_url.clone(),
            token_url: api.token_url.clone(),
            batch_size: api.batch_size,
            category: api.category,
            question_type: api.question_type.clone(),
        })
    }

    /// GET `url` and return the status with the body. Refusals such as
    /// rate limiting arrive as non-2xx responses that still carry a
    /// `response_code`, so the status is not turned into an error here.
    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        Ok((status, response.text().await?))
    }
}

#[async_trait]
impl QuestionSource for OpenTdbSource {
    async fn request_token(&self) -> Result<String, TokenError> {
        let query = [("command", "request".to_string())];
        let (status, body) = self
            .get_text(&self.token_url, &query)
            .await
            .map_err(|e| TokenError::Network(e.to_string()))?;

        match parse_token(&body) {
            Err(TokenError::Malformed(_)) if !status.is_success() => {
                Err(TokenError::Network(format!("HTTP status {}", status)))
            }
            result => result,
        }
    }

    async fn fetch_batch(&self, token: Option<&str>) -> Result<Vec<Question>, FetchError> {
        let mut query = vec![
            ("amount", self.batch_size.to_string()),
            ("category", self.category.to_string()),
            ("type", self.question_type.clone()),
        ];
        if let Some(token) = token {
            query.push(("token", token.to_string()));
        }

        debug!(
            amount = self.batch_size,
            category = self.category,
            with_token = token.is_some(),
            "fetching question batch"
        );

        let (status, body) = self
            .get_text(&self.question_url, &query)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let result = match parse_batch(&body, &mut rand::rng()) {
            Err(FetchError::Malformed(_)) if !status.is_success() => {
                Err(FetchError::Network(format!("HTTP status {}", status)))
            }
            result => result,
        };
        if let Err(FetchError::Provider(code)) = &result {
            warn!("question request refused: {}", code);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BATCH_BODY: &str = r#"{
        "response_code": 0,
        "results": [
            {
                "type": "multiple",
                "difficulty": "easy",
                "category": "General Knowledge",
                "question": "What is the capital of &quot;Australia&quot;?",
                "correct_answer": "Canberra",
                "incorrect_answers": ["Sydney", "Melbourne", "Perth"]
            },
            {
                "type": "multiple",
                "difficulty": "medium",
                "category": "General Knowledge",
                "question": "Which planet is known as the Red Planet?",
                "correct_answer": "Mars",
                "incorrect_answers": ["Venus", "Jupiter", "Mercury"]
            }
        ]
    }"#;

    #[test]
    fn test_parse_batch_builds_questions() {
        let mut rng = StdRng::seed_from_u64(5);
        let questions = parse_batch(BATCH_BODY, &mut rng).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(
            questions[0].prompt,
            "What is the capital of &quot;Australia&quot;?"
        );
        for question in &questions {
            assert_eq!(question.options.len(), 4);
            let hits = question
                .options
                .iter()
                .filter(|o| **o == question.correct_answer)
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_parse_batch_accepts_text_alias() {
        let body = r#"{"response_code":0,"results":[
            {"text":"Q1","correct_answer":"A","incorrect_answers":["B","C","D"]}
        ]}"#;
        let mut rng = StdRng::seed_from_u64(5);
        let questions = parse_batch(body, &mut rng).unwrap();
        assert_eq!(questions[0].prompt, "Q1");
    }

    #[test]
    fn test_parse_batch_provider_failure() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = parse_batch(r#"{"response_code":5,"results":[]}"#, &mut rng);
        assert_eq!(result, Err(FetchError::Provider(ResponseCode::RATE_LIMIT)));

        let result = parse_batch(r#"{"response_code":4}"#, &mut rng);
        assert_eq!(result, Err(FetchError::Provider(ResponseCode::TOKEN_EMPTY)));
    }

    #[test]
    fn test_parse_batch_malformed() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            parse_batch("<html>busy</html>", &mut rng),
            Err(FetchError::Malformed(_))
        ));

        let body = r#"{"response_code":0,"results":[
            {"question":"Q","correct_answer":"True","incorrect_answers":["False"]}
        ]}"#;
        assert!(matches!(
            parse_batch(body, &mut rng),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_batch_empty_success() {
        let mut rng = StdRng::seed_from_u64(5);
        let questions = parse_batch(r#"{"response_code":0,"results":[]}"#, &mut rng).unwrap();
        assert!(questions.is_empty());
    }

    #[test]
    fn test_parse_token() {
        let body = r#"{"response_code":0,"response_message":"Token Generated Successfully!","token":"abc123"}"#;
        assert_eq!(parse_token(body), Ok("abc123".to_string()));

        assert_eq!(
            parse_token(r#"{"response_code":3}"#),
            Err(TokenError::Provider(ResponseCode::TOKEN_NOT_FOUND))
        );
        assert!(matches!(
            parse_token(r#"{"response_code":0}"#),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(parse_token("nope"), Err(TokenError::Malformed(_))));
    }

    /// Serve a single HTTP response on a local port and return its base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn local_source(base: &str) -> OpenTdbSource {
        let api = ApiConfig {
            question_url: format!("{}/api.php", base),
            token_url: format!("{}/api_token.php", base),
            timeout_secs: 5,
            ..ApiConfig::default()
        };
        OpenTdbSource::new(&api).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_response_reports_provider_code() {
        let base = serve_once("429 Too Many Requests", r#"{"response_code":5,"results":[]}"#).await;
        let result = local_source(&base).fetch_batch(None).await;
        assert_eq!(result, Err(FetchError::Provider(ResponseCode::RATE_LIMIT)));
    }

    #[tokio::test]
    async fn test_error_status_without_provider_body_is_network() {
        let base = serve_once("503 Service Unavailable", "<html>down</html>").await;
        let result = local_source(&base).fetch_batch(None).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_token_refusal_on_error_status() {
        let base = serve_once("429 Too Many Requests", r#"{"response_code":5}"#).await;
        let result = local_source(&base).request_token().await;
        assert_eq!(result, Err(TokenError::Provider(ResponseCode::RATE_LIMIT)));
    }

    #[tokio::test]
    async fn test_fetch_batch_over_http() {
        let base = serve_once(
            "200 OK",
            r#"{"response_code":0,"results":[{"question":"Q1","correct_answer":"A","incorrect_answers":["B","C","D"]}]}"#,
        )
        .await;
        let questions = local_source(&base).fetch_batch(Some("tok")).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "Q1");
    }

    #[test]
    fn test_new_source_from_default_config() {
        let source = OpenTdbSource::new(&ApiConfig::default()).unwrap();
        assert_eq!(source.batch_size, 50);
        assert_eq!(source.category, 9);
        assert_eq!(source.question_type, "multiple");
    }
}
