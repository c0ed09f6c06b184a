//! Gemini REST 전송 계층
//!
//! `generateContent` 요청/응답 와이어 타입과, 호출마다 새로 만들어지는 HTTP 바인딩.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 전송 계층 실패
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// 네트워크 / 서비스가 돌려준 실패 (메시지로 분류됨)
    #[error("{message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// 전송은 성공했지만 응답 봉투를 해석할 수 없음
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

impl TransportError {
    pub fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        TransportError::Service {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// 사용자 텍스트 1개짜리 요청
    pub fn user_text(text: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: text.into() }],
            }],
            generation_config: Some(config),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ContentResponse>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartResponse {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// 첫 번째 후보의 텍스트 파트를 이어 붙인 결과 (없으면 None)
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.as_ref()?.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// 텍스트 한 덩어리를 담은 응답 (스텁/테스트용)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(ContentResponse {
                    parts: vec![PartResponse {
                        text: Some(text.into()),
                    }],
                }),
            }]),
        }
    }
}

/// 자격 증명이 묶인 단일 호출용 전송
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransportError>;
}

/// 호출마다 새 전송 바인딩을 만드는 팩토리
pub trait TransportFactory: Send + Sync {
    fn bind(&self, api_key: &str) -> Box<dyn ModelTransport>;
}

/// reqwest 기반 팩토리
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    base_url: String,
}

impl HttpTransportFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn bind(&self, api_key: &str) -> Box<dyn ModelTransport> {
        Box::new(HttpTransport {
            client: Client::new(),
            base_url: self.base_url.clone(),
            api_key: api_key.to_string(),
        })
    }
}

/// Gemini REST `generateContent` 호출
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransportError> {
        let url = format!("{}/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                // 요청 URL(베이스 URL, 모델 ID)은 분류 대상 메시지에 넣지 않음
                TransportError::service(None, format!("Gemini API request failed: {}", err.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            TransportError::service(
                Some(status.as_u16()),
                format!("Failed to read Gemini response: {}", err.without_url()),
            )
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|err| TransportError::InvalidBody(format!("Failed to parse Gemini response: {err}")))
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// `"{code} {reason}: {STATUS}: {message}"` 형태로 정리 (분류 키워드가 살아 있도록 원문 유지)
fn map_http_error(status: StatusCode, body: &str) -> TransportError {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    let reason = status.canonical_reason().unwrap_or("Unknown");
    TransportError::service(
        Some(status.as_u16()),
        format!("{} {}: {}", status.as_u16(), reason, detail),
    )
}
