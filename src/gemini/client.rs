use std::sync::Arc;

use crate::config::GeminiConfig;
use crate::credentials::CredentialProvider;
use crate::error::{AppResult, GenerationError};
use crate::models::{GeneratedPost, GenerationRequest};
use crate::prompt::build_prompt;

use super::transport::{
    GenerateContentRequest, GenerationConfig, HttpTransportFactory, ModelTransport, ThinkingConfig,
    TransportError, TransportFactory,
};

const PROBE_PROMPT: &str = "hi";

/// 게시물 생성 / 연결 테스트 클라이언트
///
/// 자격 증명과 전송 바인딩은 호출마다 새로 만듭니다. 키가 사용자 동작 사이에 바뀔 수 있기 때문입니다.
pub struct GenerationClient {
    config: GeminiConfig,
    credentials: Arc<dyn CredentialProvider>,
    transports: Arc<dyn TransportFactory>,
}

impl GenerationClient {
    /// 설정이 유효하지 않으면(온도가 (0, 1] 밖 등) `AppError::Config`
    pub fn new(config: GeminiConfig, credentials: Arc<dyn CredentialProvider>) -> AppResult<Self> {
        let transports = Arc::new(HttpTransportFactory::new(config.base_url.clone()));
        Self::with_transport_factory(config, credentials, transports)
    }

    pub fn with_transport_factory(
        config: GeminiConfig,
        credentials: Arc<dyn CredentialProvider>,
        transports: Arc<dyn TransportFactory>,
    ) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            credentials,
            transports,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    async fn bind(&self) -> Option<Box<dyn ModelTransport>> {
        let api_key = self.credentials.active_credential().await?;
        Some(self.transports.bind(&api_key))
    }

    /// 게시물 생성 (외부 호출 정확히 1회, 재시도 없음)
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedPost, GenerationError> {
        let transport = self.bind().await.ok_or_else(|| {
            tracing::warn!("generation requested without an active API key");
            GenerationError::Credential("API key is not configured".to_string())
        })?;

        let payload = build_prompt(request);
        let body = GenerateContentRequest::user_text(
            payload.instruction,
            GenerationConfig {
                temperature: Some(self.config.temperature),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(payload.response_schema),
                ..Default::default()
            },
        );

        tracing::info!(
            model = %self.config.model,
            strategy = %request.strategy(),
            mood = %request.mood(),
            format = %request.format(),
            knowledge_items = request.knowledge().len(),
            "dispatching generation request"
        );
        tracing::debug!(endpoint = %self.config.endpoint(&self.config.model));

        let response = transport
            .generate_content(&self.config.model, &body)
            .await
            .map_err(|err| {
                let err = classify_transport_error(err);
                tracing::error!(code = err.code(), error = %err, "generation failed");
                err
            })?;

        let text = response.text().ok_or_else(|| {
            tracing::error!("generation response contained no text");
            GenerationError::MalformedResponse("Empty response from model".to_string())
        })?;

        let post = parse_post(&text)?;
        tracing::info!(title = %post.title, slides = post.slides.len(), "generation finished");
        Ok(post)
    }

    /// 저비용 요청으로 키 유효성만 확인 (실패는 모두 false)
    pub async fn probe(&self) -> bool {
        let Some(transport) = self.bind().await else {
            tracing::info!("connection test skipped: no API key");
            return false;
        };

        let body = GenerateContentRequest::user_text(
            PROBE_PROMPT,
            GenerationConfig {
                max_output_tokens: Some(self.config.probe_max_output_tokens),
                thinking_config: Some(ThinkingConfig { thinking_budget: 0 }),
                ..Default::default()
            },
        );

        match transport.generate_content(&self.config.probe_model, &body).await {
            Ok(response) => {
                let ok = response.text().is_some();
                tracing::info!(ok, model = %self.config.probe_model, "connection test finished");
                ok
            }
            Err(err) => {
                tracing::warn!(error = %err, "connection test failed");
                false
            }
        }
    }
}

fn classify_transport_error(err: TransportError) -> GenerationError {
    match err {
        TransportError::Service { message, .. } => GenerationError::from_service_message(message),
        TransportError::InvalidBody(message) => GenerationError::MalformedResponse(message),
    }
}

/// 모델 응답 텍스트를 게시물로 해석
///
/// 비어 있거나 필수 필드가 빠졌거나 enum 라벨이 맞지 않으면 `MalformedResponse`.
pub fn parse_post(text: &str) -> Result<GeneratedPost, GenerationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::MalformedResponse("Empty response from model".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|err| {
        tracing::error!(error = %err, "response does not match the post schema");
        GenerationError::MalformedResponse(format!("Response does not match schema: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use crate::error::{AppError, ErrorKind};
    use crate::gemini::transport::GenerateContentResponse;
    use crate::models::{
        BrandMood, DailyContext, GenerationOptions, KnowledgeItem, KnowledgeKind, PostFormat,
        StrategyType,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Reply = Result<GenerateContentResponse, TransportError>;

    /// 정해진 응답을 돌려주고 요청을 기록하는 전송
    #[derive(Default)]
    struct Scripted {
        reply: Mutex<Option<Reply>>,
        binds: Mutex<Vec<String>>,
        calls: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    }

    impl Scripted {
        fn replying(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                ..Default::default()
            })
        }

        fn calls(&self) -> Vec<(String, serde_json::Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    struct Bound {
        reply: Reply,
        calls: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    }

    #[async_trait]
    impl ModelTransport for Bound {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), serde_json::to_value(request).unwrap()));
            self.reply.clone()
        }
    }

    impl TransportFactory for Scripted {
        fn bind(&self, api_key: &str) -> Box<dyn ModelTransport> {
            self.binds.lock().unwrap().push(api_key.to_string());
            let reply = self
                .reply
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(TransportError::service(None, "no scripted reply")));
            Box::new(Bound {
                reply,
                calls: self.calls.clone(),
            })
        }
    }

    fn client(key: Option<&str>, transport: Arc<Scripted>) -> GenerationClient {
        let credentials: Arc<dyn CredentialProvider> = match key {
            Some(key) => Arc::new(StaticCredentials::new(key)),
            None => Arc::new(StaticCredentials::none()),
        };
        GenerationClient::with_transport_factory(GeminiConfig::default(), credentials, transport)
            .unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            vec![KnowledgeItem::new(KnowledgeKind::Text, "Tip", "Drink water").unwrap()],
            DailyContext::default(),
            GenerationOptions {
                strategy: StrategyType::Value,
                mood: BrandMood::Friendly,
                format: PostFormat::Carousel,
            },
        )
        .unwrap()
    }

    const POST_JSON: &str = r##"{"title":"T","slides":["a","b"],"caption":"c","hashtags":["#x","#y"],"strategyType":"VALUE","brandMood":"FRIENDLY"}"##;

    #[tokio::test]
    async fn generate_returns_fields_in_order() {
        let transport = Scripted::replying(Ok(GenerateContentResponse::from_text(POST_JSON)));
        let post = client(Some("k"), transport.clone()).generate(&request()).await.unwrap();

        assert_eq!(post.title, "T");
        assert_eq!(post.slides, vec!["a", "b"]);
        assert_eq!(post.caption, "c");
        assert_eq!(post.hashtags, vec!["#x", "#y"]);
        assert_eq!(post.strategy_type, StrategyType::Value);
        assert_eq!(post.brand_mood, BrandMood::Friendly);

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (model, body) = &calls[0];
        assert_eq!(model, "gemini-3-pro-preview");
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert!(config["temperature"].as_f64().unwrap() > 0.0);
        assert_eq!(config["responseSchema"]["required"].as_array().unwrap().len(), 6);
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Drink water"));
    }

    #[tokio::test]
    async fn each_call_binds_a_fresh_transport() {
        let transport = Scripted::replying(Ok(GenerateContentResponse::from_text(POST_JSON)));
        let client = client(Some("k"), transport.clone());
        client.generate(&request()).await.unwrap();
        client.generate(&request()).await.unwrap();
        assert_eq!(*transport.binds.lock().unwrap(), vec!["k", "k"]);
    }

    #[tokio::test]
    async fn missing_credential_never_reaches_the_network() {
        let transport = Scripted::replying(Ok(GenerateContentResponse::from_text(POST_JSON)));
        let err = client(None, transport.clone()).generate(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_malformed() {
        let transport = Scripted::replying(Ok(GenerateContentResponse::default()));
        let err = client(Some("k"), transport).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));

        let transport = Scripted::replying(Ok(GenerateContentResponse::from_text("   ")));
        let err = client(Some("k"), transport).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn service_errors_are_classified_by_message() {
        let cases = [
            ("400 Bad Request: API key not valid.", ErrorKind::Credential),
            ("404 Not Found: Requested entity was not found.", ErrorKind::Credential),
            ("429 Too Many Requests: quota exceeded", ErrorKind::Failure),
            ("Gemini API request failed: connection refused", ErrorKind::Failure),
        ];
        for (message, expected) in cases {
            let transport = Scripted::replying(Err(TransportError::service(None, message)));
            let err = client(Some("k"), transport.clone()).generate(&request()).await.unwrap_err();
            assert_eq!(err.kind(), expected, "{message}");
            assert_eq!(transport.calls().len(), 1, "retried on {message}");
        }
    }

    #[tokio::test]
    async fn probe_reports_text_presence_and_swallows_errors() {
        let transport = Scripted::replying(Ok(GenerateContentResponse::from_text("Hi")));
        assert!(client(Some("k"), transport.clone()).probe().await);
        let (model, body) = &transport.calls()[0];
        assert_eq!(model, "gemini-3-flash-preview");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 5);
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 0);

        let transport = Scripted::replying(Ok(GenerateContentResponse::default()));
        assert!(!client(Some("k"), transport).probe().await);

        let transport = Scripted::replying(Err(TransportError::service(Some(401), "401 Unauthorized")));
        assert!(!client(Some("k"), transport).probe().await);

        let transport = Scripted::replying(Ok(GenerateContentResponse::from_text("Hi")));
        assert!(!client(None, transport).probe().await);
    }

    #[test]
    fn constructor_rejects_temperature_outside_unit_interval() {
        for temperature in [0.0, -0.5, 1.5] {
            let config = GeminiConfig {
                temperature,
                ..Default::default()
            };
            let result = GenerationClient::with_transport_factory(
                config,
                Arc::new(StaticCredentials::new("k")),
                Scripted::replying(Ok(GenerateContentResponse::default())),
            );
            assert!(matches!(result, Err(AppError::Config(_))), "accepted {temperature}");
        }

        let config = GeminiConfig {
            temperature: 1.0,
            ..Default::default()
        };
        assert!(GenerationClient::new(config, Arc::new(StaticCredentials::new("k"))).is_ok());
    }

    #[tokio::test]
    async fn network_failure_on_a_url_containing_401_is_a_plain_failure() {
        let config = GeminiConfig {
            base_url: "http://127.0.0.1:1/v1beta-401/models".to_string(),
            model: "model-0401".to_string(),
            ..Default::default()
        };
        let client = GenerationClient::new(config, Arc::new(StaticCredentials::new("k"))).unwrap();

        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Failure(_)), "{err:?}");
        assert_eq!(err.kind(), ErrorKind::Failure);
    }

    #[test]
    fn parse_post_rejects_missing_fields_and_unknown_labels() {
        assert!(parse_post(POST_JSON).is_ok());
        assert!(parse_post(&POST_JSON.replace("\"caption\":\"c\",", "")).is_err());
        assert!(parse_post(&POST_JSON.replace("FRIENDLY", "GRUMPY")).is_err());
        assert!(parse_post("not json").is_err());
        assert!(matches!(parse_post(""), Err(GenerationError::MalformedResponse(_))));
    }

    #[test]
    fn parse_post_accepts_legacy_mood_field() {
        let legacy = POST_JSON.replace("brandMood", "mood");
        assert_eq!(parse_post(&legacy).unwrap().brand_mood, BrandMood::Friendly);
    }
}
