//! OpenAI 호환 코드 생성 클라이언트.
//!
//! `POST {base_url}/chat/completions`로 시스템 지시문과 사용자 전략 설명을
//! 전송하고, 응답 텍스트에서 코드를 추출합니다.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use stratgen_core::{
    load_api_key, ArtifactNaming, CodegenConfig, GeneratedArtifact, PipelineError,
    PipelineResult, DEFAULT_ARTIFACT_NAME,
};
use tracing::{debug, error, info, warn};

use crate::extract::extract_code_block;
use crate::prompt::SYSTEM_INSTRUCTION;
use crate::types::{
    ApiErrorEnvelope, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CodeGenerator,
};

/// 자격증명 누락 시 사유 메시지.
pub const MISSING_API_KEY: &str = "OPENAI_API_KEY is not set in the environment";

/// OpenAI 호환 코드 생성기.
pub struct OpenAiCodeGenerator {
    config: CodegenConfig,
    api_key: Option<SecretString>,
    naming: ArtifactNaming,
    artifact_name: String,
    client: reqwest::Client,
}

impl OpenAiCodeGenerator {
    /// 새 코드 생성기를 생성합니다.
    ///
    /// 자격증명이 없어도 생성은 성공하며, 첫 `generate` 호출에서
    /// 네트워크 요청 전에 `Configuration` 에러를 반환합니다.
    pub fn new(config: CodegenConfig, api_key: Option<SecretString>) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Configuration(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            config,
            api_key,
            naming: ArtifactNaming::Fixed,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            client,
        })
    }

    /// `OPENAI_API_KEY` 환경 변수에서 자격증명을 읽어 생성합니다.
    pub fn from_env(config: CodegenConfig) -> PipelineResult<Self> {
        Self::new(config, load_api_key())
    }

    /// 아티팩트 명명 방식을 설정합니다.
    #[must_use]
    pub fn with_artifact_naming(
        mut self,
        naming: ArtifactNaming,
        artifact_name: impl Into<String>,
    ) -> Self {
        self.naming = naming;
        self.artifact_name = artifact_name.into();
        self
    }

    /// 자격증명 설정 여부.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request(&self, text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_INSTRUCTION), ChatMessage::user(text)],
            temperature: self.config.temperature,
        }
    }

    /// 모델 응답 텍스트를 요청합니다.
    async fn request_completion(&self, api_key: &SecretString, text: &str) -> PipelineResult<String> {
        let url = self.completions_url();
        let body = self.build_request(text);

        debug!(model = %self.config.model, %url, "Sending code generation request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(transport_error)?;
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);

            error!(status = status.as_u16(), %message, "Code generation request failed");
            return Err(PipelineError::upstream_status(status.as_u16(), message));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                PipelineError::timeout()
            } else {
                PipelineError::upstream(format!("malformed completion response: {e}"))
            }
        })?;

        completion.first_content().ok_or_else(|| {
            PipelineError::upstream("completion response contained no message content")
        })
    }
}

fn transport_error(err: reqwest::Error) -> PipelineError {
    if err.is_timeout() {
        warn!("Code generation request timed out");
        PipelineError::timeout()
    } else {
        error!(error = %err, "Code generation transport error");
        PipelineError::upstream(err.to_string())
    }
}

#[async_trait]
impl CodeGenerator for OpenAiCodeGenerator {
    async fn generate(&self, text: &str) -> PipelineResult<GeneratedArtifact> {
        let Some(api_key) = self.api_key.as_ref() else {
            warn!("Code generation requested without credential");
            return Err(PipelineError::Configuration(MISSING_API_KEY.to_string()));
        };

        let raw = self.request_completion(api_key, text).await?;
        let extracted = extract_code_block(&raw);
        if !extracted.is_fenced() {
            warn!("No fenced code block in completion, using raw response");
        }

        let identifier = self.naming.identifier_for(&self.artifact_name);
        info!(
            %identifier,
            bytes = extracted.code().len(),
            fenced = extracted.is_fenced(),
            "Strategy code generated"
        );

        Ok(GeneratedArtifact::new(extracted.into_code(), identifier))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(base_url: &str, api_key: Option<&str>) -> OpenAiCodeGenerator {
        let config = CodegenConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..Default::default()
        };
        OpenAiCodeGenerator::new(config, api_key.map(|k| SecretString::new(k.into()))).unwrap()
    }

    fn stalling_generator(base_url: &str) -> OpenAiCodeGenerator {
        let config = CodegenConfig {
            base_url: base_url.to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        OpenAiCodeGenerator::new(config, Some(SecretString::new("sk-test".into()))).unwrap()
    }

    /// 요청을 읽고 `prefix`만 보낸 뒤 응답을 끝내지 않는 서버.
    async fn stalled_server(prefix: &'static [u8]) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(prefix).await;
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let err = generator(&server.url(), None)
            .generate("buy when RSI < 30")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Configuration(_)));
        assert_eq!(err.reason(), MISSING_API_KEY);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_extracts_fenced_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::PartialJson(serde_json::json!({
                    "model": "gpt-4o",
                    "temperature": 0.0
                })),
                mockito::Matcher::Regex("buy when RSI < 30".to_string()),
                mockito::Matcher::Regex("run_strategy".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                "```python\ndef run_strategy(df):\n    return {}\n```",
            ))
            .expect(1)
            .create_async()
            .await;

        let artifact = generator(&server.url(), Some("sk-test"))
            .generate("buy when RSI < 30")
            .await
            .unwrap();

        assert_eq!(artifact.source_code, "def run_strategy(df):\n    return {}");
        assert_eq!(artifact.identifier, "run_strategy.py");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_per_request_identifier() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body("x = 1"))
            .expect(2)
            .create_async()
            .await;

        let generator = generator(&server.url(), Some("sk-test"))
            .with_artifact_naming(ArtifactNaming::PerRequest, "run_strategy.py");

        let a = generator.generate("a").await.unwrap();
        let b = generator.generate("b").await.unwrap();

        assert_eq!(a.source_code, "x = 1");
        assert_ne!(a.identifier, b.identifier);
    }

    #[tokio::test]
    async fn test_http_error_is_upstream_with_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#)
            .create_async()
            .await;

        let err = generator(&server.url(), Some("sk-bad"))
            .generate("buy")
            .await
            .unwrap_err();

        match &err {
            PipelineError::Upstream { status, message } => {
                assert_eq!(*status, Some(401));
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_error_with_plain_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("service unavailable")
            .create_async()
            .await;

        let err = generator(&server.url(), Some("sk-test"))
            .generate("buy")
            .await
            .unwrap_err();

        assert_eq!(err.reason(), "HTTP 503: service unavailable");
    }

    #[tokio::test]
    async fn test_missing_content_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = generator(&server.url(), Some("sk-test"))
            .generate("buy")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Upstream { status: None, .. }));
        assert!(err.reason().contains("no message content"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_upstream_error() {
        // 닫힌 포트
        let err = generator("http://127.0.0.1:9", Some("sk-test"))
            .generate("buy")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_stalled_server_is_timeout() {
        let url = stalled_server(b"").await;

        let err = stalling_generator(&url).generate("buy").await.unwrap_err();

        assert_eq!(err.reason(), "timeout");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_error_body_read_timeout_is_not_swallowed() {
        let url = stalled_server(
            b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 100\r\n\r\nservice",
        )
        .await;

        let err = stalling_generator(&url).generate("buy").await.unwrap_err();

        assert_eq!(err.reason(), "timeout");
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let generator = generator("https://api.example.com/v1/", Some("k"));
        assert_eq!(
            generator.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
        assert!(generator.has_credential());
        assert_eq!(generator.name(), "openai");
    }
}
