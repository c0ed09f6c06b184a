//! Gemini 생성 클라이언트
//!
//! - `classify`: 실패 메시지 분류
//! - `transport`: REST 와이어 타입과 호출별 HTTP 바인딩
//! - `client`: 게시물 생성과 연결 테스트

mod classify;
mod client;
pub mod transport;

pub use classify::{classify_error, CREDENTIAL_ERROR_MARKERS};
pub use client::{parse_post, GenerationClient};
pub use transport::{HttpTransportFactory, ModelTransport, TransportError, TransportFactory};
