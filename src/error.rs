//! 콘솔 전용 에러 타입: 설정, 전송 계층, 페이로드 오류를 구분합니다.
//!
//! UI 흐름 안의 실패(저장 실패, 잘못된 텔레메트리)는 에러가 아니라 화면 상태로
//! 표현되므로 여기에는 연결/설정 단계의 실패만 모입니다.

/// 콘솔 초기화 및 채널 연결 중 발생할 수 있는 에러 유형
#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Channel transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ConsoleError {
    /// 머신 리더블 에러 코드
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "INVALID_CONFIG",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Payload(_) => "MALFORMED_PAYLOAD",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// JSON 에러 표현 (헤드리스 모드 출력용)
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        })
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
