//! tracing을 사용한 로깅 초기화.
//!
//! 출력 형식:
//! - **pretty**: 개발용 여러 줄 형식
//! - **json**: 로그 수집기용 JSON 형식
//! - **compact**: 한 줄 형식

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{CoreError, CoreResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(CoreError::InvalidInput(format!("unknown log format: {other}"))),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 레벨 필터 (예: "info", "pricefeed_data=debug")
    pub level: String,
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_file: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// 애플리케이션 설정에서 생성합니다.
    ///
    /// `LOG_FORMAT` 환경 변수가 있으면 설정 파일의 형식보다 우선합니다.
    /// 알 수 없는 형식은 pretty로 대체합니다.
    pub fn from_app(config: &LoggingConfig) -> Self {
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .or_else(|| config.format.parse().ok())
            .unwrap_or_default();

        Self {
            level: config.level.clone(),
            format,
            with_file: format != LogFormat::Compact,
            ..Default::default()
        }
    }
}

/// 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 `level`보다 우선합니다.
/// 두 번째 호출은 에러를 반환합니다.
pub fn init_logging(config: &LogConfig) -> CoreResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| CoreError::Config(format!("invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let base = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(config.with_target);

    let result = match config.format {
        LogFormat::Pretty => registry.with(base.pretty()).try_init(),
        LogFormat::Json => registry.with(base.json()).try_init(),
        LogFormat::Compact => registry.with(base.compact()).try_init(),
    };
    result.map_err(|e| CoreError::Config(format!("logging already initialized: {e}")))?;

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_from_app_config() {
        let app = LoggingConfig {
            level: "debug".to_string(),
            format: "compact".to_string(),
        };
        let config = LogConfig::from_app(&app);
        assert_eq!(config.level, "debug");
        if std::env::var("LOG_FORMAT").is_err() {
            assert_eq!(config.format, LogFormat::Compact);
            assert!(!config.with_file);
        }
    }
}
