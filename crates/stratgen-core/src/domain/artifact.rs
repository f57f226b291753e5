//! 생성된 전략 코드 아티팩트.

use serde::{Deserialize, Serialize};

/// 기본 아티팩트 파일명.
pub const DEFAULT_ARTIFACT_NAME: &str = "run_strategy.py";

/// 코드 생성 결과물.
///
/// `identifier`는 저장소 안에서의 파일명입니다. 고정 명명 방식에서는
/// 매번 같은 이름이므로 마지막으로 쓴 아티팩트가 이전 것을 덮어씁니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// 추출된 전략 소스 코드
    pub source_code: String,
    /// 저장소 식별자 (파일명)
    pub identifier: String,
}

impl GeneratedArtifact {
    /// 새 아티팩트를 생성합니다.
    pub fn new(source_code: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            identifier: identifier.into(),
        }
    }
}

/// 아티팩트 식별자 명명 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// 고정 이름 (단일 사용자 배포, 마지막 쓰기 우선)
    #[default]
    Fixed,
    /// 요청마다 고유한 이름 (`<stem>_<uuid>.<ext>`)
    PerRequest,
}

impl ArtifactNaming {
    /// 기본 파일명으로부터 이번 요청의 식별자를 만듭니다.
    pub fn identifier_for(&self, base_name: &str) -> String {
        match self {
            Self::Fixed => base_name.to_string(),
            Self::PerRequest => {
                let id = uuid::Uuid::new_v4().simple();
                match base_name.rsplit_once('.') {
                    Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{id}.{ext}"),
                    _ => format!("{base_name}_{id}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_naming_is_stable() {
        let naming = ArtifactNaming::Fixed;
        assert_eq!(naming.identifier_for(DEFAULT_ARTIFACT_NAME), "run_strategy.py");
        assert_eq!(
            naming.identifier_for(DEFAULT_ARTIFACT_NAME),
            naming.identifier_for(DEFAULT_ARTIFACT_NAME)
        );
    }

    #[test]
    fn test_per_request_naming_is_unique() {
        let naming = ArtifactNaming::PerRequest;
        let a = naming.identifier_for(DEFAULT_ARTIFACT_NAME);
        let b = naming.identifier_for(DEFAULT_ARTIFACT_NAME);

        assert_ne!(a, b);
        assert!(a.starts_with("run_strategy_"));
        assert!(a.ends_with(".py"));
    }

    #[test]
    fn test_per_request_naming_without_extension() {
        let id = ArtifactNaming::PerRequest.identifier_for("strategy");
        assert!(id.starts_with("strategy_"));
        assert!(!id.contains('.'));
    }

    #[test]
    fn test_naming_deserialize() {
        let naming: ArtifactNaming = serde_json::from_str(r#""per_request""#).unwrap();
        assert_eq!(naming, ArtifactNaming::PerRequest);
    }
}
