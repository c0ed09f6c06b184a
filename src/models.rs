//! Brand Studio Data Models
//!
//! 프론트엔드(TypeScript) 타입과 매핑되는 도메인 데이터 모델

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, GenerationError};

/// 콘텐츠 전략 (7-2-1 황금 비율)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    /// 가치 제공 (70%)
    Value,
    /// 관계 형성 (20%)
    Relationship,
    /// 구매 유도 (10%)
    Sales,
}

impl StrategyType {
    pub const ALL: [StrategyType; 3] = [
        StrategyType::Value,
        StrategyType::Relationship,
        StrategyType::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::Value => "VALUE",
            StrategyType::Relationship => "RELATIONSHIP",
            StrategyType::Sales => "SALES",
        }
    }

    /// UI 표시용 라벨
    pub fn label(&self) -> &'static str {
        match self {
            StrategyType::Value => "가치 제공 (70%)",
            StrategyType::Relationship => "관계 형성 (20%)",
            StrategyType::Sales => "구매 유도 (10%)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyType::Value => "전문 대표의 노하우 전수",
            StrategyType::Relationship => "나의 진솔한 철학 공유",
            StrategyType::Sales => "진심을 담은 서비스 제안",
        }
    }
}

impl FromStr for StrategyType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyType::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GenerationError::Validation(format!("Unknown strategy type: {s:?}")))
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 브랜드 무드 (문체 페르소나)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrandMood {
    Professional,
    Friendly,
    Emotional,
    Energetic,
}

impl BrandMood {
    pub const ALL: [BrandMood; 4] = [
        BrandMood::Professional,
        BrandMood::Friendly,
        BrandMood::Emotional,
        BrandMood::Energetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrandMood::Professional => "PROFESSIONAL",
            BrandMood::Friendly => "FRIENDLY",
            BrandMood::Emotional => "EMOTIONAL",
            BrandMood::Energetic => "ENERGETIC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BrandMood::Professional => "전문가형",
            BrandMood::Friendly => "친근한 형",
            BrandMood::Emotional => "감성가형",
            BrandMood::Energetic => "열정가형",
        }
    }
}

impl FromStr for BrandMood {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrandMood::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GenerationError::Validation(format!("Unknown brand mood: {s:?}")))
    }
}

impl fmt::Display for BrandMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 출력 포맷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostFormat {
    /// 카드뉴스
    Carousel,
    /// 단일 피드
    Single,
    /// 릴스 대본
    Reels,
}

impl PostFormat {
    pub const ALL: [PostFormat; 3] = [PostFormat::Carousel, PostFormat::Single, PostFormat::Reels];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostFormat::Carousel => "CAROUSEL",
            PostFormat::Single => "SINGLE",
            PostFormat::Reels => "REELS",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostFormat::Carousel => "카드뉴스",
            PostFormat::Single => "단일 피드",
            PostFormat::Reels => "릴스 대본",
        }
    }
}

impl FromStr for PostFormat {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostFormat::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GenerationError::Validation(format!("Unknown post format: {s:?}")))
    }
}

impl fmt::Display for PostFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 오늘의 날씨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Sunny, Weather::Cloudy, Weather::Rainy, Weather::Snowy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "Sunny",
            Weather::Cloudy => "Cloudy",
            Weather::Rainy => "Rainy",
            Weather::Snowy => "Snowy",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Weather::Sunny => "☀️",
            Weather::Cloudy => "☁️",
            Weather::Rainy => "🌧️",
            Weather::Snowy => "❄️",
        }
    }
}

impl FromStr for Weather {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weather::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GenerationError::Validation(format!("Unknown weather: {s:?}")))
    }
}

/// 나의 기분 (브랜드 무드와는 별개인 오늘의 감정)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DailyMood {
    Energetic,
    Peaceful,
    Focused,
    Creative,
    Melancholy,
}

impl DailyMood {
    pub const ALL: [DailyMood; 5] = [
        DailyMood::Energetic,
        DailyMood::Peaceful,
        DailyMood::Focused,
        DailyMood::Creative,
        DailyMood::Melancholy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DailyMood::Energetic => "Energetic",
            DailyMood::Peaceful => "Peaceful",
            DailyMood::Focused => "Focused",
            DailyMood::Creative => "Creative",
            DailyMood::Melancholy => "Melancholy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DailyMood::Energetic => "활기찬",
            DailyMood::Peaceful => "평온한",
            DailyMood::Focused => "몰입한",
            DailyMood::Creative => "영감받은",
            DailyMood::Melancholy => "차분한",
        }
    }
}

impl FromStr for DailyMood {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DailyMood::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GenerationError::Validation(format!("Unknown daily mood: {s:?}")))
    }
}

/// 선택 해제 상태를 빈 문자열로 저장하는 라벨 직렬화
mod blank_label {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label.parse().map(Some).map_err(de::Error::custom),
        }
    }
}

/// 오늘의 맥락
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyContext {
    #[serde(default, with = "blank_label")]
    pub weather: Option<Weather>,
    #[serde(default, with = "blank_label")]
    pub mood: Option<DailyMood>,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub story: String,
}

impl DailyContext {
    /// 이미 선택된 날씨를 다시 고르면 선택 해제
    pub fn select_weather(&mut self, weather: Weather) {
        self.weather = if self.weather == Some(weather) {
            None
        } else {
            Some(weather)
        };
    }

    /// 이미 선택된 기분을 다시 고르면 선택 해제
    pub fn select_mood(&mut self, mood: DailyMood) {
        self.mood = if self.mood == Some(mood) {
            None
        } else {
            Some(mood)
        };
    }

    pub fn is_empty(&self) -> bool {
        self.weather.is_none()
            && self.mood.is_none()
            && self.event.trim().is_empty()
            && self.story.trim().is_empty()
    }
}

/// 지식 항목의 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeKind {
    File,
    Text,
}

/// 지식 저장소 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: KnowledgeKind,
    pub title: String,
    pub content: String,
    #[serde(rename = "timestamp", alias = "createdAt")]
    pub created_at: i64,
}

impl KnowledgeItem {
    /// 새 지식 항목 생성 (제목과 내용은 필수)
    pub fn new(
        kind: KnowledgeKind,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, AppError> {
        let title = title.into();
        let content = content.into();
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Knowledge title must not be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(AppError::InvalidInput("Knowledge content must not be empty".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title,
            content,
            created_at: chrono::Utc::now().timestamp_millis(),
        })
    }
}

/// 생성 옵션 (전략 / 무드 / 포맷)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub strategy: StrategyType,
    pub mood: BrandMood,
    pub format: PostFormat,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyType::Value,
            mood: BrandMood::Professional,
            format: PostFormat::Carousel,
        }
    }
}

/// 한 번의 생성 동작에 대한 요청 (저장되지 않음)
///
/// 지식이 비어 있으면 생성할 수 없으므로, 생성자에서 검증합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    knowledge: Vec<KnowledgeItem>,
    context: DailyContext,
    options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(
        knowledge: Vec<KnowledgeItem>,
        context: DailyContext,
        options: GenerationOptions,
    ) -> Result<Self, GenerationError> {
        if knowledge.is_empty() {
            return Err(GenerationError::Validation(
                "지식 저장소에 데이터를 먼저 추가해주세요!".to_string(),
            ));
        }
        Ok(Self {
            knowledge,
            context,
            options,
        })
    }

    /// 프론트엔드에서 넘어온 문자열 라벨로 요청 생성
    ///
    /// 정의되지 않은 라벨은 기본값으로 대체하지 않고 `Validation` 에러를 반환합니다.
    pub fn from_labels(
        knowledge: Vec<KnowledgeItem>,
        context: DailyContext,
        strategy: &str,
        mood: &str,
        format: &str,
    ) -> Result<Self, GenerationError> {
        let options = GenerationOptions {
            strategy: strategy.parse()?,
            mood: mood.parse()?,
            format: format.parse()?,
        };
        Self::new(knowledge, context, options)
    }

    pub fn knowledge(&self) -> &[KnowledgeItem] {
        &self.knowledge
    }

    pub fn context(&self) -> &DailyContext {
        &self.context
    }

    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    pub fn strategy(&self) -> StrategyType {
        self.options.strategy
    }

    pub fn mood(&self) -> BrandMood {
        self.options.mood
    }

    pub fn format(&self) -> PostFormat {
        self.options.format
    }
}

/// 모델이 생성한 게시물
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub title: String,
    pub slides: Vec<String>,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub strategy_type: StrategyType,
    #[serde(alias = "mood")]
    pub brand_mood: BrandMood,
}

impl GeneratedPost {
    /// 전체 복사용 텍스트
    pub fn full_text(&self) -> String {
        let slides = self
            .slides
            .iter()
            .enumerate()
            .map(|(i, s)| format!("Slide {}: {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "[{}]\n\n{}\n\n--- Caption ---\n{}\n\n{}",
            self.title,
            slides,
            self.caption,
            self.hashtags.join(" ")
        )
    }

    /// 슬라이드만 복사
    pub fn slides_text(&self) -> String {
        self.slides
            .iter()
            .enumerate()
            .map(|(i, s)| format!("[슬라이드 {}]\n{}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// 캡션 + 해시태그 복사
    pub fn caption_text(&self) -> String {
        format!("{}\n\n{}", self.caption, self.hashtags.join(" "))
    }
}

/// 성공 보관함에 저장된 게시물
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPost {
    #[serde(flatten)]
    pub post: GeneratedPost,
    pub id: String,
    pub saved_at: i64,
}

impl SavedPost {
    pub fn from_generated(post: GeneratedPost) -> Self {
        Self {
            post,
            id: Uuid::new_v4().to_string(),
            saved_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
