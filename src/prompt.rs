//! Prompt Builder
//!
//! 지식 항목, 오늘의 맥락, 전략/무드/포맷을 하나의 지시문과 응답 스키마로 조립합니다.
//! 순수 함수이므로 같은 요청은 항상 바이트 단위로 같은 결과를 만듭니다.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::models::{BrandMood, DailyContext, GenerationRequest, PostFormat, StrategyType};

/// 인스타그램 콘텐츠 전략 원칙 (고정)
pub const SYSTEM_STRATEGY: &str = r#"# Instagram Content Strategy System

## CORE PRINCIPLES
1. SAVE-worthy (Value)
2. SHARE-worthy (Empathy)
3. FOLLOW-worthy (Trust)

## 7-2-1 GOLDEN RATIO
- 70% VALUE (Education, Info, Tips)
- 20% RELATIONSHIP (Behind scenes, Personal stories, Q&A)
- 10% SALES (Product promo, Service intro)

## CONTENT TYPES
### 1. VALUE (70%)
- How-to / Educational
- Lists / Checklists
- Before & After / Comparison
- Mistakes to avoid
- Insights / Trends

### 2. RELATIONSHIP (20%)
- Behind the scenes
- Personal stories (Why I started, Failure/Success)
- Questions / Polls
- Gratitude / Milestones
- Life Balance

### 3. SALES (10%)
- Product/Service Intro
- Testimonials / Case Studies
- Limited Offers
- FAQ / Objection handling
- Competitive Advantage (Why Us)

## HOOK & STRUCTURE (AIDA)
- Attention: Powerful headline / hook
- Interest: Empathy, problem statement
- Desire: Solution, value
- Action: Clear CTA (Save, Share, Follow)"#;

/// 응답에 반드시 포함되어야 하는 필드
pub const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "slides",
    "caption",
    "hashtags",
    "strategyType",
    "brandMood",
];

/// 모델에 전달할 지시문과 응답 스키마
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    pub instruction: String,
    pub response_schema: Value,
}

/// 무드별 문체 가이드 (페르소나 / 문장 길이·격식 / 이모지 밀도)
pub fn mood_style_guide(mood: BrandMood) -> &'static str {
    match mood {
        BrandMood::Professional => {
            "냉철하고 논리적인 전문가 문체. 수치와 데이터 중심, 격식체 사용. 이모지는 거의 쓰지 않음."
        }
        BrandMood::Friendly => {
            "따뜻하고 상냥한 이웃집 대표님 문체. 질문형 문장과 이모지 활용."
        }
        BrandMood::Emotional => {
            "비유와 은유를 활용한 서사적 표현. 시적인 리듬감과 감성 어휘 사용. 이모지는 여운을 남길 때만."
        }
        BrandMood::Energetic => {
            "짧고 강렬한 단문, 느낌표와 행동 촉구형 동사 사용. 이모지를 적극적으로 사용."
        }
    }
}

/// 포맷별 구성 가이드
pub fn format_guide(format: PostFormat) -> &'static str {
    match format {
        PostFormat::Carousel => {
            "카드뉴스: slides에 5~8장의 카드 문구를 순서대로 작성. 첫 장은 Hook, 마지막 장은 CTA."
        }
        PostFormat::Single => {
            "단일 피드: slides에 이미지 위에 올릴 핵심 문구 1개만 작성하고, 본문은 caption에 집중."
        }
        PostFormat::Reels => {
            "릴스 대본: slides의 각 항목을 장면(Scene) 단위 대사/자막으로 작성. 첫 3초 안에 Hook."
        }
    }
}

fn strategy_intent(strategy: StrategyType) -> &'static str {
    match strategy {
        StrategyType::Value => "저장하고 싶은 노하우와 정보를 전달",
        StrategyType::Relationship => "대표의 진솔한 이야기로 신뢰와 공감을 형성",
        StrategyType::Sales => "진심을 담아 서비스를 제안하고 행동을 유도",
    }
}

static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let strategies: Vec<&str> = StrategyType::ALL.iter().map(|s| s.as_str()).collect();
    let moods: Vec<&str> = BrandMood::ALL.iter().map(|m| m.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "slides": { "type": "ARRAY", "items": { "type": "STRING" } },
            "caption": { "type": "STRING" },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "strategyType": { "type": "STRING", "format": "enum", "enum": strategies },
            "brandMood": { "type": "STRING", "format": "enum", "enum": moods }
        },
        "required": REQUIRED_FIELDS,
        "propertyOrdering": REQUIRED_FIELDS
    })
});

/// 응답 스키마 (Gemini `responseSchema` 형식)
pub fn response_schema() -> Value {
    RESPONSE_SCHEMA.clone()
}

/// 지식 항목을 호출 순서대로 직렬화
fn render_knowledge(request: &GenerationRequest) -> String {
    request
        .knowledge()
        .iter()
        .map(|k| format!("[참조 데이터: {}]\n{}", k.title, k.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 비어 있는 필드는 출력하지 않음
fn render_context(context: &DailyContext) -> String {
    let mut lines = Vec::new();
    if let Some(weather) = context.weather {
        lines.push(format!("- 날씨: {} {}", weather.as_str(), weather.icon()));
    }
    if let Some(mood) = context.mood {
        lines.push(format!("- 대표의 기분: {} ({})", mood.label(), mood.as_str()));
    }
    let event = context.event.trim();
    if !event.is_empty() {
        lines.push(format!("- 오늘의 이벤트: {event}"));
    }
    let story = context.story.trim();
    if !story.is_empty() {
        lines.push(format!("- 오늘의 이야기: {story}"));
    }

    if lines.is_empty() {
        "- (특별한 맥락 없음)".to_string()
    } else {
        lines.join("\n")
    }
}

/// 생성 요청으로부터 지시문과 스키마를 조립
pub fn build_prompt(request: &GenerationRequest) -> PromptPayload {
    let strategy = request.strategy();
    let mood = request.mood();
    let format = request.format();
    let story = request.context().story.trim();
    let story_hint = if story.is_empty() {
        "오늘의 맥락을 대표의 경험으로 녹여내기".to_string()
    } else {
        format!("오늘의 맥락: {story}")
    };

    let mut instruction = String::new();
    instruction.push_str(SYSTEM_STRATEGY);
    instruction.push_str("\n\n---\n\n");
    instruction.push_str("당신은 브랜드 대표입니다. 1인칭 시점으로 작성하세요.\n");
    instruction.push_str(&format!(
        "브랜드 무드: {} ({})\n",
        mood.as_str(),
        mood_style_guide(mood)
    ));
    instruction.push_str(&format!(
        "전략: {} - {}\n",
        strategy.as_str(),
        strategy_intent(strategy)
    ));
    instruction.push_str(&format!("포맷: {} - {}\n", format.as_str(), format_guide(format)));

    instruction.push_str("\n[구성]\n");
    instruction.push_str("1. Hook (후킹 문구)\n");
    instruction.push_str("2. Empathy (공감)\n");
    instruction.push_str("3. Value (참조 데이터 기반 가치)\n");
    instruction.push_str(&format!("4. Story ({story_hint})\n"));
    instruction.push_str("5. CTA (행동 유도)\n");

    instruction.push_str("\n[오늘의 맥락]\n");
    instruction.push_str(&render_context(request.context()));
    instruction.push('\n');

    instruction.push_str("\n[참조 데이터]\n");
    instruction.push_str(&render_knowledge(request));
    instruction.push('\n');

    instruction.push_str(&format!(
        "\nstrategyType은 \"{}\", brandMood는 \"{}\"로 응답하세요.\n",
        strategy.as_str(),
        mood.as_str()
    ));
    instruction.push_str("hashtags의 각 항목은 #으로 시작해야 합니다.\n");
    instruction.push_str("반드시 지정된 JSON 형식으로만 응답하세요.");

    PromptPayload {
        instruction,
        response_schema: response_schema(),
    }
}
