//! Studio
//!
//! 애플리케이션 상태 계층: 지식 저장소, 오늘의 맥락, 보관함, 생성 옵션, 현재 결과.
//! 변경이 일어날 때마다 해당 레코드를 `StateRepository`에 저장합니다.
//! 생성 클라이언트는 이 상태를 읽기만 하며(요청 복사본), 결과 반영은 호출이 끝난 뒤에 합니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{AppError, AppResult, GenerationError};
use crate::gemini::GenerationClient;
use crate::knowledge;
use crate::models::{
    DailyContext, DailyMood, GeneratedPost, GenerationOptions, GenerationRequest, KnowledgeItem,
    KnowledgeKind, SavedPost, Weather,
};
use crate::repository::{self, StateRepository, CONTEXT_KEY, HISTORY_KEY, KNOWLEDGE_KEY};

pub struct Studio {
    repo: Box<dyn StateRepository>,
    knowledge: Vec<KnowledgeItem>,
    context: DailyContext,
    history: Vec<SavedPost>,
    options: GenerationOptions,
    current: Option<GeneratedPost>,
}

impl Studio {
    /// 저장소에서 상태 복원 (없거나 깨진 레코드는 빈 기본값)
    pub fn load(repo: Box<dyn StateRepository>) -> AppResult<Self> {
        let knowledge: Vec<KnowledgeItem> =
            repository::load(repo.as_ref(), KNOWLEDGE_KEY)?.unwrap_or_default();
        let context: DailyContext = repository::load(repo.as_ref(), CONTEXT_KEY)?.unwrap_or_default();
        let history: Vec<SavedPost> =
            repository::load(repo.as_ref(), HISTORY_KEY)?.unwrap_or_default();

        tracing::info!(
            knowledge = knowledge.len(),
            history = history.len(),
            "studio state loaded"
        );

        Ok(Self {
            repo,
            knowledge,
            context,
            history,
            options: GenerationOptions::default(),
            current: None,
        })
    }

    // 저장이 성공한 값만 메모리에 반영 (실패하면 이전 상태 유지)

    fn commit_knowledge(&mut self, knowledge: Vec<KnowledgeItem>) -> AppResult<()> {
        repository::save(self.repo.as_ref(), KNOWLEDGE_KEY, &knowledge)?;
        self.knowledge = knowledge;
        Ok(())
    }

    fn commit_context(&mut self, context: DailyContext) -> AppResult<&DailyContext> {
        repository::save(self.repo.as_ref(), CONTEXT_KEY, &context)?;
        self.context = context;
        Ok(&self.context)
    }

    fn commit_history(&mut self, history: Vec<SavedPost>) -> AppResult<()> {
        repository::save(self.repo.as_ref(), HISTORY_KEY, &history)?;
        self.history = history;
        Ok(())
    }

    // ---------------------------------------------------------------
    // 지식 저장소
    // ---------------------------------------------------------------

    /// 최신 항목이 앞
    pub fn knowledge(&self) -> &[KnowledgeItem] {
        &self.knowledge
    }

    pub fn add_knowledge(&mut self, item: KnowledgeItem) -> AppResult<KnowledgeItem> {
        let mut knowledge = Vec::with_capacity(self.knowledge.len() + 1);
        knowledge.push(item.clone());
        knowledge.extend(self.knowledge.iter().cloned());
        self.commit_knowledge(knowledge)?;
        Ok(item)
    }

    pub fn add_text_knowledge(&mut self, title: &str, content: &str) -> AppResult<KnowledgeItem> {
        let item = KnowledgeItem::new(KnowledgeKind::Text, title.trim(), content)?;
        self.add_knowledge(item)
    }

    pub fn import_knowledge_file(&mut self, path: &str) -> AppResult<KnowledgeItem> {
        let item = knowledge::import_file(path)?;
        self.add_knowledge(item)
    }

    pub fn remove_knowledge(&mut self, id: &str) -> AppResult<()> {
        if !self.knowledge.iter().any(|k| k.id == id) {
            return Err(AppError::KnowledgeNotFound(id.to_string()));
        }
        let knowledge = self.knowledge.iter().filter(|k| k.id != id).cloned().collect();
        self.commit_knowledge(knowledge)
    }

    // ---------------------------------------------------------------
    // 오늘의 맥락
    // ---------------------------------------------------------------

    pub fn context(&self) -> &DailyContext {
        &self.context
    }

    pub fn select_weather(&mut self, weather: Weather) -> AppResult<&DailyContext> {
        let mut context = self.context.clone();
        context.select_weather(weather);
        self.commit_context(context)
    }

    pub fn select_daily_mood(&mut self, mood: DailyMood) -> AppResult<&DailyContext> {
        let mut context = self.context.clone();
        context.select_mood(mood);
        self.commit_context(context)
    }

    /// 이벤트 / 이야기 입력 (None 인 필드는 그대로)
    pub fn update_context_text(
        &mut self,
        event: Option<String>,
        story: Option<String>,
    ) -> AppResult<&DailyContext> {
        let mut context = self.context.clone();
        if let Some(event) = event {
            context.event = event;
        }
        if let Some(story) = story {
            context.story = story;
        }
        self.commit_context(context)
    }

    pub fn reset_context(&mut self) -> AppResult<()> {
        self.commit_context(DailyContext::default()).map(|_| ())
    }

    // ---------------------------------------------------------------
    // 생성
    // ---------------------------------------------------------------

    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    pub fn set_options(&mut self, options: GenerationOptions) {
        self.options = options;
    }

    /// 현재 상태의 복사본으로 생성 요청 구성
    ///
    /// 지식이 비어 있으면 디스패치하지 않고 `Validation`.
    pub fn prepare_request(&self) -> Result<GenerationRequest, GenerationError> {
        GenerationRequest::new(self.knowledge.clone(), self.context.clone(), self.options)
    }

    /// 새로 생성할 때는 이전 결과를 비우고, 재생성일 때는 새 결과가 올 때까지 유지
    pub fn begin_generation(&mut self, regenerate: bool) -> Result<GenerationRequest, GenerationError> {
        let request = self.prepare_request()?;
        if !regenerate {
            self.current = None;
        }
        Ok(request)
    }

    pub fn current_result(&self) -> Option<&GeneratedPost> {
        self.current.as_ref()
    }

    pub fn set_current_result(&mut self, post: GeneratedPost) {
        self.current = Some(post);
    }

    // ---------------------------------------------------------------
    // 보관함
    // ---------------------------------------------------------------

    /// 최신 항목이 앞
    pub fn history(&self) -> &[SavedPost] {
        &self.history
    }

    pub fn archive_current(&mut self) -> AppResult<SavedPost> {
        let post = self
            .current
            .clone()
            .ok_or_else(|| AppError::InvalidOperation("No generated post to save".to_string()))?;
        let saved = SavedPost::from_generated(post);
        let mut history = Vec::with_capacity(self.history.len() + 1);
        history.push(saved.clone());
        history.extend(self.history.iter().cloned());
        self.commit_history(history)?;
        tracing::info!(id = %saved.id, "post archived");
        Ok(saved)
    }

    pub fn remove_saved_post(&mut self, id: &str) -> AppResult<()> {
        if !self.history.iter().any(|p| p.id == id) {
            return Err(AppError::SavedPostNotFound(id.to_string()));
        }
        let history = self.history.iter().filter(|p| p.id != id).cloned().collect();
        self.commit_history(history)
    }

    /// 보관된 게시물을 현재 결과로 불러오고, 그 전략과 무드를 선택 옵션으로 채택
    pub fn remix(&mut self, id: &str) -> AppResult<&GeneratedPost> {
        let saved = self
            .history
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::SavedPostNotFound(id.to_string()))?;

        self.options.strategy = saved.post.strategy_type;
        self.options.mood = saved.post.brand_mood;
        Ok(&*self.current.insert(saved.post.clone()))
    }

    /// 모든 레코드를 지우고 기본값으로
    pub fn reset_all(&mut self) -> AppResult<()> {
        self.repo.clear()?;
        self.knowledge.clear();
        self.context = DailyContext::default();
        self.history.clear();
        self.options = GenerationOptions::default();
        self.current = None;
        tracing::info!("all studio data reset");
        Ok(())
    }
}

/// 진행 중인 생성은 하나만 허용
#[derive(Debug, Default)]
pub struct GenerationSlot {
    busy: AtomicBool,
}

/// 생성 슬롯 점유권 (drop 시 해제)
#[derive(Debug)]
pub struct GenerationTicket<'a> {
    slot: &'a GenerationSlot,
}

impl GenerationSlot {
    pub fn try_acquire(&self) -> AppResult<GenerationTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::GenerationInFlight)?;
        Ok(GenerationTicket { slot: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for GenerationTicket<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}

fn lock(studio: &Mutex<Studio>) -> AppResult<std::sync::MutexGuard<'_, Studio>> {
    studio
        .lock()
        .map_err(|_| AppError::InvalidOperation("Studio state lock poisoned".to_string()))
}

/// 생성 한 번 실행: 슬롯 점유 → 요청 복사 → 호출 → 결과 반영
///
/// 상태 잠금은 호출(`await`) 동안 잡지 않습니다.
pub async fn run_generation(
    studio: &Mutex<Studio>,
    slot: &GenerationSlot,
    client: &GenerationClient,
    regenerate: bool,
) -> AppResult<GeneratedPost> {
    let _ticket = slot.try_acquire()?;

    let request = lock(studio)?.begin_generation(regenerate)?;
    let post = client.generate(&request).await?;

    lock(studio)?.set_current_result(post.clone());
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{BrandMood, PostFormat, StrategyType};

    fn studio() -> Studio {
        Studio::load(Box::new(MemoryStore::default())).unwrap()
    }

    fn post(title: &str) -> GeneratedPost {
        GeneratedPost {
            title: title.to_string(),
            slides: vec!["a".to_string()],
            caption: "c".to_string(),
            hashtags: vec!["#x".to_string()],
            strategy_type: StrategyType::Sales,
            brand_mood: BrandMood::Emotional,
        }
    }

    #[test]
    fn knowledge_is_newest_first_and_removable() {
        let mut studio = studio();
        let first = studio.add_text_knowledge("First", "one").unwrap();
        let second = studio.add_text_knowledge("Second", "two").unwrap();

        let titles: Vec<_> = studio.knowledge().iter().map(|k| k.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);

        studio.remove_knowledge(&first.id).unwrap();
        assert_eq!(studio.knowledge().len(), 1);
        assert_eq!(studio.knowledge()[0].id, second.id);

        assert!(matches!(
            studio.remove_knowledge(&first.id),
            Err(AppError::KnowledgeNotFound(_))
        ));
    }

    #[test]
    fn blank_knowledge_is_rejected() {
        let mut studio = studio();
        assert!(matches!(
            studio.add_text_knowledge("  ", "content"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(studio.knowledge().is_empty());
    }

    #[test]
    fn state_survives_reload_from_the_same_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brand_studio.db");

        {
            let mut studio = Studio::load(Box::new(crate::db::Database::new(&path).unwrap())).unwrap();
            studio.add_text_knowledge("Tip", "Drink water").unwrap();
            studio.select_weather(Weather::Rainy).unwrap();
            studio
                .update_context_text(None, Some("Long day".to_string()))
                .unwrap();
        }

        let studio = Studio::load(Box::new(crate::db::Database::new(&path).unwrap())).unwrap();
        assert_eq!(studio.knowledge()[0].title, "Tip");
        assert_eq!(studio.context().weather, Some(Weather::Rainy));
        assert_eq!(studio.context().story, "Long day");
    }

    #[test]
    fn corrupt_records_fall_back_to_defaults() {
        let repo = MemoryStore::default();
        repo.save_raw(KNOWLEDGE_KEY, "not json").unwrap();
        repo.save_raw(CONTEXT_KEY, "{\"weather\": 42}").unwrap();

        let studio = Studio::load(Box::new(repo)).unwrap();
        assert!(studio.knowledge().is_empty());
        assert_eq!(studio.context(), &DailyContext::default());
    }

    #[test]
    fn empty_knowledge_fails_validation_before_dispatch() {
        let studio = studio();
        let err = studio.prepare_request().unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
    }

    #[test]
    fn fresh_generation_clears_previous_result_but_regeneration_keeps_it() {
        let mut studio = studio();
        studio.add_text_knowledge("Tip", "Drink water").unwrap();
        studio.set_current_result(post("old"));

        studio.begin_generation(true).unwrap();
        assert_eq!(studio.current_result().map(|p| p.title.as_str()), Some("old"));

        studio.begin_generation(false).unwrap();
        assert!(studio.current_result().is_none());
    }

    #[test]
    fn archive_and_remix_round_trip_options() {
        let mut studio = studio();
        assert!(studio.archive_current().is_err());

        studio.set_current_result(post("first"));
        let first = studio.archive_current().unwrap();
        studio.set_current_result(post("second"));
        studio.archive_current().unwrap();

        let titles: Vec<_> = studio.history().iter().map(|p| p.post.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);

        studio.set_options(GenerationOptions::default());
        let remixed = studio.remix(&first.id).unwrap().clone();
        assert_eq!(remixed.title, "first");
        assert_eq!(studio.options().strategy, StrategyType::Sales);
        assert_eq!(studio.options().mood, BrandMood::Emotional);
        assert_eq!(studio.options().format, PostFormat::Carousel);

        studio.remove_saved_post(&first.id).unwrap();
        assert_eq!(studio.history().len(), 1);
        assert!(matches!(studio.remix(&first.id), Err(AppError::SavedPostNotFound(_))));
    }

    #[test]
    fn reset_all_restores_defaults() {
        let mut studio = studio();
        studio.add_text_knowledge("Tip", "Drink water").unwrap();
        studio.select_daily_mood(DailyMood::Creative).unwrap();
        studio.set_current_result(post("p"));
        studio.archive_current().unwrap();

        studio.reset_all().unwrap();
        assert!(studio.knowledge().is_empty());
        assert!(studio.history().is_empty());
        assert!(studio.context().is_empty());
        assert!(studio.current_result().is_none());
        assert_eq!(studio.options(), GenerationOptions::default());
    }

    /// 스위치를 켜면 쓰기가 실패하는 저장소
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: std::sync::Arc<AtomicBool>,
    }

    impl StateRepository for FlakyStore {
        fn load_raw(&self, key: &str) -> AppResult<Option<String>> {
            self.inner.load_raw(key)
        }

        fn save_raw(&self, key: &str, value: &str) -> AppResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::InvalidOperation("disk full".to_string()));
            }
            self.inner.save_raw(key, value)
        }

        fn clear(&self) -> AppResult<()> {
            self.inner.clear()
        }
    }

    #[test]
    fn failed_writes_leave_in_memory_state_untouched() {
        let fail_writes = std::sync::Arc::new(AtomicBool::new(false));
        let mut studio = Studio::load(Box::new(FlakyStore {
            inner: MemoryStore::default(),
            fail_writes: fail_writes.clone(),
        }))
        .unwrap();

        let tip = studio.add_text_knowledge("Tip", "Drink water").unwrap();
        studio.select_weather(Weather::Sunny).unwrap();
        studio.set_current_result(post("kept"));
        let saved = studio.archive_current().unwrap();
        let context = studio.context().clone();

        fail_writes.store(true, Ordering::SeqCst);

        assert!(studio.add_text_knowledge("Other", "text").is_err());
        assert!(studio.remove_knowledge(&tip.id).is_err());
        assert_eq!(studio.knowledge().len(), 1);
        assert_eq!(studio.knowledge()[0].id, tip.id);

        assert!(studio.select_weather(Weather::Rainy).is_err());
        assert!(studio.select_weather(Weather::Sunny).is_err());
        assert!(studio.select_daily_mood(DailyMood::Creative).is_err());
        assert!(studio
            .update_context_text(Some("Sale".to_string()), Some("story".to_string()))
            .is_err());
        assert!(studio.reset_context().is_err());
        assert_eq!(studio.context(), &context);

        assert!(studio.archive_current().is_err());
        assert!(studio.remove_saved_post(&saved.id).is_err());
        assert_eq!(studio.history().len(), 1);
        assert_eq!(studio.history()[0].id, saved.id);

        fail_writes.store(false, Ordering::SeqCst);
        studio.remove_knowledge(&tip.id).unwrap();
        assert!(studio.knowledge().is_empty());
    }

    #[test]
    fn generation_slot_admits_one_ticket_at_a_time() {
        let slot = GenerationSlot::default();
        let ticket = slot.try_acquire().unwrap();
        assert!(slot.is_busy());
        assert!(matches!(slot.try_acquire(), Err(AppError::GenerationInFlight)));

        drop(ticket);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_ok());
    }
}
