//! Daily Context Commands
//!
//! 오늘의 맥락 (날씨 / 기분 / 이벤트 / 이야기)

use serde::Deserialize;
use tauri::State;

use super::studio;
use crate::error::CommandResult;
use crate::models::{DailyContext, DailyMood, Weather};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContextTextArgs {
    pub event: Option<String>,
    pub story: Option<String>,
}

#[tauri::command]
pub fn get_daily_context(state: State<AppState>) -> CommandResult<DailyContext> {
    Ok(studio(&state)?.context().clone())
}

/// 같은 날씨를 다시 고르면 선택 해제
#[tauri::command]
pub fn select_weather(weather: String, state: State<AppState>) -> CommandResult<DailyContext> {
    let weather: Weather = weather.parse()?;
    Ok(studio(&state)?.select_weather(weather)?.clone())
}

/// 같은 기분을 다시 고르면 선택 해제
#[tauri::command]
pub fn select_daily_mood(mood: String, state: State<AppState>) -> CommandResult<DailyContext> {
    let mood: DailyMood = mood.parse()?;
    Ok(studio(&state)?.select_daily_mood(mood)?.clone())
}

#[tauri::command]
pub fn update_daily_context_text(
    args: UpdateContextTextArgs,
    state: State<AppState>,
) -> CommandResult<DailyContext> {
    Ok(studio(&state)?
        .update_context_text(args.event, args.story)?
        .clone())
}

#[tauri::command]
pub fn reset_daily_context(state: State<AppState>) -> CommandResult<DailyContext> {
    let mut studio = studio(&state)?;
    studio.reset_context()?;
    Ok(studio.context().clone())
}
