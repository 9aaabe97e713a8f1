//! Claude API integration for the nutrition ledger.
//!
//! Two remote operations, both whole-unit request/response:
//! - Food photograph analysis: image in, structured nutrition estimate out
//! - Workout plan generation: profile in, structured multi-day plan out
//!
//! The client owns no retry policy and caches nothing; a failed call is
//! simply retried by the user triggering the action again. Responses must
//! be strict JSON matching the requested shape - anything else surfaces as
//! [`GatewayError::InvalidResponse`], and the caller persists nothing.

use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use nv_core::{Exercise, NutritionEstimate, UserProfile, WorkoutDay, WorkoutPlan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const ANALYSIS_MAX_TOKENS: u32 = 1024;
const ANALYSIS_TEMPERATURE: f32 = 0.2;
const WORKOUT_MAX_TOKENS: u32 = 4096;
const WORKOUT_TEMPERATURE: f32 = 0.4;

/// Gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed (network error or timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// The model's output was unparseable or violated the requested shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Claude API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(GatewayError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(GatewayError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(GatewayError::ClientBuild)?;

        Ok(Self { http, api_key })
    }

    /// Analyzes a food photograph into a nutrition estimate.
    ///
    /// A non-food image is reported through a confidence of zero in the
    /// success payload, not as an error.
    pub async fn analyze_food(
        &self,
        model: &str,
        image: &FoodImage,
    ) -> Result<NutritionEstimate, GatewayError> {
        let request = MessageRequest {
            model: model.to_string(),
            max_tokens: ANALYSIS_MAX_TOKENS,
            temperature: ANALYSIS_TEMPERATURE,
            system: ANALYSIS_SYSTEM.to_string(),
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type: image.media_type.clone(),
                            data: BASE64.encode(&image.data),
                        },
                    },
                    ContentPart::Text {
                        text: build_analysis_prompt(),
                    },
                ],
            }],
        };

        let text = self.send(&request).await?;
        let estimate = parse_estimate(&text)?;
        normalize_estimate(estimate)
    }

    /// Generates a multi-day workout plan for the given profile.
    ///
    /// The returned plan is stamped with the current time as its
    /// generation marker; persisting it replaces any prior plan.
    pub async fn generate_workout(
        &self,
        model: &str,
        profile: &UserProfile,
    ) -> Result<WorkoutPlan, GatewayError> {
        let request = MessageRequest {
            model: model.to_string(),
            max_tokens: WORKOUT_MAX_TOKENS,
            temperature: WORKOUT_TEMPERATURE,
            system: WORKOUT_SYSTEM.to_string(),
            messages: vec![Message {
                role: "user",
                content: vec![ContentPart::Text {
                    text: build_workout_prompt(profile),
                }],
            }],
        };

        let text = self.send(&request).await?;
        let payload = parse_plan(&text)?;
        normalize_plan(payload)
    }

    async fn send(&self, request: &MessageRequest) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| GatewayError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: MessageResponse = serde_json::from_str(&body)
            .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;
        extract_text(payload.content)
    }
}

/// A photograph submitted for analysis.
#[derive(Debug, Clone)]
pub struct FoodImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g. `image/jpeg`).
    pub media_type: String,
}

const ANALYSIS_SYSTEM: &str = "You are an experienced nutritionist. Analyze the photographed \
food and respond with strict JSON only, no prose. If the image is not of food, set \
\"confidence\" to 0 and estimate nothing.";

const WORKOUT_SYSTEM: &str = "You are an elite personal trainer. Create safe, efficient, \
well-structured training routines. Respond with strict JSON only, no prose.";

fn build_analysis_prompt() -> String {
    let mut lines = Vec::new();
    lines.push(
        "Identify the dish, estimate its mass visually, and compute the macronutrients for \
         that mass."
            .to_string(),
    );
    lines.push("Return strict JSON with this shape:".to_string());
    lines.push(
        r#"{"food_name":"...","weight_grams":0,"calories":0,"carbs":0,"protein":0,"fat":0,"confidence":0,"health_score":0,"ingredients":["..."],"insights":["..."]}"#
            .to_string(),
    );
    lines.push("Rules:".to_string());
    lines.push("- weight_grams is the estimated mass of the visible serving.".to_string());
    lines.push("- calories/carbs/protein/fat are totals for that mass, in kcal and grams.".to_string());
    lines.push("- confidence is 0-100; health_score is 0-10 (10 = very healthy).".to_string());
    lines.push("- ingredients lists the 3-5 main visible ingredients.".to_string());
    lines.push("- insights lists 2-3 short nutritional observations.".to_string());
    lines.join("\n")
}

fn build_workout_prompt(profile: &UserProfile) -> String {
    let mut lines = Vec::new();
    lines.push("Create a detailed training routine as strict JSON for this profile:".to_string());
    lines.push(format!("- age: {}", profile.age.unwrap_or(25)));
    lines.push(format!(
        "- sex: {}",
        profile
            .sex
            .map_or("unspecified", nv_core::BiologicalSex::as_str)
    ));
    lines.push(format!(
        "- weight_kg: {}",
        profile.weight_kg.unwrap_or(nv_core::DEFAULT_WEIGHT_KG)
    ));
    lines.push(format!(
        "- height_cm: {}",
        profile.height_cm.unwrap_or(170.0)
    ));
    lines.push(format!("- objective: {}", profile.objective));
    lines.push(format!("- experience: {}", profile.experience));
    lines.push(format!("- days_per_week: {}", profile.days_per_week));
    lines.push(String::new());
    lines.push(
        "Split the routine logically for that frequency (e.g. ABC, full body, upper/lower)."
            .to_string(),
    );
    lines.push("Give a short execution tip for each exercise.".to_string());
    lines.push("Return strict JSON with this shape:".to_string());
    lines.push(
        r#"{"title":"...","description":"...","days":[{"label":"...","focus":"...","exercises":[{"name":"...","sets":"4","reps":"8-12","rest":"60s","tip":"..."}]}]}"#
            .to_string(),
    );
    lines.join("\n")
}

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

fn extract_text(blocks: Vec<ContentBlock>) -> Result<String, GatewayError> {
    let mut pieces = Vec::new();
    for block in blocks {
        let ContentBlock::Text { text } = block;
        pieces.push(text);
    }
    if pieces.is_empty() {
        return Err(GatewayError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(pieces.join("\n"))
}

fn parse_api_error(body: &str) -> Option<GatewayError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| GatewayError::Api {
            message: payload.error.message,
        })
}

fn parse_estimate(text: &str) -> Result<NutritionEstimate, GatewayError> {
    serde_json::from_str(text).map_err(|err| GatewayError::InvalidResponse(err.to_string()))
}

/// Enforces the parts of the estimate contract the type system can't.
///
/// Confidence and health score clamp during deserialization; mass and the
/// food label are hard requirements, and negative macros are treated as
/// zero rather than rejected.
fn normalize_estimate(mut estimate: NutritionEstimate) -> Result<NutritionEstimate, GatewayError> {
    estimate.food_name = estimate.food_name.trim().to_string();
    if estimate.food_name.is_empty() {
        return Err(GatewayError::InvalidResponse(
            "missing food name".to_string(),
        ));
    }
    if !estimate.weight_grams.is_finite() || estimate.weight_grams <= 0.0 {
        return Err(GatewayError::InvalidResponse(format!(
            "non-positive estimated mass: {}",
            estimate.weight_grams
        )));
    }
    for value in [
        &mut estimate.calories,
        &mut estimate.carbs,
        &mut estimate.protein,
        &mut estimate.fat,
    ] {
        if !value.is_finite() || *value < 0.0 {
            *value = 0.0;
        }
    }
    estimate.ingredients = clean_strings(estimate.ingredients);
    estimate.insights = clean_strings(estimate.insights);
    Ok(estimate)
}

#[derive(Debug, Deserialize)]
struct PlanPayload {
    title: String,
    #[serde(default)]
    description: Option<String>,
    days: Vec<DayPayload>,
}

#[derive(Debug, Deserialize)]
struct DayPayload {
    label: String,
    #[serde(default)]
    focus: String,
    #[serde(default)]
    exercises: Vec<ExercisePayload>,
}

#[derive(Debug, Deserialize)]
struct ExercisePayload {
    name: String,
    sets: String,
    reps: String,
    rest: String,
    #[serde(default)]
    tip: Option<String>,
}

fn parse_plan(text: &str) -> Result<PlanPayload, GatewayError> {
    serde_json::from_str(text).map_err(|err| GatewayError::InvalidResponse(err.to_string()))
}

fn normalize_plan(payload: PlanPayload) -> Result<WorkoutPlan, GatewayError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(GatewayError::InvalidResponse(
            "missing plan title".to_string(),
        ));
    }
    if payload.days.is_empty() {
        return Err(GatewayError::InvalidResponse("plan has no days".to_string()));
    }

    let days = payload
        .days
        .into_iter()
        .map(|day| WorkoutDay {
            label: day.label.trim().to_string(),
            focus: day.focus.trim().to_string(),
            exercises: day
                .exercises
                .into_iter()
                .filter(|exercise| !exercise.name.trim().is_empty())
                .map(|exercise| Exercise {
                    name: exercise.name.trim().to_string(),
                    sets: exercise.sets.trim().to_string(),
                    reps: exercise.reps.trim().to_string(),
                    rest: exercise.rest.trim().to_string(),
                    tip: exercise
                        .tip
                        .map(|tip| tip.trim().to_string())
                        .filter(|tip| !tip.is_empty()),
                })
                .collect(),
        })
        .collect();

    Ok(WorkoutPlan {
        title,
        description: payload
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        days,
        generated_at: Utc::now(),
    })
}

fn clean_strings(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use nv_core::{RawProfile, normalize_profile};

    use super::*;

    fn profile() -> UserProfile {
        normalize_profile(RawProfile {
            id: "local".to_string(),
            name: "Ana".to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap()),
            weight_kg: Some(82.0),
            height_cm: Some(178.0),
            age: Some(31),
            sex: Some("male".to_string()),
            objective: Some("strength".to_string()),
            experience: Some("intermediate".to_string()),
            days_per_week: Some(4),
            goals: None,
        })
        .unwrap()
    }

    #[test]
    fn client_rejects_empty_api_key() {
        assert!(matches!(
            Client::new(""),
            Err(GatewayError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_whitespace_api_key() {
        assert!(matches!(
            Client::new("   "),
            Err(GatewayError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_accepts_valid_api_key() {
        assert!(Client::new("sk-ant-api03-valid-key").is_ok());
    }

    #[test]
    fn client_debug_redacts_api_key() {
        let client = Client::new("secret-key").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn analysis_prompt_requests_strict_json_shape() {
        let prompt = build_analysis_prompt();
        assert!(prompt.contains("\"food_name\""));
        assert!(prompt.contains("\"weight_grams\""));
        assert!(prompt.contains("confidence is 0-100"));
        assert!(prompt.contains("health_score is 0-10"));
    }

    #[test]
    fn workout_prompt_includes_profile_fields() {
        let prompt = build_workout_prompt(&profile());
        assert!(prompt.contains("- age: 31"));
        assert!(prompt.contains("- sex: male"));
        assert!(prompt.contains("- weight_kg: 82"));
        assert!(prompt.contains("- height_cm: 178"));
        assert!(prompt.contains("- objective: strength"));
        assert!(prompt.contains("- experience: intermediate"));
        assert!(prompt.contains("- days_per_week: 4"));
    }

    #[test]
    fn workout_prompt_substitutes_body_metric_defaults() {
        let mut profile = profile();
        profile.age = None;
        profile.weight_kg = None;
        profile.height_cm = None;
        profile.sex = None;

        let prompt = build_workout_prompt(&profile);
        assert!(prompt.contains("- age: 25"));
        assert!(prompt.contains("- sex: unspecified"));
        assert!(prompt.contains("- weight_kg: 70"));
        assert!(prompt.contains("- height_cm: 170"));
    }

    #[test]
    fn parse_estimate_accepts_strict_json() {
        let text = r#"{
            "food_name": "Feijoada",
            "weight_grams": 350,
            "calories": 480,
            "carbs": 42,
            "protein": 28,
            "fat": 22,
            "confidence": 92,
            "health_score": 6.5,
            "ingredients": ["black beans", "pork"],
            "insights": ["rich in iron"]
        }"#;
        let estimate = normalize_estimate(parse_estimate(text).unwrap()).unwrap();
        assert_eq!(estimate.food_name, "Feijoada");
        assert!((estimate.weight_grams - 350.0).abs() < f64::EPSILON);
        assert!((f64::from(estimate.confidence.value()) - 92.0).abs() < f64::EPSILON);
        assert_eq!(estimate.ingredients.len(), 2);
    }

    #[test]
    fn parse_estimate_rejects_prose() {
        let err = parse_estimate("Here is your analysis: lots of calories!").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn non_food_confidence_zero_is_a_success_payload() {
        let text = r#"{
            "food_name": "Not food",
            "weight_grams": 1,
            "calories": 0,
            "carbs": 0,
            "protein": 0,
            "fat": 0,
            "confidence": 0
        }"#;
        let estimate = normalize_estimate(parse_estimate(text).unwrap()).unwrap();
        assert!(estimate.confidence.is_non_food());
    }

    #[test]
    fn normalize_estimate_rejects_non_positive_mass() {
        let text = r#"{
            "food_name": "Soup",
            "weight_grams": 0,
            "calories": 100,
            "carbs": 10,
            "protein": 5,
            "fat": 3,
            "confidence": 80
        }"#;
        let err = normalize_estimate(parse_estimate(text).unwrap()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn normalize_estimate_clamps_out_of_range_scores() {
        let text = r#"{
            "food_name": "Salad",
            "weight_grams": 200,
            "calories": -50,
            "carbs": 12,
            "protein": 4,
            "fat": 2,
            "confidence": 150,
            "health_score": 14
        }"#;
        let estimate = normalize_estimate(parse_estimate(text).unwrap()).unwrap();
        assert!((f64::from(estimate.confidence.value()) - 100.0).abs() < f64::EPSILON);
        assert!((f64::from(estimate.health_score.unwrap().value()) - 10.0).abs() < f64::EPSILON);
        // Negative macros coerce to zero rather than failing the analysis
        assert!((estimate.calories - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_plan_accepts_strict_json() {
        let text = r#"{
            "title": "Upper/Lower Strength",
            "description": "4-day split",
            "days": [
                {
                    "label": "Upper A",
                    "focus": "Chest & back",
                    "exercises": [
                        {"name": "Bench press", "sets": "4", "reps": "5", "rest": "180s", "tip": "Brace hard"},
                        {"name": "  ", "sets": "3", "reps": "10", "rest": "60s"}
                    ]
                }
            ]
        }"#;
        let plan = normalize_plan(parse_plan(text).unwrap()).unwrap();
        assert_eq!(plan.title, "Upper/Lower Strength");
        assert_eq!(plan.days.len(), 1);
        // Blank-named exercises are dropped during normalization
        assert_eq!(plan.days[0].exercises.len(), 1);
        assert_eq!(plan.days[0].exercises[0].tip.as_deref(), Some("Brace hard"));
    }

    #[test]
    fn normalize_plan_rejects_empty_title_or_days() {
        let no_days = r#"{"title": "Plan", "days": []}"#;
        assert!(matches!(
            normalize_plan(parse_plan(no_days).unwrap()),
            Err(GatewayError::InvalidResponse(_))
        ));

        let no_title = r#"{"title": "  ", "days": [{"label": "A", "exercises": []}]}"#;
        assert!(matches!(
            normalize_plan(parse_plan(no_title).unwrap()),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parse_plan_rejects_invalid_json() {
        assert!(matches!(
            parse_plan("not-json"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }
}
