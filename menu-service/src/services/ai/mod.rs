//! AI-assisted menu completion.
//!
//! Wraps a [`TextProvider`] with the validation and parsing rules used to
//! generate descriptions and estimate calories and prices. Every operation
//! returns an outcome value; provider failures never surface as errors.

pub mod parsing;
pub mod prompts;

use crate::services::metrics::record_ai_request;
use crate::services::providers::{FinishReason, GenerationParams, ProviderError, TextProvider};
use once_cell::sync::Lazy;
use parsing::{extract_number, json_integer, json_text, parse_ai_response, ParsedResponse};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Plausible selling price range in IDR.
pub const MIN_PRICE_IDR: i64 = 1_000;
pub const MAX_PRICE_IDR: i64 = 10_000_000;

/// Descriptions shorter than this are treated as a failed generation.
const MIN_DESCRIPTION_CHARS: usize = 15;

static INVALID_CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(elektronik|furniture|pakaian|kendaraan|obat-obatan|electronics|clothing|vehicle|drugs|test|xxx+)$",
    )
    .expect("valid category regex")
});

static TEST_MENU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)test|contoh|sample|menu\s*\d+").expect("valid test menu regex"));

/// Refusal language in a non-JSON answer (Indonesian, English, Chinese, universal).
static REJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)tidak\s+(valid|layak|bisa|jelas)",
        r"(?i)bukan\s+(makanan|minuman)",
        r"(?i)berbahaya",
        r"(?i)not\s+(valid|suitable|consumable|safe)",
        r"(?i)cannot\s+(be|create)",
        r"(?i)invalid",
        r"(?i)harmful",
        r"无效|不能|不适合",
        r"(?i)\b(refuse|reject|deny|dangerous|toxic)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid rejection regex"))
    .collect()
});

/// Refusal language that must never appear inside an accepted description.
static DESCRIPTION_REJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)tidak\s+(valid|layak|bisa)",
        r"(?i)not\s+(valid|suitable|safe)",
        r"(?i)cannot\s+describe",
        r"(?i)refuse\s+to",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid rejection regex"))
    .collect()
});

static REASON_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)reason["\s:]+([^"}\n]+)"#).expect("valid reason regex"));

// =============================================================================
// Types
// =============================================================================

/// Writing style for generated descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionStyle {
    #[default]
    Elegant,
    Casual,
    Fun,
    Simple,
}

impl DescriptionStyle {
    /// Unknown or missing styles fall back to `Elegant`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("casual") => DescriptionStyle::Casual,
            Some("fun") => DescriptionStyle::Fun,
            Some("simple") => DescriptionStyle::Simple,
            _ => DescriptionStyle::Elegant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptionStyle::Elegant => "elegant",
            DescriptionStyle::Casual => "casual",
            DescriptionStyle::Fun => "fun",
            DescriptionStyle::Simple => "simple",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            DescriptionStyle::Elegant => "Mewah dan menggugah selera",
            DescriptionStyle::Casual => "Santai dan hangat",
            DescriptionStyle::Fun => "Ceria dan energik",
            DescriptionStyle::Simple => "Singkat dan informatif",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDescription {
    pub description: String,
    pub warning: Option<String>,
    pub detected_language: Option<String>,
    pub style: DescriptionStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionOutcome {
    Generated(GeneratedDescription),
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalorieOutcome {
    Estimated {
        calories: i32,
        reasoning: Option<String>,
    },
    Rejected {
        reason: String,
    },
    /// The model gave no usable figure.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceOutcome {
    Estimated { price: i64, analysis: Option<String> },
    Rejected { reason: String },
    Unavailable { analysis: String },
}

impl DescriptionOutcome {
    fn label(&self) -> &'static str {
        match self {
            DescriptionOutcome::Generated(_) => "generated",
            DescriptionOutcome::Rejected { .. } => "rejected",
        }
    }
}

impl CalorieOutcome {
    fn label(&self) -> &'static str {
        match self {
            CalorieOutcome::Estimated { .. } => "estimated",
            CalorieOutcome::Rejected { .. } => "rejected",
            CalorieOutcome::Unavailable => "unavailable",
        }
    }
}

impl PriceOutcome {
    fn label(&self) -> &'static str {
        match self {
            PriceOutcome::Estimated { .. } => "estimated",
            PriceOutcome::Rejected { .. } => "rejected",
            PriceOutcome::Unavailable { .. } => "unavailable",
        }
    }
}

/// Menu fields as submitted, before completion.
#[derive(Debug, Clone, Default)]
pub struct MenuDraft {
    pub name: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub description: Option<String>,
    pub calories: Option<i32>,
    pub price: Option<Decimal>,
}

/// Which fields the model filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AiUsage {
    pub description: bool,
    pub calories: bool,
    pub price: bool,
}

impl AiUsage {
    pub fn any(&self) -> bool {
        self.description || self.calories || self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoCompleteResult {
    pub description: Option<String>,
    pub calories: Option<i32>,
    pub price: Option<Decimal>,
    pub ai_used: AiUsage,
    pub rejected: bool,
    pub rejection_reason: Option<String>,
}

// =============================================================================
// Service
// =============================================================================

/// Menu completion backed by a text model.
#[derive(Clone)]
pub struct AiService {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
}

impl AiService {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            params: GenerationParams {
                temperature: Some(0.4),
                json_output: true,
                ..Default::default()
            },
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self.provider.generate(prompt, &self.params).await?;

        debug!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            "Model response received"
        );
        if response.finish_reason == FinishReason::Length {
            warn!("Model response truncated at the token limit");
        }

        Ok(response.text)
    }

    /// Validate that the item is real food or drink and write a description for it.
    #[instrument(skip(self, ingredients, style), fields(style = style.as_str()))]
    pub async fn generate_description(
        &self,
        name: &str,
        category: &str,
        ingredients: &[String],
        style: DescriptionStyle,
    ) -> DescriptionOutcome {
        if INVALID_CATEGORY.is_match(&category.trim().to_lowercase()) {
            warn!(category = %category, "Obviously invalid category");
            return DescriptionOutcome::Rejected {
                reason: format!("Kategori '{}' bukan kategori makanan/minuman", category),
            };
        }

        let started = Instant::now();
        let prompt = prompts::description_prompt(name, category, ingredients, style);
        let outcome = match self.ask(&prompt).await {
            Ok(text) => {
                info!(preview = %preview(&text), "Description response received");
                interpret_description(&text, style)
            }
            Err(e) => {
                error!(error = %e, "Description generation failed");
                DescriptionOutcome::Rejected {
                    reason: format!("Service error: {}", e),
                }
            }
        };
        record_ai_request("generate_description", outcome.label(), started.elapsed().as_secs_f64());

        match &outcome {
            DescriptionOutcome::Generated(generated) => info!(
                name = %name,
                language = generated.detected_language.as_deref().unwrap_or("unknown"),
                "Description generated"
            ),
            DescriptionOutcome::Rejected { reason } => {
                warn!(name = %name, reason = %reason, "Menu rejected by AI")
            }
        }
        outcome
    }

    /// Estimate kcal for one standard restaurant portion.
    #[instrument(skip(self, ingredients))]
    pub async fn estimate_calories(
        &self,
        name: &str,
        category: Option<&str>,
        ingredients: &[String],
    ) -> CalorieOutcome {
        let started = Instant::now();
        let prompt = prompts::calories_prompt(name, category, ingredients);
        let outcome = match self.ask(&prompt).await {
            Ok(text) => interpret_calories(&text),
            Err(e) => {
                error!(error = %e, "Calorie estimation failed");
                CalorieOutcome::Unavailable
            }
        };
        record_ai_request("estimate_calories", outcome.label(), started.elapsed().as_secs_f64());

        if let CalorieOutcome::Estimated { calories, .. } = &outcome {
            info!(name = %name, calories = *calories, "Calories estimated");
        }
        outcome
    }

    /// Recommend a selling price in IDR for a middle-class restaurant.
    #[instrument(skip(self, ingredients))]
    pub async fn estimate_price(
        &self,
        name: &str,
        category: Option<&str>,
        ingredients: &[String],
    ) -> PriceOutcome {
        let started = Instant::now();
        let prompt = prompts::price_prompt(name, category, ingredients);
        let outcome = match self.ask(&prompt).await {
            Ok(text) => interpret_price(&text),
            Err(e) => {
                error!(error = %e, "Price estimation failed");
                PriceOutcome::Unavailable {
                    analysis: "AI service unavailable".to_string(),
                }
            }
        };
        record_ai_request("estimate_price", outcome.label(), started.elapsed().as_secs_f64());

        match &outcome {
            PriceOutcome::Estimated { price, .. } => {
                info!(name = %name, price = %format_rupiah(*price), "Price estimated")
            }
            PriceOutcome::Unavailable { analysis } => {
                warn!(name = %name, analysis = %analysis, "AI failed to estimate price")
            }
            PriceOutcome::Rejected { .. } => {}
        }
        outcome
    }

    /// Fill in whatever the draft is missing.
    ///
    /// The description runs first and can veto the whole menu. Calories and
    /// price then run concurrently; either may fail without affecting the other.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn auto_complete(&self, draft: &MenuDraft) -> AutoCompleteResult {
        let calories = draft.calories.filter(|c| *c != 0);
        let price = draft.price.filter(|p| !p.is_zero());

        let mut result = AutoCompleteResult {
            description: draft.description.clone(),
            calories,
            price,
            ai_used: AiUsage::default(),
            rejected: false,
            rejection_reason: None,
        };

        if is_test_menu(&draft.name) {
            warn!("Test menu detected, skipping AI");
            return result;
        }

        let needs_description = draft
            .description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty());

        if needs_description {
            info!("Generating description");
            match self
                .generate_description(
                    &draft.name,
                    &draft.category,
                    &draft.ingredients,
                    DescriptionStyle::default(),
                )
                .await
            {
                DescriptionOutcome::Generated(generated) => {
                    result.description = Some(generated.description);
                    result.ai_used.description = true;
                }
                DescriptionOutcome::Rejected { reason } => {
                    result.rejected = true;
                    result.rejection_reason = Some(reason);
                    return result;
                }
            }
        }

        let needs_calories = calories.is_none();
        let needs_price = price.is_none();
        if !needs_calories && !needs_price {
            return result;
        }

        let category = Some(draft.category.as_str());
        let started = Instant::now();
        info!(
            tasks = needs_calories as u8 + needs_price as u8,
            "Running AI estimates in parallel"
        );

        let (calorie_outcome, price_outcome) = tokio::join!(
            async {
                if needs_calories {
                    Some(
                        self.estimate_calories(&draft.name, category, &draft.ingredients)
                            .await,
                    )
                } else {
                    None
                }
            },
            async {
                if needs_price {
                    Some(
                        self.estimate_price(&draft.name, category, &draft.ingredients)
                            .await,
                    )
                } else {
                    None
                }
            }
        );

        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            "Parallel AI estimates completed"
        );

        match calorie_outcome {
            Some(CalorieOutcome::Estimated { calories, .. }) => {
                result.calories = Some(calories);
                result.ai_used.calories = true;
            }
            Some(other) => warn!(outcome = other.label(), "Calories left empty"),
            None => {}
        }

        match price_outcome {
            Some(PriceOutcome::Estimated { price, .. }) => {
                result.price = Some(Decimal::from(price));
                result.ai_used.price = true;
            }
            Some(other) => warn!(outcome = other.label(), "Price left empty"),
            None => {}
        }

        result
    }
}

// =============================================================================
// Response interpretation
// =============================================================================

/// Placeholder names such as "test" or "menu 1" are stored as-is without AI help.
pub fn is_test_menu(name: &str) -> bool {
    TEST_MENU.is_match(name) && name.split(' ').count() < 3
}

fn interpret_description(raw: &str, style: DescriptionStyle) -> DescriptionOutcome {
    let rejected = |reason: &str| DescriptionOutcome::Rejected {
        reason: reason.to_string(),
    };

    let data = match parse_ai_response(raw) {
        ParsedResponse::Json(data) => data,
        ParsedResponse::Raw(text) => {
            error!("AI response parsing failed, analysing raw text");
            if REJECTION_PATTERNS.iter().any(|p| p.is_match(&text)) {
                let reason = REASON_FRAGMENT
                    .captures(&text)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "Menu tidak valid menurut AI validation".to_string());
                return DescriptionOutcome::Rejected { reason };
            }
            return rejected("AI tidak dapat memvalidasi menu ini (response format invalid)");
        }
    };

    if !data.is_object() {
        return rejected("AI response structure invalid");
    }

    let is_valid = matches!(data.get("isValid"), Some(Value::Bool(true)))
        || matches!(data.get("isValid"), Some(Value::String(s)) if s == "true")
        || matches!(data.get("valid"), Some(Value::Bool(true)));

    if !is_valid {
        let reason = json_text(&data, "reason")
            .or_else(|| json_text(&data, "message"))
            .unwrap_or_else(|| "Menu tidak valid untuk dikonsumsi".to_string());
        return DescriptionOutcome::Rejected { reason };
    }

    let description = match json_text(&data, "description") {
        Some(d) if d.chars().count() >= MIN_DESCRIPTION_CHARS => d,
        other => {
            error!(description = ?other, "AI description too short or empty");
            return rejected("AI gagal menghasilkan deskripsi yang memadai");
        }
    };

    if DESCRIPTION_REJECTION_PATTERNS
        .iter()
        .any(|p| p.is_match(&description))
    {
        error!(description = %description, "Description contains rejection language");
        return rejected("Menu validation failed (detected in description)");
    }

    DescriptionOutcome::Generated(GeneratedDescription {
        description,
        warning: json_text(&data, "warning"),
        detected_language: json_text(&data, "detectedLanguage"),
        style,
    })
}

fn interpret_calories(raw: &str) -> CalorieOutcome {
    let data = match parse_ai_response(raw) {
        ParsedResponse::Json(data) => data,
        ParsedResponse::Raw(text) => {
            return match extract_number(&text).and_then(|n| i32::try_from(n).ok()) {
                Some(calories) if calories > 0 => CalorieOutcome::Estimated {
                    calories,
                    reasoning: Some(
                        "AI response tidak dalam format JSON, kalori diekstrak manual"
                            .to_string(),
                    ),
                },
                _ => {
                    warn!("Failed to extract calories from AI response");
                    CalorieOutcome::Unavailable
                }
            };
        }
    };

    let reasoning = json_text(&data, "reasoning");
    let calories = json_integer(&data, "calories");
    let invalid = json_text(&data, "status")
        .map(|s| s.eq_ignore_ascii_case("INVALID"))
        .unwrap_or(false);

    if invalid || calories == Some(0) {
        return CalorieOutcome::Rejected {
            reason: reasoning.unwrap_or_else(|| "Menu tidak valid".to_string()),
        };
    }

    match calories.and_then(|n| i32::try_from(n).ok()) {
        Some(calories) if calories > 0 => CalorieOutcome::Estimated {
            calories,
            reasoning,
        },
        _ => CalorieOutcome::Unavailable,
    }
}

fn interpret_price(raw: &str) -> PriceOutcome {
    let plausible = |price: i64| (MIN_PRICE_IDR..=MAX_PRICE_IDR).contains(&price);

    let data = match parse_ai_response(raw) {
        ParsedResponse::Json(data) => data,
        ParsedResponse::Raw(text) => {
            return match extract_number(&text) {
                Some(price) if plausible(price) => PriceOutcome::Estimated {
                    price,
                    analysis: Some("AI memberikan estimasi kasar".to_string()),
                },
                _ => PriceOutcome::Unavailable {
                    analysis: "Format jawaban AI rusak dan tidak ada angka valid".to_string(),
                },
            };
        }
    };

    let analysis = json_text(&data, "analysis");
    let price = json_integer(&data, "recommended_price");
    let invalid = json_text(&data, "status")
        .map(|s| s.eq_ignore_ascii_case("INVALID"))
        .unwrap_or(false);

    if invalid || price == Some(0) {
        return PriceOutcome::Rejected {
            reason: analysis.unwrap_or_else(|| "Menu tidak valid".to_string()),
        };
    }

    match price {
        Some(price) if plausible(price) => PriceOutcome::Estimated { price, analysis },
        Some(price) => {
            warn!(price = price, "Estimated price out of range");
            PriceOutcome::Rejected {
                reason: format!("Estimasi harga tidak masuk akal Rp {}.", format_rupiah(price)),
            }
        }
        None => PriceOutcome::Unavailable {
            analysis: analysis.unwrap_or_else(|| "AI tidak memberikan angka harga".to_string()),
        },
    }
}

/// Format an amount with Indonesian thousands separators (`25000` -> `25.000`).
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
