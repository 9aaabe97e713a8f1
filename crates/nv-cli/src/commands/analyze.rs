//! Analyze a food photograph and optionally log the result.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use nv_core::{EntryDraft, EntryId, MacroOverrides, MealType, UserId};
use nv_db::Database;
use nv_llm::{Client, FoodImage};
use uuid::Uuid;

use crate::Config;
use crate::cli::AnalyzeArgs;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    config: &Config,
    args: &AnalyzeArgs,
) -> Result<()> {
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .context("missing Claude API key (set NV_API_KEY or config.toml)")?;

    let meal: Option<MealType> = args
        .meal
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("invalid meal (expected breakfast, lunch, dinner, or snack)")?;

    let media_type = media_type_for(&args.image)?;
    let data = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let image = FoodImage { data, media_type };

    let client = Client::new(api_key.to_string()).context("failed to create gateway client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let estimate = runtime
        .block_on(client.analyze_food(&config.model, &image))
        .context("failed to analyze image")?;

    if estimate.confidence.is_non_food() {
        writeln!(writer, "the model did not recognize food in this image")?;
    }

    let mut draft = EntryDraft::new(estimate).portion(args.portion).overrides(
        MacroOverrides {
            weight_grams: args.weight_grams,
            calories: args.calories,
            carbs: args.carbs,
            protein: args.protein,
            fat: args.fat,
        },
    );
    if let Some(name) = &args.food_name {
        draft = draft.rename(name.clone());
    }

    let resolved = draft.resolved();
    writeln!(writer, "{}", serde_json::to_string_pretty(&resolved)?)?;

    if !args.save {
        writeln!(writer, "not saved (pass --save to log this entry)")?;
        return Ok(());
    }

    let entry = draft
        .accept(
            EntryId::new(Uuid::new_v4().to_string()).context("generated entry ID was invalid")?,
            user.clone(),
            Utc::now(),
            meal,
            Some(args.image.display().to_string()),
        )
        .context("entry failed validation and was not saved")?;
    db.insert_entry(&entry).context("failed to save entry")?;
    writeln!(writer, "saved entry {}", entry.id)?;
    Ok(())
}

/// Maps the image file extension to its MIME type.
fn media_type_for(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let media_type = match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => bail!(
            "unsupported image type for {} (expected jpeg, png, webp, or gif)",
            path.display()
        ),
    };
    Ok(media_type.to_string())
}
