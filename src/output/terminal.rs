// Colored terminal output for comparisons, keywords, and entities.

use colored::Colorize;

use super::preview;
use crate::compare::{ComparisonResult, FeatureComparison, KeywordCount, Partition};
use crate::document::{EntitySpan, SimilarityUnavailable};

/// Display a full comparison: score, then entity and keyword partitions.
pub fn display_comparison(result: &ComparisonResult, preview_items: usize) {
    println!("\n{}", "=== Similarity Score ===".bold());
    println!(
        "  Similarity between the two documents: {}",
        colorize_score(result.similarity)
    );

    display_features(&result.features(), preview_items);
}

/// Display the partitions when no similarity score could be computed.
pub fn display_unavailable(
    error: &SimilarityUnavailable,
    features: &FeatureComparison,
    preview_items: usize,
) {
    println!("\n{}", "=== Similarity Score ===".bold());
    println!("  {} {}", "!!".red().bold(), "Similarity unavailable".red());
    println!("  {}", error.to_string().dimmed());

    display_features(features, preview_items);
}

fn display_features(features: &FeatureComparison, preview_items: usize) {
    println!("\n{}", "=== Similarities and Differences ===".bold());

    println!("\n  {}", "Named Entities".underline());
    display_partition(&features.entities, preview_items);

    println!("\n  {}", "Keywords".underline());
    display_partition(&features.keywords, preview_items);
    println!();
}

fn display_partition(partition: &Partition, preview_items: usize) {
    let rows = [
        ("Common", &partition.common),
        ("Unique to File 1", &partition.only_first),
        ("Unique to File 2", &partition.only_second),
    ];

    for (label, items) in rows {
        let shown = if items.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            preview(items, preview_items)
        };
        println!(
            "    {:<18} {} {}",
            format!("{label}:"),
            shown,
            format!("[{}]", items.len()).dimmed()
        );
    }
}

/// Display a ranked keyword list with counts.
pub fn display_keywords(keywords: &[KeywordCount]) {
    if keywords.is_empty() {
        println!("No keywords found (no nouns, proper nouns, or adjectives).");
        return;
    }

    println!(
        "\n{}",
        format!("=== Top {} Keywords ===", keywords.len()).bold()
    );
    println!();

    let max = keywords[0].count.max(1);
    let bar_width: usize = 20;

    for (i, kw) in keywords.iter().enumerate() {
        let filled = (kw.count * bar_width).div_ceil(max);
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        println!(
            "  {:>2}. {:<30} {} {}",
            i + 1,
            kw.keyword.bold(),
            bar.bright_blue(),
            kw.count
        );
    }
    println!();
}

/// Display entities in sorted order with their labels, once each.
pub fn display_entities(entities: &[EntitySpan]) {
    let mut unique: Vec<&EntitySpan> = Vec::new();
    for entity in entities {
        if !unique.iter().any(|e| e.text == entity.text) {
            unique.push(entity);
        }
    }
    unique.sort_by(|a, b| a.text.cmp(&b.text));

    if unique.is_empty() {
        println!("No named entities found.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Named Entities ({}) ===", unique.len()).bold()
    );
    println!();
    for entity in unique {
        println!(
            "  {:<40} {}",
            entity.text.replace(char::is_whitespace, " "),
            entity.label.to_string().dimmed()
        );
    }
    println!();
}

/// Colorize a similarity score (two decimals).
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:.2}");
    if score >= 0.75 {
        text.bright_green().bold()
    } else if score >= 0.40 {
        text.bright_yellow()
    } else {
        text.bright_red()
    }
}
