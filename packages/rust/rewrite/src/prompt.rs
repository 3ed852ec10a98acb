//! Prompt construction and the offline rewrite template.

use std::fmt::Write;

use articleforge_shared::{Article, ScrapedArticle};

/// Characters of each reference included in the prompt.
const REFERENCE_EXCERPT_CHARS: usize = 1000;

pub const SYSTEM_PROMPT: &str = "You are an expert content writer and SEO specialist. \
     Your task is to rewrite articles to match the style, formatting, and quality of \
     top-ranking content while maintaining the original message.";

const INSTRUCTIONS: &[&str] = &[
    "Analyze the formatting, structure, and writing style of the reference articles",
    "Rewrite the original article to match that style and quality",
    "Maintain the core message and key points of the original article",
    "Improve readability, SEO optimization, and engagement",
    "Use proper headings, subheadings, and formatting",
    "Make it comprehensive and valuable to readers",
    "Return ONLY the optimized article content, no explanations",
];

/// User prompt asking the model to restyle `original` after `references`.
pub fn build_prompt(original: &Article, references: &[ScrapedArticle]) -> String {
    let mut prompt = String::from(
        "I need you to rewrite and optimize the following article to match the style and \
         quality of top-ranking articles on Google.\n\n",
    );

    prompt.push_str("ORIGINAL ARTICLE:\n");
    let _ = writeln!(prompt, "Title: {}", original.title);
    let _ = writeln!(prompt, "Content: {}\n", original.content);

    prompt.push_str("TOP-RANKING REFERENCE ARTICLES:\n\n");
    for (i, reference) in references.iter().enumerate() {
        let _ = writeln!(prompt, "Reference {}:", i + 1);
        let _ = writeln!(prompt, "Title: {}", reference.title);
        let _ = writeln!(
            prompt,
            "Content: {}...\n",
            char_window(&reference.content, 0, REFERENCE_EXCERPT_CHARS)
        );
    }

    prompt.push_str("INSTRUCTIONS:\n");
    for (i, instruction) in INSTRUCTIONS.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {instruction}", i + 1);
    }
    prompt.push_str("\nOPTIMIZED ARTICLE:");

    prompt
}

/// Deterministic rewrite used when no model is available.
pub fn mock_rewrite(original: &Article) -> String {
    let intro = char_window(&original.content, 0, 200);
    let fundamentals = char_window(&original.content, 200, 400);

    format!(
        "# {title}\n\n\
         ## Introduction\n\n\
         {intro}...\n\n\
         ## Key Insights\n\n\
         Based on analysis of top-ranking articles, here are the key insights:\n\n\
         ### Understanding the Fundamentals\n\n\
         {fundamentals}...\n\n\
         ### Best Practices\n\n\
         Following industry best practices, we recommend:\n\
         - Focus on quality content\n\
         - Optimize for user experience\n\
         - Follow SEO guidelines\n\n\
         ## Conclusion\n\n\
         This article has been optimized based on top-ranking content to provide maximum value to readers.\n\n\
         ---\n\n\
         *Note: This article was automatically optimized using AI to match the style and quality of top-ranking content.*",
        title = original.title,
    )
}

/// Characters `start..end` of `text`, clamped to its length.
fn char_window(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| text.char_indices().nth(n).map_or(text.len(), |(i, _)| i);
    let from = byte_at(start);
    let to = byte_at(end).max(from);
    &text[from..to]
}
