//! Expanding a thought into follow-up ideas.
//!
//! A node is expanded by asking a language model for a handful of ideas. This module builds the
//! prompt for a node and turns the model's raw reply into clean idea labels; talking to the model
//! is left to the caller.

use serde::{Deserialize, Serialize};

/// Upper bound on the ideas kept from one expansion.
pub const MAX_IDEAS: usize = 3;

const IDEA_TRIM: &[char] = &[
    ' ', '\n', '-', '•', '.', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandRequest {
    /// Labels from the root to the expanded node, joined with `" -> "`.
    pub context: String,
    /// Label of the expanded node.
    pub question: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandResponse {
    pub ideas: Vec<String>,
}

impl ExpandResponse {
    pub fn from_raw(raw: &str) -> Self {
        Self {
            ideas: parse_ideas(raw),
        }
    }
}

/// The root's context path is its own label, so context and question coincide.
pub fn is_initial_expansion(context: &str, question: &str) -> bool {
    context.trim() == question.trim()
}

pub fn expansion_prompt(req: &ExpandRequest) -> String {
    if is_initial_expansion(&req.context, &req.question) {
        initial_plan_prompt(&req.question)
    } else {
        next_step_prompt(&req.context, &req.question)
    }
}

fn initial_plan_prompt(question: &str) -> String {
    format!(
        "You are a high-level problem-solving architect. Your role is to help break down complex \
problems into foundational, distinct approaches.

The central question or problem to address is: \"{question}\"

Please propose 2 to 3 fundamentally **different and high-level overall plans or strategies** to \
approach this problem. Each plan should represent a unique direction or perspective for solving \
the problem.
List each plan as a single line item. Avoid numbering or introductory/concluding text. Focus \
purely on clear, distinct plan titles.
Example (for \"How to improve customer satisfaction?\"):
Focus on product quality improvements
Enhance customer service interaction
Optimize post-purchase follow-up process
"
    )
}

fn next_step_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a detailed problem-solving assistant, specializing in exploring different facets \
of a specific step within a plan.

We are currently operating within this plan/path:
{context}

The specific step we are focusing on is: \"{question}\"

Considering the overall path and the current step, please suggest 2 to 3 **distinct and detailed \
next steps, sub-problems, or different angles** to explore specifically for \"{question}\". Each \
suggestion should offer a clear, different way to break down or act on this particular step.
List each suggestion as a single line item. Avoid numbering or introductory/concluding text. \
Focus purely on clear, actionable next steps or sub-topics.
Example (for path \"Improve Website Traffic -> Improve SEO\", detailing step \"Optimize on-page \
content\"):
Focus on technical SEO aspects of pages
Focus on content quality and relevance
Focus on user experience signals (dwell time, bounce rate)
"
    )
}

/// Splits a model reply into idea labels.
///
/// Each line loses leading and trailing list decoration (spaces, dashes, bullets, digits, dots),
/// then surrounding whitespace; blank results are dropped and at most [`MAX_IDEAS`] are kept.
/// A `\r` ending a line stops the decoration strip, so `"Idea 2.\r"` keeps its `"2."`.
pub fn parse_ideas(raw: &str) -> Vec<String> {
    raw.trim()
        .split('\n')
        .map(|line| line.trim_matches(IDEA_TRIM).trim())
        .filter(|idea| !idea.is_empty())
        .take(MAX_IDEAS)
        .map(str::to_string)
        .collect()
}
