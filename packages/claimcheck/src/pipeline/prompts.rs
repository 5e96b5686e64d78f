//! LLM prompts for the hypothesize, verify, answer pipeline and the judge.

use crate::types::{Claim, VerifiedFactSet};

/// Prompt for decomposing a question into the claims needed to answer it.
pub const HYPOTHESIZER_PROMPT: &str = r#"You build hypothetical knowledge graphs for question answering.

Break the question below into the (subject, relation, object) triples whose truth is needed to derive the answer. Use "?" as the object when the value is exactly what must be looked up.

Steps:
1. Think: work out which entities (people, places, things) matter and which of their attributes or relationships decide the answer.
2. Build: produce the triples that capture those facts.

Rules:
- Each triple has exactly three non-empty strings.
- Keep triples atomic and specific.
- Output a single JSON object and nothing else.

Output JSON:
{
    "reasoning": "your step-by-step analysis",
    "triples": [["subject", "relation", "object"], ...]
}

Question: "{question}""#;

/// Prompt for turning one claim into search queries.
pub const QUERY_PLANNER_PROMPT: &str = r#"You write web search queries for fact-checking.

Write up to 3 short, diverse Google queries that would surface evidence about the triple below.

Guidelines:
- Diversity: approach the triple from different angles (the subject, the object, the relation).
- Brevity: keep queries short and to the point.
- No yes/no questions.

Triple: {claim}

Output JSON:
{"queries": ["query one", "query two", "query three"]}"#;

/// Prompt for classifying evidence against a claim.
pub const VERIFIER_PROMPT: &str = r#"You are a precise fact-checker. Decide whether the evidence below explicitly supports or refutes the triple.

Rules:
1. Use only the evidence. Never use your own knowledge.
2. Supports: the evidence clearly states the triple, or implies it strongly. Guesses do not count.
3. Refutes: the evidence clearly contradicts the triple.
4. Neutral: the evidence is unrelated, insufficient, or ambiguous.
5. Reply with exactly one word: Supports, Refutes, or Neutral.

Triple: {claim}

Evidence:
---
{evidence}
---

Your one-word answer:"#;

/// Prompt for answering from verified facts only.
pub const ANSWERER_PROMPT: &str = r#"You are an objective question-answering assistant. Answer the original question concisely and directly, using only the verified evidence below.

Instructions:
- Derive the answer from the verified evidence alone. Add no outside knowledge.
- Combine several facts into one coherent answer when needed.
- If the evidence does not fully answer the question, say so explicitly, for example: "Based on the verified information, it cannot be determined whether ...".

Original question: "{question}"

Verified evidence:
---
{verified_evidence}
---

Final, evidence-based answer:"#;

/// Prompt for grading a generated answer against the reference.
pub const JUDGE_PROMPT: &str = r#"You evaluate a question-answering system. Decide whether the generated answer correctly and completely answers the original question, using the ideal answer as reference.

Instructions:
1. Compare the meaning of the generated answer with the ideal answer.
2. A verbatim match is not required, but the same core information must be present.
3. Explain your comparison step by step in "reasoning".
4. Give "decision" as exactly "Correct" or "Incorrect".

Output JSON:
{
    "reasoning": "your step-by-step analysis",
    "decision": "Correct" or "Incorrect"
}

Original question: "{question}"
Ideal answer: "{ideal_answer}"
Generated answer: "{generated_answer}""#;

/// Substitute `{name}` placeholders in one left-to-right pass. Inserted
/// values are never rescanned, so text like `{question}` inside evidence or
/// an answer stays literal. Unknown braces are copied through.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = values.iter().find_map(|(name, value)| {
            after
                .strip_prefix(name)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (*value, tail))
        });
        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn format_hypothesizer_prompt(question: &str) -> String {
    fill(HYPOTHESIZER_PROMPT, &[("question", question)])
}

pub fn format_query_planner_prompt(claim: &Claim) -> String {
    let claim = claim.to_string();
    fill(QUERY_PLANNER_PROMPT, &[("claim", claim.as_str())])
}

pub fn format_verifier_prompt(claim: &Claim, evidence: &str) -> String {
    let claim = claim.to_string();
    fill(VERIFIER_PROMPT, &[("claim", claim.as_str()), ("evidence", evidence)])
}

/// One bullet per verified fact, in fact-set order. Evidence is flattened to
/// a single line.
pub fn format_verified_evidence(facts: &VerifiedFactSet) -> String {
    facts
        .iter()
        .map(|record| {
            format!(
                "- Fact: {}\n  Evidence: {}\n",
                record.claim,
                record.evidence.replace('\n', " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_answerer_prompt(question: &str, facts: &VerifiedFactSet) -> String {
    let evidence = format_verified_evidence(facts);
    fill(
        ANSWERER_PROMPT,
        &[("question", question), ("verified_evidence", evidence.as_str())],
    )
}

pub fn format_judge_prompt(question: &str, ideal_answer: &str, generated_answer: &str) -> String {
    fill(
        JUDGE_PROMPT,
        &[
            ("question", question),
            ("ideal_answer", ideal_answer),
            ("generated_answer", generated_answer),
        ],
    )
}
