use crate::model::placement::Placement;

/// Builds the prompt sent to the LLM for one placement.
/// Only formats text: no networking, no pacing.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(placement: &Placement) -> String {
        let mut prompt = String::new();

        push_persona(&mut prompt);
        push_placement(&mut prompt, placement);
        push_instructions(&mut prompt);

        prompt
    }
}

fn push_persona(prompt: &mut String) {
    prompt.push_str("Act as an expert Vedic Astrologer. ");
}

fn push_placement(prompt: &mut String, placement: &Placement) {
    prompt.push_str(&format!(
        "A user has {} in {} in the {} house. ",
        placement.body,
        placement.sign_label(),
        house_ordinal(placement.house),
    ));
}

fn push_instructions(prompt: &mut String) {
    prompt.push_str(
        "Write a 3-sentence insight about this. \
Tone: Mystical but practical. \
Focus on career and relationships. \
Answer in plain prose without markdown or headings.",
    );
}

/// `1` -> `1st`, `12` -> `12th`, unknown -> `unknown`.
fn house_ordinal(house: Option<u32>) -> String {
    let Some(n) = house else {
        return "unknown".to_string();
    };

    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
