use crate::engine::error::ReportError;
use crate::engine::llm_client::ChatService;
use crate::engine::pacing::Pacer;
use crate::engine::prompt_builder::PromptBuilder;
use crate::model::insight::Insight;
use crate::model::placement::Placement;

pub const NOT_CONFIGURED: &str =
    "Interpretation unavailable: no language-model API key is configured.";

/// Turns placements into insights, one completion request each.
///
/// Never fails: a missing key or a failed request yields fallback text and
/// the caller moves on to the next placement.
pub struct InterpretationGenerator {
    service: Option<Box<dyn ChatService>>,
    pacer: Pacer,
}

impl InterpretationGenerator {
    pub fn new(service: Option<Box<dyn ChatService>>, pacer: Pacer) -> Self {
        Self { service, pacer }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub fn interpret<'a>(&mut self, placement: &'a Placement) -> Insight<'a> {
        let Some(service) = &self.service else {
            return Insight {
                placement,
                text: NOT_CONFIGURED.to_string(),
                fallback: true,
            };
        };

        let waited = self.pacer.wait();
        if !waited.is_zero() {
            tracing::debug!(waited_ms = waited.as_millis() as u64, "paced before completion request");
        }

        let prompt = PromptBuilder::build(placement);
        let result = service
            .complete(&prompt)
            .map_err(|e| ReportError::Interpretation(format!("{e:#}")))
            .and_then(|raw| {
                let text = clean_completion(&raw);
                if text.is_empty() {
                    Err(ReportError::Interpretation("completion was empty after clean-up".into()))
                } else {
                    Ok(text)
                }
            });

        match result {
            Ok(text) => Insight {
                placement,
                text,
                fallback: false,
            },
            Err(e) => {
                tracing::warn!(body = %placement.body, "{e}");
                let detail = match e {
                    ReportError::Interpretation(detail) => detail,
                    other => other.to_string(),
                };
                Insight {
                    placement,
                    text: format!("Error gathering wisdom: {detail}"),
                    fallback: true,
                }
            }
        }
    }
}

/// Strip markdown the model adds despite being asked not to.
pub fn clean_completion(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("```"))
        .map(|line| line.trim_start_matches('#').trim_start())
        .map(|line| line.replace("**", "").replace("__", ""))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
