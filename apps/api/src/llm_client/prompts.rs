// Prompt constants and builders for the two LLM calls: CV structure
// extraction and the "Summary of Experience" paragraph.

use serde_json::{json, Value};

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Persona and output schema for CV extraction.
pub const CV_EXTRACTION_INSTRUCTIONS: &str = "\
You are a specialized HR in the tunneling industry. Return STRICT JSON with keys exactly:
identity: { name_initials, position, nationality, languages[], year_of_birth, total_experience_months }
profile_summary: short paragraph (2-4 lines) summarizing seniority, key methods (EPB/Slurry/Mixshield/NATM/Hard Rock/Open TBM/Shield/Drill & Blast), diameters, TBM OEMs, and countries.
work_experiences: array of { from:'YYYY-MM'|Mon YYYY|'-', to:'YYYY-MM'|Mon YYYY|'Present', role, project, city_country, bullets[] }
education: string[] or objects with degree/institution/city_country/year
skills: string[]
courses: string[]
Constraints: redact PII; initials for names; use '-' for unknown; do not include extra text outside JSON.";

pub const SUMMARY_SYSTEM: &str = "You are a tunnelling HR specialist writing candidate profiles \
    in the third person with UK spelling.";

/// Common instruction appended to the summary prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use only the facts in the evidence JSON. Do NOT invent roles, methods, \
    diameters, OEMs, sectors, or locations. If the evidence does not support a claim, omit it.";

pub fn cv_extraction_system() -> String {
    format!("{JSON_ONLY_SYSTEM}\n\n{CV_EXTRACTION_INSTRUCTIONS}")
}

/// User message for extraction: the desired position and the redacted text.
pub fn cv_extraction_prompt(desired_position: &str, resume_text: &str) -> String {
    let payload = json!({
        "desired_position": desired_position,
        "resume_text": resume_text,
    });
    format!("INPUT:\n{payload}")
}

/// User message for the summary paragraph. `evidence` is the redacted payload.
pub fn summary_prompt(evidence: &Value) -> String {
    format!(
        "Write a single-paragraph 'Summary of Experience'.\n\
         Length 3–4 sentences by default; go longer only if the evidence is rich.\n\
         Use the exact primary_role; state years of experience (not months) following years_phrase_hint.\n\
         If present in evidence, mention methods, diameters (e.g. 'Ø 6–11 m' or 'up to Ø 11 m'), \
         top OEMs (at most 3), sectors and countries.\n\
         {GROUNDING_INSTRUCTION}\n\
         Evidence JSON: {evidence}\n\
         Output: one paragraph, no bullets, no headers."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_embeds_payload() {
        let prompt = cv_extraction_prompt("TBM Operator", "EPB drives in Doha");
        assert!(prompt.starts_with("INPUT:\n{"));
        assert!(prompt.contains("\"desired_position\":\"TBM Operator\""));
        assert!(prompt.contains("EPB drives in Doha"));
    }

    #[test]
    fn test_summary_prompt_embeds_evidence() {
        let prompt = summary_prompt(&json!({"primary_role": "NATM Engineer"}));
        assert!(prompt.contains(r#"{"primary_role":"NATM Engineer"}"#));
        assert!(prompt.ends_with("no bullets, no headers."));
    }
}
