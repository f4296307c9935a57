// All LLM prompt constants for the scoring engine.
// Templates use `{placeholder}` markers replaced before sending.

/// Keyword-expansion prompt. Replace `{max_keywords}` and `{job_description}`.
/// Output is parsed as a comma/line-delimited list, so the prompt forbids
/// prose.
pub const JD_KEYWORD_PROMPT_TEMPLATE: &str = "List the top {max_keywords} skills or keywords \
that are relevant for the following job description. \
Return as a comma-separated list with no numbering and no commentary.\n\n\
JOB DESCRIPTION:\n{job_description}";

/// Qualitative scoring prompt for the resume + job-description pair.
/// Replace `{resume_text}` and `{job_description}`.
pub const ATS_SCORING_PROMPT_TEMPLATE: &str = r#"You are an Applicant Tracking System (ATS) scoring engine.
Objectively evaluate the resume against the job description.

Return a JSON object with this EXACT schema (no extra fields, no markdown):
{
  "role_alignment": 0,
  "content_quality": 0,
  "explanation": "one or two sentences",
  "missing_keywords": ["skill the job needs that the resume lacks"],
  "suggestions": ["actionable improvement"]
}

Scoring rules:
- role_alignment (0-100): how well the candidate's narrative, seniority, and
  domain fit the target role.
- content_quality (0-100): action verbs, quantified achievements, clarity.
- missing_keywords: only skills explicitly required by the job description.
- suggestions: 2-3 concrete, specific improvements.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

/// General-quality prompt used when no job description is supplied.
/// Replace `{resume_text}`.
pub const GENERAL_QUALITY_PROMPT_TEMPLATE: &str = r#"You are an ATS analyzer. Evaluate this resume for general job-seeking quality.

Return a JSON object with this EXACT schema (no extra fields, no markdown):
{
  "role_alignment": 0,
  "content_quality": 0,
  "explanation": "one or two sentences",
  "suggestions": ["actionable improvement"]
}

- role_alignment (0-100): how well the resume narrative fits a typical
  tech/engineering role.
- content_quality (0-100): action verbs, quantified achievements, clarity.
- suggestions: 2-3 improvement suggestions.

RESUME:
{resume_text}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_their_placeholders() {
        assert!(JD_KEYWORD_PROMPT_TEMPLATE.contains("{max_keywords}"));
        assert!(JD_KEYWORD_PROMPT_TEMPLATE.contains("{job_description}"));
        assert!(ATS_SCORING_PROMPT_TEMPLATE.contains("{resume_text}"));
        assert!(ATS_SCORING_PROMPT_TEMPLATE.contains("{job_description}"));
        assert!(GENERAL_QUALITY_PROMPT_TEMPLATE.contains("{resume_text}"));
        assert!(!GENERAL_QUALITY_PROMPT_TEMPLATE.contains("{job_description}"));
    }
}
