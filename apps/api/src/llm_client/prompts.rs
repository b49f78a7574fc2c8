//! Prompts for LLM-backed match scoring.

/// System prompt enforcing the structured scoring response.
pub const MATCH_SCORE_SYSTEM: &str = "You score how well a job posting matches a candidate's CV. \
    Respond with valid JSON only, no markdown fences: \
    {\"score\": <number between 0 and 1>, \"explanation\": <short string>}.";

/// User prompt template. Placeholders: {cv_text}, {job_title}, {job_description}.
pub const MATCH_SCORE_PROMPT_TEMPLATE: &str = "\
Candidate CV:
{cv_text}

Job title:
{job_title}

Job description:
{job_description}

Score how well this job matches the candidate's CV.";
