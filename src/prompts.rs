//! Instruction templates sent to the generative model.
//!
//! There are exactly three, one per user action. Each template defines the
//! output contract the presentation layer relies on; in particular
//! [`PROMPT_MATCH`] requires the first response line to be `<int>%`, which is
//! what [`crate::pipeline::score::parse_score`] reads.
//!
//! Keeping them as plain constants lets tests inspect them without a model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction for the narrative resume review.
pub const PROMPT_ANALYZE: &str = r#"
You are an experienced Technical Hiring Manager and ATS expert with over 10 years of experience
reviewing resumes in the fields of Data Science, Artificial Intelligence, Machine Learning, Data Analysis,
DevOps, Data Engineering, and Web Development.

Task:
1. Review the candidate's resume text against the job description.
2. Analyze line by line where relevant.
3. Highlight strengths and specific areas where the candidate is a strong match.
4. Point out flaws, vague language, weak bullet points, or missing impact statements.
5. Suggest concrete improvements to wording and structure.

Your response should be:
- Well structured with headings.
- Focused on how well the resume aligns with the job description.
- Honest but constructive and encouraging.
"#;

/// Instruction for the skills-gap roadmap.
pub const PROMPT_SKILL_GAP: &str = r#"
You are a senior career coach and technical hiring manager.

Task:
1. Based on the resume and job description, identify the key skills, tools, and technologies required.
2. Show which of these the candidate already has.
3. Highlight gaps: skills, tools, or experiences that the candidate should build.
4. Recommend specific actions: courses, projects, certifications, or contributions to gain those skills.
5. Keep the tone supportive and practical.

Format:
- Section 1: Skills the candidate already matches.
- Section 2: Missing or weak skills (with priority).
- Section 3: Actionable roadmap (projects, learning, and improvements).
"#;

/// Instruction for the numeric match score.
///
/// The first line of the response must be only `<int>%`.
pub const PROMPT_MATCH: &str = r#"
You are an expert ATS (Applicant Tracking System) and technical recruiter.

Task:
1. Evaluate how well the resume matches the job description in terms of:
   - Required skills and tools
   - Relevant experience
   - Domain/industry alignment
   - Keywords typically used by ATS
2. Decide an overall match percentage between 0 and 100.

VERY IMPORTANT OUTPUT FORMAT:
- The FIRST line of your response must be only the match percentage as an integer followed by a percent sign.
  Example: 78%
- After a blank line, provide:
  - A short explanation of why you gave that score.
  - A bullet list of important missing keywords/skills.
  - Suggestions to improve the match.

Do NOT include anything else on the first line except the percentage.
"#;

/// The three user actions, each bound to one instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Structured, headed critique of resume vs. job description.
    Analyze,
    /// Matched skills, missing skills with priority, and a roadmap.
    SkillGap,
    /// Leading `<int>%` line followed by explanation and suggestions.
    Match,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Analyze, Action::SkillGap, Action::Match];

    /// The instruction template sent as the first request segment.
    pub fn instruction(self) -> &'static str {
        match self {
            Action::Analyze => PROMPT_ANALYZE,
            Action::SkillGap => PROMPT_SKILL_GAP,
            Action::Match => PROMPT_MATCH,
        }
    }

    /// Heading shown above the result.
    pub fn title(self) -> &'static str {
        match self {
            Action::Analyze => "Detailed Resume Review",
            Action::SkillGap => "Skill Gap & Improvement Plan",
            Action::Match => "ATS Match Result",
        }
    }

    /// Message shown while the request is in flight.
    pub fn progress_message(self) -> &'static str {
        match self {
            Action::Analyze => "Analyzing resume vs job description...",
            Action::SkillGap => "Analyzing skill gaps and improvement suggestions...",
            Action::Match => "Calculating ATS match percentage...",
        }
    }

    /// Names the failed step in "Error during {context}: ...".
    pub fn failure_context(self) -> &'static str {
        match self {
            Action::Analyze => "analysis",
            Action::SkillGap => "skill analysis",
            Action::Match => "ATS match evaluation",
        }
    }

    /// Short name used on the command line and in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Analyze => "analyze",
            Action::SkillGap => "skills",
            Action::Match => "match",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analyze" => Ok(Action::Analyze),
            "skills" => Ok(Action::SkillGap),
            "match" => Ok(Action::Match),
            other => Err(format!(
                "unknown action '{other}' (expected analyze, skills or match)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_prompt_pins_first_line_contract() {
        assert!(PROMPT_MATCH.contains("FIRST line"));
        assert!(PROMPT_MATCH.contains("Example: 78%"));
    }

    #[test]
    fn skill_gap_prompt_has_three_sections() {
        for section in ["Section 1", "Section 2", "Section 3"] {
            assert!(PROMPT_SKILL_GAP.contains(section), "missing {section}");
        }
    }

    #[test]
    fn each_action_has_distinct_instruction() {
        assert_ne!(Action::Analyze.instruction(), Action::SkillGap.instruction());
        assert_ne!(Action::SkillGap.instruction(), Action::Match.instruction());
        assert_ne!(Action::Analyze.instruction(), Action::Match.instruction());
    }

    #[test]
    fn action_round_trips_through_cli_name() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
        assert!("summarise".parse::<Action>().is_err());
        assert!("review".parse::<Action>().is_err());
    }

    #[test]
    fn failure_context_names_step() {
        assert_eq!(Action::Match.failure_context(), "ATS match evaluation");
    }
}
