//! LLM prompt engineering for career-change extraction

use crate::error::ExtractorError;

/// Builds the classification and extraction prompt for one post
pub struct PromptBuilder {
    poster_name: String,
    about: String,
    description: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    ///
    /// Newlines are flattened to spaces so each field stays on its line.
    pub fn new(poster_name: &str, about: &str, description: &str) -> Self {
        Self {
            poster_name: flatten(poster_name),
            about: flatten(about),
            description: flatten(description),
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. What to analyze
        prompt.push_str(ANALYSIS_INTRO);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Post by: {}\n", self.poster_name));
        prompt.push_str(&format!("About: {}\n", self.about));
        prompt.push_str(&format!("Description: {}\n\n", self.description));

        // 2. Rubric
        prompt.push_str(CLASSIFICATION_STEP);
        prompt.push_str("\n\n");
        prompt.push_str(&EXTRACTION_STEP.replace("{poster_name}", &self.poster_name));
        prompt.push_str("\n\n");
        prompt.push_str(EXCLUSION_RULES);
        prompt.push_str("\n\n");

        // 3. Output contract
        prompt.push_str(OUTPUT_FORMAT);

        prompt
    }

    /// Build the prompt, rejecting it when it exceeds `max_chars`
    pub fn build_checked(&self, max_chars: usize) -> Result<String, ExtractorError> {
        let prompt = self.build();
        let chars = prompt.chars().count();
        if chars > max_chars {
            return Err(ExtractorError::Input(format!(
                "prompt is {} chars, limit is {}",
                chars, max_chars
            )));
        }
        Ok(prompt)
    }
}

fn flatten(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

const ANALYSIS_INTRO: &str =
    "Analyze the following LinkedIn post thoroughly and classify it based on job-related announcements:";

const CLASSIFICATION_STEP: &str = r#"Step 1: Classification
Determine if this post is about any of the following:
1. New job joining (either within the same company or a new company)
2. Job change or transition
3. Promotion within the same company
4. Leadership change or appointment
5. Other (not related to the above categories)"#;

const EXTRACTION_STEP: &str = r#"Step 2: Information Extraction
If the post falls into categories 1-4, extract the following information for each relevant mention:
- Remove any salutations (e.g. Mr. Mrs. Dr. Prof.), titles or degrees placed before or after the name, keeping only the name itself: {poster_name}
- Full name of the person mentioned (who got the new job, promotion, or new role), excluding any salutations, titles or degrees placed before or after the name
- Full name of the organization (current or new)
- New job title or role"#;

const EXCLUSION_RULES: &str = r#"Important:
- Ignore all kinds of hiring announcements for positions that are not filled yet or do not mention a specific individual's job change. For example, if the post says "I am hiring for a Finance Manager," this should be ignored.
- Ignore those individuals or persons who are retiring or leaving job
- Include those who are leaving a role or position but joining another role or position.
- Ignore positions like "Shareholder", "Owner", "Proprietor", "Insider", or similar titles.
- Specifically, exclude roles that do not indicate a significant change in responsibilities or title."#;

const OUTPUT_FORMAT: &str = r#"Format the response as a JSON object with the following structure:
{
  "poster_name": "[modified poster_name]",
  "post_category": "[Category number from Step 1]",
  "change_count": [number of changes],
  "relevant": [true/false],
  "extracted_info": [
    {
      "person_name": "[Full Name of the person mentioned]",
      "organization": "[Full Name of the Organization]",
      "new_role": "[New Job Title or Role]"
    }
  ]
}

Ensure high accuracy in classification and information extraction. If any information is uncertain or not explicitly mentioned, use "Unknown" as the value.

Provide only the JSON object as your response, with no additional text before or after."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = PromptBuilder::new(
            "Dr. Jane Doe",
            "Finance leader",
            "Thrilled to join Acme as CFO",
        )
        .build();

        assert!(prompt.contains("Post by: Dr. Jane Doe"));
        assert!(prompt.contains("About: Finance leader"));
        assert!(prompt.contains("Description: Thrilled to join Acme as CFO"));
        assert!(prompt.contains("keeping only the name itself: Dr. Jane Doe"));
    }

    #[test]
    fn test_prompt_includes_rubric() {
        let prompt = PromptBuilder::new("a", "b", "c").build();

        for category in ["1. New job", "2. Job change", "3. Promotion", "4. Leadership", "5. Other"] {
            assert!(prompt.contains(category), "missing category {}", category);
        }
        assert!(prompt.contains("\"Shareholder\", \"Owner\", \"Proprietor\", \"Insider\""));
        assert!(prompt.contains("retiring or leaving"));
        assert!(prompt.contains("\"extracted_info\""));
        assert!(prompt.contains("use \"Unknown\" as the value"));
        assert!(prompt.contains("Provide only the JSON object"));
    }

    #[test]
    fn test_newlines_are_flattened() {
        let prompt = PromptBuilder::new("Jane\nDoe", "line one\r\nline two", "a\nb\rc").build();
        assert!(prompt.contains("Post by: Jane Doe\n"));
        assert!(prompt.contains("About: line one line two\n"));
        assert!(prompt.contains("Description: a b c\n"));
    }

    #[test]
    fn test_empty_inputs_still_render() {
        let prompt = PromptBuilder::new("", "", "").build();
        assert!(prompt.contains("Post by: \n"));
    }

    #[test]
    fn test_build_checked_rejects_oversized_prompt() {
        let builder = PromptBuilder::new("Jane", "", &"x".repeat(500));
        let result = builder.build_checked(100);
        assert!(matches!(result, Err(ExtractorError::Input(ref msg)) if msg.contains("limit is 100")));

        assert!(builder.build_checked(50_000).is_ok());
    }
}
