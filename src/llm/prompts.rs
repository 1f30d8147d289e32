// LLM Prompts - Instruction templates for grouping and synthesis
//
// Small models follow a single worked example far better than abstract
// format rules, so the grouping template carries one few-shot pair.

use crate::llm::engine::ChatMessage;

pub const GROUPING_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that groups sentences by semantic similarity. \
     Always respond with valid JSON arrays only, no explanations.";

pub const SYNTHESIS_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that combines sentences into coherent paragraphs. \
     Write naturally flowing text that preserves the meaning of all input sentences.";

/// System message plus rendered user prompt for one completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Messages in the order the engine expects them
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.as_str()),
            ChatMessage::user(self.user.as_str()),
        ]
    }
}

/// Build the grouping prompt; sentences are embedded as a JSON array
pub fn build_grouping_prompt(sentences: &[String]) -> Prompt {
    // Serializing a slice of strings cannot fail
    let sentences_json = serde_json::to_string(sentences).unwrap_or_else(|_| "[]".to_string());

    let user = format!(
        r#"Analyze the following sentences and group them by semantic similarity.
Return ONLY a JSON array of arrays, where each inner array contains sentences that are semantically similar.
Do not include any explanation or additional text, just the JSON array.

Example input:
["The cat sleeps", "Dogs bark loudly", "My kitten naps"]

Example output:
[["The cat sleeps", "My kitten naps"], ["Dogs bark loudly"]]

Now group these sentences:
{sentences_json}

Output (JSON array only):"#
    );

    Prompt {
        system: GROUPING_SYSTEM_MESSAGE.to_string(),
        user,
    }
}

/// Build the synthesis prompt; sentences are embedded as a bulleted list
pub fn build_synthesis_prompt(sentences: &[String]) -> Prompt {
    let sentences_text = sentences
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Combine the following sentences into a single coherent, flowing paragraph.\n\
         Maintain the key information from each sentence while making the text natural and well-connected.\n\
         Respond with the paragraph only.\n\
         \n\
         Sentences:\n\
         {sentences_text}\n\
         \n\
         Write a coherent paragraph:"
    );

    Prompt {
        system: SYNTHESIS_SYSTEM_MESSAGE.to_string(),
        user,
    }
}
