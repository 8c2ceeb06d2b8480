//! System prompt composition.

use crate::schema::OutputSchema;
use crate::types::ResponseFormat;

/// Join instructions, description and output-format guidance.
///
/// Blank parts are skipped. The schema is wrapped in a fenced block
/// request only for providers answering in plain text.
pub fn compose_system_prompt(
    instructions: &str,
    description: Option<&str>,
    output_schema: Option<&dyn OutputSchema>,
    format: ResponseFormat,
) -> String {
    let output_instruction = output_schema
        .map(|schema| output_format_instruction(schema, format))
        .unwrap_or_default();

    [instructions, description.unwrap_or(""), output_instruction.as_str()]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn output_format_instruction(schema: &dyn OutputSchema, format: ResponseFormat) -> String {
    let mut text = String::from(
        "Your final response MUST be a JSON object that strictly adheres to the following schema.\n\
         You should only make tool calls if necessary to gather the information required to construct this JSON object.\n",
    );
    if format == ResponseFormat::Text {
        text.push_str(
            "Please wrap the JSON object within a markdown code block, like this:\n\
             ```json\n{ /* JSON content */ }\n```\n\
             Do not add any other conversational text or explanations outside the JSON block.\n",
        );
    }
    let schema_json = serde_json::to_string_pretty(&schema.json_schema())
        .unwrap_or_else(|_| schema.json_schema().to_string());
    text.push_str(&format!("Final output JSON schema is:\n```json\n{schema_json}\n```"));
    text
}
