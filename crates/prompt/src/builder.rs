//! Prompt builder: renders a definition's templates with input variables.

use crate::types::{BuiltPrompt, PromptDefinition};
use docroute_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the system and user templates are rendered in strict mode, so a
/// template that references an unknown variable fails instead of silently
/// rendering an empty string.
///
/// # Example
/// ```no_run
/// use docroute_prompt::{build_prompt, builtin_prompt, CLASSIFY_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(CLASSIFY_PROMPT_ID)?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is the vacation policy?".to_string());
/// vars.insert("policyLabel".to_string(), "Policy".to_string());
/// vars.insert("resumeLabel".to_string(), "Resume".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_definition(system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            system: system.map(str::to_string),
            template: "Question: {{question}}".to_string(),
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{question}}", &vars(&[("question", "Hi?")]));
        assert_eq!(result.unwrap(), "Question: Hi?");
    }

    #[test]
    fn test_no_html_escaping() {
        let result = render_template(
            "{{context}}",
            &vars(&[("context", "Requester: Ann <ann@example.com> & co")]),
        );
        assert_eq!(result.unwrap(), "Requester: Ann <ann@example.com> & co");
    }

    #[test]
    fn test_build_prompt_without_system() {
        let def = create_test_definition(None);
        let built = build_prompt(&def, vars(&[("question", "Test question")])).unwrap();

        assert!(built.system.is_none());
        assert_eq!(built.user, "Question: Test question");
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_prompt_with_system() {
        let def = create_test_definition(Some("Answer about {{topic}}."));
        let built = build_prompt(
            &def,
            vars(&[("question", "Test question"), ("topic", "benefits")]),
        )
        .unwrap();

        assert_eq!(built.system.as_deref(), Some("Answer about benefits."));
        assert_eq!(built.metadata.resolved_variables.len(), 2);
    }

    #[test]
    fn test_render_template_missing_variable() {
        let result = render_template("Question: {{missing}}", &HashMap::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
