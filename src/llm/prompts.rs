//! Prompt templates for route profile generation.

use crate::data::route::RouteRequest;

/// System message; the format instructions are appended verbatim.
pub const SYSTEM_PROMPT_PREFIX: &str = "Você é um especialista em viagens brasileiras. Forneça \
apenas o JSON solicitado e siga rigorosamente estas instruções de formato:\n";

/// User message template with `{origem}` and `{destino}` placeholders.
pub const USER_PROMPT_TEMPLATE: &str = "Considere as fontes públicas mais confiáveis. Para a \
cidade de origem '{origem}' e a cidade de destino '{destino}', produza o JSON com distância, \
tipo de região, resumo climático em três tópicos e dias chuvosos no ano mais recente disponível.";

/// A rendered two-message prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// System message carrying the format instructions.
    pub system: String,
    /// User message carrying the city pair.
    pub user: String,
}

/// Route analysis prompt, partially bound to its format instructions.
///
/// The system message is fixed at construction; only the city names vary
/// per call.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    user_template: &'static str,
}

impl PromptTemplate {
    /// Binds the route analysis template to `format_instructions`.
    pub fn route_analysis(format_instructions: &str) -> Self {
        Self {
            system: format!("{SYSTEM_PROMPT_PREFIX}{format_instructions}"),
            user_template: USER_PROMPT_TEMPLATE,
        }
    }

    /// Returns the bound system message.
    pub fn system_prompt(&self) -> &str {
        &self.system
    }

    /// Renders the prompt for one city pair.
    ///
    /// City names are inserted as given, including empty strings.
    pub fn render(&self, request: &RouteRequest) -> ComposedPrompt {
        ComposedPrompt {
            system: self.system.clone(),
            user: substitute(
                self.user_template,
                &[
                    ("origem", request.origin.as_str()),
                    ("destino", request.destination.as_str()),
                ],
            ),
        }
    }
}

/// Single-pass `{name}` substitution.
///
/// Replacement text is never rescanned, so a city called `{destino}` is
/// inserted literally. Unknown placeholders are left untouched.
fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let replacement = after_open.find('}').and_then(|close| {
            let name = &after_open[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                output.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                output.push('{');
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}
