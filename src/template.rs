//! Variable interpolation for canned messages.
//!
//! Exactly four placeholder tokens are recognized; anything else in the
//! template, including unknown or half-formed `{{…}}` sequences, passes
//! through untouched.

use crate::model::LeadContext;

/// Substitute every occurrence of the lead variables into `template`.
/// Pure and deterministic; never fails.
pub fn render(template: &str, ctx: &LeadContext) -> String {
    template
        .replace("{{nome}}", &ctx.name)
        .replace("{{produto}}", &ctx.product)
        .replace("{{valor}}", &ctx.value)
        .replace("{{atendente}}", &ctx.agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LeadContext {
        LeadContext {
            name: "Ana".into(),
            product: "Plano X".into(),
            value: "R$10".into(),
            agent: "Maria".into(),
        }
    }

    #[test]
    fn replaces_all_four_tokens() {
        let out = render("Olá {{nome}}, {{produto}} por {{valor}}", &ctx());
        assert_eq!(out, "Olá Ana, Plano X por R$10");
        assert_eq!(render("Sou {{atendente}}", &ctx()), "Sou Maria");
    }

    #[test]
    fn repeated_tokens_all_replace() {
        assert_eq!(render("{{nome}} e {{nome}}", &ctx()), "Ana e Ana");
    }

    #[test]
    fn unknown_or_malformed_tokens_pass_through() {
        assert_eq!(render("{{cidade}} {{nome", &ctx()), "{{cidade}} {{nome");
        assert_eq!(render("sem variáveis", &ctx()), "sem variáveis");
    }

    #[test]
    fn rendering_twice_is_idempotent_for_token_free_values() {
        let once = render("Olá {{nome}}, {{valor}}", &ctx());
        assert_eq!(render(&once, &ctx()), once);
    }

    // Known non-goal: context values containing token syntax are not
    // protected. A value injecting a token that sits earlier in the
    // substitution chain survives the first pass and is consumed by a
    // second one. Pinned here so the behavior stays explicit.
    #[test]
    fn token_bearing_values_are_not_protected() {
        let mut c = ctx();
        c.product = "{{nome}}".into();
        let once = render("{{produto}}", &c);
        assert_eq!(once, "{{nome}}");
        assert_eq!(render(&once, &c), "Ana");
    }
}
