use super::api::{DeclarationOutput, Resolver, ResolverContext, ResolverOutput};
use crate::dts::file_system::relative;

/// Declares a JSON module's literal as its default export.
pub struct JsonResolver;

impl Resolver for JsonResolver {
    fn name(&self) -> &str {
        "json"
    }

    fn supports(&self, id: &str) -> bool {
        id.to_ascii_lowercase().ends_with(".json")
    }

    fn transform(&self, ctx: &ResolverContext<'_>) -> anyhow::Result<ResolverOutput> {
        let literal = if ctx.code.trim().is_empty() {
            ctx.program
                .get_source_file(ctx.id)
                .map(|sf| sf.full_text().to_string())
                .or_else(|| ctx.host.read_file(ctx.id))
                .ok_or_else(|| anyhow::anyhow!("no content for {}", ctx.id))?
        } else {
            ctx.code.to_string()
        };
        let literal = literal.trim();
        serde_json::from_str::<serde_json::Value>(literal)
            .map_err(|e| anyhow::anyhow!("invalid JSON in {}: {}", ctx.id, e))?;

        Ok(vec![DeclarationOutput::new(
            format!("{}.d.ts", relative(ctx.root, ctx.id)),
            format!("declare const _default: {};\n\nexport default _default;\n", literal),
        )]
        .into())
    }
}
