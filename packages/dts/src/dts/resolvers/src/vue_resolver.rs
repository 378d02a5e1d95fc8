// Vue Resolver
//
// Declarations for single-file components come from the program's virtual
// script; only the output paths and maps are adjusted here.

use once_cell::sync::Lazy;
use regex::Regex;

use super::api::{DeclarationOutput, Resolver, ResolverContext, ResolverOutput};
use crate::dts::file_system::{ensure_absolute, normalize_id};
use crate::dts::program_driver::{extract_vue_script, VueScript, VUE_VIRTUAL_SUFFIXES};
use crate::dts::sourcemaps::{redirect_source, remap_source_lines, RawSourceMap};

static VIRTUAL_OUTPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.vue(?:\.[jt]sx?)?\.d\.ts(\.map)?$").unwrap());

pub struct VueResolver;

impl VueResolver {
    fn virtual_id(ctx: &ResolverContext<'_>) -> Option<String> {
        VUE_VIRTUAL_SUFFIXES
            .iter()
            .map(|suffix| format!("{}{}", ctx.id, suffix))
            .find(|candidate| ctx.program.get_source_file(candidate).is_some())
    }

    fn fix_map(
        content: &str,
        map_path: &str,
        virtual_id: &str,
        id: &str,
        script: Option<&VueScript>,
    ) -> anyhow::Result<String> {
        let mut map = RawSourceMap::parse(content)?;
        redirect_source(&mut map, map_path, virtual_id, id);
        if let Some(script) = script {
            map.mappings = remap_source_lines(&map.mappings, |line| {
                usize::try_from(line).map_or(line, |l| script.source_line(l) as i64)
            })
            .ok_or_else(|| anyhow::anyhow!("invalid mappings in {}", map_path))?;
        }
        Ok(map.to_json()?)
    }
}

impl Resolver for VueResolver {
    fn name(&self) -> &str {
        "vue"
    }

    fn supports(&self, id: &str) -> bool {
        normalize_id(id).ends_with(".vue")
    }

    fn transform(&self, ctx: &ResolverContext<'_>) -> anyhow::Result<ResolverOutput> {
        let virtual_id = Self::virtual_id(ctx)
            .ok_or_else(|| anyhow::anyhow!("no script found for {}", ctx.id))?;

        let mut emitted = Vec::new();
        let result = ctx.program.emit(Some(&virtual_id), &mut |path: &str, content: &str| {
            emitted.push((path.to_string(), content.to_string()))
        });

        let script = extract_vue_script(ctx.code);
        let mut outputs = Vec::with_capacity(emitted.len());
        for (path, content) in emitted {
            let path = VIRTUAL_OUTPUT.replace(&path, ".vue.d.ts$1").to_string();
            let content = if path.ends_with(".map") {
                let map_path = ensure_absolute(&path, ctx.out_dir);
                Self::fix_map(&content, &map_path, &virtual_id, ctx.id, script.as_ref())?
            } else {
                content
            };
            outputs.push(DeclarationOutput::new(path, content));
        }

        Ok(ResolverOutput {
            outputs,
            diagnostics: result.diagnostics,
            emit_skipped: result.emit_skipped,
        })
    }
}
