//! Template loading and rendering for synthesized documentation

use provider_doc_lint_common::duration::format_duration;
use provider_doc_lint_common::{resource_title, LintError, Result, TimeoutOp};
use tera::{Context, Tera};

pub const TIMEOUTS_SECTION: &str = "timeouts.md";
pub const TIMEOUT_BULLET: &str = "timeout_bullet.md";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.add_raw_template(
        TIMEOUTS_SECTION,
        include_str!("../templates/timeouts.md.tera"),
    )
    .map_err(|e| {
        LintError::Template(format!("Failed to load {TIMEOUTS_SECTION} template: {}", e))
    })?;

    tera.add_raw_template(
        TIMEOUT_BULLET,
        include_str!("../templates/timeout_bullet.md.tera"),
    )
    .map_err(|e| LintError::Template(format!("Failed to load {TIMEOUT_BULLET} template: {}", e)))?;

    Ok(tera)
}

/// Canonical bullet of one timeout operation
pub fn render_timeout_bullet(
    tera: &Tera,
    resource_type: &str,
    op: TimeoutOp,
    seconds: u64,
) -> Result<String> {
    let mut context = Context::new();
    context.insert("op", op.as_str());
    context.insert("duration", &format_duration(seconds));
    context.insert("verb", op.ing_form());
    context.insert("title", &resource_title(resource_type));

    render(tera, TIMEOUT_BULLET, &context)
}

/// Whole Timeouts section: heading, lead sentence and the given bullets
pub fn render_timeouts_section(tera: &Tera, bullets: &[String]) -> Result<Vec<String>> {
    let mut context = Context::new();
    context.insert("bullets", bullets);

    let rendered = render(tera, TIMEOUTS_SECTION, &context)?;
    Ok(rendered.lines().map(String::from).collect())
}

fn render(tera: &Tera, name: &str, context: &Context) -> Result<String> {
    tera.render(name, context)
        .map_err(|e| LintError::Template(format!("Template error: {:?}", e)))
}
