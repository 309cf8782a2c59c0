//! Phone command handlers.

use serde::Serialize;

use navigest_core::{ClientDraft, normalize_body, normalize_prefix};

use crate::cli::{GlobalOpts, PhoneArgs, PhoneCommand};
use crate::error::CliError;
use crate::output;

use super::Engine;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PhoneView {
    input: String,
    prefix: String,
    body: String,
    country: String,
    short_code: String,
    external: bool,
    display: String,
}

#[derive(Serialize)]
struct NormalizedView {
    input: String,
    normalized: String,
}

fn detail(p: &PhoneView) -> String {
    let or_dash = |s: &str| if s.is_empty() { "-".to_owned() } else { s.to_owned() };
    [
        format!("Input:     {}", p.input),
        format!("Prefix:    {}", or_dash(&p.prefix)),
        format!("Body:      {}", or_dash(&p.body)),
        format!("Country:   {}", p.country),
        format!("Code:      {}", or_dash(&p.short_code)),
        format!("External:  {}", if p.external { "yes" } else { "no" }),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: PhoneArgs, engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.command {
        PhoneCommand::Split { phone, prefix } => {
            let catalog = &engine.catalog;
            let mut draft = ClientDraft::new_template(None, catalog);
            draft.set_phone(&phone, prefix.as_deref().unwrap_or_default(), catalog);

            let dial = draft.dial_code();
            let view = PhoneView {
                prefix: dial.normalized_prefix().to_owned(),
                body: draft.phone_body().to_owned(),
                country: dial.country_name().to_owned(),
                short_code: dial.short_code().to_owned(),
                external: draft.record().external_flag,
                display: draft.record().display_phone(),
                input: phone,
            };
            output::render_single(&global.output, &view, detail, |p| p.display.clone())?
        }
        PhoneCommand::Prefix { prefix } => {
            let view = NormalizedView {
                normalized: normalize_prefix(&prefix),
                input: prefix,
            };
            output::render_single(
                &global.output,
                &view,
                |v| v.normalized.clone(),
                |v| v.normalized.clone(),
            )?
        }
        PhoneCommand::Body { body } => {
            let view = NormalizedView {
                normalized: normalize_body(&body),
                input: body,
            };
            output::render_single(
                &global.output,
                &view,
                |v| v.normalized.clone(),
                |v| v.normalized.clone(),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
