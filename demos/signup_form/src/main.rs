use std::collections::BTreeMap;
use std::rc::Rc;

use repose_core::{Dispose, Scope, create_effect, signal};
use repose_form::*;
use serde_json::json;

fn schema() -> Result<JsonSchema, SchemaError> {
    JsonSchema::new(json!({
        "type": "object",
        "properties": {
            "fname": { "type": "string", "minLength": 4, "maxLength": 20 },
            "address": { "type": "string", "minLength": 1, "maxLength": 50 },
            "note": { "type": "string", "minLength": 1 }
        },
        "required": ["fname", "address", "note"]
    }))
}

fn defaults(round: &str, fname: &str) -> DefaultValues {
    BTreeMap::from([
        ("fname".to_string(), fname.to_string()),
        ("address".to_string(), format!("{round} address")),
        ("note".to_string(), format!("{round} note")),
        ("cousine.0.name".to_string(), format!("Cousine {round}")),
        ("random.0".to_string(), "why??".to_string()),
    ])
}

/// Marks `names` invalid together when `invalid` holds.
fn shared_error(form: &FormController, names: &[&str], invalid: bool, message: &str) {
    let message = invalid.then(|| message.to_string());
    form.set_errors(|errors| {
        let mut next = errors.clone();
        for name in names {
            next.set(*name, message.clone());
        }
        next
    });
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let default_values = signal(DefaultValues::new());
    let form = FormController::new(
        schema()?,
        FormConfig::new().default_values(default_values.clone()),
    );
    let host = InputHost::new();

    let mut names: Vec<String> = [
        "fname",
        "lname",
        "address",
        "phone",
        "note",
        "info",
        "list.0",
        "list.1",
        "list.2",
        "cousine.0.name",
        "cousine.1.name",
        "cousine.2.name",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    names.extend((0..60).map(|i| format!("random.{i}")));

    let mut inputs: BTreeMap<String, Rc<TextInput>> = BTreeMap::new();
    let mut bindings: Vec<Dispose> = Vec::new();
    provide_form(form.clone(), || {
        let Some(form) = use_form() else {
            return;
        };
        for name in &names {
            let input = host.text_input();
            bindings.push(form.register(name.as_str())(input.clone()));
            inputs.insert(name.clone(), input);
        }
    });

    let rules = Scope::new();
    rules.run(|| {
        create_effect({
            let form = form.clone();
            move || {
                let len = |name: &str| {
                    form.get_value(name)
                        .and_then(|v| v.as_str().map(|s| s.chars().count()))
                        .unwrap_or(0)
                };
                shared_error(
                    &form,
                    &["fname", "lname"],
                    len("fname") + len("lname") > 15,
                    "First name and last name must be less than 15 characters",
                );
            }
        });
        create_effect({
            let form = form.clone();
            move || {
                let filled = ["list.0", "list.1", "list.2"].iter().any(|name| {
                    form.get_value(name)
                        .is_some_and(|v| !repose_form::path::is_falsy(&v))
                });
                shared_error(
                    &form,
                    &["list.0", "list.1", "list.2"],
                    !filled,
                    "At least one list must be filled",
                );
            }
        });
    });

    for (round, fname) in [("Old", "John"), ("New", "New John"), ("Another", "Another John")] {
        default_values.set(defaults(round, fname));
        log::info!("defaults `{round}` applied: {}", form.values());
    }

    let on_submit = form.handle_submit(|data| log::info!("submitted: {data}"));

    if let Some(fname) = inputs.get("fname") {
        fname.type_text("Jo");
        log::info!("fname error after typing: {:?}", form.error("fname"));
    }
    match on_submit(&SubmitEvent::new()) {
        SubmitOutcome::Accepted(_) => log::info!("first submit accepted"),
        SubmitOutcome::Rejected { errors, focused } => log::info!(
            "first submit rejected, focused {focused:?}: {}",
            serde_json::to_string(&errors)?
        ),
    }

    form.set_value("fname", "Johnny");
    let outcome = on_submit(&SubmitEvent::new());
    log::info!("second submit accepted: {}", outcome.is_accepted());
    log::info!("errors left in place: {}", serde_json::to_string(&form.errors())?);

    rules.dispose();
    for binding in bindings {
        binding.run();
    }
    Ok(())
}
