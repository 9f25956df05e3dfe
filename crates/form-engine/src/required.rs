//! Required evaluator: adds and removes names in `required` lists.

use crate::adapter::{required_list, ConditionalRequirement};
use crate::context::ChangeContext;
use crate::show::SkipReason;
use form_expression::{Bindings, JsValue};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredOutcome {
    Required,
    Unrequired,
    Unchanged,
    Skipped(SkipReason),
    /// The expression failed; the list was left as it was.
    Failed,
}

/// Evaluates one conditional requirement against the change.
///
/// Only fields present in the live schema are considered, so a hidden
/// conditional field never becomes required.
pub fn evaluate_required(
    entry: &ConditionalRequirement,
    ctx: &mut ChangeContext,
    action: &Value,
) -> RequiredOutcome {
    let field_path = entry.field_path.substitute(&ctx.indices);
    let schema_context = entry.schema_context.substitute(&ctx.indices);
    let form_context = entry.form_context.substitute(&ctx.indices);
    if !field_path.is_resolved() || !schema_context.is_resolved() || !form_context.is_resolved() {
        debug!(key = %entry.key, "required skipped: unresolved index");
        return RequiredOutcome::Skipped(SkipReason::Unresolved);
    }
    let list = required_list(&schema_context);
    if ctx.schema.contains(&schema_context) {
        if let Err(err) = ctx.schema.ensure_list(&list) {
            warn!(key = %entry.key, error = %err, "required list not writable");
            return RequiredOutcome::Unchanged;
        }
    }
    if !ctx.schema.contains(&field_path) {
        debug!(key = %entry.key, "required skipped: field not shown");
        return RequiredOutcome::Skipped(SkipReason::FieldMissing);
    }

    let data = ctx.data_for(&form_context);
    if data.is_undefined() && entry.required.references("data") {
        debug!(key = %entry.key, "required skipped: edit outside the field's object");
        return RequiredOutcome::Skipped(SkipReason::ContextMismatch);
    }

    let bindings = Bindings::form(data, JsValue::Json(ctx.row.clone()), action.clone().into());
    let changed = match entry.required.test(&bindings) {
        Ok(true) => ctx
            .schema
            .add_required(&list, &entry.field_name)
            .map(|changed| changed.then_some(RequiredOutcome::Required)),
        Ok(false) => ctx
            .schema
            .remove_required(&list, &entry.field_name)
            .map(|changed| changed.then_some(RequiredOutcome::Unrequired)),
        Err(err) => {
            warn!(key = %entry.key, expression = entry.required.source(), error = %err, "required expression failed, left unchanged");
            return RequiredOutcome::Failed;
        }
    };
    match changed {
        Ok(outcome) => outcome.unwrap_or(RequiredOutcome::Unchanged),
        Err(err) => {
            warn!(key = %entry.key, error = %err, "required list not updated");
            RequiredOutcome::Unchanged
        }
    }
}
