//! Rewrites the SAM template produced by `chalice package` before it is
//! handed to CloudFormation.
//!
//! The three rewrites touch disjoint parts of the document:
//!
//! | Rewrite | Region |
//! |---------|--------|
//! | [`annotate_outputs`] | `Outputs.*.Export` |
//! | [`annotate_function_names`] | `Resources.*.Properties.FunctionName` |
//! | [`apply_validation`] | `Resources.RestAPI.Properties.DefinitionBody` |
use crate::config::ValidationConfig;
use crate::error::ShrubberyError;
use anyhow::{Context as _, Result};
use log::debug;
use serde_json::{json, Map, Value};
use std::path::Path;

pub const SERVERLESS_FUNCTION: &str = "AWS::Serverless::Function";
pub const REST_API: &str = "RestAPI";
pub const VALIDATORS_KEY: &str = "x-amazon-apigateway-request-validators";
pub const VALIDATOR_KEY: &str = "x-amazon-apigateway-request-validator";
pub const VALIDATE_ALL: &str = "all";

fn as_object_mut<'a>(
    value: &'a mut Value,
    path: &str,
) -> Result<&'a mut Map<String, Value>, ShrubberyError> {
    value
        .as_object_mut()
        .ok_or_else(|| ShrubberyError::malformed(path, "expected an object"))
}

/// Optional top-level section as an object; absent means nothing to do.
fn section_mut<'a>(
    doc: &'a mut Value,
    key: &str,
) -> Result<Option<&'a mut Map<String, Value>>, ShrubberyError> {
    match as_object_mut(doc, "$")?.get_mut(key) {
        None => Ok(None),
        Some(section) => as_object_mut(section, key).map(Some),
    }
}

/// Set `Export.Name` of every output to `<stack_name>:<output_name>`.
pub fn annotate_outputs(doc: &mut Value, stack_name: &str) -> Result<(), ShrubberyError> {
    let Some(outputs) = section_mut(doc, "Outputs")? else {
        return Ok(());
    };

    for (name, output) in outputs.iter_mut() {
        let export_name = format!("{}:{}", stack_name, name);
        debug!("Export {} as {}", name, export_name);
        as_object_mut(output, &format!("Outputs.{}", name))?
            .insert("Export".to_string(), json!({ "Name": export_name }));
    }
    Ok(())
}

/// Set `Properties.FunctionName` of every serverless function to
/// `<stack_name>-<resource_name>`.
pub fn annotate_function_names(doc: &mut Value, stack_name: &str) -> Result<(), ShrubberyError> {
    let Some(resources) = section_mut(doc, "Resources")? else {
        return Ok(());
    };

    for (name, resource) in resources.iter_mut() {
        if resource.get("Type").and_then(Value::as_str) != Some(SERVERLESS_FUNCTION) {
            continue;
        }

        let path = format!("Resources.{}.Properties", name);
        let properties = resource
            .get_mut("Properties")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ShrubberyError::malformed(&path, "serverless function has no Properties"))?;

        let function_name = format!("{}-{}", stack_name, name);
        debug!("Name function {} as {}", name, function_name);
        properties.insert("FunctionName".to_string(), Value::String(function_name));
    }
    Ok(())
}

fn validators() -> Value {
    json!({
        "all": {
            "validateRequestBody": true,
            "validateRequestParameters": true
        },
        "params-only": {
            "validateRequestBody": false,
            "validateRequestParameters": true
        }
    })
}

fn definition_body(doc: &mut Value) -> Result<&mut Map<String, Value>, ShrubberyError> {
    let path = format!("Resources.{}.Properties.DefinitionBody", REST_API);
    doc.pointer_mut(&format!("/Resources/{}/Properties/DefinitionBody", REST_API))
        .ok_or_else(|| {
            ShrubberyError::malformed(
                &path,
                "not found; the packaging tool did not generate a REST API",
            )
        })
        .and_then(|body| as_object_mut(body, &path))
}

/// Install request validators on the REST API definition and attach the
/// configured parameter lists to their operations.
///
/// Existing validators are replaced, not merged. Generated definitions are
/// replaced only when the configuration provides its own.
pub fn apply_validation(
    doc: &mut Value,
    validation: Option<&ValidationConfig>,
) -> Result<(), ShrubberyError> {
    let Some(validation) = validation else {
        return Ok(());
    };

    let body = definition_body(doc)?;
    body.insert(VALIDATORS_KEY.to_string(), validators());
    if let Some(definitions) = &validation.definitions {
        body.insert(
            "definitions".to_string(),
            Value::Object(definitions.clone()),
        );
    }

    for (path, methods) in &validation.parameters {
        for (method, parameters) in methods {
            let location = format!("paths.{}.{}", path, method);
            let operation = body
                .get_mut("paths")
                .and_then(|paths| paths.get_mut(path))
                .and_then(|methods| methods.get_mut(method))
                .ok_or_else(|| ShrubberyError::malformed(&location, "operation not found"))?;
            let operation = as_object_mut(operation, &location)?;

            debug!("Validate {} {}", method, path);
            operation.insert(
                VALIDATOR_KEY.to_string(),
                Value::String(VALIDATE_ALL.to_string()),
            );
            operation.insert("parameters".to_string(), Value::Array(parameters.clone()));
        }
    }
    Ok(())
}

/// Apply every rewrite to the template.
pub fn transform(
    doc: &mut Value,
    stack_name: &str,
    validation: Option<&ValidationConfig>,
) -> Result<(), ShrubberyError> {
    annotate_outputs(doc, stack_name)?;
    annotate_function_names(doc, stack_name)?;
    apply_validation(doc, validation)
}

pub fn load_template<P>(path: P) -> Result<Value>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Can not read template {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Can not parse template {}", path.display()))
}

pub fn save_template<P>(path: P, doc: &Value) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, text + "\n")
        .with_context(|| format!("Can not write template {}", path.display()))
}
