//! Declarative step and field types understood by the wizard renderer.

use serde::Serialize;
use serde_json::Value as JsonValue;

use sources_core::{AuthenticationValue, Error, Result};

/// One choice of a single-choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Validators attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Validator {
    Required,
}

/// Content rendered by a description field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DescriptionContent {
    /// Hidden bootstrap that seeds the form with the stored authentication values.
    AuthTypeSetter {
        authentication_values: Vec<AuthenticationValue>,
    },
    /// Explains which authentication type the selected application needs.
    SelectAuthenticationSummary {
        application_type_name: String,
        authentication_type_name: String,
        text: String,
    },
}

/// A field in a step, tagged with the renderer component that draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "component", rename_all = "kebab-case")]
pub enum FieldSpec {
    Description {
        name: String,
        content: DescriptionContent,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        hide_field: bool,
    },
    SubForm {
        name: String,
        fields: Vec<FieldSpec>,
    },
    Radio {
        name: String,
        label: String,
        is_required: bool,
        validate: Vec<Validator>,
        options: Vec<SelectOption>,
    },
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Description { name, .. }
            | FieldSpec::SubForm { name, .. }
            | FieldSpec::Radio { name, .. } => name.as_str(),
        }
    }

    pub fn is_sub_form(&self) -> bool {
        matches!(self, FieldSpec::SubForm { .. })
    }

    /// Options of this field, or of the first radio nested in a sub-form.
    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            FieldSpec::Radio { options, .. } => Some(options.as_slice()),
            FieldSpec::SubForm { fields, .. } => fields.iter().find_map(FieldSpec::options),
            FieldSpec::Description { .. } => None,
        }
    }
}

/// Routes submitted form values to the id of the following step.
///
/// Step ids have the shape `<source type name>-<application type id>-<auth type>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextStep {
    pub source_type_name: String,
    pub app_id: String,
}

impl NextStep {
    /// Pick the next step from either a direct `authtype` value or the
    /// `authtype` of a selected `authentication` sub-value.
    pub fn resolve(&self, values: &JsonValue) -> Result<String> {
        let authtype = values
            .get("authtype")
            .and_then(JsonValue::as_str)
            .filter(|authtype| !authtype.is_empty())
            .or_else(|| {
                values
                    .get("authentication")
                    .and_then(|auth| auth.get("authtype"))
                    .and_then(JsonValue::as_str)
                    .filter(|authtype| !authtype.is_empty())
            })
            .ok_or_else(|| {
                Error::InvalidInput(
                    "form values carry neither authtype nor authentication.authtype".to_string(),
                )
            })?;

        Ok(format!("{}-{}-{}", self.source_type_name, self.app_id, authtype))
    }
}

/// One generated page of the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct StepDefinition {
    pub name: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
    #[serde(skip)]
    pub next_step: NextStep,
}

impl StepDefinition {
    /// Generated authentication sub-forms, in order.
    pub fn sub_forms(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.is_sub_form())
    }

    /// Whether the user has anything to choose on this step. When false the
    /// caller's routing may skip it.
    pub fn has_selectable_authentications(&self) -> bool {
        self.sub_forms().next().is_some()
    }
}
