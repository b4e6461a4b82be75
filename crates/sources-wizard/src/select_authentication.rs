//! The "select authentication" step of the add-application wizard.
//!
//! When an application is attached to a source, the user may reuse an
//! authentication value that already exists for one of the authentication
//! types the application supports on that source type. This module builds the
//! step that offers those choices.

use tracing::{debug, error, instrument, trace};

use sources_core::defaults::{NEW_AUTHENTICATION_PREFIX, SELECT_AUTHENTICATION_STEP};
use sources_core::{
    logging, ApplicationType, AuthenticationValue, Error, Result, Source, SourceType,
};

use crate::fields::{
    DescriptionContent, FieldSpec, NextStep, SelectOption, StepDefinition, Validator,
};
use crate::messages::{
    MessageFormatter, DEFINE_NEW_AUTHENTICATION, SELECT_AUTHENTICATION_DESCRIPTION,
    SELECT_AUTHENTICATION_TITLE,
};

/// Field name of the hidden bootstrap description.
pub const AUTH_TYPE_SETTER_FIELD: &str = "authtypesetter";

/// Field name of the radio group inside each sub-form.
pub const SELECTED_AUTHENTICATION_FIELD: &str = "selectedAuthentication";

/// Snapshot the step is computed from.
#[derive(Debug, Clone, Copy)]
pub struct SelectAuthenticationInput<'a> {
    pub source: &'a Source,
    pub source_type: &'a SourceType,
    pub app: &'a ApplicationType,
    pub authentication_values: &'a [AuthenticationValue],
}

impl SelectAuthenticationInput<'_> {
    /// The application supports the source type and is not attached yet.
    pub fn can_attach(&self) -> bool {
        self.app.supports_source_type(&self.source_type.name)
            && !self.source.has_application_type(&self.app.id)
    }
}

/// Options for one authentication type: one per stored value of that type,
/// in input order.
///
/// Labels read `<typeName>[-<username>]-<appDisplayName>`, or end with
/// `-unused-<valueId>` when no application type is given.
pub fn generate_auth_selection_options(
    authentication_values: &[AuthenticationValue],
    app_type: Option<&ApplicationType>,
    supported_auth_type_name: &str,
    supported_auth_type: &str,
) -> Vec<SelectOption> {
    authentication_values
        .iter()
        .filter(|value| value.authtype == supported_auth_type)
        .map(|value| {
            let mut label = supported_auth_type_name.to_string();
            if let Some(username) = value.username() {
                label.push('-');
                label.push_str(username);
            }
            match app_type {
                Some(app) => {
                    label.push('-');
                    label.push_str(&app.display_name);
                }
                None => {
                    label.push_str("-unused-");
                    label.push_str(&value.id);
                }
            }

            SelectOption {
                label,
                value: value.id.clone(),
            }
        })
        .collect()
}

/// Build the authentication selection step.
///
/// The step always exists. It only carries authentication sub-forms when the
/// application supports the source type, is not attached to the source yet,
/// and at least one stored value matches a supported authentication type.
///
/// Fails with [`Error::DataIntegrity`] when a supported authentication type
/// has matching values but no name in the source type's schema.
#[instrument(
    skip_all,
    fields(
        subsystem = logging::WIZARD,
        op = logging::OP_SELECT_AUTHENTICATION,
        source_type = %input.source_type.name,
        app_id = %input.app.id,
    )
)]
pub fn select_authentication_step(
    input: &SelectAuthenticationInput<'_>,
    messages: &dyn MessageFormatter,
) -> Result<StepDefinition> {
    let SelectAuthenticationInput {
        source_type,
        app,
        authentication_values,
        ..
    } = *input;

    let title = messages.format(&SELECT_AUTHENTICATION_TITLE, &[]);
    let mut fields = vec![FieldSpec::Description {
        name: AUTH_TYPE_SETTER_FIELD.to_string(),
        content: DescriptionContent::AuthTypeSetter {
            authentication_values: authentication_values.to_vec(),
        },
        hide_field: true,
    }];

    if input.can_attach() {
        for supported_auth_type in app.supported_auth_types(&source_type.name) {
            let has_values = authentication_values
                .iter()
                .any(|value| &value.authtype == supported_auth_type);
            if !has_values {
                trace!(auth_type = %supported_auth_type, "No stored values, skipping");
                continue;
            }

            let type_name = source_type
                .auth_type_name(supported_auth_type)
                .ok_or_else(|| {
                    error!(
                        auth_type = %supported_auth_type,
                        "Authentication type missing from source type schema"
                    );
                    Error::DataIntegrity {
                        source_type: source_type.name.clone(),
                        auth_type: supported_auth_type.clone(),
                    }
                })?;

            fields.push(authentication_sub_form(
                app,
                type_name,
                supported_auth_type,
                authentication_values,
                messages,
            ));
        }
    } else {
        debug!(
            supported = app.supports_source_type(&source_type.name),
            "Application cannot be attached, step has no choices"
        );
    }

    debug!(subform_count = fields.len() - 1, "Generated selectAuthentication step");

    Ok(StepDefinition {
        name: SELECT_AUTHENTICATION_STEP.to_string(),
        title,
        fields,
        next_step: NextStep {
            source_type_name: source_type.name.clone(),
            app_id: app.id.clone(),
        },
    })
}

fn authentication_sub_form(
    app: &ApplicationType,
    type_name: &str,
    auth_type: &str,
    authentication_values: &[AuthenticationValue],
    messages: &dyn MessageFormatter,
) -> FieldSpec {
    let summary = messages.format(
        &SELECT_AUTHENTICATION_DESCRIPTION,
        &[
            ("applicationTypeName", app.display_name.as_str()),
            ("authenticationTypeName", type_name),
        ],
    );

    let mut options = vec![SelectOption {
        label: messages.format(&DEFINE_NEW_AUTHENTICATION, &[("supportedAuthTypeName", type_name)]),
        value: format!("{}{}", NEW_AUTHENTICATION_PREFIX, auth_type),
    }];
    options.extend(generate_auth_selection_options(
        authentication_values,
        Some(app),
        type_name,
        auth_type,
    ));

    FieldSpec::SubForm {
        name: format!("{}-subform", app.name),
        fields: vec![
            FieldSpec::Description {
                name: format!("{}-select-authentication-summary", app.name),
                content: DescriptionContent::SelectAuthenticationSummary {
                    application_type_name: app.display_name.clone(),
                    authentication_type_name: type_name.to_string(),
                    text: summary,
                },
                hide_field: false,
            },
            FieldSpec::Radio {
                name: SELECTED_AUTHENTICATION_FIELD.to_string(),
                label: messages.format(&SELECT_AUTHENTICATION_TITLE, &[]),
                is_required: true,
                validate: vec![Validator::Required],
                options,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DefaultMessages;
    use serde_json::json;
    use sources_core::{Application, AuthenticationSchema, SourceTypeSchema};
    use std::collections::HashMap;

    fn source_type() -> SourceType {
        SourceType {
            id: Some("1".to_string()),
            name: "aws".to_string(),
            product_name: Some("Amazon Web Services".to_string()),
            schema: SourceTypeSchema {
                authentication: vec![
                    AuthenticationSchema {
                        auth_type: "arn".to_string(),
                        name: "ARN".to_string(),
                    },
                    AuthenticationSchema {
                        auth_type: "access_key_secret_key".to_string(),
                        name: "AWS Secret key".to_string(),
                    },
                ],
            },
        }
    }

    fn app(auth_types: &[&str]) -> ApplicationType {
        let mut supported = HashMap::new();
        supported.insert(
            "aws".to_string(),
            auth_types.iter().map(|t| t.to_string()).collect(),
        );
        ApplicationType {
            id: "7".to_string(),
            name: "cost".to_string(),
            display_name: "Cost".to_string(),
            supported_source_types: vec!["aws".to_string()],
            supported_authentication_types: supported,
        }
    }

    fn value(id: &str, authtype: &str, username: Option<&str>) -> AuthenticationValue {
        AuthenticationValue {
            id: id.to_string(),
            authtype: authtype.to_string(),
            username: username.map(String::from),
        }
    }

    fn empty_source() -> Source {
        Source {
            id: "100".to_string(),
            ..Default::default()
        }
    }

    fn build(
        source: &Source,
        source_type: &SourceType,
        app: &ApplicationType,
        values: &[AuthenticationValue],
    ) -> Result<StepDefinition> {
        select_authentication_step(
            &SelectAuthenticationInput {
                source,
                source_type,
                app,
                authentication_values: values,
            },
            &DefaultMessages,
        )
    }

    #[test]
    fn test_option_labels() {
        let cost = app(&["arn"]);

        let plain = generate_auth_selection_options(&[value("5", "arn", Some(""))], Some(&cost), "ARN", "arn");
        assert_eq!(plain[0].label, "ARN-Cost");
        assert_eq!(plain[0].value, "5");

        let unused = generate_auth_selection_options(&[value("5", "arn", Some(""))], None, "ARN", "arn");
        assert_eq!(unused[0].label, "ARN-unused-5");

        let named = generate_auth_selection_options(&[value("5", "arn", Some("bob"))], Some(&cost), "ARN", "arn");
        assert_eq!(named[0].label, "ARN-bob-Cost");
    }

    #[test]
    fn test_options_keep_input_order_and_filter_type() {
        let values = [
            value("9", "arn", None),
            value("2", "access_key_secret_key", Some("key")),
            value("4", "arn", Some("alice")),
        ];
        let options = generate_auth_selection_options(&values, None, "ARN", "arn");
        let ids: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(ids, ["9", "4"]);
        assert_eq!(options[1].label, "ARN-alice-unused-4");
    }

    #[test]
    fn test_step_with_choices() {
        let values = [value("5", "arn", Some("bob")), value("6", "arn", None)];
        let step = build(&empty_source(), &source_type(), &app(&["arn"]), &values).unwrap();

        assert_eq!(step.name, "selectAuthentication");
        assert_eq!(step.title, "Select authentication");
        assert_eq!(step.fields.len(), 2);
        assert_eq!(step.fields[0].name(), AUTH_TYPE_SETTER_FIELD);
        assert!(step.has_selectable_authentications());

        let sub_form = &step.fields[1];
        assert_eq!(sub_form.name(), "cost-subform");
        let options = sub_form.options().unwrap();
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Define new ARN", "ARN-bob-Cost", "ARN-Cost"]);
        assert_eq!(options[0].value, "new-arn");

        let FieldSpec::SubForm { fields, .. } = sub_form else {
            panic!("expected sub-form");
        };
        match &fields[0] {
            FieldSpec::Description {
                content:
                    DescriptionContent::SelectAuthenticationSummary {
                        application_type_name,
                        authentication_type_name,
                        text,
                    },
                hide_field,
                ..
            } => {
                assert_eq!(application_type_name, "Cost");
                assert_eq!(authentication_type_name, "ARN");
                assert!(text.contains("Cost"));
                assert!(!hide_field);
            }
            other => panic!("unexpected field {:?}", other),
        }
        match &fields[1] {
            FieldSpec::Radio {
                name,
                is_required,
                validate,
                ..
            } => {
                assert_eq!(name, SELECTED_AUTHENTICATION_FIELD);
                assert!(*is_required);
                assert_eq!(validate, &[Validator::Required]);
            }
            other => panic!("unexpected field {:?}", other),
        }
    }

    #[test]
    fn test_sub_forms_follow_declared_auth_type_order() {
        let values = [
            value("1", "arn", None),
            value("2", "access_key_secret_key", None),
        ];
        let step = build(
            &empty_source(),
            &source_type(),
            &app(&["access_key_secret_key", "arn"]),
            &values,
        )
        .unwrap();

        let first_values: Vec<_> = step
            .sub_forms()
            .map(|f| f.options().unwrap()[0].value.clone())
            .collect();
        assert_eq!(first_values, ["new-access_key_secret_key", "new-arn"]);
    }

    #[test]
    fn test_unsupported_source_type_has_no_sub_forms() {
        let mut other = source_type();
        other.name = "azure".to_string();
        let step = build(&empty_source(), &other, &app(&["arn"]), &[value("5", "arn", None)]).unwrap();

        assert_eq!(step.fields.len(), 1);
        assert!(!step.has_selectable_authentications());
        assert_eq!(step.fields[0].name(), AUTH_TYPE_SETTER_FIELD);
    }

    #[test]
    fn test_already_attached_app_has_no_sub_forms() {
        let source = Source {
            id: "100".to_string(),
            applications: vec![Application {
                id: "1000".to_string(),
                application_type_id: "7".to_string(),
                authentications: vec![],
            }],
            ..Default::default()
        };
        let step = build(&source, &source_type(), &app(&["arn"]), &[value("5", "arn", None)]).unwrap();
        assert!(!step.has_selectable_authentications());
    }

    #[test]
    fn test_types_without_values_are_skipped() {
        let step = build(
            &empty_source(),
            &source_type(),
            &app(&["arn", "access_key_secret_key"]),
            &[value("2", "access_key_secret_key", None)],
        )
        .unwrap();

        assert_eq!(step.sub_forms().count(), 1);
        assert_eq!(
            step.fields[1].options().unwrap()[0].value,
            "new-access_key_secret_key"
        );
    }

    #[test]
    fn test_missing_schema_name_is_data_integrity_error() {
        let err = build(
            &empty_source(),
            &source_type(),
            &app(&["token"]),
            &[value("5", "token", None)],
        )
        .unwrap_err();

        match err {
            Error::DataIntegrity {
                source_type,
                auth_type,
            } => {
                assert_eq!(source_type, "aws");
                assert_eq!(auth_type, "token");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_schema_name_without_values_is_fine() {
        let step = build(&empty_source(), &source_type(), &app(&["token"]), &[]).unwrap();
        assert!(!step.has_selectable_authentications());
    }

    #[test]
    fn test_generation_is_idempotent() {
        let values = [value("5", "arn", Some("bob"))];
        let (source, st, cost) = (empty_source(), source_type(), app(&["arn"]));
        let first = build(&source, &st, &cost, &values).unwrap();
        let second = build(&source, &st, &cost, &values).unwrap();
        assert_eq!(first.fields, second.fields);
        assert_eq!(first.next_step, second.next_step);
    }

    #[test]
    fn test_next_step_routes_by_source_type_and_app() {
        let step = build(&empty_source(), &source_type(), &app(&["arn"]), &[]).unwrap();
        assert_eq!(
            step.next_step.resolve(&json!({ "authtype": "arn" })).unwrap(),
            "aws-7-arn"
        );
    }

    #[test]
    fn test_bootstrap_field_carries_values() {
        let values = [value("5", "arn", None)];
        let step = build(&empty_source(), &source_type(), &app(&["arn"]), &values).unwrap();
        match &step.fields[0] {
            FieldSpec::Description {
                content: DescriptionContent::AuthTypeSetter { authentication_values },
                hide_field,
                ..
            } => {
                assert!(*hide_field);
                assert_eq!(authentication_values.as_slice(), &values);
            }
            other => panic!("unexpected field {:?}", other),
        }
    }
}
