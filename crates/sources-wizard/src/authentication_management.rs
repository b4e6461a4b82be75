//! Authentication management on the source edit form.
//!
//! Shows which applications use each stored authentication and stages a
//! removal until the user confirms it.

use serde::Serialize;
use tracing::debug;

use sources_core::{ApplicationType, AuthenticationSchema, AuthenticationValue, Source};

use crate::messages::{
    MessageFormatter, REMOVE_AUTH_DESCRIPTION, REMOVE_AUTH_NO_APPS, REMOVE_AUTH_WITH_APPS,
};

/// Display names of the application types whose applications on `source`
/// reference `auth_id`, in application order. Applications of unknown types
/// are skipped.
pub fn attached_app_names(
    source: &Source,
    auth_id: &str,
    app_types: &[ApplicationType],
) -> Vec<String> {
    source
        .applications
        .iter()
        .filter(|app| app.uses_authentication(auth_id))
        .filter_map(|app| {
            app_types
                .iter()
                .find(|app_type| app_type.id == app.application_type_id)
        })
        .map(|app_type| app_type.display_name.clone())
        .collect()
}

/// Header block rendered for one stored authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticationSummary {
    pub title: String,
    pub auth_id: String,
    pub app_names: Vec<String>,
    pub description: String,
}

impl AuthenticationSummary {
    pub fn new(
        source: &Source,
        auth: &AuthenticationValue,
        schema_auth: &AuthenticationSchema,
        app_types: &[ApplicationType],
        messages: &dyn MessageFormatter,
    ) -> Self {
        let app_names = attached_app_names(source, &auth.id, app_types);
        let usage = if app_names.is_empty() {
            messages.format(&REMOVE_AUTH_NO_APPS, &[])
        } else {
            let joined = app_names.join(", ");
            messages.format(&REMOVE_AUTH_WITH_APPS, &[("appNames", joined.as_str())])
        };
        let description = messages.format(
            &REMOVE_AUTH_DESCRIPTION,
            &[("authid", auth.id.as_str()), ("appNames", usage.as_str())],
        );

        Self {
            title: schema_auth.name.clone(),
            auth_id: auth.id.clone(),
            app_names,
            description,
        }
    }
}

/// Staged intent to delete an authentication, awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRemoval {
    pub auth: AuthenticationValue,
    pub app_names: Vec<String>,
    pub schema_auth: AuthenticationSchema,
}

/// Transient state of one source edit interaction.
#[derive(Debug, Clone, Default)]
pub struct SourceEditState {
    pub source: Source,
    removing_auth: Option<PendingRemoval>,
}

impl SourceEditState {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            removing_auth: None,
        }
    }

    /// Stage removal of `auth`, capturing the applications currently using it.
    pub fn set_auth_removing(
        &mut self,
        auth: AuthenticationValue,
        schema_auth: AuthenticationSchema,
        app_types: &[ApplicationType],
    ) -> &PendingRemoval {
        let app_names = attached_app_names(&self.source, &auth.id, app_types);
        debug!(auth_id = %auth.id, used_by = app_names.len(), "Staged authentication removal");
        self.removing_auth.insert(PendingRemoval {
            auth,
            app_names,
            schema_auth,
        })
    }

    /// Drop the staged removal (confirmed or cancelled), returning it.
    pub fn clear_auth_removing(&mut self) -> Option<PendingRemoval> {
        self.removing_auth.take()
    }

    pub fn removing_auth(&self) -> Option<&PendingRemoval> {
        self.removing_auth.as_ref()
    }

    /// Whether a removal is staged for this authentication.
    pub fn is_deleting(&self, auth_id: &str) -> bool {
        self.removing_auth
            .as_ref()
            .is_some_and(|pending| pending.auth.id == auth_id)
    }
}
