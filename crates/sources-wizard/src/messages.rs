//! Display strings for generated steps.
//!
//! Message formatting (translation, pluralization) belongs to an external
//! i18n facility. This module only defines the seam, the message ids with
//! their default English templates, and a formatter that renders the defaults.

/// A translatable message: stable id plus default template.
///
/// Templates use `{ name }` placeholders (surrounding spaces optional).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub id: &'static str,
    pub default_message: &'static str,
}

pub const SELECT_AUTHENTICATION_TITLE: MessageDescriptor = MessageDescriptor {
    id: "sources.selectAuthenticationTitle",
    default_message: "Select authentication",
};

pub const DEFINE_NEW_AUTHENTICATION: MessageDescriptor = MessageDescriptor {
    id: "sources.selectAuthenticationradioLabel",
    default_message: "Define new { supportedAuthTypeName }",
};

pub const SELECT_AUTHENTICATION_DESCRIPTION: MessageDescriptor = MessageDescriptor {
    id: "sources.selectAuthenticationDescription",
    default_message: "Selected application { applicationTypeName } supports { authenticationTypeName } authentication type. You can use already defined authentication values or define new.",
};

pub const REMOVE_AUTH_DESCRIPTION: MessageDescriptor = MessageDescriptor {
    id: "sources.removeAuthDescription",
    default_message: "id: {authid} { appNames}",
};

pub const REMOVE_AUTH_WITH_APPS: MessageDescriptor = MessageDescriptor {
    id: "sources.removeAuthWithApps",
    default_message: "used by {appNames}",
};

pub const REMOVE_AUTH_NO_APPS: MessageDescriptor = MessageDescriptor {
    id: "sources.removeAuthNoApps",
    default_message: "not used by any app",
};

/// Formats a message with named values.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, message: &MessageDescriptor, values: &[(&str, &str)]) -> String;
}

/// Renders default templates by substituting placeholders.
///
/// Unknown placeholders are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageFormatter for DefaultMessages {
    fn format(&self, message: &MessageDescriptor, values: &[(&str, &str)]) -> String {
        interpolate(message.default_message, values)
    }
}

fn interpolate(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = after[..close].trim();
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
