//! Alert fragments for displaying success and error messages to users.

use maud::{Markup, html};

/// A success or error message with optional details, rendered inside the
/// deposit, withdraw and transfer panels.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The operation succeeded.
    Success {
        /// The headline of the alert.
        message: String,
        /// Optional supporting text.
        details: String,
    },
    /// The operation failed.
    Error {
        /// The headline of the alert.
        message: String,
        /// Optional supporting text.
        details: String,
    },
}

impl Alert {
    /// Create a new success alert without details.
    pub fn success(message: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: String::new(),
        }
    }

    /// Create a new error alert without details.
    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: String::new(),
        }
    }

    /// Render the alert as HTML.
    pub fn into_html(self) -> Markup {
        match self {
            Alert::Success { message, details } => success_alert(&message, &details),
            Alert::Error { message, details } => error_alert(&message, &details),
        }
    }
}

/// Renders a green success alert.
pub fn success_alert(message: &str, details: &str) -> Markup {
    html! {
        div
            role="alert"
            class="p-4 text-sm rounded-lg text-green-800 bg-green-50 dark:bg-gray-700 dark:text-green-400"
        {
            p class="font-medium" { (message) }

            @if !details.is_empty() {
                p { (details) }
            }
        }
    }
}

/// Renders a red error alert.
pub fn error_alert(message: &str, details: &str) -> Markup {
    html! {
        div
            role="alert"
            class="p-4 text-sm rounded-lg text-red-800 bg-red-50 dark:bg-gray-700 dark:text-red-400"
        {
            p class="font-medium" { (message) }

            @if !details.is_empty() {
                p { (details) }
            }
        }
    }
}
