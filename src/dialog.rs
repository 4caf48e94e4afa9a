use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDialog {
    pub title: String,
    pub message: String,
    // the only button, it just dismisses the dialog
    pub positive_button: String,
}

impl AlertDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        AlertDialog {
            title: title.into(),
            message: message.into(),
            positive_button: "OK".to_string(),
        }
    }
}

pub trait DialogPresenter {
    fn show_alert(&mut self, dialog: &AlertDialog);
}
