//! Rendering capability the controllers drive. A browser binding maps these
//! onto class and attribute toggles; `leadctl` prints them; tests record them.

use shared::domain::{FieldName, StatusKind};

pub trait FormView: Send {
    fn show_field_error(&mut self, field: FieldName, message: &str);
    fn clear_field_error(&mut self, field: FieldName);
    fn focus(&mut self, field: FieldName);
    fn set_status(&mut self, kind: StatusKind, message: &str);
    /// Disables the submit control while `true`.
    fn set_loading(&mut self, loading: bool);
    /// Clears every input back to empty.
    fn reset(&mut self);
    fn open_mailto(&mut self, href: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplePanel {
    Hidden,
    Form,
    Success,
    Error,
}

/// The sample dialog swaps whole panels instead of only a status line.
pub trait SampleView: FormView {
    fn show_panel(&mut self, panel: SamplePanel);
    fn show_confirmed_email(&mut self, email: &str);
}
