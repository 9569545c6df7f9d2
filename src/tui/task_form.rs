//! Task form handling for the terminal user interface.
//!
//! The same form serves "add" and "edit": a text field and a deadline field
//! that accepts the natural-language forms of the CLI.

use chrono::{Local, NaiveDate};

use crate::dates::parse_deadline_input_at;
use crate::task::{normalise_text, Task};
use crate::tui::input::InputField;

pub const TEXT_FIELD: usize = 0;
pub const DEADLINE_FIELD: usize = 1;

/// What a submitted form asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub text: String,
    pub deadline: Option<NaiveDate>,
}

/// Task form for creating or editing a task.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub text: InputField,
    pub deadline: InputField,
    pub current_field: usize,
    /// Id of the task being edited; `None` when adding.
    pub editing: Option<u64>,
}

impl TaskForm {
    /// An empty form for a new task.
    pub fn new() -> Self {
        let mut form = TaskForm {
            text: InputField::new(),
            deadline: InputField::new(),
            current_field: TEXT_FIELD,
            editing: None,
        };
        form.update_active_field();
        form
    }

    /// A form populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = TaskForm {
            text: InputField::with_value(&task.text),
            deadline: InputField::with_value(
                &task.deadline.map(|d| d.to_string()).unwrap_or_default(),
            ),
            current_field: TEXT_FIELD,
            editing: Some(task.id),
        };
        form.update_active_field();
        form
    }

    pub fn field_count(&self) -> usize {
        2
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.field_count();
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            self.field_count() - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    pub fn update_active_field(&mut self) {
        self.text.active = self.current_field == TEXT_FIELD;
        self.deadline.active = self.current_field == DEADLINE_FIELD;
    }

    fn current_mut(&mut self) -> &mut InputField {
        match self.current_field {
            DEADLINE_FIELD => &mut self.deadline,
            _ => &mut self.text,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        self.current_mut().handle_char(c);
    }

    pub fn handle_backspace(&mut self) {
        self.current_mut().handle_backspace();
    }

    pub fn handle_delete(&mut self) {
        self.current_mut().handle_delete();
    }

    pub fn handle_left_right(&mut self, right: bool) {
        let field = self.current_mut();
        if right {
            field.move_cursor_right();
        } else {
            field.move_cursor_left();
        }
    }

    pub fn handle_home_end(&mut self, end: bool) {
        let field = self.current_mut();
        if end {
            field.move_cursor_end();
        } else {
            field.move_cursor_home();
        }
    }

    /// Validate the form against the local date.
    pub fn values(&self) -> Result<FormValues, String> {
        self.values_at(Local::now().date_naive())
    }

    /// Validate the form, resolving relative deadlines against `today`.
    pub fn values_at(&self, today: NaiveDate) -> Result<FormValues, String> {
        let text = normalise_text(&self.text.value).ok_or("Task text cannot be empty")?;
        let raw = self.deadline.value.trim();
        let deadline = if raw.is_empty() {
            None
        } else {
            Some(parse_deadline_input_at(raw, today).ok_or_else(|| {
                format!("Could not understand deadline '{raw}'. Try YYYY-MM-DD, today, fri or in 3d")
            })?)
        };
        Ok(FormValues { text, deadline })
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
    }

    fn type_into(form: &mut TaskForm, s: &str) {
        for c in s.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn test_new_form_focuses_text() {
        let form = TaskForm::new();
        assert!(form.text.active);
        assert!(!form.deadline.active);
        assert_eq!(form.editing, None);
    }

    #[test]
    fn test_fields_cycle() {
        let mut form = TaskForm::new();
        form.next_field();
        assert!(form.deadline.active);
        form.next_field();
        assert!(form.text.active);
        form.prev_field();
        assert_eq!(form.current_field, DEADLINE_FIELD);
    }

    #[test]
    fn test_values_with_relative_deadline() {
        let mut form = TaskForm::new();
        type_into(&mut form, "  Pay rent ");
        form.next_field();
        type_into(&mut form, "tomorrow");
        assert_eq!(
            form.values_at(today()),
            Ok(FormValues {
                text: "Pay rent".into(),
                deadline: NaiveDate::from_ymd_opt(2025, 1, 9),
            })
        );
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let mut form = TaskForm::new();
        type_into(&mut form, "   ");
        assert_eq!(form.values_at(today()), Err("Task text cannot be empty".to_string()));
    }

    #[test]
    fn test_bad_deadline_is_rejected() {
        let mut form = TaskForm::new();
        type_into(&mut form, "Stretch");
        form.next_field();
        type_into(&mut form, "whenever");
        assert!(form.values_at(today()).unwrap_err().contains("whenever"));
    }

    #[test]
    fn test_huge_relative_deadline_is_rejected() {
        let mut form = TaskForm::new();
        type_into(&mut form, "Someday");
        form.next_field();
        type_into(&mut form, "in 999999999999d");
        assert!(form.values_at(today()).unwrap_err().contains("in 999999999999d"));
    }

    #[test]
    fn test_from_task_round_trips_values() {
        let task = Task {
            id: 3,
            text: "Renew passport".into(),
            completed: true,
            deadline: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.editing, Some(3));
        assert_eq!(form.deadline.value, "2025-03-01");
        let values = form.values_at(today()).unwrap();
        assert_eq!(values.text, task.text);
        assert_eq!(values.deadline, task.deadline);
    }
}
