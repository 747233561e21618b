//! State for the single-page client, kept apart from how it gets drawn.
//!
//! A [`ClientState`] moves `Idle -> Loading(action) -> Succeeded(action) | Failed(action)`,
//! and the page handlers rebuild one per request, drive it through a transition and render it.

use crate::data::student::{RawAge, Student, StudentFields};
use serde::Deserialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Load,
    Create,
    Update,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Self; 5] = [
        Self::Load,
        Self::Create,
        Self::Update,
        Self::Edit,
        Self::Delete,
    ];

    ///used for element ids
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    pub const fn busy_message(self) -> &'static str {
        match self {
            Self::Load => "Loading students...",
            Self::Create => "Adding student...",
            Self::Update => "Saving changes...",
            Self::Edit => "Opening student...",
            Self::Delete => "Deleting student...",
        }
    }

    pub const fn success_message(self) -> Option<&'static str> {
        match self {
            Self::Load | Self::Edit => None,
            Self::Create => Some("Student added"),
            Self::Update => Some("Student updated"),
            Self::Delete => Some("Student deleted"),
        }
    }

    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Load => "Failed to load students",
            Self::Create => "Failed to add student",
            Self::Update => "Failed to update student",
            Self::Edit => "Failed to open student for editing",
            Self::Delete => "Failed to delete student",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading(Action),
    Succeeded(Action),
    Failed(Action),
}

///the form exactly as typed, so it can be put back after a failed submit
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
}

impl From<&Student> for StudentForm {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            age: student.age.to_string(),
            gender: student.gender.clone(),
        }
    }
}

impl From<StudentForm> for StudentFields {
    fn from(StudentForm { name, email, age, gender }: StudentForm) -> Self {
        Self {
            name: Some(name),
            email: Some(email),
            age: Some(RawAge::Text(age)),
            gender: Some(gender),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientState {
    students: Vec<Student>,
    form: StudentForm,
    editing: Option<i64>,
    phase: Phase,
}

impl ClientState {
    ///what the page looks like before the first list arrives
    pub fn first_load() -> Self {
        Self {
            phase: Phase::Loading(Action::Load),
            ..Self::default()
        }
    }

    ///rebuilds the form a request carried, bound to `editing` when it was an edit
    pub fn with_form(form: StudentForm, editing: Option<i64>) -> Self {
        Self {
            form,
            editing,
            ..Self::default()
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub const fn form(&self) -> &StudentForm {
        &self.form
    }

    pub const fn editing(&self) -> Option<i64> {
        self.editing
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }

    ///true once the list reflects what's in storage
    pub const fn has_fresh_list(&self) -> bool {
        matches!(self.phase, Phase::Succeeded(_))
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed(_))
    }

    ///the status line to show, if any
    pub const fn message(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Idle => None,
            Phase::Loading(action) => Some(action.busy_message()),
            Phase::Succeeded(action) => action.success_message(),
            Phase::Failed(action) => Some(action.failure_message()),
        }
    }

    pub const fn begin(&mut self, action: Action) {
        self.phase = Phase::Loading(action);
    }

    ///edit mode updates the bound record, otherwise it's a new one
    pub const fn begin_submit(&mut self) -> Action {
        let action = if self.editing.is_some() {
            Action::Update
        } else {
            Action::Create
        };
        self.begin(action);
        action
    }

    ///finishes whatever was in flight with a freshly fetched list
    pub fn succeed(&mut self, students: Vec<Student>) {
        let Phase::Loading(action) = self.phase else {
            warn!(phase = ?self.phase, "Tried to finish a request that wasn't in flight");
            return;
        };

        self.students = students;
        if matches!(action, Action::Create | Action::Update) {
            self.clear_form();
        }
        self.phase = Phase::Succeeded(action);
    }

    ///leaves the form as it was so nothing typed is lost
    pub const fn fail(&mut self) {
        if let Phase::Loading(action) = self.phase {
            self.phase = Phase::Failed(action);
        }
    }

    pub fn edit(&mut self, student: &Student) {
        self.form = StudentForm::from(student);
        self.editing = Some(student.id);
        self.phase = Phase::Idle;
    }

    pub fn cancel(&mut self) {
        self.clear_form();
        self.phase = Phase::Idle;
    }

    fn clear_form(&mut self) {
        self.form = StudentForm::default();
        self.editing = None;
    }
}
